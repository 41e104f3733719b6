use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{Category, Principal};
use crate::error::ContentError;
use crate::slug::generate_slug;

const TITLE_MIN: usize = 3;
const TITLE_MAX: usize = 200;
const CONTENT_MIN: usize = 100;
const EXCERPT_LEN: usize = 200;
const COMMENT_TEXT_MAX: usize = 2_000;

/// Upper bound on comments embedded in a single post document.
pub const MAX_EMBEDDED_COMMENTS: usize = 1_000;

/// Post lifecycle status. Archived posts are excluded from public listings
/// and search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    Draft,
    Published,
    Archived,
}

/// Point-in-time copy of the author's identity, embedded at write time.
/// Never re-synced: historical content keeps the name it was written under.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorSnapshot {
    pub user_id: Uuid,
    pub username: String,
    pub avatar_url: Option<String>,
}

impl From<&Principal> for AuthorSnapshot {
    fn from(principal: &Principal) -> Self {
        Self {
            user_id: principal.id,
            username: principal.username.clone(),
            avatar_url: principal.avatar_url.clone(),
        }
    }
}

/// Point-in-time copy of the category's identity, embedded at write time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategorySnapshot {
    pub category_id: Uuid,
    pub name: String,
}

impl From<&Category> for CategorySnapshot {
    fn from(category: &Category) -> Self {
        Self {
            category_id: category.id,
            name: category.name.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommentStatus {
    Approved,
    Pending,
}

/// A comment embedded in its parent post, append-only, ordered by creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: Uuid,
    pub author: AuthorSnapshot,
    pub text: String,
    pub created_at: DateTime<Utc>,
    pub status: CommentStatus,
    pub likes: u64,
}

impl Comment {
    pub fn new(author: &Principal, text: impl Into<String>) -> Result<Self, ContentError> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(ContentError::ValidationFailed(
                "comment text must not be empty".into(),
            ));
        }
        if text.chars().count() > COMMENT_TEXT_MAX {
            return Err(ContentError::ValidationFailed(format!(
                "comment text exceeds {COMMENT_TEXT_MAX} characters"
            )));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            author: AuthorSnapshot::from(author),
            text,
            created_at: Utc::now(),
            status: CommentStatus::Approved,
            likes: 0,
        })
    }
}

/// Denormalized post counters. Never negative; mutated only through atomic
/// store increments.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PostStatistics {
    pub views: u64,
    pub likes: u64,
    pub comments_count: u64,
}

/// Post entity - the unit of published content.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub title: String,
    /// Unique and immutable after creation; later title edits do not move it.
    pub slug: String,
    pub content: String,
    pub excerpt: String,
    pub author: AuthorSnapshot,
    pub category: CategorySnapshot,
    /// Set semantics for filtering; insertion order preserved for display.
    pub tags: Vec<String>,
    pub featured_image: Option<String>,
    pub status: PostStatus,
    pub comments: Vec<Comment>,
    #[serde(default)]
    pub statistics: PostStatistics,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub published_at: Option<DateTime<Utc>>,
}

/// Input for creating a post.
#[derive(Debug, Clone, Deserialize)]
pub struct PostDraft {
    pub title: String,
    pub content: String,
    pub excerpt: Option<String>,
    pub category_id: Uuid,
    #[serde(default)]
    pub tags: Vec<String>,
    pub featured_image: Option<String>,
    pub status: PostStatus,
}

fn validate_title(title: &str) -> Result<(), ContentError> {
    let len = title.chars().count();
    if !(TITLE_MIN..=TITLE_MAX).contains(&len) {
        return Err(ContentError::ValidationFailed(format!(
            "title must be {TITLE_MIN}-{TITLE_MAX} characters, got {len}"
        )));
    }
    Ok(())
}

fn validate_content(content: &str) -> Result<(), ContentError> {
    let len = content.chars().count();
    if len < CONTENT_MIN {
        return Err(ContentError::ValidationFailed(format!(
            "content must be at least {CONTENT_MIN} characters, got {len}"
        )));
    }
    Ok(())
}

impl PostDraft {
    pub fn validate(&self) -> Result<(), ContentError> {
        validate_title(&self.title)?;
        validate_content(&self.content)
    }
}

/// First `EXCERPT_LEN` characters of the content, on a char boundary.
fn derive_excerpt(content: &str) -> String {
    content.chars().take(EXCERPT_LEN).collect()
}

/// Drop duplicate tags while preserving first-occurrence order.
fn dedupe_tags(tags: Vec<String>) -> Vec<String> {
    let mut seen = Vec::with_capacity(tags.len());
    for tag in tags {
        if !seen.contains(&tag) {
            seen.push(tag);
        }
    }
    seen
}

impl Post {
    /// Validate the draft and assemble a post with embedded snapshots.
    ///
    /// The referenced category must already be resolved by the caller; the
    /// slug is derived here and its uniqueness is enforced at insert time.
    pub fn new(
        draft: PostDraft,
        author: &Principal,
        category: &Category,
    ) -> Result<Self, ContentError> {
        draft.validate()?;
        let slug = generate_slug(&draft.title);
        if slug.is_empty() {
            return Err(ContentError::ValidationFailed(
                "title does not produce a usable slug".into(),
            ));
        }
        let now = Utc::now();
        let excerpt = draft
            .excerpt
            .unwrap_or_else(|| derive_excerpt(&draft.content));
        Ok(Self {
            id: Uuid::new_v4(),
            title: draft.title,
            slug,
            content: draft.content,
            excerpt,
            author: AuthorSnapshot::from(author),
            category: CategorySnapshot::from(category),
            tags: dedupe_tags(draft.tags),
            featured_image: draft.featured_image,
            status: draft.status,
            comments: Vec::new(),
            statistics: PostStatistics::default(),
            created_at: now,
            updated_at: now,
            published_at: (draft.status == PostStatus::Published).then_some(now),
        })
    }

    /// Re-check field shapes after a partial update has been merged in.
    pub fn validate(&self) -> Result<(), ContentError> {
        validate_title(&self.title)?;
        validate_content(&self.content)
    }

    /// Replace the tag set, dropping duplicates like the constructor does.
    pub fn set_tags(&mut self, tags: Vec<String>) {
        self.tags = dedupe_tags(tags);
    }

    pub fn is_published(&self) -> bool {
        self.status == PostStatus::Published
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}
