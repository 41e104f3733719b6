//! BSON document shapes for the MongoDB adapter.
//!
//! Documents mirror the domain entities but carry BSON-native timestamps,
//! signed counters (so `$inc` works server-side), and string ids (the
//! canonical Uuid text form, stable across serializer representations).
//! Conversions keep the domain layer free of storage types; reading a
//! malformed document is a `StoreError::Serialization`.

use mongodb::bson::DateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use quill_core::domain::{
    AuthorSnapshot, Category, CategorySnapshot, CategoryStatistics, Comment, CommentStatus,
    Post, PostStatistics, PostStatus,
};
use quill_core::error::StoreError;

fn clamp(n: i64) -> u64 {
    n.max(0) as u64
}

fn parse_id(raw: &str) -> Result<Uuid, StoreError> {
    Uuid::parse_str(raw).map_err(|e| StoreError::Serialization(format!("bad id '{raw}': {e}")))
}

// BSON datetimes carry millisecond precision; round-tripping through millis
// avoids tying the build to bson's optional chrono integration.
fn to_bson_dt(dt: chrono::DateTime<chrono::Utc>) -> DateTime {
    DateTime::from_millis(dt.timestamp_millis())
}

fn from_bson_dt(dt: DateTime) -> chrono::DateTime<chrono::Utc> {
    chrono::DateTime::from_timestamp_millis(dt.timestamp_millis()).unwrap_or_default()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorSnapshotDoc {
    pub user_id: String,
    pub username: String,
    pub avatar_url: Option<String>,
}

impl From<AuthorSnapshot> for AuthorSnapshotDoc {
    fn from(a: AuthorSnapshot) -> Self {
        Self {
            user_id: a.user_id.to_string(),
            username: a.username,
            avatar_url: a.avatar_url,
        }
    }
}

impl TryFrom<AuthorSnapshotDoc> for AuthorSnapshot {
    type Error = StoreError;

    fn try_from(a: AuthorSnapshotDoc) -> Result<Self, StoreError> {
        Ok(Self {
            user_id: parse_id(&a.user_id)?,
            username: a.username,
            avatar_url: a.avatar_url,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategorySnapshotDoc {
    pub category_id: String,
    pub name: String,
}

impl From<CategorySnapshot> for CategorySnapshotDoc {
    fn from(c: CategorySnapshot) -> Self {
        Self {
            category_id: c.category_id.to_string(),
            name: c.name,
        }
    }
}

impl TryFrom<CategorySnapshotDoc> for CategorySnapshot {
    type Error = StoreError;

    fn try_from(c: CategorySnapshotDoc) -> Result<Self, StoreError> {
        Ok(Self {
            category_id: parse_id(&c.category_id)?,
            name: c.name,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentDoc {
    pub id: String,
    pub author: AuthorSnapshotDoc,
    pub text: String,
    pub created_at: DateTime,
    pub status: CommentStatus,
    pub likes: i64,
}

impl From<Comment> for CommentDoc {
    fn from(c: Comment) -> Self {
        Self {
            id: c.id.to_string(),
            author: c.author.into(),
            text: c.text,
            created_at: to_bson_dt(c.created_at),
            status: c.status,
            likes: c.likes as i64,
        }
    }
}

impl TryFrom<CommentDoc> for Comment {
    type Error = StoreError;

    fn try_from(c: CommentDoc) -> Result<Self, StoreError> {
        Ok(Self {
            id: parse_id(&c.id)?,
            author: c.author.try_into()?,
            text: c.text,
            created_at: from_bson_dt(c.created_at),
            status: c.status,
            likes: clamp(c.likes),
        })
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PostStatisticsDoc {
    pub views: i64,
    pub likes: i64,
    pub comments_count: i64,
}

impl From<PostStatistics> for PostStatisticsDoc {
    fn from(s: PostStatistics) -> Self {
        Self {
            views: s.views as i64,
            likes: s.likes as i64,
            comments_count: s.comments_count as i64,
        }
    }
}

impl From<PostStatisticsDoc> for PostStatistics {
    fn from(s: PostStatisticsDoc) -> Self {
        Self {
            views: clamp(s.views),
            likes: clamp(s.likes),
            comments_count: clamp(s.comments_count),
        }
    }
}

/// Post document, collection `posts`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostDoc {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    pub slug: String,
    pub content: String,
    pub excerpt: String,
    pub author: AuthorSnapshotDoc,
    pub category: CategorySnapshotDoc,
    pub tags: Vec<String>,
    pub featured_image: Option<String>,
    pub status: PostStatus,
    pub comments: Vec<CommentDoc>,
    pub statistics: PostStatisticsDoc,
    pub created_at: DateTime,
    pub updated_at: DateTime,
    pub published_at: Option<DateTime>,
}

impl From<Post> for PostDoc {
    fn from(p: Post) -> Self {
        Self {
            id: p.id.to_string(),
            title: p.title,
            slug: p.slug,
            content: p.content,
            excerpt: p.excerpt,
            author: p.author.into(),
            category: p.category.into(),
            tags: p.tags,
            featured_image: p.featured_image,
            status: p.status,
            comments: p.comments.into_iter().map(Into::into).collect(),
            statistics: p.statistics.into(),
            created_at: to_bson_dt(p.created_at),
            updated_at: to_bson_dt(p.updated_at),
            published_at: p.published_at.map(to_bson_dt),
        }
    }
}

impl TryFrom<PostDoc> for Post {
    type Error = StoreError;

    fn try_from(p: PostDoc) -> Result<Self, StoreError> {
        Ok(Self {
            id: parse_id(&p.id)?,
            title: p.title,
            slug: p.slug,
            content: p.content,
            excerpt: p.excerpt,
            author: p.author.try_into()?,
            category: p.category.try_into()?,
            tags: p.tags,
            featured_image: p.featured_image,
            status: p.status,
            comments: p
                .comments
                .into_iter()
                .map(TryInto::try_into)
                .collect::<Result<_, _>>()?,
            statistics: p.statistics.into(),
            created_at: from_bson_dt(p.created_at),
            updated_at: from_bson_dt(p.updated_at),
            published_at: p.published_at.map(from_bson_dt),
        })
    }
}

/// Category document, collection `categories`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryDoc {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub parent_id: Option<String>,
    pub posts_count: i64,
    pub created_at: DateTime,
}

impl From<Category> for CategoryDoc {
    fn from(c: Category) -> Self {
        Self {
            id: c.id.to_string(),
            name: c.name,
            slug: c.slug,
            description: c.description,
            parent_id: c.parent_id.map(|id| id.to_string()),
            posts_count: c.statistics.posts_count as i64,
            created_at: to_bson_dt(c.created_at),
        }
    }
}

impl TryFrom<CategoryDoc> for Category {
    type Error = StoreError;

    fn try_from(c: CategoryDoc) -> Result<Self, StoreError> {
        Ok(Self {
            id: parse_id(&c.id)?,
            name: c.name,
            slug: c.slug,
            description: c.description,
            parent_id: c.parent_id.as_deref().map(parse_id).transpose()?,
            statistics: CategoryStatistics {
                posts_count: clamp(c.posts_count),
            },
            created_at: from_bson_dt(c.created_at),
        })
    }
}

/// Per-author posts counter, collection `author_stats`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorStatsDoc {
    #[serde(rename = "_id")]
    pub author_id: String,
    pub posts_count: i64,
}
