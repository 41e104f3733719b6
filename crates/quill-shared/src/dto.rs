//! Data Transfer Objects - request/response types for the API surface.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use quill_core::domain::{
    Category, CategoryDraft, Comment, CommentStatus, Post, PostDraft, PostStatus,
};

/// Request to create a category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCategoryRequest {
    pub name: String,
    pub description: Option<String>,
    pub parent_id: Option<Uuid>,
}

impl From<CreateCategoryRequest> for CategoryDraft {
    fn from(req: CreateCategoryRequest) -> Self {
        Self {
            name: req.name,
            description: req.description,
            parent_id: req.parent_id,
        }
    }
}

fn default_status() -> PostStatus {
    PostStatus::Published
}

/// Request to create a post. Status defaults to published when omitted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePostRequest {
    pub title: String,
    pub content: String,
    pub excerpt: Option<String>,
    pub category_id: Uuid,
    #[serde(default)]
    pub tags: Vec<String>,
    pub featured_image: Option<String>,
    #[serde(default = "default_status")]
    pub status: PostStatus,
}

impl From<CreatePostRequest> for PostDraft {
    fn from(req: CreatePostRequest) -> Self {
        Self {
            title: req.title,
            content: req.content,
            excerpt: req.excerpt,
            category_id: req.category_id,
            tags: req.tags,
            featured_image: req.featured_image,
            status: req.status,
        }
    }
}

/// Partial post update - tri-state fields, absent means untouched.
pub use quill_core::patch::PostPatch as UpdatePostRequest;

/// Request to comment on a post.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCommentRequest {
    pub text: String,
}

/// Response projection of a post, with author/category flattened for display.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostView {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub excerpt: String,
    pub content: String,
    pub author_id: Uuid,
    pub author_name: String,
    pub author_avatar_url: Option<String>,
    pub category_id: Uuid,
    pub category_name: String,
    pub tags: Vec<String>,
    pub featured_image: Option<String>,
    pub status: PostStatus,
    pub views: u64,
    pub likes: u64,
    pub comments_count: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub published_at: Option<DateTime<Utc>>,
}

impl From<Post> for PostView {
    fn from(post: Post) -> Self {
        Self {
            id: post.id,
            title: post.title,
            slug: post.slug,
            excerpt: post.excerpt,
            content: post.content,
            author_id: post.author.user_id,
            author_name: post.author.username,
            author_avatar_url: post.author.avatar_url,
            category_id: post.category.category_id,
            category_name: post.category.name,
            tags: post.tags,
            featured_image: post.featured_image,
            status: post.status,
            views: post.statistics.views,
            likes: post.statistics.likes,
            comments_count: post.statistics.comments_count,
            created_at: post.created_at,
            updated_at: post.updated_at,
            published_at: post.published_at,
        }
    }
}

/// Response projection of a comment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentView {
    pub id: Uuid,
    pub author_name: String,
    pub text: String,
    pub status: CommentStatus,
    pub likes: u64,
    pub created_at: DateTime<Utc>,
}

impl From<Comment> for CommentView {
    fn from(comment: Comment) -> Self {
        Self {
            id: comment.id,
            author_name: comment.author.username,
            text: comment.text,
            status: comment.status,
            likes: comment.likes,
            created_at: comment.created_at,
        }
    }
}

/// Response projection of a category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryView {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub posts_count: u64,
    pub created_at: DateTime<Utc>,
}

impl From<Category> for CategoryView {
    fn from(category: Category) -> Self {
        Self {
            id: category.id,
            name: category.name,
            slug: category.slug,
            description: category.description,
            posts_count: category.statistics.posts_count,
            created_at: category.created_at,
        }
    }
}
