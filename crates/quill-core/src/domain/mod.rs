//! Domain entities - the core business objects.

mod category;
mod post;
mod principal;

pub use category::{Category, CategoryDraft, CategoryStatistics};
pub use post::{
    AuthorSnapshot, CategorySnapshot, Comment, CommentStatus, Post, PostDraft, PostStatistics,
    PostStatus, MAX_EMBEDDED_COMMENTS,
};
pub use principal::Principal;
