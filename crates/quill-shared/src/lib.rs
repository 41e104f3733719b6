//! # Quill Shared
//!
//! Request/response shapes exchanged with the (external) transport layer.
//! Conversions in and out of the domain types live here so the HTTP glue
//! stays thin.

pub mod dto;

pub use dto::{
    CategoryView, CommentView, CreateCategoryRequest, CreateCommentRequest, CreatePostRequest,
    PostView, UpdatePostRequest,
};
