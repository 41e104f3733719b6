//! Ports - trait definitions for the persistence boundary and search facade.
//! These are the "interfaces" that infrastructure must implement.

mod search;
mod store;

pub use search::TextMatcher;
pub use store::{
    AuthorStatsStore, CategoryStore, CommentAppend, PostCounter, PostFilter, PostStore,
};
