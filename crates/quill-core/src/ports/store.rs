use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Category, Comment, Post};
use crate::error::StoreError;
use crate::pagination::PageRequest;

/// Post counters backed by an atomic storage increment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostCounter {
    Views,
    Likes,
}

/// Query predicate for post listings. Every variant except `All` is
/// restricted to published posts - archived and draft posts never appear in
/// public listings or search.
#[derive(Debug, Clone)]
pub enum PostFilter {
    All,
    Published,
    /// Published posts in the given category.
    Category(Uuid),
    /// Published posts carrying the given tag.
    Tag(String),
    /// Published posts whose title or content matches the query
    /// (see [`super::TextMatcher`] for the semantics).
    Text(String),
}

/// Post collection port.
///
/// Counter mutations go through atomic increments rather than
/// read-modify-write; slug uniqueness is enforced by the store itself, so a
/// losing insert in a check-then-act race still surfaces as `DuplicateKey`.
#[async_trait]
pub trait PostStore: Send + Sync {
    /// Insert a new post. A slug collision is `DuplicateKey { index: "slug" }`.
    async fn insert(&self, post: Post) -> Result<Post, StoreError>;

    /// Fetch a post without side effects.
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, StoreError>;

    /// Replace the stored document wholesale. `NotFound` if it is gone.
    async fn replace(&self, post: Post) -> Result<Post, StoreError>;

    /// Delete by id; `false` when nothing was there.
    async fn delete(&self, id: Uuid) -> Result<bool, StoreError>;

    /// One page of matching posts sorted by creation time descending, plus
    /// the total match count independent of slicing.
    async fn find_page(
        &self,
        filter: &PostFilter,
        page: &PageRequest,
    ) -> Result<(Vec<Post>, u64), StoreError>;

    /// The full matching corpus, for aggregation scans.
    async fn find_all(&self, filter: &PostFilter) -> Result<Vec<Post>, StoreError>;

    /// Atomically add `delta` to a counter and return the post AFTER the
    /// update, or `None` when the post does not exist. Floors at zero.
    async fn increment_counter(
        &self,
        id: Uuid,
        counter: PostCounter,
        delta: i64,
    ) -> Result<Option<Post>, StoreError>;

    /// Atomically append a comment AND bump `comments_count`, returning the
    /// updated post. `Ok(None)` when the post does not exist; `Ok(Some)` with
    /// an unchanged comment count never happens - the append is all-or-nothing.
    /// When the embedded list is already at `max_comments` the append is
    /// rejected and the post is returned untouched with `appended == false`.
    async fn push_comment(
        &self,
        id: Uuid,
        comment: Comment,
        max_comments: usize,
    ) -> Result<Option<CommentAppend>, StoreError>;
}

/// Outcome of a conditional comment append.
#[derive(Debug, Clone)]
pub struct CommentAppend {
    pub post: Post,
    pub appended: bool,
}

/// Category collection port. Name and slug are unique indexes.
#[async_trait]
pub trait CategoryStore: Send + Sync {
    /// Insert a new category. Collisions surface as `DuplicateKey` carrying
    /// the violated index name (`"name"` or `"slug"`).
    async fn insert(&self, category: Category) -> Result<Category, StoreError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Category>, StoreError>;

    async fn find_all(&self) -> Result<Vec<Category>, StoreError>;

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError>;

    /// Atomically add `delta` to `statistics.posts_count`, flooring at zero.
    /// `None` when the category does not exist.
    async fn increment_posts_count(
        &self,
        id: Uuid,
        delta: i64,
    ) -> Result<Option<Category>, StoreError>;
}

/// Per-author denormalized counters keyed by principal id.
///
/// The excluded auth subsystem owns the full user document; this ledger only
/// keeps the posts_count the content layer is responsible for maintaining.
#[async_trait]
pub trait AuthorStatsStore: Send + Sync {
    /// Atomically add `delta`, flooring at zero, and return the new value.
    async fn increment_posts_count(&self, author_id: Uuid, delta: i64) -> Result<u64, StoreError>;

    async fn posts_count(&self, author_id: Uuid) -> Result<u64, StoreError>;
}
