//! In-memory document store - the default backend when MongoDB is not
//! configured, and the workhorse for tests.
//!
//! A single async `RwLock` guards all collections, so every counter mutation
//! and the comment append are atomic read-modify-writes under the write
//! lock, and the slug/name indexes enforce uniqueness at insert exactly like
//! the unique indexes of a real document store. Data is lost on restart.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use quill_core::domain::{Category, Comment, Post};
use quill_core::error::StoreError;
use quill_core::pagination::PageRequest;
use quill_core::ports::{
    AuthorStatsStore, CategoryStore, CommentAppend, PostCounter, PostFilter, PostStore,
    TextMatcher,
};

use crate::search::SubstringMatcher;

#[derive(Default)]
struct Inner {
    posts: HashMap<Uuid, Post>,
    post_slugs: HashMap<String, Uuid>,
    categories: HashMap<Uuid, Category>,
    category_names: HashMap<String, Uuid>,
    category_slugs: HashMap<String, Uuid>,
    author_posts: HashMap<Uuid, u64>,
}

pub struct InMemoryStore {
    inner: RwLock<Inner>,
    matcher: Arc<dyn TextMatcher>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::with_matcher(Arc::new(SubstringMatcher))
    }

    pub fn with_matcher(matcher: Arc<dyn TextMatcher>) -> Self {
        Self {
            inner: RwLock::new(Inner::default()),
            matcher,
        }
    }

    fn filter_matches(&self, filter: &PostFilter, post: &Post) -> bool {
        match filter {
            PostFilter::All => true,
            PostFilter::Published => post.is_published(),
            PostFilter::Category(id) => {
                post.is_published() && post.category.category_id == *id
            }
            PostFilter::Tag(tag) => post.is_published() && post.has_tag(tag),
            PostFilter::Text(query) => {
                post.is_published() && self.matcher.matches(query, &post.title, &post.content)
            }
        }
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn apply_delta(value: u64, delta: i64) -> u64 {
    if delta >= 0 {
        value.saturating_add(delta as u64)
    } else {
        value.saturating_sub(delta.unsigned_abs())
    }
}

#[async_trait]
impl PostStore for InMemoryStore {
    async fn insert(&self, post: Post) -> Result<Post, StoreError> {
        let mut inner = self.inner.write().await;
        if inner.post_slugs.contains_key(&post.slug) {
            return Err(StoreError::DuplicateKey {
                index: "slug".to_string(),
            });
        }
        inner.post_slugs.insert(post.slug.clone(), post.id);
        inner.posts.insert(post.id, post.clone());
        Ok(post)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, StoreError> {
        Ok(self.inner.read().await.posts.get(&id).cloned())
    }

    async fn replace(&self, post: Post) -> Result<Post, StoreError> {
        let mut inner = self.inner.write().await;
        if !inner.posts.contains_key(&post.id) {
            return Err(StoreError::NotFound);
        }
        inner.posts.insert(post.id, post.clone());
        Ok(post)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut inner = self.inner.write().await;
        match inner.posts.remove(&id) {
            Some(post) => {
                inner.post_slugs.remove(&post.slug);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn find_page(
        &self,
        filter: &PostFilter,
        page: &PageRequest,
    ) -> Result<(Vec<Post>, u64), StoreError> {
        let inner = self.inner.read().await;
        let mut matching: Vec<&Post> = inner
            .posts
            .values()
            .filter(|p| self.filter_matches(filter, p))
            .collect();
        // Creation time descending; id settles same-instant ties.
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));

        let total = matching.len() as u64;
        let items = matching
            .into_iter()
            .skip(page.skip() as usize)
            .take(page.limit() as usize)
            .cloned()
            .collect();
        Ok((items, total))
    }

    async fn find_all(&self, filter: &PostFilter) -> Result<Vec<Post>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .posts
            .values()
            .filter(|p| self.filter_matches(filter, p))
            .cloned()
            .collect())
    }

    async fn increment_counter(
        &self,
        id: Uuid,
        counter: PostCounter,
        delta: i64,
    ) -> Result<Option<Post>, StoreError> {
        let mut inner = self.inner.write().await;
        let Some(post) = inner.posts.get_mut(&id) else {
            return Ok(None);
        };
        let field = match counter {
            PostCounter::Views => &mut post.statistics.views,
            PostCounter::Likes => &mut post.statistics.likes,
        };
        *field = apply_delta(*field, delta);
        Ok(Some(post.clone()))
    }

    async fn push_comment(
        &self,
        id: Uuid,
        comment: Comment,
        max_comments: usize,
    ) -> Result<Option<CommentAppend>, StoreError> {
        let mut inner = self.inner.write().await;
        let Some(post) = inner.posts.get_mut(&id) else {
            return Ok(None);
        };
        if post.comments.len() >= max_comments {
            return Ok(Some(CommentAppend {
                post: post.clone(),
                appended: false,
            }));
        }
        post.comments.push(comment);
        post.statistics.comments_count += 1;
        Ok(Some(CommentAppend {
            post: post.clone(),
            appended: true,
        }))
    }
}

#[async_trait]
impl CategoryStore for InMemoryStore {
    async fn insert(&self, category: Category) -> Result<Category, StoreError> {
        let mut inner = self.inner.write().await;
        if inner.category_names.contains_key(&category.name) {
            return Err(StoreError::DuplicateKey {
                index: "name".to_string(),
            });
        }
        if inner.category_slugs.contains_key(&category.slug) {
            return Err(StoreError::DuplicateKey {
                index: "slug".to_string(),
            });
        }
        inner.category_names.insert(category.name.clone(), category.id);
        inner.category_slugs.insert(category.slug.clone(), category.id);
        inner.categories.insert(category.id, category.clone());
        Ok(category)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Category>, StoreError> {
        Ok(self.inner.read().await.categories.get(&id).cloned())
    }

    async fn find_all(&self) -> Result<Vec<Category>, StoreError> {
        let inner = self.inner.read().await;
        let mut categories: Vec<Category> = inner.categories.values().cloned().collect();
        categories.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(categories)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut inner = self.inner.write().await;
        match inner.categories.remove(&id) {
            Some(category) => {
                inner.category_names.remove(&category.name);
                inner.category_slugs.remove(&category.slug);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn increment_posts_count(
        &self,
        id: Uuid,
        delta: i64,
    ) -> Result<Option<Category>, StoreError> {
        let mut inner = self.inner.write().await;
        let Some(category) = inner.categories.get_mut(&id) else {
            return Ok(None);
        };
        category.statistics.posts_count = apply_delta(category.statistics.posts_count, delta);
        Ok(Some(category.clone()))
    }
}

#[async_trait]
impl AuthorStatsStore for InMemoryStore {
    async fn increment_posts_count(&self, author_id: Uuid, delta: i64) -> Result<u64, StoreError> {
        let mut inner = self.inner.write().await;
        let count = inner.author_posts.entry(author_id).or_insert(0);
        *count = apply_delta(*count, delta);
        Ok(*count)
    }

    async fn posts_count(&self, author_id: Uuid) -> Result<u64, StoreError> {
        Ok(self
            .inner
            .read()
            .await
            .author_posts
            .get(&author_id)
            .copied()
            .unwrap_or(0))
    }
}
