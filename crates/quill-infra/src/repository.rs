//! The content repository - command/query surface over the document store.
//!
//! Owns injected store handles (no process-wide client), maintains the
//! denormalized counters, and applies the retry policy at this boundary:
//! transient store failures on idempotent reads get the full retry budget,
//! counter increments at most one retry, and business outcomes none.

use std::sync::Arc;

use uuid::Uuid;

use quill_core::domain::{
    Category, CategoryDraft, Comment, Post, PostDraft, PostStatus, Principal,
    MAX_EMBEDDED_COMMENTS,
};
use quill_core::error::{ContentError, StoreError};
use quill_core::pagination::{Page, PageRequest};
use quill_core::patch::{Patch, PostPatch};
use quill_core::ports::{
    AuthorStatsStore, CategoryStore, PostCounter, PostFilter, PostStore,
};
use quill_core::stats::{self, AuthorRollup, CategoryRollup, CommentStats, TagRollup};

use crate::retry::{RetryPolicy, with_retry};
use crate::store::InMemoryStore;

/// Attempts allowed for counter increments: the initial try plus one retry.
/// More would double-count without deduplication.
const INCREMENT_ATTEMPTS: u32 = 2;

pub struct ContentRepository {
    posts: Arc<dyn PostStore>,
    categories: Arc<dyn CategoryStore>,
    authors: Arc<dyn AuthorStatsStore>,
    retry: RetryPolicy,
}

impl ContentRepository {
    pub fn new(
        posts: Arc<dyn PostStore>,
        categories: Arc<dyn CategoryStore>,
        authors: Arc<dyn AuthorStatsStore>,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            posts,
            categories,
            authors,
            retry,
        }
    }

    /// Repository over a fresh in-memory store - the no-database mode.
    pub fn in_memory() -> Self {
        let store = Arc::new(InMemoryStore::new());
        Self::new(
            store.clone(),
            store.clone(),
            store,
            RetryPolicy::default(),
        )
    }

    // ---- categories ----

    pub async fn create_category(&self, draft: CategoryDraft) -> Result<Category, ContentError> {
        let category = Category::new(draft)?;
        let slug = category.slug.clone();
        match self.categories.insert(category).await {
            Ok(category) => {
                tracing::info!(category_id = %category.id, slug = %category.slug, "Category created");
                Ok(category)
            }
            Err(StoreError::DuplicateKey { index }) if index == "slug" => {
                Err(ContentError::DuplicateSlug(slug))
            }
            Err(StoreError::DuplicateKey { .. }) => Err(ContentError::ValidationFailed(
                "category name is already taken".into(),
            )),
            Err(err) => Err(err.into()),
        }
    }

    pub async fn get_category(&self, id: Uuid) -> Result<Option<Category>, ContentError> {
        let categories = Arc::clone(&self.categories);
        with_retry(&self.retry, self.retry.max_attempts, "get_category", || {
            let categories = Arc::clone(&categories);
            async move { categories.find_by_id(id).await.map_err(ContentError::from) }
        })
        .await
    }

    pub async fn list_categories(&self) -> Result<Vec<Category>, ContentError> {
        let categories = Arc::clone(&self.categories);
        with_retry(&self.retry, self.retry.max_attempts, "list_categories", || {
            let categories = Arc::clone(&categories);
            async move { categories.find_all().await.map_err(ContentError::from) }
        })
        .await
    }

    // ---- posts: commands ----

    pub async fn create_post(
        &self,
        draft: PostDraft,
        author: &Principal,
    ) -> Result<Post, ContentError> {
        draft.validate()?;
        let category = self
            .get_category(draft.category_id)
            .await?
            .ok_or(ContentError::CategoryNotFound(draft.category_id))?;

        let post = Post::new(draft, author, &category)?;
        let slug = post.slug.clone();
        let post = match self.posts.insert(post).await {
            Ok(post) => post,
            Err(StoreError::DuplicateKey { index }) if index == "slug" => {
                return Err(ContentError::DuplicateSlug(slug));
            }
            Err(err) => return Err(err.into()),
        };

        self.shift_post_counters(post.author.user_id, post.category.category_id, 1)
            .await?;
        tracing::info!(post_id = %post.id, slug = %post.slug, "Post created");
        Ok(post)
    }

    /// Fetch a post by id. NOT a pure read: every call atomically adds one
    /// view and returns the document after the update.
    pub async fn get_by_id(&self, id: Uuid) -> Result<Option<Post>, ContentError> {
        let posts = Arc::clone(&self.posts);
        with_retry(&self.retry, INCREMENT_ATTEMPTS, "get_by_id", || {
            let posts = Arc::clone(&posts);
            async move {
                posts
                    .increment_counter(id, PostCounter::Views, 1)
                    .await
                    .map_err(ContentError::from)
            }
        })
        .await
    }

    pub async fn update_post(
        &self,
        id: Uuid,
        patch: PostPatch,
        requester: &Principal,
    ) -> Result<Post, ContentError> {
        let mut post = self
            .fetch_post(id)
            .await?
            .ok_or(ContentError::NotFound { entity: "post", id })?;
        if post.author.user_id != requester.id {
            return Err(ContentError::Forbidden);
        }

        for (field, cleared) in [
            ("title", matches!(patch.title, Patch::Clear)),
            ("content", matches!(patch.content, Patch::Clear)),
            ("excerpt", matches!(patch.excerpt, Patch::Clear)),
            ("category_id", matches!(patch.category_id, Patch::Clear)),
            ("tags", matches!(patch.tags, Patch::Clear)),
            ("status", matches!(patch.status, Patch::Clear)),
        ] {
            if cleared {
                return Err(ContentError::ValidationFailed(format!(
                    "field '{field}' is required and cannot be cleared"
                )));
            }
        }

        // A changed category must resolve before anything is persisted.
        let previous_category = post.category.category_id;
        if let Patch::Set(category_id) = patch.category_id {
            if category_id != previous_category {
                let category = self
                    .get_category(category_id)
                    .await?
                    .ok_or(ContentError::CategoryNotFound(category_id))?;
                post.category = (&category).into();
            }
        }

        patch.title.apply_to(&mut post.title);
        patch.content.apply_to(&mut post.content);
        patch.excerpt.apply_to(&mut post.excerpt);
        if let Patch::Set(tags) = patch.tags {
            post.set_tags(tags);
        }
        patch
            .featured_image
            .apply_to_option(&mut post.featured_image);
        if let Patch::Set(status) = patch.status {
            if status == PostStatus::Published && post.published_at.is_none() {
                post.published_at = Some(chrono::Utc::now());
            }
            post.status = status;
        }
        post.validate()?;
        post.updated_at = chrono::Utc::now();

        let updated = self.posts.replace(post).await.map_err(|err| match err {
            StoreError::NotFound => ContentError::NotFound { entity: "post", id },
            other => other.into(),
        })?;

        // The post left one category's count and joined another's.
        let new_category = updated.category.category_id;
        if new_category != previous_category {
            self.shift_category_count(previous_category, -1).await?;
            self.shift_category_count(new_category, 1).await?;
        }

        tracing::debug!(post_id = %updated.id, "Post updated");
        Ok(updated)
    }

    /// Delete a post. Idempotent: a missing post is `Ok(false)`, not an error.
    pub async fn delete_post(&self, id: Uuid, requester: &Principal) -> Result<bool, ContentError> {
        let Some(post) = self.fetch_post(id).await? else {
            return Ok(false);
        };
        if post.author.user_id != requester.id {
            return Err(ContentError::Forbidden);
        }

        let deleted = self.posts.delete(id).await.map_err(ContentError::from)?;
        if deleted {
            self.shift_post_counters(post.author.user_id, post.category.category_id, -1)
                .await?;
            tracing::info!(post_id = %id, "Post deleted");
        }
        Ok(deleted)
    }

    pub async fn add_comment(
        &self,
        post_id: Uuid,
        author: &Principal,
        text: &str,
    ) -> Result<Comment, ContentError> {
        let comment = Comment::new(author, text)?;
        let posts = Arc::clone(&self.posts);
        let appended = with_retry(&self.retry, INCREMENT_ATTEMPTS, "add_comment", || {
            let posts = Arc::clone(&posts);
            let comment = comment.clone();
            async move {
                posts
                    .push_comment(post_id, comment, MAX_EMBEDDED_COMMENTS)
                    .await
                    .map_err(ContentError::from)
            }
        })
        .await?;

        match appended {
            None => Err(ContentError::NotFound {
                entity: "post",
                id: post_id,
            }),
            Some(outcome) if outcome.appended => Ok(comment),
            Some(_) => Err(ContentError::CommentLimitReached),
        }
    }

    /// Atomically add one like, returning the updated post.
    pub async fn like_post(&self, id: Uuid) -> Result<Post, ContentError> {
        let posts = Arc::clone(&self.posts);
        with_retry(&self.retry, INCREMENT_ATTEMPTS, "like_post", || {
            let posts = Arc::clone(&posts);
            async move {
                posts
                    .increment_counter(id, PostCounter::Likes, 1)
                    .await
                    .map_err(ContentError::from)
            }
        })
        .await?
        .ok_or(ContentError::NotFound { entity: "post", id })
    }

    // ---- posts: listings ----

    pub async fn list_published(&self, page: &PageRequest) -> Result<Page<Post>, ContentError> {
        self.list(PostFilter::Published, page, "list_published").await
    }

    pub async fn search(&self, query: &str, page: &PageRequest) -> Result<Page<Post>, ContentError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(ContentError::ValidationFailed(
                "search query must not be empty".into(),
            ));
        }
        self.list(PostFilter::Text(query.to_string()), page, "search")
            .await
    }

    pub async fn list_by_category(
        &self,
        category_id: Uuid,
        page: &PageRequest,
    ) -> Result<Page<Post>, ContentError> {
        self.get_category(category_id)
            .await?
            .ok_or(ContentError::CategoryNotFound(category_id))?;
        self.list(PostFilter::Category(category_id), page, "list_by_category")
            .await
    }

    pub async fn list_by_tag(
        &self,
        tag: &str,
        page: &PageRequest,
    ) -> Result<Page<Post>, ContentError> {
        self.list(PostFilter::Tag(tag.to_string()), page, "list_by_tag")
            .await
    }

    async fn list(
        &self,
        filter: PostFilter,
        page: &PageRequest,
        op_name: &'static str,
    ) -> Result<Page<Post>, ContentError> {
        let posts = Arc::clone(&self.posts);
        let request = *page;
        let (items, total) = with_retry(&self.retry, self.retry.max_attempts, op_name, || {
            let posts = Arc::clone(&posts);
            let filter = filter.clone();
            async move {
                posts
                    .find_page(&filter, &request)
                    .await
                    .map_err(ContentError::from)
            }
        })
        .await?;
        Ok(Page::new(items, total, page))
    }

    // ---- aggregations ----

    pub async fn top_authors(&self, limit: usize) -> Result<Vec<AuthorRollup>, ContentError> {
        let corpus = self.published_corpus().await?;
        Ok(stats::top_authors(&corpus, limit))
    }

    pub async fn popular_categories(&self) -> Result<Vec<CategoryRollup>, ContentError> {
        let corpus = self.published_corpus().await?;
        Ok(stats::popular_categories(&corpus))
    }

    pub async fn comment_stats(&self) -> Result<CommentStats, ContentError> {
        let corpus = self.published_corpus().await?;
        Ok(stats::comment_stats(&corpus))
    }

    pub async fn tag_distribution(&self, limit: usize) -> Result<Vec<TagRollup>, ContentError> {
        let corpus = self.published_corpus().await?;
        Ok(stats::tag_distribution(&corpus, limit))
    }

    /// Posts authored under this principal id, per the denormalized ledger.
    pub async fn author_posts_count(&self, author_id: Uuid) -> Result<u64, ContentError> {
        let authors = Arc::clone(&self.authors);
        with_retry(&self.retry, self.retry.max_attempts, "author_posts_count", || {
            let authors = Arc::clone(&authors);
            async move { authors.posts_count(author_id).await.map_err(ContentError::from) }
        })
        .await
    }

    // ---- internals ----

    async fn published_corpus(&self) -> Result<Vec<Post>, ContentError> {
        let posts = Arc::clone(&self.posts);
        with_retry(&self.retry, self.retry.max_attempts, "published_corpus", || {
            let posts = Arc::clone(&posts);
            async move {
                posts
                    .find_all(&PostFilter::Published)
                    .await
                    .map_err(ContentError::from)
            }
        })
        .await
    }

    /// Side-effect-free post fetch, used by commands that must inspect the
    /// current document before acting.
    async fn fetch_post(&self, id: Uuid) -> Result<Option<Post>, ContentError> {
        let posts = Arc::clone(&self.posts);
        with_retry(&self.retry, self.retry.max_attempts, "fetch_post", || {
            let posts = Arc::clone(&posts);
            async move { posts.find_by_id(id).await.map_err(ContentError::from) }
        })
        .await
    }

    async fn shift_category_count(&self, category_id: Uuid, delta: i64) -> Result<(), ContentError> {
        let categories = Arc::clone(&self.categories);
        let result = with_retry(&self.retry, INCREMENT_ATTEMPTS, "category_posts_count", || {
            let categories = Arc::clone(&categories);
            async move {
                categories
                    .increment_posts_count(category_id, delta)
                    .await
                    .map_err(ContentError::from)
            }
        })
        .await;
        match result {
            Ok(Some(_)) => Ok(()),
            // A category that vanished while referenced is a data error, not
            // something to hide.
            Ok(None) => {
                tracing::error!(category_id = %category_id, "Counter update hit a missing category");
                Err(ContentError::StorageUnavailable(format!(
                    "category {category_id} missing during counter update"
                )))
            }
            Err(err) => {
                tracing::error!(category_id = %category_id, error = %err, "Category counter update failed");
                Err(err)
            }
        }
    }

    async fn shift_post_counters(
        &self,
        author_id: Uuid,
        category_id: Uuid,
        delta: i64,
    ) -> Result<(), ContentError> {
        self.shift_category_count(category_id, delta).await?;

        let authors = Arc::clone(&self.authors);
        with_retry(&self.retry, INCREMENT_ATTEMPTS, "author_posts_count", || {
            let authors = Arc::clone(&authors);
            async move {
                authors
                    .increment_posts_count(author_id, delta)
                    .await
                    .map_err(ContentError::from)
            }
        })
        .await
        .map(|_| ())
        .inspect_err(|err| {
            tracing::error!(author_id = %author_id, error = %err, "Author counter update failed");
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quill_core::domain::CategoryDraft;

    fn author() -> Principal {
        Principal::new(Uuid::new_v4(), "olena", Some("https://img.example/olena.png".into()))
    }

    fn long_content() -> String {
        "The quick brown fox jumps over the lazy dog. ".repeat(4)
    }

    fn draft(title: &str, category_id: Uuid) -> PostDraft {
        PostDraft {
            title: title.to_string(),
            content: long_content(),
            excerpt: None,
            category_id,
            tags: vec!["rust".into()],
            featured_image: None,
            status: PostStatus::Published,
        }
    }

    async fn repo_with_category() -> (ContentRepository, Category) {
        let repo = ContentRepository::in_memory();
        let category = repo
            .create_category(CategoryDraft {
                name: "Tech".into(),
                description: Some("Technology posts".into()),
                parent_id: None,
            })
            .await
            .unwrap();
        (repo, category)
    }

    #[tokio::test]
    async fn get_by_id_counts_every_view() {
        let (repo, category) = repo_with_category().await;
        let user = author();
        let post = repo.create_post(draft("Hello World", category.id), &user).await.unwrap();
        assert_eq!(post.statistics.views, 0);

        let first = repo.get_by_id(post.id).await.unwrap().unwrap();
        assert_eq!(first.statistics.views, 1);
        let second = repo.get_by_id(post.id).await.unwrap().unwrap();
        assert_eq!(second.statistics.views, 2);

        let page = repo
            .list_published(&PageRequest::new(1, 10).unwrap())
            .await
            .unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].id, post.id);
    }

    #[tokio::test]
    async fn get_by_id_on_missing_post_is_none() {
        let (repo, _) = repo_with_category().await;
        assert!(repo.get_by_id(Uuid::new_v4()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn second_post_with_colliding_slug_fails() {
        let (repo, category) = repo_with_category().await;
        let user = author();
        repo.create_post(draft("Same Title!", category.id), &user).await.unwrap();
        let err = repo
            .create_post(draft("Same... Title", category.id), &user)
            .await
            .unwrap_err();
        assert!(matches!(err, ContentError::DuplicateSlug(slug) if slug == "same-title"));
    }

    #[tokio::test]
    async fn missing_category_fails_create_without_side_effects() {
        let (repo, _) = repo_with_category().await;
        let user = author();
        let ghost = Uuid::new_v4();
        let err = repo.create_post(draft("Orphan", ghost), &user).await.unwrap_err();
        assert!(matches!(err, ContentError::CategoryNotFound(id) if id == ghost));

        let page = repo
            .list_published(&PageRequest::new(1, 10).unwrap())
            .await
            .unwrap();
        assert_eq!(page.total, 0);
        assert_eq!(repo.author_posts_count(user.id).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn create_maintains_author_and_category_counters() {
        let (repo, category) = repo_with_category().await;
        let user = author();
        repo.create_post(draft("First", category.id), &user).await.unwrap();
        repo.create_post(draft("Second", category.id), &user).await.unwrap();

        assert_eq!(repo.author_posts_count(user.id).await.unwrap(), 2);
        let refreshed = repo.get_category(category.id).await.unwrap().unwrap();
        assert_eq!(refreshed.statistics.posts_count, 2);
    }

    #[tokio::test]
    async fn update_by_non_author_is_forbidden_and_changes_nothing() {
        let (repo, category) = repo_with_category().await;
        let alice = author();
        let post = repo.create_post(draft("Owned", category.id), &alice).await.unwrap();

        let bob = Principal::new(Uuid::new_v4(), "bob", None);
        let patch = PostPatch {
            title: Patch::Set("Taken Over".into()),
            ..Default::default()
        };
        let err = repo.update_post(post.id, patch, &bob).await.unwrap_err();
        assert!(matches!(err, ContentError::Forbidden));

        let unchanged = repo.fetch_post(post.id).await.unwrap().unwrap();
        assert_eq!(unchanged.title, "Owned");
    }

    #[tokio::test]
    async fn partial_update_touches_only_present_fields() {
        let (repo, category) = repo_with_category().await;
        let user = author();
        let mut d = draft("Patchable", category.id);
        d.featured_image = Some("cover.png".into());
        let post = repo.create_post(d, &user).await.unwrap();

        let patch = PostPatch {
            title: Patch::Set("Patched Title".into()),
            featured_image: Patch::Clear,
            ..Default::default()
        };
        let updated = repo.update_post(post.id, patch, &user).await.unwrap();
        assert_eq!(updated.title, "Patched Title");
        assert_eq!(updated.featured_image, None);
        // untouched fields survive, and the slug never moves
        assert_eq!(updated.content, post.content);
        assert_eq!(updated.slug, "patchable");
        assert!(updated.updated_at > post.updated_at);
    }

    #[tokio::test]
    async fn updated_tags_keep_set_semantics() {
        let (repo, category) = repo_with_category().await;
        let user = author();
        let post = repo.create_post(draft("Retagged", category.id), &user).await.unwrap();

        let patch = PostPatch {
            tags: Patch::Set(vec!["rust".into(), "rust".into(), "web".into()]),
            ..Default::default()
        };
        let updated = repo.update_post(post.id, patch, &user).await.unwrap();
        assert_eq!(updated.tags, vec!["rust".to_string(), "web".to_string()]);

        // a post counts once per tag, however often the tag was sent
        let tags = repo.tag_distribution(10).await.unwrap();
        let rust = tags.iter().find(|t| t.tag == "rust").unwrap();
        assert_eq!(rust.count, 1);
    }

    #[tokio::test]
    async fn clearing_a_required_field_is_rejected() {
        let (repo, category) = repo_with_category().await;
        let user = author();
        let post = repo.create_post(draft("Keeper", category.id), &user).await.unwrap();

        let patch = PostPatch {
            title: Patch::Clear,
            ..Default::default()
        };
        let err = repo.update_post(post.id, patch, &user).await.unwrap_err();
        assert!(matches!(err, ContentError::ValidationFailed(_)));
    }

    #[tokio::test]
    async fn category_change_resolves_and_moves_counters() {
        let (repo, tech) = repo_with_category().await;
        let user = author();
        let post = repo.create_post(draft("Mover", tech.id), &user).await.unwrap();

        let life = repo
            .create_category(CategoryDraft {
                name: "Life".into(),
                description: None,
                parent_id: None,
            })
            .await
            .unwrap();

        // an unresolvable category fails the whole update
        let ghost = Uuid::new_v4();
        let patch = PostPatch {
            category_id: Patch::Set(ghost),
            ..Default::default()
        };
        let err = repo.update_post(post.id, patch, &user).await.unwrap_err();
        assert!(matches!(err, ContentError::CategoryNotFound(id) if id == ghost));

        let patch = PostPatch {
            category_id: Patch::Set(life.id),
            ..Default::default()
        };
        let updated = repo.update_post(post.id, patch, &user).await.unwrap();
        assert_eq!(updated.category.category_id, life.id);
        assert_eq!(updated.category.name, "Life");

        let tech = repo.get_category(tech.id).await.unwrap().unwrap();
        let life = repo.get_category(life.id).await.unwrap().unwrap();
        assert_eq!(tech.statistics.posts_count, 0);
        assert_eq!(life.statistics.posts_count, 1);
    }

    #[tokio::test]
    async fn publishing_a_draft_sets_published_at() {
        let (repo, category) = repo_with_category().await;
        let user = author();
        let mut d = draft("Sleeper", category.id);
        d.status = PostStatus::Draft;
        let post = repo.create_post(d, &user).await.unwrap();
        assert!(post.published_at.is_none());

        let patch = PostPatch {
            status: Patch::Set(PostStatus::Published),
            ..Default::default()
        };
        let updated = repo.update_post(post.id, patch, &user).await.unwrap();
        assert!(updated.published_at.is_some());
    }

    #[tokio::test]
    async fn delete_is_idempotent_and_guarded() {
        let (repo, category) = repo_with_category().await;
        let alice = author();
        let post = repo.create_post(draft("Doomed", category.id), &alice).await.unwrap();

        let bob = Principal::new(Uuid::new_v4(), "bob", None);
        assert!(matches!(
            repo.delete_post(post.id, &bob).await,
            Err(ContentError::Forbidden)
        ));

        assert!(repo.delete_post(post.id, &alice).await.unwrap());
        assert!(!repo.delete_post(post.id, &alice).await.unwrap());

        assert_eq!(repo.author_posts_count(alice.id).await.unwrap(), 0);
        let refreshed = repo.get_category(category.id).await.unwrap().unwrap();
        assert_eq!(refreshed.statistics.posts_count, 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_comments_are_never_lost() {
        let (repo, category) = repo_with_category().await;
        let user = author();
        let post = repo.create_post(draft("Busy Thread", category.id), &user).await.unwrap();

        let repo = Arc::new(repo);
        let mut handles = Vec::new();
        for i in 0..25 {
            let repo = Arc::clone(&repo);
            let reader = Principal::new(Uuid::new_v4(), format!("reader-{i}"), None);
            let post_id = post.id;
            handles.push(tokio::spawn(async move {
                repo.add_comment(post_id, &reader, "well said").await.unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let post = repo.fetch_post(post.id).await.unwrap().unwrap();
        assert_eq!(post.statistics.comments_count, 25);
        assert_eq!(post.comments.len(), 25);
    }

    #[tokio::test]
    async fn comment_on_missing_post_is_not_found() {
        let (repo, _) = repo_with_category().await;
        let err = repo
            .add_comment(Uuid::new_v4(), &author(), "hello?")
            .await
            .unwrap_err();
        assert!(matches!(err, ContentError::NotFound { entity: "post", .. }));
    }

    #[tokio::test]
    async fn likes_accumulate() {
        let (repo, category) = repo_with_category().await;
        let post = repo.create_post(draft("Likeable", category.id), &author()).await.unwrap();
        repo.like_post(post.id).await.unwrap();
        let post = repo.like_post(post.id).await.unwrap();
        assert_eq!(post.statistics.likes, 2);
    }

    #[tokio::test]
    async fn pagination_shape_holds_over_the_repo() {
        let (repo, category) = repo_with_category().await;
        let user = author();
        for i in 0..13 {
            repo.create_post(draft(&format!("Numbered Post {i}"), category.id), &user)
                .await
                .unwrap();
        }

        let page = repo
            .list_published(&PageRequest::new(3, 5).unwrap())
            .await
            .unwrap();
        assert_eq!(page.total, 13);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.items.len(), 3);

        let beyond = repo
            .list_published(&PageRequest::new(9, 5).unwrap())
            .await
            .unwrap();
        assert!(beyond.items.is_empty());
        assert_eq!(beyond.total, 13);
        assert_eq!(beyond.total_pages, 3);
    }

    #[tokio::test]
    async fn search_is_case_insensitive_and_published_only() {
        let (repo, category) = repo_with_category().await;
        let user = author();
        repo.create_post(draft("Async Patterns in Rust", category.id), &user)
            .await
            .unwrap();
        let mut hidden = draft("Async Secrets", category.id);
        hidden.status = PostStatus::Draft;
        repo.create_post(hidden, &user).await.unwrap();

        let page = repo
            .search("ASYNC", &PageRequest::new(1, 10).unwrap())
            .await
            .unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].title, "Async Patterns in Rust");

        assert!(matches!(
            repo.search("   ", &PageRequest::new(1, 10).unwrap()).await,
            Err(ContentError::ValidationFailed(_))
        ));
    }

    #[tokio::test]
    async fn category_and_tag_listings_filter_published_posts() {
        let (repo, tech) = repo_with_category().await;
        let user = author();
        let mut tagged = draft("Tagged Post", tech.id);
        tagged.tags = vec!["tokio".into(), "rust".into()];
        repo.create_post(tagged, &user).await.unwrap();
        repo.create_post(draft("Plain Post", tech.id), &user).await.unwrap();

        let by_cat = repo
            .list_by_category(tech.id, &PageRequest::new(1, 10).unwrap())
            .await
            .unwrap();
        assert_eq!(by_cat.total, 2);

        let by_tag = repo
            .list_by_tag("tokio", &PageRequest::new(1, 10).unwrap())
            .await
            .unwrap();
        assert_eq!(by_tag.total, 1);

        assert!(matches!(
            repo.list_by_category(Uuid::new_v4(), &PageRequest::new(1, 10).unwrap())
                .await,
            Err(ContentError::CategoryNotFound(_))
        ));
    }

    #[tokio::test]
    async fn author_snapshot_survives_a_rename() {
        let (repo, category) = repo_with_category().await;
        let before = author();
        let post = repo.create_post(draft("Historical", category.id), &before).await.unwrap();

        // The same user comes back with a new display name; the post keeps
        // the name it was written under.
        let renamed = Principal::new(before.id, "olena-renamed", None);
        let patch = PostPatch {
            content: Patch::Set(long_content() + " Updated."),
            ..Default::default()
        };
        let updated = repo.update_post(post.id, patch, &renamed).await.unwrap();
        assert_eq!(updated.author.username, "olena");
    }

    #[tokio::test]
    async fn duplicate_category_name_is_rejected() {
        let (repo, _) = repo_with_category().await;
        let err = repo
            .create_category(CategoryDraft {
                name: "Tech".into(),
                description: None,
                parent_id: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ContentError::ValidationFailed(_)));
    }

    #[tokio::test]
    async fn aggregations_run_against_the_published_corpus() {
        let (repo, category) = repo_with_category().await;
        let prolific = Principal::new(Uuid::new_v4(), "prolific", None);
        let casual = Principal::new(Uuid::new_v4(), "casual", None);

        repo.create_post(draft("One", category.id), &prolific).await.unwrap();
        repo.create_post(draft("Two", category.id), &prolific).await.unwrap();
        let third = repo.create_post(draft("Three", category.id), &casual).await.unwrap();
        let mut unpublished = draft("Four", category.id);
        unpublished.status = PostStatus::Draft;
        repo.create_post(unpublished, &prolific).await.unwrap();

        repo.add_comment(third.id, &prolific, "nice one").await.unwrap();
        repo.add_comment(third.id, &casual, "thanks").await.unwrap();

        let authors = repo.top_authors(10).await.unwrap();
        assert_eq!(authors.len(), 2);
        assert_eq!(authors[0].username, "prolific");
        assert_eq!(authors[0].posts, 2);

        let categories = repo.popular_categories().await.unwrap();
        assert_eq!(categories.len(), 1);
        assert_eq!(categories[0].posts, 3);

        let comments = repo.comment_stats().await.unwrap();
        assert_eq!(comments.total_posts, 3);
        assert_eq!(comments.total_comments, 2);
        assert_eq!(comments.max_comments_on_post, 2);

        let tags = repo.tag_distribution(10).await.unwrap();
        assert_eq!(tags[0].tag, "rust");
        assert_eq!(tags[0].count, 3);
    }

    #[tokio::test]
    async fn comment_stats_on_empty_corpus_is_zeroed() {
        let repo = ContentRepository::in_memory();
        let stats = repo.comment_stats().await.unwrap();
        assert_eq!(stats.total_posts, 0);
        assert_eq!(stats.average_comments_per_post, 0.0);
    }
}
