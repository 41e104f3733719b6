//! MongoDB document store adapter.
//!
//! Slug/name uniqueness is enforced by unique indexes, so check-then-act
//! races on insert still surface as `DuplicateKey`. Counters go through
//! `$inc` via find-one-and-update; the comment append is a single
//! conditional update, so the embed bound, the push and the counter bump
//! are one atomic server-side operation.

use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::{Document, doc, to_bson};
use mongodb::error::{Error as MongoError, ErrorKind, WriteFailure};
use mongodb::options::{ClientOptions, IndexOptions, ReturnDocument};
use mongodb::{Client, Collection, IndexModel};
use uuid::Uuid;

use quill_core::domain::{Category, Comment, Post};
use quill_core::error::StoreError;
use quill_core::pagination::PageRequest;
use quill_core::ports::{
    AuthorStatsStore, CategoryStore, CommentAppend, PostCounter, PostFilter, PostStore,
};

use super::document::{AuthorStatsDoc, CategoryDoc, CommentDoc, PostDoc};
use crate::config::StoreConfig;

pub struct MongoStore {
    posts: Collection<PostDoc>,
    categories: Collection<CategoryDoc>,
    author_stats: Collection<AuthorStatsDoc>,
}

fn map_err(err: MongoError) -> StoreError {
    match err.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(write_err)) if write_err.code == 11000 => {
            StoreError::DuplicateKey {
                index: index_from_message(&write_err.message),
            }
        }
        ErrorKind::Command(cmd_err) if cmd_err.code == 11000 => StoreError::DuplicateKey {
            index: index_from_message(&cmd_err.message),
        },
        ErrorKind::ServerSelection { .. } => StoreError::Timeout,
        ErrorKind::BsonSerialization(e) => StoreError::Serialization(e.to_string()),
        ErrorKind::BsonDeserialization(e) => StoreError::Serialization(e.to_string()),
        _ => StoreError::Unavailable(err.to_string()),
    }
}

/// Pull the index name out of a duplicate-key message
/// ("E11000 duplicate key error ... index: slug dup key ...").
fn index_from_message(message: &str) -> String {
    message
        .split("index: ")
        .nth(1)
        .and_then(|rest| rest.split_whitespace().next())
        .unwrap_or("unknown")
        .to_string()
}

/// Escape regex metacharacters so a search query is matched literally.
fn escape_regex(query: &str) -> String {
    let mut escaped = String::with_capacity(query.len());
    for c in query.chars() {
        if "\\.^$|?*+()[]{}".contains(c) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn filter_to_doc(filter: &PostFilter) -> Document {
    match filter {
        PostFilter::All => doc! {},
        PostFilter::Published => doc! { "status": "published" },
        PostFilter::Category(id) => doc! {
            "status": "published",
            "category.category_id": id.to_string(),
        },
        PostFilter::Tag(tag) => doc! {
            "status": "published",
            "tags": tag.as_str(),
        },
        PostFilter::Text(query) => {
            let pattern = escape_regex(query);
            doc! {
                "status": "published",
                "$or": [
                    { "title": { "$regex": pattern.as_str(), "$options": "i" } },
                    { "content": { "$regex": pattern.as_str(), "$options": "i" } },
                ],
            }
        }
    }
}

impl MongoStore {
    /// Connect and create the unique/sort indexes the contract relies on.
    pub async fn connect(config: &StoreConfig) -> Result<Self, StoreError> {
        tracing::info!(db = %config.db_name, "Connecting to MongoDB");
        let mut options = ClientOptions::parse(&config.url).await.map_err(map_err)?;
        options.server_selection_timeout = Some(config.op_timeout);
        let client = Client::with_options(options).map_err(map_err)?;
        let db = client.database(&config.db_name);

        let store = Self {
            posts: db.collection("posts"),
            categories: db.collection("categories"),
            author_stats: db.collection("author_stats"),
        };
        store.ensure_indexes().await?;
        tracing::info!("MongoDB store ready");
        Ok(store)
    }

    async fn ensure_indexes(&self) -> Result<(), StoreError> {
        let unique = |name: &str| {
            IndexOptions::builder()
                .unique(true)
                .name(name.to_string())
                .build()
        };

        self.posts
            .create_index(
                IndexModel::builder()
                    .keys(doc! { "slug": 1 })
                    .options(unique("slug"))
                    .build(),
            )
            .await
            .map_err(map_err)?;
        self.posts
            .create_index(
                IndexModel::builder()
                    .keys(doc! { "status": 1, "created_at": -1 })
                    .build(),
            )
            .await
            .map_err(map_err)?;

        self.categories
            .create_index(
                IndexModel::builder()
                    .keys(doc! { "name": 1 })
                    .options(unique("name"))
                    .build(),
            )
            .await
            .map_err(map_err)?;
        self.categories
            .create_index(
                IndexModel::builder()
                    .keys(doc! { "slug": 1 })
                    .options(unique("slug"))
                    .build(),
            )
            .await
            .map_err(map_err)?;

        Ok(())
    }
}

#[async_trait]
impl PostStore for MongoStore {
    async fn insert(&self, post: Post) -> Result<Post, StoreError> {
        let doc = PostDoc::from(post);
        self.posts.insert_one(&doc).await.map_err(map_err)?;
        doc.try_into()
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, StoreError> {
        self.posts
            .find_one(doc! { "_id": id.to_string() })
            .await
            .map_err(map_err)?
            .map(TryInto::try_into)
            .transpose()
    }

    async fn replace(&self, post: Post) -> Result<Post, StoreError> {
        let doc = PostDoc::from(post);
        let result = self
            .posts
            .replace_one(doc! { "_id": doc.id.as_str() }, &doc)
            .await
            .map_err(map_err)?;
        if result.matched_count == 0 {
            return Err(StoreError::NotFound);
        }
        doc.try_into()
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let result = self
            .posts
            .delete_one(doc! { "_id": id.to_string() })
            .await
            .map_err(map_err)?;
        Ok(result.deleted_count > 0)
    }

    async fn find_page(
        &self,
        filter: &PostFilter,
        page: &PageRequest,
    ) -> Result<(Vec<Post>, u64), StoreError> {
        let filter_doc = filter_to_doc(filter);
        let total = self
            .posts
            .count_documents(filter_doc.clone())
            .await
            .map_err(map_err)?;

        let docs: Vec<PostDoc> = self
            .posts
            .find(filter_doc)
            .sort(doc! { "created_at": -1, "_id": 1 })
            .skip(page.skip())
            .limit(page.limit() as i64)
            .await
            .map_err(map_err)?
            .try_collect()
            .await
            .map_err(map_err)?;

        let posts = docs
            .into_iter()
            .map(TryInto::try_into)
            .collect::<Result<Vec<Post>, _>>()?;
        Ok((posts, total))
    }

    async fn find_all(&self, filter: &PostFilter) -> Result<Vec<Post>, StoreError> {
        let docs: Vec<PostDoc> = self
            .posts
            .find(filter_to_doc(filter))
            .await
            .map_err(map_err)?
            .try_collect()
            .await
            .map_err(map_err)?;
        docs.into_iter().map(TryInto::try_into).collect()
    }

    async fn increment_counter(
        &self,
        id: Uuid,
        counter: PostCounter,
        delta: i64,
    ) -> Result<Option<Post>, StoreError> {
        let field = match counter {
            PostCounter::Views => "statistics.views",
            PostCounter::Likes => "statistics.likes",
        };
        let mut filter = doc! { "_id": id.to_string() };
        if delta < 0 {
            // Never let a counter go negative: decrement only when there is
            // room, otherwise report the document unchanged.
            filter.insert(field, doc! { "$gte": -delta });
        }
        let updated = self
            .posts
            .find_one_and_update(filter, doc! { "$inc": { field: delta } })
            .return_document(ReturnDocument::After)
            .await
            .map_err(map_err)?;
        match updated {
            Some(doc) => Ok(Some(doc.try_into()?)),
            None if delta < 0 => PostStore::find_by_id(self, id).await,
            None => Ok(None),
        }
    }

    async fn push_comment(
        &self,
        id: Uuid,
        comment: Comment,
        max_comments: usize,
    ) -> Result<Option<CommentAppend>, StoreError> {
        let comment_bson = to_bson(&CommentDoc::from(comment))
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        let updated = self
            .posts
            .find_one_and_update(
                doc! {
                    "_id": id.to_string(),
                    "statistics.comments_count": { "$lt": max_comments as i64 },
                },
                doc! {
                    "$push": { "comments": comment_bson },
                    "$inc": { "statistics.comments_count": 1 },
                },
            )
            .return_document(ReturnDocument::After)
            .await
            .map_err(map_err)?;

        match updated {
            Some(doc) => Ok(Some(CommentAppend {
                post: doc.try_into()?,
                appended: true,
            })),
            // Either the post is gone or the embed bound is hit.
            None => Ok(PostStore::find_by_id(self, id).await?.map(|post| CommentAppend {
                post,
                appended: false,
            })),
        }
    }
}

#[async_trait]
impl CategoryStore for MongoStore {
    async fn insert(&self, category: Category) -> Result<Category, StoreError> {
        let doc = CategoryDoc::from(category);
        self.categories.insert_one(&doc).await.map_err(map_err)?;
        doc.try_into()
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Category>, StoreError> {
        self.categories
            .find_one(doc! { "_id": id.to_string() })
            .await
            .map_err(map_err)?
            .map(TryInto::try_into)
            .transpose()
    }

    async fn find_all(&self) -> Result<Vec<Category>, StoreError> {
        let docs: Vec<CategoryDoc> = self
            .categories
            .find(doc! {})
            .sort(doc! { "name": 1 })
            .await
            .map_err(map_err)?
            .try_collect()
            .await
            .map_err(map_err)?;
        docs.into_iter().map(TryInto::try_into).collect()
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let result = self
            .categories
            .delete_one(doc! { "_id": id.to_string() })
            .await
            .map_err(map_err)?;
        Ok(result.deleted_count > 0)
    }

    async fn increment_posts_count(
        &self,
        id: Uuid,
        delta: i64,
    ) -> Result<Option<Category>, StoreError> {
        let mut filter = doc! { "_id": id.to_string() };
        if delta < 0 {
            filter.insert("posts_count", doc! { "$gte": -delta });
        }
        let updated = self
            .categories
            .find_one_and_update(filter, doc! { "$inc": { "posts_count": delta } })
            .return_document(ReturnDocument::After)
            .await
            .map_err(map_err)?;
        match updated {
            Some(doc) => Ok(Some(doc.try_into()?)),
            None if delta < 0 => CategoryStore::find_by_id(self, id).await,
            None => Ok(None),
        }
    }
}

#[async_trait]
impl AuthorStatsStore for MongoStore {
    async fn increment_posts_count(&self, author_id: Uuid, delta: i64) -> Result<u64, StoreError> {
        let mut filter = doc! { "_id": author_id.to_string() };
        if delta < 0 {
            filter.insert("posts_count", doc! { "$gte": -delta });
        }
        let updated = self
            .author_stats
            .find_one_and_update(filter, doc! { "$inc": { "posts_count": delta } })
            .return_document(ReturnDocument::After)
            .upsert(delta >= 0)
            .await
            .map_err(map_err)?;
        match updated {
            Some(doc) => Ok(doc.posts_count.max(0) as u64),
            None => self.posts_count(author_id).await,
        }
    }

    async fn posts_count(&self, author_id: Uuid) -> Result<u64, StoreError> {
        Ok(self
            .author_stats
            .find_one(doc! { "_id": author_id.to_string() })
            .await
            .map_err(map_err)?
            .map(|doc| doc.posts_count.max(0) as u64)
            .unwrap_or(0))
    }
}
