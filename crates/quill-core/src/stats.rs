//! Aggregation engine - pure rollups over the post corpus.
//!
//! Every function filters to published posts before grouping; drafts and
//! archived posts never contribute to public statistics. All orderings are
//! deterministic: counts descend, ties break on the group key ascending.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::Post;

/// Per-author rollup across published posts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorRollup {
    pub author_id: Uuid,
    pub username: String,
    pub posts: u64,
    pub views: u64,
    pub likes: u64,
}

/// Per-category rollup across published posts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryRollup {
    pub category_id: Uuid,
    pub name: String,
    pub posts: u64,
    pub views: u64,
    pub avg_likes: f64,
}

/// Corpus-wide comment statistics.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CommentStats {
    pub total_posts: u64,
    pub total_comments: u64,
    pub average_comments_per_post: f64,
    pub max_comments_on_post: u64,
}

/// Per-tag rollup across published posts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TagRollup {
    pub tag: String,
    pub count: u64,
    pub avg_views: f64,
}

fn published(posts: &[Post]) -> impl Iterator<Item = &Post> {
    posts.iter().filter(|p| p.is_published())
}

/// Group published posts by author, sorted descending by post count,
/// ties broken ascending by author id, truncated to `limit`.
pub fn top_authors(posts: &[Post], limit: usize) -> Vec<AuthorRollup> {
    // BTreeMap keeps the key order stable, which settles ties for free.
    let mut groups: BTreeMap<Uuid, AuthorRollup> = BTreeMap::new();
    for post in published(posts) {
        let entry = groups
            .entry(post.author.user_id)
            .or_insert_with(|| AuthorRollup {
                author_id: post.author.user_id,
                username: post.author.username.clone(),
                posts: 0,
                views: 0,
                likes: 0,
            });
        entry.posts += 1;
        entry.views += post.statistics.views;
        entry.likes += post.statistics.likes;
    }

    let mut rollups: Vec<AuthorRollup> = groups.into_values().collect();
    rollups.sort_by(|a, b| b.posts.cmp(&a.posts).then(a.author_id.cmp(&b.author_id)));
    rollups.truncate(limit);
    rollups
}

/// Group published posts by category, sorted descending by post count,
/// ties broken ascending by category id.
pub fn popular_categories(posts: &[Post]) -> Vec<CategoryRollup> {
    let mut groups: BTreeMap<Uuid, (CategoryRollup, u64)> = BTreeMap::new();
    for post in published(posts) {
        let (entry, likes_sum) = groups
            .entry(post.category.category_id)
            .or_insert_with(|| {
                (
                    CategoryRollup {
                        category_id: post.category.category_id,
                        name: post.category.name.clone(),
                        posts: 0,
                        views: 0,
                        avg_likes: 0.0,
                    },
                    0,
                )
            });
        entry.posts += 1;
        entry.views += post.statistics.views;
        *likes_sum += post.statistics.likes;
    }

    let mut rollups: Vec<CategoryRollup> = groups
        .into_values()
        .map(|(mut rollup, likes_sum)| {
            rollup.avg_likes = likes_sum as f64 / rollup.posts as f64;
            rollup
        })
        .collect();
    rollups.sort_by(|a, b| {
        b.posts
            .cmp(&a.posts)
            .then(a.category_id.cmp(&b.category_id))
    });
    rollups
}

/// Comment totals across published posts. Averages to zero on an empty
/// corpus instead of dividing by it.
pub fn comment_stats(posts: &[Post]) -> CommentStats {
    let mut stats = CommentStats::default();
    for post in published(posts) {
        stats.total_posts += 1;
        stats.total_comments += post.statistics.comments_count;
        stats.max_comments_on_post = stats.max_comments_on_post.max(post.statistics.comments_count);
    }
    if stats.total_posts > 0 {
        stats.average_comments_per_post = stats.total_comments as f64 / stats.total_posts as f64;
    }
    stats
}

/// Explode tag sets into one row per tag with occurrence count and average
/// views, sorted descending by count, ties ascending by tag, truncated to
/// `limit`.
pub fn tag_distribution(posts: &[Post], limit: usize) -> Vec<TagRollup> {
    let mut groups: BTreeMap<&str, (u64, u64)> = BTreeMap::new();
    for post in published(posts) {
        for tag in &post.tags {
            let (count, views) = groups.entry(tag.as_str()).or_insert((0, 0));
            *count += 1;
            *views += post.statistics.views;
        }
    }

    let mut rollups: Vec<TagRollup> = groups
        .into_iter()
        .map(|(tag, (count, views))| TagRollup {
            tag: tag.to_string(),
            count,
            avg_views: views as f64 / count as f64,
        })
        .collect();
    rollups.sort_by(|a, b| b.count.cmp(&a.count).then(a.tag.cmp(&b.tag)));
    rollups.truncate(limit);
    rollups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        AuthorSnapshot, CategorySnapshot, PostStatistics, PostStatus,
    };
    use chrono::Utc;

    fn uuid_from(n: u128) -> Uuid {
        Uuid::from_u128(n)
    }

    fn post(
        author: u128,
        category: u128,
        status: PostStatus,
        views: u64,
        likes: u64,
        comments: u64,
        tags: &[&str],
    ) -> Post {
        let now = Utc::now();
        Post {
            id: Uuid::new_v4(),
            title: "t".into(),
            slug: Uuid::new_v4().to_string(),
            content: "c".into(),
            excerpt: "e".into(),
            author: AuthorSnapshot {
                user_id: uuid_from(author),
                username: format!("author-{author}"),
                avatar_url: None,
            },
            category: CategorySnapshot {
                category_id: uuid_from(category),
                name: format!("cat-{category}"),
            },
            tags: tags.iter().map(|t| t.to_string()).collect(),
            featured_image: None,
            status,
            comments: Vec::new(),
            statistics: PostStatistics {
                views,
                likes,
                comments_count: comments,
            },
            created_at: now,
            updated_at: now,
            published_at: Some(now),
        }
    }

    #[test]
    fn top_authors_sorts_and_breaks_ties_by_id() {
        let posts = vec![
            post(2, 1, PostStatus::Published, 10, 1, 0, &[]),
            post(1, 1, PostStatus::Published, 5, 2, 0, &[]),
            post(3, 1, PostStatus::Published, 0, 0, 0, &[]),
            post(3, 1, PostStatus::Published, 7, 3, 0, &[]),
        ];
        let rollups = top_authors(&posts, 10);
        assert_eq!(rollups.len(), 3);
        // author 3 has two posts, then the 1-post tie resolves 1 before 2
        assert_eq!(rollups[0].author_id, uuid_from(3));
        assert_eq!(rollups[0].posts, 2);
        assert_eq!(rollups[0].views, 7);
        assert_eq!(rollups[1].author_id, uuid_from(1));
        assert_eq!(rollups[2].author_id, uuid_from(2));
    }

    #[test]
    fn top_authors_respects_limit_and_published_filter() {
        let posts = vec![
            post(1, 1, PostStatus::Published, 0, 0, 0, &[]),
            post(2, 1, PostStatus::Published, 0, 0, 0, &[]),
            post(3, 1, PostStatus::Draft, 0, 0, 0, &[]),
            post(4, 1, PostStatus::Archived, 0, 0, 0, &[]),
        ];
        let rollups = top_authors(&posts, 1);
        assert_eq!(rollups.len(), 1);
        assert!(top_authors(&posts, 10).len() == 2);
    }

    #[test]
    fn popular_categories_averages_likes() {
        let posts = vec![
            post(1, 7, PostStatus::Published, 10, 4, 0, &[]),
            post(1, 7, PostStatus::Published, 20, 2, 0, &[]),
            post(1, 8, PostStatus::Published, 1, 9, 0, &[]),
        ];
        let rollups = popular_categories(&posts);
        assert_eq!(rollups[0].category_id, uuid_from(7));
        assert_eq!(rollups[0].posts, 2);
        assert_eq!(rollups[0].views, 30);
        assert!((rollups[0].avg_likes - 3.0).abs() < f64::EPSILON);
        assert_eq!(rollups[1].category_id, uuid_from(8));
    }

    #[test]
    fn comment_stats_guards_empty_corpus() {
        let stats = comment_stats(&[]);
        assert_eq!(stats.total_posts, 0);
        assert_eq!(stats.average_comments_per_post, 0.0);

        let drafts = vec![post(1, 1, PostStatus::Draft, 0, 0, 5, &[])];
        let stats = comment_stats(&drafts);
        assert_eq!(stats.total_posts, 0);
        assert_eq!(stats.average_comments_per_post, 0.0);
    }

    #[test]
    fn comment_stats_tracks_max_and_average() {
        let posts = vec![
            post(1, 1, PostStatus::Published, 0, 0, 3, &[]),
            post(1, 1, PostStatus::Published, 0, 0, 7, &[]),
        ];
        let stats = comment_stats(&posts);
        assert_eq!(stats.total_comments, 10);
        assert_eq!(stats.max_comments_on_post, 7);
        assert!((stats.average_comments_per_post - 5.0).abs() < f64::EPSILON);
    }

    #[test]
    fn tag_distribution_counts_and_averages() {
        let posts = vec![
            post(1, 1, PostStatus::Published, 10, 0, 0, &["rust", "web"]),
            post(1, 1, PostStatus::Published, 30, 0, 0, &["rust"]),
            post(1, 1, PostStatus::Archived, 99, 0, 0, &["rust"]),
        ];
        let rollups = tag_distribution(&posts, 10);
        assert_eq!(rollups.len(), 2);
        assert_eq!(rollups[0].tag, "rust");
        assert_eq!(rollups[0].count, 2);
        assert!((rollups[0].avg_views - 20.0).abs() < f64::EPSILON);
        assert_eq!(rollups[1].tag, "web");

        assert_eq!(tag_distribution(&posts, 1).len(), 1);
    }
}
