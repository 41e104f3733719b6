use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ContentError;
use crate::slug::generate_slug;

const NAME_MIN: usize = 2;
const NAME_MAX: usize = 50;

/// Denormalized category counters, maintained incrementally by post
/// lifecycle events - never recomputed per read.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CategoryStatistics {
    pub posts_count: u64,
}

/// Category entity. Name and slug are globally unique.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub parent_id: Option<Uuid>,
    #[serde(default)]
    pub statistics: CategoryStatistics,
    pub created_at: DateTime<Utc>,
}

/// Input for creating a category.
#[derive(Debug, Clone, Deserialize)]
pub struct CategoryDraft {
    pub name: String,
    pub description: Option<String>,
    pub parent_id: Option<Uuid>,
}

impl CategoryDraft {
    pub fn validate(&self) -> Result<(), ContentError> {
        let len = self.name.chars().count();
        if !(NAME_MIN..=NAME_MAX).contains(&len) {
            return Err(ContentError::ValidationFailed(format!(
                "category name must be {NAME_MIN}-{NAME_MAX} characters, got {len}"
            )));
        }
        Ok(())
    }
}

impl Category {
    /// Validate the draft and build a category with a derived slug.
    pub fn new(draft: CategoryDraft) -> Result<Self, ContentError> {
        draft.validate()?;
        let slug = generate_slug(&draft.name);
        if slug.is_empty() {
            return Err(ContentError::ValidationFailed(
                "category name does not produce a usable slug".into(),
            ));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            name: draft.name,
            slug,
            description: draft.description,
            parent_id: draft.parent_id,
            statistics: CategoryStatistics::default(),
            created_at: Utc::now(),
        })
    }
}
