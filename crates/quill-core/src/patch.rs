//! Explicit tri-state fields for partial updates.
//!
//! A JSON body that omits a field, sends `null`, and sends a value are three
//! different intents. `Patch<T>` makes that distinction a type instead of
//! runtime introspection of which fields were set.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

use crate::domain::PostStatus;

/// One updatable field: absent, explicit null, or a new value.
#[derive(Debug, Clone, PartialEq)]
pub enum Patch<T> {
    /// Field absent from the request - leave the current value untouched.
    Keep,
    /// Explicit `null` - clear the value. Only honored for optional fields.
    Clear,
    /// Replace with this value.
    Set(T),
}

// Manual impl: the derive would demand `T: Default` for no reason.
impl<T> Default for Patch<T> {
    fn default() -> Self {
        Patch::Keep
    }
}

impl<T> Patch<T> {
    pub fn is_keep(&self) -> bool {
        matches!(self, Patch::Keep)
    }

    /// Apply onto a required field: `Set` replaces, `Keep` and `Clear`
    /// leave it alone (the repository rejects `Clear` on required fields
    /// before getting here).
    pub fn apply_to(self, target: &mut T) {
        if let Patch::Set(value) = self {
            *target = value;
        }
    }

    /// Apply onto an optional field: `Set` replaces, `Clear` empties.
    pub fn apply_to_option(self, target: &mut Option<T>) {
        match self {
            Patch::Keep => {}
            Patch::Clear => *target = None,
            Patch::Set(value) => *target = Some(value),
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Patch<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        // A present field is either `null` (Clear) or a value (Set); a
        // missing field never reaches this impl - `#[serde(default)]` on the
        // containing struct produces Keep.
        Ok(match Option::<T>::deserialize(deserializer)? {
            None => Patch::Clear,
            Some(value) => Patch::Set(value),
        })
    }
}

impl<T: Serialize> Serialize for Patch<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            // Keep cannot round-trip as a value; containing structs skip it
            // with `skip_serializing_if = "Patch::is_keep"`.
            Patch::Keep | Patch::Clear => serializer.serialize_none(),
            Patch::Set(value) => serializer.serialize_some(value),
        }
    }
}

/// Partial update for a post. Absent fields stay untouched; the slug is
/// immutable and deliberately not patchable.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PostPatch {
    #[serde(default, skip_serializing_if = "Patch::is_keep")]
    pub title: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_keep")]
    pub content: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_keep")]
    pub excerpt: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_keep")]
    pub category_id: Patch<Uuid>,
    #[serde(default, skip_serializing_if = "Patch::is_keep")]
    pub tags: Patch<Vec<String>>,
    #[serde(default, skip_serializing_if = "Patch::is_keep")]
    pub featured_image: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_keep")]
    pub status: Patch<PostStatus>,
}

impl PostPatch {
    /// True when no field carries a change.
    pub fn is_empty(&self) -> bool {
        self.title.is_keep()
            && self.content.is_keep()
            && self.excerpt.is_keep()
            && self.category_id.is_keep()
            && self.tags.is_keep()
            && self.featured_image.is_keep()
            && self.status.is_keep()
    }
}
