//! # Quill Core
//!
//! The domain layer of the Quill content backend.
//! This crate contains pure business logic with zero infrastructure dependencies:
//! entities, slug generation, pagination, partial-update patches, the
//! aggregation engine, and the port traits infrastructure must implement.

pub mod domain;
pub mod error;
pub mod pagination;
pub mod patch;
pub mod ports;
pub mod slug;
pub mod stats;

pub use error::{ContentError, StoreError};
