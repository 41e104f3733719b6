//! # Quill Infrastructure
//!
//! Concrete implementations of the ports defined in `quill-core`, plus the
//! `ContentRepository` that orchestrates them.
//!
//! ## Feature Flags
//!
//! - `mongo` (default) - MongoDB document store adapter
//!
//! The in-memory store is always available and needs no external services.

pub mod config;
pub mod repository;
pub mod retry;
pub mod search;
pub mod store;
pub mod telemetry;

pub use config::StoreConfig;
pub use repository::ContentRepository;
pub use retry::RetryPolicy;
pub use search::SubstringMatcher;
pub use store::InMemoryStore;

#[cfg(feature = "mongo")]
pub use store::MongoStore;
