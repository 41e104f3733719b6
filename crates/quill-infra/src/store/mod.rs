//! Document store adapters.

mod memory;

#[cfg(feature = "mongo")]
mod document;
#[cfg(feature = "mongo")]
mod mongo;

pub use memory::InMemoryStore;

#[cfg(feature = "mongo")]
pub use mongo::MongoStore;
