//! In-memory storage backend.
//!
//! Stores users in a HashMap wrapped in `Arc<RwLock<_>>`. Useful for
//! development and tests where persistence is not required.

mod repository;

pub use repository::InMemoryRepository;
