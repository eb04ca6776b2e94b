//! Session storage implementations.
//!
//! Provides `SessionRepository` implementations for:
//! - In-memory (always available)
//! - SQLite (with `sqlite` feature)

mod inmemory;
mod manager;
#[cfg(feature = "sqlite")]
mod sqlite;

pub use inmemory::MemorySessionStore;
pub use manager::SessionManager;
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteSessionStore;
