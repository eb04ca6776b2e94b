//! Storage backend implementations.
//!
//! Concrete implementations of the repository traits defined in
//! `incantation_core::storage`, selected at startup with `--storage`.

pub mod inmemory;
pub mod sqlite;

use std::sync::Arc;

use incantation_core::storage::{Result, UserRepository};

pub use inmemory::InMemoryRepository;
pub use sqlite::SqliteRepository;

/// User storage backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum StorageBackend {
    /// SQLite database file
    Sqlite,
    /// Process memory; users are lost on restart
    Memory,
}

/// Open the user repository for `backend`.
pub async fn open_user_repository(
    backend: StorageBackend,
    database_path: &str,
) -> Result<Arc<dyn UserRepository>> {
    match backend {
        StorageBackend::Sqlite => {
            tracing::info!(path = %database_path, "Using SQLite user storage");
            Ok(Arc::new(SqliteRepository::new(database_path).await?))
        }
        StorageBackend::Memory => {
            tracing::info!("Using in-memory user storage");
            Ok(Arc::new(InMemoryRepository::new()))
        }
    }
}
