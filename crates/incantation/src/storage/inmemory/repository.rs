//! In-memory repository implementation.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use incantation_core::storage::{RepositoryError, Result, User, UserRepository};

#[derive(Debug, Default)]
struct Users {
    by_sub: HashMap<String, User>,
    next_id: i64,
}

/// In-memory storage backend.
///
/// The write lock is held across the uniqueness check and the insert, so
/// concurrent creations for one subject yield exactly one user.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRepository {
    users: Arc<RwLock<Users>>,
}

impl InMemoryRepository {
    /// Creates a new empty in-memory repository.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryRepository {
    async fn get_user_by_sub(&self, sub: &str) -> Result<Option<User>> {
        let users = self.users.read().await;
        Ok(users.by_sub.get(sub).cloned())
    }

    async fn create_user(&self, sub: &str) -> Result<User> {
        let mut users = self.users.write().await;
        if users.by_sub.contains_key(sub) {
            return Err(RepositoryError::AlreadyExists {
                entity_type: "User",
                id: sub.to_string(),
            });
        }

        users.next_id += 1;
        let user = User {
            id: users.next_id,
            sub: sub.to_string(),
        };
        users.by_sub.insert(user.sub.clone(), user.clone());
        Ok(user)
    }
}
