use async_trait::async_trait;

use super::{Result, User};

/// Repository for users keyed by provider subject.
///
/// Implementations must enforce that `sub` is unique: creating a second user
/// with the same subject fails with [`RepositoryError::AlreadyExists`].
///
/// [`RepositoryError::AlreadyExists`]: super::RepositoryError::AlreadyExists
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Gets a user by exact subject match.
    async fn get_user_by_sub(&self, sub: &str) -> Result<Option<User>>;

    /// Creates a user for the subject and returns it with its assigned ID.
    async fn create_user(&self, sub: &str) -> Result<User>;
}
