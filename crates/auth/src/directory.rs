//! Identity resolution: provider subject to local user.

use std::sync::Arc;

use incantation_core::auth::{AuthError, Result};
use incantation_core::storage::{RepositoryError, User, UserRepository};

/// Maps a provider subject to a persisted user, creating one on first sight.
#[derive(Clone)]
pub struct UserDirectory {
    users: Arc<dyn UserRepository>,
}

impl UserDirectory {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }

    /// Find the user for `sub`, or create it.
    ///
    /// A concurrent creation for the same subject surfaces as
    /// `AlreadyExists` from the repository; the winner's row is then read
    /// back once.
    pub async fn resolve_or_create(&self, sub: &str) -> Result<User> {
        if let Some(user) = self.users.get_user_by_sub(sub).await.map_err(unavailable)? {
            return Ok(user);
        }

        match self.users.create_user(sub).await {
            Ok(user) => {
                tracing::info!(user_id = user.id, "Created user");
                Ok(user)
            }
            Err(RepositoryError::AlreadyExists { .. }) => {
                tracing::debug!("Lost user creation race, reading back");
                self.users
                    .get_user_by_sub(sub)
                    .await
                    .map_err(unavailable)?
                    .ok_or_else(|| {
                        AuthError::DirectoryUnavailable(
                            "user vanished after uniqueness conflict".to_string(),
                        )
                    })
            }
            Err(e) => Err(unavailable(e)),
        }
    }
}

fn unavailable(e: RepositoryError) -> AuthError {
    AuthError::DirectoryUnavailable(e.to_string())
}
