//! Application state for auth.

use std::sync::Arc;

use incantation_core::auth::{IdentityProviderClient, SessionRepository};
use incantation_core::storage::UserRepository;

use crate::config::{check_session_ttl, AuthConfig};
use crate::directory::UserDirectory;
use crate::error::AuthError;
use crate::sessions::SessionManager;

/// Shared state for auth handlers.
#[derive(Clone)]
pub struct AuthState {
    pub sessions: SessionManager,
    pub directory: UserDirectory,
    pub provider: Arc<dyn IdentityProviderClient>,
    pub config: AuthConfig,
}

impl AuthState {
    /// Wires the session manager and user directory from their backends.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Config` if the session TTL is out of range.
    pub fn new(
        sessions: Arc<dyn SessionRepository>,
        users: Arc<dyn UserRepository>,
        provider: Arc<dyn IdentityProviderClient>,
        config: AuthConfig,
    ) -> Result<Self, AuthError> {
        let ttl = check_session_ttl(config.session_ttl)?;

        Ok(Self {
            sessions: SessionManager::new(
                sessions,
                ttl,
                config.cookie_name.clone(),
                config.cookie_secure,
            ),
            directory: UserDirectory::new(users),
            provider,
            config,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sessions::MemorySessionStore;
    use crate::testing::{test_config, test_provider, TestUsers};

    fn state_with_ttl(ttl: std::time::Duration) -> Result<AuthState, AuthError> {
        AuthState::new(
            Arc::new(MemorySessionStore::new()),
            Arc::new(TestUsers::default()),
            Arc::new(test_provider()),
            AuthConfig {
                session_ttl: ttl,
                ..test_config()
            },
        )
    }

    #[test]
    fn test_rejects_ttl_past_the_representable_range() {
        let result = state_with_ttl(std::time::Duration::from_secs(10_000_000_000 * 60 * 60));
        assert!(matches!(result, Err(AuthError::Config(_))));
    }

    #[tokio::test]
    async fn test_accepted_ttl_creates_sessions() {
        let state = state_with_ttl(std::time::Duration::from_secs(8 * 60 * 60)).unwrap();
        assert!(state.sessions.create(Default::default()).await.is_ok());
    }
}
