//! Test doubles shared by the crate's unit tests.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use incantation_core::storage::{RepositoryError, Result, User, UserRepository};
use tokio::sync::Mutex;
use url::Url;

use crate::config::{AuthConfig, ProviderConfig};
use crate::providers::MockProvider;
use crate::sessions::MemorySessionStore;
use crate::AuthState;

/// User repository that enforces unique subjects like a real backend.
#[derive(Default)]
pub struct TestUsers {
    pub by_sub: Mutex<HashMap<String, User>>,
}

#[async_trait]
impl UserRepository for TestUsers {
    async fn get_user_by_sub(&self, sub: &str) -> Result<Option<User>> {
        Ok(self.by_sub.lock().await.get(sub).cloned())
    }

    async fn create_user(&self, sub: &str) -> Result<User> {
        let mut users = self.by_sub.lock().await;
        if users.contains_key(sub) {
            return Err(RepositoryError::AlreadyExists {
                entity_type: "User",
                id: sub.to_string(),
            });
        }
        let user = User {
            id: users.len() as i64 + 1,
            sub: sub.to_string(),
        };
        users.insert(sub.to_string(), user.clone());
        Ok(user)
    }
}

pub fn test_config() -> AuthConfig {
    AuthConfig {
        google: ProviderConfig::google(
            "client-id".to_string(),
            "client-secret".to_string(),
            Url::parse("http://localhost:8000/auth/google/callback").unwrap(),
        ),
        app_url: Url::parse("http://localhost:3000/").unwrap(),
        session_ttl: std::time::Duration::from_secs(8 * 60 * 60),
        cookie_name: "session_id".to_string(),
        cookie_secure: true,
    }
}

pub fn test_provider() -> MockProvider {
    MockProvider::new(Url::parse("https://idp.test/authorize").unwrap())
        .with_code("valid-code", "abc123")
}

/// Auth state over in-memory backends and the given provider.
pub fn test_state(provider: MockProvider) -> (AuthState, Arc<TestUsers>) {
    let users = Arc::new(TestUsers::default());
    let state = AuthState::new(
        Arc::new(MemorySessionStore::new()),
        users.clone(),
        Arc::new(provider),
        test_config(),
    )
    .unwrap();
    (state, users)
}
