//! In-memory session storage.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use incantation_core::auth::{
    is_pending_login_expired, is_session_expired, PendingLogin, Result, Session, SessionId,
    SessionRepository,
};

/// Process-local session store.
///
/// Stores sessions and pending logins in HashMaps wrapped in `Arc<RwLock<_>>`.
/// Data is not persisted and will be lost when the store is dropped.
#[derive(Debug, Clone)]
pub struct MemorySessionStore {
    sessions: Arc<RwLock<HashMap<String, Session>>>,
    pending_logins: Arc<RwLock<HashMap<String, PendingLogin>>>,
}

impl Default for MemorySessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemorySessionStore {
    /// Creates a new empty in-memory session store.
    pub fn new() -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            pending_logins: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

#[async_trait]
impl SessionRepository for MemorySessionStore {
    async fn create_session(&self, session: &Session) -> Result<()> {
        let mut sessions = self.sessions.write().await;
        sessions.insert(session.id.as_str().to_string(), session.clone());
        Ok(())
    }

    async fn get_session(&self, id: &SessionId) -> Result<Option<Session>> {
        let sessions = self.sessions.read().await;
        Ok(sessions.get(id.as_str()).cloned())
    }

    async fn delete_session(&self, id: &SessionId) -> Result<()> {
        let mut sessions = self.sessions.write().await;
        sessions.remove(id.as_str());
        Ok(())
    }

    async fn store_pending_login(&self, state: &str, flow: &PendingLogin) -> Result<()> {
        let mut flows = self.pending_logins.write().await;
        flows.insert(state.to_string(), flow.clone());
        Ok(())
    }

    async fn take_pending_login(&self, state: &str) -> Result<Option<PendingLogin>> {
        let mut flows = self.pending_logins.write().await;
        Ok(flows.remove(state))
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64> {
        let removed = {
            let mut sessions = self.sessions.write().await;
            let before = sessions.len();
            sessions.retain(|_, s| !is_session_expired(s, now));
            before - sessions.len()
        };

        let mut flows = self.pending_logins.write().await;
        flows.retain(|_, f| !is_pending_login_expired(f, now));

        Ok(removed as u64)
    }
}
