//! Session lifecycle and cookie policy on top of a `SessionRepository`.

use std::sync::Arc;

use axum_extra::extract::cookie::{Cookie, SameSite};
use chrono::{DateTime, Duration, Utc};
use incantation_core::auth::{
    calculate_expiry, generate_session_id, is_session_expired, is_well_formed_session_id,
    AuthError, Result, Session, SessionAttributes, SessionId, SessionRepository,
};

/// Issues, validates and destroys sessions.
///
/// Tokens are 32 random alphanumerics; a session is valid while
/// `now < expires_at`. Expired sessions found on read are deleted.
#[derive(Clone)]
pub struct SessionManager {
    repository: Arc<dyn SessionRepository>,
    ttl: Duration,
    cookie_name: String,
    cookie_secure: bool,
}

impl SessionManager {
    pub fn new(
        repository: Arc<dyn SessionRepository>,
        ttl: Duration,
        cookie_name: impl Into<String>,
        cookie_secure: bool,
    ) -> Self {
        Self {
            repository,
            ttl,
            cookie_name: cookie_name.into(),
            cookie_secure,
        }
    }

    pub fn cookie_name(&self) -> &str {
        &self.cookie_name
    }

    pub fn repository(&self) -> &Arc<dyn SessionRepository> {
        &self.repository
    }

    /// Create a session carrying `attributes`.
    pub async fn create(&self, attributes: SessionAttributes) -> Result<Session> {
        self.create_at(attributes, Utc::now()).await
    }

    /// # Errors
    ///
    /// `ExpiryOutOfRange` if `now + ttl` is not a representable time.
    pub async fn create_at(
        &self,
        attributes: SessionAttributes,
        now: DateTime<Utc>,
    ) -> Result<Session> {
        let expires_at = calculate_expiry(now, self.ttl).ok_or(AuthError::ExpiryOutOfRange)?;
        let session = Session {
            id: generate_session_id(),
            attributes,
            created_at: now,
            expires_at,
        };
        self.repository.create_session(&session).await?;

        tracing::debug!(expires_at = %session.expires_at, "Session created");
        Ok(session)
    }

    /// Look up a live session by its token.
    ///
    /// # Errors
    ///
    /// `SessionNotFound` if the token is malformed, unknown or expired.
    pub async fn get(&self, token: &str) -> Result<Session> {
        self.get_at(token, Utc::now()).await
    }

    pub async fn get_at(&self, token: &str, now: DateTime<Utc>) -> Result<Session> {
        if !is_well_formed_session_id(token) {
            return Err(AuthError::SessionNotFound);
        }

        let id = SessionId::new(token.to_string());
        let session = self
            .repository
            .get_session(&id)
            .await?
            .ok_or(AuthError::SessionNotFound)?;

        if is_session_expired(&session, now) {
            self.repository.delete_session(&id).await?;
            tracing::debug!("Expired session evicted");
            return Err(AuthError::SessionNotFound);
        }

        Ok(session)
    }

    /// Destroy the session named by `token`. Unknown or malformed tokens are a no-op.
    pub async fn destroy(&self, token: &str) -> Result<()> {
        if !is_well_formed_session_id(token) {
            return Ok(());
        }
        self.repository
            .delete_session(&SessionId::new(token.to_string()))
            .await
    }

    /// Remove all expired sessions and stale pending logins.
    pub async fn purge_expired(&self) -> Result<u64> {
        self.repository.purge_expired(Utc::now()).await
    }

    /// Cookie carrying the session token.
    pub fn session_cookie(&self, session: &Session) -> Cookie<'static> {
        let builder = Cookie::build((self.cookie_name.clone(), session.id.to_string()))
            .path("/")
            .http_only(true)
            .secure(self.cookie_secure)
            .same_site(SameSite::Lax);

        match time::OffsetDateTime::from_unix_timestamp(session.expires_at.timestamp()) {
            Ok(expires) => builder.expires(expires).build(),
            Err(_) => builder
                .max_age(time::Duration::seconds(self.ttl.num_seconds()))
                .build(),
        }
    }

    /// Cookie template used to clear the session cookie.
    pub fn removal_cookie(&self) -> Cookie<'static> {
        Cookie::build(self.cookie_name.clone()).path("/").build()
    }
}
