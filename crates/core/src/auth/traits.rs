use async_trait::async_trait;
use chrono::{DateTime, Utc};
use url::Url;

use super::{AccessToken, AuthError, PendingLogin, ProviderProfile, Session, SessionId};

/// Result type for auth operations.
pub type Result<T> = std::result::Result<T, AuthError>;

/// Abstraction over an OAuth2 identity provider.
#[async_trait]
pub trait IdentityProviderClient: Send + Sync {
    /// Generate authorization URL for user redirect.
    async fn authorization_url(&self, state: &str, pkce_challenge: &str) -> Result<Url>;

    /// Exchange authorization code for an access token.
    ///
    /// Fails with [`AuthError::TokenExchangeFailed`].
    async fn exchange_code(&self, code: &str, pkce_verifier: &str) -> Result<AccessToken>;

    /// Fetch the authenticated user's profile. Makes exactly one request.
    ///
    /// Fails with [`AuthError::ProfileFetchFailed`] or [`AuthError::ProfileParseFailed`].
    async fn fetch_profile(&self, token: &AccessToken) -> Result<ProviderProfile>;
}

/// Session storage abstraction.
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Store a new session.
    async fn create_session(&self, session: &Session) -> Result<()>;

    /// Retrieve session by ID. Expiry is not checked here.
    async fn get_session(&self, id: &SessionId) -> Result<Option<Session>>;

    /// Delete a specific session. Deleting an unknown ID is not an error.
    async fn delete_session(&self, id: &SessionId) -> Result<()>;

    /// Store pending login data keyed by its state value.
    async fn store_pending_login(&self, state: &str, flow: &PendingLogin) -> Result<()>;

    /// Retrieve and delete pending login data.
    async fn take_pending_login(&self, state: &str) -> Result<Option<PendingLogin>>;

    /// Remove expired sessions and stale pending logins.
    ///
    /// Returns the number of sessions removed.
    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64>;
}
