use chrono::{DateTime, Duration, Utc};
use rand::{distr::Alphanumeric, Rng};

use super::{PendingLogin, Session, SessionId};

/// Length of generated session identifiers.
pub const SESSION_ID_LEN: usize = 32;

/// How long a pending login may wait for the provider callback.
pub const PENDING_LOGIN_TTL_SECS: i64 = 600;

/// Generate a cryptographically random session ID.
pub fn generate_session_id() -> SessionId {
    let id: String = rand::rng()
        .sample_iter(&Alphanumeric)
        .take(SESSION_ID_LEN)
        .map(char::from)
        .collect();
    SessionId::new(id)
}

/// Generate a random state parameter for CSRF protection.
pub fn generate_state() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(32)
        .map(char::from)
        .collect()
}

/// Whether a cookie value could be a session ID we issued.
pub fn is_well_formed_session_id(value: &str) -> bool {
    value.len() == SESSION_ID_LEN && value.bytes().all(|b| b.is_ascii_alphanumeric())
}

/// Check if a session has expired.
pub fn is_session_expired(session: &Session, now: DateTime<Utc>) -> bool {
    session.expires_at <= now
}

/// Check if a pending login is too old to be completed.
pub fn is_pending_login_expired(flow: &PendingLogin, now: DateTime<Utc>) -> bool {
    flow.created_at + Duration::seconds(PENDING_LOGIN_TTL_SECS) <= now
}

/// Calculate session expiry from creation time and TTL.
///
/// Returns `None` if the result does not fit in a `DateTime`.
pub fn calculate_expiry(created_at: DateTime<Utc>, ttl: Duration) -> Option<DateTime<Utc>> {
    created_at.checked_add_signed(ttl)
}
