use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Session attribute holding the provider subject.
pub const SUB_ATTRIBUTE: &str = "sub";

/// Attribute bag carried by a session.
pub type SessionAttributes = BTreeMap<String, String>;

/// Cryptographically random session identifier. Doubles as the cookie value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(String);

impl SessionId {
    pub fn new(id: String) -> Self {
        Self(id)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Server-side session.
///
/// Attributes are fixed when the session is created; stores expose no way to
/// change them afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub id: SessionId,
    pub attributes: SessionAttributes,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    /// Provider subject bound to this session, if any.
    pub fn sub(&self) -> Option<&str> {
        self.attribute(SUB_ATTRIBUTE)
    }
}

/// Bearer token returned by the provider's token endpoint.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: String) -> Self {
        Self(token)
    }

    pub fn secret(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("AccessToken([redacted])")
    }
}

/// Subset of the provider's userinfo response we rely on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderProfile {
    /// Provider's stable identifier for the user.
    pub sub: String,
}

/// Data kept between the login redirect and the provider callback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingLogin {
    pub pkce_verifier: String,
    pub created_at: DateTime<Utc>,
    /// Application path to land on after a successful login.
    pub return_to: Option<String>,
}
