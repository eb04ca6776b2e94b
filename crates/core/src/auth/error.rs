use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("missing authorization code")]
    MissingCode,

    #[error("login state does not match")]
    StateMismatch,

    #[error("failed to exchange authorization code: {0}")]
    TokenExchangeFailed(String),

    #[error("failed to fetch user profile: {0}")]
    ProfileFetchFailed(String),

    #[error("failed to parse user profile: {0}")]
    ProfileParseFailed(String),

    #[error("session not found")]
    SessionNotFound,

    #[error("not authenticated")]
    Unauthenticated,

    #[error("session expiry out of range")]
    ExpiryOutOfRange,

    #[error("user directory unavailable: {0}")]
    DirectoryUnavailable(String),

    #[error("storage error: {0}")]
    Storage(String),

    #[error("provider error: {0}")]
    Provider(String),
}

impl AuthError {
    /// Whether the failure was caused by the caller rather than the server
    /// or an upstream dependency.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::MissingCode | Self::StateMismatch | Self::SessionNotFound | Self::Unauthenticated
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_errors_are_flagged() {
        assert!(AuthError::MissingCode.is_client_error());
        assert!(AuthError::StateMismatch.is_client_error());
        assert!(AuthError::SessionNotFound.is_client_error());
        assert!(AuthError::Unauthenticated.is_client_error());
    }

    #[test]
    fn upstream_errors_are_not_client_errors() {
        assert!(!AuthError::TokenExchangeFailed("boom".into()).is_client_error());
        assert!(!AuthError::ProfileFetchFailed("boom".into()).is_client_error());
        assert!(!AuthError::ProfileParseFailed("boom".into()).is_client_error());
        assert!(!AuthError::DirectoryUnavailable("boom".into()).is_client_error());
        assert!(!AuthError::Storage("boom".into()).is_client_error());
        assert!(!AuthError::ExpiryOutOfRange.is_client_error());
    }

    #[test]
    fn display_does_not_leak_more_than_given() {
        assert_eq!(
            AuthError::TokenExchangeFailed("status 401".into()).to_string(),
            "failed to exchange authorization code: status 401"
        );
        assert_eq!(AuthError::MissingCode.to_string(), "missing authorization code");
    }
}
