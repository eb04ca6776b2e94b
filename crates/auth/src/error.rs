use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// Auth errors for the incantation_auth crate.
///
/// This wraps the core `AuthError` and adds crate-specific error variants
/// for I/O concerns that can't be in the functional core.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Error from the core auth module (flow, provider, session, directory)
    #[error(transparent)]
    Core(#[from] incantation_core::auth::AuthError),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),
}

impl AuthError {
    fn is_client_error(&self) -> bool {
        match self {
            AuthError::Core(core_err) => core_err.is_client_error(),
            AuthError::Config(_) => false,
        }
    }

    /// HTTP status and the message safe to show to the client.
    fn status_and_message(&self) -> (StatusCode, &'static str) {
        use incantation_core::auth::AuthError as CoreError;

        match self {
            AuthError::Core(core_err) => match core_err {
                CoreError::MissingCode => (StatusCode::BAD_REQUEST, "Missing code"),
                CoreError::StateMismatch => (StatusCode::BAD_REQUEST, "Invalid login state"),
                CoreError::SessionNotFound | CoreError::Unauthenticated => {
                    (StatusCode::UNAUTHORIZED, "No user session")
                }
                CoreError::TokenExchangeFailed(_) => {
                    (StatusCode::INTERNAL_SERVER_ERROR, "Token exchange failed")
                }
                CoreError::ProfileFetchFailed(_) => {
                    (StatusCode::INTERNAL_SERVER_ERROR, "Failed to get user info")
                }
                CoreError::ProfileParseFailed(_) => {
                    (StatusCode::INTERNAL_SERVER_ERROR, "Failed to parse user info")
                }
                CoreError::DirectoryUnavailable(_) => {
                    (StatusCode::INTERNAL_SERVER_ERROR, "Failed to resolve user")
                }
                CoreError::Storage(_) | CoreError::ExpiryOutOfRange => {
                    (StatusCode::INTERNAL_SERVER_ERROR, "Session error")
                }
                CoreError::Provider(_) => {
                    (StatusCode::INTERNAL_SERVER_ERROR, "Authentication provider error")
                }
            },
            AuthError::Config(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Server configuration error",
            ),
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();

        if self.is_client_error() {
            tracing::debug!(error = %self, "Auth request rejected");
        } else {
            tracing::error!(error = %self, "Auth request failed");
        }

        (status, message).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use incantation_core::auth::AuthError as CoreError;

    fn status_of(err: CoreError) -> StatusCode {
        AuthError::from(err).into_response().status()
    }

    #[test]
    fn client_errors_map_to_4xx() {
        assert_eq!(status_of(CoreError::MissingCode), StatusCode::BAD_REQUEST);
        assert_eq!(status_of(CoreError::StateMismatch), StatusCode::BAD_REQUEST);
        assert_eq!(status_of(CoreError::SessionNotFound), StatusCode::UNAUTHORIZED);
        assert_eq!(status_of(CoreError::Unauthenticated), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn upstream_errors_map_to_500() {
        for err in [
            CoreError::TokenExchangeFailed("invalid_grant".into()),
            CoreError::ProfileFetchFailed("status 503".into()),
            CoreError::ProfileParseFailed("missing field `sub`".into()),
            CoreError::DirectoryUnavailable("disk I/O error".into()),
            CoreError::Storage("pool timed out".into()),
            CoreError::ExpiryOutOfRange,
        ] {
            assert_eq!(status_of(err), StatusCode::INTERNAL_SERVER_ERROR);
        }
    }

    #[test]
    fn upstream_detail_is_not_echoed() {
        let (_, message) =
            AuthError::from(CoreError::TokenExchangeFailed("secret detail".into()))
                .status_and_message();
        assert!(!message.contains("secret detail"));
    }
}
