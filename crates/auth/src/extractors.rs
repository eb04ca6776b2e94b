//! Axum extractors for authentication.

use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use axum_extra::extract::CookieJar;
use incantation_core::auth::{AuthError as CoreError, Session};

use crate::error::AuthError;
use crate::AuthState;

/// Extractor for a live session. Rejects with 401 if there is none.
pub struct CurrentSession(pub Session);

impl<S> FromRequestParts<S> for CurrentSession
where
    AuthState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let auth_state = AuthState::from_ref(state);

        let jar = CookieJar::from_headers(&parts.headers);
        let token = jar
            .get(auth_state.sessions.cookie_name())
            .map(|cookie| cookie.value().to_string())
            .ok_or(CoreError::Unauthenticated)?;

        // Absent, expired and malformed tokens all read as "not logged in"
        match auth_state.sessions.get(&token).await {
            Ok(session) => Ok(CurrentSession(session)),
            Err(CoreError::SessionNotFound) => Err(CoreError::Unauthenticated.into()),
            Err(e) => Err(e.into()),
        }
    }
}
