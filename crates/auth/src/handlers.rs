//! HTTP handlers for auth routes.

use axum::{
    extract::{FromRef, Query, State},
    http::{header::LOCATION, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use axum_extra::extract::cookie::{Cookie, SameSite};
use axum_extra::extract::CookieJar;
use chrono::Utc;
use incantation_core::auth::{
    generate_state, is_pending_login_expired, validate_return_to, AuthError as CoreError,
    PendingLogin, SessionAttributes, PENDING_LOGIN_TTL_SECS, SUB_ATTRIBUTE,
};
use incantation_core::storage::User;
use oauth2::PkceCodeChallenge;
use serde::Deserialize;
use url::Url;

use crate::error::AuthError;
use crate::extractors::CurrentSession;
use crate::AuthState;

/// Cookie binding a login attempt to the browser that started it.
pub const LOGIN_STATE_COOKIE: &str = "login_state";

/// Query parameters for OAuth callback.
#[derive(Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
}

/// Query parameters for the login endpoint.
#[derive(Deserialize, Default)]
pub struct LoginQuery {
    /// Application path to land on after successful authentication.
    pub return_to: Option<String>,
}

/// Creates the auth router with all authentication routes.
///
/// Routes:
/// - `GET /auth/google/login` - Initiate Google login
/// - `GET /auth/google/callback` - Handle Google callback
/// - `GET /auth/me` - Get current authenticated user
/// - `POST /auth/logout` - End current session
pub fn auth_routes<S>() -> Router<S>
where
    AuthState: FromRef<S>,
    S: Clone + Send + Sync + 'static,
{
    Router::new()
        .route("/auth/google/login", get(google_login))
        .route("/auth/google/callback", get(google_callback))
        .route("/auth/me", get(me))
        .route("/auth/logout", post(logout))
}

/// 302 Found. axum's `Redirect::to` answers 303.
fn found(location: &str) -> Response {
    (StatusCode::FOUND, [(LOCATION, location.to_string())]).into_response()
}

fn login_state_cookie(state: &AuthState, csrf_state: String) -> Cookie<'static> {
    Cookie::build((LOGIN_STATE_COOKIE, csrf_state))
        .path("/auth")
        .http_only(true)
        .secure(state.config.cookie_secure)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::seconds(PENDING_LOGIN_TTL_SECS))
        .build()
}

async fn google_login(
    State(state): State<AuthState>,
    Query(query): Query<LoginQuery>,
    jar: CookieJar,
) -> Result<(CookieJar, Response), AuthError> {
    let (pkce_challenge, pkce_verifier) = PkceCodeChallenge::new_random_sha256();
    let csrf_state = generate_state();

    // Only same-origin relative paths survive
    let return_to = query
        .return_to
        .as_deref()
        .and_then(validate_return_to)
        .map(String::from);

    let flow = PendingLogin {
        pkce_verifier: pkce_verifier.secret().to_string(),
        created_at: Utc::now(),
        return_to,
    };
    state
        .sessions
        .repository()
        .store_pending_login(&csrf_state, &flow)
        .await?;

    let auth_url = state
        .provider
        .authorization_url(&csrf_state, pkce_challenge.as_str())
        .await?;

    tracing::debug!("Redirecting to identity provider");

    let jar = jar.add(login_state_cookie(&state, csrf_state));
    Ok((jar, found(auth_url.as_str())))
}

async fn google_callback(
    State(state): State<AuthState>,
    Query(params): Query<CallbackQuery>,
    jar: CookieJar,
) -> Result<(CookieJar, Response), AuthError> {
    let code = params
        .code
        .filter(|code| !code.is_empty())
        .ok_or(CoreError::MissingCode)?;

    let csrf_state = params
        .state
        .filter(|s| !s.is_empty())
        .ok_or(CoreError::StateMismatch)?;

    let cookie_state = jar.get(LOGIN_STATE_COOKIE).map(|c| c.value().to_string());
    if cookie_state.as_deref() != Some(csrf_state.as_str()) {
        return Err(CoreError::StateMismatch.into());
    }

    let flow = state
        .sessions
        .repository()
        .take_pending_login(&csrf_state)
        .await?
        .ok_or(CoreError::StateMismatch)?;

    if is_pending_login_expired(&flow, Utc::now()) {
        return Err(CoreError::StateMismatch.into());
    }

    let token = state
        .provider
        .exchange_code(&code, &flow.pkce_verifier)
        .await?;
    let profile = state.provider.fetch_profile(&token).await?;
    let user = state.directory.resolve_or_create(&profile.sub).await?;

    // Last await: nothing is left half-done if the request is dropped earlier
    let session = state
        .sessions
        .create(SessionAttributes::from([(
            SUB_ATTRIBUTE.to_string(),
            profile.sub,
        )]))
        .await?;

    tracing::info!(user_id = user.id, "Login completed");

    let jar = jar
        .add(state.sessions.session_cookie(&session))
        .remove(Cookie::build(LOGIN_STATE_COOKIE).path("/auth"));

    let landing = landing_url(&state.config.app_url, flow.return_to.as_deref());
    Ok((jar, found(landing.as_str())))
}

/// Application URL with the validated return path applied beneath its path prefix.
fn landing_url(app_url: &Url, return_to: Option<&str>) -> Url {
    let Some(path) = return_to else {
        return app_url.clone();
    };

    let mut base = app_url.clone();
    if !base.path().ends_with('/') {
        let prefix = format!("{}/", base.path());
        base.set_path(&prefix);
    }

    base.join(path.strip_prefix('/').unwrap_or(path))
        .unwrap_or_else(|_| app_url.clone())
}

async fn me(
    State(state): State<AuthState>,
    CurrentSession(session): CurrentSession,
) -> Result<Json<User>, AuthError> {
    let sub = session.sub().ok_or(CoreError::Unauthenticated)?;
    let user = state.directory.resolve_or_create(sub).await?;
    Ok(Json(user))
}

async fn logout(State(state): State<AuthState>, jar: CookieJar) -> Result<CookieJar, AuthError> {
    if let Some(cookie) = jar.get(state.sessions.cookie_name()) {
        state.sessions.destroy(cookie.value()).await?;
        tracing::info!("Session destroyed");
    }

    Ok(jar.remove(state.sessions.removal_cookie()))
}
