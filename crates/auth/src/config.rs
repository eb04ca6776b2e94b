use std::time::Duration;

use chrono::Utc;
use incantation_core::auth::calculate_expiry;
use url::Url;

use crate::error::AuthError;

const DEFAULT_SESSION_TTL_HOURS: u64 = 8;

const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const GOOGLE_USERINFO_URL: &str = "https://www.googleapis.com/oauth2/v3/userinfo";

/// Configuration for the OAuth2 identity provider.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: Url,
    pub auth_url: Url,
    pub token_url: Url,
    pub userinfo_url: Url,
    pub scopes: Vec<String>,
}

impl ProviderConfig {
    /// Google endpoints with the `openid` scope.
    pub fn google(client_id: String, client_secret: String, redirect_uri: Url) -> Self {
        Self {
            client_id,
            client_secret,
            redirect_uri,
            auth_url: Url::parse(GOOGLE_AUTH_URL).expect("valid Google auth URL"),
            token_url: Url::parse(GOOGLE_TOKEN_URL).expect("valid Google token URL"),
            userinfo_url: Url::parse(GOOGLE_USERINFO_URL).expect("valid Google userinfo URL"),
            scopes: vec!["openid".to_string()],
        }
    }
}

/// Complete auth configuration.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub google: ProviderConfig,
    /// Where the browser lands after a successful login.
    pub app_url: Url,
    pub session_ttl: Duration,
    pub cookie_name: String,
    pub cookie_secure: bool,
}

impl AuthConfig {
    /// Load from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `GOOGLE_CLIENT_ID`: Google OAuth client ID (required)
    /// - `GOOGLE_CLIENT_SECRET`: Google OAuth client secret (required)
    /// - `GOOGLE_REDIRECT_URL`: Callback URL registered with Google
    ///   (default: `http://localhost:8000/auth/google/callback`)
    /// - `APP_URL`: Application landing page (default: `http://localhost:3000/`)
    /// - `INCANTATION_DEBUG`: `true` or `1` drops the `Secure` cookie flag for local HTTP
    /// - `SESSION_TTL_HOURS`: Session lifetime in hours (default: 8)
    /// - `SESSION_COOKIE_NAME`: Session cookie name (default: `session_id`)
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Config` if a required variable is missing, a URL is
    /// invalid, or `SESSION_TTL_HOURS` is not a usable positive number of hours.
    pub fn from_env() -> Result<Self, AuthError> {
        let client_id = required_var("GOOGLE_CLIENT_ID")?;
        let client_secret = required_var("GOOGLE_CLIENT_SECRET")?;
        let redirect_uri = url_var(
            "GOOGLE_REDIRECT_URL",
            "http://localhost:8000/auth/google/callback",
        )?;
        let app_url = url_var("APP_URL", "http://localhost:3000/")?;

        let session_ttl =
            parse_session_ttl(std::env::var("SESSION_TTL_HOURS").ok().as_deref())?;

        let debug = std::env::var("INCANTATION_DEBUG")
            .map(|v| is_truthy(&v))
            .unwrap_or(false);

        Ok(Self {
            google: ProviderConfig::google(client_id, client_secret, redirect_uri),
            app_url,
            session_ttl,
            cookie_name: std::env::var("SESSION_COOKIE_NAME")
                .unwrap_or_else(|_| "session_id".to_string()),
            cookie_secure: !debug,
        })
    }
}

/// Session lifetime from `SESSION_TTL_HOURS`, 8 hours when unset.
fn parse_session_ttl(raw: Option<&str>) -> Result<Duration, AuthError> {
    let Some(raw) = raw else {
        return Ok(Duration::from_secs(DEFAULT_SESSION_TTL_HOURS * 60 * 60));
    };

    let hours: u64 = raw.trim().parse().map_err(|_| {
        AuthError::Config(format!(
            "SESSION_TTL_HOURS must be a whole number of hours, got {raw:?}"
        ))
    })?;
    if hours == 0 {
        return Err(AuthError::Config(
            "SESSION_TTL_HOURS must be greater than zero".to_string(),
        ));
    }

    let ttl = hours
        .checked_mul(60 * 60)
        .map(Duration::from_secs)
        .ok_or_else(|| AuthError::Config(format!("SESSION_TTL_HOURS={hours} is out of range")))?;
    check_session_ttl(ttl)?;
    Ok(ttl)
}

/// Convert a session TTL to a `chrono::Duration` that can be added to the current time.
pub(crate) fn check_session_ttl(ttl: Duration) -> Result<chrono::Duration, AuthError> {
    chrono::Duration::from_std(ttl)
        .ok()
        .filter(|ttl| calculate_expiry(Utc::now(), *ttl).is_some())
        .ok_or_else(|| {
            AuthError::Config(format!(
                "session TTL of {}s is out of range",
                ttl.as_secs()
            ))
        })
}

fn required_var(name: &str) -> Result<String, AuthError> {
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(AuthError::Config(format!("{name} must be set"))),
    }
}

fn url_var(name: &str, default: &str) -> Result<Url, AuthError> {
    let raw = std::env::var(name).unwrap_or_else(|_| default.to_string());
    raw.parse()
        .map_err(|e| AuthError::Config(format!("{name} is not a valid URL: {e}")))
}

fn is_truthy(value: &str) -> bool {
    matches!(value, "true" | "1")
}
