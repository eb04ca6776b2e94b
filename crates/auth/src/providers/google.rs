//! Google OAuth2 provider implementation.

use std::time::Duration;

use async_trait::async_trait;
use incantation_core::auth::{
    AccessToken, AuthError, IdentityProviderClient, ProviderProfile, Result,
};
use oauth2::{
    basic::BasicClient, reqwest::async_http_client, AuthType, AuthUrl, AuthorizationCode,
    ClientId, ClientSecret, CsrfToken, PkceCodeVerifier, RedirectUrl, Scope, TokenResponse,
    TokenUrl,
};
use url::Url;

use crate::config::ProviderConfig;

/// Google OAuth2 provider.
///
/// Uses the authorization-code flow with PKCE and reads the subject from the
/// userinfo endpoint rather than from an ID token.
pub struct GoogleProvider {
    client: BasicClient,
    http_client: reqwest::Client,
    userinfo_url: Url,
    scopes: Vec<String>,
}

impl GoogleProvider {
    /// Create a new Google provider from static configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &ProviderConfig) -> Result<Self> {
        let client = BasicClient::new(
            ClientId::new(config.client_id.clone()),
            Some(ClientSecret::new(config.client_secret.clone())),
            AuthUrl::from_url(config.auth_url.clone()),
            Some(TokenUrl::from_url(config.token_url.clone())),
        )
        .set_auth_type(AuthType::RequestBody)
        .set_redirect_uri(RedirectUrl::from_url(config.redirect_uri.clone()));

        // Build HTTP client without redirect following (security requirement)
        let http_client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| AuthError::Provider(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            http_client,
            userinfo_url: config.userinfo_url.clone(),
            scopes: config.scopes.clone(),
        })
    }
}

#[async_trait]
impl IdentityProviderClient for GoogleProvider {
    async fn authorization_url(&self, state: &str, pkce_challenge: &str) -> Result<Url> {
        let state_owned = state.to_string();
        let pkce_challenge_owned = pkce_challenge.to_string();

        let mut request = self
            .client
            .authorize_url(move || CsrfToken::new(state_owned));
        for scope in &self.scopes {
            request = request.add_scope(Scope::new(scope.clone()));
        }

        // The challenge is computed by the caller, which also keeps the verifier.
        let (auth_url, _csrf_token) = request
            .add_extra_param("code_challenge", pkce_challenge_owned)
            .add_extra_param("code_challenge_method", "S256")
            .url();

        Ok(auth_url)
    }

    async fn exchange_code(&self, code: &str, pkce_verifier: &str) -> Result<AccessToken> {
        let token_response = self
            .client
            .exchange_code(AuthorizationCode::new(code.to_string()))
            .set_pkce_verifier(PkceCodeVerifier::new(pkce_verifier.to_string()))
            .request_async(async_http_client)
            .await
            .map_err(|e| AuthError::TokenExchangeFailed(e.to_string()))?;

        Ok(AccessToken::new(
            token_response.access_token().secret().to_string(),
        ))
    }

    async fn fetch_profile(&self, token: &AccessToken) -> Result<ProviderProfile> {
        let response = self
            .http_client
            .get(self.userinfo_url.clone())
            .bearer_auth(token.secret())
            .send()
            .await
            .map_err(|e| AuthError::ProfileFetchFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AuthError::ProfileFetchFailed(format!(
                "userinfo endpoint returned {status}"
            )));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| AuthError::ProfileFetchFailed(e.to_string()))?;

        let profile: ProviderProfile = serde_json::from_slice(&body)
            .map_err(|e| AuthError::ProfileParseFailed(e.to_string()))?;

        if profile.sub.trim().is_empty() {
            return Err(AuthError::ProfileParseFailed(
                "empty subject in userinfo response".to_string(),
            ));
        }

        Ok(profile)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use wiremock::matchers::{body_string_contains, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn provider_for(server: &MockServer) -> GoogleProvider {
        let base = Url::parse(&server.uri()).unwrap();
        let config = ProviderConfig {
            client_id: "client-id".to_string(),
            client_secret: "client-secret".to_string(),
            redirect_uri: Url::parse("http://localhost:8000/auth/google/callback").unwrap(),
            auth_url: base.join("/authorize").unwrap(),
            token_url: base.join("/token").unwrap(),
            userinfo_url: base.join("/userinfo").unwrap(),
            scopes: vec!["openid".to_string()],
        };
        GoogleProvider::new(&config).unwrap()
    }

    #[tokio::test]
    async fn authorization_url_carries_client_state_and_pkce() {
        let server = MockServer::start().await;
        let provider = provider_for(&server);

        let url = provider
            .authorization_url("state-123", "challenge-abc")
            .await
            .unwrap();

        assert_eq!(url.path(), "/authorize");
        let query: HashMap<_, _> = url.query_pairs().into_owned().collect();
        assert_eq!(query["client_id"], "client-id");
        assert_eq!(query["response_type"], "code");
        assert_eq!(query["scope"], "openid");
        assert_eq!(query["state"], "state-123");
        assert_eq!(
            query["redirect_uri"],
            "http://localhost:8000/auth/google/callback"
        );
        assert_eq!(query["code_challenge"], "challenge-abc");
        assert_eq!(query["code_challenge_method"], "S256");
    }

    #[tokio::test]
    async fn exchange_code_returns_access_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .and(body_string_contains("code=valid-code"))
            .and(body_string_contains("code_verifier=verifier-xyz"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "ya29.token",
                "token_type": "Bearer",
                "expires_in": 3599,
            })))
            .expect(1)
            .mount(&server)
            .await;

        let provider = provider_for(&server);
        let token = provider
            .exchange_code("valid-code", "verifier-xyz")
            .await
            .unwrap();

        assert_eq!(token.secret(), "ya29.token");
    }

    #[tokio::test]
    async fn exchange_code_fails_on_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "error": "invalid_grant",
            })))
            .mount(&server)
            .await;

        let provider = provider_for(&server);
        let result = provider.exchange_code("expired-code", "verifier").await;

        assert!(matches!(result, Err(AuthError::TokenExchangeFailed(_))));
    }

    #[tokio::test]
    async fn exchange_code_fails_on_malformed_payload() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "token_type": "Bearer" })),
            )
            .mount(&server)
            .await;

        let provider = provider_for(&server);
        let result = provider.exchange_code("valid-code", "verifier").await;

        assert!(matches!(result, Err(AuthError::TokenExchangeFailed(_))));
    }

    #[tokio::test]
    async fn fetch_profile_sends_bearer_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/userinfo"))
            .and(header("authorization", "Bearer ya29.token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "sub": "abc123",
                "picture": "https://example.com/me.png",
            })))
            .expect(1)
            .mount(&server)
            .await;

        let provider = provider_for(&server);
        let profile = provider
            .fetch_profile(&AccessToken::new("ya29.token".to_string()))
            .await
            .unwrap();

        assert_eq!(profile.sub, "abc123");
    }

    #[tokio::test]
    async fn fetch_profile_does_not_retry_on_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/userinfo"))
            .respond_with(ResponseTemplate::new(503))
            .expect(1)
            .mount(&server)
            .await;

        let provider = provider_for(&server);
        let result = provider
            .fetch_profile(&AccessToken::new("ya29.token".to_string()))
            .await;

        assert!(matches!(result, Err(AuthError::ProfileFetchFailed(_))));
    }

    #[tokio::test]
    async fn fetch_profile_rejects_undecodable_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/userinfo"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>nope</html>"))
            .mount(&server)
            .await;

        let provider = provider_for(&server);
        let result = provider
            .fetch_profile(&AccessToken::new("ya29.token".to_string()))
            .await;

        assert!(matches!(result, Err(AuthError::ProfileParseFailed(_))));
    }

    #[tokio::test]
    async fn fetch_profile_rejects_empty_subject() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/userinfo"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "sub": "" })))
            .mount(&server)
            .await;

        let provider = provider_for(&server);
        let result = provider
            .fetch_profile(&AccessToken::new("ya29.token".to_string()))
            .await;

        assert!(matches!(result, Err(AuthError::ProfileParseFailed(_))));
    }
}
