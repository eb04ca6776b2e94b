//! Scripted identity provider for development and testing.
//!
//! Authorization codes are registered up front and map to a provider subject.
//! The provider counts every outbound call it would have made so tests can
//! assert that a flow did or did not reach the provider.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use incantation_core::auth::{
    AccessToken, AuthError, IdentityProviderClient, ProviderProfile, Result,
};
use url::Url;

const TOKEN_PREFIX: &str = "mock-token:";

/// Mock OAuth2 provider.
#[derive(Debug, Clone)]
pub struct MockProvider {
    authorize_url: Url,
    codes: HashMap<String, String>,
    calls: Arc<AtomicUsize>,
}

impl MockProvider {
    /// Create a mock whose authorization endpoint is `authorize_url`.
    pub fn new(authorize_url: Url) -> Self {
        Self {
            authorize_url,
            codes: HashMap::new(),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Accept `code` and resolve it to a profile with subject `sub`.
    pub fn with_code(mut self, code: impl Into<String>, sub: impl Into<String>) -> Self {
        self.codes.insert(code.into(), sub.into());
        self
    }

    /// Number of token exchanges and profile fetches performed so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl IdentityProviderClient for MockProvider {
    async fn authorization_url(&self, state: &str, pkce_challenge: &str) -> Result<Url> {
        let mut url = self.authorize_url.clone();
        url.query_pairs_mut()
            .append_pair("response_type", "code")
            .append_pair("scope", "openid")
            .append_pair("state", state)
            .append_pair("code_challenge", pkce_challenge)
            .append_pair("code_challenge_method", "S256");
        Ok(url)
    }

    async fn exchange_code(&self, code: &str, _pkce_verifier: &str) -> Result<AccessToken> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let sub = self
            .codes
            .get(code)
            .ok_or_else(|| AuthError::TokenExchangeFailed("unknown mock code".to_string()))?;

        Ok(AccessToken::new(format!("{TOKEN_PREFIX}{sub}")))
    }

    async fn fetch_profile(&self, token: &AccessToken) -> Result<ProviderProfile> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let sub = token
            .secret()
            .strip_prefix(TOKEN_PREFIX)
            .ok_or_else(|| AuthError::ProfileFetchFailed("unknown mock token".to_string()))?;

        Ok(ProviderProfile {
            sub: sub.to_string(),
        })
    }
}
