//! Identity provider client implementing the session verifier port
//!
//! The portal never validates credentials itself: every bearer token is
//! resolved against the provider's userinfo endpoint, and the provider's
//! rejection is the portal's rejection.

use std::time::Duration;

use async_trait::async_trait;
use clinica_core::identity::ports::SessionVerifier;
use clinica_domain::{ClinicaError, CurrentUser, IdentityConfig, Result};
use reqwest::{Method, StatusCode};
use serde::Deserialize;
use tracing::debug;

use crate::http::HttpClient;

/// Configuration for the identity client
#[derive(Debug, Clone)]
pub struct IdentityClientConfig {
    /// Base URL of the identity provider
    pub issuer_url: String,
    /// Request timeout
    pub timeout: Duration,
}

impl IdentityClientConfig {
    /// Build an identity client config from the application section.
    pub fn from_identity_config(config: &IdentityConfig) -> Self {
        Self { issuer_url: config.issuer_url.clone(), timeout: Duration::from_secs(5) }
    }
}

/// The subset of the provider's userinfo payload the portal consumes
#[derive(Debug, Deserialize)]
struct UserInfo {
    sub: String,
    email: String,
    name: Option<String>,
}

/// HTTP session verifier backed by the provider's userinfo endpoint
pub struct IdentityClient {
    http: HttpClient,
    config: IdentityClientConfig,
}

impl IdentityClient {
    /// Create a new identity client.
    pub fn new(config: IdentityClientConfig) -> Result<Self> {
        let http = HttpClient::builder().timeout(config.timeout).build()?;
        Ok(Self { http, config })
    }

    fn endpoint(&self) -> String {
        format!("{}/userinfo", self.config.issuer_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl SessionVerifier for IdentityClient {
    async fn verify(&self, bearer_token: &str) -> Result<CurrentUser> {
        let request =
            self.http.request(Method::GET, self.endpoint()).bearer_auth(bearer_token);
        let response = self.http.send(request).await?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(ClinicaError::Auth("session is invalid or expired".into()));
        }
        if !status.is_success() {
            return Err(ClinicaError::Upstream(format!(
                "identity provider returned {status}"
            )));
        }

        let info: UserInfo = response.json().await.map_err(|err| {
            ClinicaError::Upstream(format!("unreadable userinfo response: {err}"))
        })?;
        debug!(user_id = %info.sub, "session verified");
        Ok(CurrentUser { id: info.sub, email: info.email, display_name: info.name })
    }
}
