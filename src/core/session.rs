//! Authenticated session capability.
//!
//! The extraction pipeline never reaches for ambient credentials: a
//! [`SessionProvider`] is handed to the endpoint client at construction and
//! wrapped in a [`SessionHandle`], which is the single shared mutable resource
//! of a run and allows at most one token refresh per run.

use reqwest::{Client, Method, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::http::{bearer_header_map, OAuthCredentials};
use crate::{HoopsError, Result};

/// Yahoo OAuth2 token endpoint.
pub const TOKEN_URL: &str = "https://api.login.yahoo.com/oauth2/get_token";

/// Status code and body of one authorized request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// Issues authorized HTTP requests and renews its own credentials.
///
/// Credential storage and token persistence belong to the implementor.
#[allow(async_fn_in_trait)]
pub trait SessionProvider {
    async fn authorized_request(
        &self,
        method: Method,
        url: &str,
        params: &[(String, String)],
    ) -> Result<RawResponse>;

    /// Renew credentials. `Ok(false)` means the provider could not refresh.
    async fn refresh(&mut self) -> Result<bool>;
}

/// Run-scoped wrapper enforcing "refresh at most once per extraction run".
#[derive(Debug)]
pub struct SessionHandle<S> {
    provider: S,
    refreshed: bool,
}

impl<S: SessionProvider> SessionHandle<S> {
    pub fn new(provider: S) -> Self {
        Self {
            provider,
            refreshed: false,
        }
    }

    pub async fn request(
        &self,
        method: Method,
        url: &str,
        params: &[(String, String)],
    ) -> Result<RawResponse> {
        self.provider.authorized_request(method, url, params).await
    }

    /// Refresh the underlying session once. A second call in the same run, or a
    /// refresh the provider rejects, yields `AuthExpired`.
    pub async fn reauthenticate(&mut self) -> Result<()> {
        if self.refreshed {
            warn!("Session already refreshed once in this run; giving up");
            return Err(HoopsError::AuthExpired);
        }
        self.refreshed = true;

        match self.provider.refresh().await {
            Ok(true) => {
                info!("Session refreshed");
                Ok(())
            }
            Ok(false) => {
                warn!("Session provider declined to refresh");
                Err(HoopsError::AuthExpired)
            }
            Err(e) => {
                warn!("Session refresh failed: {}", e);
                Err(HoopsError::AuthExpired)
            }
        }
    }

    pub fn has_refreshed(&self) -> bool {
        self.refreshed
    }

    pub fn provider(&self) -> &S {
        &self.provider
    }

    pub fn into_inner(self) -> S {
        self.provider
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
}

/// Bearer-token session over a shared `reqwest::Client`.
pub struct OAuthSession {
    client: Client,
    credentials: OAuthCredentials,
    token_url: String,
}

impl OAuthSession {
    pub fn new(credentials: OAuthCredentials) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("fantasy-hoops/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self {
            client,
            credentials,
            token_url: TOKEN_URL.to_string(),
        })
    }

    pub fn from_env() -> Result<Self> {
        Self::new(OAuthCredentials::from_env()?)
    }

    /// Point token refreshes at a different endpoint.
    pub fn with_token_url(mut self, url: impl Into<String>) -> Self {
        self.token_url = url.into();
        self
    }

    pub fn access_token(&self) -> &str {
        &self.credentials.access_token
    }
}

impl SessionProvider for OAuthSession {
    async fn authorized_request(
        &self,
        method: Method,
        url: &str,
        params: &[(String, String)],
    ) -> Result<RawResponse> {
        let headers = bearer_header_map(&self.credentials.access_token)?;
        let res = self
            .client
            .request(method, url)
            .headers(headers)
            .query(params)
            .send()
            .await?;
        let status = res.status().as_u16();
        let body = res.text().await?;
        debug!("{} -> {} ({} bytes)", url, status, body.len());
        Ok(RawResponse { status, body })
    }

    async fn refresh(&mut self) -> Result<bool> {
        let Some((refresh_token, client_id, client_secret)) = self.credentials.refresh_parts()
        else {
            warn!("No refresh credentials configured");
            return Ok(false);
        };

        let form = [
            ("grant_type", "refresh_token"),
            ("redirect_uri", "oob"),
            ("refresh_token", refresh_token),
        ];
        let res = self
            .client
            .post(&self.token_url)
            .basic_auth(client_id, Some(client_secret))
            .form(&form)
            .send()
            .await?;

        if res.status() != StatusCode::OK {
            warn!("Token endpoint returned {}", res.status());
            return Ok(false);
        }

        let token: TokenResponse = res.json().await?;
        self.credentials.access_token = token.access_token;
        if let Some(rt) = token.refresh_token {
            self.credentials.refresh_token = Some(rt);
        }
        Ok(true)
    }
}
