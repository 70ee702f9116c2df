//! Credentials, token exchange, and the current-token cell
//!
//! The osu! API uses a client-credentials grant: a one-shot POST turns the
//! client ID/secret into an opaque bearer token with an unknown expiry. The
//! token lives in a [`TokenCell`]; fetch loops read it fresh on every
//! attempt and replace it wholesale when the upstream answers 401.

use crate::error::{Error, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Opaque bearer credential for the osu! API
///
/// Replaced wholesale on renewal, never mutated in place.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    /// Wrap a raw token string
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// The raw token, for the Authorization header
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// Tokens are credentials; keep them out of debug logs.
impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("AccessToken(<redacted>)")
    }
}

/// Client credentials as stored in `client-credentials.json`
///
/// Field names follow the credential files issued alongside the osu! API
/// developer console.
#[derive(Clone, Serialize, Deserialize)]
pub struct ClientCredentials {
    /// OAuth client identifier
    #[serde(rename = "OSU_API_CLIENT_ID")]
    pub client_id: String,

    /// OAuth client secret
    #[serde(rename = "OSU_API_CLIENT_SECRET")]
    pub client_secret: String,
}

impl ClientCredentials {
    /// Read credentials from a JSON file
    pub async fn load(path: &Path) -> Result<Self> {
        let raw = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| Error::Config {
                message: format!("cannot read credentials file {}: {e}", path.display()),
                key: None,
            })?;
        serde_json::from_str(&raw).map_err(|e| Error::Config {
            message: format!("invalid credentials file {}: {e}", path.display()),
            key: None,
        })
    }
}

impl std::fmt::Debug for ClientCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientCredentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .finish()
    }
}

/// Issues bearer tokens
///
/// Called once at startup and again on every observed 401. Kept as a trait
/// so tests can count invocations with a fake.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    /// Obtain a fresh bearer token
    async fn issue_token(&self) -> Result<AccessToken>;
}

/// Token provider performing the client-credentials exchange
pub struct ClientCredentialsProvider {
    http: reqwest::Client,
    token_url: String,
    credentials: ClientCredentials,
}

#[derive(Serialize)]
struct TokenRequest<'a> {
    client_id: &'a str,
    client_secret: &'a str,
    grant_type: &'static str,
    scope: &'static str,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

impl ClientCredentialsProvider {
    /// Build a provider for the given token endpoint
    pub fn new(token_url: impl Into<String>, credentials: ClientCredentials) -> Self {
        Self {
            http: reqwest::Client::new(),
            token_url: token_url.into(),
            credentials,
        }
    }
}

#[async_trait]
impl TokenProvider for ClientCredentialsProvider {
    async fn issue_token(&self) -> Result<AccessToken> {
        let response = self
            .http
            .post(&self.token_url)
            .header(reqwest::header::ACCEPT, "application/json")
            .json(&TokenRequest {
                client_id: &self.credentials.client_id,
                client_secret: &self.credentials.client_secret,
                grant_type: "client_credentials",
                scope: "public",
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Auth(format!(
                "token exchange failed with status {status}"
            )));
        }

        let body: TokenResponse = response
            .json()
            .await
            .map_err(|e| Error::Auth(format!("malformed token response: {e}")))?;

        tracing::info!("obtained fresh bearer token");
        Ok(AccessToken::new(body.access_token))
    }
}

/// Shared cell holding the current bearer token
///
/// At most one token is current at any instant. Readers take the value
/// fresh at send time, so a replacement is observed by every later attempt,
/// including retries already in flight around the swap.
#[derive(Clone)]
pub struct TokenCell {
    inner: Arc<RwLock<AccessToken>>,
}

impl TokenCell {
    /// Create a cell holding an initial token
    pub fn new(initial: AccessToken) -> Self {
        Self {
            inner: Arc::new(RwLock::new(initial)),
        }
    }

    /// The current token
    pub async fn current(&self) -> AccessToken {
        self.inner.read().await.clone()
    }

    /// Replace the current token wholesale
    pub async fn replace(&self, fresh: AccessToken) {
        *self.inner.write().await = fresh;
    }
}
