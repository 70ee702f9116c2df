//! Resilient fetch loop against the osu! API
//!
//! Every data pull in this crate funnels through [`ApiClient::fetch`]: one
//! logical request at a time, each attempt classified by HTTP status. A 429
//! backs off exponentially with jitter under a bounded budget; a 401 swaps
//! the bearer token through the shared cell and re-attempts immediately;
//! any other non-200 status consumes the same budget and then surfaces a
//! diagnostic instead of spinning.

use crate::auth::{TokenCell, TokenProvider};
use crate::config::RetryConfig;
use crate::error::{Error, Result};
use crate::retry;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use std::sync::Arc;

/// A single logical API request: endpoint path plus query parameters
///
/// The Authorization header is built from the current token at send time,
/// not when the descriptor is constructed, so a refresh between attempts is
/// always observed.
#[derive(Clone, Debug)]
pub struct RequestDescriptor {
    path: String,
    query: Vec<(String, String)>,
}

impl RequestDescriptor {
    /// Describe a GET against `path`, relative to the API base URL
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            query: Vec::new(),
        }
    }

    /// Append a query parameter; repeated keys are allowed (`ids[]`)
    pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    /// The endpoint path, for diagnostics
    pub fn path(&self) -> &str {
        &self.path
    }
}

/// Classification of an upstream response status
enum ResponseClass {
    Ok,
    RateLimited,
    Unauthorized,
    Unexpected(StatusCode),
}

impl From<StatusCode> for ResponseClass {
    fn from(status: StatusCode) -> Self {
        match status {
            StatusCode::OK => Self::Ok,
            StatusCode::TOO_MANY_REQUESTS => Self::RateLimited,
            StatusCode::UNAUTHORIZED => Self::Unauthorized,
            other => Self::Unexpected(other),
        }
    }
}

/// Authenticated client for the osu! API v2
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    token: TokenCell,
    provider: Arc<dyn TokenProvider>,
    retry: RetryConfig,
}

impl ApiClient {
    /// Perform the startup token exchange and build a client
    pub async fn connect(
        base_url: impl Into<String>,
        provider: Arc<dyn TokenProvider>,
        retry: RetryConfig,
    ) -> Result<Self> {
        let initial = provider.issue_token().await?;
        Ok(Self::with_token_cell(
            base_url,
            TokenCell::new(initial),
            provider,
            retry,
        ))
    }

    /// Build a client around an existing token cell
    ///
    /// Lets several clients share one current-token cell, and lets tests
    /// seed a token without hitting the oauth endpoint.
    pub fn with_token_cell(
        base_url: impl Into<String>,
        token: TokenCell,
        provider: Arc<dyn TokenProvider>,
        retry: RetryConfig,
    ) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            http: reqwest::Client::new(),
            base_url,
            token,
            provider,
            retry,
        }
    }

    /// The shared current-token cell
    pub fn token_cell(&self) -> &TokenCell {
        &self.token
    }

    /// Fetch a descriptor and decode its 200 payload
    ///
    /// Terminal outcomes: the decoded payload, a transport error, a decode
    /// error, an auth failure the provider could not recover, or budget
    /// exhaustion on 429/unexpected statuses.
    pub async fn fetch<T: DeserializeOwned>(&self, request: &RequestDescriptor) -> Result<T> {
        let url = format!("{}/{}", self.base_url, request.path());
        let mut retries: u32 = 0;
        let mut just_refreshed = false;

        loop {
            let token = self.token.current().await;
            let response = self
                .http
                .get(&url)
                .query(&request.query)
                .header(ACCEPT, "application/json")
                .header(CONTENT_TYPE, "application/json")
                .bearer_auth(token.as_str())
                .send()
                .await?;

            let status = response.status();
            match ResponseClass::from(status) {
                ResponseClass::Ok => {
                    let body = response.text().await?;
                    return serde_json::from_str(&body).map_err(|source| Error::Decode {
                        endpoint: request.path().to_string(),
                        source,
                    });
                }
                ResponseClass::Unauthorized => {
                    if just_refreshed {
                        return Err(Error::Auth(format!(
                            "{} rejected a freshly issued token",
                            request.path()
                        )));
                    }
                    tracing::info!(endpoint = request.path(), "token expired, re-authenticating");
                    let fresh = self.provider.issue_token().await?;
                    self.token.replace(fresh).await;
                    just_refreshed = true;
                }
                class @ (ResponseClass::RateLimited | ResponseClass::Unexpected(_)) => {
                    if retries >= self.retry.max_attempts {
                        return Err(match class {
                            ResponseClass::RateLimited => Error::RetryBudgetExhausted {
                                attempts: retries,
                                endpoint: request.path().to_string(),
                            },
                            _ => Error::UnexpectedStatus {
                                status: status.as_u16(),
                                endpoint: request.path().to_string(),
                                attempts: retries,
                            },
                        });
                    }

                    let delay = retry::backoff_delay(&self.retry, retries);
                    tracing::warn!(
                        endpoint = request.path(),
                        status = status.as_u16(),
                        retry = retries,
                        delay_ms = delay.as_millis() as u64,
                        "retryable response, backing off"
                    );
                    tokio::time::sleep(delay).await;
                    retries += 1;
                    just_refreshed = false;
                }
            }
        }
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::AccessToken;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::{Duration, Instant};
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    struct CountingProvider {
        calls: AtomicU32,
    }

    impl CountingProvider {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicU32::new(0),
            })
        }

        fn count(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl TokenProvider for CountingProvider {
        async fn issue_token(&self) -> Result<AccessToken> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            Ok(AccessToken::new(format!("token-{n}")))
        }
    }

    fn fast_retry(max_attempts: u32) -> RetryConfig {
        RetryConfig {
            max_attempts,
            backoff_unit: Duration::from_millis(20),
            max_delay: Duration::from_secs(5),
        }
    }

    fn client_with(server: &MockServer, provider: Arc<CountingProvider>, retry: RetryConfig) -> ApiClient {
        ApiClient::with_token_cell(
            server.uri(),
            TokenCell::new(AccessToken::new("seed-token")),
            provider,
            retry,
        )
    }

    #[tokio::test]
    async fn ok_response_decodes_payload() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/users/2/osu"))
            .and(query_param("key", "id"))
            .and(header("Authorization", "Bearer seed-token"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"id": 2})),
            )
            .mount(&server)
            .await;

        let provider = CountingProvider::new();
        let client = client_with(&server, provider.clone(), fast_retry(0));
        let request = RequestDescriptor::new("users/2/osu").query("key", "id");

        let body: serde_json::Value = client.fetch(&request).await.unwrap();
        assert_eq!(body["id"], 2);
        assert_eq!(provider.count(), 0, "no refresh on a clean 200");
    }

    #[tokio::test]
    async fn rate_limits_back_off_exponentially_then_succeed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rankings/osu/performance"))
            .respond_with(ResponseTemplate::new(429))
            .up_to_n_times(2)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/rankings/osu/performance"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"ranking": []})),
            )
            .mount(&server)
            .await;

        let provider = CountingProvider::new();
        let client = client_with(&server, provider.clone(), fast_retry(5));
        let request = RequestDescriptor::new("rankings/osu/performance").query("page", 1);

        let started = Instant::now();
        let body: serde_json::Value = client.fetch(&request).await.unwrap();
        let elapsed = started.elapsed();

        assert!(body["ranking"].as_array().unwrap().is_empty());
        // Two backoffs at unit 20ms: 2^0 and 2^1 units plus at most one
        // unit of jitter each.
        assert!(
            elapsed >= Duration::from_millis(60),
            "backoff too short: {elapsed:?}"
        );
        assert!(
            elapsed < Duration::from_millis(1500),
            "backoff too long: {elapsed:?}"
        );
        assert_eq!(provider.count(), 0, "429 must not touch the token");
    }

    #[tokio::test]
    async fn unauthorized_refreshes_once_and_does_not_consume_budget() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/users/5/osu"))
            .and(header("Authorization", "Bearer seed-token"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/users/5/osu"))
            .and(header("Authorization", "Bearer token-1"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"id": 5})),
            )
            .mount(&server)
            .await;

        let provider = CountingProvider::new();
        // max_attempts = 0: if the 401 consumed retry budget, this would fail.
        let client = client_with(&server, provider.clone(), fast_retry(0));
        let request = RequestDescriptor::new("users/5/osu");

        let body: serde_json::Value = client.fetch(&request).await.unwrap();
        assert_eq!(body["id"], 5);
        assert_eq!(provider.count(), 1, "exactly one provider invocation");
    }

    #[tokio::test]
    async fn refresh_updates_the_shared_cell() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/ping"))
            .and(header("Authorization", "Bearer seed-token"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/ping"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .mount(&server)
            .await;

        let provider = CountingProvider::new();
        let client = client_with(&server, provider, fast_retry(0));
        let _: serde_json::Value = client
            .fetch(&RequestDescriptor::new("ping"))
            .await
            .unwrap();

        assert_eq!(client.token_cell().current().await.as_str(), "token-1");
    }

    #[tokio::test]
    async fn unauthorized_twice_in_a_row_is_fatal() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/users/9/osu"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let provider = CountingProvider::new();
        let client = client_with(&server, provider.clone(), fast_retry(5));
        let err = client
            .fetch::<serde_json::Value>(&RequestDescriptor::new("users/9/osu"))
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Auth(_)), "got {err:?}");
        assert_eq!(provider.count(), 1, "one refresh before giving up");
    }

    #[tokio::test]
    async fn rate_limit_exhaustion_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/users"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;

        let provider = CountingProvider::new();
        let client = client_with(&server, provider, fast_retry(2));
        let err = client
            .fetch::<serde_json::Value>(&RequestDescriptor::new("users"))
            .await
            .unwrap_err();

        match err {
            Error::RetryBudgetExhausted { attempts, endpoint } => {
                assert_eq!(attempts, 2);
                assert_eq!(endpoint, "users");
            }
            other => panic!("expected RetryBudgetExhausted, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn unexpected_status_is_retried_then_surfaced() {
        let server = MockServer::start().await;
        let hits = Arc::new(AtomicU32::new(0));
        {
            let hits = hits.clone();
            Mock::given(method("GET"))
                .and(path("/users"))
                .respond_with(move |_: &wiremock::Request| {
                    hits.fetch_add(1, Ordering::SeqCst);
                    ResponseTemplate::new(503)
                })
                .mount(&server)
                .await;
        }

        let provider = CountingProvider::new();
        let client = client_with(&server, provider, fast_retry(1));
        let err = client
            .fetch::<serde_json::Value>(&RequestDescriptor::new("users"))
            .await
            .unwrap_err();

        match err {
            Error::UnexpectedStatus { status, attempts, .. } => {
                assert_eq!(status, 503);
                assert_eq!(attempts, 1);
            }
            other => panic!("expected UnexpectedStatus, got {other:?}"),
        }
        assert_eq!(hits.load(Ordering::SeqCst), 2, "initial attempt + 1 retry");
    }

    #[tokio::test]
    async fn malformed_body_fails_the_single_request() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/users/3/osu"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
            .mount(&server)
            .await;

        let provider = CountingProvider::new();
        let client = client_with(&server, provider, fast_retry(3));
        let err = client
            .fetch::<crate::models::User>(&RequestDescriptor::new("users/3/osu"))
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Decode { .. }), "got {err:?}");
    }
}
