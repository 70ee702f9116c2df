//! Error types for osu-harvest
//!
//! One enum covers the whole crate. Fetch-loop failures carry the endpoint
//! and attempt count so an operator can tell a rate-limit exhaustion from a
//! credential problem without re-running with extra logging.

use thiserror::Error;

/// Result type alias for osu-harvest operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for osu-harvest
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable description of the configuration issue
        message: String,
        /// The configuration key that caused the error, when known
        key: Option<String>,
    },

    /// Transport-level failure from the HTTP client
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// A 200 response whose body did not match the expected shape.
    /// Fails the single request, never the whole run.
    #[error("failed to decode response from {endpoint}: {source}")]
    Decode {
        /// Endpoint path of the request whose body was malformed
        endpoint: String,
        /// The underlying JSON error
        #[source]
        source: serde_json::Error,
    },

    /// Serialization error outside of response decoding (persistence, config)
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Credential exchange failed, or the upstream rejected a freshly
    /// issued token
    #[error("authentication failed: {0}")]
    Auth(String),

    /// A status outside the handled set (200/429/401) persisted through the
    /// retry budget
    #[error("unexpected HTTP status {status} from {endpoint} after {attempts} retries")]
    UnexpectedStatus {
        /// The last status code observed
        status: u16,
        /// Endpoint path of the failing request
        endpoint: String,
        /// Number of retries performed before giving up
        attempts: u32,
    },

    /// Rate limiting persisted through the retry budget
    #[error("retry budget exhausted after {attempts} retries for {endpoint}")]
    RetryBudgetExhausted {
        /// Number of retries performed before giving up
        attempts: u32,
        /// Endpoint path of the failing request
        endpoint: String,
    },

    /// Chart rendering or encoding failed
    #[error("chart error: {0}")]
    Chart(String),
}
