//! Configuration types for osu-harvest
//!
//! Every knob has a default matching the upstream services' real limits, so
//! `Config::default()` is a working setup once a credentials file is in
//! place. A JSON file can override any subset of fields.

use crate::error::{Error, Result};
use crate::models::Gamemode;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Upstream endpoints and the credentials store location
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the osu! API v2 (default: "https://osu.ppy.sh/api/v2")
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// OAuth token endpoint (default: "https://osu.ppy.sh/oauth/token")
    #[serde(default = "default_token_url")]
    pub token_url: String,

    /// Base URL of the osu!track API used by the daily scraper
    #[serde(default = "default_osutrack_url")]
    pub osutrack_url: String,

    /// Path to the client credentials JSON file
    #[serde(default = "default_credentials_path")]
    pub credentials_path: PathBuf,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            token_url: default_token_url(),
            osutrack_url: default_osutrack_url(),
            credentials_path: default_credentials_path(),
        }
    }
}

/// Bounded retry policy for the resilient fetch loop
///
/// A rate-limited or otherwise retryable response sleeps
/// `backoff_unit * 2^retry_count` plus up to one unit of jitter, capped at
/// `max_delay`, then re-attempts. After `max_attempts` retries the request
/// fails with a reported error instead of spinning.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of retries per logical request (default: 10)
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Base unit of the exponential backoff (default: 1s, the upstream's
    /// expected politeness scale)
    #[serde(default = "default_backoff_unit")]
    pub backoff_unit: Duration,

    /// Upper bound on any single backoff sleep (default: 300s)
    #[serde(default = "default_max_delay")]
    pub max_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            backoff_unit: default_backoff_unit(),
            max_delay: default_max_delay(),
        }
    }
}

/// Rankings driver span
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RankingsConfig {
    /// Number of leaderboard pages to walk (default: 200; at 50 entries per
    /// page that is the top 10,000 users)
    #[serde(default = "default_pages")]
    pub pages: u32,
}

impl Default for RankingsConfig {
    fn default() -> Self {
        Self {
            pages: default_pages(),
        }
    }
}

/// Fixed-stride sampling scheme over the user ID space
///
/// Blocks of `batch_size` synthetic IDs, taking every `stride`-th ID up to
/// `max_user_id`. The defaults sample a quarter of the ID space in blocks
/// of 50, the batch endpoint's maximum.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SampleConfig {
    /// Highest user ID worth probing (default: 37,900,000)
    #[serde(default = "default_max_user_id")]
    pub max_user_id: u64,

    /// Take every `stride`-th ID (default: 4)
    #[serde(default = "default_stride")]
    pub stride: u64,

    /// IDs per batch request (default: 50)
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
}

impl Default for SampleConfig {
    fn default() -> Self {
        Self {
            max_user_id: default_max_user_id(),
            stride: default_stride(),
            batch_size: default_batch_size(),
        }
    }
}

/// Best-scores driver chunking
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BestsConfig {
    /// Users per output file (default: 1000)
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
}

impl Default for BestsConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
        }
    }
}

/// Daily best-play scraper knobs
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DailyConfig {
    /// First day of the series (default: 2007-10-05, the first day with
    /// recorded plays)
    #[serde(default = "default_start_date")]
    pub start_date: NaiveDate,

    /// Delay between successful days; the osu!track API has no explicit
    /// rate limit, this is plain politeness (default: 500ms)
    #[serde(default = "default_politeness_delay")]
    pub politeness_delay: Duration,

    /// Flat delay before re-fetching a day after a transport failure
    /// (default: 60s)
    #[serde(default = "default_transport_retry_delay")]
    pub transport_retry_delay: Duration,
}

impl Default for DailyConfig {
    fn default() -> Self {
        Self {
            start_date: default_start_date(),
            politeness_delay: default_politeness_delay(),
            transport_retry_delay: default_transport_retry_delay(),
        }
    }
}

/// Top-level configuration for all four pull tools
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    /// Upstream endpoints and credentials location
    #[serde(default)]
    pub api: ApiConfig,

    /// Ruleset to pull statistics for
    #[serde(default)]
    pub gamemode: Gamemode,

    /// Rankings driver span
    #[serde(default)]
    pub rankings: RankingsConfig,

    /// Batch sampling scheme
    #[serde(default)]
    pub sample: SampleConfig,

    /// Best-scores chunking
    #[serde(default)]
    pub bests: BestsConfig,

    /// Retry policy shared by all authenticated fetches
    #[serde(default)]
    pub retry: RetryConfig,

    /// Daily scraper knobs
    #[serde(default)]
    pub daily: DailyConfig,

    /// Directory result sets are written into (default: current directory)
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            gamemode: Gamemode::default(),
            rankings: RankingsConfig::default(),
            sample: SampleConfig::default(),
            bests: BestsConfig::default(),
            retry: RetryConfig::default(),
            daily: DailyConfig::default(),
            output_dir: default_output_dir(),
        }
    }
}

impl Config {
    /// Load a configuration file, filling unset fields with defaults
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| Error::Config {
            message: format!("cannot read {}: {e}", path.display()),
            key: None,
        })?;
        serde_json::from_str(&raw).map_err(|e| Error::Config {
            message: format!("invalid config {}: {e}", path.display()),
            key: None,
        })
    }
}

fn default_base_url() -> String {
    "https://osu.ppy.sh/api/v2".to_string()
}

fn default_token_url() -> String {
    "https://osu.ppy.sh/oauth/token".to_string()
}

fn default_osutrack_url() -> String {
    "https://osutrack-api.ameo.dev".to_string()
}

fn default_credentials_path() -> PathBuf {
    PathBuf::from("client-credentials.json")
}

fn default_max_attempts() -> u32 {
    10
}

fn default_backoff_unit() -> Duration {
    Duration::from_secs(1)
}

fn default_max_delay() -> Duration {
    Duration::from_secs(300)
}

fn default_pages() -> u32 {
    200
}

fn default_max_user_id() -> u64 {
    37_900_000
}

fn default_stride() -> u64 {
    4
}

fn default_batch_size() -> usize {
    50
}

fn default_chunk_size() -> usize {
    1000
}

fn default_start_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2007, 10, 5).unwrap_or(NaiveDate::MIN)
}

fn default_politeness_delay() -> Duration {
    Duration::from_millis(500)
}

fn default_transport_retry_delay() -> Duration {
    Duration::from_secs(60)
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}
