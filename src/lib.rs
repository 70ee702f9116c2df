//! # osu-harvest
//!
//! Data-collection toolkit for osu! statistics: leaderboard, user and score
//! pulls with resilient rate-limit handling, plus a day-by-day best-play
//! series scraper with chart rendering.
//!
//! ## Design Philosophy
//!
//! - **One fetch loop** - every authenticated pull funnels through
//!   [`client::ApiClient::fetch`], which classifies each response (success,
//!   rate-limited, unauthorized) and drives backoff and token renewal
//! - **One request in flight** - drivers issue requests strictly one at a
//!   time, out of respect for the upstream rate limits
//! - **Lossless result sets** - records keep the full upstream JSON, typed
//!   only where the drivers actually read fields
//! - **Library-first** - the binaries are thin wiring around the drivers
//!
//! ## Quick Start
//!
//! ```no_run
//! use osu_harvest::{ApiClient, ClientCredentials, ClientCredentialsProvider, Config};
//! use osu_harvest::rankings;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::default();
//!     let credentials = ClientCredentials::load(&config.api.credentials_path).await?;
//!     let provider = Arc::new(ClientCredentialsProvider::new(
//!         config.api.token_url.clone(),
//!         credentials,
//!     ));
//!     let client =
//!         ApiClient::connect(config.api.base_url.clone(), provider, config.retry.clone()).await?;
//!
//!     let ids = rankings::collect_ranking_ids(&client, config.gamemode, 1).await?;
//!     println!("top 50: {ids:?}");
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Credentials, token exchange, and the current-token cell
pub mod auth;
/// Scatter-and-trendline rendering
pub mod chart;
/// Resilient fetch loop against the osu! API
pub mod client;
/// Configuration types
pub mod config;
/// Daily best-play time-series scraper
pub mod daily;
/// Error types
pub mod error;
/// Core domain records
pub mod models;
/// Result-set persistence and output naming
pub mod persist;
/// Rankings driver
pub mod rankings;
/// Backoff computation
pub mod retry;
/// Best-scores driver
pub mod scores;
/// Per-user and batch-user drivers
pub mod users;

// Re-export commonly used types
pub use auth::{AccessToken, ClientCredentials, ClientCredentialsProvider, TokenCell, TokenProvider};
pub use client::{ApiClient, RequestDescriptor};
pub use config::Config;
pub use daily::DailyBestScraper;
pub use error::{Error, Result};
pub use models::{BestPlay, Gamemode, Score, User, UserBests, UserId};
pub use persist::OutputName;
