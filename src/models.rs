//! Core domain records for osu-harvest
//!
//! Result sets are saved verbatim, so every record keeps the full upstream
//! JSON object via a flattened map; only the fields the drivers actually
//! read are typed out.

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Unique identifier for an osu! user
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct UserId(pub u64);

impl UserId {
    /// Create a new UserId
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Get the inner u64 value
    pub fn get(&self) -> u64 {
        self.0
    }
}

impl From<u64> for UserId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl From<UserId> for u64 {
    fn from(id: UserId) -> Self {
        id.0
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for UserId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.parse()?))
    }
}

/// Ruleset the statistics belong to
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Gamemode {
    /// osu!standard
    #[default]
    Osu,
    /// osu!taiko
    Taiko,
    /// osu!catch
    Fruits,
    /// osu!mania
    Mania,
}

impl Gamemode {
    /// Path segment used by the osu! API v2 (`rankings/{mode}/performance`)
    pub fn api_name(&self) -> &'static str {
        match self {
            Gamemode::Osu => "osu",
            Gamemode::Taiko => "taiko",
            Gamemode::Fruits => "fruits",
            Gamemode::Mania => "mania",
        }
    }

    /// Numeric mode identifier used by the osu!track API
    pub fn osutrack_mode(&self) -> u8 {
        match self {
            Gamemode::Osu => 0,
            Gamemode::Taiko => 1,
            Gamemode::Fruits => 2,
            Gamemode::Mania => 3,
        }
    }
}

impl std::fmt::Display for Gamemode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.api_name())
    }
}

/// One page of the performance rankings
#[derive(Clone, Debug, Deserialize)]
pub struct RankingsPage {
    /// Entries in leaderboard rank order
    pub ranking: Vec<RankingEntry>,
}

/// A single leaderboard entry
#[derive(Clone, Debug, Deserialize)]
pub struct RankingEntry {
    /// The ranked user
    pub user: UserSummary,
    /// Remaining per-entry statistics (pp, accuracy, ...)
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Compact user object embedded in a rankings entry
#[derive(Clone, Debug, Deserialize)]
pub struct UserSummary {
    /// The user's identifier
    pub id: UserId,
    /// Display name, when present
    #[serde(default)]
    pub username: Option<String>,
    /// Remaining user fields
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Full user object from the per-user or batch endpoints, kept lossless
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct User {
    /// The user's identifier
    pub id: UserId,
    /// Everything else the API returned, preserved for the saved result set
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Response envelope of the multi-ID batch endpoint
#[derive(Clone, Debug, Deserialize)]
pub struct BatchUsersResponse {
    /// Users found for the requested IDs; missing IDs are simply absent
    #[serde(default)]
    pub users: Vec<User>,
}

/// A single score, kept lossless
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Score {
    /// Performance points, absent on loved/unranked scores
    #[serde(default)]
    pub pp: Option<f64>,
    /// Everything else the API returned
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Per-user best-score record
///
/// Serialized field names (`userID`, `bestScores`) match the result files
/// downstream analysis already consumes.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UserBests {
    /// The user the scores belong to
    #[serde(rename = "userID")]
    pub user_id: UserId,
    /// Best scores, offset-0 batch first, each batch in API order
    #[serde(rename = "bestScores")]
    pub best_scores: Vec<Score>,
}

/// Best play of a single day, from the osu!track API
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BestPlay {
    /// Performance points of the play
    pub pp: f64,
    /// Upstream timestamp string; see [`BestPlay::timestamp`]
    pub score_time: String,
    /// Everything else the API returned
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl BestPlay {
    /// Parse the upstream timestamp. osu!track has emitted both RFC 3339 and
    /// space-separated datetimes; both are accepted.
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.score_time)
            .map(|dt| dt.with_timezone(&Utc))
            .ok()
            .or_else(|| {
                NaiveDateTime::parse_from_str(&self.score_time, "%Y-%m-%d %H:%M:%S")
                    .ok()
                    .map(|naive| Utc.from_utc_datetime(&naive))
            })
    }
}
