//! Result-set persistence and output naming
//!
//! Drivers hand over one finished, fully-materialized collection at the end
//! of their loop; nothing is flushed mid-run. Filenames encode what the
//! file holds: kind, gamemode, optional ID range, record count, optional
//! date stamp.

use crate::error::Result;
use crate::models::Gamemode;
use chrono::NaiveDate;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Serialize a finished collection to `path` as JSON
pub async fn save_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let body = serde_json::to_vec(value)?;
    tokio::fs::write(path, body).await?;
    tracing::info!(path = %path.display(), "saved result set");
    Ok(())
}

/// Builder for output filenames
///
/// Parts joined with underscores in a fixed order:
/// `{gamemode}_{begin}-{end}_{kind}_{count}_{YYYY-MM-DD}.json`, with every
/// part except the kind optional.
#[derive(Clone, Debug)]
pub struct OutputName {
    kind: String,
    gamemode: Option<Gamemode>,
    id_range: Option<(u64, u64)>,
    count: Option<usize>,
    date: Option<NaiveDate>,
}

impl OutputName {
    /// Start a name for the given record kind (`users`, `user-bests`, ...)
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            gamemode: None,
            id_range: None,
            count: None,
            date: None,
        }
    }

    /// Prefix the gamemode
    pub fn gamemode(mut self, gamemode: Gamemode) -> Self {
        self.gamemode = Some(gamemode);
        self
    }

    /// Include the covered range (leaderboard positions or IDs)
    pub fn id_range(mut self, begin: u64, end: u64) -> Self {
        self.id_range = Some((begin, end));
        self
    }

    /// Include the record count
    pub fn count(mut self, count: usize) -> Self {
        self.count = Some(count);
        self
    }

    /// Append a date stamp
    pub fn date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    /// The bare file name
    pub fn file_name(&self) -> String {
        let mut parts: Vec<String> = Vec::with_capacity(5);
        if let Some(gamemode) = self.gamemode {
            parts.push(gamemode.api_name().to_string());
        }
        if let Some((begin, end)) = self.id_range {
            parts.push(format!("{begin}-{end}"));
        }
        parts.push(self.kind.clone());
        if let Some(count) = self.count {
            parts.push(count.to_string());
        }
        if let Some(date) = self.date {
            parts.push(date.format("%Y-%m-%d").to_string());
        }
        format!("{}.json", parts.join("_"))
    }

    /// The full path under `dir`
    pub fn in_dir(&self, dir: &Path) -> PathBuf {
        dir.join(self.file_name())
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{UserBests, UserId};

    #[test]
    fn kind_alone_names_the_file() {
        assert_eq!(OutputName::new("allplays").file_name(), "allplays.json");
    }

    #[test]
    fn users_name_carries_gamemode_and_count() {
        let name = OutputName::new("users")
            .gamemode(Gamemode::Osu)
            .count(10_000)
            .file_name();
        assert_eq!(name, "osu_users_10000.json");
    }

    #[test]
    fn chunked_bests_name_matches_the_full_pattern() {
        let name = OutputName::new("user-bests")
            .gamemode(Gamemode::Osu)
            .id_range(1, 1000)
            .count(1000)
            .date(NaiveDate::from_ymd_opt(2025, 5, 5).unwrap())
            .file_name();
        assert_eq!(name, "osu_1-1000_user-bests_1000_2025-05-05.json");
    }

    #[test]
    fn in_dir_joins_the_output_directory() {
        let path = OutputName::new("records").in_dir(Path::new("/tmp/out"));
        assert_eq!(path, PathBuf::from("/tmp/out/records.json"));
    }

    #[tokio::test]
    async fn save_json_round_trips_a_collection() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bests.json");
        let records = vec![UserBests {
            user_id: UserId(7),
            best_scores: vec![],
        }];

        save_json(&path, &records).await.unwrap();

        let raw = tokio::fs::read_to_string(&path).await.unwrap();
        let back: Vec<UserBests> = serde_json::from_str(&raw).unwrap();
        assert_eq!(back.len(), 1);
        assert_eq!(back[0].user_id, UserId(7));
        assert!(raw.contains("userID"), "field names preserved on disk");
    }
}
