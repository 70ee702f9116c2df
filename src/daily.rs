//! Daily best-play time-series scraper
//!
//! Walks the osu!track API one day at a time from the first recorded day to
//! the present. That API enforces no explicit rate limit, so the failure
//! signal is a transport or body error, answered with a flat pause and a
//! retry of the same day; a short politeness delay separates successful
//! days instead of a backoff schedule.

use crate::config::DailyConfig;
use crate::models::{BestPlay, Gamemode};
use chrono::NaiveDate;

/// Action argument of the daily-best binary
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum Mode {
    /// Collect the full day-by-day series and save it
    Scrape,
    /// Render the chart from a previously saved series
    Chart,
}

/// Scraper for the per-day best-play series
pub struct DailyBestScraper {
    http: reqwest::Client,
    base_url: String,
    gamemode: Gamemode,
    config: DailyConfig,
}

impl DailyBestScraper {
    /// Build a scraper against `base_url` (no auth required upstream)
    pub fn new(base_url: impl Into<String>, gamemode: Gamemode, config: DailyConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            gamemode,
            config,
        }
    }

    /// Collect the best play of every day in `[start, end)`
    ///
    /// Days whose payload is empty are skipped with a warning. Transport
    /// failures never skip a day; the same day is re-fetched until it
    /// answers.
    pub async fn collect_series(&self, start: NaiveDate, end: NaiveDate) -> Vec<BestPlay> {
        let mut series = Vec::new();
        let mut day = start;

        while day < end {
            tracing::info!(%day, "pulling daily best play");
            match self.best_plays_of(day).await.into_iter().next() {
                Some(play) => series.push(play),
                None => tracing::warn!(%day, "no plays recorded for day, skipping"),
            }
            tokio::time::sleep(self.config.politeness_delay).await;

            day = match day.succ_opt() {
                Some(next) => next,
                None => break,
            };
        }

        tracing::info!(count = series.len(), "daily series complete");
        series
    }

    /// Fetch one day's plays, retrying transport failures indefinitely
    async fn best_plays_of(&self, day: NaiveDate) -> Vec<BestPlay> {
        let next = day.succ_opt().unwrap_or(day);
        loop {
            match self.try_day(day, next).await {
                Ok(plays) => return plays,
                Err(error) => {
                    tracing::warn!(
                        %day,
                        error = %error,
                        delay_s = self.config.transport_retry_delay.as_secs(),
                        "transport failure, holding before retry"
                    );
                    tokio::time::sleep(self.config.transport_retry_delay).await;
                }
            }
        }
    }

    async fn try_day(&self, from: NaiveDate, to: NaiveDate) -> reqwest::Result<Vec<BestPlay>> {
        self.http
            .get(format!("{}/bestplays", self.base_url))
            .query(&[
                ("mode", self.gamemode.osutrack_mode().to_string()),
                ("from", from.to_string()),
                ("to", to.to_string()),
            ])
            .send()
            .await?
            .json::<Vec<BestPlay>>()
            .await
    }
}

/// Running-maximum subsequence of a series ("record plays")
///
/// The first entry is always a record; a later entry qualifies only with a
/// strictly greater pp than every record before it, so ties are excluded.
pub fn record_plays(series: &[BestPlay]) -> Vec<BestPlay> {
    let mut records: Vec<BestPlay> = Vec::new();
    for play in series {
        match records.last() {
            None => records.push(play.clone()),
            Some(best) if play.pp > best.pp => records.push(play.clone()),
            Some(_) => {}
        }
    }
    records
}
