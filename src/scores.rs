//! Best-scores driver
//!
//! The API serves at most 100 best scores per request; two fetches at
//! offsets 0 and 100 cover a user's top 200.

use crate::client::{ApiClient, RequestDescriptor};
use crate::error::Result;
use crate::models::{Gamemode, Score, UserBests, UserId};

/// Offsets of the two best-score pages (ranks 1-100 and 101-200)
pub const BEST_SCORE_OFFSETS: [u32; 2] = [0, 100];

/// Scores per best-score request, the API maximum
pub const BEST_SCORE_LIMIT: u32 = 100;

/// Fetch up to 200 best scores per user
///
/// Each record concatenates the offset-0 batch before the offset-100
/// batch, both in API order, under the user's ID.
pub async fn fetch_user_bests(
    client: &ApiClient,
    gamemode: Gamemode,
    ids: &[UserId],
) -> Result<Vec<UserBests>> {
    tracing::info!(count = ids.len(), "pulling best scores");
    let mut records = Vec::with_capacity(ids.len());

    for &id in ids {
        let mut best_scores = Vec::with_capacity(2 * BEST_SCORE_LIMIT as usize);
        for offset in BEST_SCORE_OFFSETS {
            tracing::info!(user = %id, offset, "pulling best score page");
            let request = RequestDescriptor::new(format!("users/{id}/scores/best"))
                .query("mode", gamemode.api_name())
                .query("limit", BEST_SCORE_LIMIT)
                .query("offset", offset);
            let scores: Vec<Score> = client.fetch(&request).await?;
            best_scores.extend(scores);
        }
        records.push(UserBests {
            user_id: id,
            best_scores,
        });
    }

    Ok(records)
}
