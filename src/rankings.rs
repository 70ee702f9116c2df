//! Rankings driver: walk the performance leaderboard and accumulate user IDs

use crate::client::{ApiClient, RequestDescriptor};
use crate::error::Result;
use crate::models::{Gamemode, RankingsPage, UserId};

/// Entries per leaderboard page, fixed by the upstream API
pub const ENTRIES_PER_PAGE: usize = 50;

/// Collect user IDs from the performance rankings, in leaderboard order
///
/// Walks pages `1..=pages`; each carries [`ENTRIES_PER_PAGE`] entries, so
/// the default 200-page span yields the top 10,000 users. IDs come back in
/// page-then-in-page order, which is exactly rank order.
pub async fn collect_ranking_ids(
    client: &ApiClient,
    gamemode: Gamemode,
    pages: u32,
) -> Result<Vec<UserId>> {
    let mut user_ids = Vec::with_capacity(pages as usize * ENTRIES_PER_PAGE);

    for page in 1..=pages {
        tracing::info!(page, mode = %gamemode, "pulling rankings page");
        let request =
            RequestDescriptor::new(format!("rankings/{}/performance", gamemode.api_name()))
                .query("page", page);
        let body: RankingsPage = client.fetch(&request).await?;
        user_ids.extend(body.ranking.into_iter().map(|entry| entry.user.id));
    }

    tracing::info!(count = user_ids.len(), "rankings walk complete");
    Ok(user_ids)
}
