//! Pull the top-200 best scores of every ranked user, saved in chunks.
//!
//! Walks the rankings for user IDs, then processes them in chunks of 1,000
//! leaderboard positions, writing one date-stamped file per chunk so an
//! interrupted run keeps everything already saved.

use anyhow::Context;
use clap::Parser;
use osu_harvest::{
    persist, rankings, scores, ApiClient, ClientCredentials, ClientCredentialsProvider, Config,
    Gamemode, OutputName,
};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(
    name = "pull-user-bests",
    about = "Pull ranked users' best scores from the osu! API, one file per rank chunk"
)]
struct Cli {
    /// Gamemode to pull rankings and scores for
    #[arg(long, value_enum, default_value_t = Gamemode::Osu)]
    gamemode: Gamemode,

    /// JSON config file overriding the defaults
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };
    config.gamemode = cli.gamemode;

    let credentials = ClientCredentials::load(&config.api.credentials_path)
        .await
        .context("loading client credentials")?;
    let provider = Arc::new(ClientCredentialsProvider::new(
        config.api.token_url.clone(),
        credentials,
    ));
    let client =
        ApiClient::connect(config.api.base_url.clone(), provider, config.retry.clone()).await?;

    let ids = rankings::collect_ranking_ids(&client, config.gamemode, config.rankings.pages)
        .await
        .context("walking the rankings")?;

    let chunk_size = config.bests.chunk_size.max(1);
    for (index, chunk) in ids.chunks(chunk_size).enumerate() {
        let begin = index * chunk_size + 1;
        let end = begin + chunk.len() - 1;
        tracing::info!(begin, end, "processing rank chunk");

        let records = scores::fetch_user_bests(&client, config.gamemode, chunk)
            .await
            .with_context(|| format!("fetching best scores for ranks {begin}-{end}"))?;

        let path = OutputName::new("user-bests")
            .gamemode(config.gamemode)
            .id_range(begin as u64, end as u64)
            .count(records.len())
            .date(chrono::Local::now().date_naive())
            .in_dir(&config.output_dir);
        persist::save_json(&path, &records).await?;
    }

    tracing::info!(users = ids.len(), "done");
    Ok(())
}

fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
}
