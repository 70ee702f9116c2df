//! Pull the ranked leaderboard and every listed user's full profile.
//!
//! Walks the performance rankings for the configured page span, then
//! fetches each user's profile one at a time and saves the whole set as a
//! single JSON file.

use anyhow::Context;
use clap::Parser;
use osu_harvest::{
    persist, rankings, users, ApiClient, ClientCredentials, ClientCredentialsProvider, Config,
    Gamemode, OutputName,
};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "pull-users", about = "Pull ranked users' full profiles from the osu! API")]
struct Cli {
    /// Gamemode to pull rankings for
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
    let profiles = users::fetch_users(&client, config.gamemode, &ids)
        .await
        .context("fetching user profiles")?;

    let path = OutputName::new("users")
        .gamemode(config.gamemode)
        .count(profiles.len())
        .in_dir(&config.output_dir);
    persist::save_json(&path, &profiles).await?;

    tracing::info!(count = profiles.len(), path = %path.display(), "done");
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
