//! Pull a fixed-stride sample of the whole user ID space.
//!
//! No leaderboard involved: synthetic ID blocks cover every fourth ID up to
//! the highest known, 50 per batch request. Blocks of nonexistent IDs come
//! back empty and are skipped.

use anyhow::Context;
use clap::Parser;
use osu_harvest::{
    persist, users, ApiClient, ClientCredentials, ClientCredentialsProvider, Config, OutputName,
};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(
    name = "pull-user-sample",
    about = "Pull a stride-sampled cross-section of all osu! users via the batch endpoint"
)]
struct Cli {
    /// JSON config file overriding the defaults
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };

    let credentials = ClientCredentials::load(&config.api.credentials_path)
        .await
        .context("loading client credentials")?;
    let provider = Arc::new(ClientCredentialsProvider::new(
        config.api.token_url.clone(),
        credentials,
    ));
    let client =
        ApiClient::connect(config.api.base_url.clone(), provider, config.retry.clone()).await?;

    let sample = users::fetch_user_sample(&client, &config.sample)
        .await
        .context("pulling the user sample")?;

    let path = OutputName::new("users")
        .count(sample.len())
        .in_dir(&config.output_dir);
    persist::save_json(&path, &sample).await?;

    tracing::info!(count = sample.len(), path = %path.display(), "done");
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
