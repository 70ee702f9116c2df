//! Daily best-play series: scrape the full history, or chart it.
//!
//! `daily-best scrape` walks every day from the first recorded play to
//! today and saves the series; `daily-best chart` reads a saved series,
//! derives the record plays, and renders the scatter chart. Anything else
//! prints usage and exits 1 without touching the network or the disk.

use anyhow::Context;
use clap::Parser;
use osu_harvest::daily::{self, Mode};
use osu_harvest::{chart, persist, BestPlay, Config, DailyBestScraper};

const USAGE: &str = "Usage: daily-best <scrape|chart>";

#[derive(Parser)]
#[command(name = "daily-best", about = "Scrape or chart the daily best-play series")]
struct Cli {
    /// Action to perform
    #[arg(value_enum)]
    mode: Mode,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(_) => {
            eprintln!("{USAGE}");
            std::process::exit(1);
        }
    };
    init_tracing();

    let config = Config::default();
    match cli.mode {
        Mode::Scrape => scrape(&config).await?,
        Mode::Chart => render(&config)?,
    }
    Ok(())
}

async fn scrape(config: &Config) -> anyhow::Result<()> {
    let scraper = DailyBestScraper::new(
        config.api.osutrack_url.clone(),
        config.gamemode,
        config.daily.clone(),
    );
    let today = chrono::Local::now().date_naive();
    let series = scraper.collect_series(config.daily.start_date, today).await;

    persist::save_json(&config.output_dir.join("allplays.json"), &series).await?;
    Ok(())
}

fn render(config: &Config) -> anyhow::Result<()> {
    let series_path = config.output_dir.join("allplays.json");
    let raw = std::fs::read_to_string(&series_path)
        .with_context(|| format!("reading {} (run `daily-best scrape` first)", series_path.display()))?;
    let series: Vec<BestPlay> = serde_json::from_str(&raw).context("parsing the saved series")?;

    let records = daily::record_plays(&series);
    std::fs::write(
        config.output_dir.join("records.json"),
        serde_json::to_vec(&records)?,
    )?;

    chart::render_chart(&series, &records, &config.output_dir.join("results.png"))?;
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
