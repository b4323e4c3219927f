use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

use primus::config::Config;
use primus::ingest;
use primus::storage::ReopeningSink;

#[derive(Parser, Debug)]
#[command(name = "primus", about = "Journal of titles: appends RSS/Atom items to a local database")]
struct Args {
    /// Config file (missing file means defaults)
    #[arg(long, value_name = "FILE", default_value = "primus.toml")]
    config: PathBuf,

    /// Feed list, overrides `feeds_file`
    #[arg(long, value_name = "FILE")]
    feeds: Option<PathBuf>,

    /// Database file, overrides `database_file`
    #[arg(long, value_name = "FILE")]
    db: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    println!("Primus - journal of titles / Примус - журнал заголовков");

    let args = Args::parse();

    let mut config = Config::load(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;
    if let Some(feeds) = args.feeds {
        config.feeds_file = feeds;
    }
    if let Some(db) = args.db {
        config.database_file = db;
    }

    let client = reqwest::Client::builder()
        .user_agent(config.user_agent.as_str())
        .build()
        .context("Failed to build HTTP client")?;
    let sink = ReopeningSink::new(&config.database_file);

    // Bootstrap failures end the run without a non-zero exit.
    if let Err(e) = ingest::run(&config.feeds_file, &config.seed_feeds, &client, &sink).await {
        tracing::error!(error = %e, "Feed list unavailable, nothing processed");
    }

    Ok(())
}
