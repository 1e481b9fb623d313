use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

use bulletin_rss::config::Config;

#[derive(Parser, Debug)]
#[command(name = "bulletin-rss", about = "Serves the bulletin board listing as an RSS feed")]
struct Args {
    /// Path to the TOML config file (missing file means defaults)
    #[arg(long, value_name = "FILE", default_value = "config.toml")]
    config: PathBuf,

    /// Address to listen on, overriding `bind_address` from the config file
    #[arg(long, value_name = "ADDR")]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let mut config = Config::load(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    if let Some(bind) = args.bind {
        config.bind_address = bind;
    }

    tracing::debug!(config = ?config, "Effective configuration");

    bulletin_rss::server::serve(config).await
}
