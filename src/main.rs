use anyhow::{Context, Result};
use clap::Parser;
use feedbridge::{Config, FeedBridge};
use std::io::Write;
use std::path::PathBuf;

/// Get the default config file path (~/.config/feedbridge/config.toml)
fn default_config_path() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME environment variable not set")?;
    Ok(PathBuf::from(home)
        .join(".config")
        .join("feedbridge")
        .join("config.toml"))
}

/// Turns a count of failed seeds into the process exit status.
fn ensure_none_failed(failures: usize, what: &str) -> Result<()> {
    if failures > 0 {
        anyhow::bail!("{failures} feed(s) could not be {what}");
    }
    Ok(())
}

#[derive(Parser, Debug)]
#[command(
    name = "feedbridge",
    about = "Preview the Nostr events a feed would be republished as"
)]
struct Args {
    /// Config file (default: ~/.config/feedbridge/config.toml)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Only print the resolved feed URL and public key for each seed
    #[arg(long)]
    resolve_only: bool,

    /// Page or feed URLs to check
    #[arg(required = true, value_name = "URL")]
    urls: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing for debug logging
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let config_path = match args.config {
        Some(path) => path,
        None => default_config_path()?,
    };
    let config = Config::load(&config_path)
        .with_context(|| format!("Failed to load config from {}", config_path.display()))?;
    tracing::debug!(config = ?config, "Using configuration");

    let bridge = FeedBridge::from_config(&config).context("Failed to set up feed bridge")?;

    if args.resolve_only {
        let mut misses = 0usize;
        for seed in &args.urls {
            match bridge.resolver().resolve(seed).await {
                Some(feed_url) => {
                    let pubkey = bridge.derive(&feed_url).public_key_hex();
                    println!("{seed}\t{feed_url}\t{pubkey}");
                }
                None => {
                    misses += 1;
                    eprintln!("{seed}: no feed found");
                }
            }
        }
        return ensure_none_failed(misses, "resolved");
    }

    let results = bridge.check_all(args.urls).await;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let mut failures = 0usize;

    for check in results {
        match check.result {
            Ok(batch) => {
                for event in std::iter::once(&batch.profile).chain(batch.notes.iter()) {
                    let line = serde_json::to_string(event).context("Failed to serialize event")?;
                    writeln!(out, "{line}").context("Failed to write to stdout")?;
                }
            }
            Err(e) => {
                failures += 1;
                eprintln!("{}: {}", check.seed, e);
            }
        }
    }

    ensure_none_failed(failures, "checked")
}
