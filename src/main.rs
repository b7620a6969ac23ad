//! News bot binary entrypoint.
//! Loads config, builds the bot, then runs one cycle (`--once`) or loops forever.

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use newsbot::api::{self, SharedStatus};
use newsbot::config::bot::ENV_CONFIG_PATH;
use newsbot::metrics::Metrics;
use newsbot::scheduler::{self, LoopCfg};
use newsbot::{build_bot, BotConfig};

#[derive(Debug, Parser)]
#[command(name = "crypto-ai-newsbot", version, about = "Posts the best fresh crypto/AI story on a schedule")]
struct Cli {
    /// Run exactly one cycle and exit (for cron / CI triggers).
    #[arg(long)]
    once: bool,

    /// Config file (TOML). Defaults to $NEWSBOT_CONFIG_PATH, then config/bot.toml.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log the post instead of publishing; no credentials required.
    #[arg(long)]
    dry_run: bool,

    /// Serve /health, /status and /metrics on this address (continuous mode).
    #[arg(long)]
    status_addr: Option<String>,
}

/// Compact logs by default, JSON when LOG_FORMAT=json.
fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("newsbot=info,warn"));
    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer().compact()).init();
    }
}

fn load_config(cli: &Cli) -> Result<BotConfig> {
    let mut cfg = match &cli.config {
        Some(p) => BotConfig::load_with_overrides(p)?,
        None => BotConfig::load_default()?,
    };
    if cli.dry_run {
        cfg.dry_run = true;
    }
    Ok(cfg)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env in local/dev; no-op when absent.
    let _ = dotenvy::dotenv();
    init_tracing();

    let cli = Cli::parse();
    let cfg = load_config(&cli).map_err(|e| {
        tracing::error!(error = ?e, env = ENV_CONFIG_PATH, "config load failed");
        e
    })?;

    let metrics = match Metrics::init() {
        Ok(m) => Some(m),
        Err(e) => {
            tracing::warn!(error = ?e, "metrics disabled");
            None
        }
    };

    // Startup failures (e.g. missing credentials) are the only non-zero exits.
    let mut bot = build_bot(&cfg).map_err(|e| {
        tracing::error!(error = ?e, "startup failed");
        e
    })?;
    tracing::info!(
        publisher = bot.publisher_name(),
        posted = bot.posted().len(),
        once = cli.once,
        "news bot starting"
    );

    let status = SharedStatus::new();

    if cli.once {
        scheduler::run_single(&mut bot, Some(&status)).await;
        return Ok(());
    }

    if let Some(addr) = cli.status_addr.clone() {
        let router = api::router(status.clone(), metrics.as_ref().map(|m| m.handle.clone()));
        api::spawn_status_server(addr, router);
    }

    scheduler::run_forever(bot, LoopCfg::from_config(&cfg), Some(status)).await;
    Ok(())
}
