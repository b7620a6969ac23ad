// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod api;
pub mod config;
pub mod cycle;
pub mod dedup;
pub mod filter;
pub mod format;
pub mod gate;
pub mod ingest;
pub mod metrics;
pub mod publish;
pub mod rank;
pub mod scheduler;

// ---- Re-exports for stable public API ----
pub use crate::config::BotConfig;
pub use crate::cycle::{CycleOutcome, NewsBot};
pub use crate::ingest::types::{FeedAdapter, Story, Topic};
pub use crate::publish::Publisher;

use anyhow::Result;

/// Build the production bot: default adapters, posted set from disk/env,
/// and either the dry-run or the Twitter publisher. Missing publish
/// credentials fail here, before anything is scheduled.
pub fn build_bot(cfg: &BotConfig) -> Result<NewsBot> {
    let publisher: Box<dyn Publisher> = if cfg.dry_run {
        Box::new(publish::DryRunPublisher::new())
    } else {
        Box::new(publish::TwitterPublisher::from_env()?.with_timeout(cfg.sources.http_timeout_secs))
    };
    let adapters = ingest::providers::default_adapters(&cfg.sources)?;
    let posted = dedup::PostedStore::load_with_env(&cfg.store.posted_stories_path);
    Ok(NewsBot::from_config(cfg, adapters, posted, publisher))
}
