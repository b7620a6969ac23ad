// src/publish/mod.rs
pub mod twitter;

use anyhow::Result;
use std::sync::atomic::{AtomicU64, Ordering};

pub use twitter::TwitterPublisher;

/// Outbound post sink. Returns the id the remote side assigned to the post.
#[async_trait::async_trait]
pub trait Publisher: Send + Sync {
    async fn publish(&self, text: &str) -> Result<String>;
    fn name(&self) -> &'static str;
}

/// Logs instead of posting (`--dry-run`); needs no credentials.
#[derive(Debug, Default)]
pub struct DryRunPublisher {
    seq: AtomicU64,
}

impl DryRunPublisher {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl Publisher for DryRunPublisher {
    async fn publish(&self, text: &str) -> Result<String> {
        let n = self.seq.fetch_add(1, Ordering::Relaxed) + 1;
        tracing::info!(target: "publish", chars = text.chars().count(), %text, "dry-run post");
        Ok(format!("dry-run-{n}"))
    }

    fn name(&self) -> &'static str {
        "dry-run"
    }
}
