// src/ingest/types.rs
use std::fmt;

use anyhow::{bail, Result};
use chrono::{DateTime, Utc};
use metrics::{counter, histogram};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Topic {
    Crypto,
    #[serde(rename = "ai")]
    AI,
}

impl Topic {
    /// Fetch order used by a cycle.
    pub const ALL: [Topic; 2] = [Topic::Crypto, Topic::AI];

    pub fn as_str(&self) -> &'static str {
        match self {
            Topic::Crypto => "crypto",
            Topic::AI => "ai",
        }
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A normalized news item. `url` is the only dedup key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Story {
    pub title: String,
    pub content: String, // short excerpt, may be empty
    pub url: String,
    pub topic: Topic,
    pub source: String,
    pub published_at: Option<DateTime<Utc>>,
}

impl Story {
    /// Validating constructor used by every adapter.
    /// Rejects empty titles and anything that is not an absolute http(s) URL.
    pub fn new(
        title: impl Into<String>,
        content: impl Into<String>,
        url: impl AsRef<str>,
        topic: Topic,
        source: impl Into<String>,
        published_at: Option<DateTime<Utc>>,
    ) -> Result<Self> {
        let title = title.into().trim().to_string();
        if title.is_empty() {
            bail!("story without title");
        }
        let raw = url.as_ref().trim();
        let parsed = url::Url::parse(raw).map_err(|e| anyhow::anyhow!("bad url {raw:?}: {e}"))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            bail!("unsupported url scheme {:?}", parsed.scheme());
        }
        Ok(Self {
            title,
            content: content.into().trim().to_string(),
            url: raw.to_string(),
            topic,
            source: source.into(),
            published_at,
        })
    }

    /// Hours since publication at `now`; `None` when the source gave no timestamp.
    /// Timestamps in the future count as age 0.
    pub fn age_hours(&self, now: DateTime<Utc>) -> Option<f64> {
        self.published_at.map(|ts| {
            let secs = now.signed_duration_since(ts).num_seconds().max(0);
            secs as f64 / 3600.0
        })
    }

    /// Lowercased `title + " " + content`, the text keyword rules run against.
    pub fn haystack(&self) -> String {
        format!("{} {}", self.title, self.content).to_lowercase()
    }
}

/// One external source normalized into `Story` values.
#[async_trait::async_trait]
pub trait FeedAdapter: Send + Sync {
    /// Raw fetch. Transport, status and parse errors surface here.
    async fn fetch_latest(&self) -> Result<Vec<Story>>;

    fn name(&self) -> &'static str;

    fn topic(&self) -> Topic;

    /// Never fails: errors are logged and counted, and the adapter yields nothing.
    async fn fetch(&self) -> Vec<Story> {
        let t0 = std::time::Instant::now();
        let out = match self.fetch_latest().await {
            Ok(stories) => stories,
            Err(e) => {
                tracing::warn!(
                    target: "ingest",
                    error = ?e,
                    adapter = self.name(),
                    topic = %self.topic(),
                    "adapter error"
                );
                counter!("newsbot_adapter_errors_total", "adapter" => self.name()).increment(1);
                Vec::new()
            }
        };
        histogram!("newsbot_fetch_ms", "adapter" => self.name())
            .record(t0.elapsed().as_secs_f64() * 1_000.0);
        counter!("newsbot_stories_fetched_total", "adapter" => self.name())
            .increment(out.len() as u64);
        out
    }
}
