// src/ingest/providers/hacker_news.rs
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::ingest::providers::{http_get_text, within_max_age};
use crate::ingest::types::{FeedAdapter, Story, Topic};
use crate::ingest::{mentions_any, normalize_text};

pub const DEFAULT_BASE_URL: &str = "https://hacker-news.firebaseio.com/v0";

#[derive(Debug, Deserialize)]
struct HnItem {
    id: u64,
    title: Option<String>,
    url: Option<String>,
    #[serde(default)]
    score: u64,
    time: Option<i64>,
    #[serde(default)]
    dead: bool,
    #[serde(default)]
    deleted: bool,
}

enum Mode {
    /// Pre-fetched item objects in top-stories order.
    Fixture(String),
    Http { base: String, client: reqwest::Client },
}

/// Hacker News top stories, narrowed to AI titles.
pub struct HackerNewsAdapter {
    mode: Mode,
    scan_limit: usize,
    max_stories: usize,
    title_keywords: Vec<String>,
    max_age_hours: Option<f64>,
    reference_time: Option<DateTime<Utc>>,
}

impl HackerNewsAdapter {
    pub fn from_base_url(base: &str, client: reqwest::Client) -> Self {
        Self::with_mode(Mode::Http {
            base: base.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn from_fixture(items_json: &str) -> Self {
        Self::with_mode(Mode::Fixture(items_json.to_string()))
    }

    fn with_mode(mode: Mode) -> Self {
        Self {
            mode,
            scan_limit: 20,
            max_stories: 3,
            title_keywords: Vec::new(),
            max_age_hours: Some(24.0),
            reference_time: None,
        }
    }

    /// How many top-story ids are inspected per fetch.
    pub fn with_scan_limit(mut self, n: usize) -> Self {
        self.scan_limit = n;
        self
    }

    pub fn with_max_stories(mut self, n: usize) -> Self {
        self.max_stories = n;
        self
    }

    pub fn with_title_keywords<S: Into<String>>(mut self, kws: impl IntoIterator<Item = S>) -> Self {
        self.title_keywords = kws.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_max_age_hours(mut self, hours: Option<f64>) -> Self {
        self.max_age_hours = hours;
        self
    }

    pub fn with_reference_time(mut self, now: DateTime<Utc>) -> Self {
        self.reference_time = Some(now);
        self
    }

    fn to_story(&self, item: HnItem, now: DateTime<Utc>) -> Option<Story> {
        if item.dead || item.deleted {
            return None;
        }
        let title = normalize_text(item.title.as_deref()?);
        if !self.title_keywords.is_empty() && !mentions_any(&title, &self.title_keywords) {
            return None;
        }
        let published_at = item.time.and_then(|t| DateTime::from_timestamp(t, 0));
        if !within_max_age(published_at, now, self.max_age_hours) {
            return None;
        }
        let url = item
            .url
            .filter(|u| !u.trim().is_empty())
            .unwrap_or_else(|| format!("https://news.ycombinator.com/item?id={}", item.id));
        let content = format!("Discussion on Hacker News with {} points", item.score);

        match Story::new(title, content, url, Topic::AI, self.name(), published_at) {
            Ok(story) => Some(story),
            Err(e) => {
                tracing::debug!(target: "ingest", adapter = self.name(), error = %e, "item dropped");
                None
            }
        }
    }

    fn collect(&self, items: impl IntoIterator<Item = HnItem>) -> Vec<Story> {
        let now = self.reference_time.unwrap_or_else(Utc::now);
        items
            .into_iter()
            .filter_map(|it| self.to_story(it, now))
            .take(self.max_stories)
            .collect()
    }

    async fn fetch_http(&self, base: &str, client: &reqwest::Client) -> Result<Vec<Story>> {
        let body = http_get_text(client, &format!("{base}/topstories.json")).await?;
        let ids: Vec<u64> = serde_json::from_str(&body).context("parsing hn topstories")?;
        let now = self.reference_time.unwrap_or_else(Utc::now);

        let mut out = Vec::new();
        for id in ids.into_iter().take(self.scan_limit) {
            let item = match http_get_text(client, &format!("{base}/item/{id}.json")).await {
                Ok(b) => serde_json::from_str::<HnItem>(&b).context("parsing hn item"),
                Err(e) => Err(e),
            };
            match item {
                Ok(it) => {
                    if let Some(story) = self.to_story(it, now) {
                        out.push(story);
                        if out.len() >= self.max_stories {
                            break;
                        }
                    }
                }
                Err(e) => tracing::debug!(target: "ingest", adapter = self.name(), id, error = ?e, "hn item skipped"),
            }
        }
        Ok(out)
    }
}

#[async_trait]
impl FeedAdapter for HackerNewsAdapter {
    async fn fetch_latest(&self) -> Result<Vec<Story>> {
        match &self.mode {
            Mode::Fixture(s) => {
                let items: Vec<HnItem> = serde_json::from_str(s).context("parsing hn items fixture")?;
                Ok(self.collect(items.into_iter().take(self.scan_limit)))
            }
            Mode::Http { base, client } => self.fetch_http(base, client).await,
        }
    }

    fn name(&self) -> &'static str {
        "HackerNews"
    }

    fn topic(&self) -> Topic {
        Topic::AI
    }
}
