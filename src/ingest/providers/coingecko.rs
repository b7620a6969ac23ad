// src/ingest/providers/coingecko.rs
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;

use crate::ingest::providers::http_get_text;
use crate::ingest::types::{FeedAdapter, Story, Topic};

pub const DEFAULT_BASE_URL: &str = "https://api.coingecko.com/api/v3";

#[derive(Debug, Deserialize)]
struct Trending {
    #[serde(default)]
    coins: Vec<CoinEntry>,
}
#[derive(Debug, Deserialize)]
struct CoinEntry {
    item: Coin,
}
#[derive(Debug, Deserialize)]
struct Coin {
    id: String,
    name: String,
    symbol: String,
    market_cap_rank: Option<u32>,
}

enum Mode {
    Fixture(String),
    Http { url: String, client: reqwest::Client },
}

/// CoinGecko "search/trending" snapshot. Trending entries carry no
/// publication time, so they only pass the filter on keywords.
pub struct CoinGeckoTrendingAdapter {
    mode: Mode,
    max_items: usize,
}

impl CoinGeckoTrendingAdapter {
    pub fn from_base_url(base: &str, client: reqwest::Client) -> Self {
        let url = format!("{}/search/trending", base.trim_end_matches('/'));
        Self {
            mode: Mode::Http { url, client },
            max_items: 3,
        }
    }

    pub fn from_fixture(json: &str) -> Self {
        Self {
            mode: Mode::Fixture(json.to_string()),
            max_items: 3,
        }
    }

    pub fn with_max_items(mut self, n: usize) -> Self {
        self.max_items = n;
        self
    }

    fn parse_items_from_str(&self, s: &str) -> Result<Vec<Story>> {
        let trending: Trending = serde_json::from_str(s).context("parsing coingecko trending json")?;

        let mut out = Vec::with_capacity(self.max_items);
        for (i, entry) in trending.coins.into_iter().take(self.max_items).enumerate() {
            let coin = entry.item;
            let title = format!(
                "{} ({}) is trending #{} on CoinGecko",
                coin.name,
                coin.symbol.to_uppercase(),
                i + 1
            );
            let content = coin
                .market_cap_rank
                .map(|r| format!("Market cap rank: #{r}"))
                .unwrap_or_default();
            let url = format!("https://www.coingecko.com/en/coins/{}", coin.id);

            match Story::new(title, content, url, Topic::Crypto, self.name(), None) {
                Ok(story) => out.push(story),
                Err(e) => tracing::debug!(target: "ingest", adapter = self.name(), error = %e, "coin dropped"),
            }
        }
        Ok(out)
    }
}

#[async_trait]
impl FeedAdapter for CoinGeckoTrendingAdapter {
    async fn fetch_latest(&self) -> Result<Vec<Story>> {
        match &self.mode {
            Mode::Fixture(s) => self.parse_items_from_str(s),
            Mode::Http { url, client } => {
                let body = http_get_text(client, url).await?;
                self.parse_items_from_str(&body)
            }
        }
    }

    fn name(&self) -> &'static str {
        "CoinGecko"
    }

    fn topic(&self) -> Topic {
        Topic::Crypto
    }
}
