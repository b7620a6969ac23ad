// src/ingest/providers/mod.rs
pub mod coingecko;
pub mod hacker_news;
pub mod rss;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::time::Duration;

use crate::config::bot::SourcesConfig;
use crate::config::keywords::{ai_topic_terms, crypto_feed_terms};
use crate::ingest::types::{FeedAdapter, Topic};
use self::coingecko::CoinGeckoTrendingAdapter;
use self::hacker_news::HackerNewsAdapter;
use self::rss::RssFeedAdapter;

pub const USER_AGENT: &str = concat!("crypto-ai-newsbot/", env!("CARGO_PKG_VERSION"));

/// Shared client for all adapters.
pub fn build_http_client(timeout_secs: u64) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .user_agent(USER_AGENT)
        .build()
        .context("building http client")
}

/// The production adapter set, in registration order:
/// crypto (CoinGecko, CoinDesk) then AI (MIT Technology Review, Hacker News).
pub fn default_adapters(cfg: &SourcesConfig) -> Result<Vec<Box<dyn FeedAdapter>>> {
    let client = build_http_client(cfg.http_timeout_secs)?;
    let max_age = Some(cfg.adapter_max_age_hours);

    let adapters: Vec<Box<dyn FeedAdapter>> = vec![
        Box::new(
            CoinGeckoTrendingAdapter::from_base_url(&cfg.coingecko_base_url, client.clone())
                .with_max_items(cfg.coingecko_max_items),
        ),
        Box::new(
            RssFeedAdapter::from_url("CoinDesk", Topic::Crypto, &cfg.coindesk_rss_url, client.clone())
                .with_max_items(cfg.rss_max_items)
                .with_title_keywords(crypto_feed_terms())
                .with_max_age_hours(max_age),
        ),
        Box::new(
            RssFeedAdapter::from_url(
                "MIT Technology Review",
                Topic::AI,
                &cfg.techreview_rss_url,
                client.clone(),
            )
            .with_max_items(cfg.rss_max_items)
            .with_title_keywords(ai_topic_terms())
            .with_max_age_hours(max_age),
        ),
        Box::new(
            HackerNewsAdapter::from_base_url(&cfg.hacker_news_base_url, client)
                .with_scan_limit(cfg.hn_scan_limit)
                .with_max_stories(cfg.hn_max_stories)
                .with_title_keywords(ai_topic_terms())
                .with_max_age_hours(max_age),
        ),
    ];
    Ok(adapters)
}

/// GET returning the body; non-2xx is an error.
pub(crate) async fn http_get_text(client: &reqwest::Client, url: &str) -> Result<String> {
    client
        .get(url)
        .send()
        .await
        .with_context(|| format!("GET {url}"))?
        .error_for_status()
        .with_context(|| format!("GET {url} non-2xx"))?
        .text()
        .await
        .with_context(|| format!("GET {url} .text()"))
}

/// Recency cutoff. Undated items always pass; the cutoff only applies to known ages.
pub(crate) fn within_max_age(
    published_at: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
    max_age_hours: Option<f64>,
) -> bool {
    match (published_at, max_age_hours) {
        (Some(ts), Some(max)) => {
            let age_h = now.signed_duration_since(ts).num_seconds() as f64 / 3600.0;
            age_h <= max
        }
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn default_set_registers_both_topics_in_order() {
        let adapters = default_adapters(&SourcesConfig::default()).unwrap();
        let names: Vec<_> = adapters.iter().map(|a| a.name()).collect();
        assert_eq!(
            names,
            vec!["CoinGecko", "CoinDesk", "MIT Technology Review", "HackerNews"]
        );
        assert_eq!(adapters[0].topic(), Topic::Crypto);
        assert_eq!(adapters[3].topic(), Topic::AI);
    }

    #[test]
    fn cutoff_only_applies_to_dated_items() {
        let now = Utc.with_ymd_and_hms(2026, 10, 17, 12, 0, 0).unwrap();
        let old = now - chrono::Duration::hours(30);
        let fresh = now - chrono::Duration::hours(3);
        assert!(!within_max_age(Some(old), now, Some(24.0)));
        assert!(within_max_age(Some(fresh), now, Some(24.0)));
        assert!(within_max_age(None, now, Some(24.0)));
        assert!(within_max_age(Some(old), now, None));
    }
}
