// src/ingest/providers/rss.rs
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use quick_xml::de::from_str;
use serde::Deserialize;
use time::{format_description::well_known::Rfc2822, OffsetDateTime};

use crate::ingest::providers::{http_get_text, within_max_age};
use crate::ingest::types::{FeedAdapter, Story, Topic};
use crate::ingest::{excerpt, mentions_any, normalize_text};

const EXCERPT_CHARS: usize = 200;

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}
#[derive(Debug, Deserialize)]
struct Channel {
    #[serde(rename = "item", default)]
    item: Vec<Item>,
}
#[derive(Debug, Deserialize)]
struct Item {
    title: Option<String>,
    link: Option<String>,
    #[serde(rename = "pubDate")]
    pub_date: Option<String>,
    description: Option<String>,
}

fn parse_rfc2822(ts: &str) -> Option<DateTime<Utc>> {
    OffsetDateTime::parse(ts.trim(), &Rfc2822)
        .ok()
        .and_then(|dt| DateTime::from_timestamp(dt.unix_timestamp(), 0))
}

enum Mode {
    Fixture(String),
    Http { url: String, client: reqwest::Client },
}

/// RSS 2.0 feed adapter (CoinDesk, MIT Technology Review, ...).
pub struct RssFeedAdapter {
    name: &'static str,
    topic: Topic,
    mode: Mode,
    max_items: usize,
    title_keywords: Vec<String>,
    max_age_hours: Option<f64>,
    reference_time: Option<DateTime<Utc>>,
}

impl RssFeedAdapter {
    pub fn from_url(
        name: &'static str,
        topic: Topic,
        url: impl Into<String>,
        client: reqwest::Client,
    ) -> Self {
        Self::with_mode(
            name,
            topic,
            Mode::Http {
                url: url.into(),
                client,
            },
        )
    }

    pub fn from_fixture(name: &'static str, topic: Topic, xml: &str) -> Self {
        Self::with_mode(name, topic, Mode::Fixture(xml.to_string()))
    }

    fn with_mode(name: &'static str, topic: Topic, mode: Mode) -> Self {
        Self {
            name,
            topic,
            mode,
            max_items: 5,
            title_keywords: Vec::new(),
            max_age_hours: Some(24.0),
            reference_time: None,
        }
    }

    /// Only the first `n` feed entries are considered.
    pub fn with_max_items(mut self, n: usize) -> Self {
        self.max_items = n;
        self
    }

    /// Keep only entries whose title mentions one of these terms. Empty = keep all.
    pub fn with_title_keywords<S: Into<String>>(mut self, kws: impl IntoIterator<Item = S>) -> Self {
        self.title_keywords = kws.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_max_age_hours(mut self, hours: Option<f64>) -> Self {
        self.max_age_hours = hours;
        self
    }

    /// Pin "now" for the recency cutoff (fixtures carry fixed dates).
    pub fn with_reference_time(mut self, now: DateTime<Utc>) -> Self {
        self.reference_time = Some(now);
        self
    }

    fn parse_items_from_str(&self, s: &str) -> Result<Vec<Story>> {
        let xml_clean = scrub_html_entities_for_xml(s);
        let rss: Rss = from_str(&xml_clean).with_context(|| format!("parsing {} rss xml", self.name))?;
        let now = self.reference_time.unwrap_or_else(Utc::now);

        let mut out = Vec::new();
        for it in rss.channel.item.into_iter().take(self.max_items) {
            let Some(link) = it.link.as_deref().map(str::trim).filter(|l| !l.is_empty()) else {
                continue;
            };
            let title = normalize_text(it.title.as_deref().unwrap_or_default());
            if !self.title_keywords.is_empty() && !mentions_any(&title, &self.title_keywords) {
                continue;
            }
            let published_at = it.pub_date.as_deref().and_then(parse_rfc2822);
            if !within_max_age(published_at, now, self.max_age_hours) {
                continue;
            }
            let content = excerpt(it.description.as_deref().unwrap_or_default(), EXCERPT_CHARS);

            match Story::new(title, content, link, self.topic, self.name, published_at) {
                Ok(story) => out.push(story),
                Err(e) => tracing::debug!(target: "ingest", adapter = self.name, error = %e, "item dropped"),
            }
        }
        Ok(out)
    }
}

#[async_trait]
impl FeedAdapter for RssFeedAdapter {
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
        self.name
    }

    fn topic(&self) -> Topic {
        self.topic
    }
}

// quick-xml only knows the XML entities; feeds routinely ship HTML ones.
fn scrub_html_entities_for_xml(s: &str) -> String {
    s.replace("&nbsp;", " ")
        .replace("&ndash;", "-")
        .replace("&mdash;", "-")
        .replace("&ldquo;", "\"")
        .replace("&rdquo;", "\"")
        .replace("&lsquo;", "'")
        .replace("&rsquo;", "'")
        .replace("&hellip;", "...")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_rfc2822_dates() {
        let dt = parse_rfc2822("Fri, 16 Oct 2026 09:30:00 +0000").unwrap();
        assert_eq!(dt.to_rfc3339(), "2026-10-16T09:30:00+00:00");
        assert!(parse_rfc2822("yesterday").is_none());
    }

    #[test]
    fn scrub_replaces_html_entities() {
        assert_eq!(scrub_html_entities_for_xml("a&nbsp;b&mdash;c"), "a b-c");
    }
}
