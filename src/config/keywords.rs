// src/config/keywords.rs
//! Keyword vocabularies shared by the filter, ranker and formatter.
//! All matching is lowercase substring matching.

use serde::{Deserialize, Serialize};

fn strs(v: &[&str]) -> Vec<String> {
    v.iter().map(|s| s.to_string()).collect()
}

fn default_breaking() -> Vec<String> {
    strs(&["breaking", "just in", "urgent", "developing"])
}
fn default_security() -> Vec<String> {
    strs(&[
        "hack", "exploit", "vulnerability", "breach", "stolen", "drained", "attack", "scam",
    ])
}
fn default_price() -> Vec<String> {
    strs(&[
        "surge", "crash", "rally", "soar", "plunge", "skyrocket", "tumble", "spike", "dump",
        "price",
    ])
}
fn default_milestone() -> Vec<String> {
    strs(&[
        "record", "milestone", "all-time high", "first ever", "achievement", "breakthrough",
    ])
}
fn default_corporate() -> Vec<String> {
    strs(&[
        "launch", "release", "unveil", "announce", "partnership", "acquisition", "acquire",
        "adoption",
    ])
}
fn default_magnitude() -> Vec<String> {
    strs(&[
        "massive", "huge", "billion", "revolutionary", "game-changer", "disruption", "innovation",
    ])
}
fn default_exclude() -> Vec<String> {
    strs(&[
        "travel", "vacation", "recipe", "food", "restaurant", "weather", "celebrity", "movie",
        "horoscope", "fashion",
    ])
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Vocabulary {
    #[serde(default = "default_breaking")]
    pub breaking: Vec<String>,
    #[serde(default = "default_security")]
    pub security: Vec<String>,
    #[serde(default = "default_price")]
    pub price: Vec<String>,
    #[serde(default = "default_milestone")]
    pub milestone: Vec<String>,
    #[serde(default = "default_corporate")]
    pub corporate: Vec<String>,
    #[serde(default = "default_magnitude")]
    pub magnitude: Vec<String>,
    #[serde(default = "default_exclude")]
    pub exclude: Vec<String>,
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self {
            breaking: default_breaking(),
            security: default_security(),
            price: default_price(),
            milestone: default_milestone(),
            corporate: default_corporate(),
            magnitude: default_magnitude(),
            exclude: default_exclude(),
        }
    }
}

impl Vocabulary {
    /// Union of every positive tier, in tier order, deduplicated.
    pub fn inclusion(&self) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        for k in self
            .breaking
            .iter()
            .chain(&self.security)
            .chain(&self.price)
            .chain(&self.milestone)
            .chain(&self.corporate)
            .chain(&self.magnitude)
        {
            let k = k.trim().to_lowercase();
            if !k.is_empty() && !out.contains(&k) {
                out.push(k);
            }
        }
        out
    }
}

/// Lowercase, trim and drop empty entries.
pub fn clean_list(items: &[String]) -> Vec<String> {
    items
        .iter()
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

/// First keyword contained in `haystack` (which must already be lowercase).
pub fn first_match<'a>(haystack: &str, keywords: &'a [String]) -> Option<&'a str> {
    keywords
        .iter()
        .find(|k| haystack.contains(k.as_str()))
        .map(String::as_str)
}

/// Topic vocabulary used by the AI adapters' title gate.
pub fn ai_topic_terms() -> Vec<String> {
    strs(&[
        "ai",
        "artificial intelligence",
        "machine learning",
        "openai",
        "chatgpt",
        "llm",
        "llms",
        "gpt",
        "claude",
        "neural",
        "robot",
    ])
}

/// Title gate for crypto RSS feeds.
pub fn crypto_feed_terms() -> Vec<String> {
    strs(&[
        "hack",
        "exploit",
        "surge",
        "crash",
        "breakthrough",
        "launch",
        "adoption",
    ])
}
