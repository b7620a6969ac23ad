// src/filter.rs
//! Keyword + freshness filter.
//!
//! A story is dropped when `title + " " + content` (lowercased) contains any
//! exclusion keyword. Otherwise it is kept when the same text contains an
//! inclusion keyword, or when its age is known and below the freshness
//! threshold. Exclusion always wins. Plain substring matching, no stemming.

use chrono::{DateTime, Utc};
use metrics::counter;

use crate::config::keywords::{clean_list, first_match, Vocabulary};
use crate::config::BotConfig;
use crate::ingest::types::Story;

#[derive(Debug, Clone, PartialEq)]
pub enum FilterVerdict {
    Excluded { keyword: String },
    Keyword { keyword: String },
    Fresh { age_hours: f64 },
    Rejected,
}

impl FilterVerdict {
    pub fn keeps(&self) -> bool {
        matches!(self, FilterVerdict::Keyword { .. } | FilterVerdict::Fresh { .. })
    }
}

#[derive(Debug, Clone)]
pub struct StoryFilter {
    include: Vec<String>,
    exclude: Vec<String>,
    freshness_threshold_hours: f64,
}

impl StoryFilter {
    pub fn new(include: &[String], exclude: &[String], freshness_threshold_hours: f64) -> Self {
        Self {
            include: clean_list(include),
            exclude: clean_list(exclude),
            freshness_threshold_hours,
        }
    }

    pub fn from_vocabulary(vocab: &Vocabulary, freshness_threshold_hours: f64) -> Self {
        Self::new(&vocab.inclusion(), &vocab.exclude, freshness_threshold_hours)
    }

    pub fn from_config(cfg: &BotConfig) -> Self {
        Self::from_vocabulary(&cfg.keywords, cfg.filter.freshness_threshold_hours)
    }

    pub fn evaluate(&self, story: &Story, now: DateTime<Utc>) -> FilterVerdict {
        let text = story.haystack();
        if let Some(k) = first_match(&text, &self.exclude) {
            return FilterVerdict::Excluded {
                keyword: k.to_string(),
            };
        }
        if let Some(k) = first_match(&text, &self.include) {
            return FilterVerdict::Keyword {
                keyword: k.to_string(),
            };
        }
        match story.age_hours(now) {
            Some(age) if age < self.freshness_threshold_hours => FilterVerdict::Fresh { age_hours: age },
            _ => FilterVerdict::Rejected,
        }
    }

    /// Keep the stories that pass, preserving input order.
    pub fn apply(&self, stories: Vec<Story>, now: DateTime<Utc>) -> Vec<Story> {
        let total = stories.len();
        let kept: Vec<Story> = stories
            .into_iter()
            .filter(|s| {
                let verdict = self.evaluate(s, now);
                tracing::trace!(target: "cycle", url = %s.url, ?verdict, "filter verdict");
                verdict.keeps()
            })
            .collect();
        counter!("newsbot_filtered_out_total").increment((total - kept.len()) as u64);
        kept
    }
}
