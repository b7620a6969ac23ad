// src/rank.rs
//! Priority ranking.
//!
//! score = tier weights for keyword hits in the title
//!       + max(0, freshness_cap_hours - age_hours)
//!
//! Tier weights: breaking > security > price > milestone, each tier present
//! adds its weight once. The freshness term is bounded by the cap (24 h by
//! default), which is smaller than the gap between any two tiers.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::config::keywords::{clean_list, first_match, Vocabulary};
use crate::config::BotConfig;
use crate::ingest::types::Story;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RankError {
    #[error("no candidate stories to rank")]
    EmptyInput,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TierWeights {
    pub breaking: f64,
    pub security: f64,
    pub price: f64,
    pub milestone: f64,
}

impl Default for TierWeights {
    fn default() -> Self {
        Self {
            breaking: 1000.0,
            security: 800.0,
            price: 600.0,
            milestone: 400.0,
        }
    }
}

/// A story with its score. The story itself is never modified.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedStory {
    pub story: Story,
    pub score: f64,
}

#[derive(Debug, Clone)]
pub struct PriorityRanker {
    breaking: Vec<String>,
    security: Vec<String>,
    price: Vec<String>,
    milestone: Vec<String>,
    weights: TierWeights,
    freshness_cap_hours: f64,
}

impl PriorityRanker {
    pub fn new(vocab: &Vocabulary, weights: TierWeights, freshness_cap_hours: f64) -> Self {
        Self {
            breaking: clean_list(&vocab.breaking),
            security: clean_list(&vocab.security),
            price: clean_list(&vocab.price),
            milestone: clean_list(&vocab.milestone),
            weights,
            freshness_cap_hours,
        }
    }

    pub fn from_config(cfg: &BotConfig) -> Self {
        let r = &cfg.rank;
        Self::new(
            &cfg.keywords,
            TierWeights {
                breaking: r.breaking_weight,
                security: r.security_weight,
                price: r.price_weight,
                milestone: r.milestone_weight,
            },
            r.freshness_cap_hours,
        )
    }

    pub fn score(&self, story: &Story, now: DateTime<Utc>) -> f64 {
        let title = story.title.to_lowercase();
        let w = &self.weights;
        let mut score = 0.0;
        for (kws, weight) in [
            (&self.breaking, w.breaking),
            (&self.security, w.security),
            (&self.price, w.price),
            (&self.milestone, w.milestone),
        ] {
            if first_match(&title, kws).is_some() {
                score += weight;
            }
        }
        // Undated stories get no freshness bonus.
        if let Some(age) = story.age_hours(now) {
            score += (self.freshness_cap_hours - age).max(0.0);
        }
        score
    }

    /// Highest score first. The sort is stable, so ties keep aggregation order.
    pub fn rank(&self, stories: Vec<Story>, now: DateTime<Utc>) -> Vec<RankedStory> {
        let mut ranked: Vec<RankedStory> = stories
            .into_iter()
            .map(|story| {
                let score = self.score(&story, now);
                RankedStory { story, score }
            })
            .collect();
        ranked.sort_by(|a, b| b.score.total_cmp(&a.score));
        ranked
    }

    pub fn select_best(&self, stories: Vec<Story>, now: DateTime<Utc>) -> Result<RankedStory, RankError> {
        self.rank(stories, now)
            .into_iter()
            .next()
            .ok_or(RankError::EmptyInput)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::types::Topic;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 17, 12, 0, 0).unwrap()
    }

    fn story(url: &str, title: &str, age_min: Option<i64>) -> Story {
        Story::new(
            title,
            "",
            format!("https://news.example/{url}"),
            Topic::Crypto,
            "test",
            age_min.map(|m| now() - Duration::minutes(m)),
        )
        .unwrap()
    }

    fn ranker() -> PriorityRanker {
        PriorityRanker::new(&Vocabulary::default(), TierWeights::default(), 24.0)
    }

    #[test]
    fn tier_beats_freshness() {
        // breaking, 23h old (1h bonus) vs price-only, brand new (24h bonus)
        let breaking = story("a", "Breaking news from the SEC", Some(23 * 60));
        let price = story("b", "Bitcoin rally continues", Some(0));
        let ranked = ranker().rank(vec![price, breaking], now());
        assert!(ranked[0].story.url.ends_with("/a"));
        assert!(ranked[0].score > ranked[1].score);
    }

    #[test]
    fn weights_follow_tiers() {
        let r = ranker();
        assert_eq!(r.score(&story("a", "breaking", None), now()), 1000.0);
        assert_eq!(r.score(&story("b", "wallet hack", None), now()), 800.0);
        assert_eq!(r.score(&story("c", "ETH price", None), now()), 600.0);
        assert_eq!(r.score(&story("d", "new record", None), now()), 400.0);
        assert_eq!(r.score(&story("e", "plain", Some(30)), now()), 23.5);
        assert_eq!(r.score(&story("f", "plain", Some(48 * 60)), now()), 0.0);
    }

    #[test]
    fn ties_keep_input_order() {
        let ranked = ranker().rank(
            vec![story("1", "plain one", None), story("2", "plain two", None)],
            now(),
        );
        assert!(ranked[0].story.url.ends_with("/1"));
        assert!(ranked[1].story.url.ends_with("/2"));
    }

    #[test]
    fn select_best_on_empty_fails() {
        assert_eq!(ranker().select_best(vec![], now()), Err(RankError::EmptyInput));
    }
}
