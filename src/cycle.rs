// src/cycle.rs
//! One posting cycle:
//! gate -> fetch -> filter -> drop posted -> rank -> format -> publish -> record.
//!
//! Every early exit is an ordinary `CycleOutcome`; `Err` is reserved for
//! failures nothing downstream expected (the continuous loop cools down on those).

use anyhow::Result;
use chrono::{DateTime, Duration as ChronoDuration, FixedOffset, Local, Utc};
use metrics::counter;
use serde::Serialize;

use crate::config::BotConfig;
use crate::dedup::PostedStore;
use crate::filter::StoryFilter;
use crate::format::PostFormatter;
use crate::gate::{GateDecision, PublisherGate};
use crate::ingest::{self, types::FeedAdapter};
use crate::publish::Publisher;
use crate::rank::PriorityRanker;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CycleOutcome {
    /// Gate said no; nothing was fetched.
    Gated { reason: String },
    /// Nothing survived filtering and dedup.
    NoCandidates { fetched: usize, filtered: usize },
    /// Publish failed; the story stays eligible.
    PublishFailed { url: String, error: String },
    Posted {
        url: String,
        post_id: String,
        text: String,
        score: f64,
    },
}

impl CycleOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            CycleOutcome::Gated { .. } => "gated",
            CycleOutcome::NoCandidates { .. } => "no_candidates",
            CycleOutcome::PublishFailed { .. } => "publish_failed",
            CycleOutcome::Posted { .. } => "posted",
        }
    }

    pub fn is_posted(&self) -> bool {
        matches!(self, CycleOutcome::Posted { .. })
    }
}

fn gate_reason(d: GateDecision) -> String {
    match d {
        GateDecision::Allowed => "allowed".to_string(),
        GateDecision::OutsideActiveHours { hour } => format!("outside active hours (hour {hour})"),
        GateDecision::TooSoon { remaining_secs } => format!("min interval not elapsed ({remaining_secs}s left)"),
    }
}

/// Owns all per-process state: posted set and rate state live here, not in globals.
pub struct NewsBot {
    adapters: Vec<Box<dyn FeedAdapter>>,
    filter: StoryFilter,
    ranker: PriorityRanker,
    formatter: PostFormatter,
    gate: PublisherGate,
    posted: PostedStore,
    publisher: Box<dyn Publisher>,
}

impl NewsBot {
    pub fn from_config(
        cfg: &BotConfig,
        adapters: Vec<Box<dyn FeedAdapter>>,
        posted: PostedStore,
        publisher: Box<dyn Publisher>,
    ) -> Self {
        Self {
            adapters,
            filter: StoryFilter::from_config(cfg),
            ranker: PriorityRanker::from_config(cfg),
            formatter: PostFormatter::from_config(cfg),
            gate: PublisherGate::from_config(cfg),
            posted,
            publisher,
        }
    }

    pub fn posted(&self) -> &PostedStore {
        &self.posted
    }

    pub fn gate(&self) -> &PublisherGate {
        &self.gate
    }

    pub fn publisher_name(&self) -> &'static str {
        self.publisher.name()
    }

    /// Run one cycle against the local wall clock.
    pub async fn run_cycle(&mut self) -> Result<CycleOutcome> {
        self.run_cycle_at(Local::now().fixed_offset()).await
    }

    pub async fn run_cycle_at(&mut self, now: DateTime<FixedOffset>) -> Result<CycleOutcome> {
        let outcome = self.cycle(now).await?;
        counter!("newsbot_cycles_total", "outcome" => outcome.label()).increment(1);
        Ok(outcome)
    }

    async fn cycle(&mut self, now: DateTime<FixedOffset>) -> Result<CycleOutcome> {
        let now_utc: DateTime<Utc> = now.with_timezone(&Utc);
        let started = tokio::time::Instant::now();

        // Gating
        let decision = self.gate.check(now);
        if !decision.is_allowed() {
            let reason = gate_reason(decision);
            tracing::info!(target: "cycle", %reason, "cycle skipped by gate");
            return Ok(CycleOutcome::Gated { reason });
        }

        // Fetching
        let fetched = ingest::aggregate_all(&self.adapters).await;
        let fetched_n = fetched.len();

        // Filtering
        let filtered = self.filter.apply(fetched, now_utc);
        let filtered_n = filtered.len();
        let candidates = self.posted.retain_unseen(filtered);
        tracing::info!(
            target: "cycle",
            fetched = fetched_n,
            filtered = filtered_n,
            unseen = candidates.len(),
            "candidates selected"
        );
        if candidates.is_empty() {
            tracing::info!(target: "cycle", "no new interesting stories");
            return Ok(CycleOutcome::NoCandidates {
                fetched: fetched_n,
                filtered: filtered_n,
            });
        }

        // Ranking + Formatting: best first, skipping stories with no postable text
        let mut best = None;
        for ranked in self.ranker.rank(candidates, now_utc) {
            match self.formatter.format(&ranked.story) {
                Some(text) => {
                    best = Some((ranked, text));
                    break;
                }
                None => tracing::debug!(
                    target: "cycle",
                    url = %ranked.story.url,
                    "no postable text after cleaning, skipped"
                ),
            }
        }
        let Some((best, text)) = best else {
            tracing::info!(target: "cycle", "no candidate has postable text");
            return Ok(CycleOutcome::NoCandidates {
                fetched: fetched_n,
                filtered: filtered_n,
            });
        };
        tracing::info!(
            target: "cycle",
            url = %best.story.url,
            source = %best.story.source,
            topic = %best.story.topic,
            score = best.score,
            "best story"
        );

        // Publishing
        let post_id = match self.publisher.publish(&text).await {
            Ok(id) => id,
            Err(e) => {
                tracing::error!(target: "cycle", error = ?e, publisher = self.publisher.name(), url = %best.story.url, "publish failed");
                counter!("newsbot_publish_failures_total").increment(1);
                return Ok(CycleOutcome::PublishFailed {
                    url: best.story.url,
                    error: format!("{e:#}"),
                });
            }
        };

        // Recording
        self.posted.add(best.story.url.clone());
        self.posted.persist_best_effort();
        // Spacing counts from when the post went out, not from the cycle start.
        // Whole seconds, like the interval itself.
        let elapsed = i64::try_from(started.elapsed().as_secs()).unwrap_or(i64::MAX);
        let posted_at = now_utc + ChronoDuration::try_seconds(elapsed).unwrap_or_else(ChronoDuration::zero);
        self.gate.record_post(posted_at);
        counter!("newsbot_posts_total").increment(1);
        tracing::info!(target: "cycle", %post_id, url = %best.story.url, "posted story");

        Ok(CycleOutcome::Posted {
            url: best.story.url,
            post_id,
            text,
            score: best.score,
        })
    }
}
