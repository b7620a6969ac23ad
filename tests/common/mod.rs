// tests/common/mod.rs
#![allow(dead_code)]

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::{DateTime, Duration, FixedOffset, TimeZone, Utc};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use newsbot::{FeedAdapter, Publisher, Story, Topic};

/// Saturday 2026-10-17 at `hour`:00 local, UTC+0.
pub fn local(hour: u32) -> DateTime<FixedOffset> {
    FixedOffset::east_opt(0)
        .unwrap()
        .with_ymd_and_hms(2026, 10, 17, hour, 0, 0)
        .unwrap()
}

pub fn noon_utc() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 17, 12, 0, 0).unwrap()
}

pub fn story(url: &str, title: &str, age_hours: Option<i64>, topic: Topic) -> Story {
    Story::new(
        title,
        "",
        format!("https://news.example/{url}"),
        topic,
        "fixture",
        age_hours.map(|h| noon_utc() - Duration::hours(h)),
    )
    .unwrap()
}

/// Returns the same stories every time and counts calls.
pub struct StaticAdapter {
    pub name: &'static str,
    pub topic: Topic,
    pub stories: Vec<Story>,
    pub calls: Arc<AtomicUsize>,
}

impl StaticAdapter {
    pub fn new(name: &'static str, topic: Topic, stories: Vec<Story>) -> Self {
        Self {
            name,
            topic,
            stories,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }
}

#[async_trait]
impl FeedAdapter for StaticAdapter {
    async fn fetch_latest(&self) -> Result<Vec<Story>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.stories.clone())
    }
    fn name(&self) -> &'static str {
        self.name
    }
    fn topic(&self) -> Topic {
        self.topic
    }
}

/// Always errors, like a feed that is down.
pub struct BrokenAdapter(pub Topic);

#[async_trait]
impl FeedAdapter for BrokenAdapter {
    async fn fetch_latest(&self) -> Result<Vec<Story>> {
        Err(anyhow!("connection refused"))
    }
    fn name(&self) -> &'static str {
        "Broken"
    }
    fn topic(&self) -> Topic {
        self.0
    }
}

/// Records every text it is asked to publish; fails while `fail` is set.
/// Takes `delay_secs` of tokio time per call.
#[derive(Clone, Default)]
pub struct RecordingPublisher {
    pub sent: Arc<Mutex<Vec<String>>>,
    pub attempts: Arc<AtomicUsize>,
    pub fail: Arc<std::sync::atomic::AtomicBool>,
    pub delay_secs: Arc<AtomicU64>,
}

impl RecordingPublisher {
    pub fn with_delay(secs: u64) -> Self {
        let p = Self::default();
        p.delay_secs.store(secs, Ordering::SeqCst);
        p
    }

    pub fn failing() -> Self {
        let p = Self::default();
        p.fail.store(true, Ordering::SeqCst);
        p
    }

    pub fn set_failing(&self, on: bool) {
        self.fail.store(on, Ordering::SeqCst);
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    pub fn sent(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Publisher for RecordingPublisher {
    async fn publish(&self, text: &str) -> Result<String> {
        let n = self.attempts.fetch_add(1, Ordering::SeqCst) + 1;
        let delay = self.delay_secs.load(Ordering::SeqCst);
        if delay > 0 {
            tokio::time::sleep(std::time::Duration::from_secs(delay)).await;
        }
        if self.fail.load(Ordering::SeqCst) {
            return Err(anyhow!("HTTP 503 Service Unavailable"));
        }
        self.sent.lock().unwrap().push(text.to_string());
        Ok(format!("post-{n}"))
    }
    fn name(&self) -> &'static str {
        "recording"
    }
}
