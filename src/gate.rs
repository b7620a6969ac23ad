// src/gate.rs
use chrono::{DateTime, Duration as ChronoDuration, FixedOffset, Local, Timelike, Utc};

use crate::config::BotConfig;

/// Local-hour window `[start_hour, end_hour)`: 06..23 allows 06:00 through
/// 22:59 and denies from 23:00 on. `start > end` wraps past midnight,
/// `0..24` is always open and `start == end` is always closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActiveWindow {
    pub start_hour: u32,
    pub end_hour: u32,
}

impl ActiveWindow {
    pub fn contains(&self, hour: u32) -> bool {
        if self.start_hour <= self.end_hour {
            (self.start_hour..self.end_hour).contains(&hour)
        } else {
            hour >= self.start_hour || hour < self.end_hour
        }
    }
}

impl Default for ActiveWindow {
    fn default() -> Self {
        Self {
            start_hour: 6,
            end_hour: 23,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    Allowed,
    OutsideActiveHours { hour: u32 },
    TooSoon { remaining_secs: i64 },
}

impl GateDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, GateDecision::Allowed)
    }
}

/// Time-of-day window plus minimum spacing between posts.
/// - First post after startup is always allowed (no persisted rate state).
/// - State is updated explicitly via `record_post` after a successful publish.
#[derive(Debug, Clone)]
pub struct PublisherGate {
    window: ActiveWindow,
    min_interval: ChronoDuration,
    last_posted_at: Option<DateTime<Utc>>,
}

impl PublisherGate {
    /// `min_interval_secs` < 0 is treated as 0.
    pub fn new(window: ActiveWindow, min_interval_secs: i64) -> Self {
        Self {
            window,
            min_interval: ChronoDuration::seconds(min_interval_secs.max(0)),
            last_posted_at: None,
        }
    }

    pub fn from_config(cfg: &BotConfig) -> Self {
        let s = &cfg.schedule;
        Self::new(
            ActiveWindow {
                start_hour: s.active_start_hour,
                end_hour: s.active_end_hour,
            },
            i64::try_from(s.min_post_interval_secs).unwrap_or(i64::MAX),
        )
    }

    /// Check at `now` (local wall clock carried in the offset). Does NOT mutate state.
    pub fn check(&self, now: DateTime<FixedOffset>) -> GateDecision {
        let hour = now.hour();
        if !self.window.contains(hour) {
            return GateDecision::OutsideActiveHours { hour };
        }
        match self.last_posted_at {
            None => GateDecision::Allowed,
            Some(ts) => {
                let elapsed = now.with_timezone(&Utc).signed_duration_since(ts);
                if elapsed >= self.min_interval {
                    GateDecision::Allowed
                } else {
                    GateDecision::TooSoon {
                        remaining_secs: (self.min_interval - elapsed).num_seconds(),
                    }
                }
            }
        }
    }

    pub fn can_post_at(&self, now: DateTime<FixedOffset>) -> bool {
        self.check(now).is_allowed()
    }

    pub fn can_post_now(&self) -> bool {
        self.can_post_at(Local::now().fixed_offset())
    }

    /// Record a successful publish at `now`.
    pub fn record_post(&mut self, now: DateTime<Utc>) {
        self.last_posted_at = Some(now);
    }

    pub fn last_posted_at(&self) -> Option<DateTime<Utc>> {
        self.last_posted_at
    }
}
