// src/scheduler.rs
//! Run modes: a single cycle (external trigger such as cron/CI) or a loop
//! that sleeps a random 2-4 h between cycles and cools down after failures.

use anyhow::Result;
use rand::Rng;
use std::time::Duration;

use crate::api::SharedStatus;
use crate::config::BotConfig;
use crate::cycle::{CycleOutcome, NewsBot};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LoopCfg {
    pub delay_min_secs: u64,
    pub delay_max_secs: u64,
    pub recovery_secs: u64,
}

impl LoopCfg {
    pub fn from_config(cfg: &BotConfig) -> Self {
        let s = &cfg.schedule;
        Self {
            delay_min_secs: s.cycle_delay_min_secs,
            delay_max_secs: s.cycle_delay_max_secs,
            recovery_secs: s.recovery_sleep_secs,
        }
    }

    /// Uniform in `[min, max]`.
    pub fn next_delay(&self) -> Duration {
        let (lo, hi) = if self.delay_min_secs <= self.delay_max_secs {
            (self.delay_min_secs, self.delay_max_secs)
        } else {
            (self.delay_max_secs, self.delay_min_secs)
        };
        Duration::from_secs(rand::rng().random_range(lo..=hi))
    }

    pub fn recovery(&self) -> Duration {
        Duration::from_secs(self.recovery_secs)
    }
}

/// Random delay after a finished cycle, the recovery delay after a failed one.
pub fn pause_after(result: &Result<CycleOutcome>, cfg: &LoopCfg) -> Duration {
    match result {
        Ok(_) => cfg.next_delay(),
        Err(_) => cfg.recovery(),
    }
}

/// Single-shot mode. Any cycle error is logged, never returned:
/// only startup failures should produce a non-zero exit.
pub async fn run_single(bot: &mut NewsBot, status: Option<&SharedStatus>) -> Option<CycleOutcome> {
    match bot.run_cycle().await {
        Ok(outcome) => {
            tracing::info!(target: "scheduler", outcome = outcome.label(), "single cycle finished");
            if let Some(st) = status {
                st.record(bot, &outcome);
            }
            Some(outcome)
        }
        Err(e) => {
            tracing::error!(target: "scheduler", error = ?e, "single cycle failed");
            None
        }
    }
}

/// Continuous mode. Never returns.
pub async fn run_forever(mut bot: NewsBot, cfg: LoopCfg, status: Option<SharedStatus>) {
    run_loop(&mut bot, cfg, status.as_ref(), None).await;
}

/// The loop behind `run_forever`; `max_cycles` bounds it for smoke runs.
pub async fn run_loop(
    bot: &mut NewsBot,
    cfg: LoopCfg,
    status: Option<&SharedStatus>,
    max_cycles: Option<u64>,
) {
    let mut n: u64 = 0;
    loop {
        let result = bot.run_cycle().await;
        let pause = pause_after(&result, &cfg);
        match &result {
            Ok(outcome) => {
                if let Some(st) = status {
                    st.record(bot, outcome);
                }
                tracing::info!(
                    target: "scheduler",
                    outcome = outcome.label(),
                    next_in_secs = pause.as_secs(),
                    "cycle finished"
                );
            }
            Err(e) => {
                tracing::error!(
                    target: "scheduler",
                    error = ?e,
                    recovery_secs = cfg.recovery_secs,
                    "cycle failed, cooling down"
                );
                if let Some(st) = status {
                    st.record_error(e);
                }
            }
        }

        n += 1;
        if max_cycles.is_some_and(|m| n >= m) {
            return;
        }
        tokio::time::sleep(pause).await;
    }
}
