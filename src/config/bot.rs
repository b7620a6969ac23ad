// src/config/bot.rs
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use super::keywords::Vocabulary;
use crate::ingest::providers::{coingecko, hacker_news};

pub const ENV_CONFIG_PATH: &str = "NEWSBOT_CONFIG_PATH";
pub const DEFAULT_CONFIG_PATH: &str = "config/bot.toml";

pub const ENV_ACTIVE_START: &str = "ACTIVE_HOURS_START";
pub const ENV_ACTIVE_END: &str = "ACTIVE_HOURS_END";
pub const ENV_MIN_INTERVAL: &str = "MIN_POST_INTERVAL_SECS";
pub const ENV_POSTED_PATH: &str = "POSTED_STORIES_PATH";
pub const ENV_DRY_RUN: &str = "NEWSBOT_DRY_RUN";

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct BotConfig {
    #[serde(default)]
    pub dry_run: bool,
    #[serde(default)]
    pub schedule: ScheduleConfig,
    #[serde(default)]
    pub filter: FilterConfig,
    #[serde(default)]
    pub rank: RankConfig,
    #[serde(default)]
    pub format: FormatConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub sources: SourcesConfig,
    #[serde(default)]
    pub keywords: Vocabulary,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ScheduleConfig {
    /// Local-hour window `[start, end)` in which posting is allowed.
    pub active_start_hour: u32,
    pub active_end_hour: u32,
    pub min_post_interval_secs: u64,
    pub cycle_delay_min_secs: u64,
    pub cycle_delay_max_secs: u64,
    pub recovery_sleep_secs: u64,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            active_start_hour: 6,
            active_end_hour: 23,
            min_post_interval_secs: 2 * 3600,
            cycle_delay_min_secs: 2 * 3600,
            cycle_delay_max_secs: 4 * 3600,
            recovery_sleep_secs: 30 * 60,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FilterConfig {
    pub freshness_threshold_hours: f64,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            freshness_threshold_hours: 6.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RankConfig {
    pub freshness_cap_hours: f64,
    pub breaking_weight: f64,
    pub security_weight: f64,
    pub price_weight: f64,
    pub milestone_weight: f64,
}

impl Default for RankConfig {
    fn default() -> Self {
        Self {
            freshness_cap_hours: 24.0,
            breaking_weight: 1000.0,
            security_weight: 800.0,
            price_weight: 600.0,
            milestone_weight: 400.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FormatConfig {
    pub max_chars: usize,
    pub include_link: bool,
}

impl Default for FormatConfig {
    fn default() -> Self {
        Self {
            max_chars: 280,
            include_link: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StoreConfig {
    pub posted_stories_path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            posted_stories_path: PathBuf::from("posted_stories.json"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SourcesConfig {
    pub http_timeout_secs: u64,
    /// Per-adapter recency cutoff; items older than this never leave the adapter.
    pub adapter_max_age_hours: f64,
    pub coingecko_base_url: String,
    pub coingecko_max_items: usize,
    pub coindesk_rss_url: String,
    pub techreview_rss_url: String,
    pub rss_max_items: usize,
    pub hacker_news_base_url: String,
    pub hn_scan_limit: usize,
    pub hn_max_stories: usize,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            http_timeout_secs: 10,
            adapter_max_age_hours: 24.0,
            coingecko_base_url: coingecko::DEFAULT_BASE_URL.to_string(),
            coingecko_max_items: 3,
            coindesk_rss_url: "https://www.coindesk.com/arc/outboundfeeds/rss/".to_string(),
            techreview_rss_url: "https://www.technologyreview.com/feed/".to_string(),
            rss_max_items: 5,
            hacker_news_base_url: hacker_news::DEFAULT_BASE_URL.to_string(),
            hn_scan_limit: 20,
            hn_max_stories: 3,
        }
    }
}

impl BotConfig {
    /// Load from an explicit TOML file; missing sections fall back to defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading config from {}", path.display()))?;
        let cfg: BotConfig = toml::from_str(&content)
            .with_context(|| format!("parsing config {}", path.display()))?;
        cfg.validate()
    }

    /// Explicit file plus env overrides, validated again after overriding.
    pub fn load_with_overrides(path: &Path) -> Result<Self> {
        Self::load_from(path)?.with_env_overrides().validate()
    }

    /// Resolve config using env var + fallbacks, then apply env overrides:
    /// 1) $NEWSBOT_CONFIG_PATH (must exist)
    /// 2) config/bot.toml
    /// 3) built-in defaults
    pub fn load_default() -> Result<Self> {
        let base = if let Ok(p) = std::env::var(ENV_CONFIG_PATH) {
            let pb = PathBuf::from(p);
            if !pb.exists() {
                return Err(anyhow!("{ENV_CONFIG_PATH} points to non-existent path"));
            }
            Self::load_from(&pb)?
        } else {
            let default_p = PathBuf::from(DEFAULT_CONFIG_PATH);
            if default_p.exists() {
                Self::load_from(&default_p)?
            } else {
                Self::default()
            }
        };
        base.with_env_overrides().validate()
    }

    /// Apply process-env overrides. Unparseable values are ignored with a warning.
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(h) = env_parse::<u32>(ENV_ACTIVE_START) {
            self.schedule.active_start_hour = h;
        }
        if let Some(h) = env_parse::<u32>(ENV_ACTIVE_END) {
            self.schedule.active_end_hour = h;
        }
        if let Some(s) = env_parse::<u64>(ENV_MIN_INTERVAL) {
            self.schedule.min_post_interval_secs = s;
        }
        if let Ok(p) = std::env::var(ENV_POSTED_PATH) {
            if !p.trim().is_empty() {
                self.store.posted_stories_path = PathBuf::from(p.trim());
            }
        }
        if let Ok(v) = std::env::var(ENV_DRY_RUN) {
            self.dry_run = matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes");
        }
        self
    }

    fn validate(mut self) -> Result<Self> {
        let s = &mut self.schedule;
        if s.active_start_hour > 23 || s.active_end_hour > 24 {
            return Err(anyhow!(
                "active hours must be start 0..=23, end 0..=24 (got {}..{})",
                s.active_start_hour,
                s.active_end_hour
            ));
        }
        if s.cycle_delay_min_secs > s.cycle_delay_max_secs {
            std::mem::swap(&mut s.cycle_delay_min_secs, &mut s.cycle_delay_max_secs);
        }
        if self.format.max_chars < 10 {
            return Err(anyhow!("format.max_chars too small: {}", self.format.max_chars));
        }
        Ok(self)
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    let raw = std::env::var(key).ok()?;
    match raw.trim().parse::<T>() {
        Ok(v) => Some(v),
        Err(_) => {
            tracing::warn!(key, value = %raw, "ignoring unparseable env override");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_toml_keeps_defaults() {
        let cfg: BotConfig = toml::from_str(
            r#"
[schedule]
active_start_hour = 7

[keywords]
exclude = ["sports"]
"#,
        )
        .unwrap();
        assert_eq!(cfg.schedule.active_start_hour, 7);
        assert_eq!(cfg.schedule.active_end_hour, 23);
        assert_eq!(cfg.schedule.min_post_interval_secs, 7200);
        assert_eq!(cfg.keywords.exclude, vec!["sports".to_string()]);
        assert_eq!(cfg.keywords.breaking, Vocabulary::default().breaking);
        assert_eq!(cfg.format.max_chars, 280);
    }

    #[test]
    fn validate_rejects_bad_hours_and_swaps_delays() {
        let mut cfg = BotConfig::default();
        cfg.schedule.cycle_delay_min_secs = 10;
        cfg.schedule.cycle_delay_max_secs = 5;
        let ok = cfg.clone().validate().unwrap();
        assert_eq!(ok.schedule.cycle_delay_min_secs, 5);
        assert_eq!(ok.schedule.cycle_delay_max_secs, 10);

        cfg.schedule.active_end_hour = 24;
        assert!(cfg.clone().validate().is_ok());
        cfg.schedule.active_end_hour = 25;
        assert!(cfg.validate().is_err());
    }
}
