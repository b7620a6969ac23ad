// src/dedup.rs
//! Posted-URL set. Grows only; persisted as a flat JSON array of strings.

use anyhow::{Context, Result};
use chrono::Utc;
use metrics::counter;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::ingest::types::Story;

pub const ENV_POSTED_STORIES: &str = "POSTED_STORIES";

#[derive(Debug, Default)]
pub struct PostedStore {
    urls: HashSet<String>,
    path: Option<PathBuf>,
}

impl PostedStore {
    /// In-memory only; `persist` is a no-op.
    pub fn in_memory<I, S>(urls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            urls: urls.into_iter().map(Into::into).collect(),
            path: None,
        }
    }

    /// Load from `path`. A missing or blank file is an empty set. A file
    /// that cannot be read or parsed is renamed to `<name>.corrupt-<utc>` and
    /// the set starts empty; if even that rename fails, persistence is
    /// disabled so the unreadable file is never overwritten.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let (urls, path) = match read_url_list(&path) {
            Ok(Some(v)) => (v, Some(path)),
            Ok(None) => (Vec::new(), Some(path)),
            Err(e) => match quarantine(&path) {
                Ok(moved) => {
                    tracing::warn!(target: "dedup", error = ?e, path = %path.display(), moved_to = %moved.display(), "posted set unreadable, moved aside and starting empty");
                    (Vec::new(), Some(path))
                }
                Err(mv) => {
                    tracing::error!(target: "dedup", error = ?e, rename_error = ?mv, path = %path.display(), "posted set unreadable and could not be moved aside, persistence disabled");
                    (Vec::new(), None)
                }
            },
        };
        let store = Self {
            urls: urls.into_iter().collect(),
            path,
        };
        tracing::info!(target: "dedup", count = store.len(), "posted set loaded");
        store
    }

    /// `load` plus any URLs injected through `$POSTED_STORIES` (JSON array).
    pub fn load_with_env(path: impl Into<PathBuf>) -> Self {
        let mut store = Self::load(path);
        if let Ok(raw) = std::env::var(ENV_POSTED_STORIES) {
            match serde_json::from_str::<Vec<String>>(&raw) {
                Ok(v) => {
                    let before = store.len();
                    store.urls.extend(v.into_iter().filter(|u| !u.trim().is_empty()));
                    tracing::info!(target: "dedup", added = store.len() - before, "posted set merged from env");
                }
                Err(e) => {
                    tracing::warn!(target: "dedup", error = %e, "ignoring malformed {ENV_POSTED_STORIES}")
                }
            }
        }
        store
    }

    pub fn contains(&self, url: &str) -> bool {
        self.urls.contains(url)
    }

    /// Idempotent; returns true when the URL was new.
    pub fn add(&mut self, url: impl Into<String>) -> bool {
        self.urls.insert(url.into())
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Drop every story whose URL was already posted. Order is preserved.
    pub fn retain_unseen(&self, stories: Vec<Story>) -> Vec<Story> {
        stories.into_iter().filter(|s| !self.contains(&s.url)).collect()
    }

    /// Sorted snapshot, the on-disk order.
    pub fn snapshot(&self) -> Vec<String> {
        let mut v: Vec<String> = self.urls.iter().cloned().collect();
        v.sort();
        v
    }

    /// Write the whole set (temp file + rename).
    pub fn persist(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let body = serde_json::to_string_pretty(&self.snapshot()).context("serializing posted set")?;
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, body).with_context(|| format!("writing {}", tmp.display()))?;
        fs::rename(&tmp, path).with_context(|| format!("renaming into {}", path.display()))?;
        Ok(())
    }

    /// `persist` that only logs. The in-memory set stays authoritative either way.
    pub fn persist_best_effort(&self) -> bool {
        match self.persist() {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(target: "dedup", error = ?e, "posted set persist failed");
                counter!("newsbot_persist_errors_total").increment(1);
                false
            }
        }
    }
}

/// Rename an unreadable posted file out of the way, keeping its bytes.
fn quarantine(path: &Path) -> Result<PathBuf> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "posted".to_string());
    let stamp = Utc::now().format("%Y%m%dT%H%M%S");
    let target = path.with_file_name(format!("{name}.corrupt-{stamp}"));
    fs::rename(path, &target)
        .with_context(|| format!("renaming {} to {}", path.display(), target.display()))?;
    Ok(target)
}

fn read_url_list(path: &Path) -> Result<Option<Vec<String>>> {
    if !path.exists() {
        return Ok(None);
    }
    let content =
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    if content.trim().is_empty() {
        return Ok(Some(Vec::new()));
    }
    let v: Vec<String> = serde_json::from_str(&content)
        .with_context(|| format!("parsing {}", path.display()))?;
    Ok(Some(v))
}
