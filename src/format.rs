// src/format.rs
//! Deterministic post rendering: optional `BREAKING: ` / `JUST IN: ` prefix
//! followed by the cleaned title, never longer than the character budget.

use once_cell::sync::OnceCell;
use regex::Regex;

use crate::config::keywords::{clean_list, first_match, Vocabulary};
use crate::config::BotConfig;
use crate::ingest::types::Story;

pub const MAX_POST_CHARS: usize = 280;
pub const ELLIPSIS: &str = "...";

const BREAKING_PREFIX: &str = "BREAKING: ";
const JUST_IN_PREFIX: &str = "JUST IN: ";

/// Strip control chars and punctuation except `$ % : . -`, collapse whitespace,
/// and drop leading news markers ("BREAKING:", "JUST IN -", ...) so the
/// formatter's own prefix is never doubled.
pub fn clean_title(raw: &str) -> String {
    let kept: String = raw
        .chars()
        .map(|c| {
            if c.is_control() || c.is_whitespace() {
                ' '
            } else {
                c
            }
        })
        .filter(|c| c.is_alphanumeric() || *c == ' ' || matches!(c, '$' | '%' | ':' | '.' | '-'))
        .collect();

    static RE_WS: OnceCell<Regex> = OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| Regex::new(r"\s+").unwrap());
    let mut out = re_ws.replace_all(&kept, " ").trim().to_string();

    static RE_MARKER: OnceCell<Regex> = OnceCell::new();
    let re_marker = RE_MARKER.get_or_init(|| {
        Regex::new(r"(?i)^(?:(?:breaking(?: news)?|just in|urgent|developing)\s*[:\-]+\s*)+").unwrap()
    });
    out = re_marker.replace(&out, "").to_string();

    out.trim_start_matches([':', '-', '.', ' ']).trim().to_string()
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

fn take_chars(s: &str, n: usize) -> String {
    s.chars().take(n).collect()
}

#[derive(Debug, Clone)]
pub struct PostFormatter {
    breaking: Vec<String>,
    price: Vec<String>,
    max_chars: usize,
    include_link: bool,
}

impl PostFormatter {
    pub fn new(vocab: &Vocabulary, max_chars: usize, include_link: bool) -> Self {
        Self {
            breaking: clean_list(&vocab.breaking),
            price: clean_list(&vocab.price),
            max_chars,
            include_link,
        }
    }

    pub fn from_config(cfg: &BotConfig) -> Self {
        Self::new(&cfg.keywords, cfg.format.max_chars, cfg.format.include_link)
    }

    pub fn max_chars(&self) -> usize {
        self.max_chars
    }

    fn prefix_for(&self, title: &str) -> &'static str {
        let lower = title.to_lowercase();
        if first_match(&lower, &self.breaking).is_some() {
            BREAKING_PREFIX
        } else if first_match(&lower, &self.price).is_some() {
            JUST_IN_PREFIX
        } else {
            ""
        }
    }

    /// Same story in, same text out. `None` when nothing of the title
    /// survives cleaning (marker-only or emoji-only titles): such a story
    /// has no postable text.
    pub fn format(&self, story: &Story) -> Option<String> {
        let title = clean_title(&story.title);
        if title.is_empty() {
            return None;
        }
        Some(self.render(&story.title, &title, &story.url))
    }

    fn render(&self, raw_title: &str, title: &str, url: &str) -> String {
        let prefix = self.prefix_for(raw_title);
        let suffix = if self.include_link {
            format!("\n\n{url}")
        } else {
            String::new()
        };

        let full = format!("{prefix}{title}{suffix}");
        if char_len(&full) <= self.max_chars {
            return full;
        }

        // Only the title shrinks. A link that cannot fit even next to an empty
        // title is dropped rather than cut.
        let fixed = char_len(prefix) + char_len(ELLIPSIS);
        let suffix = if fixed + char_len(&suffix) < self.max_chars {
            suffix
        } else {
            String::new()
        };
        let room = self.max_chars.saturating_sub(fixed + char_len(&suffix));
        let cut = take_chars(title, room);
        let out = format!("{prefix}{}{ELLIPSIS}{suffix}", cut.trim_end());
        take_chars(&out, self.max_chars)
    }
}

impl Default for PostFormatter {
    fn default() -> Self {
        Self::new(&Vocabulary::default(), MAX_POST_CHARS, false)
    }
}
