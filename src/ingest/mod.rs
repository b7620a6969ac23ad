// src/ingest/mod.rs
pub mod providers;
pub mod types;

use crate::ingest::types::{FeedAdapter, Story, Topic};
use metrics::{describe_counter, describe_histogram};
use once_cell::sync::OnceCell;

/// One-time metrics registration (so series show up on /metrics).
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!(
            "newsbot_stories_fetched_total",
            "Stories returned by adapters."
        );
        describe_counter!(
            "newsbot_adapter_errors_total",
            "Adapter fetch/parse errors."
        );
        describe_histogram!("newsbot_fetch_ms", "Adapter fetch time in milliseconds.");
    });
}

/// Normalize text: decode entities, strip tags, collapse whitespace.
pub fn normalize_text(s: &str) -> String {
    // 1) HTML entity decode
    let mut out = html_escape::decode_html_entities(s).to_string();

    // 2) Strip HTML tags
    static RE_TAGS: OnceCell<regex::Regex> = OnceCell::new();
    let re_tags = RE_TAGS.get_or_init(|| regex::Regex::new(r"(?is)</?[^>]+>").unwrap());
    out = re_tags.replace_all(&out, " ").to_string();

    // 3) Normalize “ ” ‘ ’ « » to ASCII quotes
    out = out
        .replace(['\u{201C}', '\u{201D}', '\u{00AB}', '\u{00BB}'], "\"")
        .replace(['\u{2018}', '\u{2019}'], "'");

    // 4) Collapse whitespace
    static RE_WS: OnceCell<regex::Regex> = OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| regex::Regex::new(r"\s+").unwrap());
    re_ws.replace_all(&out, " ").trim().to_string()
}

/// Normalized excerpt capped at `max_chars`, with `...` appended when cut.
pub fn excerpt(s: &str, max_chars: usize) -> String {
    let text = normalize_text(s);
    if text.chars().count() > max_chars {
        let cut: String = text.chars().take(max_chars).collect();
        format!("{}...", cut.trim_end())
    } else {
        text
    }
}

/// Topic gate used by adapters. Phrases (anything with a space or hyphen) match
/// as substrings; short words (< 4 chars) must equal a whole word; longer words
/// match a word prefix, so `hack` covers `hacked`.
pub fn mentions_any<S: AsRef<str>>(text: &str, keywords: &[S]) -> bool {
    let lower = text.to_lowercase();
    let words: Vec<&str> = lower
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect();
    keywords.iter().any(|k| {
        let k = k.as_ref().to_lowercase();
        if k.contains(' ') || k.contains('-') {
            lower.contains(&k)
        } else {
            words
                .iter()
                .any(|w| *w == k || (k.chars().count() >= 4 && w.starts_with(k.as_str())))
        }
    })
}

/// Run every adapter registered for `topic`, in registration order.
/// A failing adapter contributes nothing; no cross-adapter dedup happens here.
pub async fn aggregate(adapters: &[Box<dyn FeedAdapter>], topic: Topic) -> Vec<Story> {
    ensure_metrics_described();

    let mut out = Vec::new();
    for a in adapters.iter().filter(|a| a.topic() == topic) {
        let mut stories = a.fetch().await;
        tracing::debug!(target: "ingest", adapter = a.name(), count = stories.len(), "adapter fetched");
        out.append(&mut stories);
    }
    out
}

/// Aggregate all topics (crypto first, then AI).
pub async fn aggregate_all(adapters: &[Box<dyn FeedAdapter>]) -> Vec<Story> {
    let mut out = Vec::new();
    for topic in Topic::ALL {
        let mut stories = aggregate(adapters, topic).await;
        tracing::info!(target: "ingest", %topic, count = stories.len(), "topic aggregated");
        out.append(&mut stories);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_text_strips_tags_and_collapses_ws() {
        let s = "  <p>Hello,&nbsp;&nbsp; <b>world</b></p>\n\n&ldquo;ok&rdquo; ";
        assert_eq!(normalize_text(s), r#"Hello, world "ok""#);
    }

    #[test]
    fn excerpt_caps_and_marks_cut() {
        assert_eq!(excerpt("short", 10), "short");
        assert_eq!(excerpt("abcdefghijkl", 5), "abcde...");
    }

    #[test]
    fn topic_gate_respects_word_boundaries() {
        let ai = ["ai", "machine learning", "llm"];
        assert!(mentions_any("New AI model beats benchmark", &ai));
        assert!(mentions_any("Advances in Machine Learning", &ai));
        assert!(mentions_any("Open-source LLM released", &ai));
        assert!(!mentions_any("Senator said the bill failed", &ai));
        assert!(!mentions_any("Rain expected again", &ai));

        let crypto = ["hack", "surge"];
        assert!(mentions_any("Exchange hacked for $40M", &crypto));
        assert!(mentions_any("Solana surges 12%", &crypto));
    }
}
