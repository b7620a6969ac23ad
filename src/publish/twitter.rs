// src/publish/twitter.rs
//! X/Twitter v2 `POST /2/tweets` with OAuth 1.0a (HMAC-SHA1) user context.

use anyhow::{anyhow, Context, Result};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use hmac::{Hmac, Mac};
use rand::Rng;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use sha1::Sha1;
use std::time::Duration;

use super::Publisher;
use crate::ingest::providers::build_http_client;

pub const DEFAULT_TWEETS_URL: &str = "https://api.twitter.com/2/tweets";
const DEFAULT_TIMEOUT_SECS: u64 = 10;

const ENV_API_KEY: &str = "TWITTER_API_KEY";
const ENV_API_SECRET: &str = "TWITTER_API_SECRET";
const ENV_ACCESS_TOKEN: &str = "TWITTER_ACCESS_TOKEN";
const ENV_ACCESS_SECRET: &str = "TWITTER_ACCESS_TOKEN_SECRET";

#[derive(Clone)]
pub struct OAuth1Credentials {
    pub consumer_key: String,
    pub consumer_secret: String,
    pub token: String,
    pub token_secret: String,
}

impl std::fmt::Debug for OAuth1Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OAuth1Credentials")
            .field("consumer_key", &self.consumer_key)
            .field("token", &"<redacted>")
            .finish_non_exhaustive()
    }
}

impl OAuth1Credentials {
    /// All four values are required; a missing or blank one is a startup error.
    pub fn from_env() -> Result<Self> {
        fn req(key: &str) -> Result<String> {
            std::env::var(key)
                .ok()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .ok_or_else(|| anyhow!("Missing {key} env var"))
        }
        Ok(Self {
            consumer_key: req(ENV_API_KEY)?,
            consumer_secret: req(ENV_API_SECRET)?,
            token: req(ENV_ACCESS_TOKEN)?,
            token_secret: req(ENV_ACCESS_SECRET)?,
        })
    }

    /// HMAC-SHA1 signature over the OAuth signature base string.
    /// `params` are the non-oauth query/form params; JSON bodies are not signed.
    pub fn sign(
        &self,
        method: &str,
        url: &str,
        params: &[(&str, &str)],
        nonce: &str,
        timestamp: u64,
    ) -> Result<String> {
        let ts = timestamp.to_string();
        let mut all: Vec<(String, String)> = self
            .oauth_params(nonce, &ts)
            .into_iter()
            .chain(params.iter().copied())
            .map(|(k, v)| (pct(k), pct(v)))
            .collect();
        all.sort();
        let param_str = all
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("&");

        let base = format!(
            "{}&{}&{}",
            method.to_ascii_uppercase(),
            pct(url),
            pct(&param_str)
        );
        let key = format!("{}&{}", pct(&self.consumer_secret), pct(&self.token_secret));

        let mut mac = Hmac::<Sha1>::new_from_slice(key.as_bytes())
            .map_err(|e| anyhow!("hmac key: {e}"))?;
        mac.update(base.as_bytes());
        Ok(STANDARD.encode(mac.finalize().into_bytes()))
    }

    /// Value for the `Authorization` header.
    pub fn authorization_header(
        &self,
        method: &str,
        url: &str,
        nonce: &str,
        timestamp: u64,
    ) -> Result<String> {
        let signature = self.sign(method, url, &[], nonce, timestamp)?;
        let ts = timestamp.to_string();
        let mut fields: Vec<(&str, &str)> = self.oauth_params(nonce, &ts);
        fields.push(("oauth_signature", signature.as_str()));
        fields.sort();
        let joined = fields
            .iter()
            .map(|(k, v)| format!("{}=\"{}\"", pct(k), pct(v)))
            .collect::<Vec<_>>()
            .join(", ");
        Ok(format!("OAuth {joined}"))
    }

    fn oauth_params<'a>(&'a self, nonce: &'a str, ts: &'a str) -> Vec<(&'a str, &'a str)> {
        vec![
            ("oauth_consumer_key", self.consumer_key.as_str()),
            ("oauth_nonce", nonce),
            ("oauth_signature_method", "HMAC-SHA1"),
            ("oauth_timestamp", ts),
            ("oauth_token", self.token.as_str()),
            ("oauth_version", "1.0"),
        ]
    }
}

/// RFC 3986 percent-encoding (unreserved: ALPHA / DIGIT / - . _ ~).
fn pct(s: &str) -> String {
    urlencoding::encode(s).into_owned()
}

fn new_nonce() -> String {
    rand::rng()
        .sample_iter(rand::distr::Alphanumeric)
        .take(32)
        .map(char::from)
        .collect()
}

#[derive(Serialize)]
struct CreateTweet<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct CreateTweetResp {
    data: TweetData,
}

#[derive(Deserialize)]
struct TweetData {
    id: String,
}

#[derive(Clone)]
pub struct TwitterPublisher {
    creds: OAuth1Credentials,
    endpoint: String,
    client: Client,
    timeout: Duration,
}

impl TwitterPublisher {
    /// Uses the same client setup as the feed adapters (timeout, User-Agent).
    pub fn new(creds: OAuth1Credentials) -> Result<Self> {
        Ok(Self {
            creds,
            endpoint: DEFAULT_TWEETS_URL.to_string(),
            client: build_http_client(DEFAULT_TIMEOUT_SECS)?,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        })
    }

    pub fn from_env() -> Result<Self> {
        Self::new(OAuth1Credentials::from_env()?)
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout = Duration::from_secs(secs);
        self
    }

    pub fn with_endpoint(mut self, url: impl Into<String>) -> Self {
        self.endpoint = url.into();
        self
    }
}

#[async_trait::async_trait]
impl Publisher for TwitterPublisher {
    async fn publish(&self, text: &str) -> Result<String> {
        let ts = chrono::Utc::now().timestamp().max(0) as u64;
        let auth = self
            .creds
            .authorization_header("POST", &self.endpoint, &new_nonce(), ts)?;

        let rsp = self
            .client
            .post(&self.endpoint)
            .timeout(self.timeout)
            .header(reqwest::header::AUTHORIZATION, auth)
            .json(&CreateTweet { text })
            .send()
            .await
            .context("tweet post")?;

        let status = rsp.status();
        if !status.is_success() {
            let body = rsp.text().await.unwrap_or_default();
            return Err(anyhow!("tweet HTTP {status}: {body}"));
        }
        let parsed: CreateTweetResp = rsp.json().await.context("tweet response json")?;
        Ok(parsed.data.id)
    }

    fn name(&self) -> &'static str {
        "twitter"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc_creds() -> OAuth1Credentials {
        OAuth1Credentials {
            consumer_key: "xvz1evFS4wEEPTGEFPHBog".into(),
            consumer_secret: "kAcSOqF21Fu85e7zjz7ZN2U4ZRhfV3WpwPAoE3Z7kBw".into(),
            token: "370773112-GmHxMAgYyLbNEtIKZeRNFsMKPR9EyMZeS9weJAEb".into(),
            token_secret: "LswwdoUaIvS8ltyTt5jkRh4J50vUPVVHtR2YPi5kE".into(),
        }
    }

    // Reference request from X's "Creating a signature" guide.
    #[test]
    fn signature_matches_reference_vector() {
        let sig = doc_creds()
            .sign(
                "POST",
                "https://api.twitter.com/1.1/statuses/update.json",
                &[
                    ("include_entities", "true"),
                    ("status", "Hello Ladies + Gentlemen, a signed OAuth request!"),
                ],
                "kYjzVBB8Y0ZFabxSWbWovY3uYSQ2pTgmZeNu2VS4cg",
                1_318_622_958,
            )
            .unwrap();
        assert_eq!(sig, "hCtSmYh+iHYCEqBWrE7C7hYmtUk=");
    }

    #[test]
    fn header_lists_all_oauth_fields_encoded() {
        let h = doc_creds()
            .authorization_header("POST", DEFAULT_TWEETS_URL, "abc", 1)
            .unwrap();
        assert!(h.starts_with("OAuth oauth_consumer_key=\"xvz1evFS4wEEPTGEFPHBog\""));
        assert!(h.contains("oauth_nonce=\"abc\""));
        assert!(h.contains("oauth_signature_method=\"HMAC-SHA1\""));
        assert!(h.contains("oauth_timestamp=\"1\""));
        assert!(h.contains("oauth_version=\"1.0\""));
        // base64 '+', '/', '=' must be percent-encoded inside the header
        let sig = h.split("oauth_signature=\"").nth(1).unwrap();
        let sig = &sig[..sig.find('"').unwrap()];
        assert!(!sig.contains('+') && !sig.contains('/') && !sig.contains('='));
    }

    #[test]
    fn nonce_is_alphanumeric() {
        let n = new_nonce();
        assert_eq!(n.len(), 32);
        assert!(n.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn debug_redacts_secrets() {
        let s = format!("{:?}", doc_creds());
        assert!(!s.contains("kAcSOqF21Fu85e7zjz7ZN2U4ZRhfV3WpwPAoE3Z7kBw"));
    }
}
