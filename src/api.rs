// src/api.rs
//! Read-only status surface for continuous mode: /health, /status, /metrics.

use std::sync::{Arc, RwLock};

use axum::{extract::State, routing::get, Json, Router};
use chrono::{DateTime, Utc};
use metrics_exporter_prometheus::PrometheusHandle;
use serde::Serialize;

use crate::cycle::{CycleOutcome, NewsBot};

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct BotStatus {
    pub started_at: Option<DateTime<Utc>>,
    pub cycles: u64,
    pub posted_count: usize,
    pub last_posted_at: Option<DateTime<Utc>>,
    pub last_outcome: Option<CycleOutcome>,
    pub last_error: Option<String>,
}

#[derive(Clone, Default)]
pub struct SharedStatus {
    inner: Arc<RwLock<BotStatus>>,
}

impl SharedStatus {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(BotStatus {
                started_at: Some(Utc::now()),
                ..BotStatus::default()
            })),
        }
    }

    pub fn record(&self, bot: &NewsBot, outcome: &CycleOutcome) {
        let mut s = self.inner.write().unwrap_or_else(|p| p.into_inner());
        s.cycles += 1;
        s.posted_count = bot.posted().len();
        s.last_posted_at = bot.gate().last_posted_at();
        s.last_outcome = Some(outcome.clone());
        s.last_error = None;
    }

    pub fn record_error(&self, err: &anyhow::Error) {
        let mut s = self.inner.write().unwrap_or_else(|p| p.into_inner());
        s.cycles += 1;
        s.last_error = Some(format!("{err:#}"));
    }

    pub fn snapshot(&self) -> BotStatus {
        self.inner.read().unwrap_or_else(|p| p.into_inner()).clone()
    }
}

#[derive(Clone)]
struct AppState {
    status: SharedStatus,
    metrics: Option<PrometheusHandle>,
}

pub fn router(status: SharedStatus, metrics: Option<PrometheusHandle>) -> Router {
    Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/status", get(get_status))
        .route("/metrics", get(get_metrics))
        .with_state(AppState { status, metrics })
}

async fn get_status(State(state): State<AppState>) -> Json<BotStatus> {
    Json(state.status.snapshot())
}

async fn get_metrics(State(state): State<AppState>) -> String {
    state
        .metrics
        .as_ref()
        .map(|h| h.render())
        .unwrap_or_default()
}

/// Bind and serve in the background; bind errors are logged, not fatal.
pub fn spawn_status_server(addr: String, router: Router) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let listener = match tokio::net::TcpListener::bind(&addr).await {
            Ok(l) => l,
            Err(e) => {
                tracing::warn!(error = ?e, %addr, "status server bind failed");
                return;
            }
        };
        tracing::info!(%addr, "status server listening");
        if let Err(e) = axum::serve(listener, router).await {
            tracing::warn!(error = ?e, "status server stopped");
        }
    })
}
