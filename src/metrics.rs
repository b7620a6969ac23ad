// src/metrics.rs
use anyhow::{Context, Result};
use metrics::{describe_counter, gauge};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

pub struct Metrics {
    pub handle: PrometheusHandle,
}

impl Metrics {
    /// Install the Prometheus recorder and describe the cycle-level series.
    pub fn init() -> Result<Self> {
        // Use default buckets to avoid API differences across crate versions.
        let handle = PrometheusBuilder::new()
            .install_recorder()
            .context("prometheus: install recorder")?;

        describe_counter!("newsbot_cycles_total", "Posting cycles by outcome.");
        describe_counter!("newsbot_posts_total", "Successful publishes.");
        describe_counter!("newsbot_publish_failures_total", "Failed publish attempts.");
        describe_counter!(
            "newsbot_filtered_out_total",
            "Stories dropped by the keyword/freshness filter."
        );
        describe_counter!(
            "newsbot_persist_errors_total",
            "Posted-set writes that failed."
        );
        gauge!("newsbot_started_ts").set(chrono::Utc::now().timestamp() as f64);

        Ok(Self { handle })
    }
}
