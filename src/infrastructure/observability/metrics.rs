//! Prometheus metrics describing the reporter itself.
//!
//! All metrics use the `influx_reporter_` prefix.

use prometheus::{Histogram, HistogramOpts, IntCounter, IntGauge, Opts, Registry, TextEncoder};
use std::sync::Arc;

/// Self-instrumentation for the reporter loop
#[derive(Clone)]
pub struct ReporterMetrics {
    registry: Arc<Registry>,
    /// Ticks fired by the reporter timer
    pub ticks_total: IntCounter,
    /// Rows accepted by the database
    pub rows_submitted_total: IntCounter,
    /// Batches the database or the network rejected
    pub submit_failures_total: IntCounter,
    /// Rows in the most recently built batch
    pub last_batch_rows: IntGauge,
    /// Batch submission latency in seconds
    pub submit_latency_seconds: Histogram,
}

impl ReporterMetrics {
    /// Create a new instance with every metric registered
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let ticks_total = IntCounter::with_opts(Opts::new(
            "influx_reporter_ticks_total",
            "Reporter ticks fired",
        ))?;
        registry.register(Box::new(ticks_total.clone()))?;

        let rows_submitted_total = IntCounter::with_opts(Opts::new(
            "influx_reporter_rows_submitted_total",
            "Rows written to InfluxDB",
        ))?;
        registry.register(Box::new(rows_submitted_total.clone()))?;

        let submit_failures_total = IntCounter::with_opts(Opts::new(
            "influx_reporter_submit_failures_total",
            "Batches dropped after a failed write",
        ))?;
        registry.register(Box::new(submit_failures_total.clone()))?;

        let last_batch_rows = IntGauge::with_opts(Opts::new(
            "influx_reporter_last_batch_rows",
            "Rows in the last batch built",
        ))?;
        registry.register(Box::new(last_batch_rows.clone()))?;

        let submit_latency_seconds = Histogram::with_opts(
            HistogramOpts::new(
                "influx_reporter_submit_latency_seconds",
                "Batch submission latency in seconds",
            )
            .buckets(vec![0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]),
        )?;
        registry.register(Box::new(submit_latency_seconds.clone()))?;

        Ok(Self {
            registry: Arc::new(registry),
            ticks_total,
            rows_submitted_total,
            submit_failures_total,
            last_batch_rows,
            submit_latency_seconds,
        })
    }

    /// Render all metrics in Prometheus text format
    pub fn render(&self) -> String {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        encoder
            .encode_to_string(&metric_families)
            .unwrap_or_default()
    }
}

impl Default for ReporterMetrics {
    fn default() -> Self {
        Self::new().expect("Failed to create default ReporterMetrics")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_creation() {
        let metrics = ReporterMetrics::new().expect("Failed to create metrics");
        assert!(metrics.render().contains("influx_reporter_"));
    }

    #[test]
    fn test_counters_render() {
        let metrics = ReporterMetrics::new().expect("Failed to create metrics");
        metrics.ticks_total.inc();
        metrics.rows_submitted_total.inc_by(12);
        let output = metrics.render();
        assert!(output.contains("influx_reporter_ticks_total 1"));
        assert!(output.contains("influx_reporter_rows_submitted_total 12"));
    }

    #[test]
    fn test_submit_timer_observes_on_drop() {
        let metrics = ReporterMetrics::new().expect("Failed to create metrics");
        {
            let _timer = metrics.submit_latency_seconds.start_timer();
            std::thread::sleep(std::time::Duration::from_millis(10));
        }
        assert_eq!(metrics.submit_latency_seconds.get_sample_count(), 1);
        assert!(metrics.submit_latency_seconds.get_sample_sum() >= 0.01);
    }
}
