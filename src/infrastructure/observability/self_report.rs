//! Periodic push of the reporter's own metrics to the log.
//!
//! The process accepts no incoming connections, so the Prometheus registry
//! is never scraped. Instead a summary line goes out at `info!` on every
//! tick and the full text exposition at `debug!`.

use crate::infrastructure::observability::ReporterMetrics;
use std::time::Duration;
use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Log `metrics` every `interval` until `shutdown` is cancelled.
pub async fn log_self_metrics(
    metrics: ReporterMetrics,
    interval: Duration,
    shutdown: CancellationToken,
) {
    if interval.is_zero() {
        return;
    }
    let mut ticker = time::interval_at(Instant::now() + interval, interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            biased;
            _ = shutdown.cancelled() => break,
            _ = ticker.tick() => {
                info!("{}", summary(&metrics));
                debug!("Self metrics:\n{}", metrics.render());
            }
        }
    }
}

fn summary(metrics: &ReporterMetrics) -> String {
    format!(
        "Self metrics: ticks={} | rows={} | failures={} | last_batch={} | submits={}",
        metrics.ticks_total.get(),
        metrics.rows_submitted_total.get(),
        metrics.submit_failures_total.get(),
        metrics.last_batch_rows.get(),
        metrics.submit_latency_seconds.get_sample_count()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_reflects_counters() {
        let metrics = ReporterMetrics::new().expect("Failed to create metrics");
        metrics.ticks_total.inc_by(3);
        metrics.rows_submitted_total.inc_by(12);
        metrics.submit_failures_total.inc();
        metrics.last_batch_rows.set(4);

        assert_eq!(
            summary(&metrics),
            "Self metrics: ticks=3 | rows=12 | failures=1 | last_batch=4 | submits=0"
        );
    }

    #[tokio::test]
    async fn test_stops_on_cancel() {
        let shutdown = CancellationToken::new();
        let handle = tokio::spawn(log_self_metrics(
            ReporterMetrics::default(),
            Duration::from_millis(10),
            shutdown.clone(),
        ));

        tokio::time::sleep(Duration::from_millis(35)).await;
        shutdown.cancel();
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("self metrics logger did not stop")
            .unwrap();
    }
}
