//! Push-based reporter shipping registry snapshots to InfluxDB.
//!
//! On every tick the reporter walks the registry, turns each metric into a
//! row and submits the whole batch in one write. A failed write is logged and
//! the batch dropped; the next tick starts from a fresh snapshot.

use crate::application::row_builder::build_row;
use crate::config::InfluxConfig;
use crate::domain::clock::{Clock, SystemClock};
use crate::domain::errors::TransportError;
use crate::domain::ports::SeriesWriter;
use crate::domain::registry::Registry;
use crate::domain::row::Batch;
use crate::infrastructure::influxdb::InfluxClient;
use crate::infrastructure::observability::ReporterMetrics;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Periodic registry-to-database pump.
pub struct Reporter<W, C = SystemClock> {
    registry: Arc<Registry>,
    writer: W,
    clock: C,
    interval: Duration,
    metrics: ReporterMetrics,
}

impl<W: SeriesWriter, C: Clock> Reporter<W, C> {
    /// Create a new reporter
    ///
    /// # Arguments
    /// * `registry` - Shared metric registry; must outlive the reporter task
    /// * `writer` - Remote sink, owned exclusively by the reporter
    /// * `clock` - Source of row timestamps
    /// * `interval` - Time between two batches
    pub fn new(registry: Arc<Registry>, writer: W, clock: C, interval: Duration) -> Self {
        Self {
            registry,
            writer,
            clock,
            interval,
            metrics: ReporterMetrics::default(),
        }
    }

    /// Replace the self-instrumentation, e.g. to share it with the host process.
    pub fn with_metrics(mut self, metrics: ReporterMetrics) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn metrics(&self) -> &ReporterMetrics {
        &self.metrics
    }

    /// Build one row per recognised metric currently registered.
    pub fn collect_batch(&self) -> Batch {
        let mut batch = Batch::new();
        self.registry.each(|name, metric| {
            if let Some(row) = build_row(name, metric, self.clock.now_millis()) {
                batch.push(row);
            }
        });
        self.metrics.last_batch_rows.set(batch.len() as i64);
        batch
    }

    /// Collect and submit a single batch, returning the number of rows written.
    ///
    /// An empty batch is still submitted.
    pub async fn report_once(&self) -> Result<usize, TransportError> {
        let batch = self.collect_batch();
        let _timer = self.metrics.submit_latency_seconds.start_timer();
        self.writer.write_series(&batch).await?;
        self.metrics.rows_submitted_total.inc_by(batch.len() as u64);
        Ok(batch.len())
    }

    /// Run until `shutdown` is cancelled.
    ///
    /// The first batch goes out one full interval after start. Ticks missed
    /// during a slow submission are skipped, not replayed. Cancellation
    /// abandons an in-flight submission.
    pub async fn run(self, shutdown: CancellationToken) {
        if self.interval.is_zero() {
            error!("Reporter: refusing to start with a zero interval");
            return;
        }
        info!("Reporter: Starting (interval: {:?})", self.interval);

        let mut ticker = time::interval_at(Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                biased;

                _ = shutdown.cancelled() => break,

                _ = ticker.tick() => {
                    self.metrics.ticks_total.inc();
                    tokio::select! {
                        biased;
                        _ = shutdown.cancelled() => break,
                        result = self.report_once() => self.record(result),
                    }
                }
            }
        }

        info!("Reporter: Stopped");
    }

    fn record(&self, result: Result<usize, TransportError>) {
        match result {
            Ok(rows) => debug!("Reporter: Submitted {} rows", rows),
            Err(e) => {
                self.metrics.submit_failures_total.inc();
                warn!("Reporter: Failed to write batch, dropping it: {}", e);
            }
        }
    }
}

/// Report `registry` to InfluxDB every `interval` until `shutdown` is cancelled.
///
/// `metrics` receives the reporter's self-instrumentation; pass a clone of an
/// instance the caller keeps to read it back.
///
/// If the client cannot be built (for instance the host URL does not parse)
/// the error is logged and the function returns without ever ticking.
pub async fn run_influxdb(
    registry: Arc<Registry>,
    interval: Duration,
    config: InfluxConfig,
    metrics: ReporterMetrics,
    shutdown: CancellationToken,
) {
    let client = match InfluxClient::new(&config) {
        Ok(client) => client,
        Err(e) => {
            error!("Reporter: Failed to create InfluxDB client: {}", e);
            return;
        }
    };
    info!(
        "Reporter: Writing to {} (database: {})",
        config.host, config.database
    );
    Reporter::new(registry, client, SystemClock, interval)
        .with_metrics(metrics)
        .run(shutdown)
        .await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::clock::FixedClock;
    use crate::domain::metrics::Metric;
    use crate::domain::row::{Row, Value};
    use async_trait::async_trait;
    use std::sync::Mutex;

    const NOW: i64 = 1_700_000_000_000;

    #[derive(Default)]
    struct RecordingWriter {
        batches: Mutex<Vec<Vec<Row>>>,
    }

    #[async_trait]
    impl SeriesWriter for RecordingWriter {
        async fn write_series(&self, rows: &[Row]) -> Result<(), TransportError> {
            self.batches.lock().unwrap().push(rows.to_vec());
            Ok(())
        }
    }

    fn reporter(
        registry: Arc<Registry>,
    ) -> (Reporter<Arc<RecordingWriter>, FixedClock>, Arc<RecordingWriter>) {
        let writer = Arc::new(RecordingWriter::default());
        let reporter = Reporter::new(
            registry,
            writer.clone(),
            FixedClock::new(NOW),
            Duration::from_secs(10),
        );
        (reporter, writer)
    }

    #[test]
    fn test_collect_batch_one_row_per_recognised_metric() {
        let registry = Arc::new(Registry::new());
        registry.counter("a").unwrap().inc(1);
        registry.gauge("b").unwrap().update(2);
        registry.meter("c").unwrap().mark(3);
        registry.register("d", Metric::Other(Arc::new(()))).unwrap();

        let (reporter, _) = reporter(registry);
        let batch = reporter.collect_batch();

        let names: Vec<&str> = batch.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["a.count", "b.value", "c.meter"]);
        assert_eq!(reporter.metrics().last_batch_rows.get(), 3);
    }

    #[tokio::test]
    async fn test_report_once_submits_batch() {
        let registry = Arc::new(Registry::new());
        registry.counter("requests").unwrap().inc(42);

        let (reporter, writer) = reporter(registry);
        let rows = reporter.report_once().await.unwrap();

        assert_eq!(rows, 1);
        let batches = writer.batches.lock().unwrap();
        assert_eq!(
            batches[0][0].values,
            vec![vec![Value::Int(NOW), Value::Int(42)]]
        );
        assert_eq!(reporter.metrics().rows_submitted_total.get(), 1);
    }

    #[tokio::test]
    async fn test_empty_registry_still_submits() {
        let (reporter, writer) = reporter(Arc::new(Registry::new()));
        assert_eq!(reporter.report_once().await.unwrap(), 0);
        assert_eq!(writer.batches.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_zero_interval_never_ticks() {
        let writer = Arc::new(RecordingWriter::default());
        let reporter = Reporter::new(
            Arc::new(Registry::new()),
            writer.clone(),
            FixedClock::new(NOW),
            Duration::ZERO,
        );
        reporter.run(CancellationToken::new()).await;
        assert!(writer.batches.lock().unwrap().is_empty());
    }
}
