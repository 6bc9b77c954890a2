//! Influx Reporter - headless metrics exporter
//!
//! Reports an in-process metric registry to InfluxDB on a fixed cadence.
//! Unless `--no-demo` is given, a small synthetic workload keeps a counter,
//! a gauge, a histogram, a meter and a timer moving so the pipeline can be
//! watched end to end.
//!
//! # Usage
//! ```sh
//! INFLUXDB_HOST=http://localhost:8086 cargo run -- --interval 5
//! ```
//!
//! # Environment Variables
//! - `INFLUXDB_HOST`, `INFLUXDB_DATABASE`, `INFLUXDB_USERNAME`, `INFLUXDB_PASSWORD`
//! - `REPORT_INTERVAL_SECS` - Interval in seconds between batches (default: 10)
//! - `REPORT_REQUEST_TIMEOUT_SECS` - Per-write timeout (default: 10)
//!
//! The reporter's own Prometheus counters are logged every
//! `--self-metrics-interval` seconds (default: 60).

use anyhow::{Context, Result};
use clap::Parser;
use influx_reporter::Registry;
use influx_reporter::config::Config;
use influx_reporter::domain::metrics::{Counter, Gauge, GaugeFloat, Histogram, Meter, Timer};
use influx_reporter::infrastructure::observability::{ReporterMetrics, log_self_metrics};
use influx_reporter::run_influxdb;
use rand::Rng;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{Level, info, warn};
use tracing_subscriber::prelude::*;

#[derive(Parser)]
#[command(author, version, about = "Periodic metrics exporter for InfluxDB", long_about = None)]
struct Cli {
    /// Seconds between two batches (overrides REPORT_INTERVAL_SECS)
    #[arg(short, long, value_parser = clap::value_parser!(u64).range(1..))]
    interval: Option<u64>,

    /// Seconds between two self-metrics log lines
    #[arg(long, default_value_t = 60, value_parser = clap::value_parser!(u64).range(1..))]
    self_metrics_interval: u64,

    /// Do not register the synthetic demo metrics
    #[arg(long)]
    no_demo: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let stdout_layer = tracing_subscriber::fmt::layer().with_target(false);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .with(stdout_layer)
        .init();

    info!("Influx Reporter {} starting...", env!("CARGO_PKG_VERSION"));

    let mut config = Config::from_env()?;
    if let Some(secs) = cli.interval {
        config.reporter.interval = Duration::from_secs(secs);
    }
    info!(
        "Configuration loaded: host={}, database={}, interval={:?}",
        config.influx.host, config.influx.database, config.reporter.interval
    );

    let registry = Arc::new(Registry::new());
    let shutdown = CancellationToken::new();

    if !cli.no_demo {
        let workload =
            DemoWorkload::register(&registry).context("Failed to register demo metrics")?;
        tokio::spawn(workload.run(shutdown.clone()));
        info!("Demo workload started");
    }

    let metrics = ReporterMetrics::new().context("Failed to create reporter metrics")?;
    tokio::spawn(log_self_metrics(
        metrics.clone(),
        Duration::from_secs(cli.self_metrics_interval),
        shutdown.clone(),
    ));

    let mut reporter = tokio::spawn(run_influxdb(
        registry,
        config.reporter.interval,
        config.influx,
        metrics,
        shutdown.clone(),
    ));

    tokio::select! {
        result = tokio::signal::ctrl_c() => {
            result?;
            info!("Shutdown signal received. Exiting...");
            shutdown.cancel();
            reporter.await?;
        }
        result = &mut reporter => {
            result?;
            warn!("Reporter exited. Shutting down.");
            shutdown.cancel();
        }
    }

    Ok(())
}

/// Synthetic traffic keeping one metric of each kind moving.
struct DemoWorkload {
    requests: Counter,
    in_flight: Gauge,
    load: GaugeFloat,
    payload_bytes: Histogram,
    hits: Meter,
    latency: Timer,
}

impl DemoWorkload {
    fn register(registry: &Registry) -> Result<Self> {
        Ok(Self {
            requests: registry.counter("demo.requests")?,
            in_flight: registry.gauge("demo.in_flight")?,
            load: registry.gauge_float("demo.load")?,
            payload_bytes: registry.histogram("demo.payload_bytes")?,
            hits: registry.meter("demo.hits")?,
            latency: registry.timer("demo.latency")?,
        })
    }

    fn step(&self) {
        let mut rng = rand::rng();
        let burst = rng.random_range(1..20);
        self.requests.inc(burst);
        self.hits.mark(burst);
        self.in_flight.update(rng.random_range(0..64));
        self.load.update(rng.random::<f64>() * 4.0);
        self.payload_bytes.update(rng.random_range(128..65_536));
        self.latency
            .update(Duration::from_micros(rng.random_range(200..50_000)));
    }

    async fn run(self, shutdown: CancellationToken) {
        let mut ticker = tokio::time::interval(Duration::from_millis(100));
        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = ticker.tick() => self.step(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_interval_parses_seconds() {
        let cli = Cli::try_parse_from(["influx-reporter", "--interval", "5"]).unwrap();
        assert_eq!(cli.interval, Some(5));
        assert_eq!(cli.self_metrics_interval, 60);
        assert!(!cli.no_demo);
    }

    #[test]
    fn test_cli_rejects_zero_and_garbage_interval() {
        assert!(Cli::try_parse_from(["influx-reporter", "--interval", "0"]).is_err());
        assert!(Cli::try_parse_from(["influx-reporter", "--interval", "ten"]).is_err());
        assert!(Cli::try_parse_from(["influx-reporter", "--self-metrics-interval", "0"]).is_err());
    }
}
