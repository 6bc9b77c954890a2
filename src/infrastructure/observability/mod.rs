//! Self-observability for the reporter.
//!
//! The reporter pushes rows outbound only; its own health is tracked in an
//! in-process Prometheus registry that is pushed to the log periodically.

pub mod metrics;
pub mod self_report;

pub use metrics::ReporterMetrics;
pub use self_report::log_self_metrics;
