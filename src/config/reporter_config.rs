//! Reporting cadence parsed from environment variables.

use anyhow::{Context, Result, bail};
use std::env;
use std::time::Duration;

/// Reporter environment configuration
#[derive(Debug, Clone, PartialEq)]
pub struct ReporterEnvConfig {
    /// Time between two batches.
    pub interval: Duration,
}

impl Default for ReporterEnvConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(10),
        }
    }
}

impl ReporterEnvConfig {
    pub fn from_env() -> Result<Self> {
        let raw = env::var("REPORT_INTERVAL_SECS").unwrap_or_else(|_| "10".to_string());
        Ok(Self {
            interval: parse_interval(&raw)?,
        })
    }
}

/// Parse a reporting interval in whole seconds. Zero is rejected.
pub fn parse_interval(raw: &str) -> Result<Duration> {
    let secs = raw
        .trim()
        .parse::<u64>()
        .with_context(|| format!("Invalid REPORT_INTERVAL_SECS: {raw}"))?;
    if secs == 0 {
        bail!("REPORT_INTERVAL_SECS must be greater than zero");
    }
    Ok(Duration::from_secs(secs))
}
