//! InfluxDB connection settings parsed from environment variables.

use anyhow::{Context, Result, bail};
use std::env;
use std::time::Duration;

const DEFAULT_HOST: &str = "http://localhost:8086";
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Where and as whom the reporter writes.
#[derive(Debug, Clone, PartialEq)]
pub struct InfluxConfig {
    /// Base URL of the InfluxDB HTTP API.
    pub host: String,
    pub database: String,
    pub username: String,
    pub password: String,
    /// Per-request timeout for batch submissions.
    pub timeout: Duration,
}

impl Default for InfluxConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            database: "metrics".to_string(),
            username: "root".to_string(),
            password: "root".to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl InfluxConfig {
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();
        let timeout = parse_timeout(
            &env::var("REPORT_REQUEST_TIMEOUT_SECS")
                .unwrap_or_else(|_| DEFAULT_TIMEOUT_SECS.to_string()),
        )?;

        Ok(Self {
            host: env::var("INFLUXDB_HOST").unwrap_or(defaults.host),
            database: env::var("INFLUXDB_DATABASE").unwrap_or(defaults.database),
            username: env::var("INFLUXDB_USERNAME").unwrap_or(defaults.username),
            password: env::var("INFLUXDB_PASSWORD").unwrap_or(defaults.password),
            timeout,
        })
    }
}

/// Parse a per-request timeout in whole seconds. Zero would fail every write.
pub fn parse_timeout(raw: &str) -> Result<Duration> {
    let secs = raw
        .trim()
        .parse::<u64>()
        .with_context(|| format!("Failed to parse REPORT_REQUEST_TIMEOUT_SECS: {raw}"))?;
    if secs == 0 {
        bail!("REPORT_REQUEST_TIMEOUT_SECS must be greater than zero");
    }
    Ok(Duration::from_secs(secs))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_influx_config_defaults() {
        let config = InfluxConfig::default();
        assert_eq!(config.host, "http://localhost:8086");
        assert_eq!(config.database, "metrics");
        assert_eq!(config.timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_parse_timeout() {
        assert_eq!(parse_timeout("30").unwrap(), Duration::from_secs(30));
        assert!(parse_timeout("0").is_err());
        assert!(parse_timeout("soon").is_err());
    }
}
