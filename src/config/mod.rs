//! Configuration module.
//!
//! Structured configuration loading from environment variables, split into
//! the InfluxDB connection and the reporting cadence.

mod influx_config;
mod reporter_config;

pub use influx_config::{InfluxConfig, parse_timeout};
pub use reporter_config::{ReporterEnvConfig, parse_interval};

use anyhow::{Context, Result};

/// Main application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub influx: InfluxConfig,
    pub reporter: ReporterEnvConfig,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        let influx = InfluxConfig::from_env().context("Failed to load InfluxDB config")?;
        let reporter = ReporterEnvConfig::from_env().context("Failed to load reporter config")?;
        Ok(Self { influx, reporter })
    }
}
