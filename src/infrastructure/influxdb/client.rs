//! Writer for the InfluxDB 0.8 series API.

use crate::config::InfluxConfig;
use crate::domain::errors::{StartupError, TransportError};
use crate::domain::ports::SeriesWriter;
use crate::domain::row::{Row, Value};
use crate::infrastructure::http_client_factory::HttpClientFactory;
use async_trait::async_trait;
use serde::Serialize;
use tracing::debug;
use url::Url;

/// One series in the write payload.
#[derive(Serialize)]
struct Series<'a> {
    name: &'a str,
    columns: &'a [String],
    points: &'a [Vec<Value>],
}

impl<'a> From<&'a Row> for Series<'a> {
    fn from(row: &'a Row) -> Self {
        Self {
            name: &row.name,
            columns: &row.columns,
            points: &row.values,
        }
    }
}

/// HTTP client posting batches to `{host}/db/{database}/series`.
///
/// Credentials travel in the query string, so the endpoint is never exposed
/// and request errors are stripped of it.
pub struct InfluxClient {
    http: reqwest::Client,
    series_url: Url,
}

impl InfluxClient {
    pub fn new(config: &InfluxConfig) -> Result<Self, StartupError> {
        let series_url = series_url(config)?;
        let http = HttpClientFactory::create_client(config.timeout).map_err(StartupError::Client)?;
        Ok(Self { http, series_url })
    }
}

fn series_url(config: &InfluxConfig) -> Result<Url, StartupError> {
    let mut url = Url::parse(&config.host).map_err(|source| StartupError::InvalidHost {
        host: config.host.clone(),
        source,
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(StartupError::UnsupportedScheme {
            scheme: url.scheme().to_string(),
        });
    }
    if config.database.is_empty() {
        return Err(StartupError::MissingDatabase);
    }

    let scheme = url.scheme().to_string();
    url.path_segments_mut()
        .map_err(|()| StartupError::UnsupportedScheme { scheme })?
        .pop_if_empty()
        .extend(["db", config.database.as_str(), "series"]);
    url.query_pairs_mut()
        .clear()
        .append_pair("u", &config.username)
        .append_pair("p", &config.password)
        .append_pair("time_precision", "ms");
    Ok(url)
}

#[async_trait]
impl SeriesWriter for InfluxClient {
    async fn write_series(&self, rows: &[Row]) -> Result<(), TransportError> {
        let payload: Vec<Series<'_>> = rows.iter().map(Series::from).collect();
        let response = self
            .http
            .post(self.series_url.clone())
            .json(&payload)
            .send()
            .await
            // The URL carries the password in its query string.
            .map_err(|e| TransportError::Request(e.without_url()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TransportError::Status {
                status: status.as_u16(),
                body,
            });
        }
        debug!("InfluxClient: wrote {} series", rows.len());
        Ok(())
    }
}
