use thiserror::Error;

/// Fatal errors raised while building the remote client. The reporter never starts.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("Invalid InfluxDB host {host:?}: {source}")]
    InvalidHost {
        host: String,
        #[source]
        source: url::ParseError,
    },

    #[error("Unsupported URL scheme {scheme:?}: expected http or https")]
    UnsupportedScheme { scheme: String },

    #[error("InfluxDB database name is empty")]
    MissingDatabase,

    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

/// Per-tick submission failure. Logged and dropped by the reporter loop.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Built with the request URL stripped, see `reqwest::Error::without_url`.
    #[error("Request failed: {0}")]
    Request(#[source] reqwest::Error),

    #[error("InfluxDB rejected batch with status {status}: {body}")]
    Status { status: u16, body: String },
}

/// Errors raised by the metric registry.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Metric already registered: {name}")]
    Duplicate { name: String },

    #[error("Metric {name} is a {found}, not a {expected}")]
    KindMismatch {
        name: String,
        expected: &'static str,
        found: &'static str,
    },
}
