use reqwest::Client;
use std::time::Duration;

pub struct HttpClientFactory;

impl HttpClientFactory {
    /// Creates the HTTP client used to talk to InfluxDB.
    ///
    /// No retry middleware: a failed batch is dropped and the next tick
    /// sends a fresh one.
    pub fn create_client(timeout: Duration) -> Result<Client, reqwest::Error> {
        Client::builder()
            .pool_max_idle_per_host(2)
            .timeout(timeout)
            .connect_timeout(timeout.min(Duration::from_secs(10)))
            // The database endpoint is configured explicitly.
            .no_proxy()
            .user_agent(concat!("influx-reporter/", env!("CARGO_PKG_VERSION")))
            .build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_client() {
        assert!(HttpClientFactory::create_client(Duration::from_secs(5)).is_ok());
    }
}
