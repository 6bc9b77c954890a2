pub mod http_client_factory;
pub mod influxdb;
pub mod observability;

pub use http_client_factory::HttpClientFactory;
pub use influxdb::InfluxClient;
pub use observability::ReporterMetrics;
