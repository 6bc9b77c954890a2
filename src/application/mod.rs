// Metric-to-row schema mapping
pub mod row_builder;

// Periodic push loop
pub mod reporter;

pub use reporter::{Reporter, run_influxdb};
