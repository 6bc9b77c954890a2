pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use application::{Reporter, run_influxdb};
pub use domain::registry::Registry;
