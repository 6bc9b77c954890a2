pub mod client;

pub use client::InfluxClient;
