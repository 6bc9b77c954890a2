// Wall-clock source
pub mod clock;

// Domain-specific error types
pub mod errors;

// Metric types and their snapshots
pub mod metrics;

// Port interfaces
pub mod ports;

// Named metric table
pub mod registry;

// Rows shipped to the database
pub mod row;
