// Shared by the binary and the integration tests
pub mod api;
pub mod config;
pub mod errors;
pub mod metrics;
pub mod models;
