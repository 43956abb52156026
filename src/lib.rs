pub mod analytics;
pub mod config;
pub mod constants;
pub mod logging;
pub mod store;
pub mod trend;
