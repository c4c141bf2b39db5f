mod app;
mod config;
mod distributed;
mod http;
mod metrics;
mod validation;

#[cfg(test)]
mod test_support;

pub use app::{AppError, AppResult};
pub use config::ConfigError;
pub use distributed::DistributedError;
pub use http::HttpError;
pub use metrics::MetricsError;
pub use validation::ValidationError;
