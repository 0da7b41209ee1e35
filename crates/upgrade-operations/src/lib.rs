pub mod config;
mod error;
pub mod operations;
pub mod providers;
mod retry;
pub mod traits;

#[cfg(test)]
pub mod mocks;

pub use config::{ConfigFile, PackageManager, PipelineConfig, RunMode};
pub use error::{ConfigError, OperationError, Result};
pub use retry::RetryPolicy;
