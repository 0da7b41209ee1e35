use std::path::PathBuf;

use thiserror::Error;
use upgrade_operations::{ConfigError, OperationError};

#[derive(Debug, Error)]
pub enum CliError {
    #[error("failed to determine current directory")]
    CurrentDir(#[source] std::io::Error),

    #[error("configuration error")]
    Config(#[from] ConfigError),

    #[error("operation failed")]
    Operation(#[from] OperationError),

    #[error("migration pipeline failed")]
    Pipeline(#[source] OperationError),

    #[error("failed to write outputs to '{path}'")]
    Outputs {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, CliError>;
