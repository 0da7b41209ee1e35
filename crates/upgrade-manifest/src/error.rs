use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("failed to read manifest at '{path}'")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write manifest at '{path}'")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid package name pattern '{pattern}'")]
    PackagePattern {
        pattern: String,
        #[source]
        source: globset::Error,
    },

    #[error("failed to expand manifest glob '{pattern}'")]
    GlobPattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    #[error("glob iteration error")]
    GlobIteration(#[from] glob::GlobError),
}
