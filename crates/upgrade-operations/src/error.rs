use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("an access token is required")]
    MissingToken,

    #[error("a committer identity is required unless running in dry-run mode")]
    MissingCommitter,

    #[error("invalid {role} identity")]
    Identity {
        role: &'static str,
        #[source]
        source: upgrade_core::IdentityError,
    },

    #[error("repository is unknown; pass it explicitly or configure the '{remote}' remote")]
    MissingRepository { remote: String },

    #[error("invalid repository '{input}'")]
    InvalidRepository {
        input: String,
        #[source]
        source: upgrade_core::CoreError,
    },

    #[error("at least one manifest glob is required")]
    NoManifestGlobs,

    #[error("target package name cannot be empty")]
    EmptyPackage,

    #[error("invalid URL '{url}' for {field}")]
    InvalidUrl {
        field: &'static str,
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("unknown package manager '{0}' (expected npm, pnpm or yarn)")]
    UnknownPackageManager(String),

    #[error("failed to read config file '{path}'")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}'")]
    FileParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Error)]
pub enum OperationError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Core(#[from] upgrade_core::CoreError),

    #[error(transparent)]
    Git(#[from] upgrade_git::GitError),

    #[error(transparent)]
    Manifest(#[from] upgrade_manifest::ManifestError),

    #[error("failed to build HTTP client")]
    HttpClient(#[source] reqwest::Error),

    #[error("request to '{url}' failed")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("'{url}' responded with status {status}: {body}")]
    HttpStatus { url: String, status: u16, body: String },

    #[error("unexpected response body from '{url}'")]
    MalformedResponse {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("GraphQL request failed: {message}")]
    GraphQl { message: String },

    #[error("package '{package}' is not installed (looked for '{path}')")]
    PackageNotInstalled {
        package: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("installed package manifest '{path}' is malformed")]
    InstalledManifest {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to start '{command}'")]
    CommandSpawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("'{command}' failed with {status}")]
    CommandFailed { command: String, status: String },

    #[error("'{command}' did not finish within {timeout_secs}s")]
    CommandTimeout { command: String, timeout_secs: u64 },

    #[error("failed to remove '{path}'")]
    RemoveFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl OperationError {
    /// Whether repeating the same idempotent read might succeed.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Http { source, .. } => source.is_timeout() || source.is_connect(),
            Self::HttpStatus { status, .. } => *status == 429 || (500..600).contains(status),
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, OperationError>;
