use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;
use upgrade_core::{AccessToken, Identity, RepositorySlug};
use url::Url;

use crate::ConfigError;

pub const DEFAULT_PACKAGE: &str = "nx";
pub const DEFAULT_MANIFEST_GLOB: &str = "packages/**/package.json";
pub const DEFAULT_LABEL: &str = "nx-migration";
pub const DEFAULT_MIGRATIONS_FILE: &str = "migrations.json";
pub const DEFAULT_REMOTE: &str = "origin";
pub const DEFAULT_API_URL: &str = "https://api.github.com";
pub const DEFAULT_REGISTRY_URL: &str = "https://registry.npmjs.org";
pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(3600);
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_READ_RETRIES: u32 = 3;

/// Whether the run may mutate anything. Chosen once at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunMode {
    DryRun,
    #[default]
    Apply,
}

impl RunMode {
    #[must_use]
    pub fn from_dry_run(dry_run: bool) -> Self {
        if dry_run { Self::DryRun } else { Self::Apply }
    }

    #[must_use]
    pub fn is_dry_run(self) -> bool {
        self == Self::DryRun
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PackageManager {
    #[default]
    Npm,
    Pnpm,
    Yarn,
}

impl FromStr for PackageManager {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "npm" => Ok(Self::Npm),
            "pnpm" => Ok(Self::Pnpm),
            "yarn" => Ok(Self::Yarn),
            _ => Err(ConfigError::UnknownPackageManager(s.to_string())),
        }
    }
}

impl fmt::Display for PackageManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Npm => "npm",
            Self::Pnpm => "pnpm",
            Self::Yarn => "yarn",
        };
        write!(f, "{s}")
    }
}

/// Everything a pipeline run needs, fixed before the run starts.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub root: PathBuf,
    pub token: AccessToken,
    pub author: Option<Identity>,
    pub committer: Option<Identity>,
    /// `None` resolves to the repository's default branch.
    pub trunk: Option<String>,
    pub remote: String,
    pub repository: Option<RepositorySlug>,
    pub api_url: Url,
    pub registry_url: Url,
    pub package: String,
    /// Dependency names whose specifiers track the target; empty means the
    /// package and its npm scope.
    pub package_patterns: Vec<String>,
    /// Packages added at the target version after the migration tool ran.
    /// Empty by default: `nx migrate` already bumps the `@nx/*` plugins in the
    /// root manifest, so only packages it does not know about belong here.
    pub companions: Vec<String>,
    pub manifest_globs: Vec<String>,
    pub assignees: Vec<String>,
    pub auto_merge: bool,
    pub mode: RunMode,
    pub package_manager: PackageManager,
    pub label: String,
    pub migrations_file: String,
    pub run_e2e: bool,
    pub verify_targets: Vec<String>,
    pub e2e_targets: Vec<String>,
    pub command_timeout: Duration,
    pub http_timeout: Duration,
    pub read_retries: u32,
    pub abandon_on_failure: bool,
}

fn default_url(url: &str) -> Url {
    Url::parse(url).expect("built-in URLs are valid")
}

impl PipelineConfig {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>, token: AccessToken) -> Self {
        Self {
            root: root.into(),
            token,
            author: None,
            committer: None,
            trunk: None,
            remote: DEFAULT_REMOTE.to_string(),
            repository: None,
            api_url: default_url(DEFAULT_API_URL),
            registry_url: default_url(DEFAULT_REGISTRY_URL),
            package: DEFAULT_PACKAGE.to_string(),
            package_patterns: Vec::new(),
            companions: Vec::new(),
            manifest_globs: vec![DEFAULT_MANIFEST_GLOB.to_string()],
            assignees: Vec::new(),
            auto_merge: false,
            mode: RunMode::Apply,
            package_manager: PackageManager::Npm,
            label: DEFAULT_LABEL.to_string(),
            migrations_file: DEFAULT_MIGRATIONS_FILE.to_string(),
            run_e2e: true,
            verify_targets: vec!["lint".to_string(), "test".to_string(), "build".to_string()],
            e2e_targets: vec!["e2e".to_string()],
            command_timeout: DEFAULT_COMMAND_TIMEOUT,
            http_timeout: DEFAULT_HTTP_TIMEOUT,
            read_retries: DEFAULT_READ_RETRIES,
            abandon_on_failure: false,
        }
    }

    #[must_use]
    pub fn with_committer(mut self, committer: Identity) -> Self {
        self.committer = Some(committer);
        self
    }

    #[must_use]
    pub fn with_author(mut self, author: Identity) -> Self {
        self.author = Some(author);
        self
    }

    #[must_use]
    pub fn with_trunk(mut self, trunk: impl Into<String>) -> Self {
        self.trunk = Some(trunk.into());
        self
    }

    #[must_use]
    pub fn with_repository(mut self, repository: RepositorySlug) -> Self {
        self.repository = Some(repository);
        self
    }

    #[must_use]
    pub fn with_mode(mut self, mode: RunMode) -> Self {
        self.mode = mode;
        self
    }

    #[must_use]
    pub fn with_manifest_globs(mut self, globs: Vec<String>) -> Self {
        self.manifest_globs = globs;
        self
    }

    #[must_use]
    pub fn with_assignees(mut self, assignees: Vec<String>) -> Self {
        self.assignees = assignees;
        self
    }

    #[must_use]
    pub fn with_auto_merge(mut self, auto_merge: bool) -> Self {
        self.auto_merge = auto_merge;
        self
    }

    #[must_use]
    pub fn with_companions(mut self, companions: Vec<String>) -> Self {
        self.companions = companions;
        self
    }

    #[must_use]
    pub fn with_e2e(mut self, run_e2e: bool) -> Self {
        self.run_e2e = run_e2e;
        self
    }

    #[must_use]
    pub fn with_abandon_on_failure(mut self, abandon: bool) -> Self {
        self.abandon_on_failure = abandon;
        self
    }

    /// The author recorded on the migration commit; falls back to the committer.
    #[must_use]
    pub fn effective_author(&self) -> Option<&Identity> {
        self.author.as_ref().or(self.committer.as_ref())
    }

    #[must_use]
    pub fn effective_package_patterns(&self) -> Vec<String> {
        if self.package_patterns.is_empty() {
            upgrade_manifest::default_patterns(&self.package)
        } else {
            self.package_patterns.clone()
        }
    }

    /// # Errors
    ///
    /// Returns the first violated requirement. The token is always required;
    /// dry runs need no committer and no repository.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.package.trim().is_empty() {
            return Err(ConfigError::EmptyPackage);
        }
        if self.manifest_globs.is_empty() {
            return Err(ConfigError::NoManifestGlobs);
        }
        if self.token.is_empty() {
            return Err(ConfigError::MissingToken);
        }
        if self.mode.is_dry_run() {
            return Ok(());
        }
        if self.committer.is_none() {
            return Err(ConfigError::MissingCommitter);
        }
        if self.repository.is_none() {
            return Err(ConfigError::MissingRepository {
                remote: self.remote.clone(),
            });
        }
        Ok(())
    }
}

/// Optional TOML file; every key mirrors a command-line flag.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct ConfigFile {
    pub author: Option<String>,
    pub committer: Option<String>,
    pub base_branch: Option<String>,
    pub remote: Option<String>,
    pub repository: Option<String>,
    pub api_url: Option<String>,
    pub registry_url: Option<String>,
    pub package: Option<String>,
    pub package_patterns: Option<Vec<String>>,
    pub companions: Option<Vec<String>>,
    pub manifest_globs: Option<Vec<String>>,
    pub assignees: Option<Vec<String>>,
    pub auto_merge: Option<bool>,
    pub dry_run: Option<bool>,
    pub package_manager: Option<PackageManager>,
    pub label: Option<String>,
    pub migrations_file: Option<String>,
    pub e2e: Option<bool>,
    pub verify_targets: Option<Vec<String>>,
    pub e2e_targets: Option<Vec<String>>,
    pub command_timeout_secs: Option<u64>,
    pub http_timeout_secs: Option<u64>,
    pub read_retries: Option<u32>,
    pub abandon_on_failure: Option<bool>,
}

impl ConfigFile {
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid TOML for this schema.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;

        toml::from_str(&content).map_err(|source| ConfigError::FileParse {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Parses a base URL, naming the setting in the error.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidUrl`] if `value` is not an absolute URL.
pub fn parse_url(field: &'static str, value: &str) -> Result<Url, ConfigError> {
    Url::parse(value).map_err(|source| ConfigError::InvalidUrl {
        field,
        url: value.to_string(),
        source,
    })
}
