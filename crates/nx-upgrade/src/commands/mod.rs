mod check;
mod run;

use std::path::{Path, PathBuf};

use clap::builder::BoolishValueParser;
use clap::{Args, Subcommand};
use upgrade_operations::PackageManager;
use upgrade_operations::config::{
    DEFAULT_HTTP_TIMEOUT, DEFAULT_PACKAGE, DEFAULT_READ_RETRIES, DEFAULT_REGISTRY_URL,
};

use crate::error::Result;

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Migrate to the latest release and open or refresh the pull request
    Run(RunArgs),
    /// Print the installed and latest version without changing anything
    Check(CheckArgs),
}

impl Commands {
    pub(crate) fn execute(self, root: &Path) -> Result<()> {
        match self {
            Self::Run(args) => run::run(args, root),
            Self::Check(args) => check::run(&args, root),
        }
    }
}

/// Every flag can also be set through the environment of a GitHub Actions step
/// or through the `--config` file. Flags and environment win over the file.
#[derive(Args, Debug, Default)]
pub(crate) struct RunArgs {
    /// Token for the GitHub API and for pushing (falls back to GITHUB_TOKEN)
    #[arg(long, env = "INPUT_GITHUB_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// TOML file with defaults for any of these flags
    #[arg(long, env = "INPUT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Commit author as `Name <email>` (defaults to the committer)
    #[arg(long, env = "INPUT_AUTHOR")]
    pub author: Option<String>,

    /// Commit committer as `Name <email>`
    #[arg(long, env = "INPUT_COMMITTER")]
    pub committer: Option<String>,

    /// Branch to migrate from and target with the pull request
    #[arg(long, env = "INPUT_BASE_BRANCH")]
    pub base_branch: Option<String>,

    /// Git remote to fetch from and push to
    #[arg(long, env = "INPUT_REMOTE")]
    pub remote: Option<String>,

    /// Repository as `owner/name` (derived from the remote URL if omitted)
    #[arg(long, env = "GITHUB_REPOSITORY")]
    pub repository: Option<String>,

    #[arg(long, env = "GITHUB_API_URL")]
    pub api_url: Option<String>,

    #[arg(long, env = "INPUT_REGISTRY_URL")]
    pub registry_url: Option<String>,

    /// Package to migrate
    #[arg(long, env = "INPUT_PACKAGE")]
    pub package: Option<String>,

    /// Dependency name patterns whose specifiers follow the package
    #[arg(long = "package-pattern", env = "INPUT_PACKAGE_PATTERNS", value_delimiter = ',')]
    pub package_patterns: Vec<String>,

    /// Additional packages installed at the target version
    #[arg(long = "companion", env = "INPUT_COMPANIONS", value_delimiter = ',')]
    pub companions: Vec<String>,

    /// Globs selecting the package manifests to rewrite
    #[arg(long = "manifest-glob", env = "INPUT_MANIFEST_GLOBS", value_delimiter = ',')]
    pub manifest_globs: Vec<String>,

    /// Comma-separated pull request assignees
    #[arg(long, env = "INPUT_ASSIGNEES", value_delimiter = ',')]
    pub assignees: Vec<String>,

    /// Enable auto-merge for non-major updates
    #[arg(long, env = "INPUT_AUTO_MERGE", num_args = 0..=1, default_missing_value = "true",
          value_parser = BoolishValueParser::new())]
    pub auto_merge: Option<bool>,

    /// Report what would happen without touching git or GitHub
    #[arg(long, env = "INPUT_DRY_RUN", num_args = 0..=1, default_missing_value = "true",
          value_parser = BoolishValueParser::new())]
    pub dry_run: Option<bool>,

    #[arg(long, env = "INPUT_PACKAGE_MANAGER")]
    pub package_manager: Option<PackageManager>,

    /// Label marking migration pull requests
    #[arg(long, env = "INPUT_LABEL")]
    pub label: Option<String>,

    #[arg(long, env = "INPUT_MIGRATIONS_FILE")]
    pub migrations_file: Option<String>,

    /// Run the end-to-end suite after lint, test and build pass
    #[arg(long, env = "INPUT_E2E", num_args = 0..=1, default_missing_value = "true",
          value_parser = BoolishValueParser::new())]
    pub e2e: Option<bool>,

    #[arg(long = "verify-target", env = "INPUT_VERIFY_TARGETS", value_delimiter = ',')]
    pub verify_targets: Vec<String>,

    #[arg(long = "e2e-target", env = "INPUT_E2E_TARGETS", value_delimiter = ',')]
    pub e2e_targets: Vec<String>,

    /// Seconds before a toolchain command is killed
    #[arg(long, env = "INPUT_COMMAND_TIMEOUT")]
    pub command_timeout: Option<u64>,

    /// Seconds before an HTTP request is abandoned
    #[arg(long, env = "INPUT_HTTP_TIMEOUT")]
    pub http_timeout: Option<u64>,

    /// Attempts for idempotent reads against npm and GitHub
    #[arg(long, env = "INPUT_READ_RETRIES")]
    pub read_retries: Option<u32>,

    /// Delete the feature branch when the run fails after creating it
    #[arg(long, env = "INPUT_ABANDON_ON_FAILURE", num_args = 0..=1,
          default_missing_value = "true", value_parser = BoolishValueParser::new())]
    pub abandon_on_failure: Option<bool>,
}

#[derive(Args, Debug)]
pub(crate) struct CheckArgs {
    /// Package to check
    #[arg(long, env = "INPUT_PACKAGE", default_value = DEFAULT_PACKAGE)]
    pub package: String,

    #[arg(long, env = "INPUT_REGISTRY_URL", default_value = DEFAULT_REGISTRY_URL)]
    pub registry_url: String,

    /// Seconds before an HTTP request is abandoned
    #[arg(long, env = "INPUT_HTTP_TIMEOUT", default_value_t = DEFAULT_HTTP_TIMEOUT.as_secs())]
    pub http_timeout: u64,

    #[arg(long, env = "INPUT_READ_RETRIES", default_value_t = DEFAULT_READ_RETRIES)]
    pub read_retries: u32,
}
