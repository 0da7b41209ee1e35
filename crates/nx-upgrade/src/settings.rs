//! Merges command-line flags, environment and the optional config file into a
//! [`PipelineConfig`].

use std::path::Path;
use std::time::Duration;

use tracing::{debug, warn};
use upgrade_core::{AccessToken, Identity, RepositorySlug};
use upgrade_operations::config::parse_url;
use upgrade_operations::{ConfigError, ConfigFile, PipelineConfig, RunMode};

use crate::commands::RunArgs;

/// Builds the run configuration. Flag values win over file values, which win
/// over built-in defaults.
///
/// `fallback_token` is used when no token flag is given. `remote_url` resolves
/// a remote name to its URL and is consulted only when no repository is set.
pub(crate) fn pipeline_config(
    root: &Path,
    args: RunArgs,
    fallback_token: Option<String>,
    remote_url: impl FnOnce(&str) -> Option<String>,
) -> Result<PipelineConfig, ConfigError> {
    let file = match &args.config {
        Some(path) => ConfigFile::load(&root.join(path))?,
        None => ConfigFile::default(),
    };

    let token = text(args.token)
        .or_else(|| text(fallback_token))
        .unwrap_or_default();
    let mut config = PipelineConfig::new(root, AccessToken::new(token));

    config.committer = text(args.committer)
        .or_else(|| text(file.committer))
        .map(|value| identity("committer", &value))
        .transpose()?;
    config.author = text(args.author)
        .or_else(|| text(file.author))
        .map(|value| identity("author", &value))
        .transpose()?;
    config.trunk = text(args.base_branch).or_else(|| text(file.base_branch));

    if let Some(remote) = text(args.remote).or_else(|| text(file.remote)) {
        config.remote = remote;
    }
    config.repository = match text(args.repository).or_else(|| text(file.repository)) {
        Some(input) => Some(input.parse().map_err(|source| {
            ConfigError::InvalidRepository { input, source }
        })?),
        None => remote_url(&config.remote).and_then(|url| repository_from_remote(&url)),
    };

    if let Some(url) = text(args.api_url).or_else(|| text(file.api_url)) {
        config.api_url = parse_url("api-url", &url)?;
    }
    if let Some(url) = text(args.registry_url).or_else(|| text(file.registry_url)) {
        config.registry_url = parse_url("registry-url", &url)?;
    }
    if let Some(package) = text(args.package).or_else(|| text(file.package)) {
        config.package = package;
    }
    if let Some(patterns) = list(args.package_patterns, file.package_patterns) {
        config.package_patterns = patterns;
    }
    if let Some(companions) = list(args.companions, file.companions) {
        config.companions = companions;
    }
    if let Some(globs) = list(args.manifest_globs, file.manifest_globs) {
        config.manifest_globs = globs;
    }
    if let Some(assignees) = list(args.assignees, file.assignees) {
        config.assignees = assignees;
    }
    config.auto_merge = args.auto_merge.or(file.auto_merge).unwrap_or(false);
    config.mode = RunMode::from_dry_run(args.dry_run.or(file.dry_run).unwrap_or(false));
    if let Some(manager) = args.package_manager.or(file.package_manager) {
        config.package_manager = manager;
    }
    if let Some(label) = text(args.label).or_else(|| text(file.label)) {
        config.label = label;
    }
    if let Some(name) = text(args.migrations_file).or_else(|| text(file.migrations_file)) {
        config.migrations_file = name;
    }
    if let Some(run_e2e) = args.e2e.or(file.e2e) {
        config.run_e2e = run_e2e;
    }
    if let Some(targets) = list(args.verify_targets, file.verify_targets) {
        config.verify_targets = targets;
    }
    if let Some(targets) = list(args.e2e_targets, file.e2e_targets) {
        config.e2e_targets = targets;
    }
    if let Some(secs) = args.command_timeout.or(file.command_timeout_secs) {
        config.command_timeout = Duration::from_secs(secs);
    }
    if let Some(secs) = args.http_timeout.or(file.http_timeout_secs) {
        config.http_timeout = Duration::from_secs(secs);
    }
    if let Some(retries) = args.read_retries.or(file.read_retries) {
        config.read_retries = retries;
    }
    if let Some(abandon) = args.abandon_on_failure.or(file.abandon_on_failure) {
        config.abandon_on_failure = abandon;
    }

    debug!(
        root = %config.root.display(),
        mode = ?config.mode,
        trunk = ?config.trunk,
        package = %config.package,
        "resolved configuration"
    );
    Ok(config)
}

fn identity(role: &'static str, value: &str) -> Result<Identity, ConfigError> {
    value
        .parse()
        .map_err(|source| ConfigError::Identity { role, source })
}

fn repository_from_remote(url: &str) -> Option<RepositorySlug> {
    match RepositorySlug::from_remote_url(url) {
        Ok(slug) => Some(slug),
        Err(err) => {
            warn!(url, error = %err, "cannot derive repository from remote URL");
            None
        }
    }
}

/// Unset and blank values are the same thing in CI environments.
fn text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn list(flag: Vec<String>, file: Option<Vec<String>>) -> Option<Vec<String>> {
    let clean = |values: Vec<String>| -> Vec<String> {
        values
            .into_iter()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .collect()
    };

    let flag = clean(flag);
    if flag.is_empty() {
        file.map(clean)
    } else {
        Some(flag)
    }
}
