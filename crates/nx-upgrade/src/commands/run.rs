use std::path::Path;

use tracing::info;
use upgrade_core::RepositorySlug;
use upgrade_operations::RetryPolicy;
use upgrade_operations::operations::Pipeline;
use upgrade_operations::providers::{
    FileSystemManifestRewriter, Git2Provider, GitHubClient, NpmRegistry, ProcessToolchain,
};
use upgrade_operations::traits::GitProvider;

use super::RunArgs;
use crate::error::{CliError, Result};
use crate::output;
use crate::settings;

pub(crate) fn run(args: RunArgs, root: &Path) -> Result<()> {
    let fallback_token = std::env::var("GITHUB_TOKEN").ok();
    let config = settings::pipeline_config(root, args, fallback_token, |remote| {
        Git2Provider::new().remote_url(root, remote).ok().flatten()
    })?;
    config.validate()?;

    // Only dry runs get this far without a repository, and they never reach the host.
    let repository = config.repository.clone().unwrap_or_else(|| RepositorySlug {
        owner: String::new(),
        name: String::new(),
    });
    let retry = RetryPolicy::new(config.read_retries);

    let registry = NpmRegistry::new(config.registry_url.clone(), config.http_timeout, retry)?;
    let git = Git2Provider::with_token(&config.token);
    let host = GitHubClient::new(
        &config.api_url,
        repository,
        config.token.clone(),
        config.http_timeout,
        retry,
    )?;
    let toolchain = ProcessToolchain::new(config.package_manager, config.command_timeout)
        .with_targets(config.verify_targets.clone(), config.e2e_targets.clone());
    let manifests = FileSystemManifestRewriter::new();

    let mut pipeline = Pipeline::new(&config, &registry, &git, &host, &toolchain, &manifests);
    let outputs = pipeline.execute_reporting();
    info!(state = %pipeline.state(), migrated = outputs.is_migrated, "run finished");

    output::publish(&outputs)?;

    match pipeline.take_failure() {
        Some(err) => Err(CliError::Pipeline(err)),
        None => Ok(()),
    }
}
