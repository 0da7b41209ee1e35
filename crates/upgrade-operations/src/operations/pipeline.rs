use std::error::Error as _;
use std::fmt;

use tracing::{error, info, warn};
use upgrade_core::{GateReport, PipelineOutputs, VersionInfo, feature_branch_name, migration_title};
use upgrade_git::CommitInfo;
use upgrade_manifest::{ManifestRewrite, PackageMatcher};

use super::gate::VerificationGate;
use super::migration::{MigrationInput, MigrationOperation};
use super::oracle::OracleOperation;
use super::pull_request::{PublishRequest, PullRequestManager};
use crate::config::PipelineConfig;
use crate::error::{ConfigError, OperationError};
use crate::traits::{CodeHost, GitProvider, ManifestRewriter, PackageRegistry, Toolchain};
use crate::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Checking,
    UpToDate,
    Migrating,
    Unchanged,
    Verifying,
    Publishing,
    Published,
    Failed,
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Checking => "checking",
            Self::UpToDate => "up-to-date",
            Self::Migrating => "migrating",
            Self::Unchanged => "unchanged",
            Self::Verifying => "verifying",
            Self::Publishing => "publishing",
            Self::Published => "published",
            Self::Failed => "failed",
        };
        f.write_str(s)
    }
}

#[derive(Debug)]
pub enum PipelineOutcome {
    UpToDate(VersionInfo),
    DryRun {
        versions: VersionInfo,
        branch: String,
        planned_rewrites: Vec<ManifestRewrite>,
    },
    /// The remote branch already carries an identical change set.
    Unchanged {
        versions: VersionInfo,
        branch: String,
        pull_request: Option<u64>,
    },
    Published {
        versions: VersionInfo,
        branch: String,
        commit: CommitInfo,
        gate: GateReport,
        pull_request: u64,
    },
}

impl PipelineOutcome {
    #[must_use]
    pub fn versions(&self) -> &VersionInfo {
        match self {
            Self::UpToDate(versions)
            | Self::DryRun { versions, .. }
            | Self::Unchanged { versions, .. }
            | Self::Published { versions, .. } => versions,
        }
    }

    #[must_use]
    pub fn outputs(&self) -> PipelineOutputs {
        let outputs = PipelineOutputs::from_versions(self.versions());
        match self {
            Self::UpToDate(_) | Self::DryRun { .. } => outputs,
            Self::Unchanged { pull_request, .. } => outputs.with_pull_request(*pull_request),
            Self::Published { pull_request, .. } => outputs.with_pull_request(Some(*pull_request)),
        }
    }
}

#[derive(Default)]
struct BranchProgress {
    created: bool,
    pushed: bool,
}

/// Sequences one migration run: oracle, branch, migration, idempotency check,
/// commit and push, verification, publication.
pub struct Pipeline<'a, R, G, H, T, M> {
    config: &'a PipelineConfig,
    registry: &'a R,
    git: &'a G,
    host: &'a H,
    toolchain: &'a T,
    manifests: &'a M,
    state: PipelineState,
    failure: Option<OperationError>,
}

impl<'a, R, G, H, T, M> Pipeline<'a, R, G, H, T, M>
where
    R: PackageRegistry,
    G: GitProvider,
    H: CodeHost,
    T: Toolchain,
    M: ManifestRewriter,
{
    pub fn new(
        config: &'a PipelineConfig,
        registry: &'a R,
        git: &'a G,
        host: &'a H,
        toolchain: &'a T,
        manifests: &'a M,
    ) -> Self {
        Self {
            config,
            registry,
            git,
            host,
            toolchain,
            manifests,
            state: PipelineState::Checking,
            failure: None,
        }
    }

    #[must_use]
    pub fn state(&self) -> PipelineState {
        self.state
    }

    /// Error recorded by the last [`execute_reporting`](Self::execute_reporting) call.
    pub fn take_failure(&mut self) -> Option<OperationError> {
        self.failure.take()
    }

    /// # Errors
    ///
    /// Returns the first fatal error. Verification failures are not errors; they
    /// are part of the published outcome.
    pub fn execute(&mut self) -> Result<PipelineOutcome> {
        match self.run() {
            Ok(outcome) => Ok(outcome),
            Err(err) => {
                self.transition(PipelineState::Failed);
                Err(err)
            }
        }
    }

    /// Runs the pipeline and converts a failure into empty outputs.
    ///
    /// The failure is logged with its cause chain and kept for
    /// [`take_failure`](Self::take_failure).
    pub fn execute_reporting(&mut self) -> PipelineOutputs {
        match self.execute() {
            Ok(outcome) => outcome.outputs(),
            Err(err) => {
                error!(error = %err, causes = %cause_chain(&err), "pipeline failed");
                self.failure = Some(err);
                PipelineOutputs::default()
            }
        }
    }

    fn transition(&mut self, next: PipelineState) {
        info!(from = %self.state, to = %next, "pipeline transition");
        self.state = next;
    }

    fn run(&mut self) -> Result<PipelineOutcome> {
        let config = self.config;
        config.validate()?;
        info!(package = %config.package, mode = ?config.mode, "checking for updates");

        let versions = OracleOperation::new(self.registry).execute(&config.root, &config.package)?;
        if !versions.is_outdated() {
            self.transition(PipelineState::UpToDate);
            return Ok(PipelineOutcome::UpToDate(versions));
        }

        let branch = feature_branch_name(&versions.latest);
        let matcher = PackageMatcher::new(&config.effective_package_patterns())?;

        if config.mode.is_dry_run() {
            let planned_rewrites = self.manifests.plan(
                &config.root,
                &config.manifest_globs,
                &matcher,
                &versions.latest,
            )?;
            info!(
                branch = %branch,
                files = planned_rewrites.len(),
                "dry run; stopping before any mutation"
            );
            return Ok(PipelineOutcome::DryRun {
                versions,
                branch,
                planned_rewrites,
            });
        }

        self.transition(PipelineState::Migrating);
        let trunk = self.resolve_trunk()?;

        let mut progress = BranchProgress::default();
        let result = self.migrate_and_publish(&versions, &branch, &trunk, &matcher, &mut progress);
        if result.is_err() && config.abandon_on_failure && progress.created {
            self.abandon(&branch, progress.pushed);
        }
        result
    }

    fn resolve_trunk(&self) -> Result<String> {
        if let Some(trunk) = &self.config.trunk {
            return Ok(trunk.clone());
        }
        let trunk = self.host.repository()?.default_branch;
        info!(trunk = %trunk, "resolved trunk from repository metadata");
        Ok(trunk)
    }

    fn migrate_and_publish(
        &mut self,
        versions: &VersionInfo,
        branch: &str,
        trunk: &str,
        matcher: &PackageMatcher,
        progress: &mut BranchProgress,
    ) -> Result<PipelineOutcome> {
        let config = self.config;
        let root = config.root.as_path();
        let remote = config.remote.as_str();

        let trunk_head = self.git.fetch_branch(root, remote, trunk)?;
        self.git
            .checkout_fresh_branch(root, branch, &tracking_ref(remote, trunk))?;
        progress.created = true;
        info!(branch, trunk, trunk_head = %trunk_head, "created feature branch");

        MigrationOperation::new(self.toolchain, self.manifests).execute(&MigrationInput {
            root,
            package: &config.package,
            target: &versions.latest,
            companions: &config.companions,
            manifest_globs: &config.manifest_globs,
            matcher,
            migrations_file: &config.migrations_file,
        })?;

        let fingerprint = self.git.stage_all(root)?;
        let remote_head = self.git.remote_branch_head(root, remote, branch)?;
        if remote_head.is_some() {
            self.git.fetch_branch(root, remote, branch)?;
            let existing = self.git.tree_fingerprint(root, &tracking_ref(remote, branch))?;
            if existing == fingerprint {
                let pull_request = self
                    .host
                    .find_open_pull_request(branch)?
                    .map(|pr| pr.number);
                if pull_request.is_none() {
                    warn!(branch, "remote branch is current but has no open pull request");
                }
                info!(branch, fingerprint = %fingerprint, "change set already on the remote");
                self.transition(PipelineState::Unchanged);
                return Ok(PipelineOutcome::Unchanged {
                    versions: versions.clone(),
                    branch: branch.to_string(),
                    pull_request,
                });
            }
        }

        let author = config
            .effective_author()
            .ok_or(ConfigError::MissingCommitter)?;
        let committer = config
            .committer
            .as_ref()
            .ok_or(ConfigError::MissingCommitter)?;
        let title = migration_title(&config.package, &versions.latest);
        let commit = self.git.commit(root, &title, author, committer)?;
        self.git
            .push_branch(root, remote, branch, remote_head.as_deref())?;
        progress.pushed = true;
        info!(branch, sha = %commit.sha, "pushed migration commit");

        self.transition(PipelineState::Verifying);
        let gate = VerificationGate::new(self.toolchain, self.git).run(root, config.run_e2e)?;

        self.transition(PipelineState::Publishing);
        let pull_request = PullRequestManager::new(self.host).publish(&PublishRequest {
            package: &config.package,
            versions,
            gate,
            head_branch: branch,
            base_branch: trunk,
            label: &config.label,
            assignees: &config.assignees,
            auto_merge: config.auto_merge,
        })?;

        self.transition(PipelineState::Published);
        Ok(PipelineOutcome::Published {
            versions: versions.clone(),
            branch: branch.to_string(),
            commit,
            gate,
            pull_request: pull_request.number,
        })
    }

    /// Best effort; a cleanup failure is logged and the original error wins.
    fn abandon(&self, branch: &str, pushed: bool) {
        let root = self.config.root.as_path();
        let remote = self.config.remote.as_str();
        warn!(branch, pushed, "abandoning feature branch");

        if let Err(err) = self
            .git
            .reset_hard(root)
            .and_then(|()| self.git.delete_branch(root, branch).map(drop))
        {
            warn!(branch, error = %err, "failed to delete local feature branch");
        }
        if pushed {
            if let Err(err) = self.git.delete_remote_branch(root, remote, branch) {
                warn!(branch, error = %err, "failed to delete remote feature branch");
            }
        }
    }
}

fn tracking_ref(remote: &str, branch: &str) -> String {
    format!("refs/remotes/{remote}/{branch}")
}

fn cause_chain(err: &OperationError) -> String {
    let mut causes = Vec::new();
    let mut source = err.source();
    while let Some(cause) = source {
        causes.push(cause.to_string());
        source = cause.source();
    }
    causes.join(": ")
}
