use tracing::{debug, info, warn};
use upgrade_core::{GateReport, VersionInfo, migration_title};

use crate::Result;
use crate::traits::{CodeHost, PullRequest};

pub struct PublishRequest<'a> {
    pub package: &'a str,
    pub versions: &'a VersionInfo,
    pub gate: GateReport,
    pub head_branch: &'a str,
    pub base_branch: &'a str,
    pub label: &'a str,
    pub assignees: &'a [String],
    pub auto_merge: bool,
}

/// Pull request description for a migration.
#[must_use]
pub fn render_body(package: &str, versions: &VersionInfo, gate: &GateReport) -> String {
    let mut body = format!(
        "Migrates `{package}` from `{}` → `{}` ({} update).\n\n\
         | Check | Result |\n\
         | --- | --- |\n\
         | Lint, test and build | {} |\n\
         | End-to-end | {} |\n",
        versions.current,
        versions.latest,
        versions.update_kind(),
        gate.tests_marker(),
        gate.e2e.marker()
    );
    if !gate.tests_pass {
        body.push_str("\nVerification failed on this branch. Fix it up before merging.\n");
    }
    body
}

/// Comment explaining why a major update is left for manual merging.
#[must_use]
pub fn major_update_comment(package: &str, versions: &VersionInfo) -> String {
    format!(
        "Auto-merge was not enabled: `{package}` {} → {} is a major update and needs a manual review.",
        versions.current, versions.latest
    )
}

/// Opens or refreshes the migration pull request and retires superseded ones.
pub struct PullRequestManager<'a, H> {
    host: &'a H,
}

impl<'a, H> PullRequestManager<'a, H>
where
    H: CodeHost,
{
    pub fn new(host: &'a H) -> Self {
        Self { host }
    }

    /// # Errors
    ///
    /// Returns an error if any code host call fails. Calls already made are not
    /// rolled back.
    pub fn publish(&self, request: &PublishRequest<'_>) -> Result<PullRequest> {
        let title = migration_title(request.package, &request.versions.latest);
        let body = render_body(request.package, request.versions, &request.gate);

        let pull_request = match self.host.find_open_pull_request(request.head_branch)? {
            Some(existing) => {
                self.host
                    .update_pull_request(existing.number, &title, &body)?;
                info!(number = existing.number, "updated pull request");
                existing
            }
            None => {
                let created = self.host.create_pull_request(
                    &title,
                    &body,
                    request.head_branch,
                    request.base_branch,
                )?;
                info!(
                    number = created.number,
                    head = request.head_branch,
                    base = request.base_branch,
                    "opened pull request"
                );
                created
            }
        };

        self.host
            .add_labels(pull_request.number, &[request.label.to_string()])?;

        if !request.assignees.is_empty() {
            self.host
                .add_assignees(pull_request.number, request.assignees)?;
        }

        if request.auto_merge {
            self.request_auto_merge(&pull_request, request)?;
        }

        self.retire_superseded(&pull_request, request.label)?;

        Ok(pull_request)
    }

    fn request_auto_merge(
        &self,
        pull_request: &PullRequest,
        request: &PublishRequest<'_>,
    ) -> Result<()> {
        if request.versions.is_major_update() {
            let comment = major_update_comment(request.package, request.versions);
            let existing = self.host.list_comments(pull_request.number)?;
            if existing.iter().any(|body| body == &comment) {
                debug!(number = pull_request.number, "major update already explained");
            } else {
                self.host.create_comment(pull_request.number, &comment)?;
                info!(number = pull_request.number, "major update; auto-merge skipped");
            }
            return Ok(());
        }

        if self.host.repository()?.allow_auto_merge {
            self.host.enable_auto_merge(pull_request)?;
            info!(number = pull_request.number, "enabled auto-merge");
        } else {
            warn!(
                number = pull_request.number,
                "auto-merge requested but the repository does not allow it"
            );
        }
        Ok(())
    }

    fn retire_superseded(&self, survivor: &PullRequest, label: &str) -> Result<()> {
        for other in self.host.list_open_pull_requests()? {
            if other.number == survivor.number || !other.has_label(label) {
                continue;
            }
            self.host
                .create_comment(other.number, &format!("Superseded by #{}.", survivor.number))?;
            self.host.close_pull_request(other.number)?;
            info!(
                closed = other.number,
                survivor = survivor.number,
                "closed superseded pull request"
            );
        }
        Ok(())
    }
}
