use std::path::Path;

use upgrade_core::{AccessToken, Identity};
use upgrade_git::{CommitInfo, Credentials, Repository, Signer, TreeFingerprint};

use crate::Result;
use crate::traits::GitProvider;

/// libgit2-backed provider; opens the repository afresh for every call.
pub struct Git2Provider {
    credentials: Option<Credentials>,
}

impl Git2Provider {
    #[must_use]
    pub fn new() -> Self {
        Self { credentials: None }
    }

    /// Authenticates HTTPS remotes with `token`.
    #[must_use]
    pub fn with_token(token: &AccessToken) -> Self {
        let credentials = (!token.is_empty()).then(|| Credentials::token(token.expose()));
        Self { credentials }
    }
}

impl Default for Git2Provider {
    fn default() -> Self {
        Self::new()
    }
}

fn signer(identity: &Identity) -> Signer {
    Signer::new(identity.name(), identity.email())
}

impl GitProvider for Git2Provider {
    fn fetch_branch(&self, root: &Path, remote: &str, branch: &str) -> Result<String> {
        let repo = Repository::open(root)?;
        Ok(repo.fetch_branch(remote, branch, self.credentials.as_ref())?)
    }

    fn checkout_fresh_branch(&self, root: &Path, branch: &str, start: &str) -> Result<()> {
        let repo = Repository::open(root)?;
        Ok(repo.checkout_fresh_branch(branch, start)?)
    }

    fn stage_all(&self, root: &Path) -> Result<TreeFingerprint> {
        let repo = Repository::open(root)?;
        repo.stage_all()?;
        Ok(repo.staged_fingerprint()?)
    }

    fn remote_branch_head(
        &self,
        root: &Path,
        remote: &str,
        branch: &str,
    ) -> Result<Option<String>> {
        let repo = Repository::open(root)?;
        Ok(repo.remote_branch_head(remote, branch, self.credentials.as_ref())?)
    }

    fn tree_fingerprint(&self, root: &Path, refspec: &str) -> Result<TreeFingerprint> {
        let repo = Repository::open(root)?;
        Ok(repo.tree_fingerprint(refspec)?)
    }

    fn commit(
        &self,
        root: &Path,
        message: &str,
        author: &Identity,
        committer: &Identity,
    ) -> Result<CommitInfo> {
        let repo = Repository::open(root)?;
        Ok(repo.commit_as(message, &signer(author), &signer(committer))?)
    }

    fn push_branch(
        &self,
        root: &Path,
        remote: &str,
        branch: &str,
        expected_remote_head: Option<&str>,
    ) -> Result<()> {
        let repo = Repository::open(root)?;
        Ok(repo.push_branch(
            remote,
            branch,
            expected_remote_head,
            self.credentials.as_ref(),
        )?)
    }

    fn reset_hard(&self, root: &Path) -> Result<()> {
        let repo = Repository::open(root)?;
        Ok(repo.reset_hard_to_head()?)
    }

    fn delete_branch(&self, root: &Path, branch: &str) -> Result<bool> {
        let repo = Repository::open(root)?;
        Ok(repo.delete_branch(branch)?)
    }

    fn delete_remote_branch(&self, root: &Path, remote: &str, branch: &str) -> Result<()> {
        let repo = Repository::open(root)?;
        Ok(repo.delete_remote_branch(remote, branch, self.credentials.as_ref())?)
    }

    fn remote_url(&self, root: &Path, remote: &str) -> Result<Option<String>> {
        let repo = Repository::open(root)?;
        Ok(repo.remote_url(remote)?)
    }
}
