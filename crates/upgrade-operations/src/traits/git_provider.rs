use std::path::Path;

use upgrade_core::Identity;
use upgrade_git::{CommitInfo, TreeFingerprint};

use crate::Result;

pub trait GitProvider: Send + Sync {
    /// Fetches `branch` from `remote` into its remote-tracking ref and returns the head sha.
    ///
    /// # Errors
    ///
    /// Returns an error if the remote is unknown, unreachable, or lacks the branch.
    fn fetch_branch(&self, root: &Path, remote: &str, branch: &str) -> Result<String>;

    /// # Errors
    ///
    /// Returns an error if `start` cannot be resolved or the checkout fails.
    fn checkout_fresh_branch(&self, root: &Path, branch: &str, start: &str) -> Result<()>;

    /// Stages every change in the working tree and returns the staged tree fingerprint.
    ///
    /// # Errors
    ///
    /// Returns an error if staging fails.
    fn stage_all(&self, root: &Path) -> Result<TreeFingerprint>;

    /// # Errors
    ///
    /// Returns an error if the remote cannot be contacted.
    fn remote_branch_head(&self, root: &Path, remote: &str, branch: &str)
    -> Result<Option<String>>;

    /// # Errors
    ///
    /// Returns an error if `refspec` does not name a commit.
    fn tree_fingerprint(&self, root: &Path, refspec: &str) -> Result<TreeFingerprint>;

    /// # Errors
    ///
    /// Returns an error if the commit cannot be created.
    fn commit(
        &self,
        root: &Path,
        message: &str,
        author: &Identity,
        committer: &Identity,
    ) -> Result<CommitInfo>;

    /// Force-pushes `branch` unless the remote head differs from `expected_remote_head`.
    ///
    /// # Errors
    ///
    /// Returns an error if the lease does not hold or the push fails.
    fn push_branch(
        &self,
        root: &Path,
        remote: &str,
        branch: &str,
        expected_remote_head: Option<&str>,
    ) -> Result<()>;

    /// # Errors
    ///
    /// Returns an error if the working tree cannot be reset.
    fn reset_hard(&self, root: &Path) -> Result<()>;

    /// # Errors
    ///
    /// Returns an error if the branch exists but cannot be deleted.
    fn delete_branch(&self, root: &Path, branch: &str) -> Result<bool>;

    /// # Errors
    ///
    /// Returns an error if the remote refuses the deletion.
    fn delete_remote_branch(&self, root: &Path, remote: &str, branch: &str) -> Result<()>;

    /// # Errors
    ///
    /// Returns an error if the repository cannot be opened.
    fn remote_url(&self, root: &Path, remote: &str) -> Result<Option<String>>;
}
