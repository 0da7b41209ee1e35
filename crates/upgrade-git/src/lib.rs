//! libgit2-backed version control for the migration pipeline: branching from a
//! remote trunk, tree fingerprints, lease-protected pushes and hard resets.

mod error;
mod repository;
mod types;

pub use error::GitError;
pub use repository::Repository;
pub use types::{CommitInfo, Credentials, Signer, TreeFingerprint};

use std::path::Path;

pub type Result<T> = std::result::Result<T, GitError>;

/// Whether the checkout at `root` has no tracked or untracked changes.
///
/// # Errors
///
/// Returns an error if `root` is not inside a git repository or the status
/// cannot be read.
pub fn is_working_tree_clean(root: &Path) -> Result<bool> {
    Repository::open(root)?.is_working_tree_clean()
}

/// Name of the branch checked out at `root`.
///
/// # Errors
///
/// Returns an error if `root` is not inside a git repository or HEAD is detached.
pub fn current_branch(root: &Path) -> Result<String> {
    Repository::open(root)?.current_branch()
}
