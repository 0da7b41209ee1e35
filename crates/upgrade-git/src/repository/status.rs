use crate::{GitError, Result};

use super::Repository;

impl Repository {
    /// # Errors
    ///
    /// Returns [`GitError::DetachedHead`] if HEAD does not point at a local branch.
    pub fn current_branch(&self) -> Result<String> {
        let head = self.inner.head()?;
        match head.shorthand() {
            Some(name) if head.is_branch() => Ok(name.to_string()),
            _ => Err(GitError::DetachedHead),
        }
    }

    /// True when nothing is staged, modified or untracked. Ignored paths such as
    /// `node_modules` are not considered.
    ///
    /// # Errors
    ///
    /// Returns an error if the status cannot be read.
    pub fn is_working_tree_clean(&self) -> Result<bool> {
        let mut options = git2::StatusOptions::new();
        options
            .include_untracked(true)
            .include_ignored(false)
            .recurse_untracked_dirs(true);

        Ok(self.inner.statuses(Some(&mut options))?.is_empty())
    }
}
