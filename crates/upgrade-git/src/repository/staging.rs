use crate::{Result, TreeFingerprint};

use super::Repository;

impl Repository {
    /// Stages every addition, modification and deletion in the working tree.
    ///
    /// # Errors
    ///
    /// Returns an error if the staging operation fails.
    pub fn stage_all(&self) -> Result<()> {
        let mut index = self.inner.index()?;

        index.add_all(["*"].iter(), git2::IndexAddOption::DEFAULT, None)?;
        index.update_all(["*"].iter(), None)?;
        index.write()?;

        Ok(())
    }

    /// Fingerprint of what a commit made right now would contain.
    ///
    /// # Errors
    ///
    /// Returns an error if the index cannot be written as a tree.
    pub fn staged_fingerprint(&self) -> Result<TreeFingerprint> {
        let mut index = self.inner.index()?;
        let tree_id = index.write_tree()?;
        Ok(TreeFingerprint::from_oid(tree_id))
    }

    /// # Errors
    ///
    /// Returns [`crate::GitError::RefNotFound`] if `refspec` does not name a commit.
    pub fn tree_fingerprint(&self, refspec: &str) -> Result<TreeFingerprint> {
        let commit = self.resolve_commit(refspec)?;
        Ok(TreeFingerprint::from_oid(commit.tree_id()))
    }
}
