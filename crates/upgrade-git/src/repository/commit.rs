use crate::{CommitInfo, Result, Signer};

use super::Repository;

impl Repository {
    /// Commits the current index on top of HEAD with explicit author and committer.
    ///
    /// # Errors
    ///
    /// Returns an error if a signature is invalid or the commit cannot be created.
    pub fn commit_as(
        &self,
        message: &str,
        author: &Signer,
        committer: &Signer,
    ) -> Result<CommitInfo> {
        let author = git2::Signature::now(&author.name, &author.email)?;
        let committer = git2::Signature::now(&committer.name, &committer.email)?;
        let mut index = self.inner.index()?;
        let tree_id = index.write_tree()?;
        let tree = self.inner.find_tree(tree_id)?;

        let parent = self.inner.head().ok().and_then(|h| h.peel_to_commit().ok());

        let parents: Vec<&git2::Commit<'_>> = parent.iter().collect();

        let commit_oid =
            self.inner
                .commit(Some("HEAD"), &author, &committer, message, &tree, &parents)?;

        Ok(CommitInfo {
            sha: commit_oid.to_string(),
            message: message.to_string(),
        })
    }
}
