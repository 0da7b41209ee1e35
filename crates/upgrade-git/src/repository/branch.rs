use tracing::debug;

use crate::{Repository, Result};

fn discarding_checkout() -> git2::build::CheckoutBuilder<'static> {
    let mut checkout = git2::build::CheckoutBuilder::new();
    checkout.force().remove_untracked(true);
    checkout
}

impl Repository {
    /// Moves HEAD onto a new `branch` created at `start` (any revspec).
    ///
    /// Local modifications and untracked files are discarded; ignored files
    /// survive. An existing local branch of the same name is overwritten. No
    /// upstream is configured.
    ///
    /// # Errors
    ///
    /// Returns an error if `start` cannot be resolved or the checkout fails.
    pub fn checkout_fresh_branch(&self, branch: &str, start: &str) -> Result<()> {
        let commit = self.resolve_commit(start)?;

        self.inner
            .checkout_tree(commit.as_object(), Some(&mut discarding_checkout()))?;
        // The branch may be the current HEAD, which libgit2 refuses to overwrite.
        self.inner.set_head_detached(commit.id())?;
        self.inner.branch(branch, &commit, true)?;
        self.inner.set_head(&format!("refs/heads/{branch}"))?;

        debug!(branch, start, commit = %commit.id(), "checked out fresh branch");
        Ok(())
    }

    /// Deletes the local `branch`, detaching HEAD first when it is checked out.
    ///
    /// Returns `false` when no such branch exists.
    ///
    /// # Errors
    ///
    /// Returns an error if HEAD cannot be detached or the branch cannot be deleted.
    pub fn delete_branch(&self, branch: &str) -> Result<bool> {
        let Ok(mut local) = self.inner.find_branch(branch, git2::BranchType::Local) else {
            return Ok(false);
        };

        if local.is_head() {
            let head = self.inner.head()?.peel_to_commit()?;
            self.inner.set_head_detached(head.id())?;
        }

        local.delete()?;
        debug!(branch, "deleted local branch");
        Ok(true)
    }
}
