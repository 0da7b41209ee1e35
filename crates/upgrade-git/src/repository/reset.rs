use tracing::debug;

use crate::Result;

use super::Repository;

impl Repository {
    /// Discards every tracked modification and untracked file, keeping ignored ones.
    ///
    /// # Errors
    ///
    /// Returns an error if HEAD cannot be resolved or the checkout fails.
    pub fn reset_hard_to_head(&self) -> Result<()> {
        let head = self.inner.head()?.peel_to_commit()?;

        self.inner
            .reset(head.as_object(), git2::ResetType::Hard, None)?;
        // A hard reset leaves untracked files in place.
        self.inner.checkout_head(Some(
            git2::build::CheckoutBuilder::new()
                .force()
                .remove_untracked(true),
        ))?;

        debug!(commit = %head.id(), "reset working tree to HEAD");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::{commit_file, setup_test_repo};
    use std::fs;

    #[test]
    fn reset_discards_modifications_and_untracked_files() -> anyhow::Result<()> {
        let (dir, repo) = setup_test_repo()?;
        fs::write(dir.path().join("package.json"), "changed")?;
        fs::create_dir_all(dir.path().join("apps/demo"))?;
        fs::write(dir.path().join("apps/demo/new.txt"), "new")?;

        repo.reset_hard_to_head()?;

        assert!(repo.is_working_tree_clean()?);
        assert_eq!(
            fs::read_to_string(dir.path().join("package.json"))?,
            "{\n  \"name\": \"root\"\n}\n"
        );
        assert!(!dir.path().join("apps/demo/new.txt").exists());
        Ok(())
    }

    #[test]
    fn reset_discards_staged_changes() -> anyhow::Result<()> {
        let (dir, repo) = setup_test_repo()?;
        fs::write(dir.path().join("staged.txt"), "x")?;
        repo.stage_all()?;

        repo.reset_hard_to_head()?;

        assert!(!dir.path().join("staged.txt").exists());
        assert!(repo.is_working_tree_clean()?);
        Ok(())
    }

    #[test]
    fn reset_keeps_ignored_files() -> anyhow::Result<()> {
        let (dir, repo) = setup_test_repo()?;
        commit_file(&repo, ".gitignore", "dist/\n", "ignore dist")?;
        fs::create_dir_all(dir.path().join("dist"))?;
        fs::write(dir.path().join("dist/out.js"), "built")?;

        repo.reset_hard_to_head()?;

        assert!(dir.path().join("dist/out.js").exists());
        Ok(())
    }
}
