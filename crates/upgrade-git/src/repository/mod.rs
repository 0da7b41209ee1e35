mod branch;
mod commit;
mod remote;
mod reset;
mod staging;
mod status;

use std::path::{Path, PathBuf};

use crate::{GitError, Result};

pub struct Repository {
    pub(crate) inner: git2::Repository,
    root: PathBuf,
}

impl Repository {
    /// Opens the repository containing `path`, which may be any directory of the
    /// workspace.
    ///
    /// # Errors
    ///
    /// Returns [`GitError::NotARepository`] if no repository with a working tree
    /// contains `path`.
    pub fn open(path: &Path) -> Result<Self> {
        let not_a_repository = || GitError::NotARepository {
            path: path.to_path_buf(),
        };

        let inner = git2::Repository::discover(path).map_err(|_| not_a_repository())?;
        let root = inner
            .workdir()
            .map(|workdir| dunce::simplified(workdir).to_path_buf())
            .ok_or_else(not_a_repository)?;

        Ok(Self { inner, root })
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub(crate) fn resolve_commit(&self, refspec: &str) -> Result<git2::Commit<'_>> {
        self.inner
            .revparse_single(refspec)
            .and_then(|object| object.peel_to_commit())
            .map_err(|_| GitError::RefNotFound {
                refspec: refspec.to_string(),
            })
    }
}
