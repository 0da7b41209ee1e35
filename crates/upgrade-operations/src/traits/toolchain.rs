use std::path::Path;

use semver::Version;

use crate::Result;

/// The workspace's package manager and build framework.
///
/// Suite runs report failure as `Ok(false)`; only an inability to run them is an error.
pub trait Toolchain: Send + Sync {
    /// # Errors
    ///
    /// Returns an error if the migrate command cannot run or fails.
    fn migrate(&self, root: &Path, package: &str, version: &Version) -> Result<()>;

    /// # Errors
    ///
    /// Returns an error if the package cannot be added.
    fn add_package(&self, root: &Path, package: &str, version: &Version) -> Result<()>;

    /// Installs dependencies, allowing the lock file to change.
    ///
    /// # Errors
    ///
    /// Returns an error if the install cannot run or fails.
    fn install(&self, root: &Path) -> Result<()>;

    /// # Errors
    ///
    /// Returns an error if the migrations cannot run or fail.
    fn run_migrations(&self, root: &Path, manifest: &Path) -> Result<()>;

    /// Lint, test and build for the whole workspace.
    ///
    /// # Errors
    ///
    /// Returns an error only if the suite cannot be started.
    fn run_tests(&self, root: &Path) -> Result<bool>;

    /// # Errors
    ///
    /// Returns an error only if the suite cannot be started.
    fn run_e2e(&self, root: &Path) -> Result<bool>;
}
