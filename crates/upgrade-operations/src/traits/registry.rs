use std::path::Path;

use crate::Result;

pub trait PackageRegistry: Send + Sync {
    /// Version string of `package` as installed in the workspace.
    ///
    /// # Errors
    ///
    /// Returns an error if the package is not installed or its manifest is malformed.
    fn installed_version(&self, root: &Path, package: &str) -> Result<String>;

    /// Version string the registry currently tags as `latest`.
    ///
    /// # Errors
    ///
    /// Returns an error if the registry cannot be reached or answers unexpectedly.
    fn latest_version(&self, package: &str) -> Result<String>;
}
