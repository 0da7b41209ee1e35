use std::path::Path;

use semver::Version;
use upgrade_manifest::{ManifestRewrite, PackageMatcher};

use crate::Result;

pub trait ManifestRewriter: Send + Sync {
    /// Rewrites matching specifiers in every manifest selected by `globs`.
    ///
    /// # Errors
    ///
    /// Returns an error if a glob is malformed or a manifest cannot be read or written.
    fn rewrite(
        &self,
        root: &Path,
        globs: &[String],
        matcher: &PackageMatcher,
        target: &Version,
    ) -> Result<Vec<ManifestRewrite>>;

    /// Reports what [`ManifestRewriter::rewrite`] would change without writing.
    ///
    /// # Errors
    ///
    /// Returns an error if a glob is malformed or a manifest cannot be read.
    fn plan(
        &self,
        root: &Path,
        globs: &[String],
        matcher: &PackageMatcher,
        target: &Version,
    ) -> Result<Vec<ManifestRewrite>>;
}
