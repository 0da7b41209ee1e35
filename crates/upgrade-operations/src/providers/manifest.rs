use std::path::Path;

use semver::Version;
use upgrade_manifest::{ManifestRewrite, PackageMatcher};

use crate::Result;
use crate::traits::ManifestRewriter;

pub struct FileSystemManifestRewriter;

impl FileSystemManifestRewriter {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Default for FileSystemManifestRewriter {
    fn default() -> Self {
        Self::new()
    }
}

impl ManifestRewriter for FileSystemManifestRewriter {
    fn rewrite(
        &self,
        root: &Path,
        globs: &[String],
        matcher: &PackageMatcher,
        target: &Version,
    ) -> Result<Vec<ManifestRewrite>> {
        Ok(upgrade_manifest::rewrite_manifests(
            root, globs, matcher, target,
        )?)
    }

    fn plan(
        &self,
        root: &Path,
        globs: &[String],
        matcher: &PackageMatcher,
        target: &Version,
    ) -> Result<Vec<ManifestRewrite>> {
        Ok(upgrade_manifest::plan_manifest_rewrites(
            root, globs, matcher, target,
        )?)
    }
}
