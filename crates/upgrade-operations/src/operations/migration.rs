use std::path::Path;

use semver::Version;
use tracing::{debug, info};
use upgrade_manifest::{ManifestRewrite, PackageMatcher};

use crate::traits::{ManifestRewriter, Toolchain};
use crate::{OperationError, Result};

pub struct MigrationInput<'a> {
    pub root: &'a Path,
    pub package: &'a str,
    pub target: &'a Version,
    pub companions: &'a [String],
    pub manifest_globs: &'a [String],
    pub matcher: &'a PackageMatcher,
    pub migrations_file: &'a str,
}

#[derive(Debug, Default)]
pub struct MigrationReport {
    pub rewrites: Vec<ManifestRewrite>,
    pub ran_migrations: bool,
}

/// Moves the workspace to a new framework version.
///
/// Steps run in order: the framework's migrate command, specifier rewrites across
/// every manifest, companion packages, a dependency install, and finally the
/// generated code migrations if a migrations manifest appeared. The manifest is
/// removed afterwards so it never lands in the commit.
pub struct MigrationOperation<'a, T, M> {
    toolchain: &'a T,
    rewriter: &'a M,
}

impl<'a, T, M> MigrationOperation<'a, T, M>
where
    T: Toolchain,
    M: ManifestRewriter,
{
    pub fn new(toolchain: &'a T, rewriter: &'a M) -> Self {
        Self {
            toolchain,
            rewriter,
        }
    }

    /// # Errors
    ///
    /// Returns an error if any toolchain step fails, a manifest cannot be rewritten,
    /// or the migrations manifest cannot be removed.
    pub fn execute(&self, input: &MigrationInput<'_>) -> Result<MigrationReport> {
        let root = input.root;

        self.toolchain.migrate(root, input.package, input.target)?;

        let rewrites =
            self.rewriter
                .rewrite(root, input.manifest_globs, input.matcher, input.target)?;
        info!(
            files = rewrites.len(),
            target = %input.target,
            "rewrote dependency specifiers"
        );

        for companion in input.companions {
            self.toolchain.add_package(root, companion, input.target)?;
        }

        self.toolchain.install(root)?;

        let manifest = root.join(input.migrations_file);
        let ran_migrations = manifest.is_file();
        if ran_migrations {
            self.toolchain.run_migrations(root, &manifest)?;
            std::fs::remove_file(&manifest).map_err(|source| OperationError::RemoveFile {
                path: manifest.clone(),
                source,
            })?;
            debug!(path = %manifest.display(), "removed migrations manifest");
        } else {
            debug!(path = %manifest.display(), "no migrations generated");
        }

        Ok(MigrationReport {
            rewrites,
            ran_migrations,
        })
    }
}
