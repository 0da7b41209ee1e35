use std::collections::BTreeSet;
use std::path::{Component, Path, PathBuf};

use semver::Version;
use tracing::debug;

use crate::{ManifestError, PackageMatcher, SpecifierChange, rewrite_manifest};

/// A manifest whose specifiers change, with its path relative to the workspace root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestRewrite {
    pub path: PathBuf,
    pub changes: Vec<SpecifierChange>,
}

fn is_installed_dependency(path: &Path) -> bool {
    path.components()
        .any(|component| component == Component::Normal("node_modules".as_ref()))
}

/// Expands `patterns` relative to `root`, skipping anything under `node_modules`.
///
/// The result is sorted and free of duplicates.
///
/// # Errors
///
/// Returns an error if a pattern is malformed or a matched path cannot be read.
pub fn discover_manifests<S: AsRef<str>>(
    root: &Path,
    patterns: &[S],
) -> Result<Vec<PathBuf>, ManifestError> {
    let mut manifests = BTreeSet::new();

    for pattern in patterns {
        let pattern = pattern.as_ref();
        let absolute = root.join(pattern);
        let entries = glob::glob(&absolute.to_string_lossy()).map_err(|source| {
            ManifestError::GlobPattern {
                pattern: pattern.to_string(),
                source,
            }
        })?;

        for entry in entries {
            let path = entry?;
            let relative = path.strip_prefix(root).unwrap_or(&path);
            if is_installed_dependency(relative) || !path.is_file() {
                continue;
            }
            manifests.insert(path);
        }
    }

    Ok(manifests.into_iter().collect())
}

fn collect_rewrites<S: AsRef<str>>(
    root: &Path,
    patterns: &[S],
    matcher: &PackageMatcher,
    target: &Version,
    write: bool,
) -> Result<Vec<ManifestRewrite>, ManifestError> {
    let mut rewrites = Vec::new();

    for path in discover_manifests(root, patterns)? {
        let text = std::fs::read_to_string(&path).map_err(|source| ManifestError::Read {
            path: path.clone(),
            source,
        })?;

        let rewrite = rewrite_manifest(&text, matcher, target);
        if !rewrite.is_changed() {
            continue;
        }

        if write {
            std::fs::write(&path, &rewrite.text).map_err(|source| ManifestError::Write {
                path: path.clone(),
                source,
            })?;
        }

        let relative = path.strip_prefix(root).unwrap_or(&path).to_path_buf();
        debug!(
            path = %relative.display(),
            changes = rewrite.changes.len(),
            written = write,
            "rewrote dependency specifiers"
        );
        rewrites.push(ManifestRewrite {
            path: relative,
            changes: rewrite.changes,
        });
    }

    Ok(rewrites)
}

/// Rewrites every matched manifest in place; files without changes are not touched.
///
/// # Errors
///
/// Returns an error if a pattern is malformed or a manifest cannot be read or written.
pub fn rewrite_manifests<S: AsRef<str>>(
    root: &Path,
    patterns: &[S],
    matcher: &PackageMatcher,
    target: &Version,
) -> Result<Vec<ManifestRewrite>, ManifestError> {
    collect_rewrites(root, patterns, matcher, target, true)
}

/// Same as [`rewrite_manifests`] without writing anything.
///
/// # Errors
///
/// Returns an error if a pattern is malformed or a manifest cannot be read.
pub fn plan_manifest_rewrites<S: AsRef<str>>(
    root: &Path,
    patterns: &[S],
    matcher: &PackageMatcher,
    target: &Version,
) -> Result<Vec<ManifestRewrite>, ManifestError> {
    collect_rewrites(root, patterns, matcher, target, false)
}
