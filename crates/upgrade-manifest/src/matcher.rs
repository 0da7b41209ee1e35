use globset::{GlobBuilder, GlobSet, GlobSetBuilder};

use crate::ManifestError;

/// Decides which dependency names have their specifiers rewritten.
///
/// Patterns are globs over package names where `*` stops at `/`, so
/// `@nx/*` matches `@nx/react` but not `@nx/react/plugin`.
#[derive(Debug, Clone)]
pub struct PackageMatcher {
    patterns: Vec<String>,
    set: GlobSet,
}

impl PackageMatcher {
    /// # Errors
    ///
    /// Returns [`ManifestError::PackagePattern`] if a pattern is not a valid glob.
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Result<Self, ManifestError> {
        let mut builder = GlobSetBuilder::new();
        for pattern in patterns {
            let pattern = pattern.as_ref();
            let glob = GlobBuilder::new(pattern)
                .literal_separator(true)
                .build()
                .map_err(|source| ManifestError::PackagePattern {
                    pattern: pattern.to_string(),
                    source,
                })?;
            builder.add(glob);
        }

        let set = builder
            .build()
            .map_err(|source| ManifestError::PackagePattern {
                pattern: patterns
                    .iter()
                    .map(AsRef::as_ref)
                    .collect::<Vec<_>>()
                    .join(", "),
                source,
            })?;

        Ok(Self {
            patterns: patterns.iter().map(|p| p.as_ref().to_string()).collect(),
            set,
        })
    }

    /// Matcher over [`default_patterns`]: `nx` yields `nx` and `@nx/*`.
    ///
    /// # Errors
    ///
    /// Returns [`ManifestError::PackagePattern`] if the package name contains glob syntax
    /// that does not compile.
    pub fn for_package(package: &str) -> Result<Self, ManifestError> {
        Self::new(&default_patterns(package))
    }

    #[must_use]
    pub fn is_match(&self, name: &str) -> bool {
        self.set.is_match(name)
    }

    #[must_use]
    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }
}

/// The package itself plus its npm scope.
#[must_use]
pub fn default_patterns(package: &str) -> Vec<String> {
    let scope = package.trim_start_matches('@');
    let scope = scope.split('/').next().unwrap_or(scope);
    vec![package.to_string(), format!("@{scope}/*")]
}
