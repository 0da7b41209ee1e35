use std::fmt;

use semver::Version;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UpdateKind {
    None,
    Patch,
    Minor,
    Major,
}

impl fmt::Display for UpdateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::None => "none",
            Self::Patch => "patch",
            Self::Minor => "minor",
            Self::Major => "major",
        };
        write!(f, "{s}")
    }
}

/// Installed and latest published version of the migrated package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionInfo {
    pub current: Version,
    pub latest: Version,
}

impl VersionInfo {
    #[must_use]
    pub fn new(current: Version, latest: Version) -> Self {
        Self { current, latest }
    }

    /// # Errors
    ///
    /// Returns [`CoreError::InvalidVersion`] if either string is not valid semver.
    pub fn parse(current: &str, latest: &str) -> Result<Self, CoreError> {
        Ok(Self::new(parse_version(current)?, parse_version(latest)?))
    }

    #[must_use]
    pub fn is_major_update(&self) -> bool {
        self.latest.major > self.current.major
    }

    #[must_use]
    pub fn is_outdated(&self) -> bool {
        self.current.to_string() != self.latest.to_string()
    }

    /// Classifies the delta by the highest differing component.
    ///
    /// Build metadata and prerelease-only differences count as a patch.
    #[must_use]
    pub fn update_kind(&self) -> UpdateKind {
        if !self.is_outdated() {
            UpdateKind::None
        } else if self.current.major != self.latest.major {
            UpdateKind::Major
        } else if self.current.minor != self.latest.minor {
            UpdateKind::Minor
        } else {
            UpdateKind::Patch
        }
    }
}

fn parse_version(version: &str) -> Result<Version, CoreError> {
    let trimmed = version.trim();
    let trimmed = trimmed.strip_prefix('v').unwrap_or(trimmed);
    Version::parse(trimmed).map_err(|source| CoreError::InvalidVersion {
        version: version.to_string(),
        source,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum E2eStatus {
    Passed,
    Failed,
    #[default]
    NotRun,
}

impl E2eStatus {
    #[must_use]
    pub fn marker(self) -> &'static str {
        match self {
            Self::Passed => "✅",
            Self::Failed => "❌",
            Self::NotRun => "⏭️",
        }
    }
}

impl From<bool> for E2eStatus {
    fn from(passed: bool) -> Self {
        if passed { Self::Passed } else { Self::Failed }
    }
}

/// Result of the verification gate. Failures here are data, not errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GateReport {
    pub tests_pass: bool,
    pub e2e: E2eStatus,
}

impl GateReport {
    #[must_use]
    pub fn tests_marker(&self) -> &'static str {
        if self.tests_pass { "✅" } else { "❌" }
    }
}

/// Externally observable result of a pipeline run.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct PipelineOutputs {
    pub current_version: Option<String>,
    pub latest_version: Option<String>,
    pub is_major_update: bool,
    pub is_migrated: bool,
    pub pull_request: Option<u64>,
}

impl PipelineOutputs {
    #[must_use]
    pub fn from_versions(versions: &VersionInfo) -> Self {
        Self {
            current_version: Some(versions.current.to_string()),
            latest_version: Some(versions.latest.to_string()),
            is_major_update: versions.is_major_update(),
            is_migrated: false,
            pull_request: None,
        }
    }

    /// Records the pull request; a run counts as migrated exactly when one exists.
    #[must_use]
    pub fn with_pull_request(mut self, number: Option<u64>) -> Self {
        self.pull_request = number;
        self.is_migrated = number.is_some();
        self
    }

    /// Key/value pairs in the order they are published to the CI job.
    #[must_use]
    pub fn entries(&self) -> Vec<(&'static str, String)> {
        vec![
            (
                "current-version",
                self.current_version.clone().unwrap_or_default(),
            ),
            (
                "latest-version",
                self.latest_version.clone().unwrap_or_default(),
            ),
            ("is-major-update", self.is_major_update.to_string()),
            ("is-migrated", self.is_migrated.to_string()),
            (
                "pull-request",
                self.pull_request.map(|n| n.to_string()).unwrap_or_default(),
            ),
        ]
    }
}
