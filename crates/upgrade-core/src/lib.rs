pub mod error;
mod identity;
mod repository;
mod token;
pub mod types;

pub use error::*;
pub use identity::Identity;
pub use repository::RepositorySlug;
pub use token::AccessToken;
pub use types::*;

/// Prefix shared by every feature branch the pipeline creates.
pub const FEATURE_BRANCH_PREFIX: &str = "nx-migrate/";

/// Derives the feature branch for a migration target.
///
/// The name depends on nothing but the target version, so repeated runs for the
/// same release always land on the same branch.
#[must_use]
pub fn feature_branch_name(latest: &semver::Version) -> String {
    format!("{FEATURE_BRANCH_PREFIX}{latest}")
}

/// Commit message and pull request title for a migration.
#[must_use]
pub fn migration_title(package: &str, latest: &semver::Version) -> String {
    format!("chore(deps): migrate {package} to {latest}")
}
