use std::path::Path;

use tracing::info;
use upgrade_core::VersionInfo;

use crate::Result;
use crate::traits::PackageRegistry;

/// Compares the installed version of a package with the registry's `latest`.
pub struct OracleOperation<'a, R> {
    registry: &'a R,
}

impl<'a, R> OracleOperation<'a, R>
where
    R: PackageRegistry,
{
    pub fn new(registry: &'a R) -> Self {
        Self { registry }
    }

    /// # Errors
    ///
    /// Returns an error if the package is not installed, the registry cannot be
    /// reached, or either version is not valid semver.
    pub fn execute(&self, root: &Path, package: &str) -> Result<VersionInfo> {
        let installed = self.registry.installed_version(root, package)?;
        let latest = self.registry.latest_version(package)?;
        let versions = VersionInfo::parse(&installed, &latest)?;

        info!(
            package,
            current = %versions.current,
            latest = %versions.latest,
            update = %versions.update_kind(),
            "resolved versions"
        );

        Ok(versions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::OperationError;
    use crate::mocks::MockRegistry;
    use upgrade_core::{CoreError, UpdateKind};

    #[test]
    fn reports_major_update() -> anyhow::Result<()> {
        let registry = MockRegistry::new("21.6.2", "22.0.0");

        let versions = OracleOperation::new(&registry).execute(Path::new("."), "nx")?;

        assert_eq!(versions.current.to_string(), "21.6.2");
        assert_eq!(versions.latest.to_string(), "22.0.0");
        assert_eq!(versions.update_kind(), UpdateKind::Major);
        assert_eq!(registry.lookups(), vec!["installed nx", "latest nx"]);
        Ok(())
    }

    #[test]
    fn equal_versions_are_up_to_date() -> anyhow::Result<()> {
        let registry = MockRegistry::new("22.0.0", "22.0.0");

        let versions = OracleOperation::new(&registry).execute(Path::new("."), "nx")?;

        assert!(!versions.is_outdated());
        Ok(())
    }

    #[test]
    fn registry_outage_is_an_error() {
        let registry = MockRegistry::new("21.0.0", "22.0.0").unreachable();

        let result = OracleOperation::new(&registry).execute(Path::new("."), "nx");

        assert!(matches!(
            result,
            Err(OperationError::HttpStatus { status: 503, .. })
        ));
    }

    #[test]
    fn invalid_installed_version_is_an_error() {
        let registry = MockRegistry::new("not-a-version", "22.0.0");

        let result = OracleOperation::new(&registry).execute(Path::new("."), "nx");

        assert!(matches!(
            result,
            Err(OperationError::Core(CoreError::InvalidVersion { .. }))
        ));
    }
}
