use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;
use url::Url;

use crate::providers::{http_client, send};
use crate::traits::PackageRegistry;
use crate::{OperationError, Result, RetryPolicy};

#[derive(Debug, Deserialize)]
struct PackageVersion {
    version: String,
}

/// npm registry client for `latest` lookups plus the installed copy under `node_modules`.
pub struct NpmRegistry {
    base_url: Url,
    http: reqwest::blocking::Client,
    retry: RetryPolicy,
}

impl NpmRegistry {
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(base_url: Url, timeout: std::time::Duration, retry: RetryPolicy) -> Result<Self> {
        Ok(Self {
            base_url,
            http: http_client(timeout)?,
            retry,
        })
    }

    fn latest_url(&self, package: &str) -> String {
        // Scoped names keep their '/' unescaped; the registry accepts both forms.
        format!(
            "{}/{package}/latest",
            self.base_url.as_str().trim_end_matches('/')
        )
    }
}

fn installed_manifest_path(root: &Path, package: &str) -> PathBuf {
    package
        .split('/')
        .fold(root.join("node_modules"), |path, part| path.join(part))
        .join("package.json")
}

impl PackageRegistry for NpmRegistry {
    fn installed_version(&self, root: &Path, package: &str) -> Result<String> {
        let path = installed_manifest_path(root, package);
        let content =
            std::fs::read_to_string(&path).map_err(|source| OperationError::PackageNotInstalled {
                package: package.to_string(),
                path: path.clone(),
                source,
            })?;

        let manifest: PackageVersion = serde_json::from_str(&content)
            .map_err(|source| OperationError::InstalledManifest { path, source })?;

        debug!(package, version = %manifest.version, "read installed version");
        Ok(manifest.version)
    }

    fn latest_version(&self, package: &str) -> Result<String> {
        let url = self.latest_url(package);

        let latest: PackageVersion = self.retry.run("registry lookup", || {
            let response = send(
                self.http.get(&url).header("Accept", "application/json"),
                &url,
            )?;
            response
                .json::<PackageVersion>()
                .map_err(|source| OperationError::MalformedResponse {
                    url: url.clone(),
                    source,
                })
        })?;

        debug!(package, version = %latest.version, "read latest published version");
        Ok(latest.version)
    }
}
