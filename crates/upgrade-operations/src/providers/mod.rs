mod git;
mod github;
mod manifest;
mod npm;
mod process;

pub use git::Git2Provider;
pub use github::GitHubClient;
pub use manifest::FileSystemManifestRewriter;
pub use npm::NpmRegistry;
pub use process::ProcessToolchain;

use std::time::Duration;

use crate::{OperationError, Result};

pub(crate) fn http_client(timeout: Duration) -> Result<reqwest::blocking::Client> {
    reqwest::blocking::Client::builder()
        .connect_timeout(timeout.min(Duration::from_secs(10)))
        .timeout(timeout)
        .user_agent(concat!("nx-upgrade/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(OperationError::HttpClient)
}

/// Sends a request, mapping transport failures and non-success statuses to errors.
pub(crate) fn send(
    request: reqwest::blocking::RequestBuilder,
    url: &str,
) -> Result<reqwest::blocking::Response> {
    let response = request.send().map_err(|source| OperationError::Http {
        url: url.to_string(),
        source,
    })?;

    let status = response.status();
    if !status.is_success() {
        let body = response
            .text()
            .unwrap_or_else(|_| "unable to read response body".to_string());
        return Err(OperationError::HttpStatus {
            url: url.to_string(),
            status: status.as_u16(),
            body,
        });
    }

    Ok(response)
}
