mod code_host;
mod git_provider;
mod manifest_rewriter;
mod registry;
mod toolchain;

pub use code_host::{CodeHost, PullRequest, RepositoryInfo};
pub use git_provider::GitProvider;
pub use manifest_rewriter::ManifestRewriter;
pub use registry::PackageRegistry;
pub use toolchain::Toolchain;
