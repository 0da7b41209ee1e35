mod error;
mod files;
mod matcher;
mod rewrite;
mod specifier;

pub use error::ManifestError;
pub use files::{ManifestRewrite, discover_manifests, plan_manifest_rewrites, rewrite_manifests};
pub use matcher::{PackageMatcher, default_patterns};
pub use rewrite::{Rewrite, SpecifierChange, rewrite_manifest};
pub use specifier::SpecifierShape;
