use std::path::Path;
use std::time::Duration;

use upgrade_core::VersionInfo;
use upgrade_operations::RetryPolicy;
use upgrade_operations::config::parse_url;
use upgrade_operations::operations::OracleOperation;
use upgrade_operations::providers::NpmRegistry;

use super::CheckArgs;
use crate::error::Result;

pub(crate) fn run(args: &CheckArgs, root: &Path) -> Result<()> {
    let registry = NpmRegistry::new(
        parse_url("registry-url", &args.registry_url)?,
        Duration::from_secs(args.http_timeout),
        RetryPolicy::new(args.read_retries),
    )?;

    let versions = OracleOperation::new(&registry).execute(root, &args.package)?;
    println!("{}", describe(&args.package, &versions));

    Ok(())
}

fn describe(package: &str, versions: &VersionInfo) -> String {
    format!(
        "{package}: {} → {} ({})",
        versions.current,
        versions.latest,
        versions.update_kind()
    )
}
