use std::fs;
use std::path::Path;

use semver::Version;
use tempfile::TempDir;
use upgrade_manifest::{PackageMatcher, plan_manifest_rewrites, rewrite_manifests};

const APP: &str = r#"{
  "name": "@acme/app",
  "devDependencies": {
    "nx": "21.2.3",
    "@nx/react": "^21.0.0"
  }
}
"#;

const LIB: &str = r#"{
  "name": "@acme/lib",
  "peerDependencies": {
    "@nx/devkit": "^20.0.0 || ^21.0.0",
    "@nx/eslint": "~21.0.0"
  }
}
"#;

const UNRELATED: &str = r#"{
  "name": "@acme/util",
  "dependencies": {
    "lodash": "^4.17.21"
  }
}
"#;

fn setup_workspace() -> anyhow::Result<TempDir> {
    let dir = TempDir::new()?;
    for (relative, content) in [
        ("packages/app/package.json", APP),
        ("packages/lib/package.json", LIB),
        ("packages/util/package.json", UNRELATED),
        ("packages/app/node_modules/@nx/react/package.json", APP),
    ] {
        let path = dir.path().join(relative);
        fs::create_dir_all(path.parent().ok_or_else(|| anyhow::anyhow!("no parent"))?)?;
        fs::write(path, content)?;
    }
    Ok(dir)
}

fn read(root: &Path, relative: &str) -> anyhow::Result<String> {
    Ok(fs::read_to_string(root.join(relative))?)
}

#[test]
fn rewrite_updates_matching_manifests_in_place() -> anyhow::Result<()> {
    let dir = setup_workspace()?;
    let matcher = PackageMatcher::for_package("nx")?;
    let target = Version::parse("22.0.0")?;

    let rewrites = rewrite_manifests(dir.path(), &["packages/**/package.json"], &matcher, &target)?;

    let paths: Vec<_> = rewrites.iter().map(|r| r.path.clone()).collect();
    assert_eq!(
        paths,
        vec![
            Path::new("packages/app/package.json").to_path_buf(),
            Path::new("packages/lib/package.json").to_path_buf(),
        ]
    );

    let app = read(dir.path(), "packages/app/package.json")?;
    assert!(app.contains(r#""nx": "22.0.0""#));
    assert!(app.contains(r#""@nx/react": "^22.0.0""#));

    let lib = read(dir.path(), "packages/lib/package.json")?;
    assert!(lib.contains(r#""@nx/devkit": "^20.0.0 || ^21.0.0 || ^22.0.0""#));
    assert!(lib.contains(r#""@nx/eslint": "~21.0.0""#));

    assert_eq!(read(dir.path(), "packages/util/package.json")?, UNRELATED);
    assert_eq!(
        read(dir.path(), "packages/app/node_modules/@nx/react/package.json")?,
        APP
    );
    Ok(())
}

#[test]
fn second_rewrite_changes_nothing() -> anyhow::Result<()> {
    let dir = setup_workspace()?;
    let matcher = PackageMatcher::for_package("nx")?;
    let target = Version::parse("22.0.0")?;
    let patterns = ["packages/**/package.json"];

    rewrite_manifests(dir.path(), &patterns, &matcher, &target)?;
    let again = rewrite_manifests(dir.path(), &patterns, &matcher, &target)?;

    assert!(again.is_empty());
    Ok(())
}

#[test]
fn plan_reports_without_writing() -> anyhow::Result<()> {
    let dir = setup_workspace()?;
    let matcher = PackageMatcher::for_package("nx")?;
    let target = Version::parse("22.0.0")?;

    let planned =
        plan_manifest_rewrites(dir.path(), &["packages/**/package.json"], &matcher, &target)?;

    assert_eq!(planned.len(), 2);
    assert_eq!(planned[0].changes.len(), 2);
    assert_eq!(planned[1].changes.len(), 1);
    assert_eq!(read(dir.path(), "packages/app/package.json")?, APP);
    assert_eq!(read(dir.path(), "packages/lib/package.json")?, LIB);
    Ok(())
}
