use std::process::Command;

use chrono::Utc;

fn main() {
    println!("cargo:rerun-if-changed=../../.git/HEAD");
    println!("cargo:rerun-if-changed=../../.git/refs/");

    let version = env!("CARGO_PKG_VERSION");
    let git_hash = git_short_hash();
    let build_date = Utc::now().format("%Y-%m-%d").to_string();

    let version_string = match git_hash {
        Some(hash) if !is_release_commit(version) => format!("{version}+{hash}.{build_date}"),
        _ => version.to_owned(),
    };

    println!("cargo:rustc-env=NX_UPGRADE_VERSION={version_string}");
}

fn git_short_hash() -> Option<String> {
    let output = Command::new("git")
        .args(["rev-parse", "--short", "HEAD"])
        .output()
        .ok()?;

    output
        .status
        .success()
        .then(|| String::from_utf8(output.stdout).ok())
        .flatten()
        .map(|hash| hash.trim().to_owned())
}

fn is_release_commit(version: &str) -> bool {
    let expected_tag = format!("nx-upgrade@v{version}");

    Command::new("git")
        .args(["tag", "--points-at", "HEAD"])
        .output()
        .ok()
        .filter(|out| out.status.success())
        .is_some_and(|out| {
            String::from_utf8_lossy(&out.stdout)
                .lines()
                .any(|line| line.trim() == expected_tag)
        })
}
