use std::path::Path;
use std::process::{Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use semver::Version;
use tracing::{info, warn};

use crate::traits::Toolchain;
use crate::{OperationError, PackageManager, Result};

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// How a bounded subprocess ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Completion {
    Exited(ExitStatus),
    TimedOut,
}

/// Program and arguments, kept apart for spawning and joined for messages.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Invocation {
    program: String,
    args: Vec<String>,
}

impl Invocation {
    fn new(program: &str, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            program: program.to_string(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    fn display(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Runs package-manager and framework commands as child processes of the workspace root.
pub struct ProcessToolchain {
    package_manager: PackageManager,
    framework_cli: String,
    verify_targets: Vec<String>,
    e2e_targets: Vec<String>,
    timeout: Duration,
}

impl ProcessToolchain {
    #[must_use]
    pub fn new(package_manager: PackageManager, timeout: Duration) -> Self {
        Self {
            package_manager,
            framework_cli: "nx".to_string(),
            verify_targets: vec!["lint".to_string(), "test".to_string(), "build".to_string()],
            e2e_targets: vec!["e2e".to_string()],
            timeout,
        }
    }

    #[must_use]
    pub fn with_targets(mut self, verify: Vec<String>, e2e: Vec<String>) -> Self {
        self.verify_targets = verify;
        self.e2e_targets = e2e;
        self
    }

    /// Runs the framework CLI from the workspace's installed binaries.
    fn framework(&self, args: impl IntoIterator<Item = impl Into<String>>) -> Invocation {
        let (program, mut full) = match self.package_manager {
            PackageManager::Npm => ("npx", Vec::new()),
            PackageManager::Pnpm => ("pnpm", vec!["exec".to_string()]),
            PackageManager::Yarn => ("yarn", Vec::new()),
        };
        full.push(self.framework_cli.clone());
        full.extend(args.into_iter().map(Into::into));
        Invocation::new(program, full)
    }

    fn add_invocation(&self, package: &str, version: &Version) -> Invocation {
        let spec = format!("{package}@{version}");
        match self.package_manager {
            PackageManager::Npm => Invocation::new("npm", ["install", "--save-dev", spec.as_str()]),
            PackageManager::Pnpm => Invocation::new("pnpm", ["add", "--save-dev", spec.as_str()]),
            PackageManager::Yarn => Invocation::new("yarn", ["add", "--dev", spec.as_str()]),
        }
    }

    fn install_invocation(&self) -> Invocation {
        match self.package_manager {
            PackageManager::Npm => Invocation::new("npm", ["install"]),
            PackageManager::Pnpm => Invocation::new("pnpm", ["install", "--no-frozen-lockfile"]),
            PackageManager::Yarn => Invocation::new("yarn", ["install"]),
        }
    }

    fn run_many(&self, targets: &[String]) -> Invocation {
        let mut args = vec!["run-many".to_string(), "-t".to_string()];
        args.extend(targets.iter().cloned());
        self.framework(args)
    }

    fn run_bounded(&self, root: &Path, invocation: &Invocation) -> Result<Completion> {
        let command = invocation.display();
        info!(command = %command, "running");

        let mut child = Command::new(&invocation.program)
            .args(&invocation.args)
            .current_dir(root)
            .stdin(Stdio::null())
            .spawn()
            .map_err(|source| OperationError::CommandSpawn {
                command: command.clone(),
                source,
            })?;

        let deadline = Instant::now() + self.timeout;
        loop {
            if let Some(status) = child.try_wait().map_err(|source| OperationError::CommandSpawn {
                command: command.clone(),
                source,
            })? {
                return Ok(Completion::Exited(status));
            }
            if Instant::now() >= deadline {
                let _ = child.kill();
                let _ = child.wait();
                warn!(command = %command, timeout_secs = self.timeout.as_secs(), "killed after timeout");
                return Ok(Completion::TimedOut);
            }
            thread::sleep(POLL_INTERVAL);
        }
    }

    /// A step that must succeed for the pipeline to continue.
    fn run_required(&self, root: &Path, invocation: &Invocation) -> Result<()> {
        match self.run_bounded(root, invocation)? {
            Completion::Exited(status) if status.success() => Ok(()),
            Completion::Exited(status) => Err(OperationError::CommandFailed {
                command: invocation.display(),
                status: status.to_string(),
            }),
            Completion::TimedOut => Err(OperationError::CommandTimeout {
                command: invocation.display(),
                timeout_secs: self.timeout.as_secs(),
            }),
        }
    }

    /// A suite whose failure, including a timeout, is a result rather than an error.
    fn run_suite(&self, root: &Path, invocation: &Invocation) -> Result<bool> {
        Ok(matches!(
            self.run_bounded(root, invocation)?,
            Completion::Exited(status) if status.success()
        ))
    }
}

impl Toolchain for ProcessToolchain {
    fn migrate(&self, root: &Path, package: &str, version: &Version) -> Result<()> {
        self.run_required(root, &self.framework(["migrate".to_string(), format!("{package}@{version}")]))
    }

    fn add_package(&self, root: &Path, package: &str, version: &Version) -> Result<()> {
        self.run_required(root, &self.add_invocation(package, version))
    }

    fn install(&self, root: &Path) -> Result<()> {
        self.run_required(root, &self.install_invocation())
    }

    fn run_migrations(&self, root: &Path, manifest: &Path) -> Result<()> {
        let flag = format!("--run-migrations={}", manifest.display());
        self.run_required(root, &self.framework(["migrate".to_string(), flag]))
    }

    fn run_tests(&self, root: &Path) -> Result<bool> {
        self.run_suite(root, &self.run_many(&self.verify_targets))
    }

    fn run_e2e(&self, root: &Path) -> Result<bool> {
        self.run_suite(root, &self.run_many(&self.e2e_targets))
    }
}
