use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use semver::Version;
use upgrade_core::Identity;
use upgrade_git::{CommitInfo, GitError, TreeFingerprint};
use upgrade_manifest::{ManifestRewrite, PackageMatcher, SpecifierChange};

use crate::traits::{
    CodeHost, GitProvider, ManifestRewriter, PackageRegistry, PullRequest, RepositoryInfo,
    Toolchain,
};
use crate::{OperationError, Result};

pub struct MockRegistry {
    installed: String,
    latest: String,
    unreachable: bool,
    lookups: Mutex<Vec<String>>,
}

impl MockRegistry {
    #[must_use]
    pub fn new(installed: &str, latest: &str) -> Self {
        Self {
            installed: installed.to_string(),
            latest: latest.to_string(),
            unreachable: false,
            lookups: Mutex::new(Vec::new()),
        }
    }

    #[must_use]
    pub fn unreachable(mut self) -> Self {
        self.unreachable = true;
        self
    }

    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn lookups(&self) -> Vec<String> {
        self.lookups.lock().expect("lock poisoned").clone()
    }
}

impl PackageRegistry for MockRegistry {
    fn installed_version(&self, _root: &Path, package: &str) -> Result<String> {
        self.lookups
            .lock()
            .expect("lock poisoned")
            .push(format!("installed {package}"));
        Ok(self.installed.clone())
    }

    fn latest_version(&self, package: &str) -> Result<String> {
        self.lookups
            .lock()
            .expect("lock poisoned")
            .push(format!("latest {package}"));
        if self.unreachable {
            return Err(OperationError::HttpStatus {
                url: format!("https://registry.npmjs.org/{package}/latest"),
                status: 503,
                body: String::new(),
            });
        }
        Ok(self.latest.clone())
    }
}

/// In-memory git double. Remote branches map to `(head, tree)` pairs.
pub struct MockGitProvider {
    remote_branches: HashMap<String, (String, String)>,
    staged_tree: String,
    reject_push: bool,
    calls: Mutex<Vec<String>>,
    commits: Mutex<Vec<(String, String, String)>>,
    pushes: Mutex<Vec<(String, Option<String>)>>,
}

impl MockGitProvider {
    #[must_use]
    pub fn new() -> Self {
        let mut remote_branches = HashMap::new();
        remote_branches.insert(
            "main".to_string(),
            ("trunk-head".to_string(), "trunk-tree".to_string()),
        );
        Self {
            remote_branches,
            staged_tree: "migrated-tree".to_string(),
            reject_push: false,
            calls: Mutex::new(Vec::new()),
            commits: Mutex::new(Vec::new()),
            pushes: Mutex::new(Vec::new()),
        }
    }

    #[must_use]
    pub fn with_remote_branch(mut self, branch: &str, head: &str, tree: &str) -> Self {
        self.remote_branches
            .insert(branch.to_string(), (head.to_string(), tree.to_string()));
        self
    }

    #[must_use]
    pub fn with_staged_tree(mut self, tree: &str) -> Self {
        self.staged_tree = tree.to_string();
        self
    }

    #[must_use]
    pub fn rejecting_push(mut self) -> Self {
        self.reject_push = true;
        self
    }

    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("lock poisoned").clone()
    }

    /// `(message, author, committer)` per commit.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn commits(&self) -> Vec<(String, String, String)> {
        self.commits.lock().expect("lock poisoned").clone()
    }

    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn pushes(&self) -> Vec<(String, Option<String>)> {
        self.pushes.lock().expect("lock poisoned").clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().expect("lock poisoned").push(call);
    }
}

impl Default for MockGitProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl GitProvider for MockGitProvider {
    fn fetch_branch(&self, _root: &Path, remote: &str, branch: &str) -> Result<String> {
        self.record(format!("fetch {remote}/{branch}"));
        self.remote_branches
            .get(branch)
            .map(|(head, _)| head.clone())
            .ok_or_else(|| {
                GitError::RefNotFound {
                    refspec: format!("refs/heads/{branch}"),
                }
                .into()
            })
    }

    fn checkout_fresh_branch(&self, _root: &Path, branch: &str, start: &str) -> Result<()> {
        self.record(format!("checkout {branch} at {start}"));
        Ok(())
    }

    fn stage_all(&self, _root: &Path) -> Result<TreeFingerprint> {
        self.record("stage".to_string());
        Ok(TreeFingerprint::from(self.staged_tree.as_str()))
    }

    fn remote_branch_head(
        &self,
        _root: &Path,
        remote: &str,
        branch: &str,
    ) -> Result<Option<String>> {
        self.record(format!("ls-remote {remote}/{branch}"));
        Ok(self.remote_branches.get(branch).map(|(head, _)| head.clone()))
    }

    fn tree_fingerprint(&self, _root: &Path, refspec: &str) -> Result<TreeFingerprint> {
        self.record(format!("tree {refspec}"));
        self.remote_branches
            .iter()
            .find(|(branch, _)| refspec.ends_with(&format!("/{branch}")))
            .map(|(_, (_, tree))| TreeFingerprint::from(tree.as_str()))
            .ok_or_else(|| {
                GitError::RefNotFound {
                    refspec: refspec.to_string(),
                }
                .into()
            })
    }

    fn commit(
        &self,
        _root: &Path,
        message: &str,
        author: &Identity,
        committer: &Identity,
    ) -> Result<CommitInfo> {
        self.record("commit".to_string());
        self.commits.lock().expect("lock poisoned").push((
            message.to_string(),
            author.to_string(),
            committer.to_string(),
        ));
        Ok(CommitInfo {
            sha: "abc123def456".to_string(),
            message: message.to_string(),
        })
    }

    fn push_branch(
        &self,
        _root: &Path,
        remote: &str,
        branch: &str,
        expected_remote_head: Option<&str>,
    ) -> Result<()> {
        self.record(format!("push {remote}/{branch}"));
        if self.reject_push {
            return Err(GitError::LeaseRejected {
                branch: branch.to_string(),
                expected: expected_remote_head.map(String::from),
                actual: "someone-else".to_string(),
            }
            .into());
        }
        self.pushes
            .lock()
            .expect("lock poisoned")
            .push((branch.to_string(), expected_remote_head.map(String::from)));
        Ok(())
    }

    fn reset_hard(&self, _root: &Path) -> Result<()> {
        self.record("reset".to_string());
        Ok(())
    }

    fn delete_branch(&self, _root: &Path, branch: &str) -> Result<bool> {
        self.record(format!("delete {branch}"));
        Ok(true)
    }

    fn delete_remote_branch(&self, _root: &Path, remote: &str, branch: &str) -> Result<()> {
        self.record(format!("delete {remote}/{branch}"));
        Ok(())
    }

    fn remote_url(&self, _root: &Path, _remote: &str) -> Result<Option<String>> {
        Ok(Some("https://github.com/acme/web.git".to_string()))
    }
}

/// Code host double holding open pull requests in memory.
pub struct MockCodeHost {
    repository: RepositoryInfo,
    open: Mutex<Vec<PullRequest>>,
    comments: Mutex<HashMap<u64, Vec<String>>>,
    next_number: Mutex<u64>,
    calls: Mutex<Vec<String>>,
    labels: Mutex<Vec<(u64, Vec<String>)>>,
    assignees: Mutex<Vec<(u64, Vec<String>)>>,
    auto_merged: Mutex<Vec<u64>>,
    closed: Mutex<Vec<u64>>,
}

impl MockCodeHost {
    #[must_use]
    pub fn new() -> Self {
        Self {
            repository: RepositoryInfo {
                default_branch: "main".to_string(),
                allow_auto_merge: true,
            },
            open: Mutex::new(Vec::new()),
            comments: Mutex::new(HashMap::new()),
            next_number: Mutex::new(100),
            calls: Mutex::new(Vec::new()),
            labels: Mutex::new(Vec::new()),
            assignees: Mutex::new(Vec::new()),
            auto_merged: Mutex::new(Vec::new()),
            closed: Mutex::new(Vec::new()),
        }
    }

    #[must_use]
    pub fn with_default_branch(mut self, branch: &str) -> Self {
        self.repository.default_branch = branch.to_string();
        self
    }

    #[must_use]
    pub fn disallowing_auto_merge(mut self) -> Self {
        self.repository.allow_auto_merge = false;
        self
    }

    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn with_open_pull_request(self, number: u64, branch: &str, labels: &[&str]) -> Self {
        self.open.lock().expect("lock poisoned").push(PullRequest {
            number,
            node_id: format!("PR_{number}"),
            title: format!("Existing #{number}"),
            head_branch: branch.to_string(),
            labels: labels.iter().map(ToString::to_string).collect(),
        });
        self
    }

    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn with_comment(self, number: u64, body: &str) -> Self {
        self.comments
            .lock()
            .expect("lock poisoned")
            .entry(number)
            .or_default()
            .push(body.to_string());
        self
    }

    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("lock poisoned").clone()
    }

    /// Calls other than reads.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn mutations(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|c| !c.starts_with("get ") && !c.starts_with("list ") && !c.starts_with("find "))
            .collect()
    }

    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn open_pull_requests(&self) -> Vec<PullRequest> {
        self.open.lock().expect("lock poisoned").clone()
    }

    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn comments_on(&self, number: u64) -> Vec<String> {
        self.comments
            .lock()
            .expect("lock poisoned")
            .get(&number)
            .cloned()
            .unwrap_or_default()
    }

    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn labels_added(&self) -> Vec<(u64, Vec<String>)> {
        self.labels.lock().expect("lock poisoned").clone()
    }

    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn assignees_added(&self) -> Vec<(u64, Vec<String>)> {
        self.assignees.lock().expect("lock poisoned").clone()
    }

    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn auto_merged(&self) -> Vec<u64> {
        self.auto_merged.lock().expect("lock poisoned").clone()
    }

    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn closed(&self) -> Vec<u64> {
        self.closed.lock().expect("lock poisoned").clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().expect("lock poisoned").push(call);
    }
}

impl Default for MockCodeHost {
    fn default() -> Self {
        Self::new()
    }
}

impl CodeHost for MockCodeHost {
    fn repository(&self) -> Result<RepositoryInfo> {
        self.record("get repository".to_string());
        Ok(self.repository.clone())
    }

    fn find_open_pull_request(&self, head_branch: &str) -> Result<Option<PullRequest>> {
        self.record(format!("find {head_branch}"));
        Ok(self
            .open
            .lock()
            .expect("lock poisoned")
            .iter()
            .find(|pr| pr.head_branch == head_branch)
            .cloned())
    }

    fn list_open_pull_requests(&self) -> Result<Vec<PullRequest>> {
        self.record("list pulls".to_string());
        Ok(self.open_pull_requests())
    }

    fn create_pull_request(
        &self,
        title: &str,
        _body: &str,
        head_branch: &str,
        base_branch: &str,
    ) -> Result<PullRequest> {
        self.record(format!("create {head_branch} -> {base_branch}"));
        let number = {
            let mut next = self.next_number.lock().expect("lock poisoned");
            *next += 1;
            *next
        };
        let pr = PullRequest {
            number,
            node_id: format!("PR_{number}"),
            title: title.to_string(),
            head_branch: head_branch.to_string(),
            labels: Vec::new(),
        };
        self.open.lock().expect("lock poisoned").push(pr.clone());
        Ok(pr)
    }

    fn update_pull_request(&self, number: u64, title: &str, _body: &str) -> Result<()> {
        self.record(format!("update #{number}"));
        if let Some(pr) = self
            .open
            .lock()
            .expect("lock poisoned")
            .iter_mut()
            .find(|pr| pr.number == number)
        {
            pr.title = title.to_string();
        }
        Ok(())
    }

    fn close_pull_request(&self, number: u64) -> Result<()> {
        self.record(format!("close #{number}"));
        self.open
            .lock()
            .expect("lock poisoned")
            .retain(|pr| pr.number != number);
        self.closed.lock().expect("lock poisoned").push(number);
        Ok(())
    }

    fn list_comments(&self, number: u64) -> Result<Vec<String>> {
        self.record(format!("list comments #{number}"));
        Ok(self.comments_on(number))
    }

    fn create_comment(&self, number: u64, body: &str) -> Result<()> {
        self.record(format!("comment #{number}"));
        self.comments
            .lock()
            .expect("lock poisoned")
            .entry(number)
            .or_default()
            .push(body.to_string());
        Ok(())
    }

    fn add_labels(&self, number: u64, labels: &[String]) -> Result<()> {
        self.record(format!("label #{number}"));
        if let Some(pr) = self
            .open
            .lock()
            .expect("lock poisoned")
            .iter_mut()
            .find(|pr| pr.number == number)
        {
            for label in labels {
                if !pr.has_label(label) {
                    pr.labels.push(label.clone());
                }
            }
        }
        self.labels
            .lock()
            .expect("lock poisoned")
            .push((number, labels.to_vec()));
        Ok(())
    }

    fn add_assignees(&self, number: u64, assignees: &[String]) -> Result<()> {
        self.record(format!("assign #{number}"));
        self.assignees
            .lock()
            .expect("lock poisoned")
            .push((number, assignees.to_vec()));
        Ok(())
    }

    fn enable_auto_merge(&self, pull_request: &PullRequest) -> Result<()> {
        self.record(format!("auto-merge #{}", pull_request.number));
        self.auto_merged
            .lock()
            .expect("lock poisoned")
            .push(pull_request.number);
        Ok(())
    }
}

pub struct MockToolchain {
    tests_pass: bool,
    e2e_pass: bool,
    fail_migrate: bool,
    fail_tests_to_start: bool,
    migrations_file: Option<String>,
    calls: Mutex<Vec<String>>,
}

impl MockToolchain {
    #[must_use]
    pub fn new() -> Self {
        Self {
            tests_pass: true,
            e2e_pass: true,
            fail_migrate: false,
            fail_tests_to_start: false,
            migrations_file: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    #[must_use]
    pub fn with_results(mut self, tests_pass: bool, e2e_pass: bool) -> Self {
        self.tests_pass = tests_pass;
        self.e2e_pass = e2e_pass;
        self
    }

    #[must_use]
    pub fn failing_migrate(mut self) -> Self {
        self.fail_migrate = true;
        self
    }

    #[must_use]
    pub fn unable_to_start_tests(mut self) -> Self {
        self.fail_tests_to_start = true;
        self
    }

    /// Makes `migrate` generate a migrations manifest named `file` in the root.
    #[must_use]
    pub fn generating_migrations(mut self, file: &str) -> Self {
        self.migrations_file = Some(file.to_string());
        self
    }

    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("lock poisoned").clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().expect("lock poisoned").push(call);
    }
}

impl Default for MockToolchain {
    fn default() -> Self {
        Self::new()
    }
}

impl Toolchain for MockToolchain {
    fn migrate(&self, root: &Path, package: &str, version: &Version) -> Result<()> {
        self.record(format!("migrate {package}@{version}"));
        if self.fail_migrate {
            return Err(OperationError::CommandFailed {
                command: format!("npx nx migrate {package}@{version}"),
                status: "exit status: 1".to_string(),
            });
        }
        if let Some(file) = &self.migrations_file {
            fs::write(root.join(file), "{\"migrations\": []}").map_err(|source| {
                OperationError::CommandSpawn {
                    command: "mock migrate".to_string(),
                    source,
                }
            })?;
        }
        Ok(())
    }

    fn add_package(&self, _root: &Path, package: &str, version: &Version) -> Result<()> {
        self.record(format!("add {package}@{version}"));
        Ok(())
    }

    fn install(&self, _root: &Path) -> Result<()> {
        self.record("install".to_string());
        Ok(())
    }

    fn run_migrations(&self, _root: &Path, manifest: &Path) -> Result<()> {
        let name = manifest
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.record(format!("run-migrations {name}"));
        Ok(())
    }

    fn run_tests(&self, _root: &Path) -> Result<bool> {
        self.record("tests".to_string());
        if self.fail_tests_to_start {
            return Err(OperationError::CommandSpawn {
                command: "npx nx run-many -t lint test build".to_string(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "npx not found"),
            });
        }
        Ok(self.tests_pass)
    }

    fn run_e2e(&self, _root: &Path) -> Result<bool> {
        self.record("e2e".to_string());
        Ok(self.e2e_pass)
    }
}

pub struct MockManifestRewriter {
    rewrites: Vec<ManifestRewrite>,
    written: Mutex<Vec<Version>>,
    planned: Mutex<Vec<Version>>,
}

impl MockManifestRewriter {
    #[must_use]
    pub fn new() -> Self {
        Self {
            rewrites: vec![ManifestRewrite {
                path: PathBuf::from("packages/app/package.json"),
                changes: vec![SpecifierChange {
                    package: "nx".to_string(),
                    from: "21.2.3".to_string(),
                    to: "22.0.0".to_string(),
                }],
            }],
            written: Mutex::new(Vec::new()),
            planned: Mutex::new(Vec::new()),
        }
    }

    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn written(&self) -> Vec<Version> {
        self.written.lock().expect("lock poisoned").clone()
    }

    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn planned(&self) -> Vec<Version> {
        self.planned.lock().expect("lock poisoned").clone()
    }
}

impl Default for MockManifestRewriter {
    fn default() -> Self {
        Self::new()
    }
}

impl ManifestRewriter for MockManifestRewriter {
    fn rewrite(
        &self,
        _root: &Path,
        _globs: &[String],
        _matcher: &PackageMatcher,
        target: &Version,
    ) -> Result<Vec<ManifestRewrite>> {
        self.written
            .lock()
            .expect("lock poisoned")
            .push(target.clone());
        Ok(self.rewrites.clone())
    }

    fn plan(
        &self,
        _root: &Path,
        _globs: &[String],
        _matcher: &PackageMatcher,
        target: &Version,
    ) -> Result<Vec<ManifestRewrite>> {
        self.planned
            .lock()
            .expect("lock poisoned")
            .push(target.clone());
        Ok(self.rewrites.clone())
    }
}
