use crate::Result;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryInfo {
    pub default_branch: String,
    pub allow_auto_merge: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequest {
    pub number: u64,
    /// GraphQL node id, needed for auto-merge.
    pub node_id: String,
    pub title: String,
    pub head_branch: String,
    pub labels: Vec<String>,
}

impl PullRequest {
    #[must_use]
    pub fn has_label(&self, label: &str) -> bool {
        self.labels.iter().any(|l| l == label)
    }
}

/// Pull-request operations against the hosted repository.
///
/// Reads may be retried by implementations; mutations are attempted once.
pub trait CodeHost: Send + Sync {
    /// # Errors
    ///
    /// Returns an error if the repository metadata cannot be read.
    fn repository(&self) -> Result<RepositoryInfo>;

    /// # Errors
    ///
    /// Returns an error if the pull requests cannot be listed.
    fn find_open_pull_request(&self, head_branch: &str) -> Result<Option<PullRequest>>;

    /// # Errors
    ///
    /// Returns an error if the pull requests cannot be listed.
    fn list_open_pull_requests(&self) -> Result<Vec<PullRequest>>;

    /// # Errors
    ///
    /// Returns an error if the pull request cannot be created.
    fn create_pull_request(
        &self,
        title: &str,
        body: &str,
        head_branch: &str,
        base_branch: &str,
    ) -> Result<PullRequest>;

    /// # Errors
    ///
    /// Returns an error if the pull request cannot be updated.
    fn update_pull_request(&self, number: u64, title: &str, body: &str) -> Result<()>;

    /// # Errors
    ///
    /// Returns an error if the pull request cannot be closed.
    fn close_pull_request(&self, number: u64) -> Result<()>;

    /// Bodies of every comment on the pull request, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the comments cannot be listed.
    fn list_comments(&self, number: u64) -> Result<Vec<String>>;

    /// # Errors
    ///
    /// Returns an error if the comment cannot be posted.
    fn create_comment(&self, number: u64, body: &str) -> Result<()>;

    /// # Errors
    ///
    /// Returns an error if the labels cannot be added.
    fn add_labels(&self, number: u64, labels: &[String]) -> Result<()>;

    /// # Errors
    ///
    /// Returns an error if the assignees cannot be added.
    fn add_assignees(&self, number: u64, assignees: &[String]) -> Result<()>;

    /// # Errors
    ///
    /// Returns an error if auto-merge cannot be enabled.
    fn enable_auto_merge(&self, pull_request: &PullRequest) -> Result<()>;
}
