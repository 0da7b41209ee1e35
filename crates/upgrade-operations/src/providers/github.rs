use reqwest::Method;
use reqwest::blocking::RequestBuilder;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::debug;
use upgrade_core::{AccessToken, RepositorySlug};
use url::Url;

use crate::providers::{http_client, send};
use crate::traits::{CodeHost, PullRequest, RepositoryInfo};
use crate::{OperationError, Result, RetryPolicy};

const PER_PAGE: usize = 100;

const ENABLE_AUTO_MERGE: &str = "mutation($pullRequestId: ID!, $mergeMethod: PullRequestMergeMethod!) {
  enablePullRequestAutoMerge(input: { pullRequestId: $pullRequestId, mergeMethod: $mergeMethod }) {
    pullRequest { number }
  }
}";

#[derive(Debug, Deserialize)]
struct RepositoryResponse {
    default_branch: String,
    #[serde(default)]
    allow_auto_merge: bool,
}

#[derive(Debug, Deserialize)]
struct HeadResponse {
    #[serde(rename = "ref")]
    branch: String,
}

#[derive(Debug, Deserialize)]
struct LabelResponse {
    name: String,
}

#[derive(Debug, Deserialize)]
struct PullRequestResponse {
    number: u64,
    node_id: String,
    title: String,
    head: HeadResponse,
    #[serde(default)]
    labels: Vec<LabelResponse>,
}

impl From<PullRequestResponse> for PullRequest {
    fn from(response: PullRequestResponse) -> Self {
        Self {
            number: response.number,
            node_id: response.node_id,
            title: response.title,
            head_branch: response.head.branch,
            labels: response.labels.into_iter().map(|l| l.name).collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct CommentResponse {
    #[serde(default)]
    body: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    message: String,
}

#[derive(Debug, Deserialize)]
struct GraphQlResponse {
    #[serde(default)]
    errors: Vec<GraphQlError>,
}

fn graphql_url(api_url: &str) -> String {
    match api_url.strip_suffix("/api/v3") {
        Some(host) => format!("{host}/api/graphql"),
        None => format!("{api_url}/graphql"),
    }
}

/// GitHub REST v3 client scoped to one repository, plus the one GraphQL
/// mutation REST does not offer.
pub struct GitHubClient {
    api_url: String,
    graphql_url: String,
    repository: RepositorySlug,
    token: AccessToken,
    http: reqwest::blocking::Client,
    retry: RetryPolicy,
}

impl GitHubClient {
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(
        api_url: &Url,
        repository: RepositorySlug,
        token: AccessToken,
        timeout: std::time::Duration,
        retry: RetryPolicy,
    ) -> Result<Self> {
        let api_url = api_url.as_str().trim_end_matches('/').to_string();
        Ok(Self {
            graphql_url: graphql_url(&api_url),
            api_url,
            repository,
            token,
            http: http_client(timeout)?,
            retry,
        })
    }

    fn repo_url(&self, path: &str) -> String {
        format!(
            "{}/repos/{}/{}{path}",
            self.api_url, self.repository.owner, self.repository.name
        )
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", "2022-11-28")
            .bearer_auth(self.token.expose())
    }

    fn get_json<T: DeserializeOwned>(&self, url: &str, query: &[(&str, String)]) -> Result<T> {
        self.retry.run("GitHub read", || {
            let response = send(self.authorized(self.http.get(url).query(query)), url)?;
            response
                .json::<T>()
                .map_err(|source| OperationError::MalformedResponse {
                    url: url.to_string(),
                    source,
                })
        })
    }

    fn get_all_pages<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<Vec<T>> {
        let mut items = Vec::new();
        let mut page = 1;

        loop {
            let mut paged = query.to_vec();
            paged.push(("per_page", PER_PAGE.to_string()));
            paged.push(("page", page.to_string()));

            let batch: Vec<T> = self.get_json(url, &paged)?;
            let full_page = batch.len() >= PER_PAGE;
            items.extend(batch);

            if !full_page {
                return Ok(items);
            }
            page += 1;
        }
    }

    fn write(
        &self,
        method: Method,
        url: &str,
        body: &serde_json::Value,
    ) -> Result<reqwest::blocking::Response> {
        send(self.authorized(self.http.request(method, url)).json(body), url)
    }
}

impl CodeHost for GitHubClient {
    fn repository(&self) -> Result<RepositoryInfo> {
        let url = self.repo_url("");
        let response: RepositoryResponse = self.get_json(&url, &[])?;

        Ok(RepositoryInfo {
            default_branch: response.default_branch,
            allow_auto_merge: response.allow_auto_merge,
        })
    }

    fn find_open_pull_request(&self, head_branch: &str) -> Result<Option<PullRequest>> {
        let url = self.repo_url("/pulls");
        let query = [
            ("state", "open".to_string()),
            ("head", format!("{}:{head_branch}", self.repository.owner)),
        ];

        let pulls: Vec<PullRequestResponse> = self.get_all_pages(&url, &query)?;
        Ok(pulls.into_iter().next().map(PullRequest::from))
    }

    fn list_open_pull_requests(&self) -> Result<Vec<PullRequest>> {
        let url = self.repo_url("/pulls");
        let pulls: Vec<PullRequestResponse> =
            self.get_all_pages(&url, &[("state", "open".to_string())])?;
        Ok(pulls.into_iter().map(PullRequest::from).collect())
    }

    fn create_pull_request(
        &self,
        title: &str,
        body: &str,
        head_branch: &str,
        base_branch: &str,
    ) -> Result<PullRequest> {
        let url = self.repo_url("/pulls");
        let payload = json!({
            "title": title,
            "body": body,
            "head": head_branch,
            "base": base_branch,
        });

        let created: PullRequestResponse = self
            .write(Method::POST, &url, &payload)?
            .json()
            .map_err(|source| OperationError::MalformedResponse {
                url: url.clone(),
                source,
            })?;

        debug!(number = created.number, head_branch, base_branch, "created pull request");
        Ok(created.into())
    }

    fn update_pull_request(&self, number: u64, title: &str, body: &str) -> Result<()> {
        let url = self.repo_url(&format!("/pulls/{number}"));
        self.write(Method::PATCH, &url, &json!({ "title": title, "body": body }))?;
        Ok(())
    }

    fn close_pull_request(&self, number: u64) -> Result<()> {
        let url = self.repo_url(&format!("/pulls/{number}"));
        self.write(Method::PATCH, &url, &json!({ "state": "closed" }))?;
        Ok(())
    }

    fn list_comments(&self, number: u64) -> Result<Vec<String>> {
        let url = self.repo_url(&format!("/issues/{number}/comments"));
        let comments: Vec<CommentResponse> = self.get_all_pages(&url, &[])?;
        Ok(comments.into_iter().filter_map(|c| c.body).collect())
    }

    fn create_comment(&self, number: u64, body: &str) -> Result<()> {
        let url = self.repo_url(&format!("/issues/{number}/comments"));
        self.write(Method::POST, &url, &json!({ "body": body }))?;
        Ok(())
    }

    fn add_labels(&self, number: u64, labels: &[String]) -> Result<()> {
        let url = self.repo_url(&format!("/issues/{number}/labels"));
        self.write(Method::POST, &url, &json!({ "labels": labels }))?;
        Ok(())
    }

    fn add_assignees(&self, number: u64, assignees: &[String]) -> Result<()> {
        let url = self.repo_url(&format!("/issues/{number}/assignees"));
        self.write(Method::POST, &url, &json!({ "assignees": assignees }))?;
        Ok(())
    }

    fn enable_auto_merge(&self, pull_request: &PullRequest) -> Result<()> {
        let payload = json!({
            "query": ENABLE_AUTO_MERGE,
            "variables": {
                "pullRequestId": pull_request.node_id,
                "mergeMethod": "SQUASH",
            },
        });

        let response: GraphQlResponse = self
            .write(Method::POST, &self.graphql_url, &payload)?
            .json()
            .map_err(|source| OperationError::MalformedResponse {
                url: self.graphql_url.clone(),
                source,
            })?;

        if !response.errors.is_empty() {
            let message = response
                .errors
                .into_iter()
                .map(|e| e.message)
                .collect::<Vec<_>>()
                .join("; ");
            return Err(OperationError::GraphQl { message });
        }

        debug!(number = pull_request.number, "enabled auto-merge");
        Ok(())
    }
}
