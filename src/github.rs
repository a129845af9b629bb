//! GitHub GraphQL branch lookup.
//!
//! The source branch of a commit is the head ref of the pull requests
//! GitHub associates with it.

use anyhow::{anyhow, Result};
use serde::Deserialize;
use serde_json::json;
use tracing::debug;
use url::Url;

use crate::branches::{BranchFuture, BranchSource};
use crate::git::GitHubRepo;
use crate::graphql::GraphQlClient;

/// Public GitHub REST/GraphQL API root.
pub const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";

/// Maximum number of pull requests inspected per commit.
const MAX_PULL_REQUESTS_PER_COMMIT: u32 = 10;

const ASSOCIATED_PRS_QUERY: &str = r"
query AssociatedPullRequests($owner: String!, $name: String!, $oid: GitObjectID!, $first: Int!) {
  repository(owner: $owner, name: $name) {
    object(oid: $oid) {
      ... on Commit {
        associatedPullRequests(first: $first) {
          nodes { number headRefName }
        }
      }
    }
  }
}";

#[derive(Deserialize)]
struct AssociatedData {
    repository: Option<RepositoryNode>,
}

#[derive(Deserialize)]
struct RepositoryNode {
    object: Option<CommitNode>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CommitNode {
    associated_pull_requests: Option<PullRequestConnection>,
}

#[derive(Deserialize)]
struct PullRequestConnection {
    nodes: Vec<Option<PullRequestNode>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PullRequestNode {
    number: u64,
    head_ref_name: Option<String>,
}

/// Branch source backed by GitHub pull request associations.
pub struct GitHubBranchSource {
    graphql: GraphQlClient,
    repo: GitHubRepo,
}

impl GitHubBranchSource {
    /// Creates a source for `repo` against the API rooted at `api_url`.
    pub fn new(token: &str, api_url: &str, repo: GitHubRepo) -> Result<Self> {
        Url::parse(api_url).map_err(|e| anyhow!("Invalid GitHub API URL '{api_url}': {e}"))?;
        let endpoint = format!("{}/graphql", api_url.trim_end_matches('/'));
        let graphql = GraphQlClient::new("GitHub", endpoint, format!("Bearer {token}"))?;
        Ok(Self { graphql, repo })
    }

    /// Returns the repository this source queries.
    pub fn repo(&self) -> &GitHubRepo {
        &self.repo
    }

    /// Head branch names of the pull requests associated with `hash`.
    pub async fn associated_branches(&self, hash: &str) -> Result<Vec<String>> {
        let data: AssociatedData = self
            .graphql
            .query(
                ASSOCIATED_PRS_QUERY,
                json!({
                    "owner": self.repo.owner,
                    "name": self.repo.repo,
                    "oid": hash,
                    "first": MAX_PULL_REQUESTS_PER_COMMIT,
                }),
            )
            .await?;

        let repository = data
            .repository
            .ok_or_else(|| anyhow!("Repository {} not found", self.repo))?;
        let commit = repository
            .object
            .ok_or_else(|| anyhow!("Commit {hash} not found in {}", self.repo))?;

        let mut branches: Vec<String> = Vec::new();
        let pull_requests = commit
            .associated_pull_requests
            .map(|connection| connection.nodes)
            .unwrap_or_default();
        for pr in pull_requests.into_iter().flatten() {
            let Some(branch) = pr.head_ref_name.filter(|name| !name.is_empty()) else {
                continue;
            };
            debug!(pr = pr.number, branch = %branch, "Associated pull request");
            if !branches.contains(&branch) {
                branches.push(branch);
            }
        }

        Ok(branches)
    }
}

impl BranchSource for GitHubBranchSource {
    fn branches_for_commit<'a>(&'a self, hash: &'a str) -> BranchFuture<'a> {
        Box::pin(self.associated_branches(hash))
    }

    fn name(&self) -> &'static str {
        "github"
    }
}
