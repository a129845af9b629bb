//! Source branch resolution for the commits of a release.
//!
//! A [`BranchSource`] answers "which branches is this commit associated
//! with". The [`BranchResolver`] asks it about every commit concurrently,
//! unions the answers and drops trunk branches. A failed lookup only costs
//! the branches of that one commit.

use std::collections::BTreeSet;
use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;

use anyhow::{anyhow, Result};
use tracing::{debug, info, warn};

use crate::config::{BranchSourceKind, PluginConfig};
use crate::git::{GitBranchSource, GitHubRepo, SHORT_HASH_LEN};
use crate::github::{GitHubBranchSource, DEFAULT_GITHUB_API_URL};
use crate::release::CommitRef;
use crate::utils::settings::get_env_vars;

/// Branches that are never attributed as source branches.
pub const DEFAULT_SKIP_BRANCHES: &[&str] = &[
    "main",
    "master",
    "develop",
    "stable",
    "staging",
    "production",
    "HEAD",
];

/// A set of branch names.
pub type BranchSet = BTreeSet<String>;

/// Boxed future returned by [`BranchSource::branches_for_commit`].
pub type BranchFuture<'a> = Pin<Box<dyn Future<Output = Result<Vec<String>>> + Send + 'a>>;

/// Something that can tell which branches a commit belongs to.
pub trait BranchSource: Send + Sync {
    /// Returns the branches associated with the commit `hash`.
    fn branches_for_commit<'a>(&'a self, hash: &'a str) -> BranchFuture<'a>;

    /// Short name used in log messages.
    fn name(&self) -> &'static str;
}

/// Resolves the source branches of a set of commits.
pub struct BranchResolver {
    source: Box<dyn BranchSource>,
    skip_branches: Vec<String>,
}

impl BranchResolver {
    /// Creates a resolver using the default trunk deny-list.
    pub fn new(source: Box<dyn BranchSource>) -> Self {
        Self::with_skip_branches(
            source,
            DEFAULT_SKIP_BRANCHES.iter().map(|s| (*s).to_string()).collect(),
        )
    }

    /// Creates a resolver with an explicit deny-list.
    pub fn with_skip_branches(source: Box<dyn BranchSource>, skip_branches: Vec<String>) -> Self {
        Self {
            source,
            skip_branches,
        }
    }

    /// Returns the name of the underlying source.
    pub fn source_name(&self) -> &'static str {
        self.source.name()
    }

    /// Resolves the branches that contributed `commits`.
    ///
    /// Never fails: lookups that error are logged and skipped.
    pub async fn resolve(&self, commits: &[CommitRef]) -> BranchSet {
        if commits.is_empty() {
            return BranchSet::new();
        }

        let lookups = commits.iter().map(|commit| async move {
            let hash = commit.hash.as_str();
            match self.source.branches_for_commit(hash).await {
                Ok(branches) => {
                    debug!(commit = short_hash(hash), count = branches.len(), "Resolved branches");
                    branches
                }
                Err(e) => {
                    warn!(
                        commit = short_hash(hash),
                        source = self.source.name(),
                        "Failed to resolve branches for commit: {e:#}"
                    );
                    Vec::new()
                }
            }
        });

        futures::future::join_all(lookups)
            .await
            .into_iter()
            .flatten()
            .filter(|branch| !self.is_skipped(branch))
            .collect()
    }

    fn is_skipped(&self, branch: &str) -> bool {
        self.skip_branches.iter().any(|skip| skip == branch)
    }
}

/// Inputs for choosing and building a [`BranchSource`].
#[derive(Debug, Clone)]
pub struct SourceOptions {
    /// Requested backend.
    pub kind: BranchSourceKind,
    /// GitHub token, if one is available.
    pub github_token: Option<String>,
    /// GitHub API root.
    pub github_api_url: String,
    /// Repository URL reported by the orchestrator.
    pub repository_url: Option<String>,
    /// Local repository for the git backend.
    pub repository_path: PathBuf,
}

impl SourceOptions {
    /// Builds options from the plugin config and the environment.
    ///
    /// The token comes from `GITHUB_TOKEN` or `GH_TOKEN` and the API root
    /// from the config or `GITHUB_API_URL`.
    pub fn from_config(config: &PluginConfig, repository_url: Option<&str>) -> Self {
        let github_api_url = config
            .github_api_url
            .clone()
            .or_else(|| get_env_vars(&["GITHUB_API_URL"]).ok())
            .unwrap_or_else(|| DEFAULT_GITHUB_API_URL.to_string());

        Self {
            kind: config.branch_source,
            github_token: get_env_vars(&["GITHUB_TOKEN", "GH_TOKEN"]).ok(),
            github_api_url,
            repository_url: repository_url.map(str::to_string),
            repository_path: config
                .repository_path
                .clone()
                .unwrap_or_else(|| PathBuf::from(".")),
        }
    }

    fn github_repo(&self) -> Option<GitHubRepo> {
        self.repository_url.as_deref().and_then(GitHubRepo::from_url)
    }
}

/// Builds the branch source selected by `options`.
///
/// `Auto` prefers GitHub when a token is present and the repository URL is
/// a GitHub URL, and falls back to the local repository otherwise.
pub fn open_source(options: &SourceOptions) -> Result<Box<dyn BranchSource>> {
    match options.kind {
        BranchSourceKind::GitHub => open_github(options),
        BranchSourceKind::Git => open_git(options),
        BranchSourceKind::Auto => {
            if options.github_token.is_some() && options.github_repo().is_some() {
                open_github(options)
            } else {
                open_git(options)
            }
        }
    }
}

fn open_github(options: &SourceOptions) -> Result<Box<dyn BranchSource>> {
    let token = options
        .github_token
        .as_deref()
        .ok_or_else(|| anyhow!("GitHub token not found. Set GITHUB_TOKEN or GH_TOKEN"))?;
    let url = options
        .repository_url
        .as_deref()
        .ok_or_else(|| anyhow!("No repository URL available to locate the GitHub repository"))?;
    let repo = GitHubRepo::from_url(url)
        .ok_or_else(|| anyhow!("Cannot parse a GitHub repository from URL: {url}"))?;

    info!(repository = %repo, "Resolving branches through GitHub pull requests");
    Ok(Box::new(GitHubBranchSource::new(
        token,
        &options.github_api_url,
        repo,
    )?))
}

fn open_git(options: &SourceOptions) -> Result<Box<dyn BranchSource>> {
    let source = GitBranchSource::open(&options.repository_path)?;
    info!(path = %options.repository_path.display(), "Resolving branches from the local repository");
    Ok(Box::new(source))
}

fn short_hash(hash: &str) -> &str {
    hash.get(..SHORT_HASH_LEN).unwrap_or(hash)
}
