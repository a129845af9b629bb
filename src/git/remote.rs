//! GitHub repository coordinates parsed from remote URLs.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

#[allow(clippy::unwrap_used)] // Compile-time constant regex pattern
static GITHUB_URL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"github\.com[/:](?P<owner>[^/]+)/(?P<repo>[^/?#]+)").unwrap()
});

/// Owner and name of a GitHub repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitHubRepo {
    /// User or organisation.
    pub owner: String,
    /// Repository name without `.git`.
    pub repo: String,
}

impl GitHubRepo {
    /// Parses a GitHub remote URL.
    ///
    /// Accepts `https://github.com/o/r`, `https://github.com/o/r.git`,
    /// `git@github.com:o/r.git` and `git+https://github.com/o/r.git`.
    /// Returns `None` for empty or non-GitHub URLs.
    pub fn from_url(url: &str) -> Option<Self> {
        let captures = GITHUB_URL_PATTERN.captures(url)?;
        let owner = captures.name("owner")?.as_str();
        let raw_repo = captures.name("repo")?.as_str();
        let repo = raw_repo.strip_suffix(".git").unwrap_or(raw_repo);

        if owner.is_empty() || repo.is_empty() {
            return None;
        }

        Some(Self {
            owner: owner.to_string(),
            repo: repo.to_string(),
        })
    }

    /// Parses an `owner/repo` slug such as the value of `GITHUB_REPOSITORY`.
    pub fn from_slug(slug: &str) -> Option<Self> {
        let (owner, repo) = slug.trim().split_once('/')?;
        if owner.is_empty() || repo.is_empty() || repo.contains('/') {
            return None;
        }
        Some(Self {
            owner: owner.to_string(),
            repo: repo.to_string(),
        })
    }

    /// URL of the release page for `tag`.
    pub fn release_url(&self, tag: &str) -> String {
        format!("https://github.com/{self}/releases/tag/{tag}")
    }
}

impl fmt::Display for GitHubRepo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}
