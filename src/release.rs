//! Release lifecycle: data supplied by the orchestrator and the two phases.

pub mod comment;
pub mod success;
pub mod verify;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub use success::{
    collect_issue_ids, success, IssueUpdateResult, Outcome, SuccessOptions, UpdateSummary,
};
pub use verify::{verify_conditions, verify_with, LinearContext};

/// A commit of the release, as reported by the orchestrator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitRef {
    /// Full commit hash.
    pub hash: String,
    /// Full commit message.
    #[serde(default)]
    pub message: Option<String>,
    /// Commit body, when reported separately.
    #[serde(default)]
    pub body: Option<String>,
}

impl CommitRef {
    /// Creates a reference with only a hash.
    pub fn new(hash: impl Into<String>) -> Self {
        Self {
            hash: hash.into(),
            message: None,
            body: None,
        }
    }

    /// Sets the commit message.
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Message and body texts, skipping missing ones.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.message
            .as_deref()
            .into_iter()
            .chain(self.body.as_deref())
    }
}

/// Kind of version bump, as computed by the orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseType {
    /// Breaking change.
    Major,
    /// Pre-release of a major.
    Premajor,
    /// New feature.
    Minor,
    /// Pre-release of a minor.
    Preminor,
    /// Fix.
    Patch,
    /// Pre-release of a patch.
    Prepatch,
    /// Further pre-release.
    Prerelease,
}

impl FromStr for ReleaseType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "major" => Ok(Self::Major),
            "premajor" => Ok(Self::Premajor),
            "minor" => Ok(Self::Minor),
            "preminor" => Ok(Self::Preminor),
            "patch" => Ok(Self::Patch),
            "prepatch" => Ok(Self::Prepatch),
            "prerelease" => Ok(Self::Prerelease),
            other => Err(format!("unknown release type: {other}")),
        }
    }
}

impl fmt::Display for ReleaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Major => "major",
            Self::Premajor => "premajor",
            Self::Minor => "minor",
            Self::Preminor => "preminor",
            Self::Patch => "patch",
            Self::Prepatch => "prepatch",
            Self::Prerelease => "prerelease",
        };
        f.write_str(name)
    }
}

/// The release being published.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NextRelease {
    /// Version without prefix, e.g. `1.4.0`.
    pub version: String,
    /// Distribution channel; `None` means `latest`.
    #[serde(default)]
    pub channel: Option<String>,
    /// Release type string (`major`, `minor`, ...).
    #[serde(rename = "type", default)]
    pub release_type: Option<String>,
    /// Git tag created for the release.
    #[serde(default)]
    pub git_tag: Option<String>,
}

impl NextRelease {
    /// Channel name, defaulting to `latest`.
    pub fn channel(&self) -> &str {
        self.channel
            .as_deref()
            .filter(|c| !c.is_empty())
            .unwrap_or("latest")
    }

    /// Parsed release type; `None` for unknown or missing types.
    pub fn release_type(&self) -> Option<ReleaseType> {
        self.release_type.as_deref().and_then(|t| t.parse().ok())
    }
}

/// Everything the success phase receives from the orchestrator.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuccessContext {
    /// Commits included in the release.
    #[serde(default)]
    pub commits: Vec<CommitRef>,
    /// The release itself.
    pub next_release: NextRelease,
    /// Repository URL, used to locate the repository on the code host.
    #[serde(default)]
    pub repository_url: Option<String>,
}
