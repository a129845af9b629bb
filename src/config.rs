//! Plugin configuration.
//!
//! The configuration mirrors the options a release orchestrator passes to
//! the plugin. It is read from a YAML or JSON file and may be empty: every
//! option has a default, and credentials normally come from the environment.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::branches::DEFAULT_SKIP_BRANCHES;
use crate::error::PluginError;

/// Config files looked up in the working directory when none is given.
pub const DEFAULT_CONFIG_FILES: &[&str] = &[
    ".linear-release.yaml",
    ".linear-release.yml",
    ".linear-release.json",
];

/// Default prefix for version labels.
pub const DEFAULT_LABEL_PREFIX: &str = "v";

/// Where issue identifiers are read from. Exactly one per run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueSource {
    /// Names of the branches that contributed the release's commits.
    #[default]
    Branch,
    /// Commit messages and bodies.
    Commit,
}

/// Which backend resolves the branches of a commit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BranchSourceKind {
    /// GitHub when a token and a GitHub repository URL are available, else git.
    #[default]
    Auto,
    /// Pull request associations from the GitHub GraphQL API.
    GitHub,
    /// Branches of the local repository.
    Git,
}

/// Options accepted by the plugin.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PluginConfig {
    /// Linear API key; `LINEAR_API_KEY` is used when absent.
    pub api_key: Option<String>,
    /// Team keys to filter issues, e.g. `["ENG", "FEAT"]`.
    pub team_keys: Vec<String>,
    /// Prefix for version labels.
    pub label_prefix: Option<String>,
    /// Remove older version labels before adding the new one.
    pub remove_old_labels: bool,
    /// Comment on each issue with the release.
    pub add_comment: bool,
    /// Log what would change without touching Linear.
    pub dry_run: bool,
    /// Branches never attributed as source branches.
    pub skip_branches: Option<Vec<String>>,
    /// Where issue identifiers are read from.
    pub issue_source: IssueSource,
    /// Backend used to resolve branches.
    pub branch_source: BranchSourceKind,
    /// Linear GraphQL endpoint override.
    pub linear_api_url: Option<String>,
    /// GitHub API root override; `GITHUB_API_URL` is used when absent.
    pub github_api_url: Option<String>,
    /// Local repository used by the git branch source.
    pub repository_path: Option<PathBuf>,
}

impl Default for PluginConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            team_keys: Vec::new(),
            label_prefix: None,
            remove_old_labels: true,
            add_comment: false,
            dry_run: false,
            skip_branches: None,
            issue_source: IssueSource::default(),
            branch_source: BranchSourceKind::default(),
            linear_api_url: None,
            github_api_url: None,
            repository_path: None,
        }
    }
}

impl PluginConfig {
    /// Loads the config from `path`, or from the first default file present.
    ///
    /// Without an explicit path and without any default file, the defaults
    /// are returned.
    pub fn load(path: Option<&Path>) -> Result<Self, PluginError> {
        if let Some(path) = path {
            return Self::load_from_path(path);
        }

        match DEFAULT_CONFIG_FILES
            .iter()
            .map(Path::new)
            .find(|candidate| candidate.exists())
        {
            Some(found) => Self::load_from_path(found),
            None => {
                debug!("No config file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Loads the config from a specific file; `.json` is JSON, anything else YAML.
    pub fn load_from_path(path: &Path) -> Result<Self, PluginError> {
        let invalid = |message: String| PluginError::InvalidConfig {
            path: path.display().to_string(),
            message,
        };

        let content = fs::read_to_string(path).map_err(|e| invalid(e.to_string()))?;
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        let config = if is_json {
            serde_json::from_str(&content).map_err(|e| invalid(e.to_string()))?
        } else if content.trim().is_empty() {
            Self::default()
        } else {
            serde_yaml::from_str(&content).map_err(|e| invalid(e.to_string()))?
        };

        debug!(path = %path.display(), "Loaded plugin config");
        Ok(config)
    }

    /// Label prefix, defaulting to `v`.
    pub fn label_prefix(&self) -> &str {
        self.label_prefix
            .as_deref()
            .filter(|prefix| !prefix.is_empty())
            .unwrap_or(DEFAULT_LABEL_PREFIX)
    }

    /// Team keys, or `None` when every team is accepted.
    pub fn team_keys(&self) -> Option<&[String]> {
        if self.team_keys.is_empty() {
            None
        } else {
            Some(self.team_keys.as_slice())
        }
    }

    /// Branches excluded from source attribution.
    pub fn skip_branches(&self) -> Vec<String> {
        self.skip_branches.clone().unwrap_or_else(|| {
            DEFAULT_SKIP_BRANCHES
                .iter()
                .map(|s| (*s).to_string())
                .collect()
        })
    }

    /// Checks that every team key is uppercase ASCII letters only.
    pub fn validate_team_keys(&self) -> Result<(), PluginError> {
        let valid = self
            .team_keys
            .iter()
            .all(|key| !key.is_empty() && key.chars().all(|c| c.is_ascii_uppercase()));

        if valid {
            Ok(())
        } else {
            Err(PluginError::InvalidTeamKey {
                keys: self.team_keys.clone(),
            })
        }
    }
}
