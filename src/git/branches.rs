//! Branch lookup against a local repository.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use git2::{BranchType, Oid, Repository};

use crate::branches::{BranchFuture, BranchSource};

/// Finds the local and remote-tracking branches that contain a commit.
///
/// A branch contains a commit when its tip is the commit or a descendant of
/// it. Remote-tracking names are reported without the remote prefix, so
/// `origin/feature/ENG-1` becomes `feature/ENG-1`.
pub struct GitBranchSource {
    path: PathBuf,
}

impl GitBranchSource {
    /// Opens the repository at `path` once to make sure it exists.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        Repository::open(path)
            .with_context(|| format!("Not a git repository: {}", path.display()))?;
        Ok(Self {
            path: path.to_path_buf(),
        })
    }

    /// Returns the branches that contain `hash`, deduplicated.
    pub fn branches_containing(&self, hash: &str) -> Result<Vec<String>> {
        let repo = Repository::open(&self.path).context("Failed to open git repository")?;
        let commit = repo
            .revparse_single(hash)
            .with_context(|| format!("Failed to find commit: {hash}"))?
            .peel_to_commit()
            .with_context(|| format!("Not a commit: {hash}"))?;

        let mut names = Vec::new();
        for entry in repo.branches(None).context("Failed to list branches")? {
            let (branch, branch_type) = entry.context("Failed to read branch")?;
            let reference = branch.get();

            // Skip symbolic refs such as origin/HEAD
            if reference.symbolic_target().is_some() {
                continue;
            }
            let Some(tip) = reference.target() else {
                continue;
            };
            if !contains(&repo, tip, commit.id())? {
                continue;
            }
            let Some(name) = branch.name().context("Failed to read branch name")? else {
                continue;
            };

            let name = match branch_type {
                BranchType::Local => name,
                BranchType::Remote => strip_remote(name),
            };
            if !names.iter().any(|existing| existing == name) {
                names.push(name.to_string());
            }
        }

        Ok(names)
    }
}

impl BranchSource for GitBranchSource {
    fn branches_for_commit<'a>(&'a self, hash: &'a str) -> BranchFuture<'a> {
        Box::pin(async move { self.branches_containing(hash) })
    }

    fn name(&self) -> &'static str {
        "git"
    }
}

fn contains(repo: &Repository, tip: Oid, commit: Oid) -> Result<bool> {
    if tip == commit {
        return Ok(true);
    }
    repo.graph_descendant_of(tip, commit)
        .context("Failed to compare commit ancestry")
}

fn strip_remote(name: &str) -> &str {
    name.split_once('/').map_or(name, |(_, rest)| rest)
}
