//! Branches command.

use anyhow::{Context, Result};
use clap::Parser;

use super::ConfigArgs;
use crate::branches::{open_source, BranchResolver, SourceOptions};
use crate::release::CommitRef;

/// Branches command options.
#[derive(Parser)]
pub struct BranchesCommand {
    /// Config selection.
    #[command(flatten)]
    pub config: ConfigArgs,

    /// Repository URL used to locate the GitHub repository.
    #[arg(long, value_name = "URL")]
    pub repository_url: Option<String>,

    /// Commit hashes to resolve.
    #[arg(required = true, value_name = "HASH")]
    pub commits: Vec<String>,
}

impl BranchesCommand {
    /// Executes the branches command.
    pub async fn execute(self) -> Result<()> {
        let config = self.config.load()?;
        let options = SourceOptions::from_config(&config, self.repository_url.as_deref());
        let source = open_source(&options).context("Failed to set up a branch source")?;
        let resolver = BranchResolver::with_skip_branches(source, config.skip_branches());

        let commits: Vec<CommitRef> = self.commits.into_iter().map(CommitRef::new).collect();
        for branch in resolver.resolve(&commits).await {
            println!("{branch}");
        }
        Ok(())
    }
}
