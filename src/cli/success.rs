//! Success command: verification followed by the labelling pass.

use std::fs;
use std::io::{self, Read};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::warn;

use super::ConfigArgs;
use crate::branches::{open_source, BranchResolver, SourceOptions};
use crate::config::{IssueSource, PluginConfig};
use crate::release::{
    success, verify_conditions, LinearContext, SuccessContext, SuccessOptions, UpdateSummary,
};

/// Success command options.
#[derive(Parser)]
pub struct SuccessCommand {
    /// Config selection.
    #[command(flatten)]
    pub config: ConfigArgs,

    /// Release context JSON (`commits`, `nextRelease`, `repositoryUrl`); `-` reads stdin.
    #[arg(long, value_name = "FILE", default_value = "-")]
    pub context: String,

    /// Logs what would change without touching Linear.
    #[arg(long)]
    pub dry_run: bool,
}

impl SuccessCommand {
    /// Executes the success command.
    pub async fn execute(self) -> Result<()> {
        let mut config = self.config.load()?;
        if self.dry_run {
            config.dry_run = true;
        }
        let release = read_context(&self.context)?;

        let summary = match verify_conditions(&config).await {
            Ok(context) => run(&context, &config, &release).await?,
            Err(e) => {
                warn!("Linear context not available, skipping issue updates: {e}");
                UpdateSummary::default()
            }
        };

        println!(
            "{}",
            serde_json::to_string_pretty(&summary).context("Failed to serialize summary")?
        );
        Ok(())
    }
}

async fn run(
    context: &LinearContext,
    config: &PluginConfig,
    release: &SuccessContext,
) -> Result<UpdateSummary> {
    let tracker = context.client()?;
    let repository_url = release.repository_url.as_deref();
    let options = SuccessOptions::from_config(config, repository_url);

    let resolver = match config.issue_source {
        IssueSource::Commit => None,
        IssueSource::Branch => {
            match open_source(&SourceOptions::from_config(config, repository_url)) {
                Ok(source) => Some(BranchResolver::with_skip_branches(
                    source,
                    config.skip_branches(),
                )),
                Err(e) => {
                    warn!("No branch source available: {e:#}");
                    None
                }
            }
        }
    };

    Ok(success(context, &options, release, &tracker, resolver.as_ref()).await)
}

fn read_context(source: &str) -> Result<SuccessContext> {
    let content = if source == "-" {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .context("Failed to read release context from stdin")?;
        buffer
    } else {
        fs::read_to_string(source)
            .with_context(|| format!("Failed to read release context: {source}"))?
    };

    serde_json::from_str(&content).context("Failed to parse release context JSON")
}
