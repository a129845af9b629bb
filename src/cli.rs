//! CLI interface for linear-release.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};

use crate::config::PluginConfig;

mod branches;
mod extract;
mod success;
mod verify;

pub use branches::BranchesCommand;
pub use extract::ExtractCommand;
pub use success::SuccessCommand;
pub use verify::VerifyCommand;

/// linear-release: Labels Linear issues with the release that shipped them.
#[derive(Parser)]
#[command(name = "linear-release")]
#[command(about = "Labels Linear issues with the release that shipped them", long_about = None)]
#[command(version)]
pub struct Cli {
    /// The command to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Release lifecycle steps and diagnostics.
#[derive(Subcommand)]
pub enum Commands {
    /// Checks credentials and configuration.
    Verify(VerifyCommand),
    /// Labels the issues of a published release.
    Success(SuccessCommand),
    /// Prints the issue identifiers found in some text.
    Extract(ExtractCommand),
    /// Prints the source branches of commits.
    Branches(BranchesCommand),
}

impl Cli {
    /// Executes the CLI command.
    pub async fn execute(self) -> Result<()> {
        match self.command {
            Commands::Verify(cmd) => cmd.execute().await,
            Commands::Success(cmd) => cmd.execute().await,
            Commands::Extract(cmd) => cmd.execute(),
            Commands::Branches(cmd) => cmd.execute().await,
        }
    }
}

/// Config file selection shared by the subcommands.
#[derive(Args)]
pub struct ConfigArgs {
    /// Config file (YAML or JSON). Defaults to `.linear-release.{yaml,yml,json}`.
    #[arg(long, short, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

impl ConfigArgs {
    /// Loads the selected config.
    pub fn load(&self) -> Result<PluginConfig> {
        Ok(PluginConfig::load(self.config.as_deref())?)
    }
}
