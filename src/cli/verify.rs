//! Verify command.

use anyhow::Result;
use clap::Parser;

use super::ConfigArgs;
use crate::release::verify_conditions;

/// Verify command options.
#[derive(Parser)]
pub struct VerifyCommand {
    /// Config selection.
    #[command(flatten)]
    pub config: ConfigArgs,
}

impl VerifyCommand {
    /// Executes the verify command.
    pub async fn execute(self) -> Result<()> {
        let config = self.config.load()?;
        let context = verify_conditions(&config).await?;

        match &context.team_keys {
            Some(keys) => println!("Linear access verified for teams: {}", keys.join(", ")),
            None => println!("Linear access verified for all teams"),
        }
        Ok(())
    }
}
