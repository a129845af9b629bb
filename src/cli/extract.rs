//! Extract command: a dry look at what the matcher finds.

use anyhow::Result;
use clap::Parser;

use crate::issues::IssueMatcher;

/// Extract command options.
#[derive(Parser)]
pub struct ExtractCommand {
    /// Only match these team keys; repeatable. Any team when omitted.
    #[arg(long = "team-key", value_name = "KEY")]
    pub team_keys: Vec<String>,

    /// Branch names or commit messages to search.
    #[arg(required = true, value_name = "TEXT")]
    pub texts: Vec<String>,
}

impl ExtractCommand {
    /// Executes the extract command.
    pub fn execute(self) -> Result<()> {
        let matcher = IssueMatcher::new(Some(self.team_keys.as_slice()))?;
        for id in matcher.extract_all(self.texts.iter().map(String::as_str)) {
            println!("{id}");
        }
        Ok(())
    }
}
