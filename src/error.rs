//! Errors that abort the release from the verification phase.

use thiserror::Error;

use crate::graphql::ApiError;

/// Fatal plugin errors, each with a stable code for the orchestrator.
#[derive(Error, Debug)]
pub enum PluginError {
    /// No API key in the config, the environment or the settings file.
    #[error("No Linear API key found")]
    MissingApiKey,

    /// A team key is not made of uppercase letters only.
    #[error("Invalid team key format")]
    InvalidTeamKey {
        /// The configured keys, as given.
        keys: Vec<String>,
    },

    /// The connection test against the Linear API failed.
    #[error("Failed to connect to Linear API")]
    Connection(#[source] ApiError),

    /// The configuration file could not be read or parsed.
    #[error("Invalid configuration in {path}: {message}")]
    InvalidConfig {
        /// Path of the offending file.
        path: String,
        /// Parser or I/O message.
        message: String,
    },
}

impl PluginError {
    /// Stable error code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingApiKey => "ENOLINEARTOKEN",
            Self::InvalidTeamKey { .. } => "EINVALIDTEAMKEY",
            Self::Connection(_) => "ELINEARCONNECTION",
            Self::InvalidConfig { .. } => "EINVALIDCONFIG",
        }
    }

    /// Longer explanation of how to fix the problem.
    pub fn details(&self) -> String {
        match self {
            Self::MissingApiKey => "Please provide a Linear API key via the plugin config \
                                   (apiKey) or the LINEAR_API_KEY environment variable."
                .to_string(),
            Self::InvalidTeamKey { keys } => format!(
                "Team keys must be uppercase letters only. Got: {}",
                keys.join(", ")
            ),
            Self::Connection(e) => format!("Could not connect to Linear API: {e}"),
            Self::InvalidConfig { message, .. } => message.clone(),
        }
    }
}
