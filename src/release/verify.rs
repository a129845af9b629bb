//! Verification phase: credentials and configuration sanity.

use std::fmt;

use tracing::info;

use crate::config::PluginConfig;
use crate::error::PluginError;
use crate::linear::{IssueTracker, LinearClient, DEFAULT_LINEAR_API_URL};
use crate::utils::settings::get_env_var;

/// Validated settings handed from verification to the success phase.
#[derive(Clone, PartialEq, Eq)]
pub struct LinearContext {
    /// Linear API key.
    pub api_key: String,
    /// Team keys, `None` for every team.
    pub team_keys: Option<Vec<String>>,
    /// Prefix of version labels.
    pub label_prefix: String,
    /// Linear GraphQL endpoint.
    pub api_url: String,
}

impl fmt::Debug for LinearContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LinearContext")
            .field("api_key", &"<redacted>")
            .field("team_keys", &self.team_keys)
            .field("label_prefix", &self.label_prefix)
            .field("api_url", &self.api_url)
            .finish()
    }
}

impl LinearContext {
    /// Builds the context from config, without any network call.
    ///
    /// The config's `apiKey` wins over `env_api_key`. Team keys are checked
    /// before anything else can fail on them.
    pub fn from_config(
        config: &PluginConfig,
        env_api_key: Option<String>,
    ) -> Result<Self, PluginError> {
        let api_key = config
            .api_key
            .clone()
            .filter(|key| !key.is_empty())
            .or(env_api_key)
            .ok_or(PluginError::MissingApiKey)?;

        config.validate_team_keys()?;

        Ok(Self {
            api_key,
            team_keys: config.team_keys().map(<[String]>::to_vec),
            label_prefix: config.label_prefix().to_string(),
            api_url: config
                .linear_api_url
                .clone()
                .unwrap_or_else(|| DEFAULT_LINEAR_API_URL.to_string()),
        })
    }

    /// Creates a Linear client for this context.
    pub fn client(&self) -> Result<LinearClient, PluginError> {
        LinearClient::with_endpoint(&self.api_key, &self.api_url).map_err(PluginError::Connection)
    }
}

/// Validates the config and tests the connection with `tracker`.
pub async fn verify_with(
    context: LinearContext,
    tracker: &dyn IssueTracker,
) -> Result<LinearContext, PluginError> {
    info!("Verifying Linear API access...");
    let viewer = tracker
        .test_connection()
        .await
        .map_err(PluginError::Connection)?;
    info!(user = %viewer.name, "✓ Linear API access verified");
    Ok(context)
}

/// Runs the verification phase against the real Linear API.
///
/// The API key is taken from the config, then `LINEAR_API_KEY` (environment
/// or settings file).
pub async fn verify_conditions(config: &PluginConfig) -> Result<LinearContext, PluginError> {
    let context = LinearContext::from_config(config, get_env_var("LINEAR_API_KEY").ok())?;
    let client = context.client()?;
    verify_with(context, &client).await
}
