//! Relay configuration.
//!
//! Settings are read from the environment at startup. The upstream API key
//! and workspace identifier are required; everything else carries a
//! documented default.

use thiserror::Error;

use crate::domain::CampaignId;

/// Default upstream API base.
pub const DEFAULT_BASE_URL: &str = "https://api.pipl.ai/api/v1";

/// Default sender identity used when the environment does not override it.
pub const DEFAULT_SENDER_EMAIL: &str = "noreply@caeros.com";
pub const DEFAULT_SENDER_NAME: &str = "Diana Moreno";

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required environment variable is absent or empty.
    #[error("missing required environment variable {0}")]
    MissingVar(&'static str),
}

/// Runtime configuration for the relay.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Upstream API key, sent as the `x-api-key` header.
    pub api_key: String,
    /// Workspace identifier attached to every upstream call.
    pub workspace_id: String,
    /// Upstream API base URL.
    pub base_url: String,
    /// Display name for outgoing mail.
    pub sender_name: String,
    /// From-address for outgoing mail.
    pub sender_email: String,
    /// Campaign new leads are enrolled into when sending a first-touch
    /// email. Optional here; its absence only errors on the send path.
    pub default_campaign_id: Option<CampaignId>,
}

impl Settings {
    /// Loads settings from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingVar`] if the API key or workspace id is
    /// absent. Optional values fall back to their documented defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_key = require_var("PIPL_API_KEY")?;
        let workspace_id = require_var("PIPL_WORKSPACE_ID")?;

        Ok(Self {
            api_key,
            workspace_id,
            base_url: optional_var("PIPL_BASE_URL")
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            sender_name: optional_var("PIPL_SENDER_NAME")
                .unwrap_or_else(|| DEFAULT_SENDER_NAME.to_string()),
            sender_email: optional_var("PIPL_SENDER_EMAIL")
                .unwrap_or_else(|| DEFAULT_SENDER_EMAIL.to_string()),
            default_campaign_id: optional_var("PIPL_DEFAULT_CAMPAIGN_ID").map(CampaignId::from),
        })
    }

    /// Returns the sender in "Name <email>" form, or the bare address when
    /// no name is configured.
    pub fn sender(&self) -> String {
        if self.sender_name.is_empty() {
            self.sender_email.clone()
        } else {
            format!("{} <{}>", self.sender_name, self.sender_email)
        }
    }
}

fn require_var(name: &'static str) -> Result<String, ConfigError> {
    optional_var(name).ok_or(ConfigError::MissingVar(name))
}

fn optional_var(name: &str) -> Option<String> {
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => Some(value),
        _ => None,
    }
}
