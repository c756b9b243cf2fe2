use crate::composer::DEFAULT_MODEL_ID;
use std::env;
use tracing::{error, info};

pub const API_KEY_VARS: [&str; 2] = ["API_KEY", "GEMINI_API_KEY"];

/// Whether an API key was available when the process started.
#[derive(Clone, PartialEq, Eq)]
pub enum Credential {
    Present(String),
    Missing,
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Present(_) => f.write_str("Present(<redacted>)"),
            Self::Missing => f.write_str("Missing"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub credential: Credential,
    pub model_id: String,
    /// Overrides the Gemini endpoint, e.g. to point at a local proxy.
    pub base_url: Option<String>,
    pub host: String,
    pub port: u16,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            credential: Credential::Missing,
            model_id: DEFAULT_MODEL_ID.to_string(),
            base_url: None,
            host: "127.0.0.1".to_string(),
            port: 4000,
        }
    }
}

impl AppConfig {
    /// Read the configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Read the configuration through `lookup`. A missing credential is
    /// logged and recorded, never fatal.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_blank = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let defaults = Self::default();

        let credential = match API_KEY_VARS.iter().find_map(|key| non_blank(*key)) {
            Some(key) => Credential::Present(key.trim().to_string()),
            None => {
                error!(
                    "{} is missing from environment variables; generation is disabled",
                    API_KEY_VARS[0]
                );
                Credential::Missing
            }
        };

        let port = match non_blank("PORT").map(|port| port.trim().parse::<u16>()) {
            Some(Ok(port)) => port,
            Some(Err(err)) => {
                error!(%err, default = defaults.port, "invalid PORT, using default");
                defaults.port
            }
            None => defaults.port,
        };

        let config = Self {
            credential,
            model_id: non_blank("GEMINI_MODEL").unwrap_or(defaults.model_id),
            base_url: non_blank("GEMINI_BASE_URL"),
            host: non_blank("HOST").unwrap_or(defaults.host),
            port,
        };
        info!(model = %config.model_id, host = %config.host, port = config.port, "configuration loaded");
        config
    }

    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
