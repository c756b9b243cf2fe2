use crate::shell::{ShellEvent, StatusKind};
use thiserror::Error;

const GENERIC_FAILURE: &str = "Failed to generate code";

/// Why a generation attempt failed. `Display` is the message shown to the
/// user.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GenerationError {
    /// The API credential was absent at start; no request is ever sent.
    #[error("{0}")]
    Configuration(String),
    /// The endpoint could not be reached or answered with an error status.
    #[error("{0}")]
    Transport(String),
    #[error("No response received from Gemini.")]
    EmptyResponse,
    /// The response text was not the expected JSON object.
    #[error("{0}")]
    MalformedResponse(String),
    #[error("{0}")]
    Failed(String),
}

impl GenerationError {
    /// The text held in the shell's error state. Never empty.
    #[must_use]
    pub fn user_message(&self) -> String {
        let message = self.to_string();
        if message.trim().is_empty() {
            GENERIC_FAILURE.to_string()
        } else {
            message
        }
    }
}

impl From<devgen_sdk::LanguageModelError> for GenerationError {
    fn from(error: devgen_sdk::LanguageModelError) -> Self {
        use devgen_sdk::LanguageModelError;

        match error {
            LanguageModelError::Transport(error) => Self::Transport(error.to_string()),
            LanguageModelError::StatusCode(status, body) => {
                Self::Transport(status_message(status, &body))
            }
            other => Self::Failed(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for GenerationError {
    fn from(error: serde_json::Error) -> Self {
        Self::MalformedResponse(format!("Malformed response from Gemini: {error}"))
    }
}

/// Prefer the provider's own error message over the raw body.
fn status_message(status: impl std::fmt::Display, body: &str) -> String {
    let detail = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| {
            value["error"]["message"]
                .as_str()
                .map(std::string::ToString::to_string)
        })
        .unwrap_or_else(|| body.trim().to_string());

    if detail.is_empty() {
        format!("Gemini request failed with status {status}")
    } else {
        format!("Gemini request failed with status {status}: {detail}")
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ShellError {
    #[error("cannot {event} while {state}")]
    InvalidTransition { state: StatusKind, event: ShellEvent },
}

/// Failures of the HTTP server itself, not of a generation.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Template error: {0}")]
    Template(#[from] minijinja::Error),
}
