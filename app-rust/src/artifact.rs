use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A prompt that passed local validation and may be sent to the model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    prompt: String,
}

impl GenerationRequest {
    /// Returns `None` for an empty or whitespace-only prompt.
    #[must_use]
    pub fn new(prompt: &str) -> Option<Self> {
        let prompt = prompt.trim();
        if prompt.is_empty() {
            None
        } else {
            Some(Self {
                prompt: prompt.to_string(),
            })
        }
    }

    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }
}

/// The three fragments exactly as the model returned them.
///
/// This is also the shape of the structured output requested from the model,
/// so deserialization fails when any of the three properties is missing or is
/// not a string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedCode {
    pub html: String,
    pub css: String,
    pub javascript: String,
}

/// The result of one successful generation. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratedArtifact {
    html: String,
    css: String,
    javascript: String,
    prompt: String,
    created_at: DateTime<Utc>,
}

impl GeneratedArtifact {
    #[must_use]
    pub fn new(code: GeneratedCode, request: &GenerationRequest, created_at: DateTime<Utc>) -> Self {
        let GeneratedCode {
            html,
            css,
            javascript,
        } = code;
        Self {
            html,
            css,
            javascript,
            prompt: request.prompt.clone(),
            created_at,
        }
    }

    #[must_use]
    pub fn html(&self) -> &str {
        &self.html
    }

    #[must_use]
    pub fn css(&self) -> &str {
        &self.css
    }

    #[must_use]
    pub fn javascript(&self) -> &str {
        &self.javascript
    }

    /// The prompt this artifact was generated from.
    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
