//! The UI state machine: `Idle -> Loading -> Success | Error -> Idle`.
use crate::{
    artifact::{GeneratedArtifact, GenerationRequest},
    errors::{GenerationError, ShellError},
};
use serde::Serialize;
use std::fmt;
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum GenerationState {
    Idle,
    Loading,
    Success { artifact: GeneratedArtifact },
    Error { message: String },
}

impl GenerationState {
    #[must_use]
    pub fn kind(&self) -> StatusKind {
        match self {
            Self::Idle => StatusKind::Idle,
            Self::Loading => StatusKind::Loading,
            Self::Success { .. } => StatusKind::Success,
            Self::Error { .. } => StatusKind::Error,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusKind {
    Idle,
    Loading,
    Success,
    Error,
}

impl fmt::Display for StatusKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Idle => "idle",
            Self::Loading => "loading",
            Self::Success => "showing a result",
            Self::Error => "showing an error",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellEvent {
    Submit,
    Retry,
}

impl fmt::Display for ShellEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Submit => "submit a prompt",
            Self::Retry => "retry",
        })
    }
}

/// Identifies one submission. Outcomes carrying an outdated ticket are
/// dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

/// An accepted submission: the caller runs the request and reports back with
/// [`Shell::resolve`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub ticket: Ticket,
    pub request: GenerationRequest,
}

/// Owns the single [`GenerationState`] of a session, plus the prompt the form
/// should show again while that prompt is loading or has failed.
#[derive(Debug)]
pub struct Shell {
    state: GenerationState,
    generation: u64,
    draft: Option<String>,
}

impl Default for Shell {
    fn default() -> Self {
        Self {
            state: GenerationState::Idle,
            generation: 0,
            draft: None,
        }
    }
}

impl Shell {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn state(&self) -> &GenerationState {
        &self.state
    }

    /// The last submitted prompt, as typed. Cleared when a result is
    /// dismissed.
    #[must_use]
    pub fn draft(&self) -> Option<&str> {
        self.draft.as_deref()
    }

    #[must_use]
    pub fn artifact(&self) -> Option<&GeneratedArtifact> {
        match &self.state {
            GenerationState::Success { artifact } => Some(artifact),
            _ => None,
        }
    }

    /// The prompt form accepts input only while idle or showing an error.
    #[must_use]
    pub fn can_submit(&self) -> bool {
        matches!(
            self.state,
            GenerationState::Idle | GenerationState::Error { .. }
        )
    }

    /// Start a generation. A blank prompt is ignored and returns `Ok(None)`
    /// without touching the state.
    pub fn submit(&mut self, prompt: &str) -> Result<Option<Submission>, ShellError> {
        let Some(request) = GenerationRequest::new(prompt) else {
            debug!("ignoring blank prompt");
            return Ok(None);
        };
        if !self.can_submit() {
            return Err(ShellError::InvalidTransition {
                state: self.state.kind(),
                event: ShellEvent::Submit,
            });
        }

        self.generation += 1;
        self.state = GenerationState::Loading;
        self.draft = Some(prompt.to_string());
        info!(
            ticket = self.generation,
            prompt_chars = request.prompt().chars().count(),
            "submission accepted"
        );

        Ok(Some(Submission {
            ticket: Ticket(self.generation),
            request,
        }))
    }

    /// Apply the outcome of a submission. Returns `false` when the outcome is
    /// stale (the shell was reset or resubmitted since) and was dropped.
    pub fn resolve(
        &mut self,
        ticket: Ticket,
        outcome: Result<GeneratedArtifact, GenerationError>,
    ) -> bool {
        if ticket.0 != self.generation || self.state != GenerationState::Loading {
            debug!(ticket = ticket.0, current = self.generation, "discarding stale result");
            return false;
        }

        self.state = match outcome {
            Ok(artifact) => GenerationState::Success { artifact },
            Err(err) => GenerationState::Error {
                message: err.user_message(),
            },
        };
        true
    }

    /// Back to idle from any state. An in-flight request keeps running but
    /// its outcome will be discarded. Leaving a result also drops the draft so
    /// the form starts fresh.
    pub fn reset(&mut self) {
        match self.state {
            GenerationState::Loading => {
                debug!(ticket = self.generation, "abandoning in-flight generation");
            }
            GenerationState::Success { .. } => self.draft = None,
            GenerationState::Idle | GenerationState::Error { .. } => {}
        }
        self.generation += 1;
        self.state = GenerationState::Idle;
    }

    /// Dismiss an error so the user can try again.
    pub fn retry(&mut self) -> Result<(), ShellError> {
        match self.state {
            GenerationState::Error { .. } => {
                self.state = GenerationState::Idle;
                Ok(())
            }
            _ => Err(ShellError::InvalidTransition {
                state: self.state.kind(),
                event: ShellEvent::Retry,
            }),
        }
    }
}
