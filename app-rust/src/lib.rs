mod artifact;
mod composer;
mod config;
mod errors;
mod export;
mod generator;
pub mod preview;
pub mod server;
mod shell;
mod templates;

pub use artifact::{GeneratedArtifact, GeneratedCode, GenerationRequest};
pub use composer::{code_schema, compose, instruction, DEFAULT_MODEL_ID, PERSONA, SCHEMA_NAME};
pub use config::{AppConfig, Credential};
pub use errors::{GenerationError, ServerError, ShellError};
pub use export::{download_document, raw_source, DocumentDownload};
pub use generator::CodeGenerator;
pub use shell::{GenerationState, Shell, ShellEvent, StatusKind, Submission, Ticket};
pub use templates::{PageContext, TemplateEngine, DEFAULT_PROMPT};
