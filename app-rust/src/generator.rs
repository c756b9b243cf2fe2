use crate::{
    artifact::{GeneratedCode, GenerationRequest},
    composer,
    config::{AppConfig, API_KEY_VARS, Credential},
    errors::GenerationError,
};
use devgen_sdk::{
    google::{GoogleModel, GoogleModelOptions},
    LanguageModel, LanguageModelMetadata,
};
use std::sync::Arc;
use tracing::{debug, error, info, info_span};
use tracing_futures::Instrument;

enum Backend {
    Ready(Arc<dyn LanguageModel>),
    Unconfigured,
}

/// Sends one prompt to the model and parses the structured reply.
pub struct CodeGenerator {
    backend: Backend,
}

impl CodeGenerator {
    pub fn new(model: Arc<dyn LanguageModel>) -> Self {
        Self {
            backend: Backend::Ready(model),
        }
    }

    /// A generator whose every call fails with a configuration error.
    #[must_use]
    pub fn unconfigured() -> Self {
        Self {
            backend: Backend::Unconfigured,
        }
    }

    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        match &config.credential {
            Credential::Present(api_key) => {
                let model = GoogleModel::new(
                    config.model_id.clone(),
                    GoogleModelOptions {
                        api_key: api_key.clone(),
                        base_url: config.base_url.clone(),
                        ..Default::default()
                    },
                )
                .with_metadata(LanguageModelMetadata {
                    display_name: Some(display_name(&config.model_id)),
                });
                Self::new(Arc::new(model))
            }
            Credential::Missing => Self::unconfigured(),
        }
    }

    /// Label for the header badge, e.g. "Gemini 2.5 Flash".
    #[must_use]
    pub fn model_label(&self) -> String {
        match &self.backend {
            Backend::Ready(model) => model
                .metadata()
                .and_then(|metadata| metadata.display_name.clone())
                .unwrap_or_else(|| model.model_id()),
            Backend::Unconfigured => "Not configured".to_string(),
        }
    }

    #[must_use]
    pub fn is_configured(&self) -> bool {
        matches!(self.backend, Backend::Ready(_))
    }

    pub async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<GeneratedCode, GenerationError> {
        let Backend::Ready(model) = &self.backend else {
            return Err(GenerationError::Configuration(format!(
                "API key is missing. Set {} in the environment and restart.",
                API_KEY_VARS[0]
            )));
        };

        let span = info_span!("devgen.generate", model = %model.model_id());
        let result = request_code(model.as_ref(), request)
            .instrument(span)
            .await;

        match &result {
            Ok(code) => info!(
                html = code.html.len(),
                css = code.css.len(),
                javascript = code.javascript.len(),
                "generated code"
            ),
            Err(err) => error!(%err, "code generation failed"),
        }
        result
    }
}

async fn request_code(
    model: &dyn LanguageModel,
    request: &GenerationRequest,
) -> Result<GeneratedCode, GenerationError> {
    let response = model.generate(composer::compose(request)).await?;
    let text = response.text();
    if text.trim().is_empty() {
        return Err(GenerationError::EmptyResponse);
    }
    debug!(bytes = text.len(), "received response text");
    Ok(serde_json::from_str::<GeneratedCode>(&text)?)
}

/// "gemini-2.5-flash" -> "Gemini 2.5 Flash"
fn display_name(model_id: &str) -> String {
    model_id
        .split('-')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
