use crate::{LanguageModelInput, LanguageModelResult, ModelResponse};

#[derive(Debug, Clone, Default)]
pub struct LanguageModelMetadata {
    /// Human readable name shown next to generated output, e.g.
    /// "Gemini 2.5 Flash".
    pub display_name: Option<String>,
}

/// A provider-backed model that answers one request with one response.
#[async_trait::async_trait]
pub trait LanguageModel: Send + Sync {
    fn provider(&self) -> &'static str;
    fn model_id(&self) -> String;
    fn metadata(&self) -> Option<&LanguageModelMetadata> {
        None
    }
    async fn generate(&self, input: LanguageModelInput) -> LanguageModelResult<ModelResponse>;
}
