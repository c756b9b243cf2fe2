use super::api::{
    Content, GenerateContentConfig, GenerateContentParameters, GenerateContentResponse,
    GenerateContentResponseUsageMetadata, Part as GooglePart,
};
use crate::{
    client_utils, LanguageModel, LanguageModelError, LanguageModelInput, LanguageModelMetadata,
    LanguageModelResult, Message, ModelResponse, ModelUsage, Part, ResponseFormatOption,
};
use reqwest::{
    header::{HeaderMap, HeaderName, HeaderValue},
    Client,
};
use std::collections::HashMap;

const PROVIDER: &str = "google";

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

pub struct GoogleModel {
    model_id: String,
    api_key: String,
    base_url: String,
    client: Client,
    metadata: Option<LanguageModelMetadata>,
    headers: HashMap<String, String>,
}

#[derive(Clone, Default)]
pub struct GoogleModelOptions {
    pub api_key: String,
    pub base_url: Option<String>,
    pub headers: Option<HashMap<String, String>>,
    pub client: Option<Client>,
}

impl GoogleModel {
    #[must_use]
    pub fn new(model_id: impl Into<String>, options: GoogleModelOptions) -> Self {
        let GoogleModelOptions {
            api_key,
            base_url,
            headers,
            client,
        } = options;

        let base_url = base_url
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();
        let client = client.unwrap_or_else(Client::new);
        let headers = headers.unwrap_or_default();

        Self {
            model_id: model_id.into(),
            api_key,
            base_url,
            client,
            metadata: None,
            headers,
        }
    }

    #[must_use]
    pub fn with_metadata(mut self, metadata: LanguageModelMetadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    fn request_headers(&self) -> LanguageModelResult<HeaderMap> {
        let mut headers = HeaderMap::new();

        for (key, value) in &self.headers {
            let header_name = HeaderName::from_bytes(key.as_bytes()).map_err(|error| {
                LanguageModelError::InvalidInput(format!(
                    "Invalid Google header name '{key}': {error}"
                ))
            })?;
            let header_value = HeaderValue::from_str(value).map_err(|error| {
                LanguageModelError::InvalidInput(format!(
                    "Invalid Google header value for '{key}': {error}"
                ))
            })?;
            headers.insert(header_name, header_value);
        }

        Ok(headers)
    }
}

#[async_trait::async_trait]
impl LanguageModel for GoogleModel {
    fn provider(&self) -> &'static str {
        PROVIDER
    }

    fn model_id(&self) -> String {
        self.model_id.clone()
    }

    fn metadata(&self) -> Option<&LanguageModelMetadata> {
        self.metadata.as_ref()
    }

    async fn generate(&self, input: LanguageModelInput) -> LanguageModelResult<ModelResponse> {
        crate::opentelemetry::trace_generate(
            self.provider(),
            &self.model_id(),
            input,
            |input| async move {
                let params = convert_to_generate_content_parameters(input);

                let url = format!(
                    "{}/models/{}:generateContent?key={}",
                    self.base_url, self.model_id, self.api_key
                );

                let headers = self.request_headers()?;
                let response: GenerateContentResponse =
                    client_utils::send_json(&self.client, &url, &params, headers).await?;

                map_google_response(response)
            },
        )
        .await
    }
}

fn convert_to_generate_content_parameters(input: LanguageModelInput) -> GenerateContentParameters {
    let LanguageModelInput {
        system_prompt,
        messages,
        response_format,
    } = input;

    let contents = messages.into_iter().map(convert_to_google_content).collect();

    let system_instruction = system_prompt.map(|prompt| Content {
        parts: Some(vec![GooglePart {
            text: Some(prompt),
            ..Default::default()
        }]),
        role: None,
    });

    let mut config = GenerateContentConfig::default();

    if let Some(response_format) = response_format {
        let (response_mime_type, response_json_schema) =
            convert_to_google_response_schema(response_format);
        config.response_mime_type = Some(response_mime_type);
        config.response_json_schema = response_json_schema;
    }

    GenerateContentParameters {
        contents,
        system_instruction,
        generation_config: Some(config),
    }
}

fn convert_to_google_content(message: Message) -> Content {
    match message {
        Message::User(user) => Content {
            parts: Some(
                user.content
                    .into_iter()
                    .map(|part| match part {
                        Part::Text(text_part) => GooglePart {
                            text: Some(text_part.text),
                            ..Default::default()
                        },
                    })
                    .collect(),
            ),
            role: Some("user".to_string()),
        },
    }
}

fn convert_to_google_response_schema(
    response_format: ResponseFormatOption,
) -> (String, Option<serde_json::Value>) {
    match response_format {
        ResponseFormatOption::Text => ("text/plain".to_string(), None),
        ResponseFormatOption::Json(json_format) => {
            ("application/json".to_string(), json_format.schema)
        }
    }
}

fn map_google_response(response: GenerateContentResponse) -> LanguageModelResult<ModelResponse> {
    let usage = response
        .usage_metadata
        .as_ref()
        .map(map_google_usage_metadata);

    let Some(candidate) = response.candidates.and_then(|c| c.into_iter().next()) else {
        if let Some(reason) = response
            .prompt_feedback
            .and_then(|feedback| feedback.block_reason_message.or(feedback.block_reason))
        {
            return Err(LanguageModelError::Refusal(reason));
        }
        return Err(LanguageModelError::Invariant(
            PROVIDER,
            "No candidate in response".to_string(),
        ));
    };

    let content = candidate
        .content
        .and_then(|c| c.parts)
        .unwrap_or_default()
        .into_iter()
        .filter(|part| !part.thought.unwrap_or(false))
        .filter_map(|part| part.text.map(Part::text))
        .collect();

    Ok(ModelResponse { content, usage })
}

fn map_google_usage_metadata(usage: &GenerateContentResponseUsageMetadata) -> ModelUsage {
    ModelUsage {
        input_tokens: usage.prompt_token_count.unwrap_or(0),
        output_tokens: usage.candidates_token_count.unwrap_or(0)
            + usage.thoughts_token_count.unwrap_or(0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ResponseFormatJson, UserMessage};
    use serde_json::json;

    #[test]
    fn converts_input_with_json_response_format() {
        let input = LanguageModelInput {
            system_prompt: Some("Be terse.".to_string()),
            messages: vec![Message::User(UserMessage {
                content: vec![Part::text("Hello")],
            })],
            response_format: Some(ResponseFormatOption::Json(ResponseFormatJson {
                name: "answer".to_string(),
                description: None,
                schema: Some(json!({ "type": "object" })),
            })),
            ..Default::default()
        };

        let params = serde_json::to_value(convert_to_generate_content_parameters(input))
            .expect("serialize params");

        assert_eq!(
            params,
            json!({
                "contents": [{ "parts": [{ "text": "Hello" }], "role": "user" }],
                "systemInstruction": { "parts": [{ "text": "Be terse." }] },
                "generationConfig": {
                    "responseMimeType": "application/json",
                    "responseJsonSchema": { "type": "object" }
                }
            })
        );
    }

    #[test]
    fn skips_thought_parts_in_response() {
        let response: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [{
                "content": {
                    "role": "model",
                    "parts": [
                        { "text": "thinking...", "thought": true },
                        { "text": "{\"a\":1}" }
                    ]
                },
                "finishReason": "STOP"
            }],
            "usageMetadata": { "promptTokenCount": 12, "candidatesTokenCount": 5, "thoughtsTokenCount": 3 }
        }))
        .expect("deserialize response");

        let response = map_google_response(response).expect("map response");

        assert_eq!(response.content, vec![Part::text("{\"a\":1}")]);
        assert_eq!(
            response.usage,
            Some(ModelUsage {
                input_tokens: 12,
                output_tokens: 8,
            })
        );
    }

    #[test]
    fn blocked_prompt_is_a_refusal() {
        let response: GenerateContentResponse = serde_json::from_value(json!({
            "promptFeedback": { "blockReason": "SAFETY" }
        }))
        .expect("deserialize response");

        let error = map_google_response(response).expect_err("blocked prompt fails");
        assert!(matches!(error, LanguageModelError::Refusal(reason) if reason == "SAFETY"));
    }

    #[test]
    fn missing_candidate_is_an_invariant_error() {
        let error = map_google_response(GenerateContentResponse::default())
            .expect_err("empty response fails");
        assert!(matches!(error, LanguageModelError::Invariant("google", _)));
    }
}
