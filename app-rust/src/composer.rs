//! Builds the model request for a prompt: instruction text, persona, and the
//! structured-output schema for the three code fragments.
use crate::artifact::GenerationRequest;
use devgen_sdk::{LanguageModelInput, Message, Part, ResponseFormatJson, ResponseFormatOption};
use serde_json::{json, Value};

pub const DEFAULT_MODEL_ID: &str = "gemini-2.5-flash";

pub const PERSONA: &str = "You are an expert Senior Frontend Engineer. You generate high-quality, bug-free, working web applications.";

pub const SCHEMA_NAME: &str = "generated_code";

const REQUIREMENTS: [&str; 5] = [
    "Make it look modern, clean, and professional.",
    "Ensure all interactivity works (buttons, forms, calculations).",
    "Return ONLY the raw code for HTML, CSS, and JS fields.",
    "Do not use external libraries (like React/Vue) in the output, use vanilla JS and CSS.",
    "Ensure the CSS makes the app responsive and centered.",
];

/// The JSON schema the model output must satisfy: an object with required
/// `html`, `css` and `javascript` strings.
#[must_use]
pub fn code_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "html": {
                "type": "string",
                "description": "The HTML structure of the application. Do not include <html>, <head>, or <body> tags, just the internal structure."
            },
            "css": {
                "type": "string",
                "description": "The CSS styles for the application."
            },
            "javascript": {
                "type": "string",
                "description": "The JavaScript logic for the application."
            }
        },
        "required": ["html", "css", "javascript"],
        "propertyOrdering": ["html", "css", "javascript"]
    })
}

/// The instruction sent as the user turn. The prompt is embedded verbatim.
#[must_use]
pub fn instruction(prompt: &str) -> String {
    let requirements = REQUIREMENTS
        .iter()
        .enumerate()
        .map(|(index, requirement)| format!("{}. {requirement}", index + 1))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "Create a functional, interactive web application based on this request: \"{prompt}\".\n\nRequirements:\n{requirements}"
    )
}

#[must_use]
pub fn compose(request: &GenerationRequest) -> LanguageModelInput {
    LanguageModelInput {
        system_prompt: Some(PERSONA.to_string()),
        messages: vec![Message::user(vec![Part::text(instruction(
            request.prompt(),
        ))])],
        response_format: Some(ResponseFormatOption::Json(ResponseFormatJson {
            name: SCHEMA_NAME.to_string(),
            description: Some("HTML, CSS and JavaScript for a single-page web app".to_string()),
            schema: Some(code_schema()),
        })),
        ..Default::default()
    }
}
