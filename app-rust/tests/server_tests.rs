use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    response::Response,
};
use devgen::{
    server::{router, AppState},
    CodeGenerator, GenerationState, DEFAULT_PROMPT,
};
use devgen_sdk::{
    testing::MockLanguageModel, LanguageModel, LanguageModelInput, LanguageModelResult,
    ModelResponse, Part,
};
use std::{sync::Arc, time::Duration};
use tokio::sync::Notify;
use tower::ServiceExt;

const CALCULATOR: &str =
    r#"{"html":"<div id=\"a\">1</div>","css":"body{color:red}","javascript":"console.log(1)"}"#;

fn app_with(responses: &[&str]) -> (AppState, Arc<MockLanguageModel>) {
    let model = Arc::new(MockLanguageModel::new());
    for text in responses {
        model.enqueue_generate(ModelResponse {
            content: vec![Part::text(*text)],
            ..Default::default()
        });
    }
    let state = AppState::new(CodeGenerator::new(model.clone())).expect("app state");
    (state, model)
}

/// Answers with `text` only once `release` is notified, so a generation can be
/// held in the loading state.
struct GatedModel {
    release: Arc<Notify>,
    text: &'static str,
}

#[async_trait::async_trait]
impl LanguageModel for GatedModel {
    fn provider(&self) -> &'static str {
        "gated"
    }

    fn model_id(&self) -> String {
        "gated-model".to_string()
    }

    async fn generate(&self, _input: LanguageModelInput) -> LanguageModelResult<ModelResponse> {
        self.release.notified().await;
        Ok(ModelResponse {
            content: vec![Part::text(self.text)],
            ..Default::default()
        })
    }
}

fn gated_app(text: &'static str) -> (AppState, Arc<Notify>) {
    let release = Arc::new(Notify::new());
    let model = GatedModel {
        release: release.clone(),
        text,
    };
    let state = AppState::new(CodeGenerator::new(Arc::new(model))).expect("app state");
    (state, release)
}

async fn send(state: &AppState, request: Request<Body>) -> Response {
    router(state.clone())
        .oneshot(request)
        .await
        .expect("infallible router")
}

async fn get(state: &AppState, uri: &str) -> Response {
    send(state, Request::get(uri).body(Body::empty()).expect("request")).await
}

async fn post_form(state: &AppState, uri: &str, body: &str) -> Response {
    send(
        state,
        Request::post(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body.to_string()))
            .expect("request"),
    )
    .await
}

async fn body_text(response: Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    String::from_utf8(bytes.to_vec()).expect("utf-8 body")
}

/// Wait for the spawned generation task to leave the loading state.
async fn settled(state: &AppState) -> GenerationState {
    for _ in 0..200 {
        let snapshot = state.state().await;
        if snapshot != GenerationState::Loading {
            return snapshot;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("generation did not finish");
}

#[tokio::test]
async fn home_renders_idle_form() {
    let (state, _model) = app_with(&[]);

    let response = get(&state, "/").await;
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains(r#"action="/generate""#));
    assert!(html.contains("mock-model"));
}

#[tokio::test]
async fn generate_flow_reaches_success_and_serves_outputs() {
    let (state, model) = app_with(&[CALCULATOR]);

    let response = post_form(&state, "/generate", "prompt=A+calculator").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/");

    let GenerationState::Success { artifact } = settled(&state).await else {
        panic!("expected success");
    };
    assert_eq!(artifact.html(), r#"<div id="a">1</div>"#);
    assert_eq!(artifact.css(), "body{color:red}");
    assert_eq!(artifact.javascript(), "console.log(1)");
    assert_eq!(model.tracked_generate_inputs().len(), 1);

    let preview = get(&state, "/preview").await;
    assert_eq!(preview.status(), StatusCode::OK);
    assert_eq!(
        preview.headers()[header::CONTENT_SECURITY_POLICY],
        "sandbox allow-scripts allow-modals"
    );
    let document = body_text(preview).await;
    assert!(document.contains("body{color:red}"));
    assert!(document.contains("console.log(1)"));

    let download = get(&state, "/download").await;
    let disposition = download.headers()[header::CONTENT_DISPOSITION]
        .to_str()
        .expect("ascii header")
        .to_string();
    assert_eq!(
        disposition,
        format!(
            "attachment; filename=\"generated-app-{}.html\"",
            artifact.created_at().timestamp_millis()
        )
    );
    assert_eq!(body_text(download).await, document);

    let source = body_text(get(&state, "/source").await).await;
    assert!(source.starts_with("<!-- HTML -->\n<div id=\"a\">1</div>"));
    assert!(source.contains("/* CSS */"));
    assert!(source.contains("// JS"));

    let page = body_text(get(&state, "/").await).await;
    assert!(page.contains(r#"sandbox="allow-scripts allow-modals""#));
    assert!(page.contains("Create Something Else"));
}

#[tokio::test]
async fn blank_prompt_leaves_state_idle() {
    let (state, model) = app_with(&[]);

    let response = post_form(&state, "/generate", "prompt=+++").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(state.state().await, GenerationState::Idle);

    let response = post_form(&state, "/generate", "").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(state.state().await, GenerationState::Idle);
    assert!(model.tracked_generate_inputs().is_empty());
}

#[tokio::test]
async fn malformed_response_shows_error_then_retry_returns_to_idle() {
    let (state, _model) = app_with(&["not json"]);

    post_form(&state, "/generate", "prompt=A+calculator").await;
    let GenerationState::Error { message } = settled(&state).await else {
        panic!("expected error");
    };
    assert!(!message.is_empty());
    assert_eq!(get(&state, "/preview").await.status(), StatusCode::NOT_FOUND);

    let page = body_text(get(&state, "/").await).await;
    assert!(page.contains("Build Failed"));

    let response = post_form(&state, "/retry", "").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(state.state().await, GenerationState::Idle);
}

#[tokio::test]
async fn retry_outside_error_is_a_conflict() {
    let (state, _model) = app_with(&[]);

    let response = post_form(&state, "/retry", "").await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn submit_after_success_requires_reset() {
    let (state, _model) = app_with(&[CALCULATOR]);

    post_form(&state, "/generate", "prompt=A+calculator").await;
    assert!(matches!(settled(&state).await, GenerationState::Success { .. }));

    let response = post_form(&state, "/generate", "prompt=Another").await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = post_form(&state, "/reset", "").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(state.state().await, GenerationState::Idle);
    assert_eq!(get(&state, "/download").await.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn unconfigured_generator_reports_configuration_error() {
    let state = AppState::new(CodeGenerator::unconfigured()).expect("app state");

    post_form(&state, "/generate", "prompt=A+calculator").await;
    let GenerationState::Error { message } = settled(&state).await else {
        panic!("expected error");
    };
    assert!(message.contains("API_KEY"));

    let page = body_text(get(&state, "/").await).await;
    assert!(page.contains("Not configured"));
}

#[tokio::test]
async fn state_endpoint_reports_status() {
    let (state, _model) = app_with(&[]);

    let json = body_text(get(&state, "/api/state").await).await;
    assert_eq!(json, r#"{"status":"idle"}"#);
}

#[tokio::test]
async fn failed_prompt_stays_in_the_form() {
    let (state, _model) = app_with(&["not json"]);

    post_form(&state, "/generate", "prompt=A+zebra+striped+timer").await;
    assert!(matches!(settled(&state).await, GenerationState::Error { .. }));

    let page = body_text(get(&state, "/").await).await;
    assert!(page.contains(">A zebra striped timer</textarea>"));
    assert!(!page.contains(DEFAULT_PROMPT));

    post_form(&state, "/retry", "").await;
    let page = body_text(get(&state, "/").await).await;
    assert!(page.contains(">A zebra striped timer</textarea>"));
}

#[tokio::test]
async fn prompt_form_resets_after_leaving_a_result() {
    let (state, _model) = app_with(&[CALCULATOR]);

    post_form(&state, "/generate", "prompt=A+calculator").await;
    assert!(matches!(settled(&state).await, GenerationState::Success { .. }));
    post_form(&state, "/reset", "").await;

    let page = body_text(get(&state, "/").await).await;
    assert!(page.contains(DEFAULT_PROMPT));
}

#[tokio::test]
async fn second_submission_while_loading_is_a_conflict() {
    let (state, release) = gated_app(CALCULATOR);

    let response = post_form(&state, "/generate", "prompt=A+calculator").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(state.state().await, GenerationState::Loading);

    let response = post_form(&state, "/generate", "prompt=Another").await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let page = body_text(get(&state, "/").await).await;
    assert!(page.contains("Generating Code..."));
    assert!(page.contains(">A calculator</textarea>"));

    release.notify_one();
    let GenerationState::Success { artifact } = settled(&state).await else {
        panic!("expected success");
    };
    assert_eq!(artifact.prompt(), "A calculator");
}

#[tokio::test]
async fn reset_while_loading_drops_the_late_result() {
    let (state, release) = gated_app(CALCULATOR);

    post_form(&state, "/generate", "prompt=A+calculator").await;
    assert_eq!(state.state().await, GenerationState::Loading);

    let response = post_form(&state, "/reset", "").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(state.state().await, GenerationState::Idle);

    release.notify_one();
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(state.state().await, GenerationState::Idle);
    assert_eq!(get(&state, "/download").await.status(), StatusCode::NOT_FOUND);
}
