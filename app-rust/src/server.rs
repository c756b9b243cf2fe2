use crate::{
    artifact::GeneratedArtifact,
    errors::{ServerError, ShellError},
    export,
    generator::CodeGenerator,
    preview,
    shell::{GenerationState, Shell, Submission},
    templates::{PageContext, TemplateEngine},
};
use axum::{
    extract::{Form, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info};

#[derive(Clone)]
pub struct AppState {
    shell: Arc<Mutex<Shell>>,
    generator: Arc<CodeGenerator>,
    templates: Arc<TemplateEngine>,
}

impl AppState {
    pub fn new(generator: CodeGenerator) -> Result<Self, ServerError> {
        Ok(Self {
            shell: Arc::new(Mutex::new(Shell::new())),
            generator: Arc::new(generator),
            templates: Arc::new(TemplateEngine::new()?),
        })
    }

    /// A snapshot of the current state.
    pub async fn state(&self) -> GenerationState {
        self.shell.lock().await.state().clone()
    }

    /// The state together with the prompt the form should show.
    async fn page_snapshot(&self) -> (GenerationState, Option<String>) {
        let shell = self.shell.lock().await;
        (shell.state().clone(), shell.draft().map(str::to_string))
    }

    async fn artifact(&self) -> Option<GeneratedArtifact> {
        self.shell.lock().await.artifact().cloned()
    }
}

#[derive(Deserialize)]
struct GenerateForm {
    #[serde(default)]
    prompt: String,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(home_handler))
        .route("/api/state", get(state_handler))
        .route("/generate", post(generate_handler))
        .route("/reset", post(reset_handler))
        .route("/retry", post(retry_handler))
        .route("/preview", get(preview_handler))
        .route("/download", get(download_handler))
        .route("/source", get(source_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn serve(listener: tokio::net::TcpListener, state: AppState) -> Result<(), ServerError> {
    let addr = listener.local_addr()?;
    info!("Server listening on http://{addr}");
    axum::serve(listener, router(state)).await?;
    Ok(())
}

async fn home_handler(State(state): State<AppState>) -> Response {
    let (snapshot, draft) = state.page_snapshot().await;
    let model_label = state.generator.model_label();
    let page = PageContext {
        model_label: &model_label,
        configured: state.generator.is_configured(),
        prompt: draft.as_deref(),
    };

    match state.templates.render_shell(&snapshot, &page) {
        Ok(html) => Html(html).into_response(),
        Err(err) => {
            error!(%err, "failed to render shell page");
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to render page").into_response()
        }
    }
}

async fn state_handler(State(state): State<AppState>) -> Json<GenerationState> {
    Json(state.state().await)
}

async fn generate_handler(
    State(state): State<AppState>,
    Form(form): Form<GenerateForm>,
) -> Response {
    let submission = state.shell.lock().await.submit(&form.prompt);
    match submission {
        Ok(Some(submission)) => {
            tokio::spawn(run_generation(state.clone(), submission));
            Redirect::to("/").into_response()
        }
        Ok(None) => Redirect::to("/").into_response(),
        Err(err) => conflict(&err),
    }
}

/// Run one submission to completion and report its outcome to the shell.
pub async fn run_generation(state: AppState, submission: Submission) {
    let Submission { ticket, request } = submission;
    let outcome = state
        .generator
        .generate(&request)
        .await
        .map(|code| GeneratedArtifact::new(code, &request, Utc::now()));

    if !state.shell.lock().await.resolve(ticket, outcome) {
        debug!("generation finished after the shell moved on");
    }
}

async fn reset_handler(State(state): State<AppState>) -> Redirect {
    state.shell.lock().await.reset();
    Redirect::to("/")
}

async fn retry_handler(State(state): State<AppState>) -> Response {
    match state.shell.lock().await.retry() {
        Ok(()) => Redirect::to("/").into_response(),
        Err(err) => conflict(&err),
    }
}

async fn preview_handler(State(state): State<AppState>) -> Response {
    let Some(artifact) = state.artifact().await else {
        return no_artifact();
    };
    (
        [
            (header::CONTENT_TYPE, export::HTML_CONTENT_TYPE),
            (header::CONTENT_SECURITY_POLICY, preview::SANDBOX_CSP),
        ],
        preview::render_document(&artifact),
    )
        .into_response()
}

async fn download_handler(State(state): State<AppState>) -> Response {
    let Some(artifact) = state.artifact().await else {
        return no_artifact();
    };
    let download = export::download_document(&artifact);
    (
        [
            (header::CONTENT_TYPE, download.content_type.to_string()),
            (header::CONTENT_DISPOSITION, download.content_disposition()),
        ],
        download.body,
    )
        .into_response()
}

async fn source_handler(State(state): State<AppState>) -> Response {
    let Some(artifact) = state.artifact().await else {
        return no_artifact();
    };
    (
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        export::raw_source(&artifact),
    )
        .into_response()
}

fn conflict(err: &ShellError) -> Response {
    (StatusCode::CONFLICT, err.to_string()).into_response()
}

fn no_artifact() -> Response {
    (StatusCode::NOT_FOUND, "No generated app yet").into_response()
}
