//! Server-rendered shell page.

use crate::{
    artifact::GeneratedArtifact,
    export, preview,
    shell::{GenerationState, StatusKind},
};
use minijinja::{context, Environment};

pub const DEFAULT_PROMPT: &str = "Create a personal expense tracker. It should have a form to add item name and cost, a list showing added items, and a total sum at the bottom. Use a modern, dark-themed design with green accents.";

/// Seconds between page refreshes while a generation is running.
const LOADING_REFRESH_SECS: u32 = 2;

/// What the page needs besides the state itself.
#[derive(Debug, Clone)]
pub struct PageContext<'a> {
    pub model_label: &'a str,
    pub configured: bool,
    /// Text for the prompt form; [`DEFAULT_PROMPT`] when `None`.
    pub prompt: Option<&'a str>,
}

pub struct TemplateEngine {
    env: Environment<'static>,
}

impl TemplateEngine {
    pub fn new() -> Result<Self, minijinja::Error> {
        let mut env = Environment::new();
        env.add_template("base.html", BASE_TEMPLATE)?;
        env.add_template("shell.html", SHELL_TEMPLATE)?;
        Ok(Self { env })
    }

    /// Render the shell for `state`. Everything interpolated is
    /// HTML-escaped, including the preview document placed in `srcdoc`.
    pub fn render_shell(
        &self,
        state: &GenerationState,
        page: &PageContext<'_>,
    ) -> Result<String, minijinja::Error> {
        let tmpl = self.env.get_template("shell.html")?;
        let kind = state.kind();
        let (artifact, error) = match state {
            GenerationState::Success { artifact } => (Some(ArtifactView::new(artifact)), None),
            GenerationState::Error { message } => (None, Some(message.as_str())),
            GenerationState::Idle | GenerationState::Loading => (None, None),
        };

        tmpl.render(context! {
            status => kind,
            loading => kind == StatusKind::Loading,
            show_form => kind != StatusKind::Success,
            refresh_secs => LOADING_REFRESH_SECS,
            model_label => page.model_label,
            configured => page.configured,
            prompt => page.prompt.unwrap_or(DEFAULT_PROMPT),
            error => error,
            artifact => artifact,
            sandbox => preview::SANDBOX_POLICY,
        })
    }
}

#[derive(Debug, serde::Serialize)]
struct ArtifactView<'a> {
    prompt: &'a str,
    html: &'a str,
    css: &'a str,
    javascript: &'a str,
    document: String,
    source: String,
    filename: String,
}

impl<'a> ArtifactView<'a> {
    fn new(artifact: &'a GeneratedArtifact) -> Self {
        Self {
            prompt: artifact.prompt(),
            html: artifact.html(),
            css: artifact.css(),
            javascript: artifact.javascript(),
            document: preview::render_document(artifact),
            source: export::raw_source(artifact),
            filename: export::download_filename(artifact),
        }
    }
}

const BASE_TEMPLATE: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  {% block head %}{% endblock %}
  <title>DevGen</title>
  <style>
    :root { color-scheme: dark; }
    * { box-sizing: border-box; }
    body { margin: 0; min-height: 100vh; display: flex; flex-direction: column; background: #020617; color: #f1f5f9; font-family: ui-sans-serif, system-ui, -apple-system, "Segoe UI", Roboto, sans-serif; }
    header { border-bottom: 1px solid #1e293b; }
    .bar { max-width: 72rem; margin: 0 auto; padding: 0 1rem; height: 4rem; display: flex; align-items: center; justify-content: space-between; }
    .logo { font-size: 1.25rem; font-weight: 700; }
    .badge { font-size: .75rem; padding: .25rem .75rem; border-radius: 999px; border: 1px solid #1e3a8a; color: #93c5fd; }
    .badge.off { border-color: #7f1d1d; color: #fca5a5; }
    main { flex: 1; width: 100%; max-width: 64rem; margin: 0 auto; padding: 3rem 1rem; }
    .intro { text-align: center; margin-bottom: 2.5rem; }
    .intro h2 { font-size: 2.5rem; margin: 0 0 1rem; }
    .intro p { color: #94a3b8; font-size: 1.125rem; }
    textarea { width: 100%; height: 8rem; padding: 1rem; border-radius: .75rem; border: 1px solid #1e293b; background: #0f172a; color: #f1f5f9; font: 1rem/1.6 ui-monospace, monospace; resize: none; }
    .row { display: flex; justify-content: space-between; align-items: center; margin: .5rem 0 1rem; color: #64748b; font-size: .75rem; }
    button, .button { cursor: pointer; border: 1px solid #334155; background: #1e293b; color: #e2e8f0; border-radius: .5rem; padding: .5rem .9rem; font-size: .875rem; text-decoration: none; }
    button:disabled { cursor: not-allowed; opacity: .5; }
    .primary { width: 100%; padding: 1rem; font-size: 1.125rem; font-weight: 700; border: 0; background: linear-gradient(90deg, #2563eb, #9333ea); color: #fff; }
    .error { margin-top: 2rem; padding: 1rem; border-radius: .75rem; border: 1px solid #7f1d1d; background: rgba(127, 29, 29, .2); color: #fecaca; }
    .error h3 { margin: 0 0 .25rem; }
    .loading { margin-top: 2rem; height: 24rem; border-radius: .75rem; border: 1px solid #334155; display: flex; flex-direction: column; align-items: center; justify-content: center; color: #94a3b8; }
    .panel { border: 1px solid #1e293b; border-radius: .75rem; overflow: hidden; background: #0f172a; }
    .toolbar { display: flex; justify-content: space-between; padding: .75rem 1rem; border-bottom: 1px solid #1e293b; background: #020617; gap: .5rem; }
    .tab.active { border-color: #1d4ed8; color: #93c5fd; }
    .view { height: 600px; }
    .view iframe { width: 100%; height: 100%; border: 0; background: #fff; }
    .source { height: 100%; overflow: auto; padding: 1rem; font: .875rem ui-monospace, monospace; }
    .source h4 { color: #64748b; text-transform: uppercase; letter-spacing: .05em; font-size: .75rem; }
    .source pre { background: #020617; border: 1px solid #1e293b; border-radius: .5rem; padding: 1rem; overflow-x: auto; }
    .hidden { display: none; }
    .actions { display: flex; justify-content: center; margin-top: 1.5rem; }
    footer { padding: 2rem 0; border-top: 1px solid #0f172a; text-align: center; color: #475569; font-size: .875rem; }
  </style>
</head>
<body>
  <header>
    <div class="bar">
      <div class="logo">DevGen</div>
      <div class="badge{% if not configured %} off{% endif %}">{{ model_label }}</div>
    </div>
  </header>
  <main>
    {% block content %}{% endblock %}
  </main>
  <footer>Describe it. Generate it. Preview it.</footer>
</body>
</html>
"##;

const SHELL_TEMPLATE: &str = r##"{% extends "base.html" %}
{% block head %}{% if loading %}<meta http-equiv="refresh" content="{{ refresh_secs }}">{% endif %}{% endblock %}
{% block content %}
{% if not artifact %}
<div class="intro">
  <h2>Build web apps with AI.</h2>
  <p>Describe a tool, form, or interface, and Gemini will write the HTML, CSS, and JS to build it instantly.</p>
</div>
{% endif %}

{% if show_form %}
<form method="post" action="/generate">
  <textarea id="prompt" name="prompt" placeholder="Describe the web app you want to create (e.g., 'A calculator', 'A to-do list', 'A login form')..."{% if loading %} disabled{% endif %}>{{ prompt }}</textarea>
  <div class="row">
    <button type="button" id="clear"{% if loading %} disabled{% endif %}>Clear</button>
    <span><span id="count">{{ prompt | length }}</span> chars</span>
  </div>
  <button type="submit" id="submit" class="primary"{% if loading %} disabled{% endif %}>{% if loading %}Generating Code...{% else %}Generate App{% endif %}</button>
</form>
{% endif %}

{% if error %}
<div class="error">
  <h3>Build Failed</h3>
  <p>{{ error }}</p>
  <form method="post" action="/retry"><button type="submit">Try Again</button></form>
</div>
{% endif %}

{% if loading %}
<div class="loading">
  <h3>Building your Application</h3>
  <p>Writing HTML structure...</p>
  <p>Styling with CSS...</p>
  <p>Compiling JavaScript logic...</p>
  <form method="post" action="/reset"><button type="submit">Start Over</button></form>
</div>
{% endif %}

{% if artifact %}
<div class="panel">
  <div class="toolbar">
    <div>
      <button type="button" class="tab active" data-view="preview">Live Preview</button>
      <button type="button" class="tab" data-view="source">Source Code</button>
    </div>
    <div>
      <a class="button" href="/preview" target="_blank" rel="noopener" title="Open in a new tab">Open</a>
      <button type="button" id="copy" title="Copy Code" data-source="{{ artifact.source }}">Copy</button>
      <a class="button" href="/download" download="{{ artifact.filename }}" title="Download HTML">Download</a>
    </div>
  </div>
  <div class="view" id="view-preview">
    <iframe title="Preview" sandbox="{{ sandbox }}" srcdoc="{{ artifact.document }}"></iframe>
  </div>
  <div class="view hidden" id="view-source">
    <div class="source">
      <h4>HTML</h4><pre><code>{{ artifact.html }}</code></pre>
      <h4>CSS</h4><pre><code>{{ artifact.css }}</code></pre>
      <h4>JavaScript</h4><pre><code>{{ artifact.javascript }}</code></pre>
    </div>
  </div>
</div>
<div class="actions">
  <form method="post" action="/reset"><button type="submit">Create Something Else</button></form>
</div>
{% endif %}

<script>
  (function () {
    var prompt = document.getElementById('prompt');
    if (prompt) {
      var count = document.getElementById('count');
      var submit = document.getElementById('submit');
      var sync = function () {
        count.textContent = prompt.value.length;
        if (!prompt.disabled) { submit.disabled = prompt.value.trim() === ''; }
      };
      prompt.addEventListener('input', sync);
      document.getElementById('clear').addEventListener('click', function () {
        prompt.value = '';
        sync();
      });
      sync();
    }
    document.querySelectorAll('.tab').forEach(function (tab) {
      tab.addEventListener('click', function () {
        document.querySelectorAll('.tab').forEach(function (t) { t.classList.toggle('active', t === tab); });
        document.getElementById('view-preview').classList.toggle('hidden', tab.dataset.view !== 'preview');
        document.getElementById('view-source').classList.toggle('hidden', tab.dataset.view !== 'source');
      });
    });
    var copy = document.getElementById('copy');
    if (copy) {
      copy.addEventListener('click', function () {
        navigator.clipboard.writeText(copy.dataset.source)
          .then(function () {
            copy.textContent = 'Copied';
            setTimeout(function () { copy.textContent = 'Copy'; }, 2000);
          })
          .catch(function () {});
      });
    }
  })();
</script>
{% endblock %}
"##;
