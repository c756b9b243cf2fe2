//! Assembles generated fragments into one standalone HTML document.
//!
//! The document runs model-written script, so it is only ever shown inside a
//! sandbox: the shell page embeds it in an `<iframe sandbox>` and `/preview`
//! serves it with a `Content-Security-Policy: sandbox` header. Both grant
//! [`SANDBOX_POLICY`] and nothing else.
use crate::artifact::GeneratedArtifact;

/// Tokens for the iframe `sandbox` attribute: scripts and modal dialogs only.
pub const SANDBOX_POLICY: &str = "allow-scripts allow-modals";

/// `Content-Security-Policy` value applying [`SANDBOX_POLICY`] to a
/// top-level response.
pub const SANDBOX_CSP: &str = "sandbox allow-scripts allow-modals";

const BASE_STYLE: &str = r#"      body {
        margin: 0;
        font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, Helvetica, Arial, sans-serif;
        background-color: #ffffff;
        color: #1f2937;
        min-height: 100vh;
        display: flex;
        justify-content: center;
        align-items: center;
        padding: 20px;
        box-sizing: border-box;
      }"#;

/// Wrap untrusted script so that an exception thrown while it runs is
/// rendered as an inline banner at the end of `<body>` instead of escaping
/// the document.
#[must_use]
pub fn guard_script(script: &str) -> String {
    format!(
        r#"    <script>
      try {{
{script}
      }} catch (err) {{
        console.error('Generated App Error:', err);
        var banner = document.createElement('div');
        banner.setAttribute('style', 'color:red; padding:10px; border:1px solid red; margin-top:20px;');
        banner.textContent = 'Runtime Error: ' + (err && err.message ? err.message : String(err));
        document.body.appendChild(banner);
      }}
    </script>"#
    )
}

/// The complete document for an artifact. Fragments are inlined verbatim.
#[must_use]
pub fn render_document(artifact: &GeneratedArtifact) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
  <head>
    <meta charset="UTF-8" />
    <meta name="viewport" content="width=device-width, initial-scale=1.0" />
    <style>
{BASE_STYLE}
      /* Generated CSS */
{css}
    </style>
  </head>
  <body>
    <!-- Generated HTML -->
{html}

    <!-- Generated JS -->
{script}
  </body>
</html>
"#,
        css = artifact.css(),
        html = artifact.html(),
        script = guard_script(artifact.javascript()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifact::{GeneratedCode, GenerationRequest};
    use chrono::{TimeZone, Utc};

    fn artifact(html: &str, css: &str, javascript: &str) -> GeneratedArtifact {
        GeneratedArtifact::new(
            GeneratedCode {
                html: html.to_string(),
                css: css.to_string(),
                javascript: javascript.to_string(),
            },
            &GenerationRequest::new("A calculator").expect("valid prompt"),
            Utc.timestamp_millis_opt(1_700_000_000_000).unwrap(),
        )
    }

    fn section<'a>(document: &'a str, open: &str, close: &str) -> &'a str {
        let start = document.find(open).expect("open tag") + open.len();
        let end = start + document[start..].find(close).expect("close tag");
        &document[start..end]
    }

    #[test]
    fn fragments_land_in_their_sections() {
        let document = render_document(&artifact(
            r#"<div id="a">1</div>"#,
            "body{color:red}",
            "console.log(1)",
        ));

        assert!(document.starts_with("<!DOCTYPE html>"));
        assert!(document.contains(r#"<meta charset="UTF-8" />"#));
        assert!(document.contains(
            r#"<meta name="viewport" content="width=device-width, initial-scale=1.0" />"#
        ));
        assert!(section(&document, "<style>", "</style>").contains("body{color:red}"));
        assert!(section(&document, "<body>", "</body>").contains(r#"<div id="a">1</div>"#));
        assert!(section(&document, "<script>", "</script>").contains("console.log(1)"));
    }

    #[test]
    fn script_runs_inside_try_block() {
        let guarded = guard_script("explode();");
        let try_at = guarded.find("try {").expect("try");
        let script_at = guarded.find("explode();").expect("script");
        let catch_at = guarded.find("} catch (err) {").expect("catch");

        assert!(try_at < script_at && script_at < catch_at);
        assert!(guarded.contains("document.body.appendChild(banner)"));
        assert!(guarded.contains("'Runtime Error: '"));
    }

    #[test]
    fn rendering_is_deterministic() {
        let artifact = artifact("<p>x</p>", "p{}", "let x = 1;");
        assert_eq!(render_document(&artifact), render_document(&artifact));
    }

    #[test]
    fn csp_matches_iframe_policy() {
        assert_eq!(SANDBOX_CSP, format!("sandbox {SANDBOX_POLICY}"));
    }
}
