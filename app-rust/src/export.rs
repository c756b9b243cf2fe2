use crate::{artifact::GeneratedArtifact, preview};

pub const DOWNLOAD_PREFIX: &str = "generated-app";

pub const HTML_CONTENT_TYPE: &str = "text/html; charset=utf-8";

/// A standalone document ready to be handed to the browser as a download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentDownload {
    pub filename: String,
    pub content_type: &'static str,
    pub body: Vec<u8>,
}

impl DocumentDownload {
    /// Value for the `Content-Disposition` response header.
    #[must_use]
    pub fn content_disposition(&self) -> String {
        format!("attachment; filename=\"{}\"", self.filename)
    }
}

/// The three fragments as one labeled plain-text blob, for the clipboard.
#[must_use]
pub fn raw_source(artifact: &GeneratedArtifact) -> String {
    format!(
        "<!-- HTML -->\n{}\n\n/* CSS */\n<style>\n{}\n</style>\n\n// JS\n<script>\n{}\n</script>",
        artifact.html(),
        artifact.css(),
        artifact.javascript(),
    )
}

#[must_use]
pub fn download_filename(artifact: &GeneratedArtifact) -> String {
    format!(
        "{DOWNLOAD_PREFIX}-{}.html",
        artifact.created_at().timestamp_millis()
    )
}

/// Same bytes as the live preview, named after the artifact's creation time.
#[must_use]
pub fn download_document(artifact: &GeneratedArtifact) -> DocumentDownload {
    DocumentDownload {
        filename: download_filename(artifact),
        content_type: HTML_CONTENT_TYPE,
        body: preview::render_document(artifact).into_bytes(),
    }
}
