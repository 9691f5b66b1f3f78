//! Values passed between navigation, probing and extraction.

use url::Url;

/// What navigation learned about the main document response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationOutcome {
    /// Final URL after redirects.
    pub final_url: Url,

    /// Media type essence of the response, lowercase and without parameters.
    /// Empty when the response declared none.
    pub content_type: String,

    /// HTTP status of the main document response, if one was reported.
    pub status: Option<u16>,
}

impl NavigationOutcome {
    pub fn new(final_url: Url, content_type: &str, status: Option<u16>) -> Self {
        Self { final_url, content_type: content_type_essence(content_type), status }
    }
}

/// Reduce a Content-Type header value to `type/subtype`.
///
/// `Application/PDF; charset=binary` becomes `application/pdf`.
pub fn content_type_essence(raw: &str) -> String {
    raw.split(';').next().unwrap_or_default().trim().to_ascii_lowercase()
}

/// Result of a single readiness check.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReadinessState {
    #[default]
    Unchecked,
    NotReady,
    Ready,
}

/// Serialized snapshot of the rendered page taken by a readiness check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionDocument {
    pub html: String,
    pub url: Url,
}

/// Final text of a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionResult {
    pub text: String,

    /// Name of the strategy that produced the text.
    pub strategy: String,
}
