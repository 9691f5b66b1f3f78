//! Readable content extraction using Lectito.
//!
//! Provides the heuristic oracles the orchestration consults behind a stable
//! abstraction that can be swapped later.
//!
//! ### Readiness
//! - readabilityrs' `is_probably_readerable` pre-flight check, which scores
//!   paragraph-like nodes without running a full extraction.
//!
//! ### Main content
//! - Uses Lectito's extraction pipeline (Readability.js-inspired).
//! - The extracted content is projected to plain text by concatenating its
//!   text nodes, the same way `textContent` does.

use lectito_core::{Document, ExtractConfig as LectitoConfig};
use pagetext_core::Error;
use scraper::Html;

use crate::types::SessionDocument;

/// Configuration for content extraction.
#[derive(Debug, Clone)]
pub struct ExtractConfig {
    /// Minimum character count for content (default: 200)
    pub char_threshold: Option<usize>,

    /// Maximum number of top candidates to consider (default: 5)
    pub max_top_candidates: Option<usize>,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self { char_threshold: Some(200), max_top_candidates: Some(5) }
    }
}

impl ExtractConfig {
    /// Convert to Lectito's config type.
    fn to_lectito_config(&self) -> LectitoConfig {
        let mut cfg = LectitoConfig::default();
        if let Some(threshold) = self.char_threshold {
            cfg.char_threshold = threshold;
        }
        if let Some(max) = self.max_top_candidates {
            cfg.max_top_candidates = max;
        }
        cfg
    }
}

/// Heuristic oracles over a serialized page.
///
/// This allows swapping the extraction engine later without changing the
/// orchestration.
pub trait ReadabilityOracle: Send + Sync {
    /// Whether the document probably contains an extractable article body.
    fn is_probably_readable(&self, doc: &SessionDocument) -> bool;

    /// Plain text of the document's main content.
    fn extract_text(&self, doc: &SessionDocument) -> Result<String, Error>;
}

/// Lectito-based oracle implementation.
#[derive(Debug, Clone, Default)]
pub struct LectitoOracle {
    config: ExtractConfig,
}

impl LectitoOracle {
    pub fn new(config: ExtractConfig) -> Self {
        Self { config }
    }
}

impl ReadabilityOracle for LectitoOracle {
    fn is_probably_readable(&self, doc: &SessionDocument) -> bool {
        readabilityrs::is_probably_readerable(&doc.html, None)
    }

    fn extract_text(&self, doc: &SessionDocument) -> Result<String, Error> {
        let parsed =
            Document::parse(&doc.html).map_err(|e| Error::ExtractFailed(format!("failed to parse HTML: {}", e)))?;

        let extracted = lectito_core::extract_content(&parsed, &self.config.to_lectito_config())
            .map_err(|e| Error::ExtractFailed(format!("extraction failed: {}", e)))?;

        Ok(text_content(&extracted.content))
    }
}

/// Concatenate every text node of an HTML fragment.
fn text_content(html: &str) -> String {
    Html::parse_fragment(html).root_element().text().collect()
}
