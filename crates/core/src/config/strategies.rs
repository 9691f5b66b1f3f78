//! Strategy table entries as they appear in configuration.
//!
//! ```toml
//! [[strategies]]
//! kind = "selector"
//! prefix = "https://telegra.ph/"
//! selector = "article.tl_article_content"
//!
//! [[strategies]]
//! kind = "frame"
//! prefix = "https://reader.example.org/"
//! frame_src = "^https://viewer\\.example\\.org/embed/"
//! selector = "#document"
//! timeout_ms = 4000
//!
//! [[strategies]]
//! kind = "content_type"
//! content_type = "application/pdf"
//! decoder = "pdf"
//! ```

use serde::{Deserialize, Serialize};

/// One entry of the strategy table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StrategyConfig {
    /// Wait for a container element on pages under `prefix` and read its text.
    Selector {
        prefix: String,
        selector: String,
        #[serde(default = "default_strategy_timeout_ms")]
        timeout_ms: u64,
    },

    /// Wait for a child frame whose URL matches `frame_src`, then for
    /// `selector` inside it, and read its text.
    Frame {
        prefix: String,
        frame_src: String,
        selector: String,
        #[serde(default = "default_strategy_timeout_ms")]
        timeout_ms: u64,
    },

    /// Download the raw bytes of responses with this content type and decode them.
    ContentType {
        content_type: String,
        #[serde(default)]
        decoder: DecoderKind,
    },
}

/// Binary document formats with a built-in decoder.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecoderKind {
    #[default]
    Pdf,
}

pub(crate) fn default_strategy_timeout_ms() -> u64 {
    5_000
}

/// Strategies registered when configuration does not replace the list.
pub fn builtin_strategies() -> Vec<StrategyConfig> {
    vec![
        StrategyConfig::Selector {
            prefix: "https://telegra.ph/".into(),
            selector: "article.tl_article_content".into(),
            timeout_ms: default_strategy_timeout_ms(),
        },
        StrategyConfig::ContentType { content_type: "application/pdf".into(), decoder: DecoderKind::Pdf },
    ]
}

impl StrategyConfig {
    /// Short name used in logs and errors.
    pub fn kind(&self) -> &'static str {
        match self {
            StrategyConfig::Selector { .. } => "selector",
            StrategyConfig::Frame { .. } => "frame",
            StrategyConfig::ContentType { .. } => "content_type",
        }
    }
}
