//! Extraction strategies and the table that picks one per page.
//!
//! Resolution order for a `(final_url, content_type)` pair:
//! 1. the first URL-prefix entry the final URL starts with,
//! 2. else the content-type entry equal to the response's media type,
//! 3. else the default readability strategy.
//!
//! Site-specific entries therefore always win over content-type entries.

mod content;
mod frame;
mod readable;
mod selector;

pub use content::{ContentTypeStrategy, DocumentDecoder, PdfDecoder};
pub use frame::FrameStrategy;
pub use readable::ReadableStrategy;
pub use selector::SelectorStrategy;

use std::sync::Arc;
use std::time::Duration;

use pagetext_core::config::{DecoderKind, StrategyConfig};
use pagetext_core::{AppConfig, ConfigError, Error};
use regex::Regex;
use url::Url;

use crate::extract::ReadabilityOracle;
use crate::fetch::ByteFetcher;
use crate::render::Session;
use crate::types::{NavigationOutcome, SessionDocument, content_type_essence};

/// Delay between checks of strategies that wait for page structure.
pub(crate) const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Everything a strategy may read while extracting.
pub struct StrategyContext<'a> {
    pub session: &'a dyn Session,
    pub outcome: &'a NavigationOutcome,

    /// Snapshot cached by the last readiness check, if it serialized the page.
    pub document: Option<&'a SessionDocument>,
}

/// A named procedure producing the final text of a page.
#[async_trait::async_trait]
pub trait ExtractionStrategy: Send + Sync {
    fn name(&self) -> &str;

    /// Hard bound on [`ExtractionStrategy::extract`], enforced by the caller.
    fn deadline(&self) -> Option<Duration> {
        None
    }

    async fn extract(&self, ctx: &StrategyContext<'_>) -> Result<String, Error>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StrategyKey {
    UrlPrefix(String),
    ContentType(String),
}

/// The strategy chosen for a page.
pub struct Resolved<'a> {
    /// `None` for the default strategy.
    pub key: Option<&'a StrategyKey>,
    pub strategy: &'a Arc<dyn ExtractionStrategy>,
}

/// Immutable mapping from keys to strategies, built once at startup.
#[derive(Clone)]
pub struct StrategyTable {
    entries: Vec<(StrategyKey, Arc<dyn ExtractionStrategy>)>,
    default: Arc<dyn ExtractionStrategy>,
}

/// Collects entries; URL-prefix entries are ordered before content-type ones.
pub struct StrategyTableBuilder {
    sites: Vec<(StrategyKey, Arc<dyn ExtractionStrategy>)>,
    content_types: Vec<(StrategyKey, Arc<dyn ExtractionStrategy>)>,
    default: Arc<dyn ExtractionStrategy>,
}

impl StrategyTableBuilder {
    pub fn site(mut self, prefix: impl Into<String>, strategy: Arc<dyn ExtractionStrategy>) -> Self {
        self.sites.push((StrategyKey::UrlPrefix(prefix.into()), strategy));
        self
    }

    pub fn content_type(mut self, content_type: &str, strategy: Arc<dyn ExtractionStrategy>) -> Self {
        self.content_types
            .push((StrategyKey::ContentType(content_type_essence(content_type)), strategy));
        self
    }

    pub fn build(self) -> StrategyTable {
        let mut entries = self.sites;
        entries.extend(self.content_types);
        StrategyTable { entries, default: self.default }
    }
}

impl StrategyTable {
    pub fn builder(default: Arc<dyn ExtractionStrategy>) -> StrategyTableBuilder {
        StrategyTableBuilder { sites: Vec::new(), content_types: Vec::new(), default }
    }

    /// Build the table described by `config.strategies`.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if a frame pattern is not a valid regex.
    pub fn from_config(
        config: &AppConfig, oracle: Arc<dyn ReadabilityOracle>, fetcher: Arc<dyn ByteFetcher>,
    ) -> Result<Self, Error> {
        let mut builder = Self::builder(Arc::new(ReadableStrategy::new(oracle)));

        for (i, entry) in config.strategies.iter().enumerate() {
            builder = match entry {
                StrategyConfig::Selector { prefix, selector, timeout_ms } => builder.site(
                    prefix.clone(),
                    Arc::new(SelectorStrategy::new(selector.clone(), Duration::from_millis(*timeout_ms))),
                ),
                StrategyConfig::Frame { prefix, frame_src, selector, timeout_ms } => {
                    let pattern = Regex::new(frame_src).map_err(|e| ConfigError::Invalid {
                        field: format!("strategies[{i}].frame_src"),
                        reason: e.to_string(),
                    })?;
                    builder.site(
                        prefix.clone(),
                        Arc::new(FrameStrategy::new(pattern, selector.clone(), Duration::from_millis(*timeout_ms))),
                    )
                }
                StrategyConfig::ContentType { content_type, decoder } => {
                    let decoder: Arc<dyn DocumentDecoder> = match decoder {
                        DecoderKind::Pdf => Arc::new(PdfDecoder),
                    };
                    builder.content_type(
                        content_type,
                        Arc::new(ContentTypeStrategy::new(content_type, fetcher.clone(), decoder)),
                    )
                }
            };
        }

        let table = builder.build();
        tracing::debug!(entries = table.entries.len(), "strategy table built");
        Ok(table)
    }

    /// The non-default strategy registered for this page, if any.
    pub fn lookup(&self, final_url: &Url, content_type: &str) -> Option<Resolved<'_>> {
        let by_prefix = self
            .entries
            .iter()
            .find(|(key, _)| matches!(key, StrategyKey::UrlPrefix(prefix) if final_url.as_str().starts_with(prefix.as_str())));

        by_prefix
            .or_else(|| {
                self.entries
                    .iter()
                    .find(|(key, _)| matches!(key, StrategyKey::ContentType(ct) if !ct.is_empty() && ct == content_type))
            })
            .map(|(key, strategy)| Resolved { key: Some(key), strategy })
    }

    /// The strategy to run for this page; never fails.
    pub fn resolve(&self, final_url: &Url, content_type: &str) -> Resolved<'_> {
        self.lookup(final_url, content_type)
            .unwrap_or(Resolved { key: None, strategy: &self.default })
    }

    #[cfg(test)]
    fn keys(&self) -> impl Iterator<Item = &StrategyKey> {
        self.entries.iter().map(|(key, _)| key)
    }
}
