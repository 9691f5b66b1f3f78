use std::sync::Arc;

use pagetext_core::Error;

use super::{ExtractionStrategy, StrategyContext};
use crate::extract::ReadabilityOracle;
use crate::types::SessionDocument;

/// Default strategy: main-content heuristic over the cached snapshot.
pub struct ReadableStrategy {
    oracle: Arc<dyn ReadabilityOracle>,
}

impl ReadableStrategy {
    pub fn new(oracle: Arc<dyn ReadabilityOracle>) -> Self {
        Self { oracle }
    }
}

#[async_trait::async_trait]
impl ExtractionStrategy for ReadableStrategy {
    fn name(&self) -> &str {
        "readable"
    }

    async fn extract(&self, ctx: &StrategyContext<'_>) -> Result<String, Error> {
        if let Some(doc) = ctx.document {
            return self.oracle.extract_text(doc);
        }

        let html = ctx.session.serialize().await?;
        let doc = SessionDocument { html, url: ctx.outcome.final_url.clone() };
        self.oracle.extract_text(&doc)
    }
}
