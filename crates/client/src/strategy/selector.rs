use std::time::Duration;

use pagetext_core::Error;

use super::{ExtractionStrategy, POLL_INTERVAL, StrategyContext};
use crate::render::RenderError;

/// Reads the text of a site's known content container once it has rendered.
pub struct SelectorStrategy {
    selector: String,
    timeout: Duration,
}

impl SelectorStrategy {
    pub fn new(selector: String, timeout: Duration) -> Self {
        Self { selector, timeout }
    }
}

#[async_trait::async_trait]
impl ExtractionStrategy for SelectorStrategy {
    fn name(&self) -> &str {
        "selector"
    }

    fn deadline(&self) -> Option<Duration> {
        Some(self.timeout)
    }

    async fn extract(&self, ctx: &StrategyContext<'_>) -> Result<String, Error> {
        loop {
            match ctx.session.element_text(&self.selector).await {
                // An empty container is still being filled in.
                Ok(Some(text)) if !text.trim().is_empty() => return Ok(text),
                Ok(_) => tracing::trace!(selector = %self.selector, "content container not present yet"),
                // Client-side navigation replaced the execution context.
                Err(RenderError::Evaluation(e)) => tracing::debug!("container check failed ({e}); retrying"),
                Err(e) => return Err(e.into()),
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }
}
