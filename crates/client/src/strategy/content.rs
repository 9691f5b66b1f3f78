use std::sync::Arc;

use pagetext_core::Error;
use url::Url;

use super::{ExtractionStrategy, StrategyContext};
use crate::fetch::ByteFetcher;

/// Turns the raw bytes of a binary document into text.
pub trait DocumentDecoder: Send + Sync + 'static {
    fn decode(&self, bytes: &[u8]) -> Result<String, Error>;
}

/// PDF text layer decoder.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfDecoder;

impl DocumentDecoder for PdfDecoder {
    fn decode(&self, bytes: &[u8]) -> Result<String, Error> {
        pdf_extract::extract_text_from_mem(bytes).map_err(|e| Error::DecodeFailed(format!("pdf: {e}")))
    }
}

/// Skips the DOM entirely: downloads the bytes at the page location and decodes them.
pub struct ContentTypeStrategy {
    name: String,
    fetcher: Arc<dyn ByteFetcher>,
    decoder: Arc<dyn DocumentDecoder>,
}

impl ContentTypeStrategy {
    pub fn new(content_type: &str, fetcher: Arc<dyn ByteFetcher>, decoder: Arc<dyn DocumentDecoder>) -> Self {
        Self { name: format!("content_type:{content_type}"), fetcher, decoder }
    }

    /// Where the document bytes live: the page location when it is a web URL,
    /// else the final URL of the navigation.
    async fn location(&self, ctx: &StrategyContext<'_>) -> Url {
        match ctx.session.current_url().await {
            Ok(url) if matches!(url.scheme(), "http" | "https") => url,
            Ok(url) => {
                tracing::debug!(location = %url, "page location is not a web URL; using navigation result");
                ctx.outcome.final_url.clone()
            }
            Err(e) => {
                tracing::debug!("page location unavailable ({e}); using navigation result");
                ctx.outcome.final_url.clone()
            }
        }
    }
}

#[async_trait::async_trait]
impl ExtractionStrategy for ContentTypeStrategy {
    fn name(&self) -> &str {
        &self.name
    }

    async fn extract(&self, ctx: &StrategyContext<'_>) -> Result<String, Error> {
        let location = self.location(ctx).await;
        let response = self.fetcher.fetch(&location).await?;
        tracing::debug!(url = %response.final_url, bytes = response.bytes.len(), "decoding raw document");

        let decoder = Arc::clone(&self.decoder);
        let bytes = response.bytes;
        tokio::task::spawn_blocking(move || decoder.decode(&bytes))
            .await
            .map_err(|e| Error::DecodeFailed(format!("decoder aborted: {e}")))?
    }
}
