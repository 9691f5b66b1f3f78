//! Opens the requested page and records what the main response turned out to be.

use std::time::Duration;

use pagetext_core::Error;

use crate::render::Navigator;
use crate::request::ExtractionRequest;
use crate::types::NavigationOutcome;

pub struct NavigationCoordinator<'a, N: Navigator> {
    navigator: &'a N,
    timeout: Duration,
}

impl<'a, N: Navigator> NavigationCoordinator<'a, N> {
    pub fn new(navigator: &'a N, timeout: Duration) -> Self {
        Self { navigator, timeout }
    }

    /// Open a session on the request URL.
    ///
    /// # Errors
    ///
    /// Returns `Error::NavigationFailed` if the page could not be opened or no
    /// main document response arrived within the navigation timeout.
    pub async fn navigate(&self, request: &ExtractionRequest) -> Result<(N::Session, NavigationOutcome), Error> {
        let url = request.url();
        tracing::info!(url = %url, "navigating");

        let (session, outcome) = tokio::time::timeout(self.timeout, self.navigator.open(url))
            .await
            .map_err(|_| {
                Error::NavigationFailed(format!("no response from {url} within {}ms", self.timeout.as_millis()))
            })??;

        if outcome.final_url != *url {
            tracing::info!(from = %url, to = %outcome.final_url, "redirected");
        }
        if let Some(status) = outcome.status
            && status >= 400
        {
            tracing::warn!(status, url = %outcome.final_url, "main document returned an error status");
        }
        tracing::debug!(
            content_type = %outcome.content_type,
            status = ?outcome.status,
            "main document received"
        );

        Ok((session, outcome))
    }
}
