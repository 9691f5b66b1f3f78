use std::time::Duration;

use pagetext_core::Error;
use regex::Regex;

use super::{ExtractionStrategy, POLL_INTERVAL, StrategyContext};
use crate::render::RenderError;

/// Reads content rendered inside an embedded frame.
///
/// The frame may attach late or not at all; absence is polled, never an
/// error, and the deadline bounds the wait.
pub struct FrameStrategy {
    frame_src: Regex,
    selector: String,
    timeout: Duration,
}

impl FrameStrategy {
    pub fn new(frame_src: Regex, selector: String, timeout: Duration) -> Self {
        Self { frame_src, selector, timeout }
    }
}

#[async_trait::async_trait]
impl ExtractionStrategy for FrameStrategy {
    fn name(&self) -> &str {
        "frame"
    }

    fn deadline(&self) -> Option<Duration> {
        Some(self.timeout)
    }

    async fn extract(&self, ctx: &StrategyContext<'_>) -> Result<String, Error> {
        loop {
            match ctx.session.frame_element_text(&self.frame_src, &self.selector).await {
                Ok(Some(text)) if !text.trim().is_empty() => return Ok(text),
                Ok(_) => {
                    tracing::trace!(frame_src = %self.frame_src, selector = %self.selector, "frame content not present yet");
                }
                // The frame detached or navigated during the check.
                Err(RenderError::Evaluation(e)) => tracing::debug!("frame check failed ({e}); retrying"),
                Err(e) => return Err(e.into()),
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeSession, outcome};

    fn strategy() -> FrameStrategy {
        FrameStrategy::new(
            Regex::new(r"^https://viewer\.example\.org/embed/").unwrap(),
            "#doc".into(),
            Duration::from_secs(4),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_reads_text_inside_matching_frame() {
        let session = FakeSession::new("<html></html>").with_frame(
            "https://viewer.example.org/embed/42",
            "#doc",
            "Framed text",
            0,
        );
        let outcome = outcome("https://reader.example.org/item/42", "text/html");
        let ctx = StrategyContext { session: &session, outcome: &outcome, document: None };

        assert_eq!(strategy().extract(&ctx).await.unwrap(), "Framed text");
    }

    #[tokio::test(start_paused = true)]
    async fn test_tolerates_frame_attaching_late() {
        let session = FakeSession::new("<html></html>").with_frame(
            "https://viewer.example.org/embed/42",
            "#doc",
            "Framed text",
            5,
        );
        let outcome = outcome("https://reader.example.org/item/42", "text/html");
        let ctx = StrategyContext { session: &session, outcome: &outcome, document: None };

        assert_eq!(strategy().extract(&ctx).await.unwrap(), "Framed text");
        assert_eq!(session.frame_checks(), 6);
    }

    #[tokio::test(start_paused = true)]
    async fn test_keeps_polling_after_frame_detaches_mid_check() {
        let session = FakeSession::new("<html></html>")
            .with_frame("https://viewer.example.org/embed/42", "#doc", "Framed text", 0)
            .with_transient_failures(2);
        let outcome = outcome("https://reader.example.org/item/42", "text/html");
        let ctx = StrategyContext { session: &session, outcome: &outcome, document: None };

        let start = tokio::time::Instant::now();
        assert_eq!(strategy().extract(&ctx).await.unwrap(), "Framed text");
        assert_eq!(session.frame_checks(), 3);
        assert_eq!(start.elapsed(), POLL_INTERVAL * 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_closed_browser_is_fatal() {
        let session = FakeSession::new("<html></html>")
            .with_frame("https://viewer.example.org/embed/42", "#doc", "Framed text", 0)
            .closed();
        let outcome = outcome("https://reader.example.org/item/42", "text/html");
        let ctx = StrategyContext { session: &session, outcome: &outcome, document: None };

        assert!(matches!(strategy().extract(&ctx).await, Err(Error::RenderFailed(_))));
        assert_eq!(session.frame_checks(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_non_matching_frame_keeps_waiting() {
        let session = FakeSession::new("<html></html>").with_frame(
            "https://ads.example.net/slot",
            "#doc",
            "Ad text",
            0,
        );
        let outcome = outcome("https://reader.example.org/item/42", "text/html");
        let ctx = StrategyContext { session: &session, outcome: &outcome, document: None };

        let result = tokio::time::timeout(Duration::from_secs(2), strategy().extract(&ctx)).await;
        assert!(result.is_err());
        assert!(session.frame_checks() > 1);
    }
}
