//! Readiness checks: is the rendered page extractable right now?

use pagetext_core::Error;

use crate::extract::ReadabilityOracle;
use crate::render::Session;
use crate::strategy::StrategyTable;
use crate::types::{NavigationOutcome, ReadinessState, SessionDocument};

/// Answers readiness for one session and keeps the snapshot of the last check.
///
/// Pages with a registered strategy are ready immediately: those strategies
/// wait for their own structure. Everything else is serialized and judged by
/// the heuristic oracle; that snapshot is what the default strategy extracts
/// from, so the page is not serialized twice.
pub struct ReadinessProber<'a> {
    table: &'a StrategyTable,
    oracle: &'a dyn ReadabilityOracle,
    document: Option<SessionDocument>,
    checks: u32,
}

impl<'a> ReadinessProber<'a> {
    pub fn new(table: &'a StrategyTable, oracle: &'a dyn ReadabilityOracle) -> Self {
        Self { table, oracle, document: None, checks: 0 }
    }

    pub async fn probe(&mut self, session: &dyn Session, outcome: &NavigationOutcome) -> Result<ReadinessState, Error> {
        self.checks += 1;
        // The page may have kept rendering since the previous check.
        self.document = None;

        if let Some(resolved) = self.table.lookup(&outcome.final_url, &outcome.content_type) {
            tracing::debug!(
                check = self.checks,
                strategy = resolved.strategy.name(),
                "registered strategy matches; skipping readability heuristic"
            );
            return Ok(ReadinessState::Ready);
        }

        let html = session.serialize().await?;
        let doc = SessionDocument { html, url: outcome.final_url.clone() };
        let readable = self.oracle.is_probably_readable(&doc);
        self.document = Some(doc);

        let state = if readable { ReadinessState::Ready } else { ReadinessState::NotReady };
        tracing::debug!(check = self.checks, ?state, "readiness probed");
        Ok(state)
    }

    /// Snapshot taken by the most recent check, if it serialized the page.
    pub fn document(&self) -> Option<&SessionDocument> {
        self.document.as_ref()
    }

    pub fn checks(&self) -> u32 {
        self.checks
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeOracle, FakeSession, FixedStrategy, READY_MARKER, outcome};

    fn table() -> StrategyTable {
        StrategyTable::builder(FixedStrategy::arc("default", "d"))
            .site("https://site.example.com/", FixedStrategy::arc("site", "s"))
            .content_type("application/pdf", FixedStrategy::arc("pdf", "p"))
            .build()
    }

    #[tokio::test]
    async fn test_starts_unchecked() {
        let table = table();
        let oracle = FakeOracle::new(true, "t");
        let prober = ReadinessProber::new(&table, oracle.as_ref());
        assert_eq!(prober.checks(), 0);
        assert!(prober.document().is_none());
    }

    #[tokio::test]
    async fn test_site_match_is_ready_without_serializing() {
        let table = table();
        let oracle = FakeOracle::new(false, "t");
        let session = FakeSession::new("<html></html>");
        let mut prober = ReadinessProber::new(&table, oracle.as_ref());

        let state = prober.probe(&session, &outcome("https://site.example.com/a", "text/html")).await.unwrap();
        assert_eq!(state, ReadinessState::Ready);
        assert_eq!(session.serialize_calls(), 0);
        assert_eq!(oracle.readiness_checks(), 0);
        assert!(prober.document().is_none());
    }

    #[tokio::test]
    async fn test_content_type_match_is_ready() {
        let table = table();
        let oracle = FakeOracle::new(false, "t");
        let session = FakeSession::new("<html></html>");
        let mut prober = ReadinessProber::new(&table, oracle.as_ref());

        let state = prober.probe(&session, &outcome("https://other.example.com/x", "application/pdf")).await.unwrap();
        assert_eq!(state, ReadinessState::Ready);
        assert_eq!(session.serialize_calls(), 0);
    }

    #[tokio::test]
    async fn test_heuristic_decides_otherwise() {
        let table = table();
        let oracle = FakeOracle::echo();
        let session = FakeSession::with_pages(&["<html>loading</html>", READY_MARKER]);
        let mut prober = ReadinessProber::new(&table, oracle.as_ref());
        let outcome = outcome("https://news.example.com/", "text/html");

        assert_eq!(prober.probe(&session, &outcome).await.unwrap(), ReadinessState::NotReady);
        assert_eq!(prober.document().unwrap().html, "<html>loading</html>");

        assert_eq!(prober.probe(&session, &outcome).await.unwrap(), ReadinessState::Ready);
        assert_eq!(prober.document().unwrap().html, READY_MARKER);
        assert_eq!(prober.checks(), 2);
        assert_eq!(session.serialize_calls(), 2);
    }

    #[tokio::test]
    async fn test_cache_cleared_when_serialization_fails() {
        let table = table();
        let oracle = FakeOracle::echo();
        let session = FakeSession::with_pages(&[]);
        let mut prober = ReadinessProber::new(&table, oracle.as_ref());

        let result = prober.probe(&session, &outcome("https://news.example.com/", "text/html")).await;
        assert!(matches!(result, Err(Error::RenderFailed(_))));
        assert!(prober.document().is_none());
    }
}
