//! Two-stage readiness protocol and strategy execution.
//!
//! ```text
//! AwaitingFirstCheck --Ready--> Succeeded
//!         |NotReady
//!         v
//! AwaitingSecondCheck --Ready--> Succeeded
//!         |NotReady
//!         v
//!     Exhausted
//! ```
//!
//! The first check runs when the page reports load completion or when the
//! first-stage timer (T1) fires, whichever comes first. The second check runs
//! `max(0, T2 - T1)` later. There is no third.

use std::time::Duration;

use pagetext_core::{AppConfig, Error};
use tokio::time::sleep;

use crate::extract::ReadabilityOracle;
use crate::probe::ReadinessProber;
use crate::render::{RenderError, Session};
use crate::strategy::{StrategyContext, StrategyTable};
use crate::types::{ExtractionResult, NavigationOutcome, ReadinessState, SessionDocument};

/// Offsets of the two readiness checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EscalationSchedule {
    /// T1: latest moment of the first check.
    pub first_check: Duration,

    /// T2: total time the page gets to become reader-ready.
    pub total: Duration,
}

impl EscalationSchedule {
    pub fn new(first_check: Duration, total: Duration) -> Self {
        Self { first_check, total }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.onload_timeout(), config.total_timeout())
    }

    /// Wait between the first and second check; zero when T2 < T1.
    pub fn second_stage_wait(&self) -> Duration {
        self.total.saturating_sub(self.first_check)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EscalationState {
    AwaitingFirstCheck,
    AwaitingSecondCheck,
    Succeeded,
    Exhausted,
}

impl EscalationState {
    /// Transition taken once a readiness check in this state has returned.
    pub fn after_probe(self, readiness: ReadinessState) -> Self {
        match (self, readiness) {
            (EscalationState::AwaitingFirstCheck | EscalationState::AwaitingSecondCheck, ReadinessState::Ready) => {
                EscalationState::Succeeded
            }
            (EscalationState::AwaitingFirstCheck, _) => EscalationState::AwaitingSecondCheck,
            (EscalationState::AwaitingSecondCheck, _) => EscalationState::Exhausted,
            (terminal, _) => terminal,
        }
    }
}

enum FirstStage {
    Loaded,
    TimerElapsed,
    LoadUnavailable(RenderError),
}

/// Drives one session from "navigated" to final text.
pub struct Orchestrator<'a> {
    table: &'a StrategyTable,
    oracle: &'a dyn ReadabilityOracle,
    schedule: EscalationSchedule,
}

impl<'a> Orchestrator<'a> {
    pub fn new(table: &'a StrategyTable, oracle: &'a dyn ReadabilityOracle, schedule: EscalationSchedule) -> Self {
        Self { table, oracle, schedule }
    }

    /// Run the readiness protocol, then the resolved strategy.
    ///
    /// # Errors
    ///
    /// - `Error::TimeoutExhausted` if both checks found the page not ready
    /// - `Error::StrategyDeadline` if the strategy's own deadline fired
    /// - whatever the probe or strategy failed with otherwise
    pub async fn run(&self, session: &dyn Session, outcome: &NavigationOutcome) -> Result<ExtractionResult, Error> {
        let mut prober = ReadinessProber::new(self.table, self.oracle);
        let mut state = EscalationState::AwaitingFirstCheck;

        loop {
            state = match state {
                EscalationState::AwaitingFirstCheck => {
                    self.first_stage(session).await;
                    state.after_probe(prober.probe(session, outcome).await?)
                }
                EscalationState::AwaitingSecondCheck => {
                    let wait = self.schedule.second_stage_wait();
                    tracing::info!(wait_ms = wait.as_millis() as u64, "page not reader-ready; granting second stage");
                    sleep(wait).await;
                    state.after_probe(prober.probe(session, outcome).await?)
                }
                EscalationState::Succeeded => {
                    tracing::info!(checks = prober.checks(), "page reader-ready");
                    return self.extract(session, outcome, prober.document()).await;
                }
                EscalationState::Exhausted => {
                    let waited = self.schedule.total.max(self.schedule.first_check);
                    tracing::info!(waited_ms = waited.as_millis() as u64, "page never became reader-ready");
                    return Err(Error::TimeoutExhausted(waited.as_millis() as u64));
                }
            };
        }
    }

    /// Race load completion against T1; the loser is dropped.
    async fn first_stage(&self, session: &dyn Session) {
        let timer = sleep(self.schedule.first_check);
        tokio::pin!(timer);

        let stage = tokio::select! {
            loaded = session.wait_for_load() => match loaded {
                Ok(()) => FirstStage::Loaded,
                Err(e) => FirstStage::LoadUnavailable(e),
            },
            () = &mut timer => FirstStage::TimerElapsed,
        };

        match stage {
            FirstStage::Loaded => tracing::debug!("load completed before first-stage timer"),
            FirstStage::TimerElapsed => tracing::debug!("first-stage timer elapsed before load completed"),
            FirstStage::LoadUnavailable(e) => {
                tracing::warn!("load signal unavailable ({e}); waiting for first-stage timer");
                timer.await;
            }
        }
    }

    async fn extract(
        &self, session: &dyn Session, outcome: &NavigationOutcome, document: Option<&SessionDocument>,
    ) -> Result<ExtractionResult, Error> {
        let resolved = self.table.resolve(&outcome.final_url, &outcome.content_type);
        let strategy = resolved.strategy;
        tracing::info!(strategy = strategy.name(), key = ?resolved.key, "extracting");

        let ctx = StrategyContext { session, outcome, document };
        let text = match strategy.deadline() {
            Some(deadline) => tokio::time::timeout(deadline, strategy.extract(&ctx))
                .await
                .map_err(|_| Error::StrategyDeadline {
                    strategy: strategy.name().to_string(),
                    timeout_ms: deadline.as_millis() as u64,
                })??,
            None => strategy.extract(&ctx).await?,
        };

        Ok(ExtractionResult { text, strategy: strategy.name().to_string() })
    }
}
