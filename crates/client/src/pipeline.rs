//! One extraction run: navigate, wait for readiness, extract.

use pagetext_core::{AppConfig, Error};

use crate::escalation::{EscalationSchedule, Orchestrator};
use crate::extract::ReadabilityOracle;
use crate::navigate::NavigationCoordinator;
use crate::render::Navigator;
use crate::request::ExtractionRequest;
use crate::strategy::StrategyTable;
use crate::types::ExtractionResult;

/// Run the full extraction for `request` in a session opened by `navigator`.
///
/// The session is owned by this call and dropped when it returns.
pub async fn run_extraction<N: Navigator>(
    navigator: &N, table: &StrategyTable, oracle: &dyn ReadabilityOracle, config: &AppConfig,
    request: &ExtractionRequest,
) -> Result<ExtractionResult, Error> {
    let coordinator = NavigationCoordinator::new(navigator, config.navigation_timeout());
    let (session, outcome) = coordinator.navigate(request).await?;

    let orchestrator = Orchestrator::new(table, oracle, EscalationSchedule::from_config(config));
    let result = orchestrator.run(&session, &outcome).await?;

    tracing::info!(strategy = %result.strategy, chars = result.text.chars().count(), "extraction finished");
    Ok(result)
}
