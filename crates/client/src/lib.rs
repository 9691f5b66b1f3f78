//! Extraction engine for pagetext.
//!
//! This crate opens a page in a rendering session, waits until it is
//! reader-ready using a two-stage timeout, and extracts its main text with the
//! strategy registered for the page (or the readability heuristic).

pub mod escalation;
pub mod extract;
pub mod fetch;
pub mod navigate;
pub mod pipeline;
pub mod probe;
pub mod render;
pub mod request;
pub mod strategy;
pub mod types;

#[cfg(test)]
mod testing;

pub use escalation::{EscalationSchedule, EscalationState, Orchestrator};
pub use extract::{ExtractConfig, LectitoOracle, ReadabilityOracle};
pub use fetch::{ByteFetcher, FetchClient, FetchConfig, FetchResponse};
pub use navigate::NavigationCoordinator;
pub use pipeline::run_extraction;
pub use probe::ReadinessProber;
pub use render::{Navigator, RenderError, RenderOptions, Session};
pub use request::{ExtractionRequest, RequestError};
pub use strategy::{ExtractionStrategy, StrategyContext, StrategyKey, StrategyTable};
pub use types::{ExtractionResult, NavigationOutcome, ReadinessState, SessionDocument};

#[cfg(feature = "render")]
pub use render::{ChromeNavigator, ChromeSession};
