//! Core types and shared functionality for pagetext.
//!
//! This crate provides:
//! - Unified error types and their exit status mapping
//! - Layered configuration, including the strategy table entries

pub mod config;
pub mod error;

pub use config::{AppConfig, ConfigError, StrategyConfig};
pub use error::{Error, ExitStatus};
