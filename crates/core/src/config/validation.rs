//! Configuration validation rules.
//!
//! This module provides validation logic for `AppConfig` values
//! after they have been loaded from environment, files, or defaults.

use crate::config::{AppConfig, StrategyConfig};
use thiserror::Error;

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },
}

const MIN_TIMEOUT_MS: u64 = 100;
const MAX_TIMEOUT_MS: u64 = 300_000;
const MAX_FETCH_BYTES: usize = 100 * 1024 * 1024;

fn check_timeout(field: &str, value: u64) -> Result<(), ConfigError> {
    if value < MIN_TIMEOUT_MS {
        return Err(ConfigError::Invalid { field: field.into(), reason: "must be at least 100ms".into() });
    }
    if value > MAX_TIMEOUT_MS {
        return Err(ConfigError::Invalid {
            field: field.into(),
            reason: "must not exceed 5 minutes (300000ms)".into(),
        });
    }
    Ok(())
}

fn require_non_empty(field: String, value: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::Invalid { field, reason: "must not be empty".into() });
    }
    Ok(())
}

impl AppConfig {
    /// Validate configuration values after loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if:
    /// - any timeout is less than 100ms or exceeds 5 minutes
    /// - `fetch_max_bytes` is 0 or exceeds 100MB
    /// - the viewport has a zero dimension
    /// - a strategy entry has an empty prefix, selector or content type
    ///
    /// A total timeout shorter than the onload timeout is accepted with a
    /// warning; the second readiness stage then waits zero time.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_timeout("onload_timeout_ms", self.onload_timeout_ms)?;
        check_timeout("total_timeout_ms", self.total_timeout_ms)?;
        check_timeout("navigation_timeout_ms", self.navigation_timeout_ms)?;
        check_timeout("fetch_timeout_ms", self.fetch_timeout_ms)?;

        if self.total_timeout_ms < self.onload_timeout_ms {
            tracing::warn!(
                onload_timeout_ms = self.onload_timeout_ms,
                total_timeout_ms = self.total_timeout_ms,
                "total_timeout_ms is shorter than onload_timeout_ms; \
                 the second readiness check will run immediately"
            );
        }

        if self.fetch_max_bytes == 0 {
            return Err(ConfigError::Invalid {
                field: "fetch_max_bytes".into(),
                reason: "must be greater than 0".into(),
            });
        }
        if self.fetch_max_bytes > MAX_FETCH_BYTES {
            return Err(ConfigError::Invalid {
                field: "fetch_max_bytes".into(),
                reason: "must not exceed 100MB".into(),
            });
        }

        if self.viewport_width == 0 || self.viewport_height == 0 {
            return Err(ConfigError::Invalid { field: "viewport".into(), reason: "dimensions must be non-zero".into() });
        }

        if let Some(ua) = &self.user_agent {
            require_non_empty("user_agent".into(), ua)?;
        }

        for (i, entry) in self.strategies.iter().enumerate() {
            match entry {
                StrategyConfig::Selector { prefix, selector, timeout_ms } => {
                    require_non_empty(format!("strategies[{i}].prefix"), prefix)?;
                    require_non_empty(format!("strategies[{i}].selector"), selector)?;
                    check_timeout(&format!("strategies[{i}].timeout_ms"), *timeout_ms)?;
                }
                StrategyConfig::Frame { prefix, frame_src, selector, timeout_ms } => {
                    require_non_empty(format!("strategies[{i}].prefix"), prefix)?;
                    require_non_empty(format!("strategies[{i}].frame_src"), frame_src)?;
                    require_non_empty(format!("strategies[{i}].selector"), selector)?;
                    check_timeout(&format!("strategies[{i}].timeout_ms"), *timeout_ms)?;
                }
                StrategyConfig::ContentType { content_type, .. } => {
                    require_non_empty(format!("strategies[{i}].content_type"), content_type)?;
                }
            }
        }

        Ok(())
    }
}
