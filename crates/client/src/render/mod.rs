//! Rendering sessions for extraction runs.
//!
//! The orchestration only talks to a browser through the [`Navigator`] and
//! [`Session`] traits. The chromiumoxide-backed implementation lives behind
//! the `render` feature.

#[cfg(feature = "render")]
mod chrome;

#[cfg(feature = "render")]
pub use chrome::{ChromeNavigator, ChromeSession};

use std::path::PathBuf;
use std::time::Duration;

use pagetext_core::{AppConfig, Error};
use regex::Regex;
use thiserror::Error;
use url::Url;

use crate::types::NavigationOutcome;

/// Errors that can occur while driving the browser.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Failed to launch or connect to browser.
    #[error("browser launch failed: {0}")]
    BrowserLaunch(String),

    /// Failed to navigate to URL.
    #[error("navigation failed: {0}")]
    Navigation(String),

    /// Failed to get page content.
    #[error("content retrieval failed: {0}")]
    ContentRetrieval(String),

    /// Script evaluation in the page or one of its frames failed.
    #[error("evaluation failed: {0}")]
    Evaluation(String),

    /// Timeout waiting for the main document response.
    #[error("navigation timeout after {0}ms")]
    Timeout(u64),

    /// Browser closed unexpectedly.
    #[error("browser closed unexpectedly")]
    BrowserClosed,
}

impl From<RenderError> for Error {
    fn from(err: RenderError) -> Self {
        match err {
            RenderError::Navigation(_) | RenderError::Timeout(_) => Error::NavigationFailed(err.to_string()),
            _ => Error::RenderFailed(err.to_string()),
        }
    }
}

/// Options for launching the browser and loading a page.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Navigation timeout in milliseconds (default: 30000).
    pub timeout_ms: u64,

    /// Viewport dimensions (default: 1280x720).
    pub viewport: (u32, u32),

    pub headless: bool,

    pub user_agent: Option<String>,

    pub chrome_executable: Option<PathBuf>,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self { timeout_ms: 30000, viewport: (1280, 720), headless: true, user_agent: None, chrome_executable: None }
    }
}

impl RenderOptions {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            timeout_ms: config.navigation_timeout_ms,
            viewport: (config.viewport_width, config.viewport_height),
            headless: config.headless,
            user_agent: config.user_agent.clone(),
            chrome_executable: config.chrome_executable.clone(),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// A live rendering context for one extraction request.
///
/// Element lookups return `Ok(None)` while the element is absent so callers
/// can poll; `Err` is reserved for the browser itself failing.
#[async_trait::async_trait]
pub trait Session: Send + Sync {
    /// Resolve when the page reports load completion.
    async fn wait_for_load(&self) -> Result<(), RenderError>;

    /// Serialize the currently rendered document.
    async fn serialize(&self) -> Result<String, RenderError>;

    /// Current location of the page.
    async fn current_url(&self) -> Result<Url, RenderError>;

    /// Text of the first element matching `selector`, if present.
    async fn element_text(&self, selector: &str) -> Result<Option<String>, RenderError>;

    /// Text of the first element matching `selector` inside the first child
    /// frame whose URL matches `frame_src`, if both are present.
    async fn frame_element_text(&self, frame_src: &Regex, selector: &str) -> Result<Option<String>, RenderError>;
}

/// Opens rendering sessions.
#[async_trait::async_trait]
pub trait Navigator: Send + Sync {
    type Session: Session;

    /// Start loading `url` in a new session and return once the main document
    /// response has been received. Load completion is reported separately by
    /// [`Session::wait_for_load`].
    async fn open(&self, url: &Url) -> Result<(Self::Session, NavigationOutcome), RenderError>;
}

/// Script returning the JSON-encoded text of the first `selector` match, or `null`.
pub(crate) fn element_text_script(selector: &str) -> String {
    let selector = serde_json::Value::String(selector.to_string());
    format!("JSON.stringify((() => {{ const el = document.querySelector({selector}); return el ? el.innerText : null; }})())")
}

pub(crate) fn decode_text_result(raw: &str) -> Result<Option<String>, RenderError> {
    serde_json::from_str(raw).map_err(|e| RenderError::Evaluation(e.to_string()))
}
