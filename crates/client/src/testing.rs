//! In-memory stand-ins for the browser, oracles and network used by unit tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use bytes::Bytes;
use pagetext_core::Error;
use regex::Regex;
use url::Url;

use crate::extract::ReadabilityOracle;
use crate::fetch::{ByteFetcher, FetchResponse};
use crate::render::{Navigator, RenderError, Session};
use crate::strategy::{ExtractionStrategy, StrategyContext};
use crate::types::{NavigationOutcome, SessionDocument};

/// Marker a [`FakeOracle`] treats as "reader-ready" page content.
pub const READY_MARKER: &str = "<!-- ready -->";

pub fn outcome(url: &str, content_type: &str) -> NavigationOutcome {
    NavigationOutcome::new(Url::parse(url).unwrap(), content_type, Some(200))
}

#[derive(Debug, Clone, Copy)]
pub enum LoadBehavior {
    Never,
    After(Duration),
    Closed,
}

struct Element {
    selector: String,
    text: String,
    appears_after: usize,
}

struct Frame {
    url: String,
    element: Element,
}

/// Scriptable [`Session`].
///
/// Each call to `serialize` yields the next queued page; the last one repeats.
pub struct FakeSession {
    pages: Mutex<VecDeque<String>>,
    location: Option<String>,
    load: LoadBehavior,
    element: Option<Element>,
    frame: Option<Frame>,
    transient_failures: usize,
    closed: bool,
    serialize_calls: AtomicUsize,
    element_calls: AtomicUsize,
    frame_calls: AtomicUsize,
}

impl FakeSession {
    pub fn new(html: &str) -> Self {
        Self::with_pages(&[html])
    }

    pub fn with_pages(pages: &[&str]) -> Self {
        Self {
            pages: Mutex::new(pages.iter().map(|p| p.to_string()).collect()),
            location: None,
            load: LoadBehavior::Never,
            element: None,
            frame: None,
            transient_failures: 0,
            closed: false,
            serialize_calls: AtomicUsize::new(0),
            element_calls: AtomicUsize::new(0),
            frame_calls: AtomicUsize::new(0),
        }
    }

    pub fn with_load(mut self, load: LoadBehavior) -> Self {
        self.load = load;
        self
    }

    pub fn with_location(mut self, location: &str) -> Self {
        self.location = Some(location.to_string());
        self
    }

    /// `selector` starts matching after `appears_after` unsuccessful checks.
    pub fn with_element(mut self, selector: &str, text: &str, appears_after: usize) -> Self {
        self.element = Some(Element { selector: selector.into(), text: text.into(), appears_after });
        self
    }

    pub fn with_frame(mut self, url: &str, selector: &str, text: &str, appears_after: usize) -> Self {
        self.frame = Some(Frame {
            url: url.into(),
            element: Element { selector: selector.into(), text: text.into(), appears_after },
        });
        self
    }

    /// The first `count` element and frame checks fail as if the execution
    /// context had been torn down mid-evaluation.
    pub fn with_transient_failures(mut self, count: usize) -> Self {
        self.transient_failures = count;
        self
    }

    /// Element and frame checks fail as if the browser had gone away.
    pub fn closed(mut self) -> Self {
        self.closed = true;
        self
    }

    fn check_failure(&self, checks: usize) -> Option<RenderError> {
        if self.closed {
            Some(RenderError::BrowserClosed)
        } else if checks < self.transient_failures {
            Some(RenderError::Evaluation("Execution context was destroyed.".into()))
        } else {
            None
        }
    }

    pub fn serialize_calls(&self) -> usize {
        self.serialize_calls.load(Ordering::SeqCst)
    }

    pub fn element_checks(&self) -> usize {
        self.element_calls.load(Ordering::SeqCst)
    }

    pub fn frame_checks(&self) -> usize {
        self.frame_calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl Session for FakeSession {
    async fn wait_for_load(&self) -> Result<(), RenderError> {
        match self.load {
            LoadBehavior::Never => std::future::pending().await,
            LoadBehavior::After(delay) => {
                tokio::time::sleep(delay).await;
                Ok(())
            }
            LoadBehavior::Closed => Err(RenderError::BrowserClosed),
        }
    }

    async fn serialize(&self) -> Result<String, RenderError> {
        self.serialize_calls.fetch_add(1, Ordering::SeqCst);
        let mut pages = self.pages.lock().unwrap();
        let page = if pages.len() > 1 { pages.pop_front() } else { pages.front().cloned() };
        page.ok_or(RenderError::BrowserClosed)
    }

    async fn current_url(&self) -> Result<Url, RenderError> {
        match &self.location {
            Some(location) => Url::parse(location).map_err(|e| RenderError::ContentRetrieval(e.to_string())),
            None => Err(RenderError::ContentRetrieval("no location".into())),
        }
    }

    async fn element_text(&self, selector: &str) -> Result<Option<String>, RenderError> {
        let checks = self.element_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = self.check_failure(checks) {
            return Err(err);
        }
        Ok(self
            .element
            .as_ref()
            .filter(|el| el.selector == selector && checks >= el.appears_after)
            .map(|el| el.text.clone()))
    }

    async fn frame_element_text(&self, frame_src: &Regex, selector: &str) -> Result<Option<String>, RenderError> {
        let checks = self.frame_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = self.check_failure(checks) {
            return Err(err);
        }
        Ok(self
            .frame
            .as_ref()
            .filter(|frame| frame_src.is_match(&frame.url))
            .map(|frame| &frame.element)
            .filter(|el| el.selector == selector && checks >= el.appears_after)
            .map(|el| el.text.clone()))
    }
}

/// [`Navigator`] handing out one prepared session.
pub struct FakeNavigator {
    session: Mutex<Option<FakeSession>>,
    outcome: Result<NavigationOutcome, String>,
    delay: Duration,
    opened: AtomicUsize,
}

impl FakeNavigator {
    pub fn new(session: FakeSession, outcome: NavigationOutcome) -> Self {
        Self { session: Mutex::new(Some(session)), outcome: Ok(outcome), delay: Duration::ZERO, opened: AtomicUsize::new(0) }
    }

    pub fn failing(error: &str) -> Self {
        Self {
            session: Mutex::new(None),
            outcome: Err(error.to_string()),
            delay: Duration::ZERO,
            opened: AtomicUsize::new(0),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl Navigator for FakeNavigator {
    type Session = FakeSession;

    async fn open(&self, _url: &Url) -> Result<(FakeSession, NavigationOutcome), RenderError> {
        self.opened.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        let outcome = self.outcome.clone().map_err(RenderError::Navigation)?;
        let session = self.session.lock().unwrap().take().ok_or(RenderError::BrowserClosed)?;
        Ok((session, outcome))
    }
}

/// Oracle that is ready when configured so, or when the page carries [`READY_MARKER`].
pub struct FakeOracle {
    always_ready: bool,
    text: Option<String>,
    readiness_checks: AtomicUsize,
    extractions: AtomicUsize,
}

impl FakeOracle {
    pub fn new(always_ready: bool, text: &str) -> Arc<Self> {
        Arc::new(Self {
            always_ready,
            text: Some(text.to_string()),
            readiness_checks: AtomicUsize::new(0),
            extractions: AtomicUsize::new(0),
        })
    }

    pub fn arc(always_ready: bool, text: &str) -> Arc<dyn ReadabilityOracle> {
        Self::new(always_ready, text)
    }

    /// Ready on marked pages; extraction returns the document's HTML.
    pub fn echo() -> Arc<Self> {
        Arc::new(Self {
            always_ready: false,
            text: None,
            readiness_checks: AtomicUsize::new(0),
            extractions: AtomicUsize::new(0),
        })
    }

    pub fn readiness_checks(&self) -> usize {
        self.readiness_checks.load(Ordering::SeqCst)
    }

    pub fn extractions(&self) -> usize {
        self.extractions.load(Ordering::SeqCst)
    }
}

impl ReadabilityOracle for FakeOracle {
    fn is_probably_readable(&self, doc: &SessionDocument) -> bool {
        self.readiness_checks.fetch_add(1, Ordering::SeqCst);
        self.always_ready || doc.html.contains(READY_MARKER)
    }

    fn extract_text(&self, doc: &SessionDocument) -> Result<String, Error> {
        self.extractions.fetch_add(1, Ordering::SeqCst);
        Ok(self.text.clone().unwrap_or_else(|| doc.html.clone()))
    }
}

/// Strategy returning fixed text, optionally never finishing.
pub struct FixedStrategy {
    name: String,
    text: String,
    deadline: Option<Duration>,
    hang: bool,
    calls: AtomicUsize,
}

impl FixedStrategy {
    pub fn new(name: &str, text: &str) -> Arc<Self> {
        Arc::new(Self { name: name.into(), text: text.into(), deadline: None, hang: false, calls: AtomicUsize::new(0) })
    }

    pub fn arc(name: &str, text: &str) -> Arc<dyn ExtractionStrategy> {
        Self::new(name, text)
    }

    pub fn hanging(name: &str, deadline: Duration) -> Arc<Self> {
        Arc::new(Self {
            name: name.into(),
            text: String::new(),
            deadline: Some(deadline),
            hang: true,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl ExtractionStrategy for FixedStrategy {
    fn name(&self) -> &str {
        &self.name
    }

    fn deadline(&self) -> Option<Duration> {
        self.deadline
    }

    async fn extract(&self, _ctx: &StrategyContext<'_>) -> Result<String, Error> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.hang {
            std::future::pending::<()>().await;
        }
        Ok(self.text.clone())
    }
}

/// Fetcher serving fixed bytes and recording requested URLs.
pub struct FakeFetcher {
    bytes: Bytes,
    requested: Mutex<Vec<String>>,
}

impl FakeFetcher {
    pub fn new(bytes: &[u8]) -> Arc<Self> {
        Arc::new(Self { bytes: Bytes::copy_from_slice(bytes), requested: Mutex::new(Vec::new()) })
    }

    pub fn arc(bytes: &[u8]) -> Arc<dyn ByteFetcher> {
        Self::new(bytes)
    }

    pub fn requested(&self) -> Vec<String> {
        self.requested.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl ByteFetcher for FakeFetcher {
    async fn fetch(&self, url: &Url) -> Result<FetchResponse, Error> {
        self.requested.lock().unwrap().push(url.to_string());
        Ok(FetchResponse { final_url: url.clone(), bytes: self.bytes.clone() })
    }
}
