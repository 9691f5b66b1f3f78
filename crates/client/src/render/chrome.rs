//! Headless Chrome/Chromium sessions using chromiumoxide.

use chromiumoxide::Page;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::network::{EventResponseReceived, ResourceType};
use chromiumoxide::cdp::browser_protocol::page::{
    CreateIsolatedWorldParams, EventLoadEventFired, FrameId, FrameTree, GetFrameTreeParams, NavigateParams,
};
use chromiumoxide::cdp::js_protocol::runtime::EvaluateParams;
use chromiumoxide::handler::viewport::Viewport;
use chromiumoxide::listeners::EventStream;
use futures_util::StreamExt;
use regex::Regex;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use url::Url;

use super::{Navigator, RenderError, RenderOptions, Session, decode_text_result, element_text_script};
use crate::types::NavigationOutcome;

/// Keeps cross-origin iframes in the page's renderer process, so they show up
/// in the page's frame tree and can be evaluated through its session.
const SAME_PROCESS_FRAME_ARGS: [&str; 2] =
    ["--disable-features=IsolateOrigins,site-per-process", "--disable-site-isolation-trials"];

/// Launches one browser and opens pages in it.
pub struct ChromeNavigator {
    browser: Browser,
    options: RenderOptions,
    handler: JoinHandle<()>,
}

impl ChromeNavigator {
    /// Launch a browser instance.
    ///
    /// The browser uses a background task to handle Chrome DevTools Protocol
    /// events for as long as the navigator lives.
    pub async fn launch(options: RenderOptions) -> Result<Self, RenderError> {
        let (width, height) = options.viewport;
        let mut builder = BrowserConfig::builder()
            .window_size(width, height)
            .viewport(Viewport { width, height, ..Default::default() });
        if !options.headless {
            builder = builder.with_head();
        }
        if let Some(path) = &options.chrome_executable {
            builder = builder.chrome_executable(path);
        }
        for arg in SAME_PROCESS_FRAME_ARGS {
            builder = builder.arg(arg);
        }

        let (browser, mut handler) = Browser::launch(builder.build().map_err(RenderError::BrowserLaunch)?)
            .await
            .map_err(|e| RenderError::BrowserLaunch(e.to_string()))?;

        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    tracing::debug!("browser handler event error: {e}");
                }
            }
        });

        tracing::debug!(headless = options.headless, "browser launched");
        Ok(Self { browser, options, handler })
    }
}

impl Drop for ChromeNavigator {
    fn drop(&mut self) {
        self.handler.abort();
    }
}

#[async_trait::async_trait]
impl Navigator for ChromeNavigator {
    type Session = ChromeSession;

    async fn open(&self, url: &Url) -> Result<(ChromeSession, NavigationOutcome), RenderError> {
        let deadline = Instant::now() + self.options.timeout();

        let page = self
            .browser
            .new_page("about:blank")
            .await
            .map_err(|e| RenderError::Navigation(e.to_string()))?;

        if let Some(user_agent) = &self.options.user_agent {
            page.set_user_agent(user_agent.as_str())
                .await
                .map_err(|e| RenderError::Navigation(e.to_string()))?;
        }

        // Subscribed before navigating so neither event can be missed.
        let mut responses = page
            .event_listener::<EventResponseReceived>()
            .await
            .map_err(|e| RenderError::Navigation(e.to_string()))?;
        let loads = page
            .event_listener::<EventLoadEventFired>()
            .await
            .map_err(|e| RenderError::Navigation(e.to_string()))?;

        let navigated = tokio::time::timeout_at(deadline, page.execute(NavigateParams::new(url.as_str())))
            .await
            .map_err(|_| RenderError::Timeout(self.options.timeout_ms))?
            .map_err(|e| RenderError::Navigation(e.to_string()))?;

        let frame_id = navigated.result.frame_id.clone();
        let error_text = navigated.result.error_text.clone().filter(|text| !text.is_empty());

        let document = tokio::time::timeout_at(deadline, async {
            while let Some(event) = responses.next().await {
                if event.r#type == ResourceType::Document && event.frame_id.as_ref() == Some(&frame_id) {
                    return Some(event);
                }
            }
            None
        })
        .await
        .ok()
        .flatten();

        let event = match (document, error_text) {
            (Some(event), None) => event,
            (Some(event), Some(error)) => {
                // Headless Chromium aborts navigations that become downloads (PDF and friends).
                tracing::warn!(%url, %error, "navigation reported an error after the document response; continuing");
                event
            }
            (None, Some(error)) => return Err(RenderError::Navigation(error)),
            (None, None) => return Err(RenderError::Timeout(self.options.timeout_ms)),
        };

        let response = &event.response;
        let final_url = Url::parse(&response.url).map_err(|e| RenderError::Navigation(e.to_string()))?;
        let status = u16::try_from(response.status).ok();

        let outcome = NavigationOutcome::new(final_url, &response.mime_type, status);
        tracing::debug!(
            "navigated {} -> {} ({}, status {:?})",
            url,
            outcome.final_url,
            outcome.content_type,
            outcome.status
        );

        Ok((ChromeSession { page, loads: Mutex::new(loads) }, outcome))
    }
}

/// One page inside the launched browser.
pub struct ChromeSession {
    page: Page,
    loads: Mutex<EventStream<EventLoadEventFired>>,
}

#[async_trait::async_trait]
impl Session for ChromeSession {
    async fn wait_for_load(&self) -> Result<(), RenderError> {
        let mut loads = self.loads.lock().await;
        loads.next().await.map(|_| ()).ok_or(RenderError::BrowserClosed)
    }

    async fn serialize(&self) -> Result<String, RenderError> {
        self.page
            .content()
            .await
            .map_err(|e| RenderError::ContentRetrieval(e.to_string()))
    }

    async fn current_url(&self) -> Result<Url, RenderError> {
        let location = self
            .page
            .url()
            .await
            .map_err(|e| RenderError::ContentRetrieval(e.to_string()))?
            .ok_or_else(|| RenderError::ContentRetrieval("page has no location".into()))?;

        Url::parse(&location).map_err(|e| RenderError::ContentRetrieval(e.to_string()))
    }

    async fn element_text(&self, selector: &str) -> Result<Option<String>, RenderError> {
        let raw: String = self
            .page
            .evaluate(element_text_script(selector))
            .await
            .map_err(|e| RenderError::Evaluation(e.to_string()))?
            .into_value()
            .map_err(|e| RenderError::Evaluation(e.to_string()))?;

        decode_text_result(&raw)
    }

    async fn frame_element_text(&self, frame_src: &Regex, selector: &str) -> Result<Option<String>, RenderError> {
        let tree = self
            .page
            .execute(GetFrameTreeParams::default())
            .await
            .map_err(|e| RenderError::Evaluation(e.to_string()))?
            .result
            .frame_tree;

        let Some(frame_id) = find_child_frame(&tree, frame_src) else {
            return Ok(None);
        };

        // The frame can detach between the tree snapshot and this call.
        let world = match self.page.execute(CreateIsolatedWorldParams::new(frame_id)).await {
            Ok(world) => world,
            Err(e) => {
                tracing::debug!("frame not ready for evaluation: {e}");
                return Ok(None);
            }
        };

        let params = EvaluateParams::builder()
            .expression(element_text_script(selector))
            .context_id(world.result.execution_context_id)
            .return_by_value(true)
            .build()
            .map_err(RenderError::Evaluation)?;

        // Same race as above: the frame may navigate away mid-evaluation.
        let evaluated = match self.page.execute(params).await {
            Ok(evaluated) => evaluated,
            Err(e) => {
                tracing::debug!("frame evaluation failed: {e}");
                return Ok(None);
            }
        };

        match evaluated.result.result.value.as_ref().and_then(|value| value.as_str()) {
            Some(raw) => decode_text_result(raw),
            None => Ok(None),
        }
    }
}

/// First descendant frame (never the main frame) whose URL matches `pattern`.
fn find_child_frame(tree: &FrameTree, pattern: &Regex) -> Option<FrameId> {
    tree.child_frames.iter().flatten().find_map(|child| {
        if pattern.is_match(&child.frame.url) {
            Some(child.frame.id.clone())
        } else {
            find_child_frame(child, pattern)
        }
    })
}
