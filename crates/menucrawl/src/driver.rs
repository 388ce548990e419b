//! Browser driver abstraction.
//!
//! The crawl engine only ever talks to a [`BrowserDriver`]. The real
//! implementation lives in [`crate::browser`] (feature `browser`) and drives
//! Chromium over CDP; [`MockDriver`] serves scripted pages for tests.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │  BrowserDriver (trait)                                   │
//! │    navigate / ready_state / find_elements / click /      │
//! │    text / attribute / quit                               │
//! ├────────────────────────────┬─────────────────────────────┤
//! │  ChromiumDriver            │  MockDriver                 │
//! │  chromiumoxide over CDP    │  scripted pages, call log   │
//! └────────────────────────────┴─────────────────────────────┘
//! ```

use crate::result::{CrawlError, CrawlResult};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tracing::debug;

/// Value of `document.readyState` once a page has fully loaded
pub const READY_STATE_COMPLETE: &str = "complete";

/// Browser launch configuration
#[derive(Debug, Clone)]
pub struct DriverConfig {
    /// Run in headless mode
    pub headless: bool,
    /// Sandbox mode (disable for containers)
    pub sandbox: bool,
    /// Viewport width
    pub viewport_width: u32,
    /// Viewport height
    pub viewport_height: u32,
    /// Path to chromium binary (None = auto-detect)
    pub executable_path: Option<PathBuf>,
    /// Timeout for a single CDP request
    pub request_timeout: Duration,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            headless: true,
            sandbox: true,
            viewport_width: 1920,
            viewport_height: 1080,
            executable_path: None,
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl DriverConfig {
    /// Create new config with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set headless mode
    #[must_use]
    pub const fn headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    /// Disable sandbox (for containers/CI)
    #[must_use]
    pub const fn no_sandbox(mut self) -> Self {
        self.sandbox = false;
        self
    }

    /// Set viewport dimensions
    #[must_use]
    pub const fn viewport(mut self, width: u32, height: u32) -> Self {
        self.viewport_width = width;
        self.viewport_height = height;
        self
    }

    /// Set chromium executable path
    #[must_use]
    pub fn executable_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.executable_path = Some(path.into());
        self
    }

    /// Set CDP request timeout
    #[must_use]
    pub const fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

/// Browser session used by the crawl engine.
///
/// Selectors are passed through untouched; a malformed selector is reported
/// by `find_elements` at lookup time.
#[async_trait]
pub trait BrowserDriver: Send + Sync {
    /// Handle to a resolved DOM element
    type Handle: Send + Sync;

    /// Navigate the session to `url`
    async fn navigate(&mut self, url: &str) -> CrawlResult<()>;

    /// Current `document.readyState`
    async fn ready_state(&self) -> CrawlResult<String>;

    /// All elements matching `selector`, in document order
    async fn find_elements(&self, selector: &str) -> CrawlResult<Vec<Self::Handle>>;

    /// Click an element
    async fn click(&self, handle: &Self::Handle) -> CrawlResult<()>;

    /// Rendered text of an element
    async fn text(&self, handle: &Self::Handle) -> CrawlResult<String>;

    /// Named attribute of an element, `None` when absent
    async fn attribute(&self, handle: &Self::Handle, name: &str) -> CrawlResult<Option<String>>;

    /// End the session and release the browser
    async fn quit(&mut self) -> CrawlResult<()>;
}

/// Look up matches in two steps: count, then fetch only when the count is non-zero.
///
/// CDP answers a search-result fetch over an empty range with an error, so a
/// selector with no matches has to short-circuit before the fetch. A fetch
/// that fails after a positive count means the page changed in between; it
/// yields no matches so the caller's wait keeps polling.
#[cfg_attr(not(feature = "browser"), allow(dead_code))]
pub(crate) async fn count_then_fetch<H, C, CFut, F, FFut>(count: C, fetch: F) -> CrawlResult<Vec<H>>
where
    C: FnOnce() -> CFut,
    CFut: Future<Output = CrawlResult<usize>>,
    F: FnOnce() -> FFut,
    FFut: Future<Output = CrawlResult<Vec<H>>>,
{
    if count().await? == 0 {
        return Ok(Vec::new());
    }
    match fetch().await {
        Ok(found) => Ok(found),
        Err(e) => {
            debug!("matches changed before they could be fetched: {e}");
            Ok(Vec::new())
        }
    }
}

// ============================================================================
// Mock driver
// ============================================================================

/// Scripted element served by [`MockDriver`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockElement {
    /// Rendered text
    pub text: String,
    /// Attributes by name
    pub attributes: HashMap<String, String>,
    /// Whether clicks succeed
    pub clickable: bool,
}

impl MockElement {
    /// Clickable element with the given text
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            attributes: HashMap::new(),
            clickable: true,
        }
    }

    /// Link element carrying an `href`
    #[must_use]
    pub fn link(href: impl Into<String>) -> Self {
        Self::new("").with_attribute("href", href)
    }

    /// Add an attribute
    #[must_use]
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Make clicks on this element fail
    #[must_use]
    pub fn unclickable(mut self) -> Self {
        self.clickable = false;
        self
    }
}

/// Scripted page served by [`MockDriver`]
#[derive(Debug, Clone)]
pub struct MockPage {
    ready_state: String,
    elements: HashMap<String, Vec<MockElement>>,
    failing_selectors: HashSet<String>,
}

impl Default for MockPage {
    fn default() -> Self {
        Self {
            ready_state: READY_STATE_COMPLETE.to_string(),
            elements: HashMap::new(),
            failing_selectors: HashSet::new(),
        }
    }
}

impl MockPage {
    /// Empty, fully loaded page
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `elements` for `selector`
    #[must_use]
    pub fn with_elements(
        mut self,
        selector: impl Into<String>,
        elements: impl IntoIterator<Item = MockElement>,
    ) -> Self {
        self.elements
            .entry(selector.into())
            .or_default()
            .extend(elements);
        self
    }

    /// Serve one text element per entry of `texts` for `selector`
    #[must_use]
    pub fn with_texts<S: Into<String>>(
        self,
        selector: impl Into<String>,
        texts: impl IntoIterator<Item = S>,
    ) -> Self {
        self.with_elements(selector, texts.into_iter().map(MockElement::new))
    }

    /// Override `document.readyState`
    #[must_use]
    pub fn with_ready_state(mut self, state: impl Into<String>) -> Self {
        self.ready_state = state.into();
        self
    }

    /// Make lookups of `selector` fail like an invalid expression
    #[must_use]
    pub fn with_failing_selector(mut self, selector: impl Into<String>) -> Self {
        self.failing_selectors.insert(selector.into());
        self
    }
}

/// Handle returned by [`MockDriver::find_elements`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockHandle {
    /// Selector the element was found by
    pub selector: String,
    /// Element snapshot
    pub element: MockElement,
}

/// Shared record of driver calls, readable after the driver is consumed
#[derive(Debug, Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<String>>>);

impl CallLog {
    fn push(&self, entry: String) {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(entry);
    }

    /// Snapshot of recorded calls
    #[must_use]
    pub fn entries(&self) -> Vec<String> {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Check if a call starting with `prefix` was recorded
    #[must_use]
    pub fn was_called(&self, prefix: &str) -> bool {
        self.entries().iter().any(|c| c.starts_with(prefix))
    }

    /// Number of recorded calls equal to `entry`
    #[must_use]
    pub fn count(&self, entry: &str) -> usize {
        self.entries().iter().filter(|c| *c == entry).count()
    }
}

/// Mock driver for unit testing
#[derive(Debug, Default)]
pub struct MockDriver {
    pages: HashMap<String, MockPage>,
    unreachable: HashSet<String>,
    current_url: Option<String>,
    calls: CallLog,
    fail_quit: bool,
}

impl MockDriver {
    /// Create new mock driver
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `page` at `url`
    #[must_use]
    pub fn with_page(mut self, url: impl Into<String>, page: MockPage) -> Self {
        self.pages.insert(url.into(), page);
        self
    }

    /// Make navigation to `url` fail
    #[must_use]
    pub fn with_unreachable(mut self, url: impl Into<String>) -> Self {
        self.unreachable.insert(url.into());
        self
    }

    /// Make `quit` report an error
    #[must_use]
    pub const fn with_failing_quit(mut self) -> Self {
        self.fail_quit = true;
        self
    }

    /// Shared call log
    #[must_use]
    pub fn call_log(&self) -> CallLog {
        self.calls.clone()
    }

    /// URL of the page currently shown
    #[must_use]
    pub fn current_url(&self) -> Option<&str> {
        self.current_url.as_deref()
    }

    fn current_page(&self) -> Option<&MockPage> {
        self.current_url.as_ref().and_then(|url| self.pages.get(url))
    }
}

#[async_trait]
impl BrowserDriver for MockDriver {
    type Handle = MockHandle;

    async fn navigate(&mut self, url: &str) -> CrawlResult<()> {
        self.calls.push(format!("navigate:{url}"));
        if self.unreachable.contains(url) || !self.pages.contains_key(url) {
            return Err(CrawlError::Navigation {
                url: url.to_string(),
                message: "net::ERR_NAME_NOT_RESOLVED".to_string(),
            });
        }
        self.current_url = Some(url.to_string());
        Ok(())
    }

    async fn ready_state(&self) -> CrawlResult<String> {
        Ok(self.current_page().map_or_else(
            || READY_STATE_COMPLETE.to_string(),
            |page| page.ready_state.clone(),
        ))
    }

    async fn find_elements(&self, selector: &str) -> CrawlResult<Vec<Self::Handle>> {
        let Some(page) = self.current_page() else {
            return Ok(Vec::new());
        };
        if page.failing_selectors.contains(selector) {
            return Err(CrawlError::driver(format!(
                "invalid selector expression: {selector}"
            )));
        }
        Ok(page
            .elements
            .get(selector)
            .map(|elements| {
                elements
                    .iter()
                    .map(|element| MockHandle {
                        selector: selector.to_string(),
                        element: element.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn click(&self, handle: &Self::Handle) -> CrawlResult<()> {
        self.calls.push(format!("click:{}", handle.selector));
        if handle.element.clickable {
            Ok(())
        } else {
            Err(CrawlError::interaction(format!(
                "element {} is not clickable",
                handle.selector
            )))
        }
    }

    async fn text(&self, handle: &Self::Handle) -> CrawlResult<String> {
        Ok(handle.element.text.clone())
    }

    async fn attribute(&self, handle: &Self::Handle, name: &str) -> CrawlResult<Option<String>> {
        Ok(handle.element.attributes.get(name).cloned())
    }

    async fn quit(&mut self) -> CrawlResult<()> {
        self.calls.push("quit".to_string());
        if self.fail_quit {
            return Err(CrawlError::driver("browser process already gone"));
        }
        Ok(())
    }
}
