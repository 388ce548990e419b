//! Wait mechanisms.
//!
//! Bounded polling used for page readiness (`document.readyState`) and for
//! element presence/clickability. A [`Waiter`] never logs and never decides
//! whether a timeout is fatal; it only reports [`CrawlError::Timeout`].

use crate::driver::{BrowserDriver, READY_STATE_COMPLETE};
use crate::result::{CrawlError, CrawlResult};
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;

// =============================================================================
// CONSTANTS
// =============================================================================

/// Default timeout for element operations (10 seconds)
pub const DEFAULT_ELEMENT_TIMEOUT_MS: u64 = 10_000;

/// Default timeout for whole-page load (30 seconds)
pub const DEFAULT_PAGE_LOAD_TIMEOUT_MS: u64 = 30_000;

/// Default polling interval (50ms)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 50;

// =============================================================================
// WAIT OPTIONS
// =============================================================================

/// Options for wait operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitOptions {
    /// Timeout in milliseconds
    pub timeout_ms: u64,
    /// Polling interval in milliseconds
    pub poll_interval_ms: u64,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_ELEMENT_TIMEOUT_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }
}

impl WaitOptions {
    /// Create new wait options with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Options for whole-page load
    #[must_use]
    pub fn page_load() -> Self {
        Self::default().with_timeout(DEFAULT_PAGE_LOAD_TIMEOUT_MS)
    }

    /// Set timeout in milliseconds
    #[must_use]
    pub const fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Set polling interval in milliseconds
    #[must_use]
    pub const fn with_poll_interval(mut self, poll_interval_ms: u64) -> Self {
        self.poll_interval_ms = poll_interval_ms;
        self
    }

    /// Get timeout as Duration
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Get poll interval as Duration
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

// =============================================================================
// WAIT RESULT
// =============================================================================

/// Result of a successful wait
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WaitResult {
    /// Time spent waiting
    pub elapsed: Duration,
    /// Description of what was waited for
    pub waited_for: String,
}

// =============================================================================
// WAITER
// =============================================================================

/// Polls a condition until it holds or the timeout elapses
#[derive(Debug, Clone, Copy, Default)]
pub struct Waiter {
    options: WaitOptions,
}

impl Waiter {
    /// Create a waiter with the given options
    #[must_use]
    pub const fn new(options: WaitOptions) -> Self {
        Self { options }
    }

    /// Options in use
    #[must_use]
    pub const fn options(&self) -> &WaitOptions {
        &self.options
    }

    /// Poll `probe` until it yields a value.
    ///
    /// The probe runs at least once. An error from the probe ends the wait
    /// immediately and is returned as is.
    pub async fn poll_until<T, F, Fut>(&self, waited_for: &str, mut probe: F) -> CrawlResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = CrawlResult<Option<T>>>,
    {
        let start = Instant::now();
        let timeout = self.options.timeout();

        loop {
            if let Some(value) = probe().await? {
                return Ok(value);
            }
            let elapsed = start.elapsed();
            if elapsed >= timeout {
                return Err(CrawlError::Timeout {
                    ms: self.options.timeout_ms,
                    waited_for: waited_for.to_string(),
                });
            }
            tokio::time::sleep(self.options.poll_interval().min(timeout - elapsed)).await;
        }
    }

    /// Wait for a predicate to return true
    pub async fn wait_for<F, Fut>(&self, waited_for: &str, mut predicate: F) -> CrawlResult<WaitResult>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = CrawlResult<bool>>,
    {
        let start = Instant::now();
        self.poll_until(waited_for, || {
            let check = predicate();
            async move { Ok(check.await?.then_some(())) }
        })
        .await?;
        Ok(WaitResult {
            elapsed: start.elapsed(),
            waited_for: waited_for.to_string(),
        })
    }

    /// Wait until the page reports `document.readyState == "complete"`
    pub async fn wait_for_ready_state<D>(&self, driver: &D) -> CrawlResult<WaitResult>
    where
        D: BrowserDriver + ?Sized,
    {
        self.wait_for("document.readyState == \"complete\"", move || async move {
            Ok(driver.ready_state().await? == READY_STATE_COMPLETE)
        })
        .await
    }
}

// =============================================================================
// TESTS
// =============================================================================
