//! Crawl orchestration.
//!
//! One sequential pass over a storefront:
//!
//! ```text
//! Init ──navigate──► Landed ──pickup + dialog──► DialogChecked
//!      ──category hrefs──► CategoryListed ──► PerCategory(0..n) ──► Done
//! ```
//!
//! Only the landing navigation can fail the crawl. Everything after it is
//! best effort: failed clicks, empty lists, unreachable categories and
//! malformed prices are logged, recorded in the [`CrawlReport`] and skipped.

use crate::catalog::{Catalog, CatalogSink, CategoryLink, Product};
use crate::config::CrawlConfig;
use crate::driver::BrowserDriver;
use crate::extract::{Extractor, Field};
use crate::interact::{DialogProbe, Interactor};
use crate::price::normalize_price;
use crate::result::CrawlResult;
use crate::wait::{WaitOptions, Waiter};
use serde::{Deserialize, Serialize};
use std::fmt;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Label used in logs for the pickup-mode control
const PICKUP_LABEL: &str = "pickup";

/// Label used in logs for the closed-hours dialog button
const DIALOG_LABEL: &str = "ok_button";

/// Timeouts used during a crawl
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrawlOptions {
    /// Element presence and clickability
    pub element_wait: WaitOptions,
    /// Whole-page readiness after navigation or clicks
    pub page_load_wait: WaitOptions,
}

impl Default for CrawlOptions {
    fn default() -> Self {
        Self {
            element_wait: WaitOptions::default(),
            page_load_wait: WaitOptions::page_load(),
        }
    }
}

impl CrawlOptions {
    /// Create options with default timeouts
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the element timeout
    #[must_use]
    pub const fn with_element_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.element_wait = self.element_wait.with_timeout(timeout_ms);
        self
    }

    /// Set the page-load timeout
    #[must_use]
    pub const fn with_page_load_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.page_load_wait = self.page_load_wait.with_timeout(timeout_ms);
        self
    }

    /// Set the polling interval of every wait
    #[must_use]
    pub const fn with_poll_interval_ms(mut self, interval_ms: u64) -> Self {
        self.element_wait = self.element_wait.with_poll_interval(interval_ms);
        self.page_load_wait = self.page_load_wait.with_poll_interval(interval_ms);
        self
    }
}

/// Stage of a crawl
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrawlState {
    /// Nothing loaded yet
    Init,
    /// Landing page loaded
    Landed,
    /// Pickup mode chosen and dialog handled
    DialogChecked,
    /// Category links collected
    CategoryListed,
    /// Processing the category at this index
    PerCategory(usize),
    /// All categories processed
    Done,
}

impl fmt::Display for CrawlState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Init => write!(f, "init"),
            Self::Landed => write!(f, "landed"),
            Self::DialogChecked => write!(f, "dialog-checked"),
            Self::CategoryListed => write!(f, "category-listed"),
            Self::PerCategory(i) => write!(f, "category[{i}]"),
            Self::Done => write!(f, "done"),
        }
    }
}

/// How a category visit ended
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CategoryStatus {
    /// Page opened; this many products were added
    Visited {
        /// Products added to the catalog
        products: usize,
    },
    /// Page could not be opened
    Failed {
        /// Cause
        reason: String,
    },
}

/// One visited category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryOutcome {
    /// Category URL
    pub url: String,
    /// Visit result
    #[serde(flatten)]
    pub status: CategoryStatus,
}

/// A title/price pair left out of the catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedRecord {
    /// Category URL
    pub category: String,
    /// Product title
    pub name: String,
    /// Price text as shown
    pub raw_price: String,
    /// Why it was skipped
    pub reason: String,
}

/// Everything a crawl produced
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrawlReport {
    /// Products in discovery order
    pub catalog: Catalog,
    /// Category visits in discovery order
    pub categories: Vec<CategoryOutcome>,
    /// Records dropped for malformed prices
    pub skipped: Vec<SkippedRecord>,
    /// How many times the closed-hours dialog was dismissed
    pub dialogs_dismissed: usize,
    /// Whether the crawl stopped early on cancellation
    pub cancelled: bool,
}

impl CrawlReport {
    /// Number of categories that failed to open
    #[must_use]
    pub fn failed_categories(&self) -> usize {
        self.categories
            .iter()
            .filter(|c| matches!(c.status, CategoryStatus::Failed { .. }))
            .count()
    }
}

/// Drives a browser session through one crawl
#[derive(Debug, Clone)]
pub struct Crawler {
    config: CrawlConfig,
    options: CrawlOptions,
    cancel: CancellationToken,
}

impl Crawler {
    /// Create a crawler with default timeouts
    #[must_use]
    pub fn new(config: CrawlConfig) -> Self {
        Self {
            config,
            options: CrawlOptions::default(),
            cancel: CancellationToken::new(),
        }
    }

    /// Override timeouts
    #[must_use]
    pub const fn with_options(mut self, options: CrawlOptions) -> Self {
        self.options = options;
        self
    }

    /// Stop between categories once `token` is cancelled
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Crawl, hand the catalog to `sink`, and release the session.
    ///
    /// The driver is quit on every path. The catalog is written whenever the
    /// crawl got past the landing page, even if it was cancelled.
    pub async fn run<D, S>(&self, mut driver: D, sink: &S) -> CrawlResult<CrawlReport>
    where
        D: BrowserDriver,
        S: CatalogSink + ?Sized,
    {
        let outcome = self.crawl(&mut driver).await;
        let emitted = match &outcome {
            Ok(report) => sink.write(&report.catalog),
            Err(_) => Ok(()),
        };

        match driver.quit().await {
            Ok(()) => info!("browser closed"),
            Err(e) => warn!("failed to close browser: {e}"),
        }

        let report = outcome?;
        emitted?;
        info!(
            total = report.catalog.len(),
            skipped = report.skipped.len(),
            failed_categories = report.failed_categories(),
            "crawl finished"
        );
        Ok(report)
    }

    /// Crawl without writing output or releasing the session
    pub async fn crawl<D: BrowserDriver>(&self, driver: &mut D) -> CrawlResult<CrawlReport> {
        let mut state = CrawlState::Init;
        let mut report = CrawlReport::default();

        driver.navigate(&self.config.url).await?;
        self.await_page(driver).await;
        info!(url = %self.config.url, "opened landing page");
        advance(&mut state, CrawlState::Landed);

        Interactor::new(&*driver, self.element_waiter())
            .click(&self.config.pick_up_selector, PICKUP_LABEL)
            .await;
        self.await_page(driver).await;
        self.dismiss_dialog(driver, &mut report).await;
        advance(&mut state, CrawlState::DialogChecked);

        let links = self.category_links(driver).await;
        info!(count = links.len(), "found categories");
        advance(&mut state, CrawlState::CategoryListed);

        for (index, link) in links.iter().enumerate() {
            if self.cancel.is_cancelled() {
                warn!(remaining = links.len() - index, "crawl cancelled");
                report.cancelled = true;
                break;
            }
            advance(&mut state, CrawlState::PerCategory(index));
            let status = self.visit_category(driver, link, &mut report).await;
            report.categories.push(CategoryOutcome {
                url: link.to_string(),
                status,
            });
        }

        advance(&mut state, CrawlState::Done);
        Ok(report)
    }

    async fn category_links<D: BrowserDriver>(&self, driver: &D) -> Vec<CategoryLink> {
        Extractor::new(driver, self.element_waiter())
            .extract_list(&self.config.categories_selector, &Field::attribute("href"))
            .await
            .into_iter()
            .filter(|href| {
                let keep = !href.is_empty();
                if !keep {
                    debug!("ignoring category element without href");
                }
                keep
            })
            .map(CategoryLink::new)
            .collect()
    }

    async fn visit_category<D: BrowserDriver>(
        &self,
        driver: &mut D,
        link: &CategoryLink,
        report: &mut CrawlReport,
    ) -> CategoryStatus {
        if let Err(e) = driver.navigate(link.as_str()).await {
            error!(category = %link, "failed to open category: {e}");
            return CategoryStatus::Failed {
                reason: e.to_string(),
            };
        }
        let driver = &*driver;
        self.await_page(driver).await;
        info!(category = %link, "opened category");
        self.dismiss_dialog(driver, report).await;

        let extractor = Extractor::new(driver, self.element_waiter());
        let titles = extractor
            .extract_list(&self.config.titles_selector, &Field::Text)
            .await;
        let prices = extractor
            .extract_list(&self.config.prices_selector, &Field::Text)
            .await;
        if titles.len() != prices.len() {
            warn!(
                category = %link,
                titles = titles.len(),
                prices = prices.len(),
                "title and price counts differ, unpaired entries dropped"
            );
        }

        let mut products = Vec::with_capacity(titles.len().min(prices.len()));
        for (name, raw_price) in titles.into_iter().zip(prices) {
            match normalize_price(&raw_price) {
                Ok(price) => products.push(Product { name, price }),
                Err(e) => {
                    warn!(category = %link, product = %name, "skipping record: {e}");
                    report.skipped.push(SkippedRecord {
                        category: link.to_string(),
                        name,
                        raw_price,
                        reason: e.to_string(),
                    });
                }
            }
        }

        let added = products.len();
        report.catalog.extend(products);
        info!("added {added} products from {}", link.slug());
        CategoryStatus::Visited { products: added }
    }

    async fn dismiss_dialog<D: BrowserDriver>(&self, driver: &D, report: &mut CrawlReport) {
        let probe = Interactor::new(driver, self.element_waiter())
            .maybe_dismiss(&self.config.ok_dialog_selector, DIALOG_LABEL)
            .await;
        if probe == DialogProbe::Dismissed {
            report.dialogs_dismissed += 1;
            self.await_page(driver).await;
        }
    }

    async fn await_page<D: BrowserDriver>(&self, driver: &D) {
        if let Err(e) = Waiter::new(self.options.page_load_wait)
            .wait_for_ready_state(driver)
            .await
        {
            warn!("page not fully loaded: {e}");
        }
    }

    const fn element_waiter(&self) -> Waiter {
        Waiter::new(self.options.element_wait)
    }
}

fn advance(state: &mut CrawlState, next: CrawlState) {
    debug!(from = %state, to = %next, "crawl state");
    *state = next;
}
