//! Menucrawl: selector-driven catalog extraction from dynamically rendered
//! storefronts.
//!
//! A crawl drives one browser tab through a fixed sequence: open the landing
//! page, pick the pickup mode, dismiss the closed-hours dialog if it shows,
//! collect category links, then scrape product titles and prices from every
//! category into a [`Catalog`].
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐    ┌──────────────┐    ┌──────────────┐
//! │ CrawlConfig  │───►│   Crawler    │───►│ CatalogSink  │
//! │ (YAML)       │    │              │    │ (JSON file)  │
//! └──────────────┘    └──────┬───────┘    └──────────────┘
//!                            │
//!        ┌──────────────┬────┴─────────┬──────────────┐
//!        ▼              ▼              ▼              ▼
//!   ┌─────────┐   ┌───────────┐  ┌────────────┐  ┌─────────┐
//!   │ Waiter  │   │ Extractor │  │ Interactor │  │  price  │
//!   └────┬────┘   └─────┬─────┘  └─────┬──────┘  └─────────┘
//!        └──────────────┼──────────────┘
//!                       ▼
//!              BrowserDriver (Chromium / Mock)
//! ```
//!
//! # Example
//!
//! ```no_run
//! use menucrawl::{BrowserDriver, CrawlConfig, Crawler, JsonFileSink};
//!
//! # async fn demo<D: BrowserDriver>(driver: D) -> menucrawl::CrawlResult<()> {
//! let config = CrawlConfig::load("config.yml")?;
//! let report = Crawler::new(config)
//!     .run(driver, &JsonFileSink::new("menu.json"))
//!     .await?;
//! println!("{} products", report.catalog.len());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

#[cfg(feature = "browser")]
mod browser;
mod catalog;
mod config;
mod crawler;
mod driver;
mod extract;
mod interact;
mod locator;
mod price;
mod result;
mod wait;

#[cfg(feature = "browser")]
pub use browser::ChromiumDriver;
pub use catalog::{Catalog, CatalogSink, CategoryLink, JsonFileSink, Product};
pub use config::CrawlConfig;
pub use crawler::{
    CategoryOutcome, CategoryStatus, CrawlOptions, CrawlReport, CrawlState, Crawler,
    SkippedRecord,
};
pub use driver::{
    BrowserDriver, CallLog, DriverConfig, MockDriver, MockElement, MockHandle, MockPage,
    READY_STATE_COMPLETE,
};
pub use extract::{Extractor, Field, TEXT_FIELD};
pub use interact::{ClickOutcome, DialogProbe, Interactor};
pub use locator::{Locator, Selector};
pub use price::normalize_price;
pub use result::{CrawlError, CrawlResult};
pub use wait::{
    WaitOptions, WaitResult, Waiter, DEFAULT_ELEMENT_TIMEOUT_MS, DEFAULT_PAGE_LOAD_TIMEOUT_MS,
    DEFAULT_POLL_INTERVAL_MS,
};

/// Prelude for convenient imports
pub mod prelude {
    pub use super::{
        normalize_price, BrowserDriver, Catalog, CatalogSink, CrawlConfig, CrawlError,
        CrawlOptions, CrawlReport, CrawlResult, Crawler, DriverConfig, JsonFileSink, Product,
        Selector,
    };
    #[cfg(feature = "browser")]
    pub use super::ChromiumDriver;
}
