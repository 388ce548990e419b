//! Crawl configuration.
//!
//! A YAML mapping with exactly six string keys:
//!
//! ```yaml
//! url: https://shop.example/
//! pick_up_xpath: //button[@data-mode='pickup']
//! ok_xpath: //div[@role='dialog']//button
//! categories: //nav//a
//! titles: //div[@class='product']//h3
//! prices: //div[@class='product']//span[@class='price']
//! ```

use crate::locator::Selector;
use crate::result::{CrawlError, CrawlResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Navigation target and selectors for one site. Read-only after loading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CrawlConfig {
    /// Landing page
    pub url: String,
    /// Control that selects pickup mode
    #[serde(rename = "pick_up_xpath")]
    pub pick_up_selector: Selector,
    /// Button acknowledging the closed-hours dialog
    #[serde(rename = "ok_xpath")]
    pub ok_dialog_selector: Selector,
    /// Category links (read via `href`)
    #[serde(rename = "categories")]
    pub categories_selector: Selector,
    /// Product titles on a category page
    #[serde(rename = "titles")]
    pub titles_selector: Selector,
    /// Product prices on a category page
    #[serde(rename = "prices")]
    pub prices_selector: Selector,
}

impl CrawlConfig {
    /// Parse configuration from YAML text
    pub fn from_yaml_str(yaml: &str) -> CrawlResult<Self> {
        serde_yaml_ng::from_str(yaml).map_err(|e| CrawlError::config(e.to_string()))
    }

    /// Load configuration from a YAML file
    pub fn load(path: impl AsRef<Path>) -> CrawlResult<Self> {
        let path = path.as_ref();
        let yaml = fs::read_to_string(path)
            .map_err(|e| CrawlError::config(format!("cannot read {}: {e}", path.display())))?;
        Self::from_yaml_str(&yaml)
            .map_err(|e| CrawlError::config(format!("{}: {e}", path.display())))
    }
}
