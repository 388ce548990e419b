//! List extraction.
//!
//! Pulls a homogeneous list of strings out of every element matching a
//! selector. Extraction degrades to an empty list instead of failing: an
//! empty category is a normal page, and one bad selector must not end the
//! crawl.

use crate::driver::BrowserDriver;
use crate::locator::{Locator, Selector};
use crate::result::CrawlResult;
use crate::wait::Waiter;
use tracing::{debug, warn};

/// Sentinel field name meaning "visible text"
pub const TEXT_FIELD: &str = "text";

/// What to read from each matched element
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Field {
    /// Rendered text
    #[default]
    Text,
    /// Named attribute (e.g. `href`)
    Attribute(String),
}

impl Field {
    /// Interpret an optional field name; `None` and `"text"` mean [`Field::Text`]
    #[must_use]
    pub fn parse(name: Option<&str>) -> Self {
        match name {
            None | Some(TEXT_FIELD) => Self::Text,
            Some(attr) => Self::Attribute(attr.to_string()),
        }
    }

    /// Shorthand for an attribute field
    #[must_use]
    pub fn attribute(name: impl Into<String>) -> Self {
        Self::Attribute(name.into())
    }
}

/// Reads lists of values from the current page
#[derive(Debug)]
pub struct Extractor<'d, D: BrowserDriver + ?Sized> {
    driver: &'d D,
    waiter: Waiter,
}

impl<'d, D: BrowserDriver + ?Sized> Extractor<'d, D> {
    /// Create an extractor bounded by `waiter`
    #[must_use]
    pub const fn new(driver: &'d D, waiter: Waiter) -> Self {
        Self { driver, waiter }
    }

    /// Values of `field` for every element matching `selector`, in page order.
    ///
    /// Never fails: a timeout or driver error is logged and yields an empty list.
    pub async fn extract_list(&self, selector: &Selector, field: &Field) -> Vec<String> {
        match self.try_extract(selector, field).await {
            Ok(values) => {
                debug!(count = values.len(), selector = %selector, "extracted elements");
                values
            }
            Err(e) if e.is_timeout() => {
                warn!(selector = %selector, "no elements found: {e}");
                Vec::new()
            }
            Err(e) => {
                warn!(selector = %selector, "extraction failed: {e}");
                Vec::new()
            }
        }
    }

    async fn try_extract(&self, selector: &Selector, field: &Field) -> CrawlResult<Vec<String>> {
        let handles = Locator::new(self.driver)
            .wait_for_all(selector, &self.waiter)
            .await?;

        let mut values = Vec::with_capacity(handles.len());
        for handle in &handles {
            let value = match field {
                Field::Text => self.driver.text(handle).await?,
                Field::Attribute(name) => self
                    .driver
                    .attribute(handle, name)
                    .await?
                    .unwrap_or_default(),
            };
            values.push(value);
        }
        Ok(values)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::driver::{MockDriver, MockElement, MockPage};
    use crate::wait::WaitOptions;

    const PAGE: &str = "https://shop.test/";

    async fn driver(page: MockPage) -> MockDriver {
        let mut driver = MockDriver::new().with_page(PAGE, page);
        driver.navigate(PAGE).await.unwrap();
        driver
    }

    fn quick() -> Waiter {
        Waiter::new(WaitOptions::new().with_timeout(30).with_poll_interval(5))
    }

    mod field_tests {
        use super::*;

        #[test]
        fn test_parse_text_sentinel() {
            assert_eq!(Field::parse(None), Field::Text);
            assert_eq!(Field::parse(Some("text")), Field::Text);
            assert_eq!(Field::default(), Field::Text);
        }

        #[test]
        fn test_parse_attribute() {
            assert_eq!(Field::parse(Some("href")), Field::attribute("href"));
            // Only the exact sentinel means text
            assert_eq!(Field::parse(Some("Text")), Field::attribute("Text"));
        }
    }

    mod extractor_tests {
        use super::*;

        #[tokio::test]
        async fn test_extract_texts_in_order() {
            let driver = driver(MockPage::new().with_texts("//h3", ["Latte", "Mocha", "Tea"])).await;
            let values = Extractor::new(&driver, quick())
                .extract_list(&"//h3".into(), &Field::Text)
                .await;
            assert_eq!(values, ["Latte", "Mocha", "Tea"]);
        }

        #[tokio::test]
        async fn test_extract_attribute() {
            let driver = driver(MockPage::new().with_elements(
                "//nav/a",
                [
                    MockElement::link("https://shop.test/coffee"),
                    MockElement::new("no href"),
                ],
            ))
            .await;
            let values = Extractor::new(&driver, quick())
                .extract_list(&"//nav/a".into(), &Field::attribute("href"))
                .await;
            assert_eq!(values, ["https://shop.test/coffee", ""]);
        }

        #[tokio::test]
        async fn test_extract_hyphenated_attribute() {
            let driver = driver(MockPage::new().with_elements(
                "//div[@class='product']",
                [
                    MockElement::new("Latte").with_attribute("data-id", "sku-1"),
                    MockElement::new("Mocha").with_attribute("data-id", "sku-2"),
                ],
            ))
            .await;
            let values = Extractor::new(&driver, quick())
                .extract_list(&"//div[@class='product']".into(), &Field::attribute("data-id"))
                .await;
            assert_eq!(values, ["sku-1", "sku-2"]);
        }

        #[tokio::test]
        async fn test_zero_matches_yields_empty_list() {
            let driver = driver(MockPage::new()).await;
            let values = Extractor::new(&driver, quick())
                .extract_list(&"//h3".into(), &Field::Text)
                .await;
            assert!(values.is_empty());
        }

        #[tokio::test]
        async fn test_driver_error_yields_empty_list() {
            let driver = driver(MockPage::new().with_failing_selector("//h3[")).await;
            let values = Extractor::new(&driver, quick())
                .extract_list(&"//h3[".into(), &Field::Text)
                .await;
            assert!(values.is_empty());
        }
    }
}
