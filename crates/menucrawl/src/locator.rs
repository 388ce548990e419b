//! Element location by selector.
//!
//! Selectors come from configuration and are opaque here: the locator hands
//! them to the driver verbatim and lets the driver reject malformed ones.

use crate::driver::BrowserDriver;
use crate::result::{CrawlError, CrawlResult};
use crate::wait::Waiter;
use serde::{Deserialize, Serialize};
use std::fmt;

/// An XPath expression identifying zero or more elements
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Selector(String);

impl Selector {
    /// Wrap an expression without validating it
    #[must_use]
    pub fn new(expression: impl Into<String>) -> Self {
        Self(expression.into())
    }

    /// The raw expression
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Selector {
    fn from(expression: &str) -> Self {
        Self::new(expression)
    }
}

/// Resolves selectors against the page currently shown by a driver
#[derive(Debug)]
pub struct Locator<'d, D: BrowserDriver + ?Sized> {
    driver: &'d D,
}

impl<'d, D: BrowserDriver + ?Sized> Locator<'d, D> {
    /// Create a locator over `driver`
    #[must_use]
    pub const fn new(driver: &'d D) -> Self {
        Self { driver }
    }

    /// All current matches, possibly none
    pub async fn find(&self, selector: &Selector) -> CrawlResult<Vec<D::Handle>> {
        self.driver.find_elements(selector.as_str()).await
    }

    /// First current match
    pub async fn find_one(&self, selector: &Selector) -> CrawlResult<D::Handle> {
        self.find(selector)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| CrawlError::ElementNotFound {
                selector: selector.to_string(),
            })
    }

    /// Wait until at least one element matches, then return all matches
    pub async fn wait_for_all(
        &self,
        selector: &Selector,
        waiter: &Waiter,
    ) -> CrawlResult<Vec<D::Handle>> {
        let driver = self.driver;
        waiter
            .poll_until(selector.as_str(), move || async move {
                let found = driver.find_elements(selector.as_str()).await?;
                Ok((!found.is_empty()).then_some(found))
            })
            .await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::driver::{MockDriver, MockElement, MockPage};
    use crate::wait::WaitOptions;

    const PAGE: &str = "https://shop.test/drinks";

    async fn driver() -> MockDriver {
        let mut driver = MockDriver::new().with_page(
            PAGE,
            MockPage::new()
                .with_texts("//h3", ["Latte", "Mocha"])
                .with_elements("//a", [MockElement::link("/hot")])
                .with_failing_selector("//h3["),
        );
        driver.navigate(PAGE).await.unwrap();
        driver
    }

    fn quick() -> Waiter {
        Waiter::new(WaitOptions::new().with_timeout(30).with_poll_interval(5))
    }

    mod selector_tests {
        use super::*;

        #[test]
        fn test_selector_is_opaque() {
            let selector = Selector::new("//div[@class='price'");
            assert_eq!(selector.as_str(), "//div[@class='price'");
            assert_eq!(selector.to_string(), "//div[@class='price'");
        }

        #[test]
        fn test_selector_deserializes_from_string() {
            let selector: Selector = serde_json::from_str("\"//h3\"").unwrap();
            assert_eq!(selector, Selector::from("//h3"));
        }
    }

    mod locator_tests {
        use super::*;

        #[tokio::test]
        async fn test_find_all_matches_in_order() {
            let driver = driver().await;
            let found = Locator::new(&driver).find(&"//h3".into()).await.unwrap();
            let texts: Vec<_> = found.iter().map(|h| h.element.text.as_str()).collect();
            assert_eq!(texts, ["Latte", "Mocha"]);
        }

        #[tokio::test]
        async fn test_find_no_matches_is_empty() {
            let driver = driver().await;
            let found = Locator::new(&driver).find(&"//table".into()).await.unwrap();
            assert!(found.is_empty());
        }

        #[tokio::test]
        async fn test_find_one() {
            let driver = driver().await;
            let locator = Locator::new(&driver);
            let first = locator.find_one(&"//h3".into()).await.unwrap();
            assert_eq!(first.element.text, "Latte");

            let err = locator.find_one(&"//table".into()).await.unwrap_err();
            assert!(matches!(err, CrawlError::ElementNotFound { selector } if selector == "//table"));
        }

        #[tokio::test]
        async fn test_malformed_selector_fails_at_lookup() {
            let driver = driver().await;
            let err = Locator::new(&driver).find(&"//h3[".into()).await.unwrap_err();
            assert!(matches!(err, CrawlError::Driver { .. }));
        }

        #[tokio::test]
        async fn test_wait_for_all() {
            let driver = driver().await;
            let locator = Locator::new(&driver);
            assert_eq!(
                locator.wait_for_all(&"//a".into(), &quick()).await.unwrap().len(),
                1
            );

            let err = locator
                .wait_for_all(&"//table".into(), &quick())
                .await
                .unwrap_err();
            assert!(err.is_timeout());
        }
    }

    mod late_render_tests {
        use super::*;
        use crate::driver::{count_then_fetch, BrowserDriver, READY_STATE_COMPLETE};
        use crate::extract::{Extractor, Field};
        use crate::interact::{ClickOutcome, Interactor};
        use async_trait::async_trait;
        use std::time::Duration;
        use tokio::time::Instant;

        /// Renders `//h3` late and, like CDP, rejects fetching an empty
        /// search-result range.
        #[derive(Debug)]
        struct SearchDriver {
            visible_at: Instant,
        }

        impl SearchDriver {
            fn rendering_after(delay: Duration) -> Self {
                Self {
                    visible_at: Instant::now() + delay,
                }
            }

            fn result_count(&self, selector: &str) -> usize {
                usize::from(selector == "//h3" && Instant::now() >= self.visible_at)
            }

            fn search_results(&self, count: usize) -> CrawlResult<Vec<String>> {
                if count == 0 {
                    return Err(CrawlError::driver("Invalid search result range"));
                }
                Ok(vec!["Latte".to_string(); count])
            }
        }

        #[async_trait]
        impl BrowserDriver for SearchDriver {
            type Handle = String;

            async fn navigate(&mut self, _url: &str) -> CrawlResult<()> {
                Ok(())
            }

            async fn ready_state(&self) -> CrawlResult<String> {
                Ok(READY_STATE_COMPLETE.to_string())
            }

            async fn find_elements(&self, selector: &str) -> CrawlResult<Vec<String>> {
                count_then_fetch(
                    move || async move { Ok(self.result_count(selector)) },
                    move || async move { self.search_results(self.result_count(selector)) },
                )
                .await
            }

            async fn click(&self, _handle: &String) -> CrawlResult<()> {
                Ok(())
            }

            async fn text(&self, handle: &String) -> CrawlResult<String> {
                Ok(handle.clone())
            }

            async fn attribute(&self, _handle: &String, _name: &str) -> CrawlResult<Option<String>> {
                Ok(None)
            }

            async fn quit(&mut self) -> CrawlResult<()> {
                Ok(())
            }
        }

        fn patient() -> Waiter {
            Waiter::new(WaitOptions::new().with_timeout(1000).with_poll_interval(10))
        }

        #[test]
        fn test_empty_search_range_is_rejected() {
            let driver = SearchDriver::rendering_after(Duration::from_secs(60));
            assert!(driver.search_results(0).is_err());
        }

        #[tokio::test]
        async fn test_no_matches_yet_is_empty_not_error() {
            let driver = SearchDriver::rendering_after(Duration::from_secs(60));
            let found = Locator::new(&driver).find(&"//h3".into()).await.unwrap();
            assert!(found.is_empty());
        }

        #[tokio::test]
        async fn test_extraction_waits_for_late_elements() {
            let driver = SearchDriver::rendering_after(Duration::from_millis(100));
            let values = Extractor::new(&driver, patient())
                .extract_list(&"//h3".into(), &Field::Text)
                .await;
            assert_eq!(values, ["Latte"]);
        }

        #[tokio::test]
        async fn test_click_waits_for_late_target() {
            let driver = SearchDriver::rendering_after(Duration::from_millis(100));
            let outcome = Interactor::new(&driver, patient())
                .click(&"//h3".into(), "pickup")
                .await;
            assert_eq!(outcome, ClickOutcome::Clicked);
        }

        #[tokio::test]
        async fn test_never_rendered_is_timeout() {
            let driver = SearchDriver::rendering_after(Duration::from_secs(60));
            let err = Locator::new(&driver)
                .wait_for_all(&"//h3".into(), &quick())
                .await
                .unwrap_err();
            assert!(err.is_timeout());
        }
    }
}
