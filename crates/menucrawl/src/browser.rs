//! Chromium over CDP.
//!
//! Requires the `browser` feature. The CDP event handler runs on its own
//! tokio task for the lifetime of the driver and is aborted on drop.

use crate::driver::{count_then_fetch, BrowserDriver, DriverConfig};
use crate::result::{CrawlError, CrawlResult};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser as CdpBrowser, BrowserConfig as CdpConfig};
use chromiumoxide::element::Element;
use chromiumoxide::page::Page as CdpPage;
use futures::StreamExt;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// A single-tab Chromium session
#[derive(Debug)]
pub struct ChromiumDriver {
    browser: CdpBrowser,
    page: CdpPage,
    handler: JoinHandle<()>,
}

impl ChromiumDriver {
    /// Launch Chromium and open a blank tab
    ///
    /// # Errors
    ///
    /// Returns [`CrawlError::BrowserLaunch`] if the browser cannot be started
    pub async fn launch(config: DriverConfig) -> CrawlResult<Self> {
        let mut builder = CdpConfig::builder()
            .window_size(config.viewport_width, config.viewport_height)
            .request_timeout(config.request_timeout);

        if !config.headless {
            builder = builder.with_head();
        }

        if !config.sandbox {
            builder = builder.no_sandbox();
        }

        if let Some(ref path) = config.executable_path {
            builder = builder.chrome_executable(path);
        }

        let cdp_config = builder.build().map_err(launch_error)?;

        let (mut browser, mut handler) = CdpBrowser::launch(cdp_config)
            .await
            .map_err(launch_error)?;

        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    warn!("CDP handler event error: {e}");
                }
            }
            debug!("CDP handler stopped");
        });

        let page = match browser.new_page("about:blank").await {
            Ok(page) => page,
            Err(e) => {
                handler.abort();
                if let Err(close_err) = browser.close().await {
                    warn!("failed to close browser after launch error: {close_err}");
                }
                return Err(launch_error(e));
            }
        };

        debug!(headless = config.headless, "browser launched");
        Ok(Self {
            browser,
            page,
            handler,
        })
    }
}

fn launch_error(e: impl ToString) -> CrawlError {
    CrawlError::BrowserLaunch {
        message: e.to_string(),
    }
}

/// JS expression counting the nodes matched by an XPath expression
fn xpath_count_expression(selector: &str) -> CrawlResult<String> {
    Ok(format!(
        "document.evaluate({}, document, null, XPathResult.ORDERED_NODE_SNAPSHOT_TYPE, null).snapshotLength",
        serde_json::to_string(selector)?
    ))
}

/// Names that `this.<name>` can read as a DOM property
fn is_property_name(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_' || c == '$')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

#[async_trait]
impl BrowserDriver for ChromiumDriver {
    type Handle = Element;

    async fn navigate(&mut self, url: &str) -> CrawlResult<()> {
        self.page
            .goto(url)
            .await
            .map_err(|e| CrawlError::Navigation {
                url: url.to_string(),
                message: e.to_string(),
            })?;
        Ok(())
    }

    async fn ready_state(&self) -> CrawlResult<String> {
        self.page
            .evaluate("document.readyState")
            .await
            .map_err(|e| CrawlError::driver(e.to_string()))?
            .into_value::<String>()
            .map_err(|e| CrawlError::driver(e.to_string()))
    }

    async fn find_elements(&self, selector: &str) -> CrawlResult<Vec<Self::Handle>> {
        let page = &self.page;
        let expression = xpath_count_expression(selector)?;
        count_then_fetch(
            move || async move {
                page.evaluate(expression)
                    .await
                    .map_err(|e| CrawlError::driver(format!("{selector}: {e}")))?
                    .into_value::<usize>()
                    .map_err(|e| CrawlError::driver(format!("{selector}: {e}")))
            },
            move || async move {
                page.find_xpaths(selector)
                    .await
                    .map_err(|e| CrawlError::driver(format!("{selector}: {e}")))
            },
        )
        .await
    }

    async fn click(&self, handle: &Self::Handle) -> CrawlResult<()> {
        handle
            .click()
            .await
            .map_err(|e| CrawlError::interaction(e.to_string()))?;
        Ok(())
    }

    async fn text(&self, handle: &Self::Handle) -> CrawlResult<String> {
        Ok(handle
            .inner_text()
            .await
            .map_err(|e| CrawlError::driver(e.to_string()))?
            .unwrap_or_default())
    }

    /// DOM property first (so `href` comes back absolute), then the raw attribute
    async fn attribute(&self, handle: &Self::Handle, name: &str) -> CrawlResult<Option<String>> {
        if is_property_name(name) {
            match handle.property(name).await {
                Ok(Some(serde_json::Value::String(value))) => return Ok(Some(value)),
                Ok(_) => {}
                Err(e) => debug!(name, "property read failed, reading attribute: {e}"),
            }
        }
        handle
            .attribute(name)
            .await
            .map_err(|e| CrawlError::driver(e.to_string()))
    }

    async fn quit(&mut self) -> CrawlResult<()> {
        self.browser
            .close()
            .await
            .map_err(|e| CrawlError::driver(e.to_string()))?;
        self.browser.wait().await?;
        debug!("browser process exited");
        Ok(())
    }
}

impl Drop for ChromiumDriver {
    fn drop(&mut self) {
        self.handler.abort();
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_count_expression_quotes_selector() {
        let expression = xpath_count_expression(r#"//a[@title="Tea's"]"#).unwrap();
        assert_eq!(
            expression,
            r#"document.evaluate("//a[@title=\"Tea's\"]", document, null, XPathResult.ORDERED_NODE_SNAPSHOT_TYPE, null).snapshotLength"#
        );
    }

    #[test]
    fn test_hyphenated_names_skip_property_read() {
        assert!(is_property_name("href"));
        assert!(is_property_name("dataset"));
        assert!(!is_property_name("data-id"));
        assert!(!is_property_name("aria-label"));
        assert!(!is_property_name("1st"));
        assert!(!is_property_name(""));
    }
}
