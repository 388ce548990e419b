//! Clicking and optional dialog dismissal.
//!
//! Clicks are best effort: a missing or unclickable target is logged and
//! reported as [`ClickOutcome::Failed`], never propagated.

use crate::driver::BrowserDriver;
use crate::locator::{Locator, Selector};
use crate::wait::Waiter;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

/// Outcome of [`Interactor::click`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClickOutcome {
    /// The element was clicked
    Clicked,
    /// No clickable element appeared in time, or the driver refused
    Failed,
}

impl ClickOutcome {
    /// Check if the click happened
    #[must_use]
    pub const fn is_clicked(self) -> bool {
        matches!(self, Self::Clicked)
    }
}

/// Outcome of [`Interactor::maybe_dismiss`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DialogProbe {
    /// The dialog was showing and has been dismissed
    Dismissed,
    /// The dialog was not showing
    Absent,
    /// The dialog was showing but the click failed
    Stuck,
}

/// Clicks elements addressed by selector
#[derive(Debug)]
pub struct Interactor<'d, D: BrowserDriver + ?Sized> {
    driver: &'d D,
    waiter: Waiter,
}

impl<'d, D: BrowserDriver + ?Sized> Interactor<'d, D> {
    /// Create an interactor bounded by `waiter`
    #[must_use]
    pub const fn new(driver: &'d D, waiter: Waiter) -> Self {
        Self { driver, waiter }
    }

    /// Click the first element matching `selector` once it accepts clicks.
    ///
    /// A rejected click is retried until the waiter's deadline.
    pub async fn click(&self, selector: &Selector, label: &str) -> ClickOutcome {
        let driver = self.driver;
        let result = self
            .waiter
            .poll_until(selector.as_str(), move || async move {
                let Some(handle) = driver.find_elements(selector.as_str()).await?.into_iter().next()
                else {
                    return Ok(None);
                };
                match driver.click(&handle).await {
                    Ok(()) => Ok(Some(())),
                    Err(e) => {
                        debug!(label, "click not accepted yet: {e}");
                        Ok(None)
                    }
                }
            })
            .await;

        match result {
            Ok(()) => {
                info!(label, "clicked element");
                ClickOutcome::Clicked
            }
            Err(e) => {
                error!(label, selector = %selector, "failed to click element: {e}");
                ClickOutcome::Failed
            }
        }
    }

    /// Dismiss an interstitial dialog if it is currently showing.
    ///
    /// Presence is probed once without waiting; an absent dialog is not an error.
    pub async fn maybe_dismiss(&self, selector: &Selector, label: &str) -> DialogProbe {
        let present = match Locator::new(self.driver).find(selector).await {
            Ok(found) => !found.is_empty(),
            Err(e) => {
                debug!(label, "dialog probe failed: {e}");
                false
            }
        };
        if !present {
            debug!(label, "dialog not shown");
            return DialogProbe::Absent;
        }
        match self.click(selector, label).await {
            ClickOutcome::Clicked => DialogProbe::Dismissed,
            ClickOutcome::Failed => DialogProbe::Stuck,
        }
    }
}
