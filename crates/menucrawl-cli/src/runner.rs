//! Crawl runner: wires configuration, browser and sink together

use crate::commands::Cli;
use crate::error::CliResult;
use menucrawl::{CrawlConfig, CrawlOptions, CrawlReport, DriverConfig};
use std::future::Future;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Everything a run needs, resolved from the command line
#[derive(Debug, Clone)]
pub struct RunSettings {
    /// Crawl configuration file
    pub config_path: PathBuf,
    /// Catalog output file
    pub output: PathBuf,
    /// Browser launch options
    pub driver: DriverConfig,
    /// Crawl timeouts
    pub options: CrawlOptions,
}

impl RunSettings {
    /// Resolve settings from parsed arguments
    #[must_use]
    pub fn from_cli(cli: &Cli) -> Self {
        let mut driver = DriverConfig::new().headless(!cli.headful);
        if cli.no_sandbox {
            driver = driver.no_sandbox();
        }
        if let Some(ref path) = cli.chromium_path {
            driver = driver.executable_path(path);
        }

        Self {
            config_path: cli.config.clone(),
            output: cli.output.clone(),
            driver,
            options: CrawlOptions::new()
                .with_element_timeout_ms(cli.element_timeout_ms)
                .with_page_load_timeout_ms(cli.page_timeout_ms),
        }
    }
}

/// Load the configuration, launch the browser and crawl.
///
/// The configuration is read before the browser starts so a bad file fails
/// fast.
pub async fn run_crawl(settings: &RunSettings, cancel: CancellationToken) -> CliResult<CrawlReport> {
    let config = CrawlConfig::load(&settings.config_path)?;
    info!(config = %settings.config_path.display(), url = %config.url, "configuration loaded");
    crawl_with_browser(config, settings, cancel).await
}

/// Cancel `cancel` on the first interrupt, then wait for a second one.
///
/// Returns `true` when a second interrupt arrives; the caller should exit
/// immediately. `next_signal` is awaited once per interrupt.
pub async fn watch_interrupts<F, Fut>(mut next_signal: F, cancel: CancellationToken) -> bool
where
    F: FnMut() -> Fut,
    Fut: Future<Output = std::io::Result<()>>,
{
    if let Err(e) = next_signal().await {
        warn!("cannot listen for Ctrl-C: {e}");
        return false;
    }
    warn!("Ctrl-C received, stopping after the current category (press again to abort)");
    cancel.cancel();
    next_signal().await.is_ok()
}

#[cfg(feature = "browser")]
async fn crawl_with_browser(
    config: CrawlConfig,
    settings: &RunSettings,
    cancel: CancellationToken,
) -> CliResult<CrawlReport> {
    use menucrawl::{ChromiumDriver, Crawler, JsonFileSink};

    let driver = ChromiumDriver::launch(settings.driver.clone()).await?;
    let sink = JsonFileSink::new(&settings.output);
    let report = Crawler::new(config)
        .with_options(settings.options)
        .with_cancellation(cancel)
        .run(driver, &sink)
        .await?;
    Ok(report)
}

#[cfg(not(feature = "browser"))]
async fn crawl_with_browser(
    _config: CrawlConfig,
    _settings: &RunSettings,
    _cancel: CancellationToken,
) -> CliResult<CrawlReport> {
    Err(crate::error::CliError::Generic(
        "Browser support not enabled. Rebuild with --features browser".to_string(),
    ))
}
