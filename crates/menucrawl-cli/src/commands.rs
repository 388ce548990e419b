//! CLI argument definitions using clap

use crate::config::Verbosity;
use clap::Parser;
use menucrawl::{DEFAULT_ELEMENT_TIMEOUT_MS, DEFAULT_PAGE_LOAD_TIMEOUT_MS};
use std::path::PathBuf;

/// Menucrawl: scrape a storefront's product catalog into JSON
#[derive(Parser, Debug)]
#[command(name = "menucrawl")]
#[command(author, version, about, long_about = None)]
#[allow(clippy::struct_excessive_bools)]
pub struct Cli {
    /// Crawl configuration (YAML)
    #[arg(short, long, default_value = "config.yml")]
    pub config: PathBuf,

    /// Catalog output file (JSON)
    #[arg(short, long, default_value = "menu.json")]
    pub output: PathBuf,

    /// Log file, truncated on every run
    #[arg(long, default_value = "scraper.log")]
    pub log_file: PathBuf,

    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (warnings and errors only)
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Show the browser window
    #[arg(long)]
    pub headful: bool,

    /// Disable the Chromium sandbox (containers, CI)
    #[arg(long)]
    pub no_sandbox: bool,

    /// Chromium binary (auto-detected when omitted)
    #[arg(long)]
    pub chromium_path: Option<PathBuf>,

    /// Timeout for element presence and clicks
    #[arg(long, default_value_t = DEFAULT_ELEMENT_TIMEOUT_MS, value_name = "MS")]
    pub element_timeout_ms: u64,

    /// Timeout for page loads
    #[arg(long, default_value_t = DEFAULT_PAGE_LOAD_TIMEOUT_MS, value_name = "MS")]
    pub page_timeout_ms: u64,
}

impl Cli {
    /// Verbosity selected by `-v` / `-q`
    #[must_use]
    pub const fn verbosity(&self) -> Verbosity {
        Verbosity::from_flags(self.verbose, self.quiet)
    }
}
