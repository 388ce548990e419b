//! Menucrawl CLI Library
//!
//! Command-line front end for the menucrawl engine: argument parsing,
//! logging, Ctrl-C handling and browser launch.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

mod commands;
mod config;
mod error;
pub mod logging;
mod runner;

pub use commands::Cli;
pub use config::Verbosity;
pub use error::{CliError, CliResult};
pub use runner::{run_crawl, watch_interrupts, RunSettings};
