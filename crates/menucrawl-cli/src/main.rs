//! Menucrawl: scrape a storefront catalog into JSON
//!
//! ## Usage
//!
//! ```bash
//! menucrawl                                 # config.yml -> menu.json
//! menucrawl -c shop.yml -o shop.json -v     # custom paths, debug logs
//! menucrawl --headful                       # watch the browser work
//! ```

use clap::Parser;
use menucrawl_cli::{logging, run_crawl, watch_interrupts, Cli, CliResult, RunSettings};
use std::process::ExitCode;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Exit status after a forced interrupt (128 + SIGINT)
const INTERRUPTED: i32 = 130;

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> CliResult<()> {
    let _guard = logging::init(cli.verbosity(), &cli.log_file)?;
    let settings = RunSettings::from_cli(cli);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async {
        let cancel = CancellationToken::new();
        let on_signal = cancel.clone();
        tokio::spawn(async move {
            if watch_interrupts(tokio::signal::ctrl_c, on_signal).await {
                eprintln!("Error: interrupted");
                std::process::exit(INTERRUPTED);
            }
        });

        let report = run_crawl(&settings, cancel).await?;
        info!(
            products = report.catalog.len(),
            categories = report.categories.len(),
            output = %settings.output.display(),
            "done"
        );
        Ok(())
    })
}
