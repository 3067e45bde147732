use std::process::ExitCode;

use clap::Parser;
use tracing::error;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use ytscraper::cli::{commands, Cli};
use ytscraper::ScraperError;

#[tokio::main]
async fn main() -> ExitCode {
    // Logs go to stderr so stdout stays pipeable JSON
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    match commands::run(&cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let code = e
                .chain()
                .find_map(|cause| cause.downcast_ref::<ScraperError>())
                .map_or("SCRAPER_ERROR", ScraperError::code);
            error!("Failed to run YouTube scraper: {} - {:#}", code, e);
            ExitCode::FAILURE
        }
    }
}
