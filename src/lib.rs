//! # ytscraper
//!
//! Scrapes YouTube channels and keyword search results with headless Chrome
//! and emits normalized video records as JSON.
//!
//! ## Architecture
//!
//! ```text
//! Config → Scraper → RawRecord → Normalizer → Video → JSON
//! ```
//!
//! - [`scraper`]: chromiumoxide-driven page navigation and extraction
//! - [`fetcher`]: transcript download from the timedtext endpoint
//! - [`normalizer`]: human-readable count parsing and record normalization
//! - [`config`]: layered run configuration
//!
//! ## Quick Start
//!
//! ```bash
//! # Latest videos of a channel
//! ytscraper --mode channel --channel-url https://www.youtube.com/@rustlang -n 5
//!
//! # Search results with transcripts, written to a file
//! ytscraper -m keyword -k "rust async" -t -o videos.json
//! ```

/// Error types.
pub mod app;

/// Command-line interface using clap.
pub mod cli;

/// Layered configuration: defaults, settings file, input file, flags.
pub mod config;

/// Raw and canonical video records.
///
/// - [`RawRecord`](domain::RawRecord): partially populated scrape output
/// - [`Video`](domain::Video): canonical record with a stable JSON shape
pub mod domain;

/// Transcript fetching.
///
/// - [`TranscriptFetcher`](fetcher::TranscriptFetcher): async trait
/// - [`HttpTranscriptFetcher`](fetcher::HttpTranscriptFetcher): reqwest-based implementation
pub mod fetcher;

/// Raw-to-canonical normalization.
///
/// Parses counts like "27.2M subscribers" and trims/blanks string fields.
pub mod normalizer;

/// Headless Chrome scraping via chromiumoxide.
///
/// - [`ChromeScraper`](scraper::ChromeScraper): browser-backed scraper
/// - [`Scraper`](scraper::Scraper): async trait for scrape runs
pub mod scraper;

use std::sync::Arc;

use tracing::info;

pub use app::{Result, ScraperError};
pub use config::{ScrapeConfig, ScrapeMode};
pub use domain::Video;

use crate::fetcher::HttpTranscriptFetcher;
use crate::normalizer::Normalizer;
use crate::scraper::{ChromeScraper, Scraper};

/// Run a full scrape with the given configuration.
///
/// The configuration is validated before any browser is launched. The
/// browser is closed whether or not the run succeeds.
pub async fn scrape_youtube(config: ScrapeConfig) -> Result<Vec<Video>> {
    config.validate()?;
    let config = config.normalized();

    info!(
        "Starting scrape in \"{}\" mode with maxVideos={}, includeTranscript={}",
        config.mode, config.max_videos, config.include_transcript
    );

    let transcripts = Arc::new(HttpTranscriptFetcher::new()?);
    let scraper = ChromeScraper::launch(
        config.headless,
        config.browser.clone(),
        transcripts,
        Normalizer::new(),
    )
    .await?;

    let result = scraper.scrape(&config).await;
    scraper.close().await;
    result
}
