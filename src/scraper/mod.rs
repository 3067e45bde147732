//! Browser-driven YouTube scraping.
//!
//! # Architecture
//!
//! ```text
//! channel /videos or search results → watch links ─┐
//! channel /about ─────────────────────────────────┴→ watch pages → RawRecord → Normalizer → Video
//! ```
//!
//! Selectors are fixed fallback chains (see [`extractor`]) and waits are
//! fixed delays plus a coarse network-idle heuristic. Nothing here retries.
//!
//! # Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use ytscraper::fetcher::HttpTranscriptFetcher;
//! use ytscraper::normalizer::Normalizer;
//! use ytscraper::scraper::{BrowserSettings, ChromeScraper, Scraper};
//!
//! let transcripts = Arc::new(HttpTranscriptFetcher::new()?);
//! let scraper =
//!     ChromeScraper::launch(true, BrowserSettings::default(), transcripts, Normalizer::new()).await?;
//! let videos = scraper.scrape(&config).await;
//! scraper.close().await;
//! ```

mod chrome;
mod config;
pub mod extractor;
pub mod video_id;

pub use chrome::ChromeScraper;
pub use config::{BrowserSettings, PartialBrowserSettings};
pub use extractor::{PageExtractor, VideoLink};
pub use video_id::extract_video_id;

use async_trait::async_trait;

use crate::app::Result;
use crate::config::ScrapeConfig;
use crate::domain::Video;

/// Trait for scrape run implementations
#[async_trait]
pub trait Scraper: Send + Sync {
    /// Run the configured mode and return normalized videos in link order.
    ///
    /// Videos that fail individually are logged and left out.
    async fn scrape(&self, config: &ScrapeConfig) -> Result<Vec<Video>>;
}
