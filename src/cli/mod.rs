pub mod commands;

use std::path::PathBuf;

use clap::Parser;

use crate::config::{PartialConfig, ScrapeMode};

#[derive(Parser, Debug, Default)]
#[command(name = "ytscraper")]
#[command(about = "Scrape YouTube channel or search-result videos into JSON", long_about = None)]
pub struct Cli {
    /// Scraping mode: "channel" for a channel URL, "keyword" for a search query
    #[arg(short, long, value_enum)]
    pub mode: Option<ScrapeMode>,

    /// YouTube channel URL (used in channel mode)
    #[arg(short, long)]
    pub channel_url: Option<String>,

    /// Keyword to search on YouTube (used in keyword mode)
    #[arg(short, long)]
    pub keyword: Option<String>,

    /// Maximum number of videos to scrape
    #[arg(short = 'n', long)]
    pub max_videos: Option<i64>,

    /// Whether to include transcripts when available
    #[arg(short = 't', long, num_args = 0..=1, default_missing_value = "true")]
    pub include_transcript: Option<bool>,

    /// Run the browser in headless mode
    #[arg(short = 'H', long, num_args = 0..=1, default_missing_value = "true")]
    pub headless: Option<bool>,

    /// Transcript language code (e.g. "en")
    #[arg(short, long)]
    pub language: Option<String>,

    /// Path to a JSON (or .toml) file with scraper configuration
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Path to the output JSON file. Prints to stdout when omitted.
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl Cli {
    /// The flags that were actually given, as a config layer.
    pub fn overrides(&self) -> PartialConfig {
        PartialConfig {
            mode: self.mode,
            channel_url: self.channel_url.clone(),
            keyword: self.keyword.clone(),
            max_videos: self.max_videos,
            include_transcript: self.include_transcript,
            headless: self.headless,
            language: self.language.clone(),
            browser: None,
        }
    }
}
