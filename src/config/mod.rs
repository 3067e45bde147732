//! Run configuration for the scraper.
//!
//! Values are layered: built-in defaults, then the `[browser]` table of
//! `~/.config/ytscraper/config.toml`, then an optional input file (JSON, or
//! TOML when the path ends in `.toml`), then command-line flags.

use std::fmt;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::app::{Result, ScraperError};
use crate::scraper::{BrowserSettings, PartialBrowserSettings};

pub const DEFAULT_MAX_VIDEOS: usize = 10;
pub const MAX_VIDEOS_CAP: usize = 100;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ScrapeMode {
    /// Scrape the videos of a channel URL
    #[default]
    Channel,
    /// Scrape YouTube search results for a keyword
    Keyword,
}

impl fmt::Display for ScrapeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Channel => f.write_str("channel"),
            Self::Keyword => f.write_str("keyword"),
        }
    }
}

/// Fully resolved scrape parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ScrapeConfig {
    pub mode: ScrapeMode,
    pub channel_url: Option<String>,
    pub keyword: Option<String>,
    pub max_videos: usize,
    pub include_transcript: bool,
    pub headless: bool,
    /// Transcript language code
    pub language: String,
    pub browser: BrowserSettings,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            mode: ScrapeMode::Channel,
            channel_url: None,
            keyword: None,
            max_videos: DEFAULT_MAX_VIDEOS,
            include_transcript: false,
            headless: true,
            language: "en".to_string(),
            browser: BrowserSettings::default(),
        }
    }
}

/// A config layer where every field is optional. Only set fields override.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PartialConfig {
    pub mode: Option<ScrapeMode>,
    pub channel_url: Option<String>,
    pub keyword: Option<String>,
    pub max_videos: Option<i64>,
    pub include_transcript: Option<bool>,
    pub headless: Option<bool>,
    pub language: Option<String>,
    pub browser: Option<PartialBrowserSettings>,
}

impl ScrapeConfig {
    /// Overlay the fields set in `layer`.
    pub fn merge(mut self, layer: PartialConfig) -> Self {
        if let Some(mode) = layer.mode {
            self.mode = mode;
        }
        if let Some(url) = layer.channel_url {
            self.channel_url = Some(url);
        }
        if let Some(keyword) = layer.keyword {
            self.keyword = Some(keyword);
        }
        if let Some(max) = layer.max_videos {
            // Non-positive values fall back to the default in `normalized`.
            self.max_videos = usize::try_from(max).unwrap_or(0);
        }
        if let Some(include) = layer.include_transcript {
            self.include_transcript = include;
        }
        if let Some(headless) = layer.headless {
            self.headless = headless;
        }
        if let Some(language) = layer.language {
            self.language = language;
        }
        if let Some(browser) = layer.browser {
            self.browser = self.browser.merge(browser);
        }
        self
    }

    /// Check that the selected mode has its target.
    pub fn validate(&self) -> Result<()> {
        let present = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.trim().is_empty());
        match self.mode {
            ScrapeMode::Channel if !present(&self.channel_url) => Err(ScraperError::MissingChannelUrl),
            ScrapeMode::Keyword if !present(&self.keyword) => Err(ScraperError::MissingKeyword),
            _ => Ok(()),
        }
    }

    /// Clamp `max_videos` into `1..=MAX_VIDEOS_CAP`; zero means the default.
    pub fn normalized(mut self) -> Self {
        if self.max_videos == 0 {
            self.max_videos = DEFAULT_MAX_VIDEOS;
        }
        if self.max_videos > MAX_VIDEOS_CAP {
            warn!(
                "Requested maxVideos={} - this may be slow. Capping at {} for safety.",
                self.max_videos, MAX_VIDEOS_CAP
            );
            self.max_videos = MAX_VIDEOS_CAP;
        }
        self
    }
}

/// Read a config layer from a JSON or TOML file.
pub fn load_input_file(path: &Path) -> std::result::Result<PartialConfig, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::NotFound(path.to_path_buf()));
    }

    let content = fs::read_to_string(path).map_err(|e| ConfigError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;

    let is_toml = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));

    if is_toml {
        toml::from_str(&content).map_err(|e| ConfigError::Toml {
            path: path.to_path_buf(),
            source: e,
        })
    } else {
        serde_json::from_str(&content).map_err(|e| ConfigError::Json {
            path: path.to_path_buf(),
            source: e,
        })
    }
}

/// Persistent user settings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub browser: BrowserSettings,
}

impl Settings {
    /// Load settings from the default path, writing a commented default file
    /// first if none exists.
    pub fn load() -> std::result::Result<Self, ConfigError> {
        Self::load_from(&Self::default_config_path()?)
    }

    pub fn load_from(path: &Path) -> std::result::Result<Self, ConfigError> {
        if !path.exists() {
            Self::create_default_config(path)?;
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::Toml {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Get the default config file path: `~/.config/ytscraper/config.toml`
    pub fn default_config_path() -> std::result::Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir.join("ytscraper").join("config.toml"))
    }

    fn create_default_config(path: &Path) -> std::result::Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let mut file = fs::File::create(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        file.write_all(Self::default_config_content().as_bytes())
            .map_err(|e| ConfigError::Io {
                path: path.to_path_buf(),
                source: e,
            })?;

        Ok(())
    }

    fn default_config_content() -> &'static str {
        r##"# ytscraper configuration
#
# Run options (mode, channel URL, keyword, ...) come from --input files and
# command-line flags. This file only tunes the browser.

[browser]
# Page navigation timeout in seconds
navigation_timeout_secs = 60

# Upper bound on waiting for the network to go idle (milliseconds)
idle_timeout_ms = 8000

# Network counts as idle at or below this many in-flight requests
max_inflight_requests = 2

# Extra wait after a watch/about page loads (milliseconds)
settle_delay_ms = 2000

# Scrolling on channel and search listings
max_scrolls = 15
scroll_step = 1000
scroll_delay_ms = 500

window_width = 1366
window_height = 768

user_agent = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/119.0.0.0 Safari/537.36"
"##
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("Input config file not found at: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Failed to read/write config file at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse JSON from {}: {source}", path.display())]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Failed to parse TOML from {}: {source}", path.display())]
    Toml {
        path: PathBuf,
        source: toml::de::Error,
    },
}
