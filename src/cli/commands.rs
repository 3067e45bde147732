use std::fs;
use std::io::{self, Write};
use std::path::Path;

use anyhow::Context;
use serde::Serialize;
use tracing::{info, warn};

use crate::app::Result;
use crate::cli::Cli;
use crate::config::{load_input_file, ConfigError, ScrapeConfig, Settings};
use crate::scrape_youtube;

/// Resolve the run configuration: defaults, settings file, input file, flags.
pub fn build_config(cli: &Cli) -> Result<ScrapeConfig> {
    let settings = match Settings::load() {
        Ok(settings) => settings,
        Err(ConfigError::NoConfigDir) => {
            warn!("No config directory found, using default browser settings");
            Settings::default()
        }
        Err(e) => return Err(e.into()),
    };

    build_config_with(cli, settings)
}

pub fn build_config_with(cli: &Cli, settings: Settings) -> Result<ScrapeConfig> {
    let mut config = ScrapeConfig {
        browser: settings.browser,
        ..Default::default()
    };

    if let Some(path) = &cli.input {
        config = config.merge(load_input_file(path)?);
    }

    let config = config.merge(cli.overrides());
    config.validate()?;
    Ok(config)
}

pub async fn run(cli: &Cli) -> anyhow::Result<()> {
    let config = build_config(cli).context("Invalid configuration")?;
    info!("Starting YouTube scraping in \"{}\" mode...", config.mode);

    let videos = scrape_youtube(config).await?;

    write_output(&videos, cli.output.as_deref()).with_context(|| match &cli.output {
        Some(path) => format!("Failed to write output to {}", path.display()),
        None => "Failed to write output to stdout".to_string(),
    })?;

    info!("Scraping completed successfully.");
    Ok(())
}

/// Write indented JSON to `output`, or to stdout when `None`.
pub fn write_output<T: Serialize + ?Sized>(data: &T, output: Option<&Path>) -> Result<()> {
    let json = serde_json::to_string_pretty(data)?;

    match output {
        Some(path) => {
            fs::write(path, &json)?;
            let resolved = fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
            info!("Scraped data written to {}", resolved.display());
        }
        None => {
            let mut stdout = io::stdout().lock();
            writeln!(stdout, "{}", json)?;
        }
    }

    Ok(())
}
