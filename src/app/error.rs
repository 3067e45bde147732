use thiserror::Error;

use crate::config::ConfigError;

#[derive(Error, Debug)]
pub enum ScraperError {
    #[error("Invalid raw video data: \"{0}\" is required")]
    MissingRequiredField(&'static str),

    #[error("channelUrl must be provided when mode is \"channel\"")]
    MissingChannelUrl,

    #[error("keyword must be provided when mode is \"keyword\"")]
    MissingKeyword,

    #[error("Failed to launch browser: {0}")]
    BrowserLaunch(String),

    #[error("Failed to create a new page: {0}")]
    PageCreation(String),

    #[error("Navigation failed: {0}")]
    Navigation(String),

    #[error("Script execution failed: {0}")]
    Script(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ScraperError {
    /// Stable machine-readable code, used in the CLI failure line.
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingRequiredField(_) => "MISSING_REQUIRED_FIELD",
            Self::MissingChannelUrl => "MISSING_CHANNEL_URL",
            Self::MissingKeyword => "MISSING_KEYWORD",
            Self::BrowserLaunch(_) => "BROWSER_LAUNCH_FAILED",
            Self::PageCreation(_) => "PAGE_CREATION_FAILED",
            Self::Navigation(_) => "NAVIGATION_FAILED",
            Self::Script(_) => "SCRIPT_FAILED",
            Self::Http(_) => "HTTP_ERROR",
            Self::Json(_) => "JSON_ERROR",
            Self::InvalidUrl(_) => "INVALID_URL",
            Self::Config(_) => "CONFIG_ERROR",
            Self::Io(_) => "IO_ERROR",
        }
    }
}

pub type Result<T> = std::result::Result<T, ScraperError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_field_message_names_field() {
        let err = ScraperError::MissingRequiredField("videoUrl");
        assert_eq!(err.code(), "MISSING_REQUIRED_FIELD");
        assert!(err.to_string().contains("\"videoUrl\""));
    }

    #[test]
    fn test_config_error_converts() {
        let err: ScraperError = ConfigError::NotFound("/tmp/nope.json".into()).into();
        assert_eq!(err.code(), "CONFIG_ERROR");
        assert!(err.to_string().contains("/tmp/nope.json"));
    }
}
