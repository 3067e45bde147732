use std::sync::LazyLock;
use std::time::Duration;

use async_trait::async_trait;
use html_escape::decode_html_entities;
use regex::Regex;
use reqwest::Client;
use tracing::warn;
use url::Url;

use crate::app::Result;
use crate::fetcher::TranscriptFetcher;

pub const TIMEDTEXT_ENDPOINT: &str = "https://www.youtube.com/api/timedtext";

// One match per cue: either a self-closing tag or a tag with a body.
static TEXT_ELEMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<text\b[^>]*?(?:/>|>(.*?)</text>)").unwrap());

static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

pub struct HttpTranscriptFetcher {
    client: Client,
    endpoint: String,
}

impl HttpTranscriptFetcher {
    pub fn new() -> Result<Self> {
        Self::with_endpoint(TIMEDTEXT_ENDPOINT)
    }

    pub fn with_endpoint(endpoint: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(15))
            .gzip(true)
            .brotli(true)
            .user_agent(concat!("ytscraper/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    pub fn transcript_url(&self, video_id: &str, language: &str) -> Result<Url> {
        Ok(Url::parse_with_params(
            &self.endpoint,
            &[("lang", language), ("v", video_id)],
        )?)
    }
}

#[async_trait]
impl TranscriptFetcher for HttpTranscriptFetcher {
    async fn fetch(&self, video_id: &str, language: &str) -> Result<Option<String>> {
        if video_id.is_empty() {
            return Ok(None);
        }

        let url = self.transcript_url(video_id, language)?;
        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            warn!(
                "Transcript not available for video {} (status {})",
                video_id,
                response.status()
            );
            return Ok(None);
        }

        let body = response.text().await?;
        Ok(parse_transcript_xml(&body))
    }
}

/// Flatten a timedtext XML document into a single line of text.
///
/// Cue bodies are entity-decoded twice because the endpoint escapes them twice
/// (`&amp;#39;`).
pub fn parse_transcript_xml(xml: &str) -> Option<String> {
    let cues: Vec<String> = TEXT_ELEMENT
        .captures_iter(xml)
        .filter_map(|caps| caps.get(1))
        .map(|body| decode_html_entities(&decode_html_entities(body.as_str())).into_owned())
        .filter(|text| !text.trim().is_empty())
        .collect();

    let joined = WHITESPACE.replace_all(&cues.join(" "), " ").trim().to_string();
    (!joined.is_empty()).then_some(joined)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"<?xml version="1.0" encoding="utf-8" ?>
<transcript>
  <text start="0.5" dur="2.1">Never gonna
give you up</text>
  <text start="2.6" dur="1.9">never gonna let you &amp;#39;down&amp;#39;</text>
  <text start="4.5" dur="0.1"/>
  <text start="4.6" dur="1.0">   </text>
  <text start="5.6" dur="2.0">Tom &amp;amp; Jerry</text>
</transcript>"#;

    #[test]
    fn test_parse_transcript_xml() {
        assert_eq!(
            parse_transcript_xml(SAMPLE).as_deref(),
            Some("Never gonna give you up never gonna let you 'down' Tom & Jerry")
        );
    }

    #[test]
    fn test_self_closing_cue_before_body() {
        let xml = r#"<transcript><text start="1" dur="0.1"/><text start="2">hi</text></transcript>"#;
        assert_eq!(parse_transcript_xml(xml).as_deref(), Some("hi"));

        let xml = r#"<text start="1"/><text start="2">a</text><text start="3"/><text start="4">b</text>"#;
        assert_eq!(parse_transcript_xml(xml).as_deref(), Some("a b"));
    }

    #[test]
    fn test_empty_transcript_is_none() {
        assert_eq!(parse_transcript_xml(""), None);
        assert_eq!(parse_transcript_xml("<transcript></transcript>"), None);
        assert_eq!(parse_transcript_xml(r#"<transcript><text start="1"/></transcript>"#), None);
    }

    #[test]
    fn test_transcript_url_encodes_params() {
        let fetcher = HttpTranscriptFetcher::new().unwrap();
        let url = fetcher.transcript_url("a b&c", "pt-BR").unwrap();
        assert_eq!(
            url.as_str(),
            "https://www.youtube.com/api/timedtext?lang=pt-BR&v=a+b%26c"
        );
    }

    #[test]
    fn test_empty_video_id_skips_request() {
        let fetcher = HttpTranscriptFetcher::with_endpoint("http://127.0.0.1:9/never").unwrap();
        let result = tokio_test::block_on(fetcher.fetch("", "en")).unwrap();
        assert_eq!(result, None);
    }
}
