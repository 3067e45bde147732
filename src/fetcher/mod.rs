pub mod http_fetcher;

use async_trait::async_trait;

use crate::app::Result;

pub use http_fetcher::{parse_transcript_xml, HttpTranscriptFetcher};

#[async_trait]
pub trait TranscriptFetcher {
    /// Fetch the transcript text of a video.
    ///
    /// `Ok(None)` means no transcript is available in that language.
    async fn fetch(&self, video_id: &str, language: &str) -> Result<Option<String>>;
}
