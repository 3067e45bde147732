pub mod number;

pub use number::parse_human_number;

use std::sync::Arc;

use tracing::debug;

use crate::app::{Result, ScraperError};
use crate::domain::{ChannelInfo, Count, Links, RawChannelInfo, RawRecord, Video};

/// Receives one trace record per normalized video.
pub trait TraceSink: Send + Sync {
    fn formatted(&self, video: &Video);
}

/// Forwards traces to `tracing` at debug level.
pub struct TracingSink;

impl TraceSink for TracingSink {
    fn formatted(&self, video: &Video) {
        debug!("Formatted video: {}", video.display_title());
    }
}

/// Discards traces.
pub struct NoopSink;

impl TraceSink for NoopSink {
    fn formatted(&self, _video: &Video) {}
}

#[derive(Clone)]
pub struct Normalizer {
    trace: Arc<dyn TraceSink>,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Normalizer {
    pub fn new() -> Self {
        Self::with_trace(Arc::new(TracingSink))
    }

    pub fn with_trace(trace: Arc<dyn TraceSink>) -> Self {
        Self { trace }
    }

    /// Convert a scraped record into the canonical output shape.
    ///
    /// Fails only when `video_url` is missing or blank.
    pub fn normalize(&self, raw: RawRecord) -> Result<Video> {
        let video_url = normalize_string(raw.video_url.as_deref())
            .ok_or(ScraperError::MissingRequiredField("videoUrl"))?;

        let video = Video {
            title: normalize_string(raw.title.as_deref()),
            author: normalize_string(raw.author.as_deref()),
            video_url,
            cover_image: normalize_string(raw.cover_image.as_deref()),
            subscriber_count: resolve_count(raw.subscriber_count),
            like_count: resolve_count(raw.like_count),
            description: normalize_string(raw.description.as_deref()),
            view_count: resolve_count(raw.view_count),
            comment_count: resolve_count(raw.comment_count),
            published_at: normalize_string(raw.published_at.as_deref()),
            id: normalize_string(raw.id.as_deref()),
            amount_of_videos: raw.amount_of_videos,
            profile_picture: normalize_string(raw.profile_picture.as_deref()),
            transcript: normalize_string(raw.transcript.as_deref()),
            channel_info: raw.channel_info.map(normalize_channel_info),
        };

        self.trace.formatted(&video);
        Ok(video)
    }
}

/// Trim; blank becomes `None`.
pub fn normalize_string(value: Option<&str>) -> Option<String> {
    let trimmed = value?.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn resolve_count(count: Option<Count>) -> Option<u64> {
    match count? {
        Count::Value(n) => Some(n),
        Count::Text(text) => parse_human_number(Some(&text)),
    }
}

fn normalize_channel_info(info: RawChannelInfo) -> ChannelInfo {
    let mut links = Links::new();
    for (label, href) in info.links {
        if let Some(url) = href.filter(|u| !u.is_empty()) {
            links.insert_first(label, url);
        }
    }

    ChannelInfo {
        active_from: normalize_string(info.active_from.as_deref()),
        view_counter: normalize_string(info.view_counter.as_deref()),
        channel_description: normalize_string(info.channel_description.as_deref()),
        country: normalize_string(info.country.as_deref()),
        links,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    const URL: &str = "https://www.youtube.com/watch?v=dQw4w9WgXcQ";

    fn quiet() -> Normalizer {
        Normalizer::with_trace(Arc::new(NoopSink))
    }

    #[derive(Default)]
    struct RecordingSink {
        seen: Mutex<Vec<String>>,
    }

    impl TraceSink for RecordingSink {
        fn formatted(&self, video: &Video) {
            self.seen
                .lock()
                .unwrap()
                .push(video.display_title().to_string());
        }
    }

    #[test]
    fn test_missing_video_url_fails() {
        let err = quiet().normalize(RawRecord::default()).unwrap_err();
        assert!(matches!(err, ScraperError::MissingRequiredField("videoUrl")));

        let err = quiet().normalize(RawRecord::new("   ")).unwrap_err();
        assert!(matches!(err, ScraperError::MissingRequiredField(_)));
    }

    #[test]
    fn test_url_only_record_has_all_optionals_empty() {
        let video = quiet().normalize(RawRecord::new(URL)).unwrap();

        assert_eq!(video.video_url, URL);
        assert_eq!(video.title, None);
        assert_eq!(video.author, None);
        assert_eq!(video.cover_image, None);
        assert_eq!(video.subscriber_count, None);
        assert_eq!(video.like_count, None);
        assert_eq!(video.description, None);
        assert_eq!(video.view_count, None);
        assert_eq!(video.comment_count, None);
        assert_eq!(video.published_at, None);
        assert_eq!(video.id, None);
        assert_eq!(video.amount_of_videos, None);
        assert_eq!(video.profile_picture, None);
        assert_eq!(video.transcript, None);
        assert_eq!(video.channel_info, None);
    }

    #[test]
    fn test_strings_are_trimmed_and_blank_becomes_none() {
        let mut raw = RawRecord::new(format!("  {URL}\n"));
        raw.title = Some("  Never Gonna Give You Up ".into());
        raw.description = Some(" \t ".into());
        raw.transcript = Some(String::new());

        let video = quiet().normalize(raw).unwrap();
        assert_eq!(video.video_url, URL);
        assert_eq!(video.title.as_deref(), Some("Never Gonna Give You Up"));
        assert_eq!(video.description, None);
        assert_eq!(video.transcript, None);
    }

    #[test]
    fn test_text_counts_are_parsed() {
        let mut raw = RawRecord::new(URL);
        raw.subscriber_count = Some(Count::Text("27.2M subscribers".into()));
        raw.view_count = Some(Count::Text("7,569,331,655 views".into()));
        raw.like_count = Some(Count::Text("Like".into()));
        raw.comment_count = Some(Count::Text("424".into()));

        let video = quiet().normalize(raw).unwrap();
        assert_eq!(video.subscriber_count, Some(27_200_000));
        assert_eq!(video.view_count, Some(7_569_331_655));
        assert_eq!(video.like_count, None);
        assert_eq!(video.comment_count, Some(424));
    }

    #[test]
    fn test_numeric_count_preserved_regardless_of_text() {
        let json = format!(
            r#"{{"videoUrl": "{URL}", "viewCount": 17, "viewCountText": "9.9B views",
                "likeCount": 0, "likeCountText": "garbage"}}"#
        );
        let raw: RawRecord = serde_json::from_str(&json).unwrap();

        let video = quiet().normalize(raw).unwrap();
        assert_eq!(video.view_count, Some(17));
        assert_eq!(video.like_count, Some(0));
    }

    #[test]
    fn test_channel_info_links_keep_truthy_in_order() {
        let mut raw = RawRecord::new(URL);
        raw.channel_info = Some(RawChannelInfo {
            active_from: Some(" Oct 25, 2006 ".into()),
            view_counter: Some("2,000,000 views".into()),
            channel_description: Some(String::new()),
            country: None,
            subscriber_count_text: Some("4M subscribers".into()),
            links: vec![
                ("Website".into(), Some("https://rick.example".into())),
                ("Broken".into(), None),
                ("Empty".into(), Some(String::new())),
                ("Shop".into(), Some("https://shop.example".into())),
                ("Website".into(), Some("https://dupe.example".into())),
            ],
        });

        let video = quiet().normalize(raw).unwrap();
        let info = video.channel_info.unwrap();
        assert_eq!(info.active_from.as_deref(), Some("Oct 25, 2006"));
        assert_eq!(info.view_counter.as_deref(), Some("2,000,000 views"));
        assert_eq!(info.channel_description, None);
        assert_eq!(info.country, None);

        let links: Vec<_> = info.links.iter().collect();
        assert_eq!(
            links,
            vec![
                ("Website", "https://rick.example"),
                ("Shop", "https://shop.example"),
            ]
        );
    }

    #[test]
    fn test_channel_info_links_from_json_coerce_to_string() {
        let json = format!(
            r#"{{"videoUrl": "{URL}", "channelInfo": {{"links": {{"Count": 42, "Off": false}}}}}}"#
        );
        let raw: RawRecord = serde_json::from_str(&json).unwrap();

        let info = quiet().normalize(raw).unwrap().channel_info.unwrap();
        assert_eq!(info.links.get("Count"), Some("42"));
        assert_eq!(info.links.get("Off"), None);
    }

    #[test]
    fn test_normalizing_canonical_record_is_idempotent() {
        let mut raw = RawRecord::new(URL);
        raw.title = Some("Title".into());
        raw.view_count = Some(Count::Text("1.4K".into()));
        raw.subscriber_count = Some(Count::Value(12));
        raw.amount_of_videos = Some(30);
        raw.channel_info = Some(RawChannelInfo {
            country: Some("Japan".into()),
            links: vec![("Site".into(), Some("https://s.example".into()))],
            ..Default::default()
        });

        let normalizer = quiet();
        let first = normalizer.normalize(raw).unwrap();
        let second = normalizer.normalize(RawRecord::from(first.clone())).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_trace_names_item_by_title_then_url() {
        let sink = Arc::new(RecordingSink::default());
        let normalizer = Normalizer::with_trace(sink.clone());

        let mut titled = RawRecord::new(URL);
        titled.title = Some("Hello".into());
        normalizer.normalize(titled).unwrap();
        normalizer.normalize(RawRecord::new(URL)).unwrap();
        let _ = normalizer.normalize(RawRecord::default());

        assert_eq!(*sink.seen.lock().unwrap(), vec!["Hello".to_string(), URL.to_string()]);
    }

    #[test]
    fn test_normalizer_is_shareable_across_threads() {
        let normalizer = Normalizer::new();
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let normalizer = normalizer.clone();
                std::thread::spawn(move || {
                    let mut raw = RawRecord::new(format!("{URL}&t={i}"));
                    raw.like_count = Some(Count::Text(format!("{i}K")));
                    normalizer.normalize(raw).unwrap().like_count
                })
            })
            .collect();

        let mut counts: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        counts.sort();
        assert_eq!(counts, vec![Some(0), Some(1_000), Some(2_000), Some(3_000)]);
    }
}
