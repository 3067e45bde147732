use std::fmt;

use serde::de::{self, MapAccess, SeqAccess, Visitor};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// A count as the scraper found it: either already numeric, or display text
/// such as `"1.4K views"` that still needs parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Count {
    Value(u64),
    Text(String),
}

impl Count {
    /// Build a count from both variants. The numeric value always wins.
    pub fn pick(value: Option<u64>, text: Option<String>) -> Option<Self> {
        value.map(Count::Value).or_else(|| text.map(Count::Text))
    }
}

/// Loosely-populated video record produced by scraping, before normalization.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(from = "RawRecordFields")]
pub struct RawRecord {
    pub video_url: Option<String>,
    pub id: Option<String>,
    pub title: Option<String>,
    pub author: Option<String>,
    pub cover_image: Option<String>,
    pub profile_picture: Option<String>,
    pub description: Option<String>,
    pub published_at: Option<String>,
    pub transcript: Option<String>,
    pub subscriber_count: Option<Count>,
    pub like_count: Option<Count>,
    pub view_count: Option<Count>,
    pub comment_count: Option<Count>,
    pub amount_of_videos: Option<u64>,
    pub channel_info: Option<RawChannelInfo>,
}

impl RawRecord {
    pub fn new(video_url: impl Into<String>) -> Self {
        Self {
            video_url: Some(video_url.into()),
            ..Default::default()
        }
    }
}

/// Channel "About" data as scraped.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(from = "RawChannelInfoFields")]
pub struct RawChannelInfo {
    pub active_from: Option<String>,
    pub view_counter: Option<String>,
    pub channel_description: Option<String>,
    pub country: Option<String>,
    /// Only used by the scraper to override a video page's subscriber text.
    pub subscriber_count_text: Option<String>,
    /// Label/URL pairs in page order. A `None` URL is dropped on normalization.
    pub links: Vec<(String, Option<String>)>,
}

/// JSON wire shape: every count has a numeric and a text field, and any
/// field may carry the wrong JSON type.
#[derive(Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
struct RawRecordFields {
    video_url: Option<Value>,
    id: Option<Value>,
    title: Option<Value>,
    author: Option<Value>,
    cover_image: Option<Value>,
    profile_picture: Option<Value>,
    description: Option<Value>,
    published_at: Option<Value>,
    transcript: Option<Value>,
    subscriber_count: Option<Value>,
    subscriber_count_text: Option<Value>,
    like_count: Option<Value>,
    like_count_text: Option<Value>,
    view_count: Option<Value>,
    view_count_text: Option<Value>,
    comment_count: Option<Value>,
    comment_count_text: Option<Value>,
    amount_of_videos: Option<Value>,
    #[serde(deserialize_with = "deserialize_channel_info")]
    channel_info: Option<RawChannelInfo>,
}

#[derive(Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
struct RawChannelInfoFields {
    active_from: Option<Value>,
    view_counter: Option<Value>,
    channel_description: Option<Value>,
    country: Option<Value>,
    subscriber_count_text: Option<Value>,
    #[serde(deserialize_with = "deserialize_links")]
    links: Vec<(String, Option<String>)>,
}

impl From<RawRecordFields> for RawRecord {
    fn from(f: RawRecordFields) -> Self {
        Self {
            video_url: scalar_text(f.video_url),
            id: scalar_text(f.id),
            title: scalar_text(f.title),
            author: scalar_text(f.author),
            cover_image: scalar_text(f.cover_image),
            profile_picture: scalar_text(f.profile_picture),
            description: scalar_text(f.description),
            published_at: scalar_text(f.published_at),
            transcript: scalar_text(f.transcript),
            subscriber_count: Count::pick(
                count_value(f.subscriber_count),
                scalar_text(f.subscriber_count_text),
            ),
            like_count: Count::pick(count_value(f.like_count), scalar_text(f.like_count_text)),
            view_count: Count::pick(count_value(f.view_count), scalar_text(f.view_count_text)),
            comment_count: Count::pick(
                count_value(f.comment_count),
                scalar_text(f.comment_count_text),
            ),
            amount_of_videos: count_value(f.amount_of_videos),
            channel_info: f.channel_info,
        }
    }
}

impl From<RawChannelInfoFields> for RawChannelInfo {
    fn from(f: RawChannelInfoFields) -> Self {
        Self {
            active_from: scalar_text(f.active_from),
            view_counter: scalar_text(f.view_counter),
            channel_description: scalar_text(f.channel_description),
            country: scalar_text(f.country),
            subscriber_count_text: scalar_text(f.subscriber_count_text),
            links: f.links,
        }
    }
}

/// Strings pass through, numbers and booleans are stringified, anything
/// structured is dropped.
fn scalar_text(value: Option<Value>) -> Option<String> {
    match value? {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(number_text(&n)),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Integral floats print without a fraction, so `1.0` becomes `"1"`.
fn number_text(n: &serde_json::Number) -> String {
    match n.as_f64() {
        Some(f) if n.is_f64() && f.fract() == 0.0 && f.abs() < 1e21 => {
            if f == 0.0 {
                "0".to_string()
            } else {
                format!("{:.0}", f)
            }
        }
        _ => n.to_string(),
    }
}

/// Only JSON numbers holding a non-negative integer count as numeric.
fn count_value(value: Option<Value>) -> Option<u64> {
    match value? {
        Value::Number(n) => n.as_u64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite() && *f >= 0.0 && f.fract() == 0.0)
                .map(|f| f as u64)
        }),
        _ => None,
    }
}

/// Truthiness check for link targets: null, false, 0 and "" are dropped.
fn truthy_text(value: Value) -> Option<String> {
    match value {
        Value::Null | Value::Bool(false) => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s),
        Value::Number(n) if n.as_f64() == Some(0.0) => None,
        other => Some(other.to_string()),
    }
}

#[derive(Deserialize)]
struct LinkEntry {
    label: String,
    #[serde(default)]
    href: Value,
}

/// Accepts `{"label": "url", ...}` in document order, or `[{"label", "href"}]`.
fn deserialize_links<'de, D>(deserializer: D) -> Result<Vec<(String, Option<String>)>, D::Error>
where
    D: Deserializer<'de>,
{
    struct LinksVisitor;

    impl<'de> Visitor<'de> for LinksVisitor {
        type Value = Vec<(String, Option<String>)>;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a map of label to url or a list of {label, href} objects")
        }

        fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(Vec::new())
        }

        fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(Vec::new())
        }

        fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
            let mut links = Vec::new();
            while let Some((label, href)) = map.next_entry::<String, Value>()? {
                links.push((label, truthy_text(href)));
            }
            Ok(links)
        }

        fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
            let mut links = Vec::new();
            while let Some(entry) = seq.next_element::<Value>()? {
                if let Ok(entry) = LinkEntry::deserialize(entry) {
                    links.push((entry.label, truthy_text(entry.href)));
                }
            }
            Ok(links)
        }

        // Scalars are not a link collection.
        fn visit_bool<E: de::Error>(self, _: bool) -> Result<Self::Value, E> {
            Ok(Vec::new())
        }

        fn visit_i64<E: de::Error>(self, _: i64) -> Result<Self::Value, E> {
            Ok(Vec::new())
        }

        fn visit_u64<E: de::Error>(self, _: u64) -> Result<Self::Value, E> {
            Ok(Vec::new())
        }

        fn visit_f64<E: de::Error>(self, _: f64) -> Result<Self::Value, E> {
            Ok(Vec::new())
        }

        fn visit_str<E: de::Error>(self, _: &str) -> Result<Self::Value, E> {
            Ok(Vec::new())
        }
    }

    deserializer.deserialize_any(LinksVisitor)
}

/// Falsy values (`null`, `false`, `0`, `""`) mean no channel info. An object
/// is read loosely; any other truthy value gives an empty record.
fn deserialize_channel_info<'de, D>(deserializer: D) -> Result<Option<RawChannelInfo>, D::Error>
where
    D: Deserializer<'de>,
{
    struct ChannelInfoVisitor;

    impl<'de> Visitor<'de> for ChannelInfoVisitor {
        type Value = Option<RawChannelInfo>;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a channel info object")
        }

        fn visit_map<A: MapAccess<'de>>(self, map: A) -> Result<Self::Value, A::Error> {
            RawChannelInfo::deserialize(de::value::MapAccessDeserializer::new(map)).map(Some)
        }

        fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
            while seq.next_element::<de::IgnoredAny>()?.is_some() {}
            Ok(Some(RawChannelInfo::default()))
        }

        fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_bool<E: de::Error>(self, v: bool) -> Result<Self::Value, E> {
            Ok(v.then(RawChannelInfo::default))
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
            Ok((v != 0).then(RawChannelInfo::default))
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
            Ok((v != 0).then(RawChannelInfo::default))
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
            Ok((v != 0.0 && !v.is_nan()).then(RawChannelInfo::default))
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
            Ok((!v.is_empty()).then(RawChannelInfo::default))
        }
    }

    deserializer.deserialize_any(ChannelInfoVisitor)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_count_wins_over_text() {
        assert_eq!(
            Count::pick(Some(5), Some("1.4K".into())),
            Some(Count::Value(5))
        );
        assert_eq!(
            Count::pick(None, Some("1.4K".into())),
            Some(Count::Text("1.4K".into()))
        );
        assert_eq!(Count::pick(None, None), None);
    }

    #[test]
    fn test_deserialize_camel_case_fields() {
        let raw: RawRecord = serde_json::from_str(
            r#"{
                "videoUrl": "https://www.youtube.com/watch?v=abc",
                "title": "A video",
                "viewCount": 12,
                "viewCountText": "99 views",
                "likeCountText": "1.4K"
            }"#,
        )
        .unwrap();

        assert_eq!(raw.video_url.as_deref(), Some("https://www.youtube.com/watch?v=abc"));
        assert_eq!(raw.title.as_deref(), Some("A video"));
        assert_eq!(raw.view_count, Some(Count::Value(12)));
        assert_eq!(raw.like_count, Some(Count::Text("1.4K".into())));
        assert_eq!(raw.comment_count, None);
    }

    #[test]
    fn test_non_numeric_count_falls_back_to_text() {
        let raw: RawRecord = serde_json::from_str(
            r#"{"videoUrl": "u", "likeCount": "12", "likeCountText": "3K", "viewCount": -4}"#,
        )
        .unwrap();

        assert_eq!(raw.like_count, Some(Count::Text("3K".into())));
        assert_eq!(raw.view_count, None);
    }

    #[test]
    fn test_amount_of_videos_requires_number() {
        let raw: RawRecord =
            serde_json::from_str(r#"{"videoUrl": "u", "amountOfVideos": "12"}"#).unwrap();
        assert_eq!(raw.amount_of_videos, None);

        let raw: RawRecord =
            serde_json::from_str(r#"{"videoUrl": "u", "amountOfVideos": 12}"#).unwrap();
        assert_eq!(raw.amount_of_videos, Some(12));
    }

    #[test]
    fn test_links_from_object_keep_document_order() {
        let info: RawChannelInfo = serde_json::from_str(
            r#"{"links": {"Twitter": "https://t.co/x", "Empty": "", "Blog": "https://b.example", "Zero": 0}}"#,
        )
        .unwrap();

        assert_eq!(
            info.links,
            vec![
                ("Twitter".to_string(), Some("https://t.co/x".to_string())),
                ("Empty".to_string(), None),
                ("Blog".to_string(), Some("https://b.example".to_string())),
                ("Zero".to_string(), None),
            ]
        );
    }

    #[test]
    fn test_links_from_list_and_null() {
        let info: RawChannelInfo = serde_json::from_str(
            r#"{"links": [{"label": "Site", "href": "https://s.example"}, {"label": "Dead", "href": null}]}"#,
        )
        .unwrap();
        assert_eq!(info.links.len(), 2);
        assert_eq!(info.links[1], ("Dead".to_string(), None));

        let info: RawChannelInfo = serde_json::from_str(r#"{"links": null}"#).unwrap();
        assert!(info.links.is_empty());
    }

    #[test]
    fn test_channel_info_fields_are_loosely_typed() {
        let raw: RawRecord = serde_json::from_str(
            r#"{"videoUrl": "u", "channelInfo": {"viewCounter": 5, "country": true, "activeFrom": {"x": 1}}}"#,
        )
        .unwrap();
        let info = raw.channel_info.unwrap();

        assert_eq!(info.view_counter.as_deref(), Some("5"));
        assert_eq!(info.country.as_deref(), Some("true"));
        assert_eq!(info.active_from, None);
    }

    #[test]
    fn test_falsy_channel_info_is_none() {
        for input in ["false", "null", "0", r#""""#] {
            let json = format!(r#"{{"videoUrl": "u", "channelInfo": {}}}"#, input);
            let raw: RawRecord = serde_json::from_str(&json).unwrap();
            assert_eq!(raw.channel_info, None, "channelInfo = {}", input);
        }

        let raw: RawRecord =
            serde_json::from_str(r#"{"videoUrl": "u", "channelInfo": "yes"}"#).unwrap();
        assert_eq!(raw.channel_info, Some(RawChannelInfo::default()));
    }

    #[test]
    fn test_scalar_links_are_ignored() {
        for input in [r#""https://a""#, "7", "true"] {
            let json = format!(r#"{{"links": {}, "country": "Norway"}}"#, input);
            let info: RawChannelInfo = serde_json::from_str(&json).unwrap();
            assert!(info.links.is_empty(), "links = {}", input);
            assert_eq!(info.country.as_deref(), Some("Norway"));
        }

        let info: RawChannelInfo =
            serde_json::from_str(r#"{"links": ["junk", {"label": "Site", "href": "https://s"}]}"#)
                .unwrap();
        assert_eq!(info.links, vec![("Site".to_string(), Some("https://s".to_string()))]);
    }

    #[test]
    fn test_integral_float_text_drops_fraction() {
        let raw: RawRecord = serde_json::from_str(
            r#"{"videoUrl": "u", "title": 1.0, "author": 2.5, "likeCountText": 3.0}"#,
        )
        .unwrap();

        assert_eq!(raw.title.as_deref(), Some("1"));
        assert_eq!(raw.author.as_deref(), Some("2.5"));
        assert_eq!(raw.like_count, Some(Count::Text("3".into())));
    }
}
