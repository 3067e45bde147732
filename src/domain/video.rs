use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::domain::raw::{Count, RawChannelInfo, RawRecord};

/// Canonical video record. Every key is always serialized, absent values as `null`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Video {
    pub title: Option<String>,
    pub author: Option<String>,
    pub video_url: String,
    pub cover_image: Option<String>,
    pub subscriber_count: Option<u64>,
    pub like_count: Option<u64>,
    pub description: Option<String>,
    pub view_count: Option<u64>,
    pub comment_count: Option<u64>,
    pub published_at: Option<String>,
    pub id: Option<String>,
    pub amount_of_videos: Option<u64>,
    pub profile_picture: Option<String>,
    pub transcript: Option<String>,
    pub channel_info: Option<ChannelInfo>,
}

impl Video {
    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.video_url)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelInfo {
    pub active_from: Option<String>,
    pub view_counter: Option<String>,
    pub channel_description: Option<String>,
    pub country: Option<String>,
    pub links: Links,
}

/// Label → URL map that keeps insertion order and unique labels.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Links(Vec<(String, String)>);

impl Links {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert unless the label is already present. Returns whether it was inserted.
    pub fn insert_first(&mut self, label: impl Into<String>, url: impl Into<String>) -> bool {
        let label = label.into();
        if self.get(&label).is_some() {
            return false;
        }
        self.0.push((label, url.into()));
        true
    }

    pub fn get(&self, label: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, url)| url.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(l, u)| (l.as_str(), u.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for Links {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (label, url) in &self.0 {
            map.serialize_entry(label, url)?;
        }
        map.end()
    }
}

impl From<Video> for RawRecord {
    fn from(v: Video) -> Self {
        Self {
            video_url: Some(v.video_url),
            id: v.id,
            title: v.title,
            author: v.author,
            cover_image: v.cover_image,
            profile_picture: v.profile_picture,
            description: v.description,
            published_at: v.published_at,
            transcript: v.transcript,
            subscriber_count: v.subscriber_count.map(Count::Value),
            like_count: v.like_count.map(Count::Value),
            view_count: v.view_count.map(Count::Value),
            comment_count: v.comment_count.map(Count::Value),
            amount_of_videos: v.amount_of_videos,
            channel_info: v.channel_info.map(RawChannelInfo::from),
        }
    }
}

impl From<ChannelInfo> for RawChannelInfo {
    fn from(info: ChannelInfo) -> Self {
        Self {
            active_from: info.active_from,
            view_counter: info.view_counter,
            channel_description: info.channel_description,
            country: info.country,
            subscriber_count_text: None,
            links: info.links.0.into_iter().map(|(l, u)| (l, Some(u))).collect(),
        }
    }
}
