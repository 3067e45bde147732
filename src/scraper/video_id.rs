use tracing::warn;
use url::Url;

/// Extract the video id from a watch, shorts or embed URL.
///
/// Falls back to the last path segment for unusual shapes.
pub fn extract_video_id(video_url: &str) -> Option<String> {
    let parsed = match Url::parse(video_url) {
        Ok(url) => url,
        Err(e) => {
            warn!("Failed to parse video ID from URL \"{}\": {}", video_url, e);
            return None;
        }
    };

    if let Some((_, v)) = parsed.query_pairs().find(|(k, _)| k == "v") {
        return Some(v.into_owned());
    }

    let segments: Vec<&str> = parsed
        .path_segments()
        .map(|s| s.filter(|seg| !seg.is_empty()).collect())
        .unwrap_or_default();

    match segments.as_slice() {
        ["shorts" | "embed", id, ..] => Some((*id).to_string()),
        [.., last] => Some((*last).to_string()),
        [] => None,
    }
}

pub fn cover_image_url(video_id: &str) -> String {
    format!("https://i.ytimg.com/vi/{}/hqdefault.jpg", video_id)
}
