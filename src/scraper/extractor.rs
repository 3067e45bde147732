use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;

use crate::domain::{Count, RawChannelInfo, RawRecord};

/// Fallback chains for watch-page fields, in priority order.
pub const TITLE_SELECTORS: &[&str] = &["h1.ytd-watch-metadata", "h1.title"];
pub const AUTHOR_SELECTORS: &[&str] = &["#channel-name a", "#channel-name", "ytd-channel-name"];
pub const DESCRIPTION_SELECTORS: &[&str] =
    &["#description", "#description-inner", "#meta-contents #description"];
pub const VIEW_COUNT_SELECTORS: &[&str] = &["span.view-count", "ytd-watch-metadata #info span"];
pub const LIKE_BUTTON_SELECTORS: &[&str] = &[
    "ytd-toggle-button-renderer[is-icon-button] #text",
    "#segmented-like-button button #text",
];
pub const COMMENT_COUNT_SELECTORS: &[&str] = &["#count .count-text", "#count #count"];
pub const PUBLISHED_SELECTORS: &[&str] =
    &["#info-strings yt-formatted-string", "meta[itemprop=\"uploadDate\"]"];
pub const PUBLISHED_META_SELECTORS: &[&str] =
    &["meta[itemprop=\"uploadDate\"]", "meta[itemprop=\"datePublished\"]"];
pub const SUBSCRIBER_SELECTORS: &[&str] =
    &["#owner-sub-count", "yt-formatted-string.ytd-subscribe-button-renderer"];
pub const AVATAR_SELECTORS: &[&str] = &["#avatar img", "#avatar-link img"];

/// Channel "About" tab.
pub const CHANNEL_DESCRIPTION_SELECTORS: &[&str] = &["#description-container", "#description"];
pub const CHANNEL_STATS_SELECTOR: &str =
    "#right-column yt-formatted-string, #stats-container yt-formatted-string";
pub const CHANNEL_LINKS_SELECTOR: &str =
    "#link-list-container a.yt-simple-endpoint, #channel-links-container a.yt-simple-endpoint";
pub const CHANNEL_SUBSCRIBER_SELECTORS: &[&str] = &["#subscriber-count", "#owner-sub-count"];

/// Listing anchors.
pub const CHANNEL_VIDEO_LINK_SELECTOR: &str = "a#video-title-link, a#video-title";
pub const SEARCH_VIDEO_LINK_SELECTOR: &str = "ytd-video-renderer a#video-title";

static JOINED_PREFIX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)joined\s*").unwrap());
static COUNTRY_LIKE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[A-Za-z\s]+$").unwrap());

/// Fields read from a watch page.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct VideoPageData {
    pub title: Option<String>,
    pub description: Option<String>,
    pub author: Option<String>,
    pub view_count_text: Option<String>,
    pub like_count_text: Option<String>,
    pub comment_count_text: Option<String>,
    pub published_at: Option<String>,
    pub subscriber_count_text: Option<String>,
    pub profile_picture: Option<String>,
}

impl VideoPageData {
    /// Combine page fields with derived values into a raw record.
    ///
    /// The channel's subscriber text, when present, wins over the page's.
    pub fn into_raw_record(
        self,
        video_url: &str,
        id: Option<String>,
        cover_image: Option<String>,
        transcript: Option<String>,
        channel_info: Option<RawChannelInfo>,
    ) -> RawRecord {
        let subscriber_text = channel_info
            .as_ref()
            .and_then(|c| c.subscriber_count_text.clone())
            .or(self.subscriber_count_text);

        RawRecord {
            video_url: Some(video_url.to_string()),
            id,
            title: self.title,
            author: self.author,
            cover_image,
            profile_picture: self.profile_picture,
            description: self.description,
            published_at: self.published_at,
            transcript,
            subscriber_count: subscriber_text.map(Count::Text),
            like_count: self.like_count_text.map(Count::Text),
            view_count: self.view_count_text.map(Count::Text),
            comment_count: self.comment_count_text.map(Count::Text),
            amount_of_videos: None,
            channel_info,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Anchor {
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub href: Option<String>,
}

/// Raw text read from a channel "About" tab.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ChannelAboutData {
    pub description: Option<String>,
    pub stats: Vec<String>,
    pub links: Vec<Anchor>,
    pub subscriber_count_text: Option<String>,
}

impl ChannelAboutData {
    /// Classify stats lines and collect labelled links.
    ///
    /// "Joined ..." gives the start date, a line mentioning views gives the
    /// view counter, and the first short alphabetic line is taken as the country.
    pub fn into_channel_info(self) -> RawChannelInfo {
        let mut active_from = None;
        let mut view_counter = None;
        let mut country = None;

        for stat in self.stats.iter().map(|s| s.trim()) {
            let lower = stat.to_lowercase();
            if lower.contains("joined") {
                active_from = Some(JOINED_PREFIX.replace(stat, "").trim().to_string());
            } else if lower.contains("views") {
                view_counter = Some(stat.to_string());
            } else if country.is_none() && stat.len() < 40 && COUNTRY_LIKE.is_match(stat) {
                country = Some(stat.to_string());
            }
        }

        let mut links: Vec<(String, Option<String>)> = Vec::new();
        for anchor in self.links {
            let label = match anchor.label.trim() {
                "" => "Link".to_string(),
                l => l.to_string(),
            };
            // A label is taken once it has a usable URL.
            let href = anchor.href.filter(|h| !h.is_empty());
            match links.iter_mut().find(|(l, _)| *l == label) {
                Some((_, existing)) if existing.is_none() => *existing = href,
                Some(_) => {}
                None => links.push((label, href)),
            }
        }

        RawChannelInfo {
            active_from,
            view_counter,
            channel_description: self.description,
            country,
            subscriber_count_text: self.subscriber_count_text,
            links,
        }
    }
}

/// A video link found on a listing page.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct VideoLink {
    pub url: String,
    #[serde(default)]
    pub title: String,
}

/// Keep watch links only, first occurrence of each URL, at most `max`.
pub fn dedupe_links(links: Vec<VideoLink>, max: usize) -> Vec<VideoLink> {
    let mut unique: Vec<VideoLink> = Vec::new();
    for link in links {
        if unique.len() >= max {
            break;
        }
        if !link.url.contains("watch") || unique.iter().any(|u| u.url == link.url) {
            continue;
        }
        unique.push(link);
    }
    unique
}

/// Builds the scripts evaluated in the browser.
#[derive(Debug, Clone, Default)]
pub struct PageExtractor;

impl PageExtractor {
    pub fn new() -> Self {
        Self
    }

    pub fn video_page_script(&self) -> String {
        format!(
            r#"
            (() => {{
                {helpers}

                const likeButton = firstElement({like});
                let publishedAt = firstText({published});
                const publishedMeta = firstElement({published_meta});
                if (publishedMeta && publishedMeta.getAttribute('content')) {{
                    publishedAt = publishedMeta.getAttribute('content');
                }}

                return {{
                    title: firstText({title}) || document.title || null,
                    description: firstText({description}),
                    author: firstText({author}),
                    viewCountText: firstText({views}),
                    likeCountText: likeButton ? likeButton.textContent.trim() : null,
                    commentCountText: firstText({comments}),
                    publishedAt: publishedAt,
                    subscriberCountText: firstText({subscribers}),
                    profilePicture: firstAttr({avatar}, 'src'),
                }};
            }})()
            "#,
            helpers = Self::helpers(),
            like = js_array(LIKE_BUTTON_SELECTORS),
            published = js_array(PUBLISHED_SELECTORS),
            published_meta = js_array(PUBLISHED_META_SELECTORS),
            title = js_array(TITLE_SELECTORS),
            description = js_array(DESCRIPTION_SELECTORS),
            author = js_array(AUTHOR_SELECTORS),
            views = js_array(VIEW_COUNT_SELECTORS),
            comments = js_array(COMMENT_COUNT_SELECTORS),
            subscribers = js_array(SUBSCRIBER_SELECTORS),
            avatar = js_array(AVATAR_SELECTORS),
        )
    }

    pub fn channel_about_script(&self) -> String {
        format!(
            r#"
            (() => {{
                {helpers}

                const stats = Array.from(document.querySelectorAll({stats}))
                    .map((el) => el.textContent.trim());
                const links = Array.from(document.querySelectorAll({links}))
                    .map((a) => ({{ label: a.textContent.trim(), href: a.href || null }}));

                return {{
                    description: firstText({description}),
                    stats: stats,
                    links: links,
                    subscriberCountText: firstText({subscribers}),
                }};
            }})()
            "#,
            helpers = Self::helpers(),
            stats = js_string(CHANNEL_STATS_SELECTOR),
            links = js_string(CHANNEL_LINKS_SELECTOR),
            description = js_array(CHANNEL_DESCRIPTION_SELECTORS),
            subscribers = js_array(CHANNEL_SUBSCRIBER_SELECTORS),
        )
    }

    pub fn video_links_script(&self, selector: &str) -> String {
        format!(
            r#"
            Array.from(document.querySelectorAll({selector}))
                .map((a) => ({{ url: a.href, title: a.textContent.trim() }}))
                .filter((v) => v.url && v.url.includes('watch'))
            "#,
            selector = js_string(selector),
        )
    }

    pub fn scroll_script(&self, step: u32) -> String {
        format!("window.scrollBy(0, {step})")
    }

    fn helpers() -> &'static str {
        r#"
                const firstElement = (selectors) => {
                    for (const s of selectors) {
                        const el = document.querySelector(s);
                        if (el) return el;
                    }
                    return null;
                };
                const firstText = (selectors) => {
                    for (const s of selectors) {
                        const el = document.querySelector(s);
                        const text = el ? el.textContent.trim() : '';
                        if (text) return text;
                    }
                    return null;
                };
                const firstAttr = (selectors, attr) => {
                    for (const s of selectors) {
                        const el = document.querySelector(s);
                        const value = el ? el.getAttribute(attr) : null;
                        if (value) return value;
                    }
                    return null;
                };"#
    }
}

fn js_string(s: &str) -> String {
    format!("'{}'", s.replace('\\', "\\\\").replace('\'', "\\'"))
}

fn js_array(selectors: &[&str]) -> String {
    let items = selectors
        .iter()
        .map(|s| js_string(s))
        .collect::<Vec<_>>()
        .join(", ");
    format!("[{items}]")
}
