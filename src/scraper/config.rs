use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Browser tuning for page loads, idle detection and scrolling
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserSettings {
    /// Page navigation timeout in seconds (default: 60)
    pub navigation_timeout_secs: u64,

    /// Upper bound on the network-idle wait in milliseconds (default: 8000)
    pub idle_timeout_ms: u64,

    /// In-flight request count at or below which the network counts as idle (default: 2)
    pub max_inflight_requests: usize,

    /// Extra wait after a watch or about page settles, in milliseconds (default: 2000)
    pub settle_delay_ms: u64,

    /// Scroll steps on listing pages to trigger lazy loading (default: 15)
    pub max_scrolls: usize,

    /// Pixels per scroll step (default: 1000)
    pub scroll_step: u32,

    /// Pause between scroll steps in milliseconds (default: 500)
    pub scroll_delay_ms: u64,

    /// Browser window size
    pub window_width: u32,
    pub window_height: u32,

    /// User agent string to use
    pub user_agent: String,
}

impl Default for BrowserSettings {
    fn default() -> Self {
        Self {
            navigation_timeout_secs: 60,
            idle_timeout_ms: 8000,
            max_inflight_requests: 2,
            settle_delay_ms: 2000,
            max_scrolls: 15,
            scroll_step: 1000,
            scroll_delay_ms: 500,
            window_width: 1366,
            window_height: 768,
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                         (KHTML, like Gecko) Chrome/119.0.0.0 Safari/537.36"
                .to_string(),
        }
    }
}

impl BrowserSettings {
    pub fn navigation_timeout(&self) -> Duration {
        Duration::from_secs(self.navigation_timeout_secs)
    }

    pub fn idle_timeout(&self) -> Duration {
        Duration::from_millis(self.idle_timeout_ms)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    pub fn scroll_delay(&self) -> Duration {
        Duration::from_millis(self.scroll_delay_ms)
    }
}

/// Browser settings from an input file, where only the keys present override.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct PartialBrowserSettings {
    pub navigation_timeout_secs: Option<u64>,
    pub idle_timeout_ms: Option<u64>,
    pub max_inflight_requests: Option<usize>,
    pub settle_delay_ms: Option<u64>,
    pub max_scrolls: Option<usize>,
    pub scroll_step: Option<u32>,
    pub scroll_delay_ms: Option<u64>,
    pub window_width: Option<u32>,
    pub window_height: Option<u32>,
    pub user_agent: Option<String>,
}

impl BrowserSettings {
    /// Overlay the keys set in `layer`.
    pub fn merge(mut self, layer: PartialBrowserSettings) -> Self {
        fn set<T>(field: &mut T, value: Option<T>) {
            if let Some(value) = value {
                *field = value;
            }
        }

        set(&mut self.navigation_timeout_secs, layer.navigation_timeout_secs);
        set(&mut self.idle_timeout_ms, layer.idle_timeout_ms);
        set(&mut self.max_inflight_requests, layer.max_inflight_requests);
        set(&mut self.settle_delay_ms, layer.settle_delay_ms);
        set(&mut self.max_scrolls, layer.max_scrolls);
        set(&mut self.scroll_step, layer.scroll_step);
        set(&mut self.scroll_delay_ms, layer.scroll_delay_ms);
        set(&mut self.window_width, layer.window_width);
        set(&mut self.window_height, layer.window_height);
        set(&mut self.user_agent, layer.user_agent);
        self
    }
}
