use std::sync::Arc;

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::network::{
    EventLoadingFailed, EventLoadingFinished, EventRequestWillBeSent,
};
use chromiumoxide::cdp::js_protocol::runtime::{ConsoleApiCalledType, EventConsoleApiCalled};
use chromiumoxide::Page;
use futures::StreamExt;
use serde::de::DeserializeOwned;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};
use url::Url;

use crate::app::{Result, ScraperError};
use crate::config::{ScrapeConfig, ScrapeMode};
use crate::domain::{RawChannelInfo, RawRecord, Video};
use crate::fetcher::TranscriptFetcher;
use crate::normalizer::Normalizer;
use crate::scraper::config::BrowserSettings;
use crate::scraper::extractor::{
    dedupe_links, ChannelAboutData, PageExtractor, VideoLink, VideoPageData,
    CHANNEL_VIDEO_LINK_SELECTOR, SEARCH_VIDEO_LINK_SELECTOR,
};
use crate::scraper::video_id::{cover_image_url, extract_video_id};
use crate::scraper::Scraper;

const SEARCH_URL: &str = "https://www.youtube.com/results";

/// YouTube scraper driving headless Chrome via chromiumoxide
pub struct ChromeScraper {
    browser: Browser,
    handler: JoinHandle<()>,
    settings: BrowserSettings,
    extractor: PageExtractor,
    transcripts: Arc<dyn TranscriptFetcher + Send + Sync>,
    normalizer: Normalizer,
}

impl ChromeScraper {
    /// Launch a browser for a scrape run
    pub async fn launch(
        headless: bool,
        settings: BrowserSettings,
        transcripts: Arc<dyn TranscriptFetcher + Send + Sync>,
        normalizer: Normalizer,
    ) -> Result<Self> {
        let mut builder = BrowserConfig::builder()
            .arg("--no-sandbox")
            .arg("--disable-setuid-sandbox")
            .window_size(settings.window_width, settings.window_height)
            .request_timeout(settings.navigation_timeout());

        if !headless {
            builder = builder.with_head();
        }

        let browser_config = builder.build().map_err(|e| {
            ScraperError::BrowserLaunch(format!("Failed to build browser config: {}", e))
        })?;

        let (browser, mut handler) = Browser::launch(browser_config).await.map_err(|e| {
            ScraperError::BrowserLaunch(format!(
                "{}. Is Chrome or Chromium installed and in PATH?",
                e
            ))
        })?;

        // Drive the CDP connection
        let handler = tokio::spawn(async move {
            while let Some(_event) = handler.next().await {}
        });

        info!("Browser started (headless={})", headless);

        Ok(Self {
            browser,
            handler,
            settings,
            extractor: PageExtractor::new(),
            transcripts,
            normalizer,
        })
    }

    /// Close the browser and stop its event handler
    pub async fn close(mut self) {
        if let Err(e) = self.browser.close().await {
            warn!("Failed to close browser: {}", e);
        }
        let _ = self.browser.wait().await;
        self.handler.abort();
    }

    /// Open a blank page with the configured user agent
    async fn open_page(&self) -> Result<Page> {
        let page = self
            .browser
            .new_page("about:blank")
            .await
            .map_err(|e| ScraperError::PageCreation(e.to_string()))?;

        page.set_user_agent(&self.settings.user_agent)
            .await
            .map_err(|e| ScraperError::PageCreation(format!("Failed to set user agent: {}", e)))?;

        forward_console(&page).await;

        Ok(page)
    }

    /// Navigate and wait until the network is roughly idle
    async fn navigate(&self, page: &Page, url: &str) -> Result<()> {
        let timeout = self.settings.navigation_timeout();

        tokio::time::timeout(timeout, async {
            page.goto(url).await?;
            page.wait_for_navigation().await?;
            Ok::<_, chromiumoxide::error::CdpError>(())
        })
        .await
        .map_err(|_| ScraperError::Navigation(format!("Timed out after {:?} loading {}", timeout, url)))?
        .map_err(|e| ScraperError::Navigation(format!("{}: {}", url, e)))?;

        self.wait_for_network_idle(page).await;
        Ok(())
    }

    /// Wait until a request settles with few enough still in flight, bounded
    /// by the idle timeout. Never fails.
    async fn wait_for_network_idle(&self, page: &Page) {
        let listeners = futures::try_join!(
            page.event_listener::<EventRequestWillBeSent>(),
            page.event_listener::<EventLoadingFinished>(),
            page.event_listener::<EventLoadingFailed>(),
        );

        let (mut started, finished, failed) = match listeners {
            Ok(streams) => streams,
            Err(e) => {
                warn!("Network listeners unavailable, skipping idle wait: {}", e);
                return;
            }
        };

        let mut settled = futures::stream::select(finished.map(|_| ()), failed.map(|_| ()));
        let max_inflight = self.settings.max_inflight_requests as i64;

        let idle = async {
            let mut inflight: i64 = 0;
            loop {
                tokio::select! {
                    Some(_) = started.next() => inflight += 1,
                    Some(_) = settled.next() => {
                        inflight -= 1;
                        if inflight <= max_inflight {
                            break;
                        }
                    }
                    else => break,
                }
            }
        };

        let _ = tokio::time::timeout(self.settings.idle_timeout(), idle).await;
    }

    /// Scroll down repeatedly to trigger lazy loading
    async fn auto_scroll(&self, page: &Page) {
        let script = self.extractor.scroll_script(self.settings.scroll_step);
        for _ in 0..self.settings.max_scrolls {
            if let Err(e) = page.evaluate(script.clone()).await {
                warn!("autoScroll error (non-fatal): {}", e);
                return;
            }
            tokio::time::sleep(self.settings.scroll_delay()).await;
        }
    }

    /// Load a listing page, scroll it and collect unique watch links
    async fn collect_video_links(
        &self,
        url: &str,
        selector: &str,
        max: usize,
    ) -> Result<Vec<VideoLink>> {
        let page = self.open_page().await?;

        let result = async {
            self.navigate(&page, url).await?;
            self.auto_scroll(&page).await;
            evaluate::<Vec<VideoLink>>(&page, self.extractor.video_links_script(selector)).await
        }
        .await;

        close_page(page).await;
        Ok(dedupe_links(result?, max))
    }

    pub async fn channel_video_links(&self, channel_url: &str, max: usize) -> Result<Vec<VideoLink>> {
        let videos_url = format!("{}/videos", channel_url.trim_end_matches('/'));
        info!("Loading channel videos page: {}", videos_url);
        self.collect_video_links(&videos_url, CHANNEL_VIDEO_LINK_SELECTOR, max)
            .await
    }

    pub async fn search_video_links(&self, keyword: &str, max: usize) -> Result<Vec<VideoLink>> {
        let search_url = Url::parse_with_params(SEARCH_URL, &[("search_query", keyword)])?;
        info!("Loading search results page: {}", search_url);
        self.collect_video_links(search_url.as_str(), SEARCH_VIDEO_LINK_SELECTOR, max)
            .await
    }

    /// Scrape the channel "About" tab. Failures are logged and yield `None`.
    pub async fn channel_info(&self, channel_url: &str) -> Option<RawChannelInfo> {
        let about_url = format!("{}/about", channel_url.trim_end_matches('/'));
        info!("Scraping channel info: {}", about_url);

        match self.read_channel_about(&about_url).await {
            Ok(about) => Some(about.into_channel_info()),
            Err(e) => {
                warn!("Failed to scrape channel info: {}", e);
                None
            }
        }
    }

    async fn read_channel_about(&self, about_url: &str) -> Result<ChannelAboutData> {
        let page = self.open_page().await?;

        let result = async {
            self.navigate(&page, about_url).await?;
            tokio::time::sleep(self.settings.settle_delay()).await;
            evaluate::<ChannelAboutData>(&page, self.extractor.channel_about_script()).await
        }
        .await;

        close_page(page).await;
        result
    }

    /// Scrape one watch page into a raw record
    pub async fn video_record(
        &self,
        video_url: &str,
        config: &ScrapeConfig,
        channel_info: Option<&RawChannelInfo>,
    ) -> Result<RawRecord> {
        info!("Scraping video: {}", video_url);
        let page = self.open_page().await?;

        let result = async {
            self.navigate(&page, video_url).await?;
            tokio::time::sleep(self.settings.settle_delay()).await;
            evaluate::<VideoPageData>(&page, self.extractor.video_page_script()).await
        }
        .await;

        close_page(page).await;
        let data = result?;

        let id = extract_video_id(video_url);
        let cover_image = id.as_deref().map(cover_image_url);

        let transcript = match (&id, config.include_transcript) {
            (Some(id), true) => self.fetch_transcript(id, &config.language).await,
            _ => None,
        };

        Ok(data.into_raw_record(video_url, id, cover_image, transcript, channel_info.cloned()))
    }

    async fn fetch_transcript(&self, video_id: &str, language: &str) -> Option<String> {
        match self.transcripts.fetch(video_id, language).await {
            Ok(transcript) => transcript,
            Err(e) => {
                warn!("Failed to fetch transcript for video {}: {}", video_id, e);
                None
            }
        }
    }

    /// Scrape and normalize each link in order, skipping videos that fail
    async fn scrape_links(
        &self,
        links: &[VideoLink],
        config: &ScrapeConfig,
        channel_info: Option<&RawChannelInfo>,
    ) -> Vec<Video> {
        let mut videos = Vec::with_capacity(links.len());

        for link in links {
            let result = self
                .video_record(&link.url, config, channel_info)
                .await
                .and_then(|mut raw| {
                    raw.amount_of_videos = Some(links.len() as u64);
                    self.normalizer.normalize(raw)
                });

            match result {
                Ok(video) => videos.push(video),
                Err(e) => warn!("Skipping video {}: {} - {}", link.url, e.code(), e),
            }
        }

        videos
    }

    async fn scrape_by_channel(&self, config: &ScrapeConfig) -> Result<Vec<Video>> {
        let channel_url = config
            .channel_url
            .as_deref()
            .ok_or(ScraperError::MissingChannelUrl)?;

        let (links, channel_info) = tokio::join!(
            self.channel_video_links(channel_url, config.max_videos),
            self.channel_info(channel_url),
        );
        let links = links?;

        info!("Found {} video links for channel.", links.len());
        Ok(self.scrape_links(&links, config, channel_info.as_ref()).await)
    }

    async fn scrape_by_keyword(&self, config: &ScrapeConfig) -> Result<Vec<Video>> {
        let keyword = config
            .keyword
            .as_deref()
            .ok_or(ScraperError::MissingKeyword)?;

        let links = self.search_video_links(keyword, config.max_videos).await?;

        info!("Found {} video links for keyword search.", links.len());
        Ok(self.scrape_links(&links, config, None).await)
    }
}

#[async_trait]
impl Scraper for ChromeScraper {
    async fn scrape(&self, config: &ScrapeConfig) -> Result<Vec<Video>> {
        match config.mode {
            ScrapeMode::Channel => self.scrape_by_channel(config).await,
            ScrapeMode::Keyword => self.scrape_by_keyword(config).await,
        }
    }
}

async fn evaluate<T: DeserializeOwned>(page: &Page, script: String) -> Result<T> {
    page.evaluate(script)
        .await
        .map_err(|e| ScraperError::Script(e.to_string()))?
        .into_value()
        .map_err(|e| ScraperError::Script(format!("Failed to parse result: {:?}", e)))
}

async fn close_page(page: Page) {
    if let Err(e) = page.close().await {
        warn!("Failed to close page: {}", e);
    }
}

/// Mirror page console warnings and errors into our logs
async fn forward_console(page: &Page) {
    let mut events = match page.event_listener::<EventConsoleApiCalled>().await {
        Ok(events) => events,
        Err(e) => {
            warn!("Failed to attach console listener: {}", e);
            return;
        }
    };

    tokio::spawn(async move {
        while let Some(event) = events.next().await {
            let text = event
                .args
                .iter()
                .filter_map(|arg| arg.value.as_ref())
                .map(|v| v.as_str().map(str::to_string).unwrap_or_else(|| v.to_string()))
                .collect::<Vec<_>>()
                .join(" ");

            match event.r#type {
                ConsoleApiCalledType::Warning => warn!("Page console warning: {}", text),
                ConsoleApiCalledType::Error => error!("Page console error: {}", text),
                _ => {}
            }
        }
    });
}
