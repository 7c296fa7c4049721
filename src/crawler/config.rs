use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the feed crawler and entry extractor
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Site origin; entry links and the feed path are resolved against it
    pub base_url: String,

    /// Path of the infinite-scroll listing (default: `/top/?t=month`)
    pub feed_path: String,

    /// Whether to run the browser in headless mode (default: true)
    pub headless: bool,

    pub window_width: u32,
    pub window_height: u32,

    /// Fallback height in pixels for a feed item that is not rendered yet (default: 600)
    pub avg_item_height: f64,

    /// How to wait for client-side rendering after a hover
    pub settle: SettlePolicy,

    /// chrono formats tried in order for the absolute post timestamp
    pub timestamp_formats: Vec<String>,

    /// User agent string to use
    pub user_agent: Option<String>,

    pub selectors: SelectorConfig,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.reddit.com".to_string(),
            feed_path: "/top/?t=month".to_string(),
            headless: true,
            window_width: 1920,
            window_height: 1080,
            avg_item_height: 600.0,
            settle: SettlePolicy::default(),
            timestamp_formats: vec![
                "%a, %b %d, %Y, %I:%M:%S %p".to_string(),
                "%a, %m/%d/%Y, %I:%M:%S %p".to_string(),
                "%B %d, %Y, %I:%M:%S %p".to_string(),
                "%Y-%m-%d %H:%M:%S".to_string(),
            ],
            user_agent: Some(
                "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 \
                 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36"
                    .to_string(),
            ),
            selectors: SelectorConfig::default(),
        }
    }
}

impl CrawlerConfig {
    /// Absolute URL of the feed listing
    pub fn feed_url(&self) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), self.feed_path)
    }
}

/// Wait-for-stable-render policy applied after triggering lazy rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum SettlePolicy {
    /// Sleep for a fixed delay
    Fixed { delay_ms: u64 },
    /// Poll until the stage's readiness element exists, giving up after `timeout_ms`
    Poll { interval_ms: u64, timeout_ms: u64 },
}

impl Default for SettlePolicy {
    fn default() -> Self {
        Self::Fixed { delay_ms: 500 }
    }
}

impl SettlePolicy {
    /// Upper bound on how long one settle can block
    pub fn max_wait(&self) -> Duration {
        match *self {
            Self::Fixed { delay_ms } => Duration::from_millis(delay_ms),
            Self::Poll { timeout_ms, .. } => Duration::from_millis(timeout_ms),
        }
    }
}

/// Markup hooks for the feed, entry page and author page.
///
/// Fields ending in `_pattern` are regular expressions matched against an
/// attribute value, everything else is a CSS selector.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectorConfig {
    pub post_container: String,
    pub post_link: String,
    /// Relative timestamp; hovering it renders the absolute one
    pub timestamp_trigger: String,
    pub timestamp: String,
    /// Elements carrying the category in their `title` attribute
    pub category: String,
    pub category_title_pattern: String,
    pub comments: String,
    pub upvote_percentage: String,
    pub rating: String,
    pub author_link: String,
    pub author_href_pattern: String,
    pub premium_username: String,
    pub default_username: String,
    /// First match holds aggregate karma, second the cake day
    pub karma_and_tenure: String,
    /// Tooltip listing post and comment karma
    pub separated_karma: String,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            post_container: ".Post".to_string(),
            post_link: "a[data-click-id=\"body\"]".to_string(),
            timestamp_trigger: "._3jOxDPIQ0KaOWpzvSQo-1s".to_string(),
            timestamp: ".u6HtAZu8_LKL721-EnKuR".to_string(),
            category: "[title]".to_string(),
            category_title_pattern: "r/.*".to_string(),
            comments: "[data-click-id=\"comments\"]".to_string(),
            upvote_percentage: ".t4Hq30BDzTeJ85vREX7_M".to_string(),
            rating: "._1rZYMD_4xY3gRcSS3p8ODO".to_string(),
            author_link: "a[href]".to_string(),
            author_href_pattern: "/user/.*".to_string(),
            premium_username: "._28nEhn86_R1ENZ59eAru8S".to_string(),
            default_username: "._1LCAhi_8JjayVo7pJ0KIh0".to_string(),
            karma_and_tenure: "span._1hNyZSklmcC7R_IfCUcXmZ".to_string(),
            separated_karma: "._3uK2I0hi3JFTKnMUFHD2Pd".to_string(),
        }
    }
}
