//! Configuration management for scrollharvest.
//!
//! Settings live in `~/.config/scrollharvest/config.toml` (or the `--config`
//! path). A commented file with every default is written on first run.

use crate::crawler::CrawlerConfig;
use crate::store::http::DEFAULT_SINK_URL;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Crawler and sink settings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub crawler: CrawlerConfig,
    pub sink: SinkConfig,
}

/// Where harvested entries are submitted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SinkKind {
    /// POST to a storage service
    #[default]
    Http,
    /// Local SQLite database
    Sqlite,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SinkConfig {
    pub kind: SinkKind,

    /// Endpoint for the `http` sink
    pub url: String,

    /// Database file for the `sqlite` sink (default: data dir)
    pub database: Option<PathBuf>,
}

impl Default for SinkConfig {
    fn default() -> Self {
        Self {
            kind: SinkKind::Http,
            url: DEFAULT_SINK_URL.to_string(),
            database: None,
        }
    }
}

impl Config {
    /// Load configuration from `config_path`, creating it when missing.
    ///
    /// Absent keys take their defaults; a malformed file is an error.
    pub fn load_from(config_path: &Path) -> Result<Self, ConfigError> {
        if !config_path.exists() {
            Self::create_default_config(config_path)?;
            return Ok(Self::default());
        }

        let content = fs::read_to_string(config_path).map_err(|e| ConfigError::Io {
            path: config_path.to_path_buf(),
            source: e,
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: config_path.to_path_buf(),
            source: e,
        })?;

        Ok(config)
    }

    /// Get the default config file path: `~/.config/scrollharvest/config.toml`
    pub fn default_config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir.join("scrollharvest").join("config.toml"))
    }

    /// Write the commented defaults to `path`, creating parent directories.
    fn create_default_config(path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let mut file = fs::File::create(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        file.write_all(Self::default_config_content().as_bytes())
            .map_err(|e| ConfigError::Io {
                path: path.to_path_buf(),
                source: e,
            })?;

        Ok(())
    }

    fn default_config_content() -> String {
        r##"# scrollharvest configuration
#
# Selectors are CSS selectors unless the key ends in `_pattern`,
# in which case they are regular expressions matched against an attribute.

[crawler]
base_url = "https://www.reddit.com"
feed_path = "/top/?t=month"

# Run browser in headless mode (no visible window)
headless = true
window_width = 1920
window_height = 1080

# Height in pixels assumed for feed items that are not rendered yet
avg_item_height = 600.0

# Timestamp formats tried in order (chrono syntax); RFC 3339 always works
timestamp_formats = [
    "%a, %b %d, %Y, %I:%M:%S %p",
    "%a, %m/%d/%Y, %I:%M:%S %p",
    "%B %d, %Y, %I:%M:%S %p",
    "%Y-%m-%d %H:%M:%S",
]

# Wait after hovering an element that renders lazily.
# Either a fixed delay:
#   strategy = "fixed", delay_ms = 500
# or polling for the element that should appear:
#   strategy = "poll", interval_ms = 50, timeout_ms = 2000
[crawler.settle]
strategy = "fixed"
delay_ms = 500

[crawler.selectors]
post_container = ".Post"
post_link = 'a[data-click-id="body"]'
timestamp_trigger = "._3jOxDPIQ0KaOWpzvSQo-1s"
timestamp = ".u6HtAZu8_LKL721-EnKuR"
category = "[title]"
category_title_pattern = "r/.*"
comments = '[data-click-id="comments"]'
upvote_percentage = ".t4Hq30BDzTeJ85vREX7_M"
rating = "._1rZYMD_4xY3gRcSS3p8ODO"
author_link = "a[href]"
author_href_pattern = "/user/.*"
premium_username = "._28nEhn86_R1ENZ59eAru8S"
default_username = "._1LCAhi_8JjayVo7pJ0KIh0"
karma_and_tenure = "span._1hNyZSklmcC7R_IfCUcXmZ"
separated_karma = "._3uK2I0hi3JFTKnMUFHD2Pd"

[sink]
# "http" posts entries to a storage service, "sqlite" writes a local database
kind = "http"
url = "http://localhost:8087/posts"
# database = "/path/to/entries.db"
"##
        .to_string()
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("Failed to read/write config file at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}
