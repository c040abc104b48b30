//! Configuration for sitefeed.
//!
//! Configuration is read from `~/.config/sitefeed/sites.toml` unless a path is
//! given explicitly. If the default file doesn't exist, one with commented
//! example sites is created.

pub mod site;

pub use site::{SiteConfig, SiteRegistry, SCOPE};

use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::cache::DEFAULT_TTL;
use crate::scheduler::{format_interval, parse_interval};

/// Main configuration struct.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub cache: CacheSettings,
    pub fetch: FetchSettings,
    pub sites: BTreeMap<String, SiteConfig>,
}

/// Settings for the refresh cache.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    /// How long a feed stays fresh, e.g. "10m". Also the sweep interval.
    pub ttl: String,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            ttl: format_interval(DEFAULT_TTL),
        }
    }
}

impl CacheSettings {
    pub fn ttl(&self) -> Result<Duration, ConfigError> {
        parse_interval(&self.ttl).map_err(|reason| ConfigError::Invalid {
            site: "[cache]".into(),
            reason,
        })
    }
}

/// Settings for the HTTP fetcher.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FetchSettings {
    /// Request timeout in seconds (default: 30)
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            user_agent: concat!("sitefeed/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl FetchSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Config {
    /// Load configuration from `path`, or from the default path when `None`.
    ///
    /// A missing default file is created with example content. A missing
    /// explicit file is an error.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => {
                let default_path = Self::default_config_path()?;
                if !default_path.exists() {
                    Self::create_default_config(&default_path)?;
                }
                default_path
            }
        };

        let content = fs::read_to_string(&config_path).map_err(|e| ConfigError::Io {
            path: config_path.clone(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: config_path,
            source: e,
        })
    }

    /// Get the default config file path: `~/.config/sitefeed/sites.toml`
    pub fn default_config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir.join("sitefeed").join("sites.toml"))
    }

    /// Validate the `[sites]` tables into a registry.
    pub fn registry(&self) -> Result<SiteRegistry, ConfigError> {
        SiteRegistry::new(self.sites.clone())
    }

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

    fn default_config_content() -> &'static str {
        r##"# sitefeed configuration
#
# Each [sites.<id>] table turns one HTML page into an RSS feed.
#
# item_selector picks one element per article. All other selectors are
# evaluated *inside* that element; ":scope" means the element itself.
# title_selector and link_selector are required. Without description_selector
# or date_selector those fields stay empty.
# Links that don't start with http:// or https:// are appended verbatim to
# base_url (default: url), so mind the trailing slash.
# date_format uses strftime syntax, e.g. "%Y-%m-%d" or "%d %b %Y %H:%M".

[cache]
# Feeds are fresh for this long and every site is refreshed on this interval.
# Accepts "30s", "10m", "1h", "1d" or plain seconds.
ttl = "10m"

[fetch]
# Request timeout in seconds
timeout_secs = 30

[sites.example]
name = "Example"
url = "https://example.com"
item_selector = "article"
title_selector = "h2"
link_selector = "a"
description_selector = "p.summary"
date_selector = "time"
date_format = "%Y-%m-%d"

[sites.abc]
name = "ABC"
url = "https://www.abc.com/"
item_selector = ".content article"
title_selector = "header a"
link_selector = "header a"
description_selector = "p.note"
date_selector = "div.meta time"
date_format = "%Y-%m-%d"
"##
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

    #[error("Invalid configuration for {site}: {reason}")]
    Invalid { site: String, reason: String },
}
