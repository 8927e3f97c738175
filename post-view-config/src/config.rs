//! The `Config` struct, its sections, validation and YAML persistence.

use crate::defaults;
use crate::error::ConfigError;
use crate::types::LogLevel;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Settings for the remote content store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentConfig {
    /// Forum origin, e.g. `https://forum.example.com`
    #[serde(default = "defaults::base_url")]
    pub base_url: String,

    /// Global timeout for a single post request
    #[serde(default = "defaults::timeout_secs")]
    pub timeout_secs: u64,

    /// Upper bound on a response body
    #[serde(default = "defaults::max_response_bytes")]
    pub max_response_bytes: u64,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::base_url(),
            timeout_secs: defaults::timeout_secs(),
            max_response_bytes: defaults::max_response_bytes(),
        }
    }
}

/// User-visible strings emitted into generated markup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Labels {
    /// Title of the navigation link on a quote header
    #[serde(default = "defaults::follow_quote")]
    pub follow_quote: String,

    /// Title of the expand/collapse chevron
    #[serde(default = "defaults::expand_collapse")]
    pub expand_collapse: String,

    /// Placeholder shown while a quoted post is being fetched
    #[serde(default = "defaults::loading")]
    pub loading: String,

    /// Title of a link click-count badge
    #[serde(default = "defaults::clicks")]
    pub clicks: String,

    #[serde(default = "defaults::select")]
    pub select: String,

    /// `{count}` is substituted with the number of selected posts
    #[serde(default = "defaults::selected")]
    pub selected: String,
}

impl Default for Labels {
    fn default() -> Self {
        Self {
            follow_quote: defaults::follow_quote(),
            expand_collapse: defaults::expand_collapse(),
            loading: defaults::loading(),
            clicks: defaults::clicks(),
            select: defaults::select(),
            selected: defaults::selected(),
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Prefix for generated forum paths (`""` or `/forum`)
    #[serde(default = "defaults::base_path")]
    pub base_path: String,

    #[serde(default)]
    pub content: ContentConfig,

    #[serde(default)]
    pub labels: Labels,

    /// CSS class of the highlight span inside an expanded quote
    #[serde(default = "defaults::highlight_class")]
    pub highlight_class: String,

    #[serde(default)]
    pub log_level: LogLevel,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_path: defaults::base_path(),
            content: ContentConfig::default(),
            labels: Labels::default(),
            highlight_class: defaults::highlight_class(),
            log_level: LogLevel::default(),
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: set the forum path prefix
    pub fn with_base_path(mut self, base_path: impl Into<String>) -> Self {
        self.base_path = base_path.into();
        self
    }

    /// Builder: set the content store origin
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.content.base_url = base_url.into();
        self
    }

    /// Resolve a forum-relative path against `base_path`.
    ///
    /// `get_url("/t/via-quote/5/2")` with `base_path = "/forum"` yields
    /// `/forum/t/via-quote/5/2`.
    pub fn get_url(&self, path: &str) -> String {
        format!("{}{}", self.base_path.trim_end_matches('/'), path)
    }

    /// Check semantic constraints that serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.base_path.is_empty() && !self.base_path.starts_with('/') {
            return Err(ConfigError::Validation(format!(
                "base_path '{}' must be empty or start with '/'",
                self.base_path
            )));
        }
        if self.content.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "content.timeout_secs must be greater than zero".to_string(),
            ));
        }
        if self.content.max_response_bytes == 0 {
            return Err(ConfigError::Validation(
                "content.max_response_bytes must be greater than zero".to_string(),
            ));
        }
        let class = self.highlight_class.trim();
        if class.is_empty() || class.contains(char::is_whitespace) {
            return Err(ConfigError::Validation(format!(
                "highlight_class '{}' must be a single non-empty class name",
                self.highlight_class
            )));
        }
        Ok(())
    }

    /// Load configuration from the default path, creating it if missing.
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();
        log::info!("Config path: {:?}", config_path);
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            log::info!(
                "Config file not found, creating default at {:?}",
                config_path
            );
            let config = Self::default();
            if let Err(e) = config.save_to(&config_path) {
                log::error!("Failed to save default config: {}", e);
                return Err(e);
            }
            Ok(config)
        }
    }

    /// Load and validate configuration from an explicit path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(ConfigError::from)?;
        let config: Config = serde_yaml_ng::from_str(&contents).map_err(ConfigError::from)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to an explicit path.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(ConfigError::from)?;
        }

        let yaml = serde_yaml_ng::to_string(self).map_err(ConfigError::from)?;

        // Atomic save: write to temp file then rename to prevent corruption on crash
        let temp_path = path.with_extension("yaml.tmp");
        fs::write(&temp_path, &yaml).map_err(ConfigError::from)?;
        fs::rename(&temp_path, path).map_err(ConfigError::from)?;
        Ok(())
    }

    /// Get the configuration file path (XDG convention on every platform
    /// except Windows)
    pub fn config_path() -> PathBuf {
        Self::config_dir().join("config.yaml")
    }

    /// Get the configuration directory path
    pub fn config_dir() -> PathBuf {
        #[cfg(target_os = "windows")]
        {
            if let Some(config_dir) = dirs::config_dir() {
                config_dir.join("post-view")
            } else {
                PathBuf::from(".")
            }
        }
        #[cfg(not(target_os = "windows"))]
        {
            if let Some(home_dir) = dirs::home_dir() {
                home_dir.join(".config").join("post-view")
            } else {
                PathBuf::from(".")
            }
        }
    }
}
