//! Engine configuration.

use crate::excerpt::{ExcerptOptions, DEFAULT_CONTEXT_CHARS, DEFAULT_FALLBACK_CHARS};
use crate::logging::{LogConfig, LogFormat, LogPreset};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Config {
    #[serde(default = "default_context_chars")]
    pub excerpt_context_chars: usize,
    #[serde(default = "default_fallback_chars")]
    pub excerpt_fallback_chars: usize,
    #[serde(default = "default_debounce_ms")]
    pub search_debounce_ms: u64,
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    #[serde(default)]
    pub logging: LoggingSection,
}

/// `[logging]` table.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct LoggingSection {
    #[serde(default)]
    pub preset: LogPreset,
    #[serde(default)]
    pub format: LogFormat,
    /// Entries like "query=debug" or "chatlens::session=trace".
    #[serde(default)]
    pub overrides: Vec<String>,
}

fn default_context_chars() -> usize {
    DEFAULT_CONTEXT_CHARS
}

fn default_fallback_chars() -> usize {
    DEFAULT_FALLBACK_CHARS
}

fn default_debounce_ms() -> u64 {
    300
}

fn default_page_size() -> usize {
    50
}

impl Default for Config {
    fn default() -> Self {
        Self {
            excerpt_context_chars: default_context_chars(),
            excerpt_fallback_chars: default_fallback_chars(),
            search_debounce_ms: default_debounce_ms(),
            page_size: default_page_size(),
            logging: LoggingSection::default(),
        }
    }
}

impl Config {
    /// Load config from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load config/chatlens.toml, then the per-user config file, or fall back to defaults.
    pub fn load() -> Result<Self> {
        let local = PathBuf::from("config/chatlens.toml");
        if local.exists() {
            return Self::load_from(&local);
        }

        if let Some(user) = Self::user_config_path() {
            if user.exists() {
                return Self::load_from(&user);
            }
        }

        Ok(Config::default())
    }

    /// `<config dir>/chatlens/config.toml` for the current user.
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("chatlens").join("config.toml"))
    }

    fn validate(&self) -> Result<()> {
        if self.page_size == 0 {
            anyhow::bail!("page_size must be at least 1");
        }
        Ok(())
    }

    pub fn excerpt_options(&self) -> ExcerptOptions {
        ExcerptOptions {
            context_chars: self.excerpt_context_chars,
            fallback_chars: self.excerpt_fallback_chars,
        }
    }

    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }

    pub fn log_config(&self) -> LogConfig {
        LogConfig::from_settings(
            self.logging.preset,
            self.logging.overrides.clone(),
            self.logging.format,
        )
    }
}
