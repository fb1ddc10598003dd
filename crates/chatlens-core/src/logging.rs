//! Logging configuration and initialization.
//!
//! The library only emits `tracing` events under `chatlens::*` targets.
//! Hosts that want them printed call [`init`] once at startup:
//! - presets (production, verbose, debug, trace, quiet)
//! - per-target level overrides
//! - text or JSON output
//! - `RUST_LOG` takes precedence when set

use serde::Deserialize;
use std::collections::HashMap;
use tracing::Level;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            _ => Err(format!("Invalid log format: '{}'. Use 'text' or 'json'.", s)),
        }
    }
}

/// Logging preset levels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogPreset {
    /// Bulk-action results and failures only
    #[default]
    Production,
    /// Adds session refreshes and provider mutations
    Verbose,
    /// Adds per-query result counts
    Debug,
    Trace,
    /// Warnings and errors only
    Quiet,
}

/// Resolved logging configuration.
#[derive(Debug, Clone, Default)]
pub struct LogConfig {
    pub preset: LogPreset,
    /// Per-target level overrides (e.g., "chatlens::query" -> DEBUG)
    pub overrides: HashMap<String, Level>,
    pub format: LogFormat,
}

impl LogConfig {
    /// Build from a preset plus raw "target=level" override strings.
    ///
    /// Each string may hold several comma-separated pairs. Short targets are
    /// prefixed with `chatlens::`; unparseable levels are ignored.
    pub fn from_settings(preset: LogPreset, log_overrides: Vec<String>, format: LogFormat) -> Self {
        let mut overrides = HashMap::new();
        for override_str in log_overrides {
            for part in override_str.split(',') {
                if let Some((target, level_str)) = part.split_once('=') {
                    let target = target.trim();
                    let full_target = if target.starts_with("chatlens::") || target == "chatlens" {
                        target.to_string()
                    } else {
                        format!("chatlens::{}", target)
                    };

                    if let Some(level) = parse_level(level_str.trim()) {
                        overrides.insert(full_target, level);
                    }
                }
            }
        }

        Self {
            preset,
            overrides,
            format,
        }
    }

    /// Build an EnvFilter from this configuration.
    pub fn build_filter(&self) -> EnvFilter {
        if let Ok(env_filter) = EnvFilter::try_from_default_env() {
            return env_filter;
        }

        let mut directives: Vec<String> = match self.preset {
            LogPreset::Production => vec![
                "chatlens::selection=info".into(),
                "chatlens::session=warn".into(),
                "chatlens::provider=warn".into(),
                "chatlens::query=off".into(),
            ],
            LogPreset::Verbose => vec![
                "chatlens=info".into(),
                "chatlens::provider=debug".into(),
                "chatlens::query=off".into(),
            ],
            LogPreset::Debug => vec!["chatlens=debug".into()],
            LogPreset::Trace => vec!["chatlens=trace".into()],
            LogPreset::Quiet => vec!["chatlens=warn".into()],
        };

        for (target, level) in &self.overrides {
            directives.push(format!("{}={}", target, level_to_str(*level)));
        }

        let filter_str = directives.join(",");
        EnvFilter::try_new(&filter_str).unwrap_or_else(|_| EnvFilter::new("info"))
    }
}

/// Parse a level string (case-insensitive).
fn parse_level(s: &str) -> Option<Level> {
    match s.to_lowercase().as_str() {
        "trace" => Some(Level::TRACE),
        "debug" => Some(Level::DEBUG),
        "info" => Some(Level::INFO),
        "warn" | "warning" => Some(Level::WARN),
        "error" => Some(Level::ERROR),
        _ => None,
    }
}

fn level_to_str(level: Level) -> &'static str {
    match level {
        Level::TRACE => "trace",
        Level::DEBUG => "debug",
        Level::INFO => "info",
        Level::WARN => "warn",
        Level::ERROR => "error",
    }
}

/// Install the global tracing subscriber. Fails if one is already set.
pub fn init(config: &LogConfig) -> Result<(), tracing_subscriber::util::TryInitError> {
    let filter = config.build_filter();

    match config.format {
        LogFormat::Text => tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(true).with_thread_ids(false))
            .try_init(),
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_span_events(FmtSpan::CLOSE),
            )
            .try_init(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_format_from_str() {
        assert_eq!("text".parse::<LogFormat>().unwrap(), LogFormat::Text);
        assert_eq!("JSON".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert!("xml".parse::<LogFormat>().is_err());
    }

    #[test]
    fn test_overrides_parsing() {
        let config = LogConfig::from_settings(
            LogPreset::Production,
            vec!["query=debug".into(), "session=trace,selection=warning".into()],
            LogFormat::Text,
        );

        assert_eq!(config.overrides.get("chatlens::query"), Some(&Level::DEBUG));
        assert_eq!(config.overrides.get("chatlens::session"), Some(&Level::TRACE));
        assert_eq!(config.overrides.get("chatlens::selection"), Some(&Level::WARN));
    }

    #[test]
    fn test_full_target_passthrough_and_bad_level() {
        let config = LogConfig::from_settings(
            LogPreset::Quiet,
            vec!["chatlens::provider=info".into(), "query=loud".into()],
            LogFormat::Text,
        );

        assert_eq!(config.overrides.get("chatlens::provider"), Some(&Level::INFO));
        assert!(!config.overrides.contains_key("chatlens::query"));
    }

    #[test]
    fn test_preset_deserializes_lowercase() {
        #[derive(Deserialize)]
        struct Wrapper {
            preset: LogPreset,
        }
        let w: Wrapper = toml::from_str("preset = \"verbose\"").unwrap();
        assert_eq!(w.preset, LogPreset::Verbose);
    }
}
