//! Tracing setup for eventstrip.
//!
//! Provides unified logging configuration for hosts embedding the widget.
//!
//! # Usage
//!
//! For a status-bar host:
//! ```ignore
//! use eventstrip_core::tracing::{init_tracing, TracingConfig};
//!
//! init_tracing(TracingConfig::embedded())?;
//! ```
//!
//! For development with full detail:
//! ```ignore
//! use eventstrip_core::tracing::{init_tracing, TracingConfig};
//!
//! init_tracing(TracingConfig::debug())?;
//! ```

use thiserror::Error;
use tracing::Level;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Errors from [`init_tracing`].
#[derive(Debug, Error)]
pub enum TracingError {
    /// A global subscriber was already installed.
    #[error("failed to set global tracing subscriber: {0}")]
    SetGlobalSubscriber(#[from] tracing::subscriber::SetGlobalDefaultError),

    /// The env filter directive did not parse.
    #[error("failed to parse env filter: {0}")]
    EnvFilter(#[from] tracing_subscriber::filter::ParseError),
}

/// How log lines are rendered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TracingOutputFormat {
    /// Single-line format for a host's stderr (default).
    #[default]
    Compact,
    /// JSON format for log collectors.
    Json,
}

/// Configuration for tracing initialization.
#[derive(Debug, Clone)]
pub struct TracingConfig {
    /// Level applied when `RUST_LOG` is absent.
    pub default_level: Level,
    /// Rendering of log lines.
    pub output_format: TracingOutputFormat,
    /// Include file and line number fields.
    pub include_location: bool,
    /// Include the module path of the log site.
    pub include_target: bool,
    /// Include a timestamp per line.
    pub include_timestamp: bool,
    /// Full filter directive; when set, `default_level` is ignored.
    pub env_filter: Option<String>,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            default_level: Level::INFO,
            output_format: TracingOutputFormat::Compact,
            include_location: false,
            include_target: true,
            include_timestamp: true,
            env_filter: None,
        }
    }
}

impl TracingConfig {
    /// Create a config suitable for a widget embedded in a host strip.
    ///
    /// Compact and timestamp-free: the host surface has its own clock and
    /// the logs land on the host's stderr.
    #[must_use]
    pub fn embedded() -> Self {
        Self {
            default_level: Level::WARN,
            include_target: false,
            include_timestamp: false,
            ..Self::default()
        }
    }

    /// Create a config suitable for development.
    #[must_use]
    pub fn debug() -> Self {
        Self {
            default_level: Level::DEBUG,
            include_location: true,
            ..Self::default()
        }
    }

    /// Set the default log level.
    #[must_use]
    pub fn with_level(mut self, level: Level) -> Self {
        self.default_level = level;
        self
    }

    /// Set the output format.
    #[must_use]
    pub fn with_format(mut self, format: TracingOutputFormat) -> Self {
        self.output_format = format;
        self
    }

    /// Set a full env filter directive.
    #[must_use]
    pub fn with_env_filter(mut self, filter: impl Into<String>) -> Self {
        self.env_filter = Some(filter.into());
        self
    }
}

/// Initialize tracing with the given configuration.
///
/// This should be called once by the host application. The `RUST_LOG`
/// environment variable overrides the configured default level.
///
/// # Errors
///
/// Returns an error if the global subscriber has already been set or if
/// the env filter directive is invalid.
pub fn init_tracing(config: TracingConfig) -> Result<(), TracingError> {
    let env_filter = if let Some(ref filter) = config.env_filter {
        EnvFilter::try_new(filter)?
    } else {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(format!("eventstrip={}", config.default_level)))
    };

    let base = fmt::layer()
        .with_file(config.include_location)
        .with_line_number(config.include_location)
        .with_target(config.include_target);

    // The formatters are distinct types, so each arm boxes its own.
    let layer = match config.output_format {
        TracingOutputFormat::Compact => {
            let layer = base.compact();
            if config.include_timestamp {
                layer.boxed()
            } else {
                layer.without_time().boxed()
            }
        }
        TracingOutputFormat::Json => {
            let layer = base.json();
            if config.include_timestamp {
                layer.boxed()
            } else {
                layer.without_time().boxed()
            }
        }
    };

    let subscriber = tracing_subscriber::registry().with(env_filter).with(layer);
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = TracingConfig::default();
        assert_eq!(config.default_level, Level::INFO);
        assert_eq!(config.output_format, TracingOutputFormat::Compact);
        assert!(!config.include_location);
        assert!(config.include_target);
        assert!(config.include_timestamp);
        assert!(config.env_filter.is_none());
    }

    #[test]
    fn embedded_config() {
        let config = TracingConfig::embedded();
        assert_eq!(config.default_level, Level::WARN);
        assert!(!config.include_target);
        assert!(!config.include_timestamp);
    }

    #[test]
    fn debug_config() {
        let config = TracingConfig::debug();
        assert_eq!(config.default_level, Level::DEBUG);
        assert!(config.include_location);
    }

    #[test]
    fn builder_methods() {
        let config = TracingConfig::default()
            .with_level(Level::TRACE)
            .with_format(TracingOutputFormat::Json)
            .with_env_filter("eventstrip=trace");

        assert_eq!(config.default_level, Level::TRACE);
        assert_eq!(config.output_format, TracingOutputFormat::Json);
        assert_eq!(config.env_filter, Some("eventstrip=trace".to_string()));
    }
}
