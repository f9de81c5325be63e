use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("Invalid log filter '{0}': {1}")]
    InvalidFilter(String, String),

    #[error("Failed to install subscriber: {0}")]
    InitError(String),
}

/// 日志配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive, e.g. `info` or `pulse_plugin=debug,wasm_plugin=info`.
    pub level: String,
    /// Emit JSON lines instead of the human-readable format.
    pub json: bool,
    /// Where plugin log lines go.
    pub sink: SinkKind,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            sink: SinkKind::Tracing,
        }
    }
}

/// 插件日志的去向
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SinkKind {
    /// Forward to `tracing` (see [`TracingSink`](crate::TracingSink)).
    #[default]
    Tracing,
    /// Keep the latest `runtime.log_buffer_size` entries in memory
    /// (see [`BufferSink`](crate::BufferSink)).
    Buffer,
}

/// Installs the global subscriber.
///
/// `RUST_LOG` wins over the configured level when it is set.
pub fn init_logging(config: &LoggingConfig) -> Result<(), LoggingError> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.level)
            .map_err(|e| LoggingError::InvalidFilter(config.level.clone(), e.to_string()))?,
    };

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    let result = if config.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };

    result.map_err(|e| LoggingError::InitError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = LoggingConfig::default();
        assert_eq!(config.level, "info");
        assert!(!config.json);
        assert_eq!(config.sink, SinkKind::Tracing);
    }

    #[test]
    fn test_sink_kind_is_lowercase() {
        let config: LoggingConfig = serde_json::from_str(r#"{"sink": "buffer"}"#).unwrap();
        assert_eq!(config.sink, SinkKind::Buffer);
        assert_eq!(config.level, "info");
    }

    #[test]
    fn test_second_init_fails_cleanly() {
        let config = LoggingConfig::default();
        let _ = init_logging(&config);
        assert!(matches!(init_logging(&config), Err(LoggingError::InitError(_))));
    }
}
