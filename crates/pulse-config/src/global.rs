use pulse_logging::LoggingConfig;
use pulse_types::{SignalIndex, SignalValue};
use serde::{Deserialize, Serialize};

/// 宿主全局配置
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct HostConfig {
    pub runtime: RuntimeConfig,
    pub logging: LoggingConfig,
    pub registry: RegistryConfig,
}

/// 运行时配置
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Longest guest log line kept, in bytes. Longer lines are truncated.
    pub max_log_len: usize,
    /// Entries kept when `logging.sink = "buffer"`.
    pub log_buffer_size: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            max_log_len: 4096,
            log_buffer_size: 1024,
        }
    }
}

/// 信号表初始值
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct RegistryConfig {
    pub signals: Vec<SignalSeed>,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct SignalSeed {
    pub index: SignalIndex,
    pub value: SignalValue,
}

impl RegistryConfig {
    pub fn seeds(&self) -> impl Iterator<Item = (SignalIndex, SignalValue)> + '_ {
        self.signals.iter().map(|s| (s.index, s.value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_host_config() {
        let config = HostConfig::default();
        assert_eq!(config.runtime.max_log_len, 4096);
        assert_eq!(config.logging.level, "info");
        assert!(config.registry.signals.is_empty());
    }
}
