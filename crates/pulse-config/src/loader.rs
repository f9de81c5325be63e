use anyhow::{anyhow, Result};
use config::{Config, File, FileFormat};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::HostConfig;

pub const CONFIG_FILE_NAME: &str = "pulse.toml";

/// 配置加载器
pub struct ConfigLoader {
    config_dir: PathBuf,
}

impl ConfigLoader {
    /// 创建配置加载器
    pub fn new<P: AsRef<Path>>(config_dir: P) -> Self {
        Self {
            config_dir: config_dir.as_ref().to_path_buf(),
        }
    }

    /// 加载宿主配置
    pub fn load(&self) -> Result<HostConfig> {
        let config_path = self.config_dir.join(CONFIG_FILE_NAME);

        if !config_path.exists() {
            // 如果配置文件不存在，返回默认配置
            return Ok(HostConfig::default());
        }

        let config = Config::builder()
            .add_source(File::new(
                config_path.to_str().ok_or_else(|| anyhow!("Invalid config path"))?,
                FileFormat::Toml,
            ))
            .build()?;

        Ok(config.try_deserialize()?)
    }

    /// 加载并验证
    pub fn load_validated(&self) -> Result<HostConfig> {
        let config = self.load()?;
        Self::validate(&config)?;
        Ok(config)
    }

    /// 验证配置
    pub fn validate(config: &HostConfig) -> Result<()> {
        if config.runtime.max_log_len == 0 {
            return Err(anyhow!("max_log_len must be greater than 0"));
        }

        if config.runtime.log_buffer_size == 0 {
            return Err(anyhow!("log_buffer_size must be greater than 0"));
        }

        let mut seen = HashSet::new();
        for seed in &config.registry.signals {
            if !seen.insert(seed.index) {
                return Err(anyhow!("signal {} is seeded more than once", seed.index));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pulse_logging::SinkKind;
    use pulse_types::SignalIndex;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_load_default_config() {
        let temp_dir = tempdir().unwrap();
        let loader = ConfigLoader::new(temp_dir.path());

        let config = loader.load().unwrap();
        assert_eq!(config.runtime.max_log_len, 4096);
    }

    #[test]
    fn test_load_config_from_file() {
        let temp_dir = tempdir().unwrap();
        let config_content = r#"
[runtime]
max_log_len = 256

[logging]
level = "debug"
json = true
sink = "buffer"

[[registry.signals]]
index = 0
value = 32.0

[[registry.signals]]
index = 1
value = 24.0
"#;

        fs::write(temp_dir.path().join(CONFIG_FILE_NAME), config_content).unwrap();

        let loader = ConfigLoader::new(temp_dir.path());
        let config = loader.load_validated().unwrap();

        assert_eq!(config.runtime.max_log_len, 256);
        // 未写出的字段使用默认值
        assert_eq!(config.runtime.log_buffer_size, 1024);
        assert_eq!(config.logging.level, "debug");
        assert!(config.logging.json);
        assert_eq!(config.logging.sink, SinkKind::Buffer);

        let seeds: Vec<_> = config.registry.seeds().collect();
        assert_eq!(seeds, vec![(SignalIndex(0), 32.0), (SignalIndex(1), 24.0)]);
    }

    #[test]
    fn test_validate_rejects_zero_log_len() {
        let temp_dir = tempdir().unwrap();
        fs::write(
            temp_dir.path().join(CONFIG_FILE_NAME),
            "[runtime]\nmax_log_len = 0\n",
        )
        .unwrap();

        let loader = ConfigLoader::new(temp_dir.path());
        assert!(loader.load().is_ok());
        assert!(loader.load_validated().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_buffer_size() {
        let mut config = HostConfig::default();
        config.runtime.log_buffer_size = 0;
        let err = ConfigLoader::validate(&config).unwrap_err();
        assert!(err.to_string().contains("log_buffer_size"));
    }

    #[test]
    fn test_validate_rejects_duplicate_seeds() {
        let mut config = HostConfig::default();
        config.registry.signals = vec![
            crate::SignalSeed { index: SignalIndex(3), value: 1.0 },
            crate::SignalSeed { index: SignalIndex(3), value: 2.0 },
        ];

        let err = ConfigLoader::validate(&config).unwrap_err();
        assert!(err.to_string().contains("#3"));
    }
}
