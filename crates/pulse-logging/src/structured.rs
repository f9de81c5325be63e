use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 插件日志条目
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    /// 时间戳
    pub timestamp: DateTime<Utc>,

    /// 产生日志的插件 ID
    pub plugin: String,

    /// 日志消息
    pub message: String,

    /// 消息是否因超长被截断
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub truncated: bool,
}

impl LogEntry {
    pub fn new(plugin: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            plugin: plugin.into(),
            message: message.into(),
            truncated: false,
        }
    }

    pub fn with_truncated(mut self, truncated: bool) -> Self {
        self.truncated = truncated;
        self
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
