use thiserror::Error;

/// Pulse 宿主统一错误类型
#[derive(Error, Debug)]
pub enum PulseError {
    #[error("Plugin not found: {0}")]
    PluginNotFound(String),

    #[error("Plugin '{plugin}' must export '{export}'")]
    MissingExport { plugin: String, export: String },

    #[error("Plugin '{plugin}' is faulted and refuses further calls: {reason}")]
    Faulted { plugin: String, reason: String },

    #[error("Wasm error: {0}")]
    Wasm(String),

    #[error("Guest memory error: {0}")]
    Memory(String),

    #[error("Lock poisoned: {0}")]
    LockPoisoned(String),
}

/// Result 类型别名
pub type Result<T> = std::result::Result<T, PulseError>;

// wasmtime reports everything through anyhow
impl From<anyhow::Error> for PulseError {
    fn from(err: anyhow::Error) -> Self {
        PulseError::Wasm(format!("{:#}", err))
    }
}
