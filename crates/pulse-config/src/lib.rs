pub mod global;
pub mod loader;

pub use global::{HostConfig, RegistryConfig, RuntimeConfig, SignalSeed};
pub use loader::{ConfigLoader, CONFIG_FILE_NAME};
pub use pulse_logging::LoggingConfig;
