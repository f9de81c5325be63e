pub mod sink;
pub mod structured;
pub mod subscriber;

pub use sink::{BufferSink, LogSink, TracingSink, PLUGIN_LOG_TARGET};
pub use structured::LogEntry;
pub use subscriber::{init_logging, LoggingConfig, LoggingError, SinkKind};
