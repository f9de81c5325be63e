use pulse_core::{BatchArena, SignalRegistry};
use pulse_logging::{LogEntry, LogSink};
use std::sync::Arc;

/// Per-store data visible to the host imports.
pub struct HostState {
    pub(crate) plugin_id: String,
    pub(crate) registry: Arc<SignalRegistry>,
    pub(crate) batches: Arc<BatchArena>,
    pub(crate) sink: Arc<dyn LogSink>,
    pub(crate) max_log_len: usize,
}

impl HostState {
    pub fn new(
        plugin_id: impl Into<String>,
        registry: Arc<SignalRegistry>,
        batches: Arc<BatchArena>,
        sink: Arc<dyn LogSink>,
        max_log_len: usize,
    ) -> Self {
        Self {
            plugin_id: plugin_id.into(),
            registry,
            batches,
            sink,
            max_log_len,
        }
    }

    pub fn plugin_id(&self) -> &str {
        &self.plugin_id
    }

    pub(crate) fn record_log(&self, message: String, truncated: bool) {
        self.sink
            .record(LogEntry::new(self.plugin_id.clone(), message).with_truncated(truncated));
    }
}
