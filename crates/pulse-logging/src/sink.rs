//! Destinations for text emitted by guest plugins.

use crate::structured::LogEntry;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// tracing target used for guest log lines.
pub const PLUGIN_LOG_TARGET: &str = "wasm_plugin";

/// Host-side log sink for the guest `log` import.
///
/// The sink receives an owned copy of the text; the guest buffer it was read
/// from is never visible here.
pub trait LogSink: Send + Sync {
    fn record(&self, entry: LogEntry);
}

/// Forwards plugin output to the `tracing` system.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn record(&self, entry: LogEntry) {
        if entry.truncated {
            tracing::info!(
                target: PLUGIN_LOG_TARGET,
                plugin = %entry.plugin,
                truncated = true,
                "{}",
                entry.message
            );
        } else {
            tracing::info!(target: PLUGIN_LOG_TARGET, plugin = %entry.plugin, "{}", entry.message);
        }
    }
}

/// Keeps the most recent entries in memory.
///
/// When full, the oldest entry is dropped.
#[derive(Debug)]
pub struct BufferSink {
    buffer: Mutex<Vec<LogEntry>>,
    max_buffer_size: usize,
}

impl BufferSink {
    pub fn new(max_buffer_size: usize) -> Self {
        Self {
            buffer: Mutex::new(Vec::with_capacity(max_buffer_size.min(1024))),
            max_buffer_size: max_buffer_size.max(1),
        }
    }

    /// Copies out the buffered entries.
    pub fn entries(&self) -> Vec<LogEntry> {
        self.buffer().clone()
    }

    /// Messages only, oldest first.
    pub fn messages(&self) -> Vec<String> {
        self.buffer().iter().map(|e| e.message.clone()).collect()
    }

    /// Takes every buffered entry, leaving the sink empty.
    pub fn drain(&self) -> Vec<LogEntry> {
        std::mem::take(&mut *self.buffer())
    }

    pub fn len(&self) -> usize {
        self.buffer().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn buffer(&self) -> MutexGuard<'_, Vec<LogEntry>> {
        self.buffer.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for BufferSink {
    fn default() -> Self {
        Self::new(1024)
    }
}

impl LogSink for BufferSink {
    fn record(&self, entry: LogEntry) {
        let mut buffer = self.buffer();
        if buffer.len() >= self.max_buffer_size {
            buffer.remove(0);
        }
        buffer.push(entry);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_sink_records_in_order() {
        let sink = BufferSink::new(10);
        sink.record(LogEntry::new("a", "first"));
        sink.record(LogEntry::new("b", "second"));

        assert_eq!(sink.messages(), vec!["first", "second"]);
        assert_eq!(sink.entries()[1].plugin, "b");
    }

    #[test]
    fn test_buffer_sink_drops_oldest_when_full() {
        let sink = BufferSink::new(2);
        for msg in ["one", "two", "three"] {
            sink.record(LogEntry::new("p", msg));
        }
        assert_eq!(sink.messages(), vec!["two", "three"]);
    }

    #[test]
    fn test_drain_empties_buffer() {
        let sink = BufferSink::default();
        sink.record(LogEntry::new("p", "hello"));

        let drained = sink.drain();
        assert_eq!(drained.len(), 1);
        assert!(sink.is_empty());
    }

    #[test]
    fn test_tracing_sink_without_subscriber() {
        // 未安装 subscriber 时不应 panic
        TracingSink.record(LogEntry::new("p", "dropped"));
    }
}
