use crate::host::Host;
use pulse_types::{BatchHandle, SignalValue};

/// Guest view of the batch passed to `process_signal`.
///
/// The handle is checked with the host once, on construction. An invalid
/// handle yields an empty view, so reads never reach host memory through a
/// bad reference.
pub struct SignalBatch<'h> {
    host: &'h dyn Host,
    handle: BatchHandle,
    len: Option<usize>,
}

impl<'h> SignalBatch<'h> {
    pub fn new(host: &'h dyn Host, handle: BatchHandle) -> Self {
        let len = host.batch_len(handle);
        Self { host, handle, len }
    }

    pub fn handle(&self) -> BatchHandle {
        self.handle
    }

    pub fn is_valid(&self) -> bool {
        self.len.is_some()
    }

    pub fn len(&self) -> usize {
        self.len.unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, offset: usize) -> Option<SignalValue> {
        if offset < self.len() {
            Some(self.host.batch_read(self.handle, offset))
        } else {
            None
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = SignalValue> + '_ {
        (0..self.len()).map(move |i| self.host.batch_read(self.handle, i))
    }

    pub fn to_vec(&self) -> Vec<SignalValue> {
        self.iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MemoryHost;

    #[test]
    fn test_valid_batch() {
        let host = MemoryHost::new();
        let handle = host.insert_batch(vec![1.0, 2.0, 3.0]);

        let batch = SignalBatch::new(&host, handle);
        assert!(batch.is_valid());
        assert_eq!(batch.len(), 3);
        assert_eq!(batch.get(1), Some(2.0));
        assert_eq!(batch.get(3), None);
        assert_eq!(batch.iter().sum::<f64>(), 6.0);
    }

    #[test]
    fn test_invalid_handle_reads_nothing() {
        let host = MemoryHost::new();
        let batch = SignalBatch::new(&host, BatchHandle(42));

        assert!(!batch.is_valid());
        assert!(batch.is_empty());
        assert_eq!(batch.get(0), None);
        assert!(batch.to_vec().is_empty());
        assert_eq!(host.batch_reads(), 0);
    }
}
