//! In-process host for exercising plugins without a wasm runtime.

use crate::host::Host;
use crate::string::BoundaryStr;
use pulse_types::{BatchHandle, SignalIndex, SignalValue, SIGNAL_SENTINEL};
use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, HashMap};

/// Host double with the same registry semantics as the real host: sentinel
/// on miss, swap on write.
#[derive(Debug, Default)]
pub struct MemoryHost {
    signals: RefCell<BTreeMap<SignalIndex, SignalValue>>,
    batches: RefCell<HashMap<BatchHandle, Vec<SignalValue>>>,
    next_batch: Cell<u32>,
    logs: RefCell<Vec<String>>,
    signal_writes: Cell<usize>,
    batch_reads: Cell<usize>,
}

impl MemoryHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_signal(self, idx: SignalIndex, val: SignalValue) -> Self {
        self.signals.borrow_mut().insert(idx, val);
        self
    }

    pub fn insert_batch(&self, samples: Vec<SignalValue>) -> BatchHandle {
        let slot = self.next_batch.get();
        self.next_batch.set(slot + 1);
        let handle = BatchHandle::from_parts(slot, 1);
        self.batches.borrow_mut().insert(handle, samples);
        handle
    }

    pub fn remove_batch(&self, handle: BatchHandle) -> bool {
        self.batches.borrow_mut().remove(&handle).is_some()
    }

    pub fn logs(&self) -> Vec<String> {
        self.logs.borrow().clone()
    }

    pub fn signals(&self) -> BTreeMap<SignalIndex, SignalValue> {
        self.signals.borrow().clone()
    }

    /// Number of `set_signal` calls received.
    pub fn signal_writes(&self) -> usize {
        self.signal_writes.get()
    }

    pub fn batch_reads(&self) -> usize {
        self.batch_reads.get()
    }
}

impl Host for MemoryHost {
    fn log(&self, text: BoundaryStr<'_>) {
        // 只复制内容，不保留借用
        self.logs.borrow_mut().push(text.to_string_lossy().into_owned());
    }

    fn get_signal(&self, idx: SignalIndex) -> SignalValue {
        self.signals
            .borrow()
            .get(&idx)
            .copied()
            .unwrap_or(SIGNAL_SENTINEL)
    }

    fn set_signal(&self, idx: SignalIndex, val: SignalValue) -> SignalValue {
        self.signal_writes.set(self.signal_writes.get() + 1);
        self.signals
            .borrow_mut()
            .insert(idx, val)
            .unwrap_or(SIGNAL_SENTINEL)
    }

    fn batch_len(&self, handle: BatchHandle) -> Option<usize> {
        self.batches.borrow().get(&handle).map(Vec::len)
    }

    fn batch_read(&self, handle: BatchHandle, offset: usize) -> SignalValue {
        self.batch_reads.set(self.batch_reads.get() + 1);
        self.batches
            .borrow()
            .get(&handle)
            .and_then(|batch| batch.get(offset).copied())
            .unwrap_or(SIGNAL_SENTINEL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_semantics() {
        let host = MemoryHost::new().with_signal(SignalIndex(0), 32.0);

        assert_eq!(host.get_signal(SignalIndex(9)), SIGNAL_SENTINEL);
        assert_eq!(host.set_signal(SignalIndex(0), 1.0), 32.0);
        assert_eq!(host.set_signal(SignalIndex(9), 2.0), SIGNAL_SENTINEL);
        assert_eq!(host.signal_writes(), 2);
    }

    #[test]
    fn test_removed_batch_is_invalid() {
        let host = MemoryHost::new();
        let handle = host.insert_batch(vec![1.0]);
        assert!(host.remove_batch(handle));
        assert_eq!(host.batch_len(handle), None);
    }
}
