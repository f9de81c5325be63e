//! Bounds-checked table of signal batches handed to `process_signal`.

use pulse_types::{BatchHandle, SignalValue};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

#[derive(Debug)]
struct Slot {
    generation: u32,
    data: Option<Arc<[SignalValue]>>,
}

#[derive(Debug, Default)]
struct Table {
    slots: Vec<Slot>,
    free: Vec<u32>,
}

/// Arena of host-owned batches addressed by generation-checked handles.
///
/// A handle stays valid from `insert` until `remove`; afterwards the slot's
/// generation moves on and the old handle is rejected even if the slot is
/// reused.
#[derive(Debug, Default)]
pub struct BatchArena {
    table: Mutex<Table>,
}

impl BatchArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, samples: Vec<SignalValue>) -> BatchHandle {
        let data: Arc<[SignalValue]> = samples.into();
        let mut table = self.table();

        if let Some(slot) = table.free.pop() {
            let entry = &mut table.slots[slot as usize];
            entry.data = Some(data);
            return BatchHandle::from_parts(slot, entry.generation);
        }

        let slot = table.slots.len() as u32;
        table.slots.push(Slot {
            generation: 1,
            data: Some(data),
        });
        BatchHandle::from_parts(slot, 1)
    }

    /// The batch behind `handle`, if it is still live.
    pub fn get(&self, handle: BatchHandle) -> Option<Arc<[SignalValue]>> {
        let table = self.table();
        table
            .slots
            .get(handle.slot() as usize)
            .filter(|slot| slot.generation == handle.generation())
            .and_then(|slot| slot.data.clone())
    }

    pub fn len_of(&self, handle: BatchHandle) -> Option<usize> {
        self.get(handle).map(|data| data.len())
    }

    pub fn read(&self, handle: BatchHandle, offset: usize) -> Option<SignalValue> {
        self.get(handle).and_then(|data| data.get(offset).copied())
    }

    /// Drops the batch. Returns `false` for stale or unknown handles.
    pub fn remove(&self, handle: BatchHandle) -> bool {
        let mut table = self.table();
        let Some(entry) = table.slots.get_mut(handle.slot() as usize) else {
            return false;
        };
        if entry.generation != handle.generation() || entry.data.is_none() {
            return false;
        }

        entry.data = None;
        // 0 保留给无效句柄，回绕时跳过
        entry.generation = entry.generation.checked_add(1).unwrap_or(1);
        table.free.push(handle.slot());
        true
    }

    /// Number of live batches.
    pub fn live(&self) -> usize {
        let table = self.table();
        table.slots.len() - table.free.len()
    }

    fn table(&self) -> MutexGuard<'_, Table> {
        self.table.lock().unwrap_or_else(|poisoned: PoisonError<_>| {
            tracing::warn!("Batch arena lock was poisoned, recovering");
            poisoned.into_inner()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_read() {
        let arena = BatchArena::new();
        let handle = arena.insert(vec![32.0, 24.0, 16.0]);

        assert_eq!(handle.generation(), 1);
        assert_eq!(arena.len_of(handle), Some(3));
        assert_eq!(arena.read(handle, 2), Some(16.0));
        assert_eq!(arena.read(handle, 3), None);
        assert_eq!(arena.live(), 1);
    }

    #[test]
    fn test_raw_zero_and_unknown_handles_rejected() {
        let arena = BatchArena::new();
        arena.insert(vec![1.0]);

        assert!(arena.get(BatchHandle(0)).is_none());
        assert!(arena.get(BatchHandle(42)).is_none());
        assert!(arena.get(BatchHandle::from_parts(5, 1)).is_none());
    }

    #[test]
    fn test_stale_handle_rejected_after_reuse() {
        let arena = BatchArena::new();
        let first = arena.insert(vec![1.0]);
        assert!(arena.remove(first));
        assert!(!arena.remove(first));

        let second = arena.insert(vec![2.0, 3.0]);
        assert_eq!(second.slot(), first.slot());
        assert_ne!(second.generation(), first.generation());

        assert!(arena.get(first).is_none());
        assert_eq!(arena.len_of(second), Some(2));
        assert_eq!(arena.live(), 1);
    }

    #[test]
    fn test_empty_batch_is_still_live() {
        let arena = BatchArena::new();
        let handle = arena.insert(Vec::new());
        assert_eq!(arena.len_of(handle), Some(0));
        assert_eq!(arena.read(handle, 0), None);
    }
}
