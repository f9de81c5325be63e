//! Host-owned signal table.

use pulse_types::{SignalIndex, SignalValue, SIGNAL_SENTINEL};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Mapping from signal index to value, shared by every plugin session.
///
/// All reads and writes go through one mutex, so `set` is an atomic swap
/// from the guest's point of view.
#[derive(Debug, Default)]
pub struct SignalRegistry {
    slots: Mutex<HashMap<SignalIndex, SignalValue>>,
}

impl SignalRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry with pre-registered slots.
    pub fn with_signals<I>(signals: I) -> Self
    where
        I: IntoIterator<Item = (SignalIndex, SignalValue)>,
    {
        Self {
            slots: Mutex::new(signals.into_iter().collect()),
        }
    }

    /// Current value at `idx`, or [`SIGNAL_SENTINEL`] when the slot was never
    /// registered. A miss does not register the slot.
    pub fn get(&self, idx: SignalIndex) -> SignalValue {
        self.slots()
            .get(&idx)
            .copied()
            .unwrap_or(SIGNAL_SENTINEL)
    }

    /// Replaces the value at `idx` and returns the previous one.
    ///
    /// Writing an unregistered slot registers it; the returned "previous"
    /// value is then [`SIGNAL_SENTINEL`].
    pub fn set(&self, idx: SignalIndex, val: SignalValue) -> SignalValue {
        self.slots().insert(idx, val).unwrap_or(SIGNAL_SENTINEL)
    }

    pub fn contains(&self, idx: SignalIndex) -> bool {
        self.slots().contains_key(&idx)
    }

    pub fn len(&self) -> usize {
        self.slots().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Ordered copy of every registered slot.
    pub fn snapshot(&self) -> BTreeMap<SignalIndex, SignalValue> {
        self.slots().iter().map(|(k, v)| (*k, *v)).collect()
    }

    fn slots(&self) -> MutexGuard<'_, HashMap<SignalIndex, SignalValue>> {
        // 槽位只是普通数值，锁被污染时直接恢复
        self.slots.lock().unwrap_or_else(|poisoned: PoisonError<_>| {
            tracing::warn!("Signal registry lock was poisoned, recovering");
            poisoned.into_inner()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_get_unregistered_returns_sentinel() {
        let registry = SignalRegistry::new();
        assert_eq!(registry.get(SignalIndex(7)), SIGNAL_SENTINEL);
        // 读取不会注册槽位
        assert!(!registry.contains(SignalIndex(7)));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_set_returns_previous_value() {
        let registry = SignalRegistry::new();
        let idx = SignalIndex(3);

        assert_eq!(registry.set(idx, 1.5), SIGNAL_SENTINEL);
        assert_eq!(registry.set(idx, 2.5), 1.5);
        assert_eq!(registry.get(idx), 2.5);
        assert!(registry.contains(idx));
    }

    #[test]
    fn test_seeded_registry() {
        let registry = SignalRegistry::with_signals(vec![
            (SignalIndex(0), 32.0),
            (SignalIndex(1), 24.0),
            (SignalIndex(2), 16.0),
        ]);

        assert_eq!(registry.len(), 3);
        assert_eq!(registry.get(SignalIndex(1)), 24.0);
        assert_eq!(registry.set(SignalIndex(2), 8.0), 16.0);

        let snapshot = registry.snapshot();
        let values: Vec<f64> = snapshot.values().copied().collect();
        assert_eq!(values, vec![32.0, 24.0, 8.0]);
    }

    #[test]
    fn test_concurrent_swaps_form_a_chain() {
        // 每个线程写入自己的编号；每个旧值恰好被一次 swap 取回
        let registry = Arc::new(SignalRegistry::new());
        let idx = SignalIndex(1);

        let handles: Vec<_> = (1..=16)
            .map(|i| {
                let registry = registry.clone();
                thread::spawn(move || registry.set(idx, i as f64))
            })
            .collect();

        let mut seen: Vec<f64> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        seen.push(registry.get(idx));
        seen.sort_by(|a, b| a.partial_cmp(b).unwrap());

        let expected: Vec<f64> = (0..=16).map(|i| i as f64).collect();
        assert_eq!(seen, expected);
    }
}
