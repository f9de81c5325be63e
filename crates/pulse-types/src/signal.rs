use serde::{Deserialize, Serialize};
use std::fmt;

/// Value carried by a signal slot. No units are attached at this layer.
pub type SignalValue = f64;

/// Returned for reads of slots that were never written.
pub const SIGNAL_SENTINEL: SignalValue = 0.0;

/// Opaque handle identifying one slot in the host's signal table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SignalIndex(pub u64);

impl SignalIndex {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl From<u64> for SignalIndex {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for SignalIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}
