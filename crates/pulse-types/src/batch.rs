use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque reference to a batch of signal data held by the host.
///
/// The raw `u64` packs `generation << 32 | slot`. Generations start at 1, so
/// a raw value of `0` never names a live batch. The guest must never treat the
/// value as a memory address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BatchHandle(pub u64);

impl BatchHandle {
    pub const fn from_parts(slot: u32, generation: u32) -> Self {
        Self(((generation as u64) << 32) | slot as u64)
    }

    pub const fn raw(self) -> u64 {
        self.0
    }

    pub const fn slot(self) -> u32 {
        self.0 as u32
    }

    pub const fn generation(self) -> u32 {
        (self.0 >> 32) as u32
    }
}

impl From<u64> for BatchHandle {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for BatchHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "batch[{}@{}]", self.slot(), self.generation())
    }
}
