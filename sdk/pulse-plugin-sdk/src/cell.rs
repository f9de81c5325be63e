//! Module-wide slot holding the plugin instance.

use crate::host::Host;
use crate::lifecycle::{Plugin, PluginInstance};
use crate::string::BoundaryString;
use pulse_types::{LifecycleState, Status};
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Mutex, TryLockError};

/// Owner of the one [`PluginInstance`] a loaded module has.
///
/// The instance is created on the first entry-point call. Calls that overlap
/// a running one (a host calling back into the guest from an import, or from
/// another thread) are rejected with [`Status::BUSY`] instead of running.
pub struct PluginCell<P> {
    slot: Mutex<Option<PluginInstance<P>>>,
}

impl<P> PluginCell<P> {
    pub const fn new() -> Self {
        Self {
            slot: Mutex::new(None),
        }
    }
}

impl<P> Default for PluginCell<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: Plugin + Default> PluginCell<P> {
    pub fn enable(&self, host: &dyn Host) -> Status {
        self.with_instance(host, Status::BUSY, Status::PANICKED, |instance| {
            instance.enable(host)
        })
    }

    pub fn disable(&self, host: &dyn Host) -> Status {
        self.with_instance(host, Status::BUSY, Status::PANICKED, |instance| {
            instance.disable(host)
        })
    }

    pub fn process_signal(&self, host: &dyn Host, handle: u64) {
        self.with_instance(host, (), (), |instance| instance.process_signal(host, handle))
    }

    pub fn icon(&self, host: &dyn Host) -> Option<BoundaryString> {
        self.with_instance(host, None, None, |instance| instance.icon())
    }

    /// Current lifecycle state, or `None` while an entry point is running.
    pub fn state(&self) -> Option<LifecycleState> {
        let slot = match self.slot.try_lock() {
            Ok(slot) => slot,
            Err(TryLockError::Poisoned(poisoned)) => poisoned.into_inner(),
            Err(TryLockError::WouldBlock) => return None,
        };
        Some(slot.as_ref().map_or(LifecycleState::Unloaded, |i| i.state()))
    }

    fn with_instance<R>(
        &self,
        host: &dyn Host,
        busy: R,
        panicked: R,
        f: impl FnOnce(&mut PluginInstance<P>) -> R,
    ) -> R {
        let mut slot = match self.slot.try_lock() {
            Ok(slot) => slot,
            Err(TryLockError::Poisoned(poisoned)) => poisoned.into_inner(),
            Err(TryLockError::WouldBlock) => {
                host.log_str("overlapping call into plugin rejected");
                return busy;
            }
        };

        let instance = slot.get_or_insert_with(|| PluginInstance::new(P::default()));
        match panic::catch_unwind(AssertUnwindSafe(|| f(instance))) {
            Ok(result) => result,
            Err(_) => {
                host.log_str("plugin panicked inside an entry point");
                panicked
            }
        }
    }
}
