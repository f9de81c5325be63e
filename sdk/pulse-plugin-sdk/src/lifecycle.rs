//! Lifecycle state machine of the plugin instance.

use crate::batch::SignalBatch;
use crate::host::Host;
use crate::string::BoundaryString;
use pulse_types::{BatchHandle, LifecycleState, Status};

/// Behaviour supplied by a plugin author.
///
/// Methods are only invoked by [`PluginInstance`], which guarantees the
/// lifecycle ordering: `process_signal` runs only while enabled, `enable`
/// never runs twice in a row.
pub trait Plugin {
    /// Prepares the plugin. Returning an error leaves it disabled; the code is
    /// reported to the host.
    fn enable(&mut self, host: &dyn Host) -> Result<(), Status>;

    fn disable(&mut self, _host: &dyn Host) -> Result<(), Status> {
        Ok(())
    }

    /// Handles one batch. Errors are written to the host log; the host never
    /// sees them.
    fn process_signal(&mut self, host: &dyn Host, batch: SignalBatch<'_>) -> Result<(), String>;

    /// Optional icon bytes, typically a PNG.
    fn icon(&self) -> Option<Vec<u8>> {
        None
    }
}

/// The single guest-side instance of a loaded module.
pub struct PluginInstance<P> {
    plugin: P,
    state: LifecycleState,
}

impl<P: Plugin> PluginInstance<P> {
    pub fn new(plugin: P) -> Self {
        Self {
            plugin,
            state: LifecycleState::Unloaded,
        }
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    pub fn plugin(&self) -> &P {
        &self.plugin
    }

    pub fn enable(&mut self, host: &dyn Host) -> Status {
        if self.state.is_enabled() {
            return Status::ALREADY_ENABLED;
        }

        match self.plugin.enable(host) {
            Ok(()) => {
                self.state = LifecycleState::Enabled;
                Status::OK
            }
            Err(status) => refusal(status),
        }
    }

    /// Disables the instance. The state becomes `Disabled` even if the plugin
    /// reports a failure, so no further batch is processed.
    pub fn disable(&mut self, host: &dyn Host) -> Status {
        if !self.state.is_enabled() {
            return Status::OK;
        }

        self.state = LifecycleState::Disabled;
        match self.plugin.disable(host) {
            Ok(()) => Status::OK,
            Err(status) => refusal(status),
        }
    }

    pub fn process_signal(&mut self, host: &dyn Host, handle: u64) {
        if !self.state.is_enabled() {
            host.log_str(&format!(
                "process_signal({:#x}) ignored: plugin is {}",
                handle, self.state
            ));
            return;
        }

        let batch = SignalBatch::new(host, BatchHandle(handle));
        if let Err(e) = self.plugin.process_signal(host, batch) {
            host.log_str(&format!("process_signal({:#x}) failed: {}", handle, e));
        }
    }

    pub fn icon(&self) -> Option<BoundaryString> {
        self.plugin
            .icon()
            .filter(|bytes| !bytes.is_empty())
            .map(BoundaryString::construct_owned)
    }

    /// Tears the instance down, disabling it first when needed.
    pub fn unload(mut self, host: &dyn Host) -> P {
        if self.state.is_enabled() {
            let status = self.disable(host);
            if !status.is_ok() {
                host.log_str(&format!("disable during unload reported {}", status));
            }
        }
        self.plugin
    }
}

/// 落在保留区间内的插件错误码统一折算为 `FAILED`。
fn refusal(status: Status) -> Status {
    if status.is_reserved() {
        Status::FAILED
    } else {
        status
    }
}
