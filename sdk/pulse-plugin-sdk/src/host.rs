use crate::string::BoundaryStr;
use pulse_types::{BatchHandle, SignalIndex, SignalValue};

/// Functions the host provides to the guest.
///
/// On `wasm32` these are the module imports (see [`crate::wasm::WasmHost`]);
/// natively, [`crate::testing::MemoryHost`] stands in for the host.
pub trait Host {
    /// Emits `text` to the host log. The host only borrows the buffer for the
    /// duration of the call.
    fn log(&self, text: BoundaryStr<'_>);

    /// Value at `idx`, or the sentinel when the slot is unregistered.
    fn get_signal(&self, idx: SignalIndex) -> SignalValue;

    /// Swaps in `val` and returns the previous value.
    fn set_signal(&self, idx: SignalIndex, val: SignalValue) -> SignalValue;

    /// Length of the batch behind `handle`, `None` when the handle is invalid.
    fn batch_len(&self, handle: BatchHandle) -> Option<usize>;

    /// One sample of a batch; the sentinel when out of range.
    fn batch_read(&self, handle: BatchHandle, offset: usize) -> SignalValue;

    fn log_str(&self, text: &str) {
        self.log(BoundaryStr::from(text));
    }
}
