//! Import glue for `wasm32` builds.

use crate::host::Host;
use crate::string::BoundaryStr;
use pulse_types::{BatchHandle, SignalIndex, SignalValue};

// Host 提供的函数声明
#[link(wasm_import_module = "sdk:component/logger")]
extern "C" {
    #[link_name = "log"]
    fn host_log(ptr: *const u8, len: usize);
}

#[link(wasm_import_module = "sdk:component/registry")]
extern "C" {
    #[link_name = "get-signal"]
    fn host_get_signal(idx: u64) -> f64;

    #[link_name = "set-signal"]
    fn host_set_signal(idx: u64, val: f64) -> f64;

    #[link_name = "batch-len"]
    fn host_batch_len(handle: u64) -> i64;

    #[link_name = "batch-read"]
    fn host_batch_read(handle: u64, offset: u64) -> f64;
}

/// The real host, reached through module imports.
#[derive(Debug, Clone, Copy, Default)]
pub struct WasmHost;

impl Host for WasmHost {
    fn log(&self, text: BoundaryStr<'_>) {
        // 宿主只在调用期间读取这段内存
        unsafe { host_log(text.as_ptr(), text.len()) }
    }

    fn get_signal(&self, idx: SignalIndex) -> SignalValue {
        unsafe { host_get_signal(idx.raw()) }
    }

    fn set_signal(&self, idx: SignalIndex, val: SignalValue) -> SignalValue {
        unsafe { host_set_signal(idx.raw(), val) }
    }

    fn batch_len(&self, handle: BatchHandle) -> Option<usize> {
        let len = unsafe { host_batch_len(handle.raw()) };
        usize::try_from(len).ok()
    }

    fn batch_read(&self, handle: BatchHandle, offset: usize) -> SignalValue {
        unsafe { host_batch_read(handle.raw(), offset as u64) }
    }
}
