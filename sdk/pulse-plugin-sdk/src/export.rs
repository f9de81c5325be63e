//! Buffers moved from the guest to the host.
//!
//! The layout uses `usize`, which is the `u32` the host reads on `wasm32`.

use crate::string::BoundaryString;
use std::cell::UnsafeCell;

/// Static `[ptr, len]` pair read by the host after `icon` returns.
#[repr(C, align(8))]
struct ReturnArea(UnsafeCell<[usize; 2]>);

// wasm32 guests are single-threaded and the host reads the area before the
// next call into the guest.
unsafe impl Sync for ReturnArea {}

static RETURN_AREA: ReturnArea = ReturnArea(UnsafeCell::new([0; 2]));

/// Moves `value` to the host and returns the address of the return area.
/// `(0, 0)` stands for "nothing".
pub fn return_string(value: Option<BoundaryString>) -> *const usize {
    let parts = match value {
        Some(text) if !text.is_empty() => {
            let (ptr, len) = text.into_raw_parts();
            [ptr as usize, len]
        }
        _ => [0, 0],
    };
    unsafe {
        *RETURN_AREA.0.get() = parts;
    }
    RETURN_AREA.0.get() as *const usize
}

/// Frees a buffer previously moved out by [`return_string`].
///
/// # Safety
///
/// `(ptr, len)` must come from `return_string` and be reclaimed only once.
pub unsafe fn reclaim(ptr: *mut u8, len: usize) {
    if !ptr.is_null() {
        BoundaryString::from_raw_parts(ptr, len).release();
    }
}
