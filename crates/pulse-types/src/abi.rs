//! Names of the functions crossing the host/guest boundary.
//!
//! Guest-side `#[link]` attributes need literals, so the SDK repeats these
//! strings; keep both in sync.

pub const LOGGER_MODULE: &str = "sdk:component/logger";
pub const REGISTRY_MODULE: &str = "sdk:component/registry";

pub const IMPORT_LOG: &str = "log";
pub const IMPORT_GET_SIGNAL: &str = "get-signal";
pub const IMPORT_SET_SIGNAL: &str = "set-signal";
pub const IMPORT_BATCH_LEN: &str = "batch-len";
pub const IMPORT_BATCH_READ: &str = "batch-read";

pub const EXPORT_MEMORY: &str = "memory";
pub const EXPORT_ENABLE: &str = "enable";
pub const EXPORT_DISABLE: &str = "disable";
pub const EXPORT_PROCESS_SIGNAL: &str = "process-signal";
pub const EXPORT_ICON: &str = "icon";
pub const EXPORT_DEALLOC: &str = "dealloc";

/// `batch-len` result for a handle that does not name a live batch.
pub const INVALID_BATCH_LEN: i64 = -1;
