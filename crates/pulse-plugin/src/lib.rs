//! Host runtime for pulse plugins.
//!
//! [`PluginManager`] loads guest modules, provides the logger and registry
//! imports, and drives the `enable` / `disable` / `process-signal` exports.

pub mod manager;
pub mod memory;
pub mod state;
pub mod wasm_host;

pub use manager::PluginManager;
pub use state::HostState;
pub use wasm_host::WasmHost;
