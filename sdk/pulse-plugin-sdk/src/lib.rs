//! Guest-side SDK for pulse plugins.
//!
//! A plugin implements [`Plugin`] and exposes it with [`export_plugin!`].
//! Every call from the host lands in a [`PluginCell`], which owns the single
//! [`PluginInstance`] of the module and enforces the lifecycle rules.

pub mod batch;
pub mod cell;
pub mod export;
pub mod host;
pub mod lifecycle;
pub mod logging;
pub mod macros;
pub mod string;

#[cfg(not(target_arch = "wasm32"))]
pub mod testing;

#[cfg(target_arch = "wasm32")]
pub mod wasm;

pub use batch::SignalBatch;
pub use cell::PluginCell;
pub use host::Host;
pub use lifecycle::{Plugin, PluginInstance};
pub use string::{BoundaryStr, BoundaryString};

pub use pulse_types::{
    BatchHandle, LifecycleState, SignalIndex, SignalValue, Status, SIGNAL_SENTINEL,
};
