//! Types shared by the host runtime and guest plugins.
//!
//! Everything here compiles for both native targets and `wasm32`.

pub mod abi;
pub mod batch;
pub mod signal;
pub mod status;

pub use batch::BatchHandle;
pub use signal::{SignalIndex, SignalValue, SIGNAL_SENTINEL};
pub use status::{LifecycleState, Status};
