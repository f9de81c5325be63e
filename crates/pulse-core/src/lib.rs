pub mod batch;
pub mod error;
pub mod registry;

pub use batch::BatchArena;
pub use error::{PulseError, Result};
pub use registry::SignalRegistry;
