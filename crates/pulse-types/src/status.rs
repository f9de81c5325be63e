use serde::{Deserialize, Serialize};
use std::fmt;

/// Status code returned by `enable` / `disable`.
///
/// `0` is success. The small reserved range below is produced by the SDK
/// itself; every other nonzero value is plugin-defined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Status(pub i32);

impl Status {
    pub const OK: Status = Status(0);
    /// `enable` was called while the instance was already enabled.
    pub const ALREADY_ENABLED: Status = Status(1);
    /// Another entry point of the same instance is still running.
    pub const BUSY: Status = Status(2);
    /// The plugin panicked inside the entry point.
    pub const PANICKED: Status = Status(3);
    /// Generic refusal.
    pub const FAILED: Status = Status(4);

    pub const fn code(self) -> i32 {
        self.0
    }

    pub const fn is_ok(self) -> bool {
        self.0 == 0
    }

    /// Whether the code belongs to the SDK reserved range rather than to a plugin.
    pub const fn is_reserved(self) -> bool {
        self.0 >= 0 && self.0 <= Self::FAILED.0
    }
}

impl From<i32> for Status {
    fn from(code: i32) -> Self {
        Status(code)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Status::OK => f.write_str("ok"),
            Status::ALREADY_ENABLED => f.write_str("already enabled"),
            Status::BUSY => f.write_str("busy"),
            Status::PANICKED => f.write_str("panicked"),
            Status::FAILED => f.write_str("failed"),
            Status(code) => write!(f, "plugin status {}", code),
        }
    }
}

/// Lifecycle of the single plugin instance held by a loaded module.
///
/// `Unloaded` is both the initial and the terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum LifecycleState {
    #[default]
    Unloaded,
    Disabled,
    Enabled,
}

impl LifecycleState {
    pub const fn is_enabled(self) -> bool {
        matches!(self, LifecycleState::Enabled)
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LifecycleState::Unloaded => "unloaded",
            LifecycleState::Disabled => "disabled",
            LifecycleState::Enabled => "enabled",
        };
        f.write_str(name)
    }
}
