//! Execution stack sizing

use super::StackError;
use serde::Deserialize;

/// Operand slots reserved up front so the push/pop path rarely allocates
pub const DEFAULT_VALUE_CAPACITY: usize = 2048;
/// Frames reserved up front
pub const DEFAULT_FRAME_CAPACITY: usize = 16;

/// Initial capacities of the execution stack's backing stores
///
/// Capacities are reservations, not limits: the stack grows transparently
/// past them.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct StackConfig {
    /// Reserved slots for both the value and the type-tag sequence
    pub value_capacity: usize,
    pub frame_capacity: usize,
}

impl Default for StackConfig {
    fn default() -> Self {
        StackConfig {
            value_capacity: DEFAULT_VALUE_CAPACITY,
            frame_capacity: DEFAULT_FRAME_CAPACITY,
        }
    }
}

impl StackConfig {
    /// Read a configuration from JSON; missing fields keep their defaults
    pub fn from_json(json: &str) -> Result<Self, StackError> {
        Ok(serde_json::from_str(json)?)
    }
}
