//! Idle-clear behavior.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IdleConfig {
    /// Seconds after the editor window loses focus before the presence is
    /// cleared. Zero disables idle clearing.
    pub timeout_secs: u64,
}

impl Default for IdleConfig {
    fn default() -> Self {
        Self { timeout_secs: 300 }
    }
}
