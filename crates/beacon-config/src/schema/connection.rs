//! Connection lifecycle tuning.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionConfig {
    /// Schedule a fresh connect after an unexpected disconnect.
    pub auto_reconnect: bool,
    /// Base reconnect delay in seconds; doubles per attempt.
    pub reconnect_delay_secs: u64,
    /// Ceiling for the reconnect delay.
    pub max_reconnect_delay_secs: u64,
    /// Trailing-edge throttle for document-edit bursts: at most one
    /// rebuild per this many milliseconds.
    pub update_throttle_ms: u64,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            auto_reconnect: true,
            reconnect_delay_secs: 1,
            max_reconnect_delay_secs: 30,
            update_throttle_ms: 2000,
        }
    }
}
