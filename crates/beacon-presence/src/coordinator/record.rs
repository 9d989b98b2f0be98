//! Instance records and staleness signals.

use serde::{Deserialize, Serialize};

/// How often each instance rewrites its own record.
pub const HEARTBEAT_INTERVAL_SECS: u64 = 30;

/// A record with no heartbeat for longer than this is stale and may be
/// swept by any sibling.
pub const STALE_AFTER_MS: u64 = 60_000;

/// One running instance, as persisted in the shared store.
///
/// Owned and rewritten only by its own process; read by all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceRecord {
    pub id: String,
    pub workspace_name: String,
    /// Last heartbeat, epoch milliseconds.
    pub timestamp: u64,
    pub pid: u32,
}

impl InstanceRecord {
    pub fn is_stale(&self, now_ms: u64) -> bool {
        now_ms.saturating_sub(self.timestamp) > STALE_AFTER_MS
    }
}

/// Cheap secondary staleness signal: is the recorded process alive?
///
/// Only Linux gives us an answer without spawning anything; elsewhere we
/// report alive and rely on the heartbeat check.
pub fn pid_alive(pid: u32) -> bool {
    #[cfg(target_os = "linux")]
    {
        std::path::Path::new(&format!("/proc/{pid}")).exists()
    }
    #[cfg(not(target_os = "linux"))]
    {
        let _ = pid;
        true
    }
}
