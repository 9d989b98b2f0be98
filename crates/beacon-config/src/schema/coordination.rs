//! Multi-instance coordination.
//!
//! `active_instance` is the shared selector: at most one instance
//! broadcasts at a time when coordination is enabled. It lives in the
//! config file so sibling processes observe changes through the file
//! watcher.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CoordinationConfig {
    /// When off (the default) every instance broadcasts.
    pub enabled: bool,
    /// Id of the instance currently allowed to broadcast; empty means
    /// unset (first asker claims it).
    pub active_instance: String,
}
