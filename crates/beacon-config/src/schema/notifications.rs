//! User-notification behavior.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationConfig {
    /// Suppress user-visible connection error notifications; failures are
    /// still logged.
    pub suppress: bool,
}
