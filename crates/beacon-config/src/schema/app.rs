//! Top-level application settings.

use serde::{Deserialize, Serialize};

/// Which build flavor of the host editor is running. Selects the default
/// icon when nothing more specific applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AppVariant {
    Stable,
    Preview,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Master toggle. Disabling clears the presence and closes the
    /// connection; re-enabling reconnects.
    pub enabled: bool,
    /// Application id registered with the chat client; sent in the
    /// handshake frame.
    pub application_id: String,
    pub variant: AppVariant,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            application_id: "1045120999344414720".into(),
            variant: AppVariant::Stable,
        }
    }
}
