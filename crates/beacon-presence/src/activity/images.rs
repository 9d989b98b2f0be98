//! Icon selection.
//!
//! The base icon identifies what kind of session this is, in descending
//! precedence: debugging > remote context > preview build > stable.
//! While an editor is active the large slot shows the file-type icon and
//! the base icon moves to the small slot, unless the file icon is
//! suppressed.

use beacon_config::schema::AppVariant;

use super::builder::PresenceMode;

/// A resolved large/small image assignment, text included, so the pair
/// can be swapped wholesale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePair {
    pub large_key: String,
    pub large_text: String,
    pub small_key: String,
    pub small_text: String,
}

impl ImagePair {
    /// Swap large and small, keys and texts together.
    pub fn swapped(self) -> Self {
        Self {
            large_key: self.small_key,
            large_text: self.small_text,
            small_key: self.large_key,
            small_text: self.large_text,
        }
    }
}

/// The session-kind icon, by precedence.
pub fn base_icon(mode: PresenceMode, remote: bool, variant: AppVariant) -> &'static str {
    if mode == PresenceMode::Debugging {
        "debug"
    } else if remote {
        "remote"
    } else if variant == AppVariant::Preview {
        "preview"
    } else {
        "stable"
    }
}

/// Icon key for a file type.
pub fn file_icon(language_id: &str) -> String {
    let id: String = language_id
        .to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect();
    format!("lang-{id}")
}

/// Pick large/small keys for the current mode.
///
/// Returns `(large_key, small_key)`; hover texts are attached by the
/// builder since they come from templates.
pub fn select_keys(
    mode: PresenceMode,
    remote: bool,
    variant: AppVariant,
    language_id: Option<&str>,
    suppress_file_icon: bool,
) -> (String, String) {
    let base = base_icon(mode, remote, variant).to_string();
    match (mode, language_id) {
        (PresenceMode::Idle, _) => ("idle".to_string(), base),
        (_, Some(lang)) if !suppress_file_icon => (file_icon(lang), base),
        _ => (base.clone(), base),
    }
}
