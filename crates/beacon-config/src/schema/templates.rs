//! Presence line and hover-text templates.
//!
//! Each field is a template string rendered against the live
//! substitution context. `{empty}` as the entire value renders a
//! blank-but-nonempty line; an empty string omits the field entirely.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateConfig {
    pub details_idling: String,
    pub details_editing: String,
    pub details_debugging: String,

    pub state_idling: String,
    pub state_editing: String,
    pub state_debugging: String,

    /// Hover text for the large image, per mode.
    pub large_text_idling: String,
    pub large_text_editing: String,
    pub large_text_debugging: String,

    /// Hover text for the small image (all modes).
    pub small_text: String,

    /// Placeholder substituted for tokens that cannot be resolved in the
    /// current context.
    pub unknown: String,

    /// Value of the `{idle}` token.
    pub idle_text: String,
}

impl Default for TemplateConfig {
    fn default() -> Self {
        Self {
            details_idling: "Idling".into(),
            details_editing: "Editing {file_name}".into(),
            details_debugging: "Debugging {file_name}".into(),
            state_idling: "{empty}".into(),
            state_editing: "in {workspace_and_folder}".into(),
            state_debugging: "in {workspace_and_folder}".into(),
            large_text_idling: "{idle}".into(),
            large_text_editing: "Editing a {LANG} file".into(),
            large_text_debugging: "Debugging a {LANG} file".into(),
            small_text: "{workspace}".into(),
            unknown: "?".into(),
            idle_text: "Idle".into(),
        }
    }
}
