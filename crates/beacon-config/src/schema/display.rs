//! What the rendered presence shows and hides.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Show the primary (details) line.
    pub show_details: bool,
    /// Show the secondary (state) line.
    pub show_state: bool,
    /// Keep the elapsed-time clock running across rebuilds.
    pub show_elapsed_time: bool,
    /// Use the base icon instead of the file-type icon while editing.
    pub suppress_file_icon: bool,
    /// Swap the large and small image pairs wholesale.
    pub swap_images: bool,
    /// Attach a button linking to the repository remote, when one
    /// resolves.
    pub show_repository_button: bool,
    pub button_label: String,
    /// Workspace names matching any of these regexes render as the idle
    /// literal instead of their real name.
    pub hide_workspace_patterns: Vec<String>,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            show_details: true,
            show_state: true,
            show_elapsed_time: true,
            suppress_file_icon: false,
            swap_images: false,
            show_repository_button: true,
            button_label: "View Repository".into(),
            hide_workspace_patterns: Vec::new(),
        }
    }
}
