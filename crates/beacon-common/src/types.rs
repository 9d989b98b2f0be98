use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Snapshot of the document currently focused in the host editor.
///
/// Produced by the editor's companion plugin; `line` and `column` are
/// 1-based, matching what the editor shows in its own status bar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentContext {
    pub path: PathBuf,
    pub language_id: String,
    #[serde(default = "one")]
    pub line: u32,
    #[serde(default = "one")]
    pub column: u32,
    #[serde(default)]
    pub line_count: u32,
}

fn one() -> u32 {
    1
}

/// The workspace the host editor has open, if any.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkspaceContext {
    pub name: String,
    /// Name of the workspace folder the active document belongs to, when
    /// it differs from the workspace name (multi-root workspaces).
    #[serde(default)]
    pub folder: Option<String>,
    pub root: PathBuf,
    /// Remote/container authority (e.g. "ssh-remote"), when the editor is
    /// attached to one.
    #[serde(default)]
    pub remote_name: Option<String>,
}

impl DocumentContext {
    /// File name component, lossy-decoded.
    pub fn file_name(&self) -> Option<String> {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
    }

    /// Name of the directory directly containing the file.
    pub fn dir_name(&self) -> Option<String> {
        self.path
            .parent()
            .and_then(|p| p.file_name())
            .map(|n| n.to_string_lossy().into_owned())
    }

    /// Full directory path of the file.
    pub fn full_dir(&self) -> Option<String> {
        self.path
            .parent()
            .map(|p| p.to_string_lossy().into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(path: &str) -> DocumentContext {
        DocumentContext {
            path: PathBuf::from(path),
            language_id: "rust".into(),
            line: 10,
            column: 4,
            line_count: 200,
        }
    }

    #[test]
    fn file_name_and_dir_components() {
        let d = doc("/home/alice/project/src/main.rs");
        assert_eq!(d.file_name().as_deref(), Some("main.rs"));
        assert_eq!(d.dir_name().as_deref(), Some("src"));
        assert_eq!(d.full_dir().as_deref(), Some("/home/alice/project/src"));
    }

    #[test]
    fn bare_file_has_no_dir_name() {
        let d = doc("main.rs");
        assert_eq!(d.file_name().as_deref(), Some("main.rs"));
        assert_eq!(d.dir_name(), None);
    }

    #[test]
    fn document_deserializes_with_position_defaults() {
        let json = r#"{"path": "/tmp/a.py", "language_id": "python"}"#;
        let d: DocumentContext = serde_json::from_str(json).unwrap();
        assert_eq!(d.line, 1);
        assert_eq!(d.column, 1);
        assert_eq!(d.line_count, 0);
    }

    #[test]
    fn workspace_deserializes_without_optionals() {
        let json = r#"{"name": "beacon", "root": "/home/alice/beacon"}"#;
        let w: WorkspaceContext = serde_json::from_str(json).unwrap();
        assert_eq!(w.name, "beacon");
        assert!(w.folder.is_none());
        assert!(w.remote_name.is_none());
    }
}
