//! The session's view of current editor state, folded from the event
//! stream.

use beacon_common::{DocumentContext, EditorEvent, WorkspaceContext};

/// Everything the activity builder needs to know about the editor right
/// now. Updated by [`apply`](EditorSnapshot::apply); each event carries
/// its full new value, so applying is a plain replacement.
#[derive(Debug, Clone, Default)]
pub struct EditorSnapshot {
    pub document: Option<DocumentContext>,
    pub workspace: Option<WorkspaceContext>,
    pub debugging: bool,
    pub focused: bool,
}

impl EditorSnapshot {
    /// Fold an event into the snapshot. Returns `true` when the change
    /// warrants an immediate rebuild (focus changes are handled by the
    /// idle timer instead, document edits by the throttle).
    pub fn apply(&mut self, event: &EditorEvent) -> bool {
        match event {
            EditorEvent::ActiveEditorChanged(doc) => {
                self.document = doc.clone();
                true
            }
            EditorEvent::DocumentEdited(doc) => {
                self.document = Some(doc.clone());
                false
            }
            EditorEvent::DebugSessionStarted => {
                self.debugging = true;
                true
            }
            EditorEvent::DebugSessionEnded => {
                self.debugging = false;
                true
            }
            EditorEvent::WorkspaceChanged(ws) => {
                self.workspace = ws.clone();
                true
            }
            EditorEvent::WindowFocusChanged(focused) => {
                self.focused = *focused;
                false
            }
            EditorEvent::Shutdown | EditorEvent::Unknown => false,
        }
    }
}
