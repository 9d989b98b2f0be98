use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::types::{DocumentContext, WorkspaceContext};

/// Discrete state-change signals from the host editor.
///
/// The companion plugin emits these; the broadcast session reacts to them.
/// Every variant carries the full new value for its slice of editor state,
/// so handlers never have to query the editor back.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum EditorEvent {
    ActiveEditorChanged(Option<DocumentContext>),
    DocumentEdited(DocumentContext),
    DebugSessionStarted,
    DebugSessionEnded,
    WindowFocusChanged(bool),
    WorkspaceChanged(Option<WorkspaceContext>),
    Shutdown,
    #[serde(other)]
    Unknown,
}

/// Fan-out bus for editor events.
///
/// Receivers are created per connection epoch and must all be dropped
/// before the next epoch subscribes; `receiver_count` exists so that
/// invariant can be asserted.
pub struct EditorBus {
    sender: broadcast::Sender<EditorEvent>,
}

impl EditorBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<EditorEvent> {
        self.sender.subscribe()
    }

    /// Publish an event, returning how many receivers saw it.
    pub fn publish(&self, event: EditorEvent) -> usize {
        self.sender.send(event).unwrap_or(0)
    }

    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn doc() -> DocumentContext {
        DocumentContext {
            path: PathBuf::from("/tmp/lib.rs"),
            language_id: "rust".into(),
            line: 1,
            column: 1,
            line_count: 42,
        }
    }

    #[tokio::test]
    async fn publish_and_receive() {
        let bus = EditorBus::new(16);
        let mut rx = bus.subscribe();

        bus.publish(EditorEvent::DebugSessionStarted);

        let event = rx.recv().await.unwrap();
        assert!(matches!(event, EditorEvent::DebugSessionStarted));
    }

    #[tokio::test]
    async fn multiple_subscribers() {
        let bus = EditorBus::new(16);
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();

        bus.publish(EditorEvent::WindowFocusChanged(false));

        assert!(matches!(
            rx1.recv().await.unwrap(),
            EditorEvent::WindowFocusChanged(false)
        ));
        assert!(matches!(
            rx2.recv().await.unwrap(),
            EditorEvent::WindowFocusChanged(false)
        ));
    }

    #[tokio::test]
    async fn editor_change_carries_document() {
        let bus = EditorBus::new(16);
        let mut rx = bus.subscribe();

        bus.publish(EditorEvent::ActiveEditorChanged(Some(doc())));

        match rx.recv().await.unwrap() {
            EditorEvent::ActiveEditorChanged(Some(d)) => {
                assert_eq!(d.language_id, "rust");
                assert_eq!(d.line_count, 42);
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn publish_returns_zero_with_no_subscribers() {
        let bus = EditorBus::new(16);
        assert_eq!(bus.publish(EditorEvent::Shutdown), 0);
    }

    #[test]
    fn receiver_count_tracks_subscriptions() {
        let bus = EditorBus::new(16);
        assert_eq!(bus.receiver_count(), 0);
        let rx1 = bus.subscribe();
        let rx2 = bus.subscribe();
        assert_eq!(bus.receiver_count(), 2);
        drop(rx1);
        drop(rx2);
        assert_eq!(bus.receiver_count(), 0);
    }

    #[test]
    fn unknown_event_deserializes() {
        let json = r#"{"type":"some_future_event","data":null}"#;
        let event: EditorEvent = serde_json::from_str(json).unwrap();
        assert!(matches!(event, EditorEvent::Unknown));
    }

    #[test]
    fn focus_event_round_trips() {
        let event = EditorEvent::WindowFocusChanged(true);
        let json = serde_json::to_string(&event).unwrap();
        let back: EditorEvent = serde_json::from_str(&json).unwrap();
        assert!(matches!(back, EditorEvent::WindowFocusChanged(true)));
    }
}
