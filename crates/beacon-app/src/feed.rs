//! Stdin feed: the editor's companion plugin writes one JSON object per
//! line — either an editor event or a control command.
//!
//! Editor events use the `EditorEvent` wire shape, e.g.
//! `{"type":"window_focus_changed","data":false}`; commands look like
//! `{"type":"command","data":"reconnect"}`.

use std::path::Path;
use std::sync::Arc;

use beacon_common::{EditorBus, EditorEvent};
use beacon_presence::{Coordinator, SessionHandle};
use serde::Deserialize;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info, warn};

use crate::commands;

// Control must come first: EditorEvent swallows unknown `type`s.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum FeedMessage {
    Control(ControlMessage),
    Editor(EditorEvent),
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
enum ControlMessage {
    Command(HostCommand),
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "snake_case")]
enum HostCommand {
    Reconnect,
    Disconnect,
    Enable,
    Disable,
    SetActive,
}

/// Pump stdin until the host closes it or sends a shutdown event.
pub async fn run_feed(
    bus: &Arc<EditorBus>,
    session: &SessionHandle,
    coordinator: &Arc<Coordinator>,
    config_path: &Path,
) {
    let stdin = BufReader::new(tokio::io::stdin());
    let mut lines = stdin.lines();

    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => {
                info!("editor feed closed");
                break;
            }
            Err(e) => {
                warn!("editor feed read error: {e}");
                break;
            }
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match serde_json::from_str::<FeedMessage>(line) {
            Ok(FeedMessage::Control(ControlMessage::Command(command))) => {
                dispatch(command, session, coordinator, config_path).await;
            }
            Ok(FeedMessage::Editor(event)) => {
                debug!("editor event: {event:?}");
                let shutdown = matches!(event, EditorEvent::Shutdown);
                bus.publish(event);
                if shutdown {
                    break;
                }
            }
            Err(e) => warn!("unparseable feed line: {e}"),
        }
    }
}

async fn dispatch(
    command: HostCommand,
    session: &SessionHandle,
    coordinator: &Arc<Coordinator>,
    config_path: &Path,
) {
    info!("host command: {command:?}");
    match command {
        HostCommand::Reconnect => session.reconnect().await,
        HostCommand::Disconnect => session.disconnect().await,
        HostCommand::Enable => {
            if let Err(e) = commands::set_enabled(config_path, true) {
                warn!("could not persist enable: {e}");
            }
            session.set_enabled(true).await;
        }
        HostCommand::Disable => {
            if let Err(e) = commands::set_enabled(config_path, false) {
                warn!("could not persist disable: {e}");
            }
            session.set_enabled(false).await;
        }
        HostCommand::SetActive => {
            if let Err(e) = coordinator.set_active() {
                warn!("could not claim active slot: {e}");
            }
        }
    }
}
