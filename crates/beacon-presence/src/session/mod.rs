//! The broadcast session: owns the connection lifecycle, folds editor
//! events into a snapshot, and pushes rebuilt payloads to the peer.
//!
//! The session is an explicit owned object with `start`/`stop` — no
//! module-level connection or payload globals — so tests can run several
//! sessions side by side.

mod runner;

#[cfg(test)]
mod tests;

use std::sync::Arc;

use beacon_common::{EditorBus, TransportError};
use beacon_config::BeaconConfig;
use tokio::sync::{mpsc, watch};

use crate::coordinator::Coordinator;
use crate::git::RepoProvider;
use crate::rpc::{Connect, ConnectionState};

/// Everything a session needs injected.
pub struct SessionDeps {
    pub bus: Arc<EditorBus>,
    pub config_rx: watch::Receiver<BeaconConfig>,
    pub connector: Arc<dyn Connect>,
    /// Source-control integration. `None` derives repositories from the
    /// current workspace root.
    pub repo_provider: Option<Arc<dyn RepoProvider>>,
    pub coordinator: Arc<Coordinator>,
}

/// Host-surface commands dispatched into the running session.
#[derive(Debug)]
pub enum SessionCommand {
    Reconnect,
    Disconnect,
    SetEnabled(bool),
    Stop,
}

/// What the session reports back to the host surface.
#[derive(Debug)]
pub enum SessionEvent {
    Ready,
    Disconnected { reason: String },
    /// Connect or in-band transport failure; the only error class that
    /// may become a user-facing notification.
    TransportFailure(TransportError),
    Reconnecting { delay_secs: u64 },
    IdleCleared,
}

pub struct SessionHandle {
    command_tx: mpsc::Sender<SessionCommand>,
    state_rx: watch::Receiver<ConnectionState>,
    task: tokio::task::JoinHandle<()>,
}

impl SessionHandle {
    pub async fn reconnect(&self) {
        let _ = self.command_tx.send(SessionCommand::Reconnect).await;
    }

    pub async fn disconnect(&self) {
        let _ = self.command_tx.send(SessionCommand::Disconnect).await;
    }

    pub async fn set_enabled(&self, enabled: bool) {
        let _ = self
            .command_tx
            .send(SessionCommand::SetEnabled(enabled))
            .await;
    }

    pub fn connection_state(&self) -> ConnectionState {
        *self.state_rx.borrow()
    }

    /// Graceful stop: clears the presence, closes the channel, removes
    /// the instance record.
    pub async fn stop(self) {
        let _ = self.command_tx.send(SessionCommand::Stop).await;
        let _ = self.task.await;
    }
}

pub struct PresenceSession;

impl PresenceSession {
    /// Spawn the session loop. Returns the control handle and the event
    /// stream for the host surface.
    pub fn start(deps: SessionDeps) -> (SessionHandle, mpsc::Receiver<SessionEvent>) {
        let (command_tx, command_rx) = mpsc::channel(16);
        let (event_tx, event_rx) = mpsc::channel(64);
        let (state_tx, state_rx) = watch::channel(ConnectionState::Disconnected);

        let task = tokio::spawn(runner::run(deps, command_rx, event_tx, state_tx));

        (
            SessionHandle {
                command_tx,
                state_rx,
                task,
            },
            event_rx,
        )
    }
}
