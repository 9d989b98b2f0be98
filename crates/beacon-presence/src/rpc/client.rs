//! Handle for one connection epoch.
//!
//! All methods are non-blocking sends to the background connection task.
//! Dropping or aborting the handle ends the epoch; the next connection is
//! a fresh handshake through a fresh handle.

use tokio::sync::mpsc;

use crate::activity::Activity;

use super::connection::run_connection;
use super::socket::WirePair;
use super::types::{RpcCommand, RpcConfig, RpcEvent};

pub struct RpcClient {
    command_tx: mpsc::Sender<RpcCommand>,
    task: tokio::task::JoinHandle<()>,
}

impl RpcClient {
    /// Start the connection task over an already-opened wire. Returns the
    /// handle and the event stream for this epoch; the first event is
    /// either `Ready` or a handshake `Disconnected`.
    pub fn start(config: RpcConfig, wire: WirePair) -> (Self, mpsc::Receiver<RpcEvent>) {
        let (event_tx, event_rx) = mpsc::channel(64);
        let (command_tx, command_rx) = mpsc::channel(32);
        let (writer, reader) = wire;

        let task = tokio::spawn(run_connection(config, writer, reader, command_rx, event_tx));

        (Self { command_tx, task }, event_rx)
    }

    /// Replace the peer's current payload. The latest call wins; nothing
    /// queues.
    pub async fn set_activity(&self, activity: Activity) {
        let _ = self
            .command_tx
            .send(RpcCommand::SetActivity(activity))
            .await;
    }

    /// Clear the payload without closing the channel.
    pub async fn clear_activity(&self) {
        let _ = self.command_tx.send(RpcCommand::ClearActivity).await;
    }

    /// Gracefully close the channel.
    pub async fn disconnect(&self) {
        let _ = self.command_tx.send(RpcCommand::Disconnect).await;
    }

    /// Hard-stop the epoch task. Used during teardown so a stale epoch
    /// can never deliver another frame.
    pub fn abort(&self) {
        self.task.abort();
    }
}
