//! Configuration, commands, and events for the RPC client.

use serde_json::{json, Value};

use crate::activity::Activity;

#[derive(Debug, Clone)]
pub struct RpcConfig {
    /// Application id sent in the handshake.
    pub application_id: String,
}

/// Connection lifecycle as tracked by the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
    /// Connected, but the payload was cleared by the idle timer.
    IdleCleared,
}

/// Commands from the session to the connection task.
#[derive(Debug)]
pub enum RpcCommand {
    SetActivity(Activity),
    ClearActivity,
    Disconnect,
}

/// Events from the connection task to the session.
#[derive(Debug)]
pub enum RpcEvent {
    /// Handshake acknowledged; the channel is live.
    Ready,
    /// The peer rejected a frame but the channel stays up.
    ProtocolError(String),
    /// The epoch ended; a new connect is required.
    Disconnected { reason: String },
}

/// Body of a "set current activity" call. `None` clears the payload: the
/// peer silently replaces whatever was set before either way.
pub(crate) fn set_activity_body(pid: u32, activity: Option<&Activity>) -> Value {
    json!({
        "cmd": "SET_ACTIVITY",
        "args": {
            "pid": pid,
            "activity": activity,
        },
        "nonce": uuid::Uuid::new_v4().to_string(),
    })
}

pub(crate) fn handshake_body(application_id: &str) -> Value {
    json!({ "v": 1, "client_id": application_id })
}
