//! One connection epoch: handshake, then forward commands and answer the
//! peer until either side ends the channel.

use std::time::Duration;

use serde_json::{json, Value};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use super::socket::{WireReader, WireWriter};
use super::types::{handshake_body, set_activity_body, RpcCommand, RpcConfig, RpcEvent};
use super::wire::Opcode;

const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(10);

pub(crate) async fn run_connection(
    config: RpcConfig,
    mut writer: Box<dyn WireWriter>,
    mut reader: Box<dyn WireReader>,
    mut command_rx: mpsc::Receiver<RpcCommand>,
    event_tx: mpsc::Sender<RpcEvent>,
) {
    if let Err(e) = handshake(&config, writer.as_mut(), reader.as_mut()).await {
        let _ = event_tx
            .send(RpcEvent::Disconnected {
                reason: e.to_string(),
            })
            .await;
        return;
    }
    let _ = event_tx.send(RpcEvent::Ready).await;

    let pid = std::process::id();
    loop {
        tokio::select! {
            cmd = command_rx.recv() => match cmd {
                Some(RpcCommand::SetActivity(activity)) => {
                    let body = set_activity_body(pid, Some(&activity));
                    if let Err(e) = writer.send(Opcode::Frame, &body).await {
                        let _ = event_tx.send(RpcEvent::Disconnected { reason: e.to_string() }).await;
                        return;
                    }
                }
                Some(RpcCommand::ClearActivity) => {
                    let body = set_activity_body(pid, None);
                    if let Err(e) = writer.send(Opcode::Frame, &body).await {
                        let _ = event_tx.send(RpcEvent::Disconnected { reason: e.to_string() }).await;
                        return;
                    }
                }
                Some(RpcCommand::Disconnect) | None => {
                    // Graceful close; the peer drops the payload with us.
                    let _ = writer.send(Opcode::Close, &json!({})).await;
                    let _ = event_tx.send(RpcEvent::Disconnected { reason: "closed by host".into() }).await;
                    return;
                }
            },
            frame = reader.recv() => match frame {
                Ok((Opcode::Ping, payload)) => {
                    if let Err(e) = writer.send(Opcode::Pong, &payload).await {
                        let _ = event_tx.send(RpcEvent::Disconnected { reason: e.to_string() }).await;
                        return;
                    }
                }
                Ok((Opcode::Close, body)) => {
                    let _ = event_tx.send(RpcEvent::Disconnected { reason: close_reason(&body) }).await;
                    return;
                }
                Ok((Opcode::Frame, body)) => {
                    if body.get("evt").and_then(Value::as_str) == Some("ERROR") {
                        let message = body["data"]["message"]
                            .as_str()
                            .unwrap_or("unspecified error")
                            .to_string();
                        warn!("peer rejected a frame: {message}");
                        let _ = event_tx.send(RpcEvent::ProtocolError(message)).await;
                    } else {
                        debug!("ignoring dispatch frame: {body}");
                    }
                }
                Ok((opcode, _)) => {
                    debug!("ignoring unexpected {opcode:?} frame");
                }
                Err(e) => {
                    let _ = event_tx.send(RpcEvent::Disconnected { reason: e.to_string() }).await;
                    return;
                }
            },
        }
    }
}

async fn handshake(
    config: &RpcConfig,
    writer: &mut dyn WireWriter,
    reader: &mut dyn WireReader,
) -> Result<(), beacon_common::TransportError> {
    use beacon_common::TransportError;

    writer
        .send(Opcode::Handshake, &handshake_body(&config.application_id))
        .await?;

    let response = tokio::time::timeout(HANDSHAKE_TIMEOUT, reader.recv())
        .await
        .map_err(|_| TransportError::Handshake("timed out waiting for ready".into()))??;

    match response {
        (Opcode::Frame, body) if is_ready(&body) => Ok(()),
        (Opcode::Close, body) => Err(TransportError::Handshake(close_reason(&body))),
        (opcode, body) => Err(TransportError::Handshake(format!(
            "unexpected {opcode:?} frame during handshake: {body}"
        ))),
    }
}

fn is_ready(body: &Value) -> bool {
    body.get("cmd").and_then(Value::as_str) == Some("DISPATCH")
        && body.get("evt").and_then(Value::as_str) == Some("READY")
}

fn close_reason(body: &Value) -> String {
    body.get("message")
        .and_then(Value::as_str)
        .unwrap_or("closed by peer")
        .to_string()
}
