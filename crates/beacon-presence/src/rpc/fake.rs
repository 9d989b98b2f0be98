//! In-process fake peer for tests: speaks the framed protocol over a
//! duplex pipe and records everything the client sends.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use beacon_common::TransportError;
use serde_json::{json, Value};
use tokio::sync::{mpsc, Mutex};

use crate::activity::Activity;

use super::socket::{split_stream, Connect, WirePair};
use super::wire::Opcode;

/// Everything the fake peer observed, shared across connection epochs.
#[derive(Default)]
pub(crate) struct PeerLog {
    pub handshakes: Mutex<Vec<Value>>,
    /// `None` entries are clears (null activity).
    pub activity_calls: Mutex<Vec<Option<Activity>>>,
    pub pongs: AtomicUsize,
}

impl PeerLog {
    pub async fn wait_for_activity_calls(&self, n: usize) -> Vec<Option<Activity>> {
        for _ in 0..500 {
            {
                let calls = self.activity_calls.lock().await;
                if calls.len() >= n {
                    return calls.clone();
                }
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("timed out waiting for {n} activity calls");
    }

    pub async fn activity_count(&self) -> usize {
        self.activity_calls.lock().await.len()
    }
}

pub(crate) enum PeerDirective {
    Ping,
    Close,
}

async fn peer_task(
    wire: WirePair,
    log: Arc<PeerLog>,
    reject: Option<String>,
    mut directive_rx: mpsc::Receiver<PeerDirective>,
) {
    let (mut writer, mut reader) = wire;
    loop {
        tokio::select! {
            directive = directive_rx.recv() => match directive {
                Some(PeerDirective::Ping) => {
                    let _ = writer.send(Opcode::Ping, &json!({"seq": 1})).await;
                }
                Some(PeerDirective::Close) | None => {
                    let _ = writer
                        .send(Opcode::Close, &json!({"message": "peer going away"}))
                        .await;
                    return;
                }
            },
            frame = reader.recv() => match frame {
                Ok((Opcode::Handshake, body)) => {
                    log.handshakes.lock().await.push(body);
                    match &reject {
                        Some(reason) => {
                            let _ = writer
                                .send(Opcode::Close, &json!({"code": 4000, "message": reason}))
                                .await;
                            return;
                        }
                        None => {
                            let _ = writer
                                .send(
                                    Opcode::Frame,
                                    &json!({"cmd": "DISPATCH", "evt": "READY", "data": {"v": 1}}),
                                )
                                .await;
                        }
                    }
                }
                Ok((Opcode::Frame, body)) => {
                    if body["cmd"] == "SET_ACTIVITY" {
                        let raw = body["args"]["activity"].clone();
                        let parsed = if raw.is_null() {
                            None
                        } else {
                            Some(serde_json::from_value(raw).expect("well-formed activity"))
                        };
                        log.activity_calls.lock().await.push(parsed);
                    }
                }
                Ok((Opcode::Pong, _)) => {
                    log.pongs.fetch_add(1, Ordering::SeqCst);
                }
                Ok((Opcode::Close, _)) | Err(_) => return,
                Ok(_) => {}
            },
        }
    }
}

/// A single fake peer, for driving one [`super::RpcClient`] directly.
pub(crate) struct FakePeer {
    log: Arc<PeerLog>,
    directives: mpsc::Sender<PeerDirective>,
    client_wire: std::sync::Mutex<Option<WirePair>>,
}

impl FakePeer {
    pub fn spawn() -> Self {
        Self::spawn_inner(None)
    }

    pub fn spawn_rejecting(reason: &str) -> Self {
        Self::spawn_inner(Some(reason.to_string()))
    }

    fn spawn_inner(reject: Option<String>) -> Self {
        let (client_side, peer_side) = tokio::io::duplex(64 * 1024);
        let log = Arc::new(PeerLog::default());
        let (directives, directive_rx) = mpsc::channel(8);
        tokio::spawn(peer_task(
            split_stream(peer_side),
            Arc::clone(&log),
            reject,
            directive_rx,
        ));
        Self {
            log,
            directives,
            client_wire: std::sync::Mutex::new(Some(split_stream(client_side))),
        }
    }

    pub fn wire(&self) -> WirePair {
        self.client_wire
            .lock()
            .unwrap()
            .take()
            .expect("wire already taken")
    }

    pub async fn handshakes(&self) -> Vec<Value> {
        self.log.handshakes.lock().await.clone()
    }

    pub async fn wait_for_activity_calls(&self, n: usize) -> Vec<Option<Activity>> {
        self.log.wait_for_activity_calls(n).await
    }

    pub async fn close(&self) {
        let _ = self.directives.send(PeerDirective::Close).await;
    }

    pub async fn ping(&self) {
        let _ = self.directives.send(PeerDirective::Ping).await;
    }

    pub async fn wait_for_pong(&self) -> bool {
        for _ in 0..500 {
            if self.log.pongs.load(Ordering::SeqCst) > 0 {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        false
    }
}

/// A connector producing a fresh fake peer per epoch, with one shared
/// log. This is what session tests inject.
pub(crate) struct FakeConnect {
    pub log: Arc<PeerLog>,
    connects: AtomicUsize,
    failing: AtomicBool,
    current: Mutex<Option<mpsc::Sender<PeerDirective>>>,
}

impl FakeConnect {
    pub fn new() -> Self {
        Self {
            log: Arc::new(PeerLog::default()),
            connects: AtomicUsize::new(0),
            failing: AtomicBool::new(false),
            current: Mutex::new(None),
        }
    }

    pub fn connect_count(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Make the current epoch's peer close the channel.
    pub async fn close_current(&self) {
        if let Some(directives) = self.current.lock().await.as_ref() {
            let _ = directives.send(PeerDirective::Close).await;
        }
    }
}

#[async_trait]
impl Connect for FakeConnect {
    async fn connect(&self) -> Result<WirePair, TransportError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(TransportError::PeerUnavailable("fake peer offline".into()));
        }
        self.connects.fetch_add(1, Ordering::SeqCst);

        let (client_side, peer_side) = tokio::io::duplex(64 * 1024);
        let (directives, directive_rx) = mpsc::channel(8);
        tokio::spawn(peer_task(
            split_stream(peer_side),
            Arc::clone(&self.log),
            None,
            directive_rx,
        ));
        *self.current.lock().await = Some(directives);
        Ok(split_stream(client_side))
    }
}
