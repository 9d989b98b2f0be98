//! Transport seam and production socket discovery.
//!
//! The channel splits into a writer and a reader half so the connection
//! task can wait on incoming frames and host commands at the same time.

use std::path::PathBuf;

use async_trait::async_trait;
use beacon_common::TransportError;
use serde_json::Value;
use tokio::io::{AsyncRead, AsyncWrite};
use tracing::debug;

use super::wire::{read_frame, write_frame, Opcode};

#[async_trait]
pub trait WireWriter: Send {
    async fn send(&mut self, opcode: Opcode, payload: &Value) -> Result<(), TransportError>;
}

#[async_trait]
pub trait WireReader: Send {
    async fn recv(&mut self) -> Result<(Opcode, Value), TransportError>;
}

pub type WirePair = (Box<dyn WireWriter>, Box<dyn WireReader>);

/// Opens a fresh channel; one call per connection epoch.
#[async_trait]
pub trait Connect: Send + Sync {
    async fn connect(&self) -> Result<WirePair, TransportError>;
}

struct FrameWriter<W> {
    inner: W,
}

struct FrameReader<R> {
    inner: R,
}

#[async_trait]
impl<W> WireWriter for FrameWriter<W>
where
    W: AsyncWrite + Unpin + Send,
{
    async fn send(&mut self, opcode: Opcode, payload: &Value) -> Result<(), TransportError> {
        write_frame(&mut self.inner, opcode, payload).await
    }
}

#[async_trait]
impl<R> WireReader for FrameReader<R>
where
    R: AsyncRead + Unpin + Send,
{
    async fn recv(&mut self) -> Result<(Opcode, Value), TransportError> {
        read_frame(&mut self.inner).await
    }
}

/// Frame a raw byte stream into a [`WirePair`].
pub fn split_stream<S>(stream: S) -> WirePair
where
    S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    let (reader, writer) = tokio::io::split(stream);
    (
        Box::new(FrameWriter { inner: writer }),
        Box::new(FrameReader { inner: reader }),
    )
}

/// The well-known socket locations, in probe order: each base directory
/// the peer might use, with slots 0 through 9.
pub fn candidate_socket_paths() -> Vec<PathBuf> {
    let mut bases: Vec<PathBuf> = Vec::new();
    for var in ["XDG_RUNTIME_DIR", "TMPDIR", "TMP", "TEMP"] {
        if let Ok(dir) = std::env::var(var) {
            if !dir.is_empty() {
                bases.push(PathBuf::from(dir));
            }
        }
    }
    bases.push(PathBuf::from("/tmp"));
    bases.dedup();

    let mut paths = Vec::with_capacity(bases.len() * 10);
    for base in bases {
        for slot in 0..10 {
            paths.push(base.join(format!("discord-ipc-{slot}")));
        }
    }
    paths
}

/// Production connector: probes the well-known socket paths.
#[derive(Default)]
pub struct IpcSocketConnector;

impl IpcSocketConnector {
    pub fn new() -> Self {
        Self
    }
}

#[cfg(unix)]
#[async_trait]
impl Connect for IpcSocketConnector {
    async fn connect(&self) -> Result<WirePair, TransportError> {
        for path in candidate_socket_paths() {
            match tokio::net::UnixStream::connect(&path).await {
                Ok(stream) => {
                    debug!("connected to IPC socket {}", path.display());
                    return Ok(split_stream(stream));
                }
                Err(e) => {
                    debug!("socket {} not connectable: {e}", path.display());
                }
            }
        }
        Err(TransportError::PeerUnavailable(
            "no IPC socket accepted a connection; is the chat client running?".into(),
        ))
    }
}

#[cfg(not(unix))]
#[async_trait]
impl Connect for IpcSocketConnector {
    async fn connect(&self) -> Result<WirePair, TransportError> {
        Err(TransportError::PeerUnavailable(
            "IPC socket transport is only available on unix platforms".into(),
        ))
    }
}
