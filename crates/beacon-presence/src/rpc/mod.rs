//! RPC channel to the chat client.
//!
//! The peer speaks a simple framed protocol over a local socket:
//! little-endian opcode + length, then a JSON body. One connection epoch
//! at a time; reconnecting always means a brand new handshake.

mod client;
mod connection;
mod socket;
mod types;
mod wire;

#[cfg(test)]
pub(crate) mod fake;

pub use client::RpcClient;
pub use socket::{
    candidate_socket_paths, split_stream, Connect, IpcSocketConnector, WirePair, WireReader,
    WireWriter,
};
pub use types::{ConnectionState, RpcCommand, RpcConfig, RpcEvent};
pub use wire::{Opcode, MAX_FRAME_LEN};
