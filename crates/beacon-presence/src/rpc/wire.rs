//! Frame codec: `u32le opcode, u32le length, JSON body`.

use beacon_common::TransportError;
use serde_json::Value;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Upper bound on a single frame body; anything larger is a protocol
/// violation, not a payload we could ever produce.
pub const MAX_FRAME_LEN: usize = 64 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Opcode {
    Handshake,
    Frame,
    Close,
    Ping,
    Pong,
}

impl Opcode {
    pub fn as_u32(self) -> u32 {
        match self {
            Opcode::Handshake => 0,
            Opcode::Frame => 1,
            Opcode::Close => 2,
            Opcode::Ping => 3,
            Opcode::Pong => 4,
        }
    }

    pub fn from_u32(value: u32) -> Option<Self> {
        match value {
            0 => Some(Opcode::Handshake),
            1 => Some(Opcode::Frame),
            2 => Some(Opcode::Close),
            3 => Some(Opcode::Ping),
            4 => Some(Opcode::Pong),
            _ => None,
        }
    }
}

pub fn encode_frame(opcode: Opcode, payload: &Value) -> Result<Vec<u8>, TransportError> {
    let body = serde_json::to_vec(payload)
        .map_err(|e| TransportError::Protocol(format!("failed to encode frame body: {e}")))?;
    let mut frame = Vec::with_capacity(8 + body.len());
    frame.extend_from_slice(&opcode.as_u32().to_le_bytes());
    frame.extend_from_slice(&(body.len() as u32).to_le_bytes());
    frame.extend_from_slice(&body);
    Ok(frame)
}

pub async fn write_frame<W>(
    writer: &mut W,
    opcode: Opcode,
    payload: &Value,
) -> Result<(), TransportError>
where
    W: AsyncWrite + Unpin,
{
    let frame = encode_frame(opcode, payload)?;
    writer.write_all(&frame).await?;
    writer.flush().await?;
    Ok(())
}

pub async fn read_frame<R>(reader: &mut R) -> Result<(Opcode, Value), TransportError>
where
    R: AsyncRead + Unpin,
{
    let mut header = [0u8; 8];
    reader.read_exact(&mut header).await.map_err(map_eof)?;

    let opcode_raw = u32::from_le_bytes([header[0], header[1], header[2], header[3]]);
    let len = u32::from_le_bytes([header[4], header[5], header[6], header[7]]) as usize;

    let opcode = Opcode::from_u32(opcode_raw)
        .ok_or_else(|| TransportError::Protocol(format!("unknown opcode {opcode_raw}")))?;
    if len > MAX_FRAME_LEN {
        return Err(TransportError::Protocol(format!(
            "frame length {len} exceeds limit {MAX_FRAME_LEN}"
        )));
    }

    let mut body = vec![0u8; len];
    reader.read_exact(&mut body).await.map_err(map_eof)?;

    let payload = serde_json::from_slice(&body)
        .map_err(|e| TransportError::Protocol(format!("malformed frame body: {e}")))?;
    Ok((opcode, payload))
}

fn map_eof(e: std::io::Error) -> TransportError {
    if e.kind() == std::io::ErrorKind::UnexpectedEof {
        TransportError::Closed("channel closed by peer".into())
    } else {
        TransportError::Io(e)
    }
}
