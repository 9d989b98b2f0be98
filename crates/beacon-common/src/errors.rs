use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("config parse error: {0}")]
    ParseError(String),

    #[error("config validation error: {0}")]
    ValidationError(String),

    #[error("config watch error: {0}")]
    WatchError(String),

    #[error("config write error: {0}")]
    WriteError(String),
}

/// Failures on the RPC channel to the chat client. These are the only
/// errors that may reach the user; everything else degrades silently.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("chat client not reachable: {0}")]
    PeerUnavailable(String),

    #[error("handshake rejected: {0}")]
    Handshake(String),

    #[error("protocol error: {0}")]
    Protocol(String),

    #[error("connection closed: {0}")]
    Closed(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl TransportError {
    /// True when the peer application itself is not running, as opposed
    /// to a failure on an established channel. Drives user-facing wording.
    pub fn is_peer_unavailable(&self) -> bool {
        matches!(self, TransportError::PeerUnavailable(_))
    }
}

/// Editor/git context lookups that failed. Logged only; the affected
/// substitution token falls back to its placeholder.
#[derive(Debug, thiserror::Error)]
pub enum ContextError {
    #[error("git lookup failed: {0}")]
    Git(String),

    #[error("file metadata lookup failed: {0}")]
    FileMetadata(String),

    #[error("path resolution failed: {0}")]
    Path(String),
}

/// Instance-store failures. Logged only; the asking instance degrades to
/// treating itself as the sole instance.
#[derive(Debug, thiserror::Error)]
pub enum CoordinationError {
    #[error("instance store read failed: {0}")]
    Read(String),

    #[error("instance store write failed: {0}")]
    Write(String),

    #[error("instance record malformed: {0}")]
    Malformed(String),
}

#[derive(Debug, thiserror::Error)]
pub enum BeaconError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Context(#[from] ContextError),

    #[error(transparent)]
    Coordination(#[from] CoordinationError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}
