use crate::errors::TransportError;

/// Severity level for user-facing notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Warning,
    Error,
}

/// A notification surfaced to the user by the host surface.
///
/// Only transport-level failures produce these; context and coordination
/// failures are logged and degrade silently.
#[derive(Debug, Clone)]
pub struct Notification {
    pub level: NotificationLevel,
    pub title: String,
    pub body: String,
}

impl Notification {
    pub fn info(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Info,
            title: title.into(),
            body: body.into(),
        }
    }

    pub fn warning(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Warning,
            title: title.into(),
            body: body.into(),
        }
    }

    pub fn error(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Error,
            title: title.into(),
            body: body.into(),
        }
    }

    /// Wording for a connection failure. "Peer not running" reads very
    /// differently from a broken channel, so the two get distinct text.
    pub fn from_transport_error(err: &TransportError) -> Self {
        if err.is_peer_unavailable() {
            Self::warning(
                "Chat client not running",
                "Start the chat client and use the reconnect command.",
            )
        } else {
            Self::error("Presence connection failed", err.to_string())
        }
    }
}
