use std::time::{SystemTime, UNIX_EPOCH};

/// Milliseconds since the Unix epoch.
pub fn epoch_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

/// Generate an id for this running instance: `{pid}-{epoch_ms}-{suffix}`.
///
/// The pid and timestamp make collisions across one machine practically
/// impossible; the random suffix covers pid reuse after reboot.
pub fn new_instance_id() -> String {
    format!(
        "{}-{}-{}",
        std::process::id(),
        epoch_millis(),
        random_suffix()
    )
}

/// Short 8-hex-char random suffix.
pub fn random_suffix() -> String {
    let uuid = uuid::Uuid::new_v4();
    let bytes = uuid.as_bytes();
    format!(
        "{:02x}{:02x}{:02x}{:02x}",
        bytes[0], bytes[1], bytes[2], bytes[3]
    )
}
