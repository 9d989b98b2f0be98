//! Configuration validation.
//!
//! Collects every problem into one error so users see the full list in a
//! single pass. Callers treat failures as warnings: the parsed config is
//! still used.

use beacon_common::ConfigError;

use crate::schema::BeaconConfig;

pub fn validate(config: &BeaconConfig) -> Result<(), ConfigError> {
    let mut errors: Vec<String> = Vec::new();

    validate_app(&mut errors, config);
    validate_timing(&mut errors, config);
    validate_patterns(&mut errors, config);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::ValidationError(errors.join("; ")))
    }
}

fn validate_app(errors: &mut Vec<String>, config: &BeaconConfig) {
    if config.app.application_id.is_empty() {
        errors.push("app.application_id must not be empty".into());
    } else if !config.app.application_id.chars().all(|c| c.is_ascii_digit()) {
        errors.push(format!(
            "app.application_id must be numeric, got '{}'",
            config.app.application_id
        ));
    }
}

fn validate_timing(errors: &mut Vec<String>, config: &BeaconConfig) {
    let conn = &config.connection;
    if !(100..=60_000).contains(&conn.update_throttle_ms) {
        errors.push(format!(
            "connection.update_throttle_ms must be 100-60000, got {}",
            conn.update_throttle_ms
        ));
    }
    if conn.reconnect_delay_secs == 0 {
        errors.push("connection.reconnect_delay_secs must be at least 1".into());
    }
    if conn.max_reconnect_delay_secs < conn.reconnect_delay_secs {
        errors.push(format!(
            "connection.max_reconnect_delay_secs ({}) is below reconnect_delay_secs ({})",
            conn.max_reconnect_delay_secs, conn.reconnect_delay_secs
        ));
    }
    // 0 disables idle clearing, anything else must be a sane duration.
    if config.idle.timeout_secs != 0 && config.idle.timeout_secs < 10 {
        errors.push(format!(
            "idle.timeout_secs must be 0 (disabled) or at least 10, got {}",
            config.idle.timeout_secs
        ));
    }
}

fn validate_patterns(errors: &mut Vec<String>, config: &BeaconConfig) {
    for pattern in &config.display.hide_workspace_patterns {
        if let Err(e) = regex::Regex::new(pattern) {
            errors.push(format!("display.hide_workspace_patterns '{pattern}': {e}"));
        }
    }
}
