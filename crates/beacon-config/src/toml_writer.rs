//! Write BeaconConfig to TOML on disk.
//!
//! Writes go to a `.tmp` sibling first, then rename, so a crash mid-write
//! never leaves a truncated config for the sibling instances watching it.

use std::path::Path;

use beacon_common::ConfigError;
use tracing::debug;

use crate::schema::BeaconConfig;
use crate::toml_loader::load_from_path;

/// Write config to a specific path, creating parent directories.
pub fn save_config_to_path(config: &BeaconConfig, path: &Path) -> Result<(), ConfigError> {
    let toml_str = toml::to_string_pretty(config)
        .map_err(|e| ConfigError::WriteError(format!("failed to serialize config: {e}")))?;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| {
            ConfigError::WriteError(format!(
                "failed to create config directory {}: {e}",
                parent.display()
            ))
        })?;
    }

    let tmp_path = path.with_extension("toml.tmp");
    std::fs::write(&tmp_path, &toml_str).map_err(|e| {
        ConfigError::WriteError(format!("failed to write {}: {e}", tmp_path.display()))
    })?;

    if let Err(e) = std::fs::rename(&tmp_path, path) {
        // Rename can fail across filesystems; fall back to a direct write.
        tracing::warn!("atomic rename failed ({e}), falling back to direct write");
        std::fs::write(path, &toml_str).map_err(|e2| {
            ConfigError::WriteError(format!("failed to write {}: {e2}", path.display()))
        })?;
    }

    debug!(path = %path.display(), "config saved");
    Ok(())
}

/// Read-modify-write a config file.
///
/// This is the primitive behind the active-instance claim and the
/// enable/disable commands: load current contents (defaults if the file
/// is missing), apply the mutation, save atomically. Last writer wins by
/// design; there is no cross-process lock.
pub fn mutate_config_at<F>(path: &Path, mutate: F) -> Result<BeaconConfig, ConfigError>
where
    F: FnOnce(&mut BeaconConfig),
{
    let mut config = match load_from_path(path) {
        Ok(c) => c,
        Err(ConfigError::FileNotFound(_)) => BeaconConfig::default(),
        Err(e) => return Err(e),
    };
    mutate(&mut config);
    save_config_to_path(&config, path)?;
    Ok(config)
}
