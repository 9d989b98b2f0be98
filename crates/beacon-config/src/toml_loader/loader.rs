//! Core TOML config loading: read from path or platform default.

use std::path::Path;

use beacon_common::ConfigError;
use tracing::{debug, info};

use crate::schema::BeaconConfig;

use super::paths::{create_default_config, default_config_path};

/// Load config from a specific TOML file path.
///
/// Missing fields take serde defaults; validation happens at the caller
/// so a config with out-of-range values still loads.
pub fn load_from_path(path: &Path) -> Result<BeaconConfig, ConfigError> {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(ConfigError::FileNotFound(path.to_path_buf()));
        }
        Err(e) => {
            return Err(ConfigError::ParseError(format!(
                "failed to read {}: {e}",
                path.display()
            )));
        }
    };

    let config: BeaconConfig = toml::from_str(&content)
        .map_err(|e| ConfigError::ParseError(format!("failed to parse TOML: {e}")))?;

    debug!("loaded config from {}", path.display());
    Ok(config)
}

/// Load config from the platform default path.
///
/// If the file does not exist yet, a commented default config is written
/// and defaults are returned.
pub fn load_default() -> Result<BeaconConfig, ConfigError> {
    let path = default_config_path()?;

    match load_from_path(&path) {
        Ok(config) => Ok(config),
        Err(ConfigError::FileNotFound(_)) => {
            info!("no config found at {}, creating default", path.display());
            create_default_config(&path)?;
            Ok(BeaconConfig::default())
        }
        Err(e) => Err(e),
    }
}
