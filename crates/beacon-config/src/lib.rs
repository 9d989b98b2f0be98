//! Beacon configuration system.
//!
//! TOML-based configuration with live reload. All sections use serde
//! defaults so a partial (or missing) config file works out of the box.
//! The config file doubles as the shared store for cross-instance
//! coordination: the `coordination.active_instance` key is written by one
//! process and observed by the others through the file watcher.

pub mod reload;
pub mod schema;
pub mod toml_loader;
pub mod toml_writer;
pub mod validation;
pub mod watcher;

pub use reload::ReloadManager;
pub use schema::BeaconConfig;
pub use toml_loader::{default_config_path, load_default, load_from_path};
pub use toml_writer::{mutate_config_at, save_config_to_path};
pub use watcher::ConfigWatcher;

use beacon_common::ConfigError;

/// Load config from the platform default path, creating a commented
/// default file on first run, then validate (warn-and-continue).
pub fn load_config() -> Result<BeaconConfig, ConfigError> {
    let config = toml_loader::load_default()?;
    if let Err(e) = validation::validate(&config) {
        tracing::warn!("config validation: {e}");
    }
    Ok(config)
}
