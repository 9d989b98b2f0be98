//! Live config reloading.
//!
//! Watches the config file and publishes each successfully reloaded
//! config over a [`tokio::sync::watch`] channel. Reload failures keep the
//! previous config in place.

use std::path::PathBuf;

use tokio::sync::{broadcast, watch};
use tracing::{error, info, warn};

use crate::schema::BeaconConfig;
use crate::toml_loader;
use crate::validation;
use crate::watcher::ConfigWatcher;

pub struct ReloadManager {
    config_path: PathBuf,
}

impl ReloadManager {
    /// Load the initial config from `config_path` and start watching for
    /// changes. Returns the initial config and a receiver of updates.
    pub async fn start(config_path: PathBuf) -> (BeaconConfig, watch::Receiver<BeaconConfig>) {
        let initial = match toml_loader::load_from_path(&config_path) {
            Ok(config) => {
                if let Err(e) = validation::validate(&config) {
                    warn!("config validation: {e}");
                }
                config
            }
            Err(e) => {
                warn!("failed to load config: {e}, using defaults");
                BeaconConfig::default()
            }
        };

        let (config_tx, config_rx) = watch::channel(initial.clone());

        let manager = ReloadManager { config_path };
        tokio::spawn(async move {
            manager.run_watch_loop(config_tx).await;
        });

        (initial, config_rx)
    }

    async fn run_watch_loop(&self, config_tx: watch::Sender<BeaconConfig>) {
        let watcher = ConfigWatcher::new(self.config_path.clone());
        let (change_tx, mut change_rx) = broadcast::channel::<()>(16);

        tokio::spawn(async move {
            if let Err(e) = watcher.watch(change_tx).await {
                error!("config watcher error: {e}");
            }
        });

        loop {
            match change_rx.recv().await {
                Ok(()) => {
                    info!("reloading config from {}", self.config_path.display());
                    match self.reload() {
                        Ok(config) => {
                            if config_tx.send(config).is_err() {
                                info!("all config receivers dropped, stopping reload manager");
                                break;
                            }
                        }
                        Err(e) => warn!("config reload failed: {e}"),
                    }
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    warn!("config watcher lagged by {n} events");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    }

    fn reload(&self) -> Result<BeaconConfig, beacon_common::ConfigError> {
        let config = toml_loader::load_from_path(&self.config_path)?;
        if let Err(e) = validation::validate(&config) {
            warn!("config validation: {e}");
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tempfile::TempDir;

    #[tokio::test]
    async fn initial_load_uses_file_contents() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[idle]\ntimeout_secs = 99\n").unwrap();

        let (config, _rx) = ReloadManager::start(path).await;
        assert_eq!(config.idle.timeout_secs, 99);
    }

    #[tokio::test]
    async fn missing_file_falls_back_to_defaults() {
        let dir = TempDir::new().unwrap();
        let (config, _rx) = ReloadManager::start(dir.path().join("absent.toml")).await;
        assert_eq!(config.idle.timeout_secs, 300);
    }

    #[tokio::test]
    async fn file_change_publishes_new_config() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[idle]\ntimeout_secs = 10\n").unwrap();

        let (_config, mut rx) = ReloadManager::start(path.clone()).await;

        tokio::time::sleep(Duration::from_millis(200)).await;
        std::fs::write(&path, "[idle]\ntimeout_secs = 20\n").unwrap();

        let changed = tokio::time::timeout(Duration::from_secs(5), rx.changed()).await;
        assert!(changed.is_ok());
        assert_eq!(rx.borrow().idle.timeout_secs, 20);
    }
}
