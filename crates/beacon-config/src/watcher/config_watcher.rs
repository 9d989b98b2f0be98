//! Config file watcher built on the `notify` crate.
//!
//! Watches the parent directory (editors and our own atomic writer
//! replace the file by rename, which would orphan a file-level watch)
//! and debounces bursts into a single change signal.

use std::ffi::OsString;
use std::path::PathBuf;
use std::time::Duration;

use beacon_common::ConfigError;
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, error, info, warn};

const DEBOUNCE_WINDOW: Duration = Duration::from_millis(400);

/// Watches a config file for changes and sends `()` on a broadcast
/// channel whenever it settles after a modification.
pub struct ConfigWatcher {
    path: PathBuf,
}

impl ConfigWatcher {
    pub fn new(path: PathBuf) -> Self {
        if !path.exists() {
            warn!(
                "config file {} does not exist yet, will watch for creation",
                path.display()
            );
        }
        Self { path }
    }

    /// Run the watch loop until every receiver is gone.
    pub async fn watch(&self, tx: broadcast::Sender<()>) -> Result<(), ConfigError> {
        let watch_dir = self
            .path
            .parent()
            .map(|p| p.to_path_buf())
            .unwrap_or_else(|| self.path.clone());
        let file_name: OsString = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();

        info!("watching config file {}", self.path.display());

        // Bridge the sync notify callback into async.
        let (raw_tx, mut raw_rx) = mpsc::channel::<()>(16);

        let mut watcher = {
            let file_name = file_name.clone();
            RecommendedWatcher::new(
                move |result: Result<Event, notify::Error>| match result {
                    Ok(event) => {
                        let relevant = matches!(
                            event.kind,
                            EventKind::Modify(_) | EventKind::Create(_) | EventKind::Remove(_)
                        );
                        let ours = event
                            .paths
                            .iter()
                            .any(|p| p.file_name().map(|n| n == file_name).unwrap_or(false));
                        if relevant && ours {
                            let _ = raw_tx.try_send(());
                        }
                    }
                    Err(e) => error!("config watcher error: {e}"),
                },
                notify::Config::default(),
            )
            .map_err(|e| ConfigError::WatchError(format!("failed to create watcher: {e}")))?
        };

        watcher
            .watch(&watch_dir, RecursiveMode::NonRecursive)
            .map_err(|e| {
                ConfigError::WatchError(format!("failed to watch {}: {e}", watch_dir.display()))
            })?;

        // Debounce: first signal opens a window; anything arriving inside
        // it extends the wait until the file goes quiet.
        loop {
            if raw_rx.recv().await.is_none() {
                return Ok(());
            }

            loop {
                match tokio::time::timeout(DEBOUNCE_WINDOW, raw_rx.recv()).await {
                    Ok(Some(())) => continue,
                    Ok(None) => return Ok(()),
                    Err(_) => break,
                }
            }

            debug!("config file changed");
            if tx.send(()).is_err() {
                // No receivers left; stop watching.
                return Ok(());
            }
        }
    }
}
