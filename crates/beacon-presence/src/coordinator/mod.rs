//! Multi-instance coordination.
//!
//! Several instances of the host editor can share one user profile, but
//! the peer displays a single presence. The coordinator answers "am I the
//! one allowed to broadcast?", tracks the sibling instances through a
//! shared record store, and keeps that store healthy with heartbeats and
//! a staleness sweep.
//!
//! There is deliberately no cross-process lock: claiming the active slot
//! and selecting a new active instance are last-writer-wins on the shared
//! config key, which tolerates a momentary flicker of zero or double
//! broadcasting.

mod record;
mod store;

pub use record::{pid_alive, InstanceRecord, HEARTBEAT_INTERVAL_SECS, STALE_AFTER_MS};
pub use store::{FsInstanceStore, InstanceStore, MemoryInstanceStore};

use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use beacon_common::id::{epoch_millis, new_instance_id};
use beacon_config::schema::CoordinationConfig;
use tracing::{debug, warn};

pub struct Coordinator {
    instance_id: String,
    workspace_name: Mutex<String>,
    store: Arc<dyn InstanceStore>,
    /// Where the shared `coordination.active_instance` key lives. `None`
    /// disables claiming (always active).
    config_path: Option<PathBuf>,
}

impl Coordinator {
    pub fn new(
        store: Arc<dyn InstanceStore>,
        config_path: Option<PathBuf>,
        workspace_name: impl Into<String>,
    ) -> Self {
        Self {
            instance_id: new_instance_id(),
            workspace_name: Mutex::new(workspace_name.into()),
            store,
            config_path,
        }
    }

    pub fn instance_id(&self) -> &str {
        &self.instance_id
    }

    pub fn set_workspace_name(&self, name: impl Into<String>) {
        *self.workspace_name.lock().unwrap() = name.into();
    }

    /// May this instance broadcast right now?
    ///
    /// `coordination` is the caller's current view of the shared config.
    /// With coordination disabled everyone broadcasts. With it enabled,
    /// an unset selector is claimed by the first asker; a write failure
    /// degrades to "sole instance" rather than silencing the presence.
    pub fn is_active(&self, coordination: &CoordinationConfig) -> bool {
        if !coordination.enabled {
            return true;
        }
        if coordination.active_instance == self.instance_id {
            return true;
        }
        if coordination.active_instance.is_empty() {
            return self.claim();
        }
        false
    }

    /// Claim the active slot if it is still unset. Read-modify-write on
    /// the config file; the watcher propagates the result to siblings.
    fn claim(&self) -> bool {
        let Some(path) = self.config_path.as_ref() else {
            return true;
        };
        let mut claimed = false;
        match beacon_config::mutate_config_at(path, |c| {
            if c.coordination.active_instance.is_empty() {
                c.coordination.active_instance = self.instance_id.clone();
                claimed = true;
            } else {
                claimed = c.coordination.active_instance == self.instance_id;
            }
        }) {
            Ok(_) => {
                if claimed {
                    debug!(instance = %self.instance_id, "claimed active slot");
                }
                claimed
            }
            Err(e) => {
                warn!("failed to claim active slot: {e}, broadcasting anyway");
                true
            }
        }
    }

    /// Unconditionally make this instance the active one.
    pub fn set_active(&self) -> Result<(), beacon_common::ConfigError> {
        let Some(path) = self.config_path.as_ref() else {
            return Ok(());
        };
        beacon_config::mutate_config_at(path, |c| {
            c.coordination.active_instance = self.instance_id.clone();
        })?;
        Ok(())
    }

    fn own_record(&self, now_ms: u64) -> InstanceRecord {
        InstanceRecord {
            id: self.instance_id.clone(),
            workspace_name: self.workspace_name.lock().unwrap().clone(),
            timestamp: now_ms,
            pid: std::process::id(),
        }
    }

    /// Rewrite our own record and sweep stale siblings. Store failures
    /// are logged and swallowed; coordination never blocks a broadcast.
    pub async fn heartbeat_once(&self) {
        let now_ms = epoch_millis();
        if let Err(e) = self.store.write(&self.own_record(now_ms)).await {
            warn!("heartbeat write failed: {e}");
        }

        let records = match self.store.list().await {
            Ok(r) => r,
            Err(e) => {
                warn!("heartbeat sweep skipped, store unreadable: {e}");
                return;
            }
        };
        for record in records {
            if record.id != self.instance_id && record.is_stale(now_ms) {
                debug!(instance = %record.id, "sweeping stale instance record");
                if let Err(e) = self.store.remove(&record.id).await {
                    warn!("failed to sweep stale record {}: {e}", record.id);
                }
            }
        }
    }

    /// Run the heartbeat loop until aborted.
    pub fn spawn_heartbeat(self: &Arc<Self>) -> tokio::task::JoinHandle<()> {
        let coordinator = Arc::clone(self);
        tokio::spawn(async move {
            let mut interval =
                tokio::time::interval(Duration::from_secs(HEARTBEAT_INTERVAL_SECS));
            loop {
                interval.tick().await;
                coordinator.heartbeat_once().await;
            }
        })
    }

    /// The instances currently available for selection: fresh heartbeat
    /// AND a live process. A store failure degrades to just ourselves.
    pub async fn list_instances(&self) -> Vec<InstanceRecord> {
        let now_ms = epoch_millis();
        let records = match self.store.list().await {
            Ok(r) => r,
            Err(e) => {
                warn!("instance store unreadable: {e}, listing self only");
                return vec![self.own_record(now_ms)];
            }
        };

        let mut available: Vec<_> = records
            .into_iter()
            .filter(|r| !r.is_stale(now_ms) && pid_alive(r.pid))
            .collect();
        if !available.iter().any(|r| r.id == self.instance_id) {
            available.push(self.own_record(now_ms));
            available.sort_by(|a, b| a.id.cmp(&b.id));
        }
        available
    }

    /// Remove our record on clean shutdown.
    pub async fn shutdown(&self) {
        if let Err(e) = self.store.remove(&self.instance_id).await {
            warn!("failed to remove own instance record: {e}");
        }
    }
}
