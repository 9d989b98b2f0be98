//! Thin command dispatch: each command is a config or store mutation
//! that the core (or a sibling instance's watcher) picks up.

use std::path::Path;

use beacon_common::ConfigError;
use beacon_config::{load_from_path, mutate_config_at};
use beacon_presence::coordinator::{pid_alive, FsInstanceStore, InstanceStore};

/// Flip the master toggle. A running instance notices through its config
/// watcher and connects or clears accordingly.
pub fn set_enabled(config_path: &Path, enabled: bool) -> Result<(), ConfigError> {
    mutate_config_at(config_path, |c| c.app.enabled = enabled)?;
    println!("presence {}", if enabled { "enabled" } else { "disabled" });
    Ok(())
}

/// Make `id` the active broadcaster (last writer wins).
pub fn set_active(config_path: &Path, id: &str) -> Result<(), ConfigError> {
    mutate_config_at(config_path, |c| {
        c.coordination.active_instance = id.to_string();
    })?;
    println!("active instance set to {id}");
    Ok(())
}

/// Print the available instances: fresh heartbeat and a live process.
pub async fn print_instances(config_path: &Path) {
    let active_id = load_from_path(config_path)
        .map(|c| c.coordination.active_instance)
        .unwrap_or_default();

    let store = FsInstanceStore::new(FsInstanceStore::default_dir());
    let records = match store.list().await {
        Ok(records) => records,
        Err(e) => {
            eprintln!("could not read instance store: {e}");
            return;
        }
    };

    let now_ms = beacon_common::id::epoch_millis();
    let mut shown = 0;
    for record in records {
        if record.is_stale(now_ms) || !pid_alive(record.pid) {
            continue;
        }
        let marker = if record.id == active_id { "*" } else { " " };
        let age_secs = now_ms.saturating_sub(record.timestamp) / 1000;
        println!(
            "{marker} {}  pid {}  {}  heartbeat {age_secs}s ago",
            record.id, record.pid, record.workspace_name
        );
        shown += 1;
    }
    if shown == 0 {
        println!("no running instances");
    }
}
