//! Instance record stores.
//!
//! The store is an injected seam so the coordinator is testable without a
//! filesystem. Production uses one JSON file per instance in a
//! well-known temporary directory; each process writes only its own file.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

use async_trait::async_trait;
use beacon_common::CoordinationError;
use tracing::debug;

use super::record::InstanceRecord;

#[async_trait]
pub trait InstanceStore: Send + Sync {
    async fn list(&self) -> Result<Vec<InstanceRecord>, CoordinationError>;
    async fn write(&self, record: &InstanceRecord) -> Result<(), CoordinationError>;
    async fn remove(&self, id: &str) -> Result<(), CoordinationError>;
}

/// Filesystem store: `<dir>/<instance-id>.json` per live instance.
pub struct FsInstanceStore {
    dir: PathBuf,
}

impl FsInstanceStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The shared default location all instances of one user agree on.
    pub fn default_dir() -> PathBuf {
        std::env::temp_dir().join("beacon-instances")
    }

    fn record_path(&self, id: &str) -> PathBuf {
        self.dir.join(format!("{id}.json"))
    }
}

#[async_trait]
impl InstanceStore for FsInstanceStore {
    async fn list(&self) -> Result<Vec<InstanceRecord>, CoordinationError> {
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(e) => e,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(CoordinationError::Read(e.to_string())),
        };

        let mut records = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| CoordinationError::Read(e.to_string()))?
        {
            let path = entry.path();
            if path.extension().map(|e| e != "json").unwrap_or(true) {
                continue;
            }
            match tokio::fs::read_to_string(&path).await {
                Ok(content) => match serde_json::from_str::<InstanceRecord>(&content) {
                    Ok(record) => records.push(record),
                    Err(e) => {
                        // A half-written record from a racing sibling; it
                        // will read fine on the next sweep or get swept.
                        debug!("skipping malformed record {}: {e}", path.display());
                    }
                },
                Err(e) => debug!("skipping unreadable record {}: {e}", path.display()),
            }
        }
        records.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(records)
    }

    async fn write(&self, record: &InstanceRecord) -> Result<(), CoordinationError> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| CoordinationError::Write(e.to_string()))?;
        let content = serde_json::to_vec(record)
            .map_err(|e| CoordinationError::Write(e.to_string()))?;

        // Write-then-rename so siblings never observe a torn record.
        let path = self.record_path(&record.id);
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, &content)
            .await
            .map_err(|e| CoordinationError::Write(e.to_string()))?;
        tokio::fs::rename(&tmp, &path)
            .await
            .map_err(|e| CoordinationError::Write(e.to_string()))?;
        Ok(())
    }

    async fn remove(&self, id: &str) -> Result<(), CoordinationError> {
        match tokio::fs::remove_file(self.record_path(id)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(CoordinationError::Write(e.to_string())),
        }
    }
}

/// In-memory store for tests and embedding.
#[derive(Default)]
pub struct MemoryInstanceStore {
    records: Mutex<HashMap<String, InstanceRecord>>,
}

impl MemoryInstanceStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl InstanceStore for MemoryInstanceStore {
    async fn list(&self) -> Result<Vec<InstanceRecord>, CoordinationError> {
        let mut records: Vec<_> = self.records.lock().unwrap().values().cloned().collect();
        records.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(records)
    }

    async fn write(&self, record: &InstanceRecord) -> Result<(), CoordinationError> {
        self.records
            .lock()
            .unwrap()
            .insert(record.id.clone(), record.clone());
        Ok(())
    }

    async fn remove(&self, id: &str) -> Result<(), CoordinationError> {
        self.records.lock().unwrap().remove(id);
        Ok(())
    }
}
