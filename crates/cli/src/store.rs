//! Local session record persistence.
//!
//! A successful registration leaves two artifacts behind so later invocations
//! can tear down or reconcile the lease: a plain `device-id` file and a
//! `session.json` holding the full record. The two writes are sequential and
//! independently observable; there is no cross-process transaction. One local
//! session at a time is assumed - concurrent writers are not coordinated and
//! the last write wins.

use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};

use crate::error::{Result, TetherError};

const DEVICE_ID_FILE: &str = "device-id";
const SESSION_FILE: &str = "session.json";

/// The currently active remote device session, as persisted locally.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    /// Broker-side identifier for the lease.
    pub device_id: String,
    /// Address the device was connected through, `host:port` or URL form.
    pub remote_connect_url: String,
    /// Full registration response body, kept for reconciliation.
    #[serde(default)]
    pub registration: serde_json::Value,
}

/// Storage for the session record. File-backed in production, in-memory in
/// tests.
pub trait SessionStore {
    fn save(&self, record: &SessionRecord) -> Result<()>;

    /// Device identifier of the last session, or [`TetherError::NoSession`].
    fn load_device_id(&self) -> Result<String>;

    /// Full record of the last session, or [`TetherError::NoSession`].
    fn load_record(&self) -> Result<SessionRecord>;
}

/// File-backed store in a well-known scratch directory.
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Scratch location shared by all invocations on this host.
    pub fn at_default_location() -> Self {
        Self::new(std::env::temp_dir().join("tether"))
    }

    fn read(&self, name: &str) -> Result<String> {
        match fs::read_to_string(self.dir.join(name)) {
            Ok(content) => Ok(content),
            Err(err) if err.kind() == ErrorKind::NotFound => Err(TetherError::NoSession),
            Err(err) => Err(TetherError::Io(err)),
        }
    }
}

impl SessionStore for FileStore {
    fn save(&self, record: &SessionRecord) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        fs::write(self.dir.join(DEVICE_ID_FILE), &record.device_id)?;
        fs::write(
            self.dir.join(SESSION_FILE),
            serde_json::to_string_pretty(record)?,
        )?;
        Ok(())
    }

    fn load_device_id(&self) -> Result<String> {
        Ok(self.read(DEVICE_ID_FILE)?.trim().to_string())
    }

    fn load_record(&self) -> Result<SessionRecord> {
        Ok(serde_json::from_str(&self.read(SESSION_FILE)?)?)
    }
}

/// In-memory store. Clones share state, which lets tests keep a handle on a
/// store they have moved into a coordinator.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    record: Arc<Mutex<Option<SessionRecord>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<SessionRecord> {
        self.record.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

impl SessionStore for MemoryStore {
    fn save(&self, record: &SessionRecord) -> Result<()> {
        *self.record.lock().unwrap_or_else(|e| e.into_inner()) = Some(record.clone());
        Ok(())
    }

    fn load_device_id(&self) -> Result<String> {
        self.current().map(|r| r.device_id).ok_or(TetherError::NoSession)
    }

    fn load_record(&self) -> Result<SessionRecord> {
        self.current().ok_or(TetherError::NoSession)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use tempfile::tempdir;

    use super::*;

    fn sample_record() -> SessionRecord {
        SessionRecord {
            device_id: "dev-42".to_string(),
            remote_connect_url: "10.20.0.3:5555".to_string(),
            registration: json!({
                "remoteConnectUrl": "10.20.0.3:5555",
                "deviceId": "dev-42",
                "region": "hn-1",
            }),
        }
    }

    #[test]
    fn file_store_round_trips_both_artifacts() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path());

        store.save(&sample_record()).unwrap();

        assert_eq!(store.load_device_id().unwrap(), "dev-42");
        let record = store.load_record().unwrap();
        assert_eq!(record.remote_connect_url, "10.20.0.3:5555");
        assert_eq!(record.registration["region"], json!("hn-1"));
    }

    #[test]
    fn missing_session_surfaces_as_no_session() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path().join("never-written"));

        assert!(matches!(store.load_device_id(), Err(TetherError::NoSession)));
        assert!(matches!(store.load_record(), Err(TetherError::NoSession)));
    }

    #[test]
    fn save_overwrites_previous_session() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path());

        store.save(&sample_record()).unwrap();
        let mut replacement = sample_record();
        replacement.device_id = "dev-43".to_string();
        store.save(&replacement).unwrap();

        assert_eq!(store.load_device_id().unwrap(), "dev-43");
    }

    #[test]
    fn memory_store_clones_share_state() {
        let store = MemoryStore::new();
        let handle = store.clone();

        store.save(&sample_record()).unwrap();
        assert_eq!(handle.load_device_id().unwrap(), "dev-42");
    }
}
