//! User-record persistence.
//!
//! One JSON document maps usernames to records; every mutation is a
//! read-modify-write of the whole document. A *missing* file is an empty
//! store; an unreadable or unparseable file surfaces as a storage error,
//! never as "no users".

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{DeviceError, Result};

/// One delivery, appended when an injection finishes or is stopped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Unix timestamp (seconds).
    pub timestamp: u64,
    /// Glucose at completion (mg/dL).
    pub glucose: i32,
    /// Delivered dose in insulin units.
    pub dose: f32,
    /// Delivery duration in seconds.
    pub duration: f32,
}

/// Persisted account record. History is append-only and grows for the life
/// of the account (deletion is not supported).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRecord {
    pub username: String,
    /// Salted digest, see `password::hash`.
    pub password: String,
    pub email: String,
    pub age: u32,
    pub weight: f32,
    /// Unix timestamp (seconds).
    pub created_at: u64,
    #[serde(default)]
    pub injection_history: Vec<HistoryEntry>,
}

/// Persistence seam for user records, keyed by username.
pub trait UserStore: Send {
    fn load(&self, username: &str) -> Result<Option<UserRecord>>;
    /// Fails with a validation error when the username is already taken.
    fn create(&mut self, record: UserRecord) -> Result<()>;
    fn append_history(&mut self, username: &str, entry: HistoryEntry) -> Result<()>;
}

/// Flat-file store: the whole user map as one JSON document.
pub struct JsonUserStore {
    path: PathBuf,
}

impl JsonUserStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load_all(&self) -> Result<BTreeMap<String, UserRecord>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let text = std::fs::read_to_string(&self.path).map_err(|e| {
            eyre::Report::new(DeviceError::Storage(format!(
                "read {}: {e}",
                self.path.display()
            )))
        })?;
        serde_json::from_str(&text).map_err(|e| {
            eyre::Report::new(DeviceError::Storage(format!(
                "parse {}: {e}",
                self.path.display()
            )))
        })
    }

    fn save_all(&self, users: &BTreeMap<String, UserRecord>) -> Result<()> {
        let text = serde_json::to_string_pretty(users).map_err(|e| {
            eyre::Report::new(DeviceError::Storage(format!("serialize user store: {e}")))
        })?;
        // Write-then-rename so a crash mid-write cannot truncate the store.
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, text).map_err(|e| {
            eyre::Report::new(DeviceError::Storage(format!(
                "write {}: {e}",
                tmp.display()
            )))
        })?;
        std::fs::rename(&tmp, &self.path).map_err(|e| {
            eyre::Report::new(DeviceError::Storage(format!(
                "rename {}: {e}",
                self.path.display()
            )))
        })
    }
}

impl UserStore for JsonUserStore {
    fn load(&self, username: &str) -> Result<Option<UserRecord>> {
        Ok(self.load_all()?.remove(username))
    }

    fn create(&mut self, record: UserRecord) -> Result<()> {
        let mut users = self.load_all()?;
        if users.contains_key(&record.username) {
            return Err(eyre::Report::new(DeviceError::Validation(
                "username already taken".into(),
            )));
        }
        tracing::info!(username = %record.username, "user registered");
        users.insert(record.username.clone(), record);
        self.save_all(&users)
    }

    fn append_history(&mut self, username: &str, entry: HistoryEntry) -> Result<()> {
        let mut users = self.load_all()?;
        let Some(record) = users.get_mut(username) else {
            return Err(eyre::Report::new(DeviceError::Storage(format!(
                "unknown user {username}"
            ))));
        };
        record.injection_history.push(entry);
        self.save_all(&users)
    }
}

/// Seconds since the Unix epoch, for record timestamps.
pub fn unix_now() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
