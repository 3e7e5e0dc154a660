//! Test and helper mocks for pump_core.

use std::collections::HashMap;

use pump_traits::{GlucoseSensor, Indicator, Pump};

use crate::error::DeviceError;
use crate::store::{HistoryEntry, UserRecord, UserStore};

/// Sensor that replays a fixed sequence of raw counts, then repeats the last.
pub struct ScriptedSensor {
    seq: Vec<i32>,
    idx: usize,
}

impl ScriptedSensor {
    pub fn new(seq: impl Into<Vec<i32>>) -> Self {
        Self {
            seq: seq.into(),
            idx: 0,
        }
    }
}

impl GlucoseSensor for ScriptedSensor {
    fn sample(&mut self) -> Result<i32, Box<dyn std::error::Error + Send + Sync>> {
        let v = if self.idx < self.seq.len() {
            let x = self.seq[self.idx];
            self.idx += 1;
            x
        } else {
            self.seq.last().copied().unwrap_or(0)
        };
        Ok(v)
    }
}

/// Pump that accepts every command and remembers its energized state.
#[derive(Debug, Default)]
pub struct NoopPump {
    pub energized: bool,
}

impl Pump for NoopPump {
    fn energize(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.energized = true;
        Ok(())
    }
    fn deenergize(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.energized = false;
        Ok(())
    }
}

/// Indicator that accepts every command.
#[derive(Debug, Default)]
pub struct NoopIndicator {
    pub on: bool,
}

impl Indicator for NoopIndicator {
    fn set(&mut self, on: bool) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.on = on;
        Ok(())
    }
}

/// In-memory user store for tests.
#[derive(Debug, Default)]
pub struct MemoryUserStore {
    users: HashMap<String, UserRecord>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn history_of(&self, username: &str) -> &[HistoryEntry] {
        self.users
            .get(username)
            .map(|r| r.injection_history.as_slice())
            .unwrap_or(&[])
    }
}

impl UserStore for MemoryUserStore {
    fn load(&self, username: &str) -> crate::error::Result<Option<UserRecord>> {
        Ok(self.users.get(username).cloned())
    }

    fn create(&mut self, record: UserRecord) -> crate::error::Result<()> {
        if self.users.contains_key(&record.username) {
            return Err(eyre::Report::new(DeviceError::Validation(
                "username already taken".into(),
            )));
        }
        self.users.insert(record.username.clone(), record);
        Ok(())
    }

    fn append_history(&mut self, username: &str, entry: HistoryEntry) -> crate::error::Result<()> {
        let Some(record) = self.users.get_mut(username) else {
            return Err(eyre::Report::new(DeviceError::Storage(format!(
                "unknown user {username}"
            ))));
        };
        record.injection_history.push(entry);
        Ok(())
    }
}
