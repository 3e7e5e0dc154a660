//! Token-gated session tracking.
//!
//! Tokens are UUID v4, so concurrent logins cannot collide. Sessions have no
//! expiry: they live until explicit logout or process restart.

use std::collections::HashMap;
use std::time::SystemTime;

use uuid::Uuid;

use crate::error::{DeviceError, Result};
use crate::password;
use crate::store::UserStore;

#[derive(Debug, Clone)]
pub struct Session {
    pub username: String,
    pub created_at: SystemTime,
}

/// Maps opaque tokens to authenticated identities.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: HashMap<String, Session>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Authenticate against the user store and mint a token on success.
    ///
    /// The failure message never reveals whether the username or the
    /// password was wrong.
    pub fn login(&mut self, users: &dyn UserStore, username: &str, password: &str) -> Result<String> {
        let record = users.load(username)?;
        let ok = record
            .map(|r| password::verify(password, &r.password))
            .unwrap_or(false);
        if !ok {
            return Err(eyre::Report::new(DeviceError::Auth(
                "invalid credentials".into(),
            )));
        }

        let token = Uuid::new_v4().to_string();
        self.sessions.insert(
            token.clone(),
            Session {
                username: username.to_string(),
                created_at: SystemTime::now(),
            },
        );
        tracing::info!(username, "login");
        Ok(token)
    }

    /// Destroy a session; unknown tokens fail.
    pub fn logout(&mut self, token: &str) -> Result<()> {
        match self.sessions.remove(token) {
            Some(s) => {
                tracing::info!(username = %s.username, "logout");
                Ok(())
            }
            None => Err(eyre::Report::new(DeviceError::Auth(
                "not authenticated".into(),
            ))),
        }
    }

    pub fn is_authenticated(&self, token: &str) -> bool {
        self.sessions.contains_key(token)
    }

    pub fn current_user(&self, token: &str) -> Option<&str> {
        self.sessions.get(token).map(|s| s.username.as_str())
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }
}
