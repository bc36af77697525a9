//! Persisted session
//!
//! Remembers the signed-in role between launches in a small JSON file in
//! the data directory. Only the role is stored, never the PIN.

use crate::error::Result;
use crate::models::Role;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tokio::fs;

const SESSION_FILE: &str = "session.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedSession {
    pub role: Role,
    pub signed_in_at: DateTime<Utc>,
}

impl PersistedSession {
    pub fn new(role: Role) -> Self {
        Self {
            role,
            signed_in_at: Utc::now(),
        }
    }
}

#[derive(Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(data_dir: PathBuf) -> Self {
        Self {
            path: data_dir.join(SESSION_FILE),
        }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    /// Read the persisted session. A corrupt file is removed and treated as
    /// no session.
    pub async fn load(&self) -> Result<Option<PersistedSession>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&self.path).await?;
        match serde_json::from_str(&content) {
            Ok(session) => Ok(Some(session)),
            Err(e) => {
                tracing::warn!("Discarding unreadable session file {:?}: {}", self.path, e);
                self.clear().await?;
                Ok(None)
            }
        }
    }

    pub async fn save(&self, session: &PersistedSession) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let content = serde_json::to_string_pretty(session)?;
        fs::write(&self.path, content).await?;
        tracing::debug!("Session saved to {:?}", self.path);

        Ok(())
    }

    /// Remove the persisted session. Clearing twice is fine.
    pub async fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path).await {
            Ok(()) => {
                tracing::debug!("Session cleared");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
