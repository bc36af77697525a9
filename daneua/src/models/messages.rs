//! Directional messages between the two users.

use super::{new_id, Record, Role, Table};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A short note sent from one user to the other. Reacting to a note
/// deletes it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoveNote {
    pub id: String,
    pub from_user: Role,
    pub to_user: Role,
    pub note: String,
    /// Voice note recording, when the note was spoken rather than typed
    #[serde(default)]
    pub audio_url: Option<String>,
    #[serde(default)]
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

impl LoveNote {
    pub fn new(from_user: Role, note: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            from_user,
            to_user: from_user.partner(),
            note: note.into(),
            audio_url: None,
            read: false,
            created_at: Utc::now(),
        }
    }
}

impl Record for LoveNote {
    const TABLE: Table = Table::LoveNotes;

    fn id(&self) -> &str {
        &self.id
    }
}

/// A prayer shared with the other user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DuaMessage {
    pub id: String,
    pub from_user: Role,
    pub to_user: Role,
    pub category: String,
    pub message: String,
    #[serde(default)]
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

impl DuaMessage {
    pub fn new(from_user: Role, category: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            from_user,
            to_user: from_user.partner(),
            category: category.into(),
            message: message.into(),
            read: false,
            created_at: Utc::now(),
        }
    }
}

impl Record for DuaMessage {
    const TABLE: Table = Table::DuaMessages;

    fn id(&self) -> &str {
        &self.id
    }
}
