//! Written content: idea documents and quick notes.

use super::{new_id, Record, Role, Table};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A collaborative document. Concurrent edits are last-writer-wins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdeaDocument {
    pub id: String,
    pub folder_id: String,
    pub title: String,
    #[serde(default)]
    pub content: String,
    pub created_by: Role,
    pub updated_at: DateTime<Utc>,
}

impl IdeaDocument {
    pub fn new(folder_id: impl Into<String>, title: impl Into<String>, created_by: Role) -> Self {
        Self {
            id: new_id(),
            folder_id: folder_id.into(),
            title: title.into(),
            content: String::new(),
            created_by,
            updated_at: Utc::now(),
        }
    }
}

impl Record for IdeaDocument {
    const TABLE: Table = Table::IdeaDocuments;

    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuickNote {
    pub id: String,
    pub content: String,
    pub created_by: Role,
    pub created_at: DateTime<Utc>,
}

impl QuickNote {
    pub fn new(content: impl Into<String>, created_by: Role) -> Self {
        Self {
            id: new_id(),
            content: content.into(),
            created_by,
            created_at: Utc::now(),
        }
    }
}

impl Record for QuickNote {
    const TABLE: Table = Table::QuickNotes;

    fn id(&self) -> &str {
        &self.id
    }
}
