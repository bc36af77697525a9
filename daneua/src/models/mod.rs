//! Domain models
//!
//! Every backend row is an immutable value object identified by an opaque
//! string id. Rows are replaced wholesale, never patched field by field.
//! All models use serde so they travel as JSON documents to and from the
//! backend.

pub mod learning;
pub mod media;
pub mod messages;
pub mod notes;
pub mod planner;

pub use learning::*;
pub use media::*;
pub use messages::*;
pub use notes::*;
pub use planner::*;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One of the two fixed identities
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Shah,
    Dane,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Shah => "shah",
            Role::Dane => "dane",
        }
    }

    /// The other user
    pub fn partner(&self) -> Role {
        match self {
            Role::Shah => Role::Dane,
            Role::Dane => Role::Shah,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "shah" => Ok(Role::Shah),
            "dane" => Ok(Role::Dane),
            other => Err(format!("unknown role: {}", other)),
        }
    }
}

/// Backend tables the client reads and writes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Todos,
    CalendarEvents,
    Goals,
    Milestones,
    Plans,
    MediaItems,
    MoodMessages,
    LearningCards,
    LoveNotes,
    DuaMessages,
    Countdowns,
    IdeaDocuments,
    QuickNotes,
    Moments,
}

impl Table {
    pub fn as_str(&self) -> &'static str {
        match self {
            Table::Todos => "todos",
            Table::CalendarEvents => "calendar_events",
            Table::Goals => "goals",
            Table::Milestones => "milestones",
            Table::Plans => "plans",
            Table::MediaItems => "media_items",
            Table::MoodMessages => "mood_messages",
            Table::LearningCards => "learning_cards",
            Table::LoveNotes => "love_notes",
            Table::DuaMessages => "dua_messages",
            Table::Countdowns => "countdowns",
            Table::IdeaDocuments => "idea_documents",
            Table::QuickNotes => "quick_notes",
            Table::Moments => "moments",
        }
    }

    /// Human name of one row, used in notifications
    pub fn noun(&self) -> &'static str {
        match self {
            Table::Todos => "to-do",
            Table::CalendarEvents => "event",
            Table::Goals => "goal",
            Table::Milestones => "milestone",
            Table::Plans => "plan",
            Table::MediaItems => "memory",
            Table::MoodMessages => "message",
            Table::LearningCards => "card",
            Table::LoveNotes => "love note",
            Table::DuaMessages => "dua",
            Table::Countdowns => "countdown",
            Table::IdeaDocuments => "idea",
            Table::QuickNotes => "note",
            Table::Moments => "moment",
        }
    }

    pub fn noun_plural(&self) -> String {
        match self {
            Table::MediaItems => "memories".to_string(),
            other => format!("{}s", other.noun()),
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A row type bound to a backend table
pub trait Record: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    const TABLE: Table;

    fn id(&self) -> &str;
}

/// Generate a fresh row id. Ids are minted on the client so an optimistic
/// row and its authoritative copy share the same id.
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Resolved identity of a user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub role: Role,
    pub display_name: String,
}
