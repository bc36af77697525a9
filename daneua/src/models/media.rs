//! Media models: vault items, mood messages and daily photo moments.

use super::{new_id, Record, Role, Table};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Video,
    Audio,
    Image,
}

/// An item in the media vault. Items with a future unlock date stay sealed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaItem {
    pub id: String,
    pub title: String,
    pub media_type: MediaType,
    pub storage_url: String,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub unlock_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub view_count: u32,
    #[serde(default)]
    pub is_favorite: bool,
}

impl MediaItem {
    pub fn new(
        title: impl Into<String>,
        media_type: MediaType,
        storage_url: impl Into<String>,
    ) -> Self {
        Self {
            id: new_id(),
            title: title.into(),
            media_type,
            storage_url: storage_url.into(),
            thumbnail_url: None,
            category: None,
            unlock_date: None,
            view_count: 0,
            is_favorite: false,
        }
    }

    pub fn is_locked(&self, now: DateTime<Utc>) -> bool {
        self.unlock_date.is_some_and(|unlock| unlock > now)
    }
}

impl Record for MediaItem {
    const TABLE: Table = Table::MediaItems;

    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mood {
    Happy,
    Sad,
    Anxious,
    Angry,
    Lonely,
    Loved,
    Tired,
    MissingYou,
}

impl Mood {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mood::Happy => "happy",
            Mood::Sad => "sad",
            Mood::Anxious => "anxious",
            Mood::Angry => "angry",
            Mood::Lonely => "lonely",
            Mood::Loved => "loved",
            Mood::Tired => "tired",
            Mood::MissingYou => "missing_you",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageType {
    #[default]
    Text,
    Audio,
    Video,
}

/// A message prepared ahead of time for a given mood
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoodMessage {
    pub id: String,
    pub mood_id: Mood,
    pub content: String,
    #[serde(default)]
    pub message_type: MessageType,
    #[serde(default)]
    pub storage_url: Option<String>,
}

impl MoodMessage {
    pub fn text(mood_id: Mood, content: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            mood_id,
            content: content.into(),
            message_type: MessageType::Text,
            storage_url: None,
        }
    }
}

impl Record for MoodMessage {
    const TABLE: Table = Table::MoodMessages;

    fn id(&self) -> &str {
        &self.id
    }
}

/// Photo of the day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Moment {
    pub id: String,
    pub user_role: Role,
    pub photo_url: String,
    pub taken_on: NaiveDate,
    pub created_at: DateTime<Utc>,
}

impl Moment {
    pub fn new(user_role: Role, photo_url: impl Into<String>, taken_on: NaiveDate) -> Self {
        Self {
            id: new_id(),
            user_role,
            photo_url: photo_url.into(),
            taken_on,
            created_at: Utc::now(),
        }
    }
}

impl Record for Moment {
    const TABLE: Table = Table::Moments;

    fn id(&self) -> &str {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_lock_follows_unlock_date() {
        let now = Utc::now();
        let mut item = MediaItem::new("Letter", MediaType::Video, "https://x/letter.mp4");
        assert!(!item.is_locked(now));

        item.unlock_date = Some(now + Duration::days(1));
        assert!(item.is_locked(now));

        item.unlock_date = Some(now - Duration::minutes(1));
        assert!(!item.is_locked(now));
    }

    #[test]
    fn test_mood_wire_names() {
        assert_eq!(serde_json::to_string(&Mood::MissingYou).unwrap(), "\"missing_you\"");
        assert_eq!(Mood::MissingYou.as_str(), "missing_you");
    }
}
