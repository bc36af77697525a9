//! Application configuration
//!
//! Central location for configuration constants and the environment-driven
//! runtime configuration used by the binary.

use std::path::PathBuf;
use std::time::Duration;

// ===== Realtime =====

/// How long the partner stays "typing" after their last typing signal
pub const TYPING_INDICATOR_TIMEOUT: Duration = Duration::from_secs(2);

/// Capacity of the in-process change feed and signal channels.
/// Subscribers that fall further behind than this see a lag event and reload.
pub const FEED_CHANNEL_CAPACITY: usize = 256;

/// Channel name used for typing signals in the ideas editor
pub const TYPING_CHANNEL: &str = "typing";

/// Channel name used for love note reactions
pub const REACTIONS_CHANNEL: &str = "reactions";

// ===== Learning cards =====

/// Number of flashcards surfaced per deck per day
pub const LEARNING_CARDS_PER_DAY: usize = 3;

// ===== Ideas =====

/// Folders for idea documents. The set is fixed on the client.
pub const IDEA_FOLDERS: &[(&str, &str)] = &[
    ("dreams", "Dreams"),
    ("trips", "Trips"),
    ("home", "Home"),
    ("gifts", "Gifts"),
    ("misc", "Misc"),
];

// ===== Object storage =====

/// Bucket for photo-of-the-day uploads
pub const MOMENTS_BUCKET: &str = "moments";

/// Bucket for recorded voice notes
pub const VOICE_NOTES_BUCKET: &str = "voice-notes";

/// Bucket for media vault uploads
pub const MEDIA_BUCKET: &str = "media";

/// Maximum upload size in bytes (25 MiB)
pub const MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

// ===== Validation =====

/// Maximum length of a love note or dua message
pub const MAX_MESSAGE_LENGTH: usize = 2_000;

/// Maximum length of a todo, goal, plan or countdown title
pub const MAX_TITLE_LENGTH: usize = 200;

/// Runtime configuration for the binary
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub data_dir: PathBuf,
    /// Base URL under which uploaded objects are served
    pub public_url_base: String,
    /// PINs used to seed the two profiles on first start
    pub shah_pin: Option<String>,
    pub dane_pin: Option<String>,
}

impl AppConfig {
    /// Build configuration from `DANEUA_*` environment variables
    pub fn from_env() -> Self {
        let data_dir = std::env::var("DANEUA_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(".daneua"));

        let public_url_base = std::env::var("DANEUA_PUBLIC_URL")
            .unwrap_or_else(|_| format!("file://{}", data_dir.join("objects").display()));

        Self {
            data_dir,
            public_url_base,
            shah_pin: std::env::var("DANEUA_SHAH_PIN").ok(),
            dane_pin: std::env::var("DANEUA_DANE_PIN").ok(),
        }
    }

    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join("daneua.db")
    }

    pub fn objects_dir(&self) -> PathBuf {
        self.data_dir.join("objects")
    }
}

/// Display name for a folder id, if the folder exists
pub fn folder_name(folder_id: &str) -> Option<&'static str> {
    IDEA_FOLDERS
        .iter()
        .find(|(id, _)| *id == folder_id)
        .map(|(_, name)| *name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_folder_lookup() {
        assert_eq!(folder_name("trips"), Some("Trips"));
        assert_eq!(folder_name("nope"), None);
    }

    #[test]
    fn test_paths_derive_from_data_dir() {
        let config = AppConfig {
            data_dir: PathBuf::from("/tmp/d"),
            public_url_base: "http://localhost".into(),
            shah_pin: None,
            dane_pin: None,
        };
        assert_eq!(config.database_path(), PathBuf::from("/tmp/d/daneua.db"));
        assert_eq!(config.objects_dir(), PathBuf::from("/tmp/d/objects"));
    }
}
