//! Database models
//!
//! Rows of the local backend's own tables. Client rows are stored as JSON
//! documents in `records` and have no struct here.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A user profile with its PIN hash
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ProfileRow {
    pub role: String,
    pub display_name: String,
    /// Argon2 PHC string
    #[serde(skip_serializing)]
    pub pin_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Metadata for an uploaded object
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct StoredObject {
    pub bucket: String,
    /// SHA-256 hash of the object content
    pub hash: String,
    pub content_type: String,
    pub size: i64,
    pub created_at: DateTime<Utc>,
}
