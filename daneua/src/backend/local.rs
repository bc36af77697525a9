//! Local reference backend
//!
//! Implements `Backend` on the SQLite repository, the content-addressed
//! object store and in-process broadcast channels. Every committed write is
//! published on the change feed after the database acknowledges it. Writes
//! hold a lock through publishing, so the feed order is the commit order.

use super::{Backend, Query, RawChange, Signal, TableChange};
use crate::config::{AppConfig, FEED_CHANNEL_CAPACITY, MAX_UPLOAD_BYTES};
use crate::crypto;
use crate::database::{create_memory_pool, create_pool, ProfileRow, Repository};
use crate::error::{AppError, RemoteError, Result};
use crate::models::{Role, Table, UserProfile};
use crate::storage::ObjectStore;
use async_trait::async_trait;
use serde_json::Value;
use sqlx::SqlitePool;
use std::path::PathBuf;
use tokio::sync::{broadcast, Mutex};

pub struct LocalBackend {
    repo: Repository,
    objects: ObjectStore,
    public_url_base: String,
    changes: broadcast::Sender<TableChange>,
    signals: broadcast::Sender<Signal>,
    writes: Mutex<()>,
}

impl LocalBackend {
    pub fn new(
        pool: SqlitePool,
        objects: ObjectStore,
        public_url_base: impl Into<String>,
    ) -> Self {
        let (changes, _) = broadcast::channel(FEED_CHANNEL_CAPACITY);
        let (signals, _) = broadcast::channel(FEED_CHANNEL_CAPACITY);

        Self {
            repo: Repository::new(pool),
            objects,
            public_url_base: public_url_base.into().trim_end_matches('/').to_string(),
            changes,
            signals,
            writes: Mutex::new(()),
        }
    }

    /// Open the on-disk backend in the configured data directory
    pub async fn open(config: &AppConfig) -> Result<Self> {
        tracing::info!("Opening local backend in {:?}", config.data_dir);

        let pool = create_pool(&config.database_path()).await?;
        let objects = ObjectStore::new(config.objects_dir());
        objects.initialize().await?;

        Ok(Self::new(pool, objects, config.public_url_base.clone()))
    }

    /// In-memory database with objects under `objects_root`
    pub async fn in_memory(objects_root: PathBuf) -> Result<Self> {
        let pool = create_memory_pool().await?;
        let objects = ObjectStore::new(objects_root);
        objects.initialize().await?;

        let base = format!("file://{}", objects.root().display());
        Ok(Self::new(pool, objects, base))
    }

    /// Create or replace a profile with a new PIN
    pub async fn set_profile(
        &self,
        role: Role,
        display_name: &str,
        pin: &str,
    ) -> Result<UserProfile> {
        let pin_hash = crypto::hash_pin(pin)?;
        let row = self
            .repo
            .upsert_profile(role.as_str(), display_name, &pin_hash)
            .await?;

        tracing::info!("Profile set for {}", role);
        profile_from_row(row)
    }

    /// Create the profile only if it does not exist yet
    pub async fn ensure_profile(&self, role: Role, display_name: &str, pin: &str) -> Result<()> {
        if self.repo.get_profile(role.as_str()).await?.is_none() {
            self.set_profile(role, display_name, pin).await?;
        }
        Ok(())
    }

    pub fn objects(&self) -> &ObjectStore {
        &self.objects
    }

    fn publish(&self, table: Table, change: RawChange) {
        // A send error only means nobody is subscribed right now
        if self.changes.send(TableChange { table, change }).is_err() {
            tracing::trace!("No change feed subscribers for {}", table);
        }
    }
}

fn profile_from_row(row: ProfileRow) -> Result<UserProfile> {
    let role = row
        .role
        .parse::<Role>()
        .map_err(|e| AppError::Remote(RemoteError::Validation(e)))?;

    Ok(UserProfile {
        role,
        display_name: row.display_name,
    })
}

fn row_id(row: &Value) -> Option<&str> {
    row.get("id").and_then(Value::as_str).filter(|id| !id.is_empty())
}

#[async_trait]
impl Backend for LocalBackend {
    async fn select(&self, table: Table, query: &Query) -> Result<Vec<Value>> {
        self.repo.select_records(table.as_str(), query).await
    }

    async fn select_random(&self, table: Table, query: &Query) -> Result<Option<Value>> {
        self.repo.random_record(table.as_str(), query).await
    }

    async fn insert(&self, table: Table, mut row: Value) -> Result<Value> {
        if !row.is_object() {
            return Err(RemoteError::Validation("row must be a JSON object".to_string()).into());
        }

        let id = match row_id(&row) {
            Some(id) => id.to_string(),
            None => {
                let id = uuid::Uuid::new_v4().to_string();
                row["id"] = Value::String(id.clone());
                id
            }
        };

        let _write = self.writes.lock().await;
        let stored = self.repo.insert_record(table.as_str(), &id, &row).await?;
        self.publish(table, RawChange::Inserted(stored.clone()));
        Ok(stored)
    }

    async fn update(&self, table: Table, id: &str, mut row: Value) -> Result<Option<Value>> {
        let Some(object) = row.as_object_mut() else {
            return Err(RemoteError::Validation("row must be a JSON object".to_string()).into());
        };
        object.insert("id".to_string(), Value::String(id.to_string()));

        let _write = self.writes.lock().await;
        let stored = self.repo.update_record(table.as_str(), id, &row).await?;
        if let Some(stored) = &stored {
            self.publish(table, RawChange::Updated(stored.clone()));
        }
        Ok(stored)
    }

    async fn delete(&self, table: Table, id: &str) -> Result<bool> {
        let _write = self.writes.lock().await;
        let existed = self.repo.delete_record(table.as_str(), id).await?;
        if existed {
            self.publish(table, RawChange::Deleted(id.to_string()));
        }
        Ok(existed)
    }

    fn subscribe(&self) -> broadcast::Receiver<TableChange> {
        self.changes.subscribe()
    }

    fn signals(&self) -> broadcast::Receiver<Signal> {
        self.signals.subscribe()
    }

    fn send_signal(&self, signal: Signal) -> Result<()> {
        if self.signals.send(signal).is_err() {
            tracing::trace!("Signal dropped: no listeners");
        }
        Ok(())
    }

    async fn verify_pin(&self, role: Role, pin: &str) -> Result<Option<UserProfile>> {
        let Some(row) = self.repo.get_profile(role.as_str()).await? else {
            return Err(RemoteError::Auth(format!("no profile for {}", role)).into());
        };

        if !crypto::verify_pin(pin, &row.pin_hash)? {
            tracing::info!("PIN rejected for {}", role);
            return Ok(None);
        }

        profile_from_row(row).map(Some)
    }

    async fn profile(&self, role: Role) -> Result<Option<UserProfile>> {
        self.repo
            .get_profile(role.as_str())
            .await?
            .map(profile_from_row)
            .transpose()
    }

    async fn upload(&self, bucket: &str, data: &[u8], content_type: &str) -> Result<String> {
        if data.is_empty() {
            return Err(RemoteError::Validation("empty upload".to_string()).into());
        }
        if data.len() > MAX_UPLOAD_BYTES {
            return Err(RemoteError::Validation(format!(
                "upload of {} bytes exceeds {} bytes",
                data.len(),
                MAX_UPLOAD_BYTES
            ))
            .into());
        }

        let hash = self
            .objects
            .put(bucket, data)
            .await
            .map_err(|e| AppError::Remote(RemoteError::Network(e.to_string())))?;
        self.repo
            .record_object(bucket, &hash, content_type, data.len() as i64)
            .await?;

        let url = format!("{}/{}", self.public_url_base, ObjectStore::key(bucket, &hash));
        tracing::debug!("Uploaded object {} ({} bytes)", url, data.len());
        Ok(url)
    }
}
