//! Remote data gateway
//!
//! Typed reads and writes over the backend. The gateway holds no state: no
//! cache and no retry. Writes resolve only after the backend acknowledged
//! them; keeping local state in step is the caller's job.

use super::feed::{SignalSubscription, Subscription};
use crate::backend::{Backend, Query, Signal};
use crate::error::{AppError, RemoteError, Result};
use crate::models::{Mood, MoodMessage, Record, Role, UserProfile};
use serde_json::Value;
use std::sync::Arc;

#[derive(Clone)]
pub struct Gateway {
    backend: Arc<dyn Backend>,
}

impl Gateway {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self { backend }
    }

    /// Rows of `T` matching the query
    pub async fn fetch<T: Record>(&self, query: &Query) -> Result<Vec<T>> {
        let rows = self
            .backend
            .select(T::TABLE, query)
            .await
            .inspect_err(|e| tracing::warn!("Fetching {} failed: {}", T::TABLE, e))?;

        let decoded = rows.into_iter().map(decode::<T>).collect::<Result<Vec<T>>>()?;
        tracing::debug!("Fetched {} {} rows", decoded.len(), T::TABLE);
        Ok(decoded)
    }

    /// A single row by id
    pub async fn fetch_one<T: Record>(&self, id: &str) -> Result<T> {
        let mut rows = self.fetch::<T>(&Query::new().eq("id", id).limit(1)).await?;
        rows.pop().ok_or_else(|| AppError::not_found(T::TABLE, id))
    }

    pub async fn insert<T: Record>(&self, row: &T) -> Result<T> {
        let stored = self
            .backend
            .insert(T::TABLE, serde_json::to_value(row)?)
            .await
            .inspect_err(|e| tracing::warn!("Insert into {} failed: {}", T::TABLE, e))?;

        tracing::debug!("Inserted {} row {}", T::TABLE, row.id());
        decode(stored)
    }

    /// Replace a row wholesale. A missing row is `NotFound`.
    pub async fn update<T: Record>(&self, row: &T) -> Result<T> {
        let stored = self
            .backend
            .update(T::TABLE, row.id(), serde_json::to_value(row)?)
            .await
            .inspect_err(|e| tracing::warn!("Update of {} {} failed: {}", T::TABLE, row.id(), e))?;

        match stored {
            Some(stored) => {
                tracing::debug!("Updated {} row {}", T::TABLE, row.id());
                decode(stored)
            }
            None => Err(AppError::not_found(T::TABLE, row.id())),
        }
    }

    /// Delete a row. A row that is already gone counts as deleted.
    pub async fn delete<T: Record>(&self, id: &str) -> Result<()> {
        let existed = self
            .backend
            .delete(T::TABLE, id)
            .await
            .inspect_err(|e| tracing::warn!("Delete of {} {} failed: {}", T::TABLE, id, e))?;

        if existed {
            tracing::debug!("Deleted {} row {}", T::TABLE, id);
        } else {
            tracing::debug!("{} row {} was already gone", T::TABLE, id);
        }
        Ok(())
    }

    /// A random message for the mood, picked by the backend
    pub async fn random_mood_message(&self, mood: Mood) -> Result<Option<MoodMessage>> {
        let query = Query::new().eq("mood_id", mood.as_str());
        self.backend
            .select_random(<MoodMessage as Record>::TABLE, &query)
            .await
            .inspect_err(|e| tracing::warn!("Mood message lookup failed: {}", e))?
            .map(decode)
            .transpose()
    }

    /// Verify a PIN with the backend
    pub async fn verify_pin(&self, role: Role, pin: &str) -> Result<UserProfile> {
        match self.backend.verify_pin(role, pin).await? {
            Some(profile) => Ok(profile),
            None => Err(RemoteError::Auth("incorrect PIN".to_string()).into()),
        }
    }

    pub async fn profile(&self, role: Role) -> Result<Option<UserProfile>> {
        self.backend.profile(role).await
    }

    /// Upload an object and return its public URL
    pub async fn upload(&self, bucket: &str, data: &[u8], content_type: &str) -> Result<String> {
        self.backend
            .upload(bucket, data, content_type)
            .await
            .inspect_err(|e| tracing::warn!("Upload to {} failed: {}", bucket, e))
    }

    /// Open a change-feed subscription on `T`'s table, limited to rows
    /// matching `filter`
    pub fn subscribe<T: Record>(&self, filter: Query) -> Subscription<T> {
        Subscription::new(self.backend.subscribe(), filter)
    }

    pub fn send_signal(&self, signal: Signal) -> Result<()> {
        self.backend.send_signal(signal)
    }

    /// Listen for the partner's signals on `channel`
    pub fn subscribe_signals(&self, channel: &str, me: Role) -> SignalSubscription {
        SignalSubscription::new(self.backend.signals(), channel, me)
    }
}

pub(crate) fn decode<T: Record>(row: Value) -> Result<T> {
    serde_json::from_value(row).map_err(|e| {
        tracing::warn!("Malformed {} row: {}", T::TABLE, e);
        AppError::from(e)
    })
}
