//! Backend collaborator
//!
//! The hosted backend offers per-table reads and writes, a realtime change
//! feed, best-effort broadcast signals, PIN verification and object storage.
//! The client only talks to it through the `Backend` trait; rows travel as
//! JSON documents and are typed by the gateway.
//!
//! `LocalBackend` implements the trait on an embedded SQLite database so the
//! application runs and tests without the hosted service.

pub mod local;
pub mod query;

pub use local::LocalBackend;
pub use query::{Filter, Op, Order, Query};

use crate::error::Result;
use crate::models::{Role, Table, UserProfile};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::broadcast;

/// Row-level change as published by the backend
#[derive(Debug, Clone, PartialEq)]
pub enum RawChange {
    Inserted(Value),
    Updated(Value),
    Deleted(String),
}

/// A change on one table
#[derive(Debug, Clone, PartialEq)]
pub struct TableChange {
    pub table: Table,
    pub change: RawChange,
}

/// Ephemeral, unpersisted message between the two clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signal {
    pub channel: String,
    pub from: Role,
    #[serde(default)]
    pub payload: Option<String>,
}

impl Signal {
    pub fn new(channel: impl Into<String>, from: Role) -> Self {
        Self {
            channel: channel.into(),
            from,
            payload: None,
        }
    }

    pub fn with_payload(mut self, payload: impl Into<String>) -> Self {
        self.payload = Some(payload.into());
        self
    }
}

#[async_trait]
pub trait Backend: Send + Sync {
    /// Rows matching `query`, in insertion order unless the query orders them
    async fn select(&self, table: Table, query: &Query) -> Result<Vec<Value>>;

    /// One row matching `query`, chosen at random by the backend
    async fn select_random(&self, table: Table, query: &Query) -> Result<Option<Value>>;

    /// Persist a new row and return it as stored
    async fn insert(&self, table: Table, row: Value) -> Result<Value>;

    /// Replace the row with `id`; `None` when no such row exists
    async fn update(&self, table: Table, id: &str, row: Value) -> Result<Option<Value>>;

    /// Remove the row with `id`; `false` when it was already gone
    async fn delete(&self, table: Table, id: &str) -> Result<bool>;

    /// Open a receiver on the change feed of every table
    fn subscribe(&self) -> broadcast::Receiver<TableChange>;

    /// Open a receiver on broadcast signals
    fn signals(&self) -> broadcast::Receiver<Signal>;

    /// Send a best-effort signal
    fn send_signal(&self, signal: Signal) -> Result<()>;

    /// Check a role's PIN; `None` when the PIN does not match
    async fn verify_pin(&self, role: Role, pin: &str) -> Result<Option<UserProfile>>;

    async fn profile(&self, role: Role) -> Result<Option<UserProfile>>;

    /// Store an object and return its public URL
    async fn upload(&self, bucket: &str, data: &[u8], content_type: &str) -> Result<String>;
}
