//! Shared fixtures for unit tests

use crate::app::AppContext;
use crate::backend::{Backend, LocalBackend, Query, Signal, TableChange};
use crate::capabilities::{CapabilityProvider, StaticCapabilities};
use crate::error::{RemoteError, Result};
use crate::models::{Role, Table, UserProfile};
use crate::notify::{self, NotificationCenter};
use crate::session::Identity;
use crate::sync::Gateway;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tempfile::TempDir;
use tokio::sync::{broadcast, Notify};

/// A local backend whose writes can be made to fail and whose reads can be
/// held until released
pub struct FaultyBackend {
    inner: LocalBackend,
    fail_writes: AtomicBool,
    fail_reads: AtomicBool,
    hold_reads: AtomicBool,
    release: Notify,
}

impl FaultyBackend {
    pub fn new(inner: LocalBackend) -> Self {
        Self {
            inner,
            fail_writes: AtomicBool::new(false),
            fail_reads: AtomicBool::new(false),
            hold_reads: AtomicBool::new(false),
            release: Notify::new(),
        }
    }

    pub fn inner(&self) -> &LocalBackend {
        &self.inner
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn hold_reads(&self, hold: bool) {
        self.hold_reads.store(hold, Ordering::SeqCst);
    }

    pub fn release_reads(&self) {
        self.hold_reads(false);
        self.release.notify_waiters();
    }

    fn check_write(&self) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            Err(RemoteError::Network("connection reset".to_string()).into())
        } else {
            Ok(())
        }
    }

    async fn gate_read(&self) -> Result<()> {
        let released = self.release.notified();
        if self.hold_reads.load(Ordering::SeqCst) {
            released.await;
        }

        if self.fail_reads.load(Ordering::SeqCst) {
            Err(RemoteError::Network("timed out".to_string()).into())
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl Backend for FaultyBackend {
    async fn select(&self, table: Table, query: &Query) -> Result<Vec<Value>> {
        self.gate_read().await?;
        self.inner.select(table, query).await
    }

    async fn select_random(&self, table: Table, query: &Query) -> Result<Option<Value>> {
        self.gate_read().await?;
        self.inner.select_random(table, query).await
    }

    async fn insert(&self, table: Table, row: Value) -> Result<Value> {
        self.check_write()?;
        self.inner.insert(table, row).await
    }

    async fn update(&self, table: Table, id: &str, row: Value) -> Result<Option<Value>> {
        self.check_write()?;
        self.inner.update(table, id, row).await
    }

    async fn delete(&self, table: Table, id: &str) -> Result<bool> {
        self.check_write()?;
        self.inner.delete(table, id).await
    }

    fn subscribe(&self) -> broadcast::Receiver<TableChange> {
        self.inner.subscribe()
    }

    fn signals(&self) -> broadcast::Receiver<Signal> {
        self.inner.signals()
    }

    fn send_signal(&self, signal: Signal) -> Result<()> {
        self.inner.send_signal(signal)
    }

    async fn verify_pin(&self, role: Role, pin: &str) -> Result<Option<UserProfile>> {
        self.inner.verify_pin(role, pin).await
    }

    async fn profile(&self, role: Role) -> Result<Option<UserProfile>> {
        self.gate_read().await?;
        self.inner.profile(role).await
    }

    async fn upload(&self, bucket: &str, data: &[u8], content_type: &str) -> Result<String> {
        self.check_write()?;
        self.inner.upload(bucket, data, content_type).await
    }
}

pub struct TestApp {
    pub backend: Arc<FaultyBackend>,
    pub ctx: AppContext,
    pub notifications: NotificationCenter,
    _temp: TempDir,
}

impl TestApp {
    /// A second user on the same backend, for two-client scenarios
    pub fn partner_context(&self) -> AppContext {
        let role = self.ctx.role().map(|role| role.partner()).unwrap_or(Role::Dane);
        let (notifier, _) = notify::channel();
        AppContext::new(
            self.ctx.gateway.clone(),
            notifier,
            signed_in(role),
            self.ctx.capabilities.clone(),
        )
    }
}

pub fn signed_in(role: Role) -> Identity {
    Identity::signed_in(UserProfile {
        role,
        display_name: role.to_string(),
    })
}

pub async fn test_app(role: Role) -> TestApp {
    test_app_with(role, StaticCapabilities::granting_all()).await
}

pub async fn test_app_with(
    role: Role,
    capabilities: impl CapabilityProvider + 'static,
) -> TestApp {
    let temp = TempDir::new().unwrap();
    let inner = LocalBackend::in_memory(temp.path().join("objects"))
        .await
        .unwrap();

    let backend = Arc::new(FaultyBackend::new(inner));

    let (notifier, notifications) = notify::channel();
    let ctx = AppContext::new(
        Gateway::new(backend.clone()),
        notifier,
        signed_in(role),
        Arc::new(capabilities),
    );

    TestApp {
        backend,
        ctx,
        notifications,
        _temp: temp,
    }
}
