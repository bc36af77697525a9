//! Generic view over one table
//!
//! A `View<T>` ties the gateway, a change-feed subscription and a reconciled
//! collection to one mount lifetime. Feature services build on it.
//!
//! Mounting subscribes first and loads second. Events committed while the
//! load is in flight stay buffered and are replayed in order on top of the
//! loaded rows, which converges on the latest state because every change
//! is an idempotent replace or delete by id.

use super::feed::{Change, FeedEvent, Subscription};
use super::gateway::Gateway;
use super::reconciler::{Collection, Comparator};
use super::scope::MountScope;
use crate::backend::Query;
use crate::error::{AppError, Result};
use crate::models::Record;
use crate::notify::Notifier;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState {
    Loading,
    Ready,
    /// Initial load failed; the view shows an empty state
    Failed(String),
    Unmounted,
}

pub struct View<T: Record> {
    gateway: Gateway,
    notifier: Notifier,
    query: Query,
    collection: Collection<T>,
    subscription: Subscription<T>,
    scope: MountScope,
    state: LoadState,
    /// Set when the feed lagged; the next `sync` fetches again
    needs_reload: bool,
}

impl<T: Record> View<T> {
    /// Mount with rows in backend order
    pub async fn mount(gateway: &Gateway, notifier: &Notifier, query: Query) -> Self {
        Self::mount_with(gateway, notifier, query, Collection::new()).await
    }

    /// Mount with rows kept sorted by `order`
    pub async fn mount_ordered(
        gateway: &Gateway,
        notifier: &Notifier,
        query: Query,
        order: Comparator<T>,
    ) -> Self {
        Self::mount_with(gateway, notifier, query, Collection::ordered(order)).await
    }

    async fn mount_with(
        gateway: &Gateway,
        notifier: &Notifier,
        query: Query,
        collection: Collection<T>,
    ) -> Self {
        tracing::info!("Mounting {} view", T::TABLE);

        let subscription = gateway.subscribe::<T>(query.clone());
        let mut view = Self {
            gateway: gateway.clone(),
            notifier: notifier.clone(),
            query,
            collection,
            subscription,
            scope: MountScope::new(),
            state: LoadState::Loading,
            needs_reload: false,
        };

        view.reload().await;
        view
    }

    pub fn rows(&self) -> &[T] {
        self.collection.rows()
    }

    pub fn get(&self, id: &str) -> Option<&T> {
        self.collection.get(id)
    }

    pub fn collection(&self) -> &Collection<T> {
        &self.collection
    }

    pub fn state(&self) -> &LoadState {
        &self.state
    }

    /// Whether the feed lagged since the last load
    pub fn needs_reload(&self) -> bool {
        self.needs_reload
    }

    pub fn is_mounted(&self) -> bool {
        self.scope.is_mounted()
    }

    /// Handle for tearing the view down from elsewhere
    pub fn scope(&self) -> MountScope {
        self.scope.clone()
    }

    pub fn gateway(&self) -> &Gateway {
        &self.gateway
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    /// Fetch the collection again. A response arriving after unmount is
    /// dropped. Returns whether fresh rows were loaded.
    pub async fn reload(&mut self) -> bool {
        if !self.scope.is_mounted() {
            self.teardown();
            return false;
        }

        self.state = LoadState::Loading;
        self.needs_reload = false;

        let loaded = self.scope.run(self.gateway.fetch::<T>(&self.query)).await;
        match loaded {
            None => {
                tracing::debug!("Discarding {} load: view unmounted", T::TABLE);
                self.teardown();
                false
            }
            Some(Ok(rows)) => {
                self.collection.replace_all(rows);
                self.state = LoadState::Ready;
                self.sync_pending();
                true
            }
            Some(Err(e)) => {
                tracing::error!("Loading {} failed: {}", T::TABLE, e);
                if e.is_transient() {
                    self.notifier.report(&format!("load {}", T::TABLE.noun_plural()), &e);
                }
                self.state = LoadState::Failed(e.to_string());
                false
            }
        }
    }

    /// Apply every buffered feed event. Returns how many changed local state.
    /// A lagged feed marks the view for reload; use `sync` to act on it.
    pub fn sync_pending(&mut self) -> usize {
        let (applied, lagged) = self.drain();
        if lagged {
            self.needs_reload = true;
        }
        applied
    }

    /// Apply buffered events and reload if the feed lagged
    pub async fn sync(&mut self) -> usize {
        let applied = self.sync_pending();
        if self.needs_reload {
            self.reload().await;
        }
        applied
    }

    /// Wait for the next relevant feed event and apply it. `None` once the
    /// view is unmounted or the feed closed.
    pub async fn next_change(&mut self) -> Option<Change<T>> {
        loop {
            if !self.scope.is_mounted() {
                self.teardown();
                return None;
            }

            if self.needs_reload {
                self.reload().await;
                continue;
            }

            let scope = self.scope.clone();
            let event = scope.run(self.subscription.next()).await.flatten();
            match event {
                Some(FeedEvent::Change(change)) => {
                    self.collection.apply(change.clone());
                    return Some(change);
                }
                Some(FeedEvent::Lagged(_)) => {
                    self.needs_reload = true;
                }
                None => {
                    if !self.scope.is_mounted() {
                        self.teardown();
                    }
                    return None;
                }
            }
        }
    }

    fn drain(&mut self) -> (usize, bool) {
        if !self.scope.is_mounted() {
            self.teardown();
            return (0, false);
        }

        let mut applied = 0;
        let mut lagged = false;
        while let Some(event) = self.subscription.try_next() {
            match event {
                FeedEvent::Change(change) => {
                    if self.collection.apply(change) {
                        applied += 1;
                    }
                }
                FeedEvent::Lagged(_) => lagged = true,
            }
        }
        (applied, lagged)
    }

    /// Add a row optimistically, then persist it
    pub async fn insert(&mut self, row: T) -> Result<T> {
        self.ensure_mounted()?;

        let id = row.id().to_string();
        self.collection.optimistic_insert(row.clone());
        let result = self.gateway.insert(&row).await;
        self.settle(&id, "save", result)
    }

    /// Mutate a row optimistically, then persist the whole row
    pub async fn modify<F>(&mut self, id: &str, mutate: F) -> Result<T>
    where
        F: FnOnce(&mut T),
    {
        self.ensure_mounted()?;

        let updated = match self.collection.optimistic_update(id, mutate) {
            Ok(updated) => updated,
            Err(e) => {
                self.notifier.report(&format!("update {}", T::TABLE.noun()), &e);
                return Err(e);
            }
        };

        let result = self.gateway.update(&updated).await;
        self.settle(id, "update", result)
    }

    /// Replace a row optimistically, then persist it
    pub async fn replace(&mut self, row: T) -> Result<T> {
        self.ensure_mounted()?;

        let id = row.id().to_string();
        if let Err(e) = self.collection.optimistic_replace(row.clone()) {
            self.notifier.report(&format!("update {}", T::TABLE.noun()), &e);
            return Err(e);
        }

        let result = self.gateway.update(&row).await;
        self.settle(&id, "update", result)
    }

    /// Remove a row optimistically, then delete it remotely. Removing a row
    /// that does not exist succeeds.
    pub async fn remove(&mut self, id: &str) -> Result<()> {
        self.ensure_mounted()?;

        self.collection.optimistic_remove(id);
        match self.gateway.delete::<T>(id).await {
            Ok(()) => {
                self.collection.confirm(id, None);
                Ok(())
            }
            Err(e) => {
                self.collection.rollback(id);
                self.notifier.report(&format!("delete {}", T::TABLE.noun()), &e);
                Err(e)
            }
        }
    }

    fn settle(&mut self, id: &str, action: &str, result: Result<T>) -> Result<T> {
        match result {
            Ok(stored) if self.admits(&stored) => {
                self.collection.confirm(id, Some(stored.clone()));
                Ok(stored)
            }
            Ok(stored) => {
                // Saved, but outside this view's filter
                tracing::debug!("{} {} left the view after save", T::TABLE, id);
                self.collection.confirm(id, None);
                self.collection.apply(Change::Deleted(id.to_string()));
                Ok(stored)
            }
            Err(e) => {
                self.collection.rollback(id);
                self.notifier
                    .report(&format!("{} {}", action, T::TABLE.noun()), &e);
                Err(e)
            }
        }
    }

    fn admits(&self, row: &T) -> bool {
        match serde_json::to_value(row) {
            Ok(value) => self.query.matches(&value),
            Err(e) => {
                tracing::warn!("Could not check {} against the view filter: {}", T::TABLE, e);
                true
            }
        }
    }

    fn ensure_mounted(&self) -> Result<()> {
        if self.scope.is_mounted() {
            Ok(())
        } else {
            Err(AppError::Generic(format!("{} view is unmounted", T::TABLE)))
        }
    }

    /// Tear the view down: no feed event reaches it afterwards
    pub fn unmount(&mut self) {
        self.scope.unmount();
        self.teardown();
    }

    fn teardown(&mut self) {
        if self.state != LoadState::Unmounted {
            tracing::info!("Unmounting {} view", T::TABLE);
        }
        self.subscription.unsubscribe();
        self.state = LoadState::Unmounted;
    }
}

impl<T: Record> Drop for View<T> {
    fn drop(&mut self) {
        self.scope.unmount();
    }
}
