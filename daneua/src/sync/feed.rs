//! Change feed subscriptions
//!
//! A `Subscription<T>` is one view's channel onto one table. It classifies
//! backend changes into `Change<T>` and yields them in delivery order.
//! Unsubscribing (or dropping) drops the receiver, so nothing published
//! before or after, including events already buffered, is ever delivered.

use crate::backend::{Query, RawChange, Signal, TableChange};
use crate::models::{Record, Role};
use std::marker::PhantomData;
use tokio::sync::broadcast::{self, error::RecvError, error::TryRecvError};

/// A classified row change
#[derive(Debug, Clone, PartialEq)]
pub enum Change<T> {
    Inserted(T),
    Updated(T),
    Deleted(String),
}

impl<T: Record> Change<T> {
    pub fn id(&self) -> &str {
        match self {
            Change::Inserted(row) | Change::Updated(row) => row.id(),
            Change::Deleted(id) => id,
        }
    }
}

/// What a subscription yields
#[derive(Debug, Clone, PartialEq)]
pub enum FeedEvent<T> {
    Change(Change<T>),
    /// The subscriber fell behind and this many events were dropped.
    /// Local state must be reloaded.
    Lagged(u64),
}

pub struct Subscription<T> {
    receiver: Option<broadcast::Receiver<TableChange>>,
    filter: Query,
    _row: PhantomData<fn() -> T>,
}

impl<T: Record> Subscription<T> {
    pub(crate) fn new(receiver: broadcast::Receiver<TableChange>, filter: Query) -> Self {
        tracing::debug!("Subscribed to {}", T::TABLE);
        Self {
            receiver: Some(receiver),
            filter,
            _row: PhantomData,
        }
    }

    pub fn is_active(&self) -> bool {
        self.receiver.is_some()
    }

    /// Stop receiving. Buffered events are discarded.
    pub fn unsubscribe(&mut self) {
        if self.receiver.take().is_some() {
            tracing::debug!("Unsubscribed from {}", T::TABLE);
        }
    }

    /// Next relevant event if one is already buffered
    pub fn try_next(&mut self) -> Option<FeedEvent<T>> {
        loop {
            let received = self.receiver.as_mut()?.try_recv();
            match received {
                Ok(change) => {
                    if let Some(change) = self.classify(change) {
                        return Some(FeedEvent::Change(change));
                    }
                }
                Err(TryRecvError::Empty) => return None,
                Err(TryRecvError::Lagged(missed)) => return Some(self.lagged(missed)),
                Err(TryRecvError::Closed) => {
                    tracing::warn!("Change feed for {} closed", T::TABLE);
                    self.unsubscribe();
                    return None;
                }
            }
        }
    }

    /// Wait for the next relevant event. `None` once unsubscribed or closed.
    pub async fn next(&mut self) -> Option<FeedEvent<T>> {
        loop {
            let received = self.receiver.as_mut()?.recv().await;
            match received {
                Ok(change) => {
                    if let Some(change) = self.classify(change) {
                        return Some(FeedEvent::Change(change));
                    }
                }
                Err(RecvError::Lagged(missed)) => return Some(self.lagged(missed)),
                Err(RecvError::Closed) => {
                    tracing::warn!("Change feed for {} closed", T::TABLE);
                    self.unsubscribe();
                    return None;
                }
            }
        }
    }

    fn lagged(&self, missed: u64) -> FeedEvent<T> {
        tracing::warn!("Change feed for {} lagged by {} events", T::TABLE, missed);
        FeedEvent::Lagged(missed)
    }

    /// Keep changes on our table that pass the filter. Deletes only carry an
    /// id, so they always pass; removing an absent row is a no-op anyway.
    fn classify(&self, change: TableChange) -> Option<Change<T>> {
        if change.table != T::TABLE {
            return None;
        }

        match change.change {
            RawChange::Inserted(row) if self.filter.matches(&row) => {
                decode(row).map(Change::Inserted)
            }
            RawChange::Updated(row) if self.filter.matches(&row) => {
                decode(row).map(Change::Updated)
            }
            // An update that moves a row out of our filter removes it here
            RawChange::Updated(row) => row
                .get("id")
                .and_then(|id| id.as_str())
                .map(|id| Change::Deleted(id.to_string())),
            RawChange::Inserted(_) => None,
            RawChange::Deleted(id) => Some(Change::Deleted(id)),
        }
    }
}

fn decode<T: Record>(row: serde_json::Value) -> Option<T> {
    match serde_json::from_value(row) {
        Ok(row) => Some(row),
        Err(e) => {
            tracing::warn!("Skipping malformed {} change: {}", T::TABLE, e);
            None
        }
    }
}

/// The partner's signals on one channel
pub struct SignalSubscription {
    receiver: Option<broadcast::Receiver<Signal>>,
    channel: String,
    me: Role,
}

impl SignalSubscription {
    pub(crate) fn new(receiver: broadcast::Receiver<Signal>, channel: &str, me: Role) -> Self {
        Self {
            receiver: Some(receiver),
            channel: channel.to_string(),
            me,
        }
    }

    pub fn unsubscribe(&mut self) {
        self.receiver = None;
    }

    /// Next buffered signal from the partner. Signals are best-effort, so
    /// lag just skips ahead.
    pub fn try_next(&mut self) -> Option<Signal> {
        loop {
            let received = self.receiver.as_mut()?.try_recv();
            match received {
                Ok(signal) if self.wants(&signal) => return Some(signal),
                Ok(_) => continue,
                Err(TryRecvError::Lagged(missed)) => {
                    tracing::debug!("Dropped {} signals on {}", missed, self.channel);
                }
                Err(TryRecvError::Empty) => return None,
                Err(TryRecvError::Closed) => {
                    self.receiver = None;
                    return None;
                }
            }
        }
    }

    pub async fn next(&mut self) -> Option<Signal> {
        loop {
            let received = self.receiver.as_mut()?.recv().await;
            match received {
                Ok(signal) if self.wants(&signal) => return Some(signal),
                Ok(_) => continue,
                Err(RecvError::Lagged(missed)) => {
                    tracing::debug!("Dropped {} signals on {}", missed, self.channel);
                }
                Err(RecvError::Closed) => {
                    self.receiver = None;
                    return None;
                }
            }
        }
    }

    fn wants(&self, signal: &Signal) -> bool {
        signal.channel == self.channel && signal.from != self.me
    }
}
