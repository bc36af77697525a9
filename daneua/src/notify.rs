//! User-facing notifications
//!
//! Views get a `Notifier` handle explicitly and push notifications through
//! it; the application root owns the matching `NotificationCenter` and
//! renders what arrives. Every notification is also logged.

use crate::error::AppError;
use serde::Serialize;
use tokio::sync::mpsc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub level: Level,
    pub message: String,
    pub dismissible: bool,
}

/// Sending half, cloned into every view that reports to the user
#[derive(Clone)]
pub struct Notifier {
    tx: mpsc::UnboundedSender<Notification>,
}

/// Receiving half, owned by the application root
pub struct NotificationCenter {
    rx: mpsc::UnboundedReceiver<Notification>,
}

/// Create a connected notifier and notification center
pub fn channel() -> (Notifier, NotificationCenter) {
    let (tx, rx) = mpsc::unbounded_channel();
    (Notifier { tx }, NotificationCenter { rx })
}

impl Notifier {
    pub fn info(&self, message: impl Into<String>) {
        let message = message.into();
        tracing::info!("{}", message);
        self.push(Level::Info, message);
    }

    pub fn success(&self, message: impl Into<String>) {
        let message = message.into();
        tracing::info!("{}", message);
        self.push(Level::Success, message);
    }

    pub fn error(&self, message: impl Into<String>) {
        let message = message.into();
        tracing::error!("{}", message);
        self.push(Level::Error, message);
    }

    /// Report a failed operation, prefixed with what was being attempted
    pub fn report(&self, action: &str, err: &AppError) {
        self.error(format!("Could not {}: {}", action, err));
    }

    fn push(&self, level: Level, message: String) {
        let notification = Notification {
            level,
            message,
            dismissible: true,
        };

        if self.tx.send(notification).is_err() {
            tracing::debug!("Notification center closed; notification only logged");
        }
    }
}

impl NotificationCenter {
    /// Next pending notification without waiting
    pub fn try_next(&mut self) -> Option<Notification> {
        self.rx.try_recv().ok()
    }

    pub async fn next(&mut self) -> Option<Notification> {
        self.rx.recv().await
    }

    /// Take every pending notification
    pub fn drain(&mut self) -> Vec<Notification> {
        std::iter::from_fn(|| self.try_next()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RemoteError;

    #[test]
    fn test_notifications_arrive_in_order() {
        let (notifier, mut center) = channel();

        notifier.info("Loaded");
        notifier.report("toggle todo", &RemoteError::Network("offline".into()).into());

        let all = center.drain();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].level, Level::Info);
        assert_eq!(all[1].level, Level::Error);
        assert!(all[1].message.starts_with("Could not toggle todo"));
        assert!(all[1].dismissible);
        assert!(center.try_next().is_none());
    }

    #[test]
    fn test_notifier_survives_closed_center() {
        let (notifier, center) = channel();
        drop(center);
        notifier.success("Saved");
    }
}
