//! Mount lifetime of a view
//!
//! A `MountScope` is shared between a view and whoever tears it down. Work
//! run through `MountScope::run` yields nothing once the view is unmounted,
//! even if the work itself completed.

use std::future::Future;
use std::sync::Arc;
use tokio::sync::watch;

#[derive(Clone)]
pub struct MountScope {
    mounted: Arc<watch::Sender<bool>>,
}

impl Default for MountScope {
    fn default() -> Self {
        Self::new()
    }
}

impl MountScope {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(true);
        Self {
            mounted: Arc::new(tx),
        }
    }

    pub fn is_mounted(&self) -> bool {
        *self.mounted.borrow()
    }

    /// Mark the view unmounted. Takes effect immediately for every holder.
    pub fn unmount(&self) {
        self.mounted.send_replace(false);
    }

    /// Run `work` unless the view is unmounted first; results that arrive
    /// after unmount are discarded.
    pub async fn run<F: Future>(&self, work: F) -> Option<F::Output> {
        let mut mounted = self.mounted.subscribe();
        if !*mounted.borrow_and_update() {
            return None;
        }

        tokio::select! {
            output = work => self.is_mounted().then_some(output),
            _ = mounted.wait_for(|m| !*m) => None,
        }
    }
}
