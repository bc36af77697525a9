//! Application root
//!
//! `App` owns the backend, the session and the notification center. Views
//! receive an `AppContext`, a cheap clone of the handles they are allowed
//! to use.

use crate::backend::{Backend, LocalBackend};
use crate::capabilities::{Capability, CapabilityProvider, PermissionState};
use crate::config::AppConfig;
use crate::crypto;
use crate::error::Result;
use crate::models::Role;
use crate::notify::{self, NotificationCenter, Notifier};
use crate::session::{Identity, Session, SessionStore};
use crate::sync::Gateway;
use std::sync::Arc;

/// Handles shared with every view
#[derive(Clone)]
pub struct AppContext {
    pub gateway: Gateway,
    pub notifier: Notifier,
    pub identity: Identity,
    pub capabilities: Arc<dyn CapabilityProvider>,
}

impl AppContext {
    pub fn new(
        gateway: Gateway,
        notifier: Notifier,
        identity: Identity,
        capabilities: Arc<dyn CapabilityProvider>,
    ) -> Self {
        Self {
            gateway,
            notifier,
            identity,
            capabilities,
        }
    }

    /// The signed-in role
    pub fn role(&self) -> Result<Role> {
        self.identity.require_role()
    }
}

pub struct App {
    config: AppConfig,
    backend: Arc<LocalBackend>,
    session: Session,
    notifier: Notifier,
    notifications: NotificationCenter,
    capabilities: Arc<dyn CapabilityProvider>,
}

impl App {
    /// Open the local backend, seed profiles and build the session
    pub async fn open(
        config: AppConfig,
        capabilities: Arc<dyn CapabilityProvider>,
    ) -> Result<Self> {
        tracing::info!("Initializing application");
        tracing::info!("Data directory: {:?}", config.data_dir);

        std::fs::create_dir_all(&config.data_dir)?;

        let backend = Arc::new(LocalBackend::open(&config).await?);
        seed_profiles(&backend, &config).await?;

        let gateway = Gateway::new(backend.clone());
        let session = Session::new(SessionStore::new(config.data_dir.clone()), gateway);
        let (notifier, notifications) = notify::channel();

        tracing::info!("Application initialized successfully");

        Ok(Self {
            config,
            backend,
            session,
            notifier,
            notifications,
            capabilities,
        })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn backend(&self) -> &LocalBackend {
        &self.backend
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn notifications(&mut self) -> &mut NotificationCenter {
        &mut self.notifications
    }

    /// Ask for the notification permission once someone is signed in.
    /// Returns whether system notifications may be shown; in-app
    /// notifications work either way.
    pub async fn enable_notifications(&self) -> bool {
        match self.capabilities.request(Capability::Notifications).await {
            PermissionState::Granted => {
                tracing::info!("System notifications enabled");
                true
            }
            state => {
                tracing::info!("System notifications off ({:?})", state);
                false
            }
        }
    }

    /// Handles for a view; the identity follows later logins and logouts
    pub fn context(&self) -> AppContext {
        AppContext::new(
            Gateway::new(self.backend.clone()),
            self.notifier.clone(),
            self.session.identity(),
            self.capabilities.clone(),
        )
    }
}

fn default_display_name(role: Role) -> &'static str {
    match role {
        Role::Shah => "Shah",
        Role::Dane => "Dane",
    }
}

/// Create missing profiles from the configured PINs
async fn seed_profiles(backend: &LocalBackend, config: &AppConfig) -> Result<()> {
    for (role, pin) in [
        (Role::Shah, config.shah_pin.as_deref()),
        (Role::Dane, config.dane_pin.as_deref()),
    ] {
        match pin {
            Some(pin) => {
                crypto::validate_pin(pin)?;
                backend
                    .ensure_profile(role, default_display_name(role), pin)
                    .await?;
            }
            None => {
                if backend.profile(role).await?.is_none() {
                    tracing::warn!(
                        "No profile for {} and no PIN configured; sign-in as {} is unavailable",
                        role,
                        role
                    );
                }
            }
        }
    }
    Ok(())
}
