//! Session and identity
//!
//! The `Session` is owned by the application root. It resolves who is
//! signed in and publishes the result on a watch channel; views only ever
//! see the read-only `Identity` handle.

pub mod store;

pub use store::{PersistedSession, SessionStore};

use crate::error::{RemoteError, Result};
use crate::models::{Role, UserProfile};
use crate::sync::Gateway;
use tokio::sync::watch;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthState {
    Unauthenticated { error: Option<String> },
    Authenticating { role: Role },
    Authenticated(UserProfile),
}

impl AuthState {
    fn signed_out() -> Self {
        AuthState::Unauthenticated { error: None }
    }
}

/// Read-only view of the current identity
#[derive(Clone)]
pub struct Identity {
    rx: watch::Receiver<AuthState>,
}

impl Identity {
    /// A fixed identity that never changes
    pub fn signed_in(profile: UserProfile) -> Self {
        let (_tx, rx) = watch::channel(AuthState::Authenticated(profile));
        Self { rx }
    }

    pub fn current(&self) -> AuthState {
        self.rx.borrow().clone()
    }

    pub fn profile(&self) -> Option<UserProfile> {
        match &*self.rx.borrow() {
            AuthState::Authenticated(profile) => Some(profile.clone()),
            _ => None,
        }
    }

    pub fn role(&self) -> Option<Role> {
        self.profile().map(|profile| profile.role)
    }

    /// The active role, or an auth error when nobody is signed in
    pub fn require_role(&self) -> Result<Role> {
        self.role()
            .ok_or_else(|| RemoteError::Auth("not signed in".to_string()).into())
    }

    /// Wait for the state to change. `false` once the session is gone.
    pub async fn changed(&mut self) -> bool {
        self.rx.changed().await.is_ok()
    }
}

pub struct Session {
    store: SessionStore,
    gateway: Gateway,
    state: watch::Sender<AuthState>,
}

impl Session {
    pub fn new(store: SessionStore, gateway: Gateway) -> Self {
        let (state, _) = watch::channel(AuthState::signed_out());
        Self {
            store,
            gateway,
            state,
        }
    }

    pub fn identity(&self) -> Identity {
        Identity {
            rx: self.state.subscribe(),
        }
    }

    pub fn state(&self) -> AuthState {
        self.state.borrow().clone()
    }

    fn set(&self, state: AuthState) {
        self.state.send_replace(state);
    }

    /// Restore the persisted session. A missing or rejected profile removes
    /// the stale entry; a transient failure keeps it so `hydrate` can be
    /// retried.
    pub async fn hydrate(&self) -> AuthState {
        let persisted = match self.store.load().await {
            Ok(persisted) => persisted,
            Err(e) => {
                tracing::warn!("Could not read persisted session: {}", e);
                None
            }
        };

        let Some(persisted) = persisted else {
            tracing::info!("No persisted session");
            self.set(AuthState::signed_out());
            return self.state();
        };

        self.set(AuthState::Authenticating {
            role: persisted.role,
        });

        let error = match self.gateway.profile(persisted.role).await {
            Ok(Some(profile)) => {
                tracing::info!("Restored session for {}", profile.role);
                self.set(AuthState::Authenticated(profile));
                return self.state();
            }
            Ok(None) => {
                tracing::warn!("Persisted role {} has no profile", persisted.role);
                None
            }
            Err(e) if e.is_transient() => {
                tracing::warn!("Session for {} not restored yet: {}", persisted.role, e);
                self.set(AuthState::Unauthenticated {
                    error: Some(e.to_string()),
                });
                return self.state();
            }
            Err(e) => {
                tracing::warn!("Could not restore session for {}: {}", persisted.role, e);
                Some(e.to_string())
            }
        };

        self.forget().await;
        self.set(AuthState::Unauthenticated { error });
        self.state()
    }

    /// Sign in as `role`. The backend checks the PIN.
    pub async fn login(&self, role: Role, pin: &str) -> Result<UserProfile> {
        tracing::info!("Signing in as {}", role);
        self.set(AuthState::Authenticating { role });

        match self.gateway.verify_pin(role, pin).await {
            Ok(profile) => {
                if let Err(e) = self.store.save(&PersistedSession::new(role)).await {
                    tracing::warn!("Session for {} will not survive a restart: {}", role, e);
                }
                self.set(AuthState::Authenticated(profile.clone()));
                Ok(profile)
            }
            Err(e) => {
                tracing::warn!("Sign-in as {} failed: {}", role, e);
                self.set(AuthState::Unauthenticated {
                    error: Some(e.to_string()),
                });
                Err(e)
            }
        }
    }

    pub async fn logout(&self) {
        self.forget().await;
        self.set(AuthState::signed_out());
        tracing::info!("Signed out");
    }

    async fn forget(&self) {
        if let Err(e) = self.store.clear().await {
            tracing::warn!("Could not clear persisted session: {}", e);
        }
    }
}
