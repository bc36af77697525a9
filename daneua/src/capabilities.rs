//! Device capabilities
//!
//! Notifications, microphone and camera are granted by the platform. Callers
//! request a capability, get Granted/Denied/Unavailable back and degrade
//! gracefully when they cannot proceed.

use crate::error::{AppError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    Notifications,
    Microphone,
    Camera,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Capability::Notifications => "notifications",
            Capability::Microphone => "microphone",
            Capability::Camera => "camera",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionState {
    Granted,
    Denied,
    Unavailable,
}

#[async_trait]
pub trait CapabilityProvider: Send + Sync {
    /// Ask for a capability, prompting the user if the platform does
    async fn request(&self, capability: Capability) -> PermissionState;
}

/// Request a capability and fail with `PermissionDenied` unless granted
pub async fn require(provider: &dyn CapabilityProvider, capability: Capability) -> Result<()> {
    match provider.request(capability).await {
        PermissionState::Granted => Ok(()),
        PermissionState::Denied => {
            tracing::warn!("{} permission denied", capability);
            Err(AppError::PermissionDenied(format!("{} access was refused", capability)))
        }
        PermissionState::Unavailable => {
            tracing::warn!("{} unavailable on this device", capability);
            Err(AppError::PermissionDenied(format!("{} is not available", capability)))
        }
    }
}

/// Fixed answers, for headless runs where nothing can prompt the user.
/// Capabilities without an answer are unavailable.
#[derive(Debug, Clone, Default)]
pub struct StaticCapabilities {
    answers: HashMap<Capability, PermissionState>,
}

impl StaticCapabilities {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, capability: Capability, state: PermissionState) -> Self {
        self.answers.insert(capability, state);
        self
    }

    /// Every capability granted
    pub fn granting_all() -> Self {
        Self::new()
            .with(Capability::Notifications, PermissionState::Granted)
            .with(Capability::Microphone, PermissionState::Granted)
            .with(Capability::Camera, PermissionState::Granted)
    }
}

#[async_trait]
impl CapabilityProvider for StaticCapabilities {
    async fn request(&self, capability: Capability) -> PermissionState {
        self.answers
            .get(&capability)
            .copied()
            .unwrap_or(PermissionState::Unavailable)
    }
}
