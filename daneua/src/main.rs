// D(ane)ua - shared space for two
// Entry point and application setup

use daneua::app::App;
use daneua::capabilities::StaticCapabilities;
use daneua::config::AppConfig;
use daneua::services::{self, Dashboard};
use daneua::session::AuthState;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "daneua=debug,info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting D(ane)ua");

    let config = AppConfig::from_env();
    // Headless: nothing can prompt for device access
    let mut app = App::open(config, Arc::new(StaticCapabilities::new())).await?;

    match app.session().hydrate().await {
        AuthState::Authenticated(profile) => {
            tracing::info!("Signed in as {} ({})", profile.display_name, profile.role);
            app.enable_notifications().await;

            match Dashboard::load(&app.context(), services::today()).await {
                Ok(dashboard) => tracing::info!("Today: {}", dashboard),
                Err(e) => tracing::error!("Could not load dashboard: {}", e),
            }
        }
        AuthState::Unauthenticated { error } => {
            if let Some(error) = error {
                tracing::warn!("Previous session could not be restored: {}", error);
            }
            tracing::info!("Nobody is signed in");
        }
        AuthState::Authenticating { role } => {
            tracing::warn!("Session for {} still resolving", role);
        }
    }

    for notification in app.notifications().drain() {
        tracing::info!("[{:?}] {}", notification.level, notification.message);
    }

    Ok(())
}
