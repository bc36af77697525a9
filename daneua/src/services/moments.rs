//! Photo of the day
//!
//! Each user shares one photo a day. Sharing again on the same day
//! replaces the earlier photo.

use crate::app::AppContext;
use crate::backend::Query;
use crate::capabilities::{self, Capability};
use crate::config::MOMENTS_BUCKET;
use crate::error::Result;
use crate::models::{Moment, Role};
use crate::sync::{LoadState, View};
use chrono::NaiveDate;

/// Where the photo came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhotoSource {
    /// Captured now; needs the camera
    Camera,
    /// Picked from a file; needs no permission
    File,
}

pub struct Moments {
    ctx: AppContext,
    day: NaiveDate,
    view: View<Moment>,
}

impl Moments {
    /// Mount the moments shared on `day`
    pub async fn mount(ctx: &AppContext, day: NaiveDate) -> Self {
        let query = Query::new().eq("taken_on", day.to_string());
        Self {
            ctx: ctx.clone(),
            day,
            view: View::mount(&ctx.gateway, &ctx.notifier, query).await,
        }
    }

    pub fn day(&self) -> NaiveDate {
        self.day
    }

    pub fn moments(&self) -> &[Moment] {
        self.view.rows()
    }

    /// The photo `role` shared on this day
    pub fn moment_for(&self, role: Role) -> Option<&Moment> {
        self.moments().iter().find(|moment| moment.user_role == role)
    }

    pub fn state(&self) -> &LoadState {
        self.view.state()
    }

    pub async fn sync(&mut self) -> usize {
        self.view.sync().await
    }

    /// Upload and share a photo for this day
    pub async fn share(
        &mut self,
        source: PhotoSource,
        photo: &[u8],
        content_type: &str,
    ) -> Result<Moment> {
        let role = self.ctx.role()?;

        if source == PhotoSource::Camera {
            let camera =
                capabilities::require(self.ctx.capabilities.as_ref(), Capability::Camera).await;
            if let Err(e) = camera {
                self.ctx.notifier.report("take a photo", &e);
                return Err(e);
            }
        }

        let url = self
            .ctx
            .gateway
            .upload(MOMENTS_BUCKET, photo, content_type)
            .await
            .inspect_err(|e| self.ctx.notifier.report("upload photo", e))?;

        match self.moment_for(role).map(|moment| moment.id.clone()) {
            Some(id) => {
                tracing::info!("Replacing {}'s moment for {}", role, self.day);
                self.view.modify(&id, |moment| moment.photo_url = url).await
            }
            None => {
                tracing::info!("Sharing {}'s moment for {}", role, self.day);
                self.view.insert(Moment::new(role, url, self.day)).await
            }
        }
    }

    pub fn unmount(&mut self) {
        self.view.unmount();
    }
}
