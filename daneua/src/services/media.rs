//! Media vault
//!
//! Videos, recordings and photos kept for each other. An item with a future
//! unlock date stays sealed: opening it shows when it unlocks and does not
//! count as a view.

use super::checked_text;
use crate::app::AppContext;
use crate::backend::Query;
use crate::config::{MAX_TITLE_LENGTH, MEDIA_BUCKET};
use crate::error::{AppError, Result};
use crate::models::{MediaItem, MediaType, Table};
use crate::sync::{LoadState, View};
use chrono::{DateTime, Utc};

/// Result of opening a vault item
#[derive(Debug, Clone, PartialEq)]
pub enum OpenOutcome {
    /// Playable; the returned item carries the incremented view count
    Opened(MediaItem),
    Locked { unlock_date: DateTime<Utc> },
}

pub struct MediaVault {
    ctx: AppContext,
    category: Option<String>,
    view: View<MediaItem>,
}

impl MediaVault {
    /// Mount the vault, optionally limited to one category
    pub async fn mount(ctx: &AppContext, category: Option<&str>) -> Self {
        let query = match category {
            Some(category) => Query::new().eq("category", category),
            None => Query::new(),
        };

        Self {
            ctx: ctx.clone(),
            category: category.map(str::to_string),
            view: View::mount(&ctx.gateway, &ctx.notifier, query).await,
        }
    }

    pub fn items(&self) -> &[MediaItem] {
        self.view.rows()
    }

    pub fn state(&self) -> &LoadState {
        self.view.state()
    }

    pub async fn sync(&mut self) -> usize {
        self.view.sync().await
    }

    pub fn by_category(&self, category: &str) -> Vec<&MediaItem> {
        self.items()
            .iter()
            .filter(|item| item.category.as_deref() == Some(category))
            .collect()
    }

    pub fn categories(&self) -> Vec<&str> {
        let mut categories: Vec<&str> = self
            .items()
            .iter()
            .filter_map(|item| item.category.as_deref())
            .collect();
        categories.sort_unstable();
        categories.dedup();
        categories
    }

    pub fn favorites(&self) -> Vec<&MediaItem> {
        self.items().iter().filter(|item| item.is_favorite).collect()
    }

    /// Sealed items, shown with their unlock date
    pub fn locked(&self, now: DateTime<Utc>) -> Vec<&MediaItem> {
        self.items().iter().filter(|item| item.is_locked(now)).collect()
    }

    /// The category this vault was mounted on, if any
    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    /// Upload a file and add it to the vault. Without a category the item
    /// goes into the mounted one.
    pub async fn add(
        &mut self,
        title: &str,
        media_type: MediaType,
        data: &[u8],
        content_type: &str,
        category: Option<&str>,
        unlock_date: Option<DateTime<Utc>>,
    ) -> Result<MediaItem> {
        let title = checked_text(&self.ctx.notifier, "Title", title, MAX_TITLE_LENGTH)?;

        let url = match self.ctx.gateway.upload(MEDIA_BUCKET, data, content_type).await {
            Ok(url) => url,
            Err(e) => {
                self.ctx.notifier.report("upload memory", &e);
                return Err(e);
            }
        };

        let mut item = MediaItem::new(title, media_type, url);
        item.category = category.map(str::to_string).or_else(|| self.category.clone());
        item.unlock_date = unlock_date;
        self.view.insert(item).await
    }

    /// Open an item. Unlocked items count one more view.
    pub async fn open(&mut self, id: &str, now: DateTime<Utc>) -> Result<OpenOutcome> {
        let Some(item) = self.view.get(id) else {
            return Err(AppError::not_found(Table::MediaItems, id));
        };

        if let Some(unlock_date) = item.unlock_date.filter(|_| item.is_locked(now)) {
            tracing::debug!("Media item {} stays locked until {}", id, unlock_date);
            return Ok(OpenOutcome::Locked { unlock_date });
        }

        self.view
            .modify(id, |item| item.view_count += 1)
            .await
            .map(OpenOutcome::Opened)
    }

    pub async fn toggle_favorite(&mut self, id: &str) -> Result<MediaItem> {
        self.view
            .modify(id, |item| item.is_favorite = !item.is_favorite)
            .await
    }

    pub fn unmount(&mut self) {
        self.view.unmount();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;
    use crate::test_support::test_app;
    use chrono::Duration;

    #[tokio::test]
    async fn test_locked_item_is_not_counted() {
        let app = test_app(Role::Dane).await;
        let mut vault = MediaVault::mount(&app.ctx, None).await;
        let now = Utc::now();
        let unlock = now + Duration::days(30);

        let item = vault
            .add(
                "Birthday letter",
                MediaType::Video,
                b"video bytes",
                "video/mp4",
                None,
                Some(unlock),
            )
            .await
            .unwrap();

        assert_eq!(
            vault.open(&item.id, now).await.unwrap(),
            OpenOutcome::Locked { unlock_date: unlock }
        );
        assert_eq!(vault.items()[0].view_count, 0);
        assert_eq!(vault.locked(now).len(), 1);
    }

    #[tokio::test]
    async fn test_each_open_counts_a_view() {
        let app = test_app(Role::Shah).await;
        let mut vault = MediaVault::mount(&app.ctx, None).await;
        let now = Utc::now();

        let item = vault
            .add(
                "Beach",
                MediaType::Image,
                b"jpeg",
                "image/jpeg",
                None,
                Some(now - Duration::days(1)),
            )
            .await
            .unwrap();
        assert!(item.storage_url.contains("/media/"));

        vault.open(&item.id, now).await.unwrap();
        match vault.open(&item.id, now).await.unwrap() {
            OpenOutcome::Opened(opened) => assert_eq!(opened.view_count, 2),
            other => panic!("unexpected {:?}", other),
        }

        let stored = app.ctx.gateway.fetch_one::<MediaItem>(&item.id).await.unwrap();
        assert_eq!(stored.view_count, 2);
    }

    #[tokio::test]
    async fn test_favorites_and_categories() {
        let app = test_app(Role::Shah).await;
        let partner = app.partner_context();

        let mut song = MediaItem::new("Our song", MediaType::Audio, "https://x/song.mp3");
        song.category = Some("music".to_string());
        let mut trip = MediaItem::new("Hunza", MediaType::Image, "https://x/hunza.jpg");
        trip.category = Some("trips".to_string());
        partner.gateway.insert(&song).await.unwrap();
        partner.gateway.insert(&trip).await.unwrap();

        let mut vault = MediaVault::mount(&app.ctx, None).await;
        assert_eq!(vault.categories(), vec!["music", "trips"]);

        vault.toggle_favorite(&song.id).await.unwrap();
        assert_eq!(vault.favorites().len(), 1);
        assert_eq!(vault.by_category("trips")[0].id, trip.id);

        let music = MediaVault::mount(&app.ctx, Some("music")).await;
        assert_eq!(music.items().len(), 1);
    }

    #[tokio::test]
    async fn test_add_uses_mounted_category() {
        let app = test_app(Role::Dane).await;
        let mut music = MediaVault::mount(&app.ctx, Some("music")).await;

        let memo = music
            .add("Voice memo", MediaType::Audio, b"ogg", "audio/ogg", None, None)
            .await
            .unwrap();
        assert_eq!(memo.category.as_deref(), Some("music"));

        let trip = music
            .add("Hunza", MediaType::Image, b"png", "image/png", Some("trips"), None)
            .await
            .unwrap();
        assert!(music.view.get(&trip.id).is_none());

        music.view.reload().await;
        assert_eq!(music.items().len(), 1);
        assert_eq!(music.items()[0].id, memo.id);
    }

    #[tokio::test]
    async fn test_unknown_item_cannot_be_opened() {
        let app = test_app(Role::Shah).await;
        let mut vault = MediaVault::mount(&app.ctx, None).await;

        assert!(matches!(
            vault.open("nope", Utc::now()).await,
            Err(AppError::NotFound { .. })
        ));
    }
}
