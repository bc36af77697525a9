//! Quick notes, newest first

use super::checked_text;
use crate::app::AppContext;
use crate::backend::Query;
use crate::config::MAX_MESSAGE_LENGTH;
use crate::error::Result;
use crate::models::QuickNote;
use crate::sync::{LoadState, View};

pub struct QuickNotes {
    ctx: AppContext,
    view: View<QuickNote>,
}

impl QuickNotes {
    pub async fn mount(ctx: &AppContext) -> Self {
        let view = View::mount_ordered(
            &ctx.gateway,
            &ctx.notifier,
            Query::new(),
            |a: &QuickNote, b: &QuickNote| b.created_at.cmp(&a.created_at),
        )
        .await;

        Self {
            ctx: ctx.clone(),
            view,
        }
    }

    pub fn notes(&self) -> &[QuickNote] {
        self.view.rows()
    }

    pub fn state(&self) -> &LoadState {
        self.view.state()
    }

    pub async fn sync(&mut self) -> usize {
        self.view.sync().await
    }

    pub async fn add(&mut self, content: &str) -> Result<QuickNote> {
        let content = checked_text(&self.ctx.notifier, "Note", content, MAX_MESSAGE_LENGTH)?;
        self.view.insert(QuickNote::new(content, self.ctx.role()?)).await
    }

    pub async fn delete(&mut self, id: &str) -> Result<()> {
        self.view.remove(id).await
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

    #[tokio::test]
    async fn test_newest_first() {
        let app = test_app(Role::Shah).await;
        let mut notes = QuickNotes::mount(&app.ctx).await;

        notes.add("Buy dates").await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        let newest = notes.add("Call Nani").await.unwrap();

        assert_eq!(notes.notes()[0].id, newest.id);
        notes.delete(&newest.id).await.unwrap();
        assert_eq!(notes.notes().len(), 1);
    }
}
