//! Dua exchange
//!
//! Prayers sent to the other user. The inbox holds those addressed to the
//! signed-in user until they are acknowledged.

use super::checked_text;
use crate::app::AppContext;
use crate::backend::Query;
use crate::config::{MAX_MESSAGE_LENGTH, MAX_TITLE_LENGTH};
use crate::error::Result;
use crate::models::{DuaMessage, Role};
use crate::sync::{LoadState, View};

pub struct DuaExchange {
    ctx: AppContext,
    role: Role,
    inbox: View<DuaMessage>,
}

impl DuaExchange {
    pub async fn mount(ctx: &AppContext) -> Result<Self> {
        let role = ctx.role()?;
        let query = Query::new().eq("to_user", role.as_str());
        let inbox = View::mount_ordered(
            &ctx.gateway,
            &ctx.notifier,
            query,
            |a: &DuaMessage, b: &DuaMessage| b.created_at.cmp(&a.created_at),
        )
        .await;

        Ok(Self {
            ctx: ctx.clone(),
            role,
            inbox,
        })
    }

    pub fn inbox(&self) -> &[DuaMessage] {
        self.inbox.rows()
    }

    /// Duas not yet acknowledged, newest first
    pub fn unread(&self) -> Vec<&DuaMessage> {
        self.inbox().iter().filter(|dua| !dua.read).collect()
    }

    pub fn state(&self) -> &LoadState {
        self.inbox.state()
    }

    pub async fn sync(&mut self) -> usize {
        self.inbox.sync().await
    }

    pub async fn send(&self, category: &str, message: &str) -> Result<DuaMessage> {
        let category = checked_text(&self.ctx.notifier, "Category", category, MAX_TITLE_LENGTH)?;
        let message = checked_text(&self.ctx.notifier, "Dua", message, MAX_MESSAGE_LENGTH)?;

        let dua = DuaMessage::new(self.role, category, message);
        tracing::info!("Sending dua {} to {}", dua.id, dua.to_user);

        let sent = self
            .ctx
            .gateway
            .insert(&dua)
            .await
            .inspect_err(|e| self.ctx.notifier.report("send dua", e))?;
        self.ctx.notifier.success("Dua sent");
        Ok(sent)
    }

    /// Mark a dua as received
    pub async fn acknowledge(&mut self, id: &str) -> Result<DuaMessage> {
        self.inbox.modify(id, |dua| dua.read = true).await
    }

    pub fn unmount(&mut self) {
        self.inbox.unmount();
    }
}
