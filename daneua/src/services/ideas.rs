//! Idea documents
//!
//! Documents live in a fixed set of folders. Both users can edit the same
//! document; each save replaces it wholesale, so the last save wins. While
//! one user types, the other sees a typing indicator.

use super::checked_text;
use crate::app::AppContext;
use crate::backend::{Query, Signal};
use crate::config::{folder_name, IDEA_FOLDERS, MAX_TITLE_LENGTH, TYPING_CHANNEL};
use crate::error::{AppError, Result};
use crate::models::{IdeaDocument, Role};
use crate::sync::{LoadState, SignalSubscription, TypingIndicator, View};
use chrono::Utc;
use tokio::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Folder {
    pub id: &'static str,
    pub name: &'static str,
}

pub fn folders() -> Vec<Folder> {
    IDEA_FOLDERS
        .iter()
        .map(|&(id, name)| Folder { id, name })
        .collect()
}

pub struct Ideas {
    ctx: AppContext,
    role: Role,
    view: View<IdeaDocument>,
    typing_signals: SignalSubscription,
    typing: TypingIndicator,
}

impl Ideas {
    pub async fn mount(ctx: &AppContext) -> Result<Self> {
        let role = ctx.role()?;
        let typing_signals = ctx.gateway.subscribe_signals(TYPING_CHANNEL, role);
        let view = View::mount_ordered(
            &ctx.gateway,
            &ctx.notifier,
            Query::new(),
            |a: &IdeaDocument, b: &IdeaDocument| b.updated_at.cmp(&a.updated_at),
        )
        .await;

        Ok(Self {
            ctx: ctx.clone(),
            role,
            view,
            typing_signals,
            typing: TypingIndicator::default(),
        })
    }

    /// All documents, most recently edited first
    pub fn documents(&self) -> &[IdeaDocument] {
        self.view.rows()
    }

    pub fn get(&self, id: &str) -> Option<&IdeaDocument> {
        self.view.get(id)
    }

    pub fn in_folder(&self, folder_id: &str) -> Vec<&IdeaDocument> {
        self.documents()
            .iter()
            .filter(|doc| doc.folder_id == folder_id)
            .collect()
    }

    pub fn state(&self) -> &LoadState {
        self.view.state()
    }

    pub async fn sync(&mut self) -> usize {
        self.view.sync().await
    }

    pub async fn create(&mut self, folder_id: &str, title: &str) -> Result<IdeaDocument> {
        if folder_name(folder_id).is_none() {
            let err = AppError::Invalid(format!("unknown folder: {}", folder_id));
            self.ctx.notifier.report("create idea", &err);
            return Err(err);
        }

        let title = checked_text(&self.ctx.notifier, "Title", title, MAX_TITLE_LENGTH)?;
        self.view
            .insert(IdeaDocument::new(folder_id, title, self.role))
            .await
    }

    /// Save the document as edited here, replacing whatever is stored
    pub async fn save(&mut self, id: &str, title: &str, content: &str) -> Result<IdeaDocument> {
        let title = checked_text(&self.ctx.notifier, "Title", title, MAX_TITLE_LENGTH)?;
        let content = content.to_string();

        tracing::debug!("Saving idea {}", id);
        self.view
            .modify(id, |doc| {
                doc.title = title;
                doc.content = content;
                doc.updated_at = Utc::now();
            })
            .await
    }

    pub async fn delete(&mut self, id: &str) -> Result<()> {
        self.view.remove(id).await
    }

    /// Tell the partner we are typing in `doc_id`. Best-effort.
    pub fn notify_typing(&self, doc_id: &str) {
        let signal = Signal::new(TYPING_CHANNEL, self.role).with_payload(doc_id);
        if let Err(e) = self.ctx.gateway.send_signal(signal) {
            tracing::debug!("Typing signal not sent: {}", e);
        }
    }

    /// Whether the partner typed within the indicator timeout
    pub fn partner_typing(&mut self, now: Instant) -> bool {
        while self.typing_signals.try_next().is_some() {
            self.typing.observe(now);
        }
        self.typing.is_typing(now)
    }

    pub fn unmount(&mut self) {
        self.view.unmount();
        self.typing_signals.unsubscribe();
        self.typing.clear();
    }
}
