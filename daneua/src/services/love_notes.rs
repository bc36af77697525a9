//! Love notes
//!
//! Notes go from one user to the other, typed or spoken. The inbox shows
//! notes addressed to the signed-in user; reacting to a note consumes it.

use super::checked_text;
use crate::app::AppContext;
use crate::backend::{Query, Signal};
use crate::capabilities::{self, Capability};
use crate::config::{MAX_MESSAGE_LENGTH, REACTIONS_CHANNEL, VOICE_NOTES_BUCKET};
use crate::error::Result;
use crate::models::{LoveNote, Role};
use crate::sync::{LoadState, View};

pub struct LoveNotes {
    ctx: AppContext,
    role: Role,
    inbox: View<LoveNote>,
}

impl LoveNotes {
    pub async fn mount(ctx: &AppContext) -> Result<Self> {
        let role = ctx.role()?;
        let query = Query::new().eq("to_user", role.as_str());
        let inbox = View::mount_ordered(
            &ctx.gateway,
            &ctx.notifier,
            query,
            |a: &LoveNote, b: &LoveNote| b.created_at.cmp(&a.created_at),
        )
        .await;

        Ok(Self {
            ctx: ctx.clone(),
            role,
            inbox,
        })
    }

    /// Notes for the signed-in user, newest first
    pub fn inbox(&self) -> &[LoveNote] {
        self.inbox.rows()
    }

    pub fn unread(&self) -> Vec<&LoveNote> {
        self.inbox().iter().filter(|note| !note.read).collect()
    }

    pub fn state(&self) -> &LoadState {
        self.inbox.state()
    }

    pub async fn sync(&mut self) -> usize {
        self.inbox.sync().await
    }

    pub async fn send(&self, note: &str) -> Result<LoveNote> {
        let note = checked_text(&self.ctx.notifier, "Note", note, MAX_MESSAGE_LENGTH)?;
        self.deliver(LoveNote::new(self.role, note)).await
    }

    /// Send a recorded voice note. Needs the microphone.
    pub async fn send_voice(
        &self,
        caption: &str,
        audio: &[u8],
        content_type: &str,
    ) -> Result<LoveNote> {
        let microphone =
            capabilities::require(self.ctx.capabilities.as_ref(), Capability::Microphone).await;
        if let Err(e) = microphone {
            self.ctx.notifier.report("record a voice note", &e);
            return Err(e);
        }

        let url = self
            .ctx
            .gateway
            .upload(VOICE_NOTES_BUCKET, audio, content_type)
            .await
            .inspect_err(|e| self.ctx.notifier.report("upload voice note", e))?;

        let caption = caption.trim();
        let mut note = LoveNote::new(
            self.role,
            if caption.is_empty() { "Voice note" } else { caption },
        );
        note.audio_url = Some(url);
        self.deliver(note).await
    }

    async fn deliver(&self, note: LoveNote) -> Result<LoveNote> {
        tracing::info!("Sending love note {} to {}", note.id, note.to_user);
        let sent = self
            .ctx
            .gateway
            .insert(&note)
            .await
            .inspect_err(|e| self.ctx.notifier.report("send love note", e))?;

        self.ctx.notifier.success("Love note sent");
        Ok(sent)
    }

    pub async fn mark_read(&mut self, id: &str) -> Result<LoveNote> {
        self.inbox.modify(id, |note| note.read = true).await
    }

    /// React to a note. The note is removed; the sender hears about the
    /// reaction if they are online.
    pub async fn react(&mut self, id: &str, reaction: &str) -> Result<()> {
        self.inbox.remove(id).await?;

        let signal = Signal::new(REACTIONS_CHANNEL, self.role).with_payload(reaction);
        if let Err(e) = self.ctx.gateway.send_signal(signal) {
            tracing::warn!("Reaction to {} not delivered: {}", id, e);
        }
        Ok(())
    }

    pub fn unmount(&mut self) {
        self.inbox.unmount();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capabilities::{PermissionState, StaticCapabilities};
    use crate::error::AppError;
    use crate::test_support::{test_app, test_app_with};

    #[tokio::test]
    async fn test_note_lands_in_partner_inbox() {
        let app = test_app(Role::Shah).await;
        let partner = app.partner_context();

        let mut mine = LoveNotes::mount(&app.ctx).await.unwrap();
        let mut theirs = LoveNotes::mount(&partner).await.unwrap();

        mine.send("Thinking of you").await.unwrap();
        theirs.sync().await;
        mine.sync().await;

        assert!(mine.inbox().is_empty());
        assert_eq!(theirs.unread().len(), 1);
        assert_eq!(theirs.inbox()[0].from_user, Role::Shah);

        let id = theirs.inbox()[0].id.clone();
        theirs.mark_read(&id).await.unwrap();
        assert!(theirs.unread().is_empty());
    }

    #[tokio::test]
    async fn test_react_removes_note_and_signals() {
        let app = test_app(Role::Dane).await;
        let partner = app.partner_context();
        let mut reactions = app.ctx.gateway.subscribe_signals(REACTIONS_CHANNEL, Role::Dane);

        let sender = LoveNotes::mount(&app.ctx).await.unwrap();
        let mut receiver = LoveNotes::mount(&partner).await.unwrap();
        let note = sender.send("Salaam jaan").await.unwrap();
        receiver.sync().await;

        receiver.react(&note.id, "heart").await.unwrap();
        assert!(receiver.inbox().is_empty());

        let signal = reactions.try_next().unwrap();
        assert_eq!(signal.from, Role::Shah);
        assert_eq!(signal.payload.as_deref(), Some("heart"));
        assert!(app.ctx.gateway.fetch_one::<LoveNote>(&note.id).await.is_err());
    }

    #[tokio::test]
    async fn test_voice_note_needs_microphone() {
        let mut app = test_app_with(
            Role::Shah,
            StaticCapabilities::new().with(Capability::Microphone, PermissionState::Denied),
        )
        .await;
        let notes = LoveNotes::mount(&app.ctx).await.unwrap();

        let err = notes.send_voice("", b"ogg", "audio/ogg").await.unwrap_err();
        assert!(matches!(err, AppError::PermissionDenied(_)));
        assert!(app.notifications.try_next().is_some());
    }

    #[tokio::test]
    async fn test_voice_note_is_uploaded() {
        let app = test_app(Role::Shah).await;
        let notes = LoveNotes::mount(&app.ctx).await.unwrap();

        let note = notes.send_voice("  ", b"ogg data", "audio/ogg").await.unwrap();
        assert_eq!(note.note, "Voice note");
        assert!(note.audio_url.unwrap().contains("/voice-notes/"));
    }
}
