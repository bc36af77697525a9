//! Messages for a mood
//!
//! Picking a mood shows one message prepared for it, chosen at random by
//! the backend. Nothing here is live-updated.

use super::checked_text;
use crate::app::AppContext;
use crate::config::MAX_MESSAGE_LENGTH;
use crate::error::Result;
use crate::models::{Mood, MoodMessage};

pub struct MoodPicker {
    ctx: AppContext,
}

impl MoodPicker {
    pub fn new(ctx: &AppContext) -> Self {
        Self { ctx: ctx.clone() }
    }

    /// A random message for `mood`, or `None` if there is none yet
    pub async fn pick(&self, mood: Mood) -> Result<Option<MoodMessage>> {
        let picked = self
            .ctx
            .gateway
            .random_mood_message(mood)
            .await
            .inspect_err(|e| self.ctx.notifier.report("find a message", e))?;

        if picked.is_none() {
            tracing::debug!("No messages for mood {}", mood.as_str());
        }
        Ok(picked)
    }

    /// Leave a text message for a mood
    pub async fn add_text(&self, mood: Mood, content: &str) -> Result<MoodMessage> {
        let content = checked_text(&self.ctx.notifier, "Message", content, MAX_MESSAGE_LENGTH)?;
        self.ctx
            .gateway
            .insert(&MoodMessage::text(mood, content))
            .await
            .inspect_err(|e| self.ctx.notifier.report("save message", e))
    }
}
