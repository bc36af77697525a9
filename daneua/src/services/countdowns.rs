//! Countdowns to dates that matter

use super::checked_text;
use crate::app::AppContext;
use crate::backend::Query;
use crate::config::MAX_TITLE_LENGTH;
use crate::error::Result;
use crate::models::Countdown;
use crate::sync::{LoadState, View};
use chrono::NaiveDate;

pub struct Countdowns {
    ctx: AppContext,
    view: View<Countdown>,
}

impl Countdowns {
    pub async fn mount(ctx: &AppContext) -> Self {
        let view = View::mount_ordered(
            &ctx.gateway,
            &ctx.notifier,
            Query::new(),
            |a: &Countdown, b: &Countdown| a.target_date.cmp(&b.target_date),
        )
        .await;

        Self {
            ctx: ctx.clone(),
            view,
        }
    }

    pub fn countdowns(&self) -> &[Countdown] {
        self.view.rows()
    }

    pub fn state(&self) -> &LoadState {
        self.view.state()
    }

    pub async fn sync(&mut self) -> usize {
        self.view.sync().await
    }

    pub async fn add(
        &mut self,
        title: &str,
        target_date: NaiveDate,
        emoji: Option<String>,
    ) -> Result<Countdown> {
        let title = checked_text(&self.ctx.notifier, "Title", title, MAX_TITLE_LENGTH)?;
        self.view.insert(Countdown::new(title, target_date, emoji)).await
    }

    pub async fn delete(&mut self, id: &str) -> Result<()> {
        self.view.remove(id).await
    }

    /// Every countdown with its days remaining, soonest first. Past dates
    /// show zero.
    pub fn remaining(&self, today: NaiveDate) -> Vec<(i64, &Countdown)> {
        let mut remaining: Vec<_> = self
            .countdowns()
            .iter()
            .map(|countdown| (countdown.days_until(today), countdown))
            .collect();
        remaining.sort_by_key(|(days, _)| *days);
        remaining
    }

    pub fn unmount(&mut self) {
        self.view.unmount();
    }
}
