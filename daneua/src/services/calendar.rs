//! Shared calendar
//!
//! Events are stored once; recurring ones are expanded into occurrences
//! when the calendar is read.

use super::checked_text;
use crate::app::AppContext;
use crate::backend::Query;
use crate::config::MAX_TITLE_LENGTH;
use crate::error::Result;
use crate::models::CalendarEvent;
use crate::sync::{LoadState, View};
use chrono::{Duration, NaiveDate};
use std::cmp::Ordering;

/// How far ahead `upcoming` looks
const UPCOMING_WINDOW_DAYS: i64 = 366;

fn by_start(a: &CalendarEvent, b: &CalendarEvent) -> Ordering {
    a.start_date
        .cmp(&b.start_date)
        .then_with(|| a.start_time.cmp(&b.start_time))
}

pub struct Calendar {
    ctx: AppContext,
    view: View<CalendarEvent>,
}

impl Calendar {
    pub async fn mount(ctx: &AppContext) -> Self {
        let view = View::mount_ordered(&ctx.gateway, &ctx.notifier, Query::new(), by_start).await;
        Self {
            ctx: ctx.clone(),
            view,
        }
    }

    pub fn events(&self) -> &[CalendarEvent] {
        self.view.rows()
    }

    pub fn state(&self) -> &LoadState {
        self.view.state()
    }

    pub async fn sync(&mut self) -> usize {
        self.view.sync().await
    }

    pub async fn add(&mut self, mut event: CalendarEvent) -> Result<CalendarEvent> {
        event.title = checked_text(&self.ctx.notifier, "Title", &event.title, MAX_TITLE_LENGTH)?;
        tracing::info!("Adding calendar event {} on {}", event.id, event.start_date);
        self.view.insert(event).await
    }

    pub async fn edit(&mut self, mut event: CalendarEvent) -> Result<CalendarEvent> {
        event.title = checked_text(&self.ctx.notifier, "Title", &event.title, MAX_TITLE_LENGTH)?;
        self.view.replace(event).await
    }

    pub async fn delete(&mut self, id: &str) -> Result<()> {
        self.view.remove(id).await
    }

    /// Every occurrence between `from` and `to` inclusive, in date order
    pub fn occurrences_between(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Vec<(NaiveDate, &CalendarEvent)> {
        let mut found = Vec::new();

        for event in self.events() {
            let mut cursor = from;
            while let Some(date) = event.next_occurrence(cursor) {
                if date > to {
                    break;
                }
                found.push((date, event));
                if event.recurrence().is_none() {
                    break;
                }
                cursor = date + Duration::days(1);
            }
        }

        found.sort_by(|(a, x), (b, y)| a.cmp(b).then_with(|| by_start(x, y)));
        found
    }

    /// The next `limit` occurrences from `today`
    pub fn upcoming(&self, today: NaiveDate, limit: usize) -> Vec<(NaiveDate, &CalendarEvent)> {
        let mut upcoming =
            self.occurrences_between(today, today + Duration::days(UPCOMING_WINDOW_DAYS));
        upcoming.truncate(limit);
        upcoming
    }

    pub fn unmount(&mut self) {
        self.view.unmount();
    }
}
