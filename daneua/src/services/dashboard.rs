//! Home screen summary
//!
//! A one-shot read of what needs attention today. It does not subscribe;
//! the home screen reloads it when shown.

use crate::app::AppContext;
use crate::backend::Query;
use crate::error::Result;
use crate::models::{Countdown, DuaMessage, LoveNote, Todo};
use chrono::NaiveDate;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dashboard {
    pub open_todos: usize,
    pub todos_today: usize,
    pub unread_love_notes: usize,
    pub unread_duas: usize,
    /// Title and days remaining of the nearest countdown that has not passed
    pub next_countdown: Option<(String, i64)>,
}

impl Dashboard {
    pub async fn load(ctx: &AppContext, today: NaiveDate) -> Result<Self> {
        let role = ctx.role()?;
        let gateway = &ctx.gateway;

        let todos = gateway
            .fetch::<Todo>(&Query::new().eq("is_completed", false))
            .await?;

        let unread = Query::new()
            .eq("to_user", role.as_str())
            .eq("read", false);
        let unread_love_notes = gateway.fetch::<LoveNote>(&unread).await?.len();
        let unread_duas = gateway.fetch::<DuaMessage>(&unread).await?.len();

        let next_countdown = gateway
            .fetch::<Countdown>(
                &Query::new()
                    .gte("target_date", today.to_string())
                    .order_by("target_date", true)
                    .limit(1),
            )
            .await?
            .into_iter()
            .next()
            .map(|countdown| {
                let days = countdown.days_until(today);
                (countdown.title, days)
            });

        Ok(Self {
            open_todos: todos.len(),
            todos_today: todos.iter().filter(|todo| todo.is_relevant_on(today)).count(),
            unread_love_notes,
            unread_duas,
            next_countdown,
        })
    }
}

impl fmt::Display for Dashboard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} open to-dos ({} today), {} unread love notes, {} unread duas",
            self.open_todos, self.todos_today, self.unread_love_notes, self.unread_duas
        )?;
        if let Some((title, days)) = &self.next_countdown {
            write!(f, ", {} in {} days", title, days)?;
        }
        Ok(())
    }
}
