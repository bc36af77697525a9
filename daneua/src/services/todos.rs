//! Shared to-do list
//!
//! Sorted by due date then time, undated items last. Toggling is
//! optimistic and reverts with a notification when the write fails.

use super::checked_text;
use crate::app::AppContext;
use crate::backend::Query;
use crate::config::MAX_TITLE_LENGTH;
use crate::error::Result;
use crate::models::{by_due_date, Todo};
use crate::sync::{LoadState, View};
use chrono::{NaiveDate, NaiveTime};

pub struct TodoList {
    ctx: AppContext,
    view: View<Todo>,
}

impl TodoList {
    pub async fn mount(ctx: &AppContext) -> Self {
        let view =
            View::mount_ordered(&ctx.gateway, &ctx.notifier, Query::new(), by_due_date).await;
        Self {
            ctx: ctx.clone(),
            view,
        }
    }

    pub fn todos(&self) -> &[Todo] {
        self.view.rows()
    }

    pub fn get(&self, id: &str) -> Option<&Todo> {
        self.view.get(id)
    }

    pub fn state(&self) -> &LoadState {
        self.view.state()
    }

    /// Apply changes made elsewhere
    pub async fn sync(&mut self) -> usize {
        self.view.sync().await
    }

    pub async fn add(
        &mut self,
        title: &str,
        due_date: Option<NaiveDate>,
        due_time: Option<NaiveTime>,
    ) -> Result<Todo> {
        let title = checked_text(&self.ctx.notifier, "Title", title, MAX_TITLE_LENGTH)?;
        let mut todo = Todo::new(title, self.ctx.role()?);
        todo.due_date = due_date;
        todo.due_time = due_time;

        tracing::info!("Adding todo {}", todo.id);
        self.view.insert(todo).await
    }

    /// Flip completion. The list shows the new state immediately.
    pub async fn toggle(&mut self, id: &str) -> Result<Todo> {
        self.view
            .modify(id, |todo| todo.is_completed = !todo.is_completed)
            .await
    }

    pub async fn edit(&mut self, mut todo: Todo) -> Result<Todo> {
        todo.title = checked_text(&self.ctx.notifier, "Title", &todo.title, MAX_TITLE_LENGTH)?;
        self.view.replace(todo).await
    }

    pub async fn delete(&mut self, id: &str) -> Result<()> {
        self.view.remove(id).await
    }

    /// Due today, or overdue and still open
    pub fn today(&self, today: NaiveDate) -> Vec<&Todo> {
        self.todos()
            .iter()
            .filter(|todo| todo.is_relevant_on(today))
            .collect()
    }

    pub fn unmount(&mut self) {
        self.view.unmount();
    }
}
