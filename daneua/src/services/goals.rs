//! Goals and their milestones
//!
//! A goal's progress is derived from its milestones when read. Deleting a
//! goal removes its milestones first so no milestone ever points at a goal
//! that is gone.

use super::checked_text;
use crate::app::AppContext;
use crate::backend::Query;
use crate::config::MAX_TITLE_LENGTH;
use crate::error::{AppError, Result};
use crate::models::{goal_progress, Goal, Milestone, Table};
use crate::sync::{LoadState, View};

pub struct Goals {
    ctx: AppContext,
    goals: View<Goal>,
    milestones: View<Milestone>,
}

impl Goals {
    pub async fn mount(ctx: &AppContext) -> Self {
        let goals = View::mount_ordered(
            &ctx.gateway,
            &ctx.notifier,
            Query::new(),
            |a: &Goal, b: &Goal| a.created_at.cmp(&b.created_at),
        )
        .await;
        let milestones = View::mount(&ctx.gateway, &ctx.notifier, Query::new()).await;

        Self {
            ctx: ctx.clone(),
            goals,
            milestones,
        }
    }

    pub fn goals(&self) -> &[Goal] {
        self.goals.rows()
    }

    pub fn state(&self) -> &LoadState {
        self.goals.state()
    }

    pub fn milestones_for(&self, goal_id: &str) -> Vec<&Milestone> {
        self.milestones
            .rows()
            .iter()
            .filter(|m| m.goal_id == goal_id)
            .collect()
    }

    /// Percentage of the goal's milestones that are done
    pub fn progress(&self, goal_id: &str) -> u8 {
        goal_progress(goal_id, self.milestones.rows())
    }

    pub async fn sync(&mut self) -> usize {
        self.goals.sync().await + self.milestones.sync().await
    }

    pub async fn add_goal(&mut self, title: &str, description: Option<String>) -> Result<Goal> {
        let title = checked_text(&self.ctx.notifier, "Goal", title, MAX_TITLE_LENGTH)?;
        tracing::info!("Creating goal: {}", title);
        self.goals.insert(Goal::new(title, description)).await
    }

    pub async fn add_milestone(&mut self, goal_id: &str, title: &str) -> Result<Milestone> {
        if self.goals.get(goal_id).is_none() {
            let err = AppError::not_found(Table::Goals, goal_id);
            self.ctx.notifier.report("add milestone", &err);
            return Err(err);
        }

        let title = checked_text(&self.ctx.notifier, "Milestone", title, MAX_TITLE_LENGTH)?;
        self.milestones.insert(Milestone::new(goal_id, title)).await
    }

    pub async fn toggle_milestone(&mut self, id: &str) -> Result<Milestone> {
        self.milestones
            .modify(id, |milestone| milestone.completed = !milestone.completed)
            .await
    }

    pub async fn delete_milestone(&mut self, id: &str) -> Result<()> {
        self.milestones.remove(id).await
    }

    /// Delete a goal after all of its milestones, locally and remotely.
    /// Stops at the first failure, leaving the goal in place.
    pub async fn delete_goal(&mut self, goal_id: &str) -> Result<()> {
        tracing::info!("Deleting goal {}", goal_id);

        let mut ids: Vec<String> = self
            .milestones_for(goal_id)
            .into_iter()
            .map(|m| m.id.clone())
            .collect();

        // Milestones this view has not seen yet still have to go first
        let remote = match self
            .ctx
            .gateway
            .fetch::<Milestone>(&Query::new().eq("goal_id", goal_id))
            .await
        {
            Ok(remote) => remote,
            Err(e) => {
                self.ctx.notifier.report("delete goal", &e);
                return Err(e);
            }
        };
        for milestone in remote {
            if !ids.contains(&milestone.id) {
                ids.push(milestone.id);
            }
        }

        for id in &ids {
            self.milestones.remove(id).await?;
        }

        self.goals.remove(goal_id).await?;
        tracing::info!("Deleted goal {} with {} milestones", goal_id, ids.len());
        Ok(())
    }

    pub fn unmount(&mut self) {
        self.goals.unmount();
        self.milestones.unmount();
    }
}
