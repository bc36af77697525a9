//! Things to do together
//!
//! Plans are listed by date with undated plans last.

use super::checked_text;
use crate::app::AppContext;
use crate::backend::Query;
use crate::config::MAX_TITLE_LENGTH;
use crate::error::Result;
use crate::models::Plan;
use crate::sync::{LoadState, View};
use chrono::NaiveDate;
use std::cmp::Ordering;

fn by_date(a: &Plan, b: &Plan) -> Ordering {
    match (a.plan_date, b.plan_date) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

pub struct Plans {
    ctx: AppContext,
    view: View<Plan>,
}

impl Plans {
    pub async fn mount(ctx: &AppContext) -> Self {
        let view = View::mount_ordered(&ctx.gateway, &ctx.notifier, Query::new(), by_date).await;
        Self {
            ctx: ctx.clone(),
            view,
        }
    }

    pub fn plans(&self) -> &[Plan] {
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
        plan_date: Option<NaiveDate>,
        details: Option<String>,
    ) -> Result<Plan> {
        let title = checked_text(&self.ctx.notifier, "Plan", title, MAX_TITLE_LENGTH)?;
        let mut plan = Plan::new(title, plan_date, self.ctx.role()?);
        plan.details = details;
        self.view.insert(plan).await
    }

    pub async fn toggle_done(&mut self, id: &str) -> Result<Plan> {
        self.view.modify(id, |plan| plan.is_done = !plan.is_done).await
    }

    pub async fn delete(&mut self, id: &str) -> Result<()> {
        self.view.remove(id).await
    }

    /// Open plans from `today` on, undated ones last
    pub fn upcoming(&self, today: NaiveDate) -> Vec<&Plan> {
        self.plans()
            .iter()
            .filter(|plan| !plan.is_done && plan.plan_date.map_or(true, |date| date >= today))
            .collect()
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

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, d).unwrap()
    }

    #[tokio::test]
    async fn test_upcoming_skips_done_and_past() {
        let app = test_app(Role::Shah).await;
        let mut plans = Plans::mount(&app.ctx).await;

        plans.add("Picnic", Some(date(20)), None).await.unwrap();
        plans.add("Museum", Some(date(10)), None).await.unwrap();
        plans.add("Road trip", None, Some("Northern areas".to_string())).await.unwrap();
        let hike = plans.add("Hike", Some(date(18)), None).await.unwrap();
        plans.toggle_done(&hike.id).await.unwrap();

        let titles: Vec<_> = plans.upcoming(date(15)).iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, vec!["Picnic", "Road trip"]);
    }

    #[tokio::test]
    async fn test_partner_plans_appear_after_sync() {
        let app = test_app(Role::Dane).await;
        let mut plans = Plans::mount(&app.ctx).await;

        let partner = app.partner_context();
        partner
            .gateway
            .insert(&Plan::new("Cook biryani", Some(date(16)), Role::Shah))
            .await
            .unwrap();

        assert_eq!(plans.sync().await, 1);
        assert_eq!(plans.plans()[0].created_by, Role::Shah);

        let id = plans.plans()[0].id.clone();
        plans.delete(&id).await.unwrap();
        assert!(plans.plans().is_empty());
    }
}
