//! Planner models: todos, calendar events, goals, milestones, plans and
//! countdowns.

use super::{new_id, Record, Role, Table};
use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Normal,
    High,
    Urgent,
}

/// A shared to-do item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Todo {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub due_time: Option<NaiveTime>,
    #[serde(default)]
    pub is_completed: bool,
    pub created_by: Role,
    pub created_at: DateTime<Utc>,
}

impl Todo {
    pub fn new(title: impl Into<String>, created_by: Role) -> Self {
        Self {
            id: new_id(),
            title: title.into(),
            description: None,
            priority: Priority::Normal,
            due_date: None,
            due_time: None,
            is_completed: false,
            created_by,
            created_at: Utc::now(),
        }
    }

    /// Due today, or overdue and still open
    pub fn is_relevant_on(&self, today: NaiveDate) -> bool {
        match self.due_date {
            Some(due) if due == today => true,
            Some(due) => due < today && !self.is_completed,
            None => false,
        }
    }
}

impl Record for Todo {
    const TABLE: Table = Table::Todos;

    fn id(&self) -> &str {
        &self.id
    }
}

/// Orders todos by due date then due time; undated todos go last.
pub fn by_due_date(a: &Todo, b: &Todo) -> Ordering {
    match (a.due_date, b.due_date) {
        (Some(x), Some(y)) => x.cmp(&y).then_with(|| match (a.due_time, b.due_time) {
            (Some(s), Some(t)) => s.cmp(&t),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventType {
    Date,
    Anniversary,
    Birthday,
    Reminder,
    #[default]
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recurrence {
    Weekly,
    Monthly,
    Yearly,
}

impl Recurrence {
    pub fn parse(rule: &str) -> Option<Self> {
        match rule.trim().to_ascii_lowercase().as_str() {
            "weekly" => Some(Recurrence::Weekly),
            "monthly" => Some(Recurrence::Monthly),
            "yearly" | "annually" => Some(Recurrence::Yearly),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarEvent {
    pub id: String,
    pub title: String,
    pub start_date: NaiveDate,
    #[serde(default)]
    pub start_time: Option<NaiveTime>,
    #[serde(default)]
    pub event_type: EventType,
    #[serde(default)]
    pub is_recurring: bool,
    #[serde(default)]
    pub recurrence_rule: Option<String>,
}

impl CalendarEvent {
    pub fn new(title: impl Into<String>, start_date: NaiveDate, event_type: EventType) -> Self {
        Self {
            id: new_id(),
            title: title.into(),
            start_date,
            start_time: None,
            event_type,
            is_recurring: false,
            recurrence_rule: None,
        }
    }

    /// Recurrence of a recurring event. Anniversaries and birthdays without
    /// an explicit rule repeat yearly.
    pub fn recurrence(&self) -> Option<Recurrence> {
        if !self.is_recurring {
            return None;
        }
        match self.recurrence_rule.as_deref().and_then(Recurrence::parse) {
            Some(rule) => Some(rule),
            None => match self.event_type {
                EventType::Anniversary | EventType::Birthday => Some(Recurrence::Yearly),
                _ => None,
            },
        }
    }

    /// First occurrence on or after `from`
    pub fn next_occurrence(&self, from: NaiveDate) -> Option<NaiveDate> {
        if self.start_date >= from {
            return Some(self.start_date);
        }

        let start = self.start_date;
        match self.recurrence()? {
            Recurrence::Weekly => {
                let days = (from - start).num_days();
                let weeks = (days + 6) / 7;
                Some(start + chrono::Duration::weeks(weeks))
            }
            Recurrence::Monthly => {
                let candidate = clamped_date(from.year(), from.month(), start.day())?;
                if candidate >= from {
                    Some(candidate)
                } else {
                    let (year, month) = if from.month() == 12 {
                        (from.year() + 1, 1)
                    } else {
                        (from.year(), from.month() + 1)
                    };
                    clamped_date(year, month, start.day())
                }
            }
            Recurrence::Yearly => {
                let candidate = clamped_date(from.year(), start.month(), start.day())?;
                if candidate >= from {
                    Some(candidate)
                } else {
                    clamped_date(from.year() + 1, start.month(), start.day())
                }
            }
        }
    }
}

impl Record for CalendarEvent {
    const TABLE: Table = Table::CalendarEvents;

    fn id(&self) -> &str {
        &self.id
    }
}

/// Build a date, pulling the day back to the end of shorter months
/// (31st → 30th/28th, 29 Feb → 28 Feb).
fn clamped_date(year: i32, month: u32, day: u32) -> Option<NaiveDate> {
    (28..=day.max(28))
        .rev()
        .find_map(|d| NaiveDate::from_ymd_opt(year, month, d.min(day)))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Goal {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Goal {
    pub fn new(title: impl Into<String>, description: Option<String>) -> Self {
        Self {
            id: new_id(),
            title: title.into(),
            description,
            created_at: Utc::now(),
        }
    }
}

impl Record for Goal {
    const TABLE: Table = Table::Goals;

    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Milestone {
    pub id: String,
    pub goal_id: String,
    pub title: String,
    #[serde(default)]
    pub completed: bool,
}

impl Milestone {
    pub fn new(goal_id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            goal_id: goal_id.into(),
            title: title.into(),
            completed: false,
        }
    }
}

impl Record for Milestone {
    const TABLE: Table = Table::Milestones;

    fn id(&self) -> &str {
        &self.id
    }
}

/// Completion percentage of a goal, from 0 to 100. A goal without
/// milestones is at 0.
pub fn goal_progress<'a>(goal_id: &str, milestones: impl IntoIterator<Item = &'a Milestone>) -> u8 {
    let (done, total) = milestones
        .into_iter()
        .filter(|m| m.goal_id == goal_id)
        .fold((0usize, 0usize), |(done, total), m| {
            (done + usize::from(m.completed), total + 1)
        });

    if total == 0 {
        return 0;
    }
    ((done * 100) / total) as u8
}

/// Something the two of them intend to do together
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub details: Option<String>,
    #[serde(default)]
    pub plan_date: Option<NaiveDate>,
    #[serde(default)]
    pub is_done: bool,
    pub created_by: Role,
}

impl Plan {
    pub fn new(title: impl Into<String>, plan_date: Option<NaiveDate>, created_by: Role) -> Self {
        Self {
            id: new_id(),
            title: title.into(),
            details: None,
            plan_date,
            is_done: false,
            created_by,
        }
    }
}

impl Record for Plan {
    const TABLE: Table = Table::Plans;

    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Countdown {
    pub id: String,
    pub title: String,
    pub target_date: NaiveDate,
    #[serde(default)]
    pub emoji: Option<String>,
}

impl Countdown {
    pub fn new(title: impl Into<String>, target_date: NaiveDate, emoji: Option<String>) -> Self {
        Self {
            id: new_id(),
            title: title.into(),
            target_date,
            emoji,
        }
    }

    /// Whole days from `today` to the target, never negative
    pub fn days_until(&self, today: NaiveDate) -> i64 {
        (self.target_date - today).num_days().max(0)
    }
}

impl Record for Countdown {
    const TABLE: Table = Table::Countdowns;

    fn id(&self) -> &str {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_countdown_days_until() {
        let today = Utc::now().date_naive();

        let ten = Countdown::new("Trip", today + Duration::days(10), None);
        assert_eq!(ten.days_until(today), 10);

        let now = Countdown::new("Today", today, None);
        assert_eq!(now.days_until(today), 0);

        let past = Countdown::new("Gone", today - Duration::days(3), None);
        assert_eq!(past.days_until(today), 0);
    }

    #[test]
    fn test_goal_progress() {
        let goal = Goal::new("Learn Urdu", None);
        let mut a = Milestone::new(&goal.id, "Alphabet");
        let b = Milestone::new(&goal.id, "Greetings");
        let other = Milestone::new("other-goal", "Ignored");
        a.completed = true;

        assert_eq!(goal_progress(&goal.id, [&a, &b, &other]), 50);
        assert_eq!(goal_progress(&goal.id, std::iter::empty()), 0);
    }

    #[test]
    fn test_todo_ordering_puts_undated_last() {
        let mut early = Todo::new("early", Role::Shah);
        early.due_date = Some(date(2026, 1, 1));
        let mut late = Todo::new("late", Role::Shah);
        late.due_date = Some(date(2026, 1, 1));
        late.due_time = NaiveTime::from_hms_opt(18, 0, 0);
        let undated = Todo::new("someday", Role::Dane);

        let mut todos = vec![undated.clone(), late.clone(), early.clone()];
        todos.sort_by(by_due_date);

        assert_eq!(todos[0].id, late.id);
        assert_eq!(todos[1].id, early.id);
        assert_eq!(todos[2].id, undated.id);
    }

    #[test]
    fn test_todo_relevance() {
        let today = date(2026, 10, 15);
        let mut todo = Todo::new("Call mom", Role::Dane);
        assert!(!todo.is_relevant_on(today));

        todo.due_date = Some(today - Duration::days(1));
        assert!(todo.is_relevant_on(today));

        todo.is_completed = true;
        assert!(!todo.is_relevant_on(today));
    }

    #[test]
    fn test_yearly_occurrence_rolls_to_next_year() {
        let mut event =
            CalendarEvent::new("Anniversary", date(2020, 3, 10), EventType::Anniversary);
        event.is_recurring = true;

        assert_eq!(event.next_occurrence(date(2026, 1, 1)), Some(date(2026, 3, 10)));
        assert_eq!(event.next_occurrence(date(2026, 3, 11)), Some(date(2027, 3, 10)));
    }

    #[test]
    fn test_leap_day_birthday_falls_back() {
        let mut event = CalendarEvent::new("Birthday", date(2000, 2, 29), EventType::Birthday);
        event.is_recurring = true;
        assert_eq!(event.next_occurrence(date(2026, 1, 1)), Some(date(2026, 2, 28)));
    }

    #[test]
    fn test_monthly_and_weekly_occurrences() {
        let mut monthly = CalendarEvent::new("Rent", date(2026, 1, 31), EventType::Reminder);
        monthly.is_recurring = true;
        monthly.recurrence_rule = Some("monthly".into());
        assert_eq!(monthly.next_occurrence(date(2026, 4, 2)), Some(date(2026, 4, 30)));

        let mut weekly = CalendarEvent::new("Call", date(2026, 10, 1), EventType::Other);
        weekly.is_recurring = true;
        weekly.recurrence_rule = Some("weekly".into());
        assert_eq!(weekly.next_occurrence(date(2026, 10, 9)), Some(date(2026, 10, 15)));
    }

    #[test]
    fn test_past_one_off_event_has_no_occurrence() {
        let event = CalendarEvent::new("Dinner", date(2026, 1, 1), EventType::Date);
        assert_eq!(event.next_occurrence(date(2026, 2, 1)), None);
    }
}
