//! Local state reconciler
//!
//! A view's in-memory collection, fed by three sources: the initial load,
//! optimistic local mutations and change-feed events. Rows are keyed by id
//! and replaced wholesale. Every optimistic mutation keeps the prior value
//! until its write is confirmed or rolled back.
//!
//! A feed event for a row with a pending write is authoritative: it drops
//! the pending rollback and the write's own response is ignored later.

use super::feed::Change;
use crate::error::{AppError, Result};
use crate::models::Record;
use std::cmp::Ordering;
use std::collections::HashMap;

pub type Comparator<T> = fn(&T, &T) -> Ordering;

struct Pending<T> {
    /// Row and position before the first unconfirmed mutation; `None` for an
    /// optimistic insert
    prior: Option<(usize, T)>,
    /// An authoritative change arrived while the write was in flight
    superseded: bool,
}

pub struct Collection<T: Record> {
    rows: Vec<T>,
    pending: HashMap<String, Pending<T>>,
    order: Option<Comparator<T>>,
}

impl<T: Record> Default for Collection<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Record> Collection<T> {
    /// Rows kept in arrival order
    pub fn new() -> Self {
        Self {
            rows: Vec::new(),
            pending: HashMap::new(),
            order: None,
        }
    }

    /// Rows kept sorted by `order` (stable, so ties keep arrival order)
    pub fn ordered(order: Comparator<T>) -> Self {
        Self {
            order: Some(order),
            ..Self::new()
        }
    }

    pub fn rows(&self) -> &[T] {
        &self.rows
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.rows.iter()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&T> {
        self.rows.iter().find(|row| row.id() == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.position(id).is_some()
    }

    /// Whether a write for this row is still awaiting its result
    pub fn is_pending(&self, id: &str) -> bool {
        self.pending.contains_key(id)
    }

    /// Replace everything with a fresh load. Duplicate ids keep the first
    /// position and the last value. Pending writes are forgotten.
    pub fn replace_all(&mut self, rows: Vec<T>) {
        self.rows.clear();
        self.pending.clear();
        for row in rows {
            self.put(row);
        }
        self.sort();
    }

    /// Apply a change-feed event. Returns whether local state changed.
    pub fn apply(&mut self, change: Change<T>) -> bool {
        if let Some(pending) = self.pending.get_mut(change.id()) {
            pending.superseded = true;
        }

        match change {
            Change::Inserted(row) | Change::Updated(row) => {
                self.upsert(row);
                true
            }
            Change::Deleted(id) => self.take(&id).is_some(),
        }
    }

    /// Add a row before the backend has it
    pub fn optimistic_insert(&mut self, row: T) {
        let id = row.id().to_string();
        let prior = self.position(&id).map(|i| (i, self.rows[i].clone()));
        self.remember(id, prior);
        self.upsert(row);
    }

    /// Mutate a row in place before the backend has the change; returns the
    /// new row
    pub fn optimistic_update<F>(&mut self, id: &str, mutate: F) -> Result<T>
    where
        F: FnOnce(&mut T),
    {
        let index = self
            .position(id)
            .ok_or_else(|| AppError::not_found(T::TABLE, id))?;

        self.remember(id.to_string(), Some((index, self.rows[index].clone())));
        mutate(&mut self.rows[index]);
        let updated = self.rows[index].clone();
        self.sort();
        Ok(updated)
    }

    /// Replace a row wholesale before the backend has it
    pub fn optimistic_replace(&mut self, row: T) -> Result<()> {
        let index = self
            .position(row.id())
            .ok_or_else(|| AppError::not_found(T::TABLE, row.id()))?;

        self.remember(row.id().to_string(), Some((index, self.rows[index].clone())));
        self.upsert(row);
        Ok(())
    }

    /// Remove a row before the backend confirms; `None` if it was not there
    pub fn optimistic_remove(&mut self, id: &str) -> Option<T> {
        let index = self.position(id)?;
        self.remember(id.to_string(), Some((index, self.rows[index].clone())));
        Some(self.rows.remove(index))
    }

    /// The write for `id` succeeded. The backend's row is applied unless a
    /// feed event already settled the row.
    pub fn confirm(&mut self, id: &str, stored: Option<T>) {
        let superseded = self
            .pending
            .remove(id)
            .is_some_and(|pending| pending.superseded);

        if superseded {
            tracing::debug!("Write to {} {} superseded by feed event", T::TABLE, id);
            return;
        }

        if let Some(row) = stored {
            self.upsert(row);
        }
    }

    /// The write for `id` failed; restore the prior state. Returns `false`
    /// when there was nothing to restore because a feed event settled it.
    pub fn rollback(&mut self, id: &str) -> bool {
        let Some(pending) = self.pending.remove(id) else {
            return false;
        };

        if pending.superseded {
            tracing::debug!("Not rolling back {} {}: feed event is newer", T::TABLE, id);
            return false;
        }

        match pending.prior {
            Some((index, row)) => match self.position(id) {
                Some(current) => self.rows[current] = row,
                None => {
                    let index = index.min(self.rows.len());
                    self.rows.insert(index, row);
                }
            },
            None => {
                self.take(id);
            }
        }
        self.sort();

        tracing::debug!("Rolled back {} {}", T::TABLE, id);
        true
    }

    fn remember(&mut self, id: String, prior: Option<(usize, T)>) {
        // The oldest unconfirmed state is the one to go back to
        self.pending.entry(id).or_insert(Pending {
            prior,
            superseded: false,
        });
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.rows.iter().position(|row| row.id() == id)
    }

    fn put(&mut self, row: T) {
        match self.position(row.id()) {
            Some(index) => self.rows[index] = row,
            None => self.rows.push(row),
        }
    }

    fn upsert(&mut self, row: T) {
        self.put(row);
        self.sort();
    }

    fn take(&mut self, id: &str) -> Option<T> {
        let index = self.position(id)?;
        Some(self.rows.remove(index))
    }

    fn sort(&mut self) {
        if let Some(order) = self.order {
            self.rows.sort_by(order);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{by_due_date, Priority, Role, Todo};
    use chrono::NaiveDate;

    fn todo(id: &str, title: &str) -> Todo {
        let mut todo = Todo::new(title, Role::Shah);
        todo.id = id.to_string();
        todo
    }

    fn ids(collection: &Collection<Todo>) -> Vec<&str> {
        collection.iter().map(|t| t.id.as_str()).collect()
    }

    #[test]
    fn test_insert_event_after_optimistic_insert_does_not_duplicate() {
        let mut todos = Collection::new();
        todos.optimistic_insert(todo("1", "Call mom"));

        todos.apply(Change::Inserted(todo("1", "Call mom")));
        todos.confirm("1", Some(todo("1", "Call mom")));

        assert_eq!(todos.len(), 1);
        assert!(!todos.is_pending("1"));
    }

    #[test]
    fn test_duplicate_insert_events_are_idempotent() {
        let mut todos = Collection::new();
        todos.apply(Change::Inserted(todo("1", "a")));
        todos.apply(Change::Inserted(todo("1", "a")));
        todos.apply(Change::Inserted(todo("2", "b")));

        assert_eq!(ids(&todos), vec!["1", "2"]);
    }

    #[test]
    fn test_update_replaces_wholesale() {
        let mut todos = Collection::new();
        let mut original = todo("1", "Call mom");
        original.description = Some("after work".into());
        todos.replace_all(vec![original]);

        todos.apply(Change::Updated(todo("1", "Call mom today")));

        let row = todos.get("1").unwrap();
        assert_eq!(row.title, "Call mom today");
        assert_eq!(row.description, None);
    }

    #[test]
    fn test_delete_of_missing_id_is_noop() {
        let mut todos = Collection::new();
        todos.replace_all(vec![todo("1", "a")]);

        assert!(!todos.apply(Change::Deleted("nope".into())));
        assert_eq!(todos.len(), 1);

        assert!(todos.apply(Change::Deleted("1".into())));
        assert!(!todos.apply(Change::Deleted("1".into())));
        assert!(todos.is_empty());
    }

    #[test]
    fn test_failed_toggle_reverts() {
        let mut todos = Collection::new();
        todos.replace_all(vec![todo("1", "Call mom")]);

        let toggled = todos
            .optimistic_update("1", |t| t.is_completed = !t.is_completed)
            .unwrap();
        assert!(toggled.is_completed);
        assert!(todos.get("1").unwrap().is_completed);

        assert!(todos.rollback("1"));
        assert!(!todos.get("1").unwrap().is_completed);
        assert!(!todos.is_pending("1"));
    }

    #[test]
    fn test_contradicting_event_beats_optimistic_value() {
        let mut todos = Collection::new();
        todos.replace_all(vec![todo("1", "Call mom")]);
        todos.optimistic_update("1", |t| t.is_completed = true).unwrap();

        // The other user un-completed it meanwhile
        let server = todo("1", "Call mom");
        todos.apply(Change::Updated(server));

        // Our stale write response must not win
        let mut stale = todo("1", "Call mom");
        stale.is_completed = true;
        todos.confirm("1", Some(stale));

        assert!(!todos.get("1").unwrap().is_completed);
    }

    #[test]
    fn test_rollback_after_event_keeps_server_value() {
        let mut todos = Collection::new();
        todos.replace_all(vec![todo("1", "Call mom")]);
        todos.optimistic_update("1", |t| t.is_completed = true).unwrap();

        let mut server = todo("1", "Call mom");
        server.priority = Priority::Urgent;
        todos.apply(Change::Updated(server));

        assert!(!todos.rollback("1"));
        assert_eq!(todos.get("1").unwrap().priority, Priority::Urgent);
    }

    #[test]
    fn test_failed_insert_and_remove_roll_back() {
        let mut todos = Collection::new();
        todos.replace_all(vec![todo("1", "a"), todo("2", "b"), todo("3", "c")]);

        todos.optimistic_insert(todo("4", "d"));
        assert!(todos.rollback("4"));
        assert!(!todos.contains("4"));

        let removed = todos.optimistic_remove("2").unwrap();
        assert_eq!(removed.title, "b");
        assert!(todos.rollback("2"));
        assert_eq!(ids(&todos), vec!["1", "2", "3"]);
    }

    #[test]
    fn test_remove_of_missing_row_is_none() {
        let mut todos: Collection<Todo> = Collection::new();
        assert!(todos.optimistic_remove("ghost").is_none());
        assert!(!todos.is_pending("ghost"));
    }

    #[test]
    fn test_update_of_missing_row_is_not_found() {
        let mut todos: Collection<Todo> = Collection::new();
        let result = todos.optimistic_update("ghost", |t| t.is_completed = true);
        assert!(matches!(result, Err(AppError::NotFound { .. })));
    }

    #[test]
    fn test_repeated_mutations_roll_back_to_oldest_state() {
        let mut todos = Collection::new();
        todos.replace_all(vec![todo("1", "v1")]);

        todos.optimistic_update("1", |t| t.title = "v2".into()).unwrap();
        todos.optimistic_update("1", |t| t.title = "v3".into()).unwrap();
        todos.rollback("1");

        assert_eq!(todos.get("1").unwrap().title, "v1");
    }

    #[test]
    fn test_ordered_collection_resorts() {
        let mut todos = Collection::ordered(by_due_date);
        let mut later = todo("later", "later");
        later.due_date = NaiveDate::from_ymd_opt(2026, 12, 1);
        let undated = todo("undated", "undated");
        todos.replace_all(vec![undated, later]);
        assert_eq!(ids(&todos), vec!["later", "undated"]);

        let mut sooner = todo("sooner", "sooner");
        sooner.due_date = NaiveDate::from_ymd_opt(2026, 11, 1);
        todos.apply(Change::Inserted(sooner));

        assert_eq!(ids(&todos), vec!["sooner", "later", "undated"]);
    }

    #[test]
    fn test_replace_all_dedupes() {
        let mut todos = Collection::new();
        todos.replace_all(vec![todo("1", "first"), todo("2", "b"), todo("1", "second")]);

        assert_eq!(ids(&todos), vec!["1", "2"]);
        assert_eq!(todos.get("1").unwrap().title, "second");
    }
}
