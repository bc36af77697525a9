//! Feature services
//!
//! One controller per feature. Each owns the views it renders, exposes the
//! feature's operations and reports failures through the notifier.

pub mod calendar;
pub mod countdowns;
pub mod dashboard;
pub mod duas;
pub mod goals;
pub mod ideas;
pub mod learning;
pub mod love_notes;
pub mod media;
pub mod moments;
pub mod moods;
pub mod plans;
pub mod quick_notes;
pub mod todos;

pub use calendar::Calendar;
pub use countdowns::Countdowns;
pub use dashboard::Dashboard;
pub use duas::DuaExchange;
pub use goals::Goals;
pub use ideas::Ideas;
pub use learning::LearningDeck;
pub use love_notes::LoveNotes;
pub use media::{MediaVault, OpenOutcome};
pub use moments::{Moments, PhotoSource};
pub use moods::MoodPicker;
pub use plans::Plans;
pub use quick_notes::QuickNotes;
pub use todos::TodoList;

use crate::error::{AppError, Result};
use crate::notify::Notifier;
use chrono::NaiveDate;

/// Trim user-entered text and check it is present and not too long
pub(crate) fn checked_text(
    notifier: &Notifier,
    field: &str,
    value: &str,
    max: usize,
) -> Result<String> {
    let trimmed = value.trim();

    let problem = if trimmed.is_empty() {
        format!("{} cannot be empty", field)
    } else if trimmed.chars().count() > max {
        format!("{} cannot be longer than {} characters", field, max)
    } else {
        return Ok(trimmed.to_string());
    };

    notifier.error(problem.clone());
    Err(AppError::Invalid(problem))
}

/// The local calendar date
pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify;

    #[test]
    fn test_checked_text() {
        let (notifier, mut center) = notify::channel();

        assert_eq!(checked_text(&notifier, "Title", "  Trip  ", 10).unwrap(), "Trip");
        assert!(center.try_next().is_none());

        assert!(matches!(
            checked_text(&notifier, "Title", "   ", 10),
            Err(AppError::Invalid(_))
        ));
        assert!(checked_text(&notifier, "Title", "far too long a title", 10).is_err());
        assert_eq!(center.drain().len(), 2);
    }
}
