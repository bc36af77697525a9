//! Flashcards for daily language and religious learning.

use super::{new_id, Record, Table};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Deck {
    Language,
    Religious,
}

impl Deck {
    pub fn as_str(&self) -> &'static str {
        match self {
            Deck::Language => "language",
            Deck::Religious => "religious",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LearningCard {
    pub id: String,
    pub deck: Deck,
    pub front: String,
    pub back: String,
    #[serde(default)]
    pub transliteration: Option<String>,
    /// Position of the card within its deck
    #[serde(default)]
    pub position: i64,
}

impl LearningCard {
    pub fn new(
        deck: Deck,
        front: impl Into<String>,
        back: impl Into<String>,
        position: i64,
    ) -> Self {
        Self {
            id: new_id(),
            deck,
            front: front.into(),
            back: back.into(),
            transliteration: None,
            position,
        }
    }
}

impl Record for LearningCard {
    const TABLE: Table = Table::LearningCards;

    fn id(&self) -> &str {
        &self.id
    }
}

/// The cards shown on `day`: a window of `per_day` cards that advances
/// through the deck one window per day and wraps around. Both users see the
/// same cards on the same day.
pub fn cards_for_day(cards: &[LearningCard], day: NaiveDate, per_day: usize) -> Vec<&LearningCard> {
    if cards.is_empty() || per_day == 0 {
        return Vec::new();
    }

    let mut ordered: Vec<&LearningCard> = cards.iter().collect();
    ordered.sort_by(|a, b| a.position.cmp(&b.position).then_with(|| a.id.cmp(&b.id)));

    let len = ordered.len();
    let take = per_day.min(len);
    let start = (day.num_days_from_ce().unsigned_abs() as usize * take) % len;

    (0..take).map(|i| ordered[(start + i) % len]).collect()
}
