//! Daily learning cards
//!
//! Each deck shows a few cards a day, advancing through the deck so both
//! users see the same cards on the same day.

use super::checked_text;
use crate::app::AppContext;
use crate::backend::Query;
use crate::config::{LEARNING_CARDS_PER_DAY, MAX_TITLE_LENGTH};
use crate::error::Result;
use crate::models::{cards_for_day, Deck, LearningCard};
use crate::sync::{LoadState, View};
use chrono::NaiveDate;

pub struct LearningDeck {
    ctx: AppContext,
    deck: Deck,
    view: View<LearningCard>,
}

impl LearningDeck {
    pub async fn mount(ctx: &AppContext, deck: Deck) -> Self {
        let query = Query::new().eq("deck", deck.as_str());
        let view = View::mount_ordered(
            &ctx.gateway,
            &ctx.notifier,
            query,
            |a: &LearningCard, b: &LearningCard| a.position.cmp(&b.position),
        )
        .await;

        Self {
            ctx: ctx.clone(),
            deck,
            view,
        }
    }

    pub fn deck(&self) -> Deck {
        self.deck
    }

    pub fn cards(&self) -> &[LearningCard] {
        self.view.rows()
    }

    pub fn state(&self) -> &LoadState {
        self.view.state()
    }

    pub async fn sync(&mut self) -> usize {
        self.view.sync().await
    }

    /// The cards for `day`
    pub fn cards_for(&self, day: NaiveDate) -> Vec<&LearningCard> {
        cards_for_day(self.cards(), day, LEARNING_CARDS_PER_DAY)
    }

    /// Append a card to the end of the deck
    pub async fn add(
        &mut self,
        front: &str,
        back: &str,
        transliteration: Option<String>,
    ) -> Result<LearningCard> {
        let front = checked_text(&self.ctx.notifier, "Front", front, MAX_TITLE_LENGTH)?;
        let back = checked_text(&self.ctx.notifier, "Back", back, MAX_TITLE_LENGTH)?;

        let position = self.cards().iter().map(|c| c.position).max().map_or(0, |p| p + 1);
        let mut card = LearningCard::new(self.deck, front, back, position);
        card.transliteration = transliteration;
        self.view.insert(card).await
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

    #[tokio::test]
    async fn test_decks_are_separate_and_rotate() {
        let app = test_app(Role::Dane).await;
        let mut language = LearningDeck::mount(&app.ctx, Deck::Language).await;
        let mut religious = LearningDeck::mount(&app.ctx, Deck::Religious).await;

        let words = [
            ("Shukriya", "Thank you"),
            ("Pyaar", "Love"),
            ("Ghar", "Home"),
            ("Dil", "Heart"),
        ];
        for (front, back) in words {
            language.add(front, back, None).await.unwrap();
        }
        religious
            .add("Bismillah", "In the name of God", None)
            .await
            .unwrap();

        religious.sync().await;
        language.sync().await;
        assert_eq!(language.cards().len(), 4);
        assert_eq!(religious.cards().len(), 1);
        assert_eq!(language.cards()[3].position, 3);

        let day = NaiveDate::from_ymd_opt(2026, 10, 15).unwrap();
        assert_eq!(language.cards_for(day).len(), LEARNING_CARDS_PER_DAY);
        assert_eq!(religious.cards_for(day).len(), 1);
    }
}
