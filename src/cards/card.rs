//! Card runtime state.
//!
//! `Card` is the mutable view of a catalog entry inside a
//! `ProgressionState`. Only `progress` and `unlocked` ever change.
//!
//! ## State machine
//!
//! `Locked -> Unlocked(0) -> ... -> Unlocked(max_progress)` ("maxed").
//! The `Locked -> Unlocked` edge is only taken by an unlock cascade.

use serde::{Deserialize, Serialize};

use super::definition::{CardDefinition, CardId, Category};

/// A card's position in the progression state machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CardStatus {
    Locked,
    InProgress,
    Maxed,
}

/// A card inside a player's progression state.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub id: CardId,
    pub category: Category,
    pub level: u32,
    pub progress: u32,
    pub max_progress: u32,
    pub unlocked: bool,
    #[serde(default)]
    pub required_card_id: Option<CardId>,
}

impl Card {
    /// Instantiate a card from its definition with zero progress.
    #[must_use]
    pub fn from_definition(definition: &CardDefinition) -> Self {
        Self {
            id: definition.id.clone(),
            category: definition.category,
            level: definition.level,
            progress: 0,
            max_progress: definition.max_progress,
            unlocked: definition.unlocked,
            required_card_id: definition.required_card_id.clone(),
        }
    }

    /// Check if progress has reached the cap.
    #[must_use]
    pub fn is_maxed(&self) -> bool {
        self.progress >= self.max_progress
    }

    /// Current state machine position.
    #[must_use]
    pub fn status(&self) -> CardStatus {
        if !self.unlocked {
            CardStatus::Locked
        } else if self.is_maxed() {
            CardStatus::Maxed
        } else {
            CardStatus::InProgress
        }
    }

    /// Progress still needed to max.
    #[must_use]
    pub fn remaining_progress(&self) -> u32 {
        self.max_progress.saturating_sub(self.progress)
    }

    /// Check if completing `card` unlocks this card.
    #[must_use]
    pub fn is_gated_by(&self, card: &CardId) -> bool {
        self.required_card_id.as_ref() == Some(card)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card(progress: u32, unlocked: bool) -> Card {
        let mut card = Card::from_definition(
            &CardDefinition::new("a", "A", Category::Weapon, 1).with_max_progress(10),
        );
        card.progress = progress;
        card.unlocked = unlocked;
        card
    }

    #[test]
    fn test_from_definition() {
        let def = CardDefinition::new("b", "B", Category::Armor, 2)
            .with_max_progress(60)
            .requires("a");
        let card = Card::from_definition(&def);

        assert_eq!(card.id, CardId::new("b"));
        assert_eq!(card.progress, 0);
        assert_eq!(card.max_progress, 60);
        assert!(!card.unlocked);
        assert!(card.is_gated_by(&CardId::new("a")));
        assert!(!card.is_gated_by(&CardId::new("c")));
    }

    #[test]
    fn test_status() {
        assert_eq!(card(0, false).status(), CardStatus::Locked);
        assert_eq!(card(4, true).status(), CardStatus::InProgress);
        assert_eq!(card(10, true).status(), CardStatus::Maxed);
    }

    #[test]
    fn test_remaining_progress() {
        assert_eq!(card(4, true).remaining_progress(), 6);
        assert_eq!(card(10, true).remaining_progress(), 0);
    }
}
