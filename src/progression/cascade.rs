//! Unlock cascade.
//!
//! When a card levels up, every locked card that names it as its
//! prerequisite is unlocked at once (fan-out). The cascade does not
//! recurse: a newly unlocked card can only cascade after it is itself
//! completed by a later upgrade.
//!
//! ## Level registration
//!
//! Only the highest level among the cards unlocked by one cascade is
//! added to the unlocked levels. If a card gates dependents on levels 2
//! and 3, level 3 is registered and level 2 is not. Another cascade may
//! fill the gap later.

use smallvec::SmallVec;
use tracing::info;

use crate::cards::CardId;
use crate::core::state::ProgressionState;

/// Effects of one cascade.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CascadeResult {
    /// Newly unlocked cards, in catalog order.
    pub unlocked: SmallVec<[CardId; 4]>,

    /// Level added to the unlocked set, if any.
    pub registered_level: Option<u32>,
}

impl CascadeResult {
    /// Check if nothing was unlocked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.unlocked.is_empty()
    }
}

/// Unlock every locked dependent of `completed` in `state`.
pub(crate) fn run_cascade(state: &mut ProgressionState, completed: &CardId) -> CascadeResult {
    let selected: SmallVec<[(usize, CardId, u32); 4]> = state
        .cards()
        .enumerate()
        .filter(|(_, card)| !card.unlocked && card.is_gated_by(completed))
        .map(|(i, card)| (i, card.id.clone(), card.level))
        .collect();

    let mut result = CascadeResult::default();
    let Some(max_level) = selected.iter().map(|(_, _, level)| *level).max() else {
        return result;
    };

    for (index, id, _) in selected {
        state.unlock_card(index);
        result.unlocked.push(id);
    }

    if state.unlock_level(max_level) {
        result.registered_level = Some(max_level);
    }

    info!(
        target: "progression.cascade",
        completed = %completed,
        unlocked = result.unlocked.len(),
        level = max_level,
        level_added = result.registered_level.is_some(),
        "cascade unlocked cards"
    );

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::{CardCatalog, CardDefinition, Category};
    use crate::core::Timestamp;
    use crate::energy::EnergyState;

    fn state(defs: Vec<CardDefinition>) -> ProgressionState {
        let catalog = CardCatalog::new(defs).unwrap();
        ProgressionState::new(&catalog, EnergyState::new(100, 100, 1.0, Timestamp::default()))
    }

    #[test]
    fn test_fan_out() {
        let mut state = state(vec![
            CardDefinition::new("a", "A", Category::Weapon, 1),
            CardDefinition::new("b", "B", Category::Weapon, 2).requires("a"),
            CardDefinition::new("c", "C", Category::Armor, 2).requires("a"),
            CardDefinition::new("d", "D", Category::Armor, 2).requires("b"),
        ]);

        let result = run_cascade(&mut state, &CardId::new("a"));

        let ids: Vec<_> = result.unlocked.iter().map(CardId::as_str).collect();
        assert_eq!(ids, vec!["b", "c"]);
        assert_eq!(result.registered_level, Some(2));
        assert!(state.card("b").unwrap().unlocked);
        assert!(state.card("c").unwrap().unlocked);
        assert!(!state.card("d").unwrap().unlocked); // no recursion
    }

    #[test]
    fn test_no_dependents() {
        let mut state = state(vec![CardDefinition::new("a", "A", Category::Weapon, 1)]);
        let before = state.clone();

        let result = run_cascade(&mut state, &CardId::new("a"));

        assert!(result.is_empty());
        assert_eq!(result.registered_level, None);
        assert_eq!(state, before);
    }

    #[test]
    fn test_already_unlocked_dependents_skipped() {
        let mut state = state(vec![
            CardDefinition::new("a", "A", Category::Weapon, 1),
            CardDefinition::new("b", "B", Category::Weapon, 1)
                .requires("a")
                .with_unlocked(true),
        ]);

        let result = run_cascade(&mut state, &CardId::new("a"));
        assert!(result.is_empty());
    }

    #[test]
    fn test_level_already_registered() {
        let mut state = state(vec![
            CardDefinition::new("a", "A", Category::Weapon, 1),
            CardDefinition::new("b", "B", Category::Weapon, 1).requires("a"),
        ]);

        let result = run_cascade(&mut state, &CardId::new("a"));
        assert_eq!(result.unlocked.len(), 1);
        assert_eq!(result.registered_level, None); // level 1 was already there
    }

    #[test]
    fn test_only_max_level_registered() {
        // Known quirk: mixed-level dependents register only the highest level.
        let mut state = state(vec![
            CardDefinition::new("a", "A", Category::Weapon, 1),
            CardDefinition::new("b", "B", Category::Weapon, 2).requires("a"),
            CardDefinition::new("c", "C", Category::Weapon, 3).requires("a"),
        ]);

        let result = run_cascade(&mut state, &CardId::new("a"));

        assert_eq!(result.registered_level, Some(3));
        assert_eq!(state.unlocked_levels().collect::<Vec<_>>(), vec![1, 3]);
        assert!(!state.is_level_unlocked(2));
    }
}
