//! Progression state: one player's cards, energy and unlocked levels.
//!
//! ## ProgressionState
//!
//! The aggregate the engine transforms:
//! - Cards in catalog order, keyed by id
//! - The energy pool
//! - Unlocked content levels (always contains 1, never shrinks)
//!
//! Uses `im` persistent data structures so the engine can apply an
//! upgrade to an O(1) clone and hand back either the whole new state or
//! nothing at all.
//!
//! ## PersistedState
//!
//! Plain serde model for storage and sync. Restoring validates every
//! invariant before a `ProgressionState` is produced.

use im::{HashMap as ImHashMap, OrdSet, Vector};
use serde::{Deserialize, Serialize};

use super::clock::Timestamp;
use super::config::EnergyConfig;
use super::error::RestoreError;
use crate::cards::{default_catalog, Card, CardCatalog, CardId, Category};
use crate::energy::EnergyState;

/// The first content level, unlocked from the start.
pub const BASE_LEVEL: u32 = 1;

/// Serializable form of a progression state.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedState {
    pub cards: Vec<Card>,
    pub energy: EnergyState,
    pub unlocked_levels: Vec<u32>,
}

/// One player's progression state.
///
/// Only the engine mutates cards and levels; everything else reads.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(into = "PersistedState", try_from = "PersistedState")]
pub struct ProgressionState {
    cards: Vector<Card>,
    index: ImHashMap<CardId, usize>,
    energy: EnergyState,
    unlocked_levels: OrdSet<u32>,
}

impl ProgressionState {
    /// Create a fresh state from a catalog.
    ///
    /// All cards start at zero progress; only level 1 is unlocked. The
    /// energy pool is normalized, so energy never exceeds capacity.
    #[must_use]
    pub fn new(catalog: &CardCatalog, energy: EnergyState) -> Self {
        let energy = energy.normalized();
        let cards: Vector<Card> = catalog.instantiate().into_iter().collect();
        let index = cards
            .iter()
            .enumerate()
            .map(|(i, card)| (card.id.clone(), i))
            .collect();

        Self {
            cards,
            index,
            energy,
            unlocked_levels: OrdSet::unit(BASE_LEVEL),
        }
    }

    /// Create a fresh state with energy from configuration.
    #[must_use]
    pub fn from_config(catalog: &CardCatalog, energy: &EnergyConfig, now: Timestamp) -> Self {
        Self::new(catalog, EnergyState::from_config(energy, now))
    }

    /// The default game: built-in catalog, full energy, level 1 unlocked.
    #[must_use]
    pub fn default_at(now: Timestamp) -> Self {
        Self::from_config(&default_catalog(), &EnergyConfig::default(), now)
    }

    /// Rebuild a state from persisted parts, validating every invariant.
    pub fn restore(persisted: PersistedState) -> Result<Self, RestoreError> {
        let PersistedState {
            cards,
            energy,
            unlocked_levels,
        } = persisted;

        let mut index = ImHashMap::new();
        for (i, card) in cards.iter().enumerate() {
            if card.max_progress == 0 {
                return Err(RestoreError::ZeroMaxProgress(card.id.clone()));
            }
            if card.progress > card.max_progress {
                return Err(RestoreError::ProgressOutOfRange {
                    id: card.id.clone(),
                    progress: card.progress,
                    max_progress: card.max_progress,
                });
            }
            if !card.unlocked && card.progress > 0 {
                return Err(RestoreError::LockedWithProgress(card.id.clone()));
            }
            if index.insert(card.id.clone(), i).is_some() {
                return Err(RestoreError::DuplicateId(card.id.clone()));
            }
        }

        if energy.max_energy == 0 {
            return Err(RestoreError::ZeroMaxEnergy);
        }
        if energy.energy > energy.max_energy {
            return Err(RestoreError::EnergyOutOfRange {
                energy: energy.energy,
                max_energy: energy.max_energy,
            });
        }
        if !energy.regen_rate.is_finite() || energy.regen_rate < 0.0 {
            return Err(RestoreError::InvalidRegenRate(energy.regen_rate));
        }

        if unlocked_levels.contains(&0) {
            return Err(RestoreError::ZeroLevel);
        }
        if !unlocked_levels.contains(&BASE_LEVEL) {
            return Err(RestoreError::MissingBaseLevel);
        }

        Ok(Self {
            cards: cards.into_iter().collect(),
            index,
            energy,
            unlocked_levels: unlocked_levels.into_iter().collect(),
        })
    }

    /// Serializable copy of this state.
    #[must_use]
    pub fn to_persisted(&self) -> PersistedState {
        PersistedState {
            cards: self.cards.iter().cloned().collect(),
            energy: self.energy.clone(),
            unlocked_levels: self.unlocked_levels.iter().copied().collect(),
        }
    }

    // === Cards ===

    /// Get a card by id.
    #[must_use]
    pub fn card(&self, id: &str) -> Option<&Card> {
        self.index.get(id).and_then(|&i| self.cards.get(i))
    }

    /// Iterate over cards in catalog order.
    pub fn cards(&self) -> impl Iterator<Item = &Card> {
        self.cards.iter()
    }

    /// Number of cards.
    #[must_use]
    pub fn card_count(&self) -> usize {
        self.cards.len()
    }

    /// Cards of one category.
    pub fn cards_by_category(&self, category: Category) -> impl Iterator<Item = &Card> {
        self.cards.iter().filter(move |c| c.category == category)
    }

    /// Cards of one tier.
    pub fn cards_at_level(&self, level: u32) -> impl Iterator<Item = &Card> {
        self.cards.iter().filter(move |c| c.level == level)
    }

    /// Cards whose tier has been unlocked.
    pub fn available_cards(&self) -> impl Iterator<Item = &Card> {
        self.cards
            .iter()
            .filter(move |c| self.unlocked_levels.contains(&c.level))
    }

    /// Cards that can currently be upgraded.
    pub fn upgradable_cards(&self) -> impl Iterator<Item = &Card> {
        self.cards.iter().filter(|c| c.unlocked && !c.is_maxed())
    }

    // === Energy ===

    /// The energy pool as last committed (not refreshed).
    #[must_use]
    pub fn energy(&self) -> &EnergyState {
        &self.energy
    }

    // === Levels ===

    /// Unlocked levels in ascending order.
    pub fn unlocked_levels(&self) -> impl Iterator<Item = u32> + '_ {
        self.unlocked_levels.iter().copied()
    }

    /// Check if a level is unlocked.
    #[must_use]
    pub fn is_level_unlocked(&self, level: u32) -> bool {
        self.unlocked_levels.contains(&level)
    }

    /// Highest unlocked level.
    #[must_use]
    pub fn highest_level(&self) -> u32 {
        self.unlocked_levels.get_max().copied().unwrap_or(BASE_LEVEL)
    }

    // === Engine mutation ===

    pub(crate) fn card_index(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    pub(crate) fn card_at(&self, index: usize) -> Option<&Card> {
        self.cards.get(index)
    }

    pub(crate) fn set_progress(&mut self, index: usize, progress: u32) {
        if let Some(card) = self.cards.get_mut(index) {
            card.progress = progress.min(card.max_progress);
        }
    }

    pub(crate) fn unlock_card(&mut self, index: usize) {
        if let Some(card) = self.cards.get_mut(index) {
            card.unlocked = true;
        }
    }

    /// Returns true if the level was newly added.
    pub(crate) fn unlock_level(&mut self, level: u32) -> bool {
        level > 0 && self.unlocked_levels.insert(level).is_none()
    }

    pub(crate) fn energy_mut(&mut self) -> &mut EnergyState {
        &mut self.energy
    }

    pub(crate) fn set_energy(&mut self, energy: EnergyState) {
        self.energy = energy;
    }
}

impl From<ProgressionState> for PersistedState {
    fn from(state: ProgressionState) -> Self {
        state.to_persisted()
    }
}

impl TryFrom<PersistedState> for ProgressionState {
    type Error = RestoreError;

    fn try_from(persisted: PersistedState) -> Result<Self, Self::Error> {
        Self::restore(persisted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::CardDefinition;

    fn persisted() -> PersistedState {
        ProgressionState::default_at(Timestamp::from_secs(1)).to_persisted()
    }

    #[test]
    fn test_default_state() {
        let state = ProgressionState::default_at(Timestamp::from_secs(5));

        assert_eq!(state.card_count(), 10);
        assert_eq!(state.energy().energy, 100);
        assert_eq!(state.energy().max_energy, 100);
        assert_eq!(state.energy().last_update, Timestamp::from_secs(5));
        assert_eq!(state.unlocked_levels().collect::<Vec<_>>(), vec![1]);
        assert_eq!(state.highest_level(), 1);
    }

    #[test]
    fn test_card_lookup() {
        let state = ProgressionState::default_at(Timestamp::default());

        let sword = state.card("iron_sword").unwrap();
        assert_eq!(sword.level, 2);
        assert!(!sword.unlocked);
        assert!(state.card("nope").is_none());
        assert_eq!(state.card_index("wooden_sword"), Some(0));
    }

    #[test]
    fn test_filters() {
        let state = ProgressionState::default_at(Timestamp::default());

        assert_eq!(state.cards_by_category(Category::Armor).count(), 3);
        assert_eq!(state.cards_at_level(2).count(), 4);
        assert_eq!(state.available_cards().count(), 3);
        assert_eq!(state.upgradable_cards().count(), 3);
    }

    #[test]
    fn test_unlock_level() {
        let mut state = ProgressionState::default_at(Timestamp::default());

        assert!(state.unlock_level(3));
        assert!(!state.unlock_level(3));
        assert!(!state.unlock_level(1));
        assert!(!state.unlock_level(0));
        assert_eq!(state.unlocked_levels().collect::<Vec<_>>(), vec![1, 3]);
    }

    #[test]
    fn test_set_progress_clamps() {
        let mut state = ProgressionState::default_at(Timestamp::default());
        state.set_progress(0, 500);
        assert_eq!(state.card("wooden_sword").unwrap().progress, 20);
    }

    #[test]
    fn test_clone_is_independent() {
        let base = ProgressionState::default_at(Timestamp::default());
        let mut copy = base.clone();
        copy.set_progress(0, 4);
        copy.unlock_card(3);

        assert_eq!(base.card("wooden_sword").unwrap().progress, 0);
        assert!(!base.card("iron_sword").unwrap().unlocked);
        assert_ne!(base, copy);
    }

    #[test]
    fn test_restore_round_trip() {
        let mut state = ProgressionState::default_at(Timestamp::from_secs(9));
        state.set_progress(1, 6);
        state.unlock_level(2);

        let restored = ProgressionState::restore(state.to_persisted()).unwrap();
        assert_eq!(restored, state);
    }

    #[test]
    fn test_restore_rejects_duplicates() {
        let mut data = persisted();
        let first = data.cards[0].clone();
        data.cards.push(first);

        assert_eq!(
            ProgressionState::restore(data),
            Err(RestoreError::DuplicateId(CardId::new("wooden_sword")))
        );
    }

    #[test]
    fn test_restore_rejects_bad_progress() {
        let mut data = persisted();
        data.cards[0].progress = 21;
        assert!(matches!(
            ProgressionState::restore(data),
            Err(RestoreError::ProgressOutOfRange { .. })
        ));

        let mut data = persisted();
        data.cards[3].progress = 1; // iron_sword is locked
        assert!(matches!(
            ProgressionState::restore(data),
            Err(RestoreError::LockedWithProgress(_))
        ));
    }

    #[test]
    fn test_restore_rejects_bad_energy() {
        let mut data = persisted();
        data.energy.energy = 101;
        assert!(matches!(
            ProgressionState::restore(data),
            Err(RestoreError::EnergyOutOfRange { .. })
        ));

        let mut data = persisted();
        data.energy.regen_rate = -1.0;
        assert!(matches!(
            ProgressionState::restore(data),
            Err(RestoreError::InvalidRegenRate(_))
        ));
    }

    #[test]
    fn test_restore_requires_base_level() {
        let mut data = persisted();
        data.unlocked_levels = vec![2];
        assert_eq!(ProgressionState::restore(data), Err(RestoreError::MissingBaseLevel));
    }

    #[test]
    fn test_json_shape() {
        let catalog = CardCatalog::new(vec![CardDefinition::new(
            "a",
            "A",
            Category::Weapon,
            1,
        )])
        .unwrap();
        let state = ProgressionState::new(
            &catalog,
            EnergyState::new(50, 100, 1.0, Timestamp::from_millis(42)),
        );

        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(json["energy"]["energy"], 50);
        assert_eq!(json["energy"]["maxEnergy"], 100);
        assert_eq!(json["energy"]["lastUpdate"], 42);
        assert_eq!(json["unlockedLevels"], serde_json::json!([1]));
        assert_eq!(json["cards"][0]["id"], "a");

        let back: ProgressionState = serde_json::from_value(json).unwrap();
        assert_eq!(back, state);
    }

    #[test]
    fn test_new_normalizes_energy() {
        let energy = EnergyState {
            energy: 500,
            max_energy: 100,
            regen_rate: 1.0,
            last_update: Timestamp::from_secs(2),
        };
        let state = ProgressionState::new(&default_catalog(), energy);

        assert_eq!(state.energy().energy, 100);
        assert_eq!(state.energy().max_energy, 100);
        let restored = ProgressionState::restore(state.to_persisted()).unwrap();
        assert_eq!(restored, state);
    }

    #[test]
    fn test_deserialize_validates() {
        let json = serde_json::json!({
            "cards": [],
            "energy": { "energy": 10, "maxEnergy": 5, "regenRate": 1.0, "lastUpdate": 0 },
            "unlockedLevels": [1]
        });
        assert!(serde_json::from_value::<ProgressionState>(json).is_err());
    }
}
