//! Progression engine: validates and applies upgrade requests.
//!
//! Every operation takes the current state by reference and returns
//! either a complete new state plus an outcome, or an error with the
//! input untouched. Nothing is mutated before all preconditions pass.
//!
//! ## Preconditions (first failure wins)
//!
//! 1. `clicks` in `1..=limit` and a non-blank card id → `InvalidInput`
//! 2. card exists → `CardNotFound`
//! 3. card unlocked → `CardLocked`
//! 4. card below max progress → `AlreadyMaxed`
//! 5. refreshed energy covers `clicks * energy_per_click` → `InsufficientEnergy`
//!
//! Clicks beyond what is needed to max a card are still paid for.

use tracing::{debug, info};

use super::cascade::run_cascade;
use super::outcome::{EnergyStatus, UpgradeOutcome, UpgradeRequest};
use crate::core::clock::Timestamp;
use crate::core::config::EngineConfig;
use crate::core::error::UpgradeError;
use crate::core::state::ProgressionState;
use crate::energy::refresh;

/// Which click limit a request is checked against.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UpgradeMode {
    /// Interactive upgrade, limited by `max_clicks`.
    Single,
    /// Bulk upgrade, limited by `max_batch_clicks`.
    Batch,
}

/// Stateless upgrade rules parameterized by `EngineConfig`.
#[derive(Clone, Debug, Default)]
pub struct ProgressionEngine {
    config: EngineConfig,
}

impl ProgressionEngine {
    /// Create an engine.
    #[must_use]
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Get the configuration.
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Click limit for a mode.
    #[must_use]
    pub fn click_limit(&self, mode: UpgradeMode) -> u32 {
        match mode {
            UpgradeMode::Single => self.config.max_clicks,
            UpgradeMode::Batch => self.config.max_batch_clicks,
        }
    }

    /// Apply an interactive upgrade.
    pub fn apply_upgrade(
        &self,
        state: &ProgressionState,
        card_id: &str,
        clicks: u32,
        now: Timestamp,
    ) -> Result<(ProgressionState, UpgradeOutcome), UpgradeError> {
        self.apply(state, card_id, clicks, UpgradeMode::Single, now)
    }

    /// Apply a bulk upgrade. Same rules, larger click limit.
    pub fn apply_batch_upgrade(
        &self,
        state: &ProgressionState,
        card_id: &str,
        clicks: u32,
        now: Timestamp,
    ) -> Result<(ProgressionState, UpgradeOutcome), UpgradeError> {
        self.apply(state, card_id, clicks, UpgradeMode::Batch, now)
    }

    /// Apply a request in the given mode.
    pub fn apply_request(
        &self,
        state: &ProgressionState,
        request: &UpgradeRequest,
        mode: UpgradeMode,
        now: Timestamp,
    ) -> Result<(ProgressionState, UpgradeOutcome), UpgradeError> {
        self.apply(state, request.card_id.as_str(), request.clicks, mode, now)
    }

    fn apply(
        &self,
        state: &ProgressionState,
        card_id: &str,
        clicks: u32,
        mode: UpgradeMode,
        now: Timestamp,
    ) -> Result<(ProgressionState, UpgradeOutcome), UpgradeError> {
        let result = self.try_apply(state, card_id, clicks, mode, now);
        if let Err(err) = &result {
            debug!(
                target: "progression.upgrade",
                card = card_id,
                clicks,
                ?mode,
                kind = err.kind(),
                "upgrade rejected: {err}"
            );
        }
        result
    }

    fn try_apply(
        &self,
        state: &ProgressionState,
        card_id: &str,
        clicks: u32,
        mode: UpgradeMode,
        now: Timestamp,
    ) -> Result<(ProgressionState, UpgradeOutcome), UpgradeError> {
        let limit = self.click_limit(mode);
        if clicks == 0 || clicks > limit {
            return Err(UpgradeError::InvalidInput(format!(
                "clicks must be between 1 and {limit}, got {clicks}"
            )));
        }
        if card_id.trim().is_empty() {
            return Err(UpgradeError::InvalidInput("card id must not be empty".to_string()));
        }

        let index = state
            .card_index(card_id)
            .ok_or_else(|| UpgradeError::CardNotFound(card_id.into()))?;
        let card = state
            .card_at(index)
            .ok_or_else(|| UpgradeError::CardNotFound(card_id.into()))?;

        if !card.unlocked {
            return Err(UpgradeError::CardLocked(card.id.clone()));
        }
        if card.is_maxed() {
            return Err(UpgradeError::AlreadyMaxed(card.id.clone()));
        }

        let energy = refresh(state.energy(), now);
        let energy_needed = u64::from(clicks) * u64::from(self.config.energy_per_click);
        if energy_needed > u64::from(energy.energy) {
            return Err(UpgradeError::InsufficientEnergy {
                required: u32::try_from(energy_needed).unwrap_or(u32::MAX),
                available: energy.energy,
            });
        }
        // Bounded by the available energy.
        let energy_needed = energy_needed as u32;

        let old_progress = card.progress;
        let max_progress = card.max_progress;
        let level = card.level;
        let id = card.id.clone();

        let progress_gain = u64::from(clicks) * u64::from(self.config.progress_per_click);
        let new_progress =
            (u64::from(old_progress) + progress_gain).min(u64::from(max_progress)) as u32;
        let leveled_up = new_progress == max_progress && old_progress < max_progress;

        let mut next = state.clone();
        next.set_energy(energy);
        next.energy_mut().debit(energy_needed);
        next.set_progress(index, new_progress);

        let mut new_level = None;
        let mut unlocked_card_ids = Vec::new();
        if leveled_up {
            new_level = Some(level + 1);
            let cascade = run_cascade(&mut next, &id);
            unlocked_card_ids = cascade.unlocked.into_vec();

            info!(
                target: "progression.upgrade",
                card = %id,
                level,
                unlocked = unlocked_card_ids.len(),
                "card maxed"
            );
        }

        let outcome = UpgradeOutcome {
            success: true,
            card_id: id,
            new_progress,
            max_progress,
            energy_used: energy_needed,
            remaining_energy: next.energy().energy,
            leveled_up,
            new_level,
            unlocked_card_ids,
        };

        debug!(
            target: "progression.upgrade",
            card = %outcome.card_id,
            clicks,
            progress = new_progress,
            remaining_energy = outcome.remaining_energy,
            "upgrade applied"
        );

        Ok((next, outcome))
    }

    /// Spend energy directly, outside of any card upgrade.
    ///
    /// Refreshes first; `amount` must be in `1..=max_energy_spend` and
    /// covered by the refreshed energy.
    pub fn spend_energy(
        &self,
        state: &ProgressionState,
        amount: u32,
        now: Timestamp,
    ) -> Result<(ProgressionState, EnergyStatus), UpgradeError> {
        let limit = self.config.max_energy_spend;
        if amount == 0 || amount > limit {
            return Err(UpgradeError::InvalidInput(format!(
                "energy amount must be between 1 and {limit}, got {amount}"
            )));
        }

        let mut energy = refresh(state.energy(), now);
        if amount > energy.energy {
            return Err(UpgradeError::InsufficientEnergy {
                required: amount,
                available: energy.energy,
            });
        }
        energy.debit(amount);

        let status = EnergyStatus::from(&energy);
        let mut next = state.clone();
        next.set_energy(energy);

        debug!(target: "progression.energy", amount, remaining = status.energy, "energy spent");
        Ok((next, status))
    }

    /// Regenerated view of `state` at `now`.
    ///
    /// Only the energy pool changes; refreshing is idempotent.
    #[must_use]
    pub fn refreshed(&self, state: &ProgressionState, now: Timestamp) -> ProgressionState {
        let energy = refresh(state.energy(), now);
        if &energy == state.energy() {
            return state.clone();
        }
        let mut next = state.clone();
        next.set_energy(energy);
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::{CardCatalog, CardDefinition, CardId, Category};
    use crate::core::state::PersistedState;
    use crate::energy::EnergyState;

    const T0: Timestamp = Timestamp::from_secs(1_000);

    fn two_card_state(progress: u32, energy: u32) -> ProgressionState {
        let catalog = CardCatalog::new(vec![
            CardDefinition::new("a", "A", Category::Weapon, 1).with_max_progress(100),
            CardDefinition::new("b", "B", Category::Weapon, 2).requires("a"),
        ])
        .unwrap();
        let state = ProgressionState::new(&catalog, EnergyState::new(energy, 100, 1.0, T0));

        let mut persisted: PersistedState = state.into();
        persisted.cards[0].progress = progress;
        ProgressionState::restore(persisted).unwrap()
    }

    #[test]
    fn test_single_click() {
        let engine = ProgressionEngine::default();
        let state = two_card_state(0, 50);

        let (next, outcome) = engine.apply_upgrade(&state, "a", 1, T0).unwrap();

        assert_eq!(outcome.new_progress, 2);
        assert_eq!(outcome.energy_used, 1);
        assert_eq!(outcome.remaining_energy, 49);
        assert!(!outcome.leveled_up);
        assert_eq!(outcome.new_level, None);
        assert_eq!(next.card("a").unwrap().progress, 2);
        assert_eq!(state.card("a").unwrap().progress, 0);
    }

    #[test]
    fn test_level_up_unlocks_dependents() {
        let engine = ProgressionEngine::default();
        let state = two_card_state(98, 50);

        let (next, outcome) = engine.apply_upgrade(&state, "a", 1, T0).unwrap();

        assert!(outcome.leveled_up);
        assert_eq!(outcome.new_progress, 100);
        assert_eq!(outcome.new_level, Some(2));
        assert_eq!(outcome.unlocked_card_ids, vec![CardId::new("b")]);
        assert!(next.card("b").unwrap().unlocked);
        assert!(next.is_level_unlocked(2));
    }

    #[test]
    fn test_excess_clicks_not_refunded() {
        let engine = ProgressionEngine::default();
        let state = two_card_state(96, 50);

        let (next, outcome) = engine.apply_batch_upgrade(&state, "a", 10, T0).unwrap();

        assert_eq!(outcome.new_progress, 100);
        assert_eq!(outcome.energy_used, 10);
        assert_eq!(next.energy().energy, 40);
    }

    #[test]
    fn test_precondition_order() {
        let engine = ProgressionEngine::default();
        let state = two_card_state(0, 0);

        // Invalid clicks beats unknown card.
        assert!(matches!(
            engine.apply_upgrade(&state, "zzz", 0, T0),
            Err(UpgradeError::InvalidInput(_))
        ));
        // Unknown card beats insufficient energy.
        assert_eq!(
            engine.apply_upgrade(&state, "zzz", 1, T0),
            Err(UpgradeError::CardNotFound(CardId::new("zzz")))
        );
        // Locked beats insufficient energy.
        assert_eq!(
            engine.apply_upgrade(&state, "b", 1, T0),
            Err(UpgradeError::CardLocked(CardId::new("b")))
        );
        assert_eq!(
            engine.apply_upgrade(&state, "a", 1, T0),
            Err(UpgradeError::InsufficientEnergy {
                required: 1,
                available: 0
            })
        );
    }

    #[test]
    fn test_blank_card_id() {
        let engine = ProgressionEngine::default();
        let state = two_card_state(0, 50);
        assert!(matches!(
            engine.apply_upgrade(&state, " ", 1, T0),
            Err(UpgradeError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_already_maxed() {
        let engine = ProgressionEngine::default();
        let state = two_card_state(100, 50);

        assert_eq!(
            engine.apply_upgrade(&state, "a", 1, T0),
            Err(UpgradeError::AlreadyMaxed(CardId::new("a")))
        );
    }

    #[test]
    fn test_click_limits_by_mode() {
        let engine = ProgressionEngine::default();
        let state = two_card_state(0, 100);

        assert!(engine.apply_upgrade(&state, "a", 50, T0).is_ok());
        assert!(matches!(
            engine.apply_upgrade(&state, "a", 51, T0),
            Err(UpgradeError::InvalidInput(_))
        ));
        assert!(engine.apply_batch_upgrade(&state, "a", 51, T0).is_ok());
        assert!(matches!(
            engine.apply_batch_upgrade(&state, "a", 101, T0),
            Err(UpgradeError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_regenerates_before_checking_energy() {
        let engine = ProgressionEngine::default();
        let state = two_card_state(0, 0);

        let (next, outcome) = engine.apply_upgrade(&state, "a", 3, T0.plus_secs(5)).unwrap();

        assert_eq!(outcome.energy_used, 3);
        assert_eq!(outcome.remaining_energy, 2);
        assert_eq!(next.energy().last_update, T0.plus_secs(5));
    }

    #[test]
    fn test_custom_economy() {
        let engine = ProgressionEngine::new(
            EngineConfig::default()
                .with_energy_per_click(5)
                .with_progress_per_click(25),
        );
        let state = two_card_state(0, 12);

        let (_, outcome) = engine.apply_upgrade(&state, "a", 2, T0).unwrap();
        assert_eq!(outcome.new_progress, 50);
        assert_eq!(outcome.energy_used, 10);

        assert_eq!(
            engine.apply_upgrade(&state, "a", 3, T0),
            Err(UpgradeError::InsufficientEnergy {
                required: 15,
                available: 12
            })
        );
    }

    #[test]
    fn test_apply_request() {
        let engine = ProgressionEngine::default();
        let state = two_card_state(0, 50);
        let request = UpgradeRequest::new("a", 4);

        let (_, outcome) = engine
            .apply_request(&state, &request, UpgradeMode::Single, T0)
            .unwrap();
        assert_eq!(outcome.new_progress, 8);
    }

    #[test]
    fn test_spend_energy() {
        let engine = ProgressionEngine::default();
        let state = two_card_state(0, 30);

        let (next, status) = engine.spend_energy(&state, 10, T0).unwrap();
        assert_eq!(status.energy, 20);
        assert_eq!(next.energy().energy, 20);
        assert_eq!(next.energy().last_update, T0);

        assert!(matches!(
            engine.spend_energy(&state, 0, T0),
            Err(UpgradeError::InvalidInput(_))
        ));
        assert!(matches!(
            engine.spend_energy(&state, 101, T0),
            Err(UpgradeError::InvalidInput(_))
        ));
        assert_eq!(
            engine.spend_energy(&state, 31, T0),
            Err(UpgradeError::InsufficientEnergy {
                required: 31,
                available: 30
            })
        );
    }

    #[test]
    fn test_refreshed() {
        let engine = ProgressionEngine::default();
        let state = two_card_state(0, 10);

        let same = engine.refreshed(&state, T0);
        assert_eq!(same, state);

        let later = engine.refreshed(&state, T0.plus_secs(30));
        assert_eq!(later.energy().energy, 40);
        assert_eq!(later.card("a"), state.card("a"));
    }
}
