//! Request and response shapes for upgrade operations.
//!
//! These serialize in camelCase with optional fields omitted, matching
//! what a transport layer sends to clients.

use serde::{Deserialize, Serialize};

use crate::cards::CardId;
use crate::energy::EnergyState;

/// A request to spend `clicks` on one card.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpgradeRequest {
    pub card_id: CardId,
    pub clicks: u32,
}

impl UpgradeRequest {
    /// Create a request.
    #[must_use]
    pub fn new(card_id: impl Into<CardId>, clicks: u32) -> Self {
        Self {
            card_id: card_id.into(),
            clicks,
        }
    }

    /// A single-click request.
    #[must_use]
    pub fn single(card_id: impl Into<CardId>) -> Self {
        Self::new(card_id, 1)
    }
}

/// Result of a successful upgrade.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpgradeOutcome {
    /// Always true; failures are reported as `UpgradeError`.
    pub success: bool,
    pub card_id: CardId,
    pub new_progress: u32,
    pub max_progress: u32,
    pub energy_used: u32,
    pub remaining_energy: u32,
    /// True exactly when this request took the card to max progress.
    pub leveled_up: bool,
    /// The completed card's level + 1, present only on level-up.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_level: Option<u32>,
    /// Cards unlocked by the cascade, in catalog order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unlocked_card_ids: Vec<CardId>,
}

impl UpgradeOutcome {
    /// Check if the cascade unlocked anything.
    #[must_use]
    pub fn unlocked_any(&self) -> bool {
        !self.unlocked_card_ids.is_empty()
    }
}

/// Energy reading for display.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnergyStatus {
    pub energy: u32,
    pub max_energy: u32,
    pub regen_rate: f64,
    /// Seconds until full; `None` when regeneration is disabled.
    pub time_to_full: Option<u64>,
}

impl From<&EnergyState> for EnergyStatus {
    fn from(state: &EnergyState) -> Self {
        Self {
            energy: state.energy,
            max_energy: state.max_energy,
            regen_rate: state.regen_rate,
            time_to_full: state.time_to_full(),
        }
    }
}
