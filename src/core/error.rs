//! Error types.
//!
//! Every upgrade failure is a caller-input or state-precondition failure.
//! None of them represent internal faults, and none are retryable inside
//! the engine.

use thiserror::Error;

use crate::cards::CardId;

/// Why an upgrade request was rejected.
///
/// Checked in declaration order: the first failing precondition wins.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum UpgradeError {
    /// Malformed or out-of-range card id or click count.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// No card with this id exists.
    #[error("card not found: {0}")]
    CardNotFound(CardId),

    /// The card has not been unlocked yet.
    #[error("card is locked: {0}")]
    CardLocked(CardId),

    /// The card is already at maximum progress.
    #[error("card is already at maximum progress: {0}")]
    AlreadyMaxed(CardId),

    /// Not enough energy after regeneration.
    #[error("insufficient energy: required {required}, available {available}")]
    InsufficientEnergy { required: u32, available: u32 },
}

impl UpgradeError {
    /// Short machine-readable kind, stable across versions.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            UpgradeError::InvalidInput(_) => "invalid_input",
            UpgradeError::CardNotFound(_) => "card_not_found",
            UpgradeError::CardLocked(_) => "card_locked",
            UpgradeError::AlreadyMaxed(_) => "already_maxed",
            UpgradeError::InsufficientEnergy { .. } => "insufficient_energy",
        }
    }
}

/// Catalog construction failures.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum CatalogError {
    #[error("duplicate card id: {0}")]
    DuplicateId(CardId),

    #[error("card {card} requires unknown card {required}")]
    UnknownPrerequisite { card: CardId, required: CardId },

    #[error("card {0} has an invalid shape: {1}")]
    InvalidCard(CardId, String),
}

/// Persisted state failed validation on restore.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum RestoreError {
    #[error("duplicate card id: {0}")]
    DuplicateId(CardId),

    #[error("card {id} has progress {progress} above max {max_progress}")]
    ProgressOutOfRange { id: CardId, progress: u32, max_progress: u32 },

    #[error("card {0} has zero max progress")]
    ZeroMaxProgress(CardId),

    #[error("card {0} is locked but has progress")]
    LockedWithProgress(CardId),

    #[error("energy {energy} exceeds max {max_energy}")]
    EnergyOutOfRange { energy: u32, max_energy: u32 },

    #[error("max energy must be positive")]
    ZeroMaxEnergy,

    #[error("invalid regen rate: {0}")]
    InvalidRegenRate(f64),

    #[error("unlocked levels must contain level 1")]
    MissingBaseLevel,

    #[error("unlocked levels must be positive")]
    ZeroLevel,
}

/// Configuration parse or validation failures.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config value `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insufficient_energy_message() {
        let err = UpgradeError::InsufficientEnergy {
            required: 5,
            available: 2,
        };
        assert_eq!(err.to_string(), "insufficient energy: required 5, available 2");
        assert_eq!(err.kind(), "insufficient_energy");
    }

    #[test]
    fn test_error_kinds() {
        let id = CardId::new("sword");
        assert_eq!(UpgradeError::InvalidInput("x".into()).kind(), "invalid_input");
        assert_eq!(UpgradeError::CardNotFound(id.clone()).kind(), "card_not_found");
        assert_eq!(UpgradeError::CardLocked(id.clone()).kind(), "card_locked");
        assert_eq!(UpgradeError::AlreadyMaxed(id).kind(), "already_maxed");
    }

    #[test]
    fn test_catalog_error_display() {
        let err = CatalogError::UnknownPrerequisite {
            card: CardId::new("b"),
            required: CardId::new("a"),
        };
        assert_eq!(err.to_string(), "card b requires unknown card a");
    }
}
