//! Energy: the regenerating resource spent on upgrades.
//!
//! Regeneration is computed on demand from elapsed time; see
//! [`refresh`] for the exact rounding rules.

pub mod regen;

pub use regen::{energy_earned, refresh, time_to_full, EnergyState};
