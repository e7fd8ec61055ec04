//! Lazy energy regeneration.
//!
//! Energy is never ticked by a background clock. Each observation calls
//! `refresh` with the current time, which grants whole units for the
//! time elapsed since `last_update`.
//!
//! ## Fractional time
//!
//! `last_update` only moves when energy is actually added. Elapsed time
//! too short to earn a whole unit stays banked for the next refresh.
//! While the pool is full the timestamp does not move either, so the
//! first refresh after a debit can immediately refill from banked time.

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::core::clock::Timestamp;
use crate::core::config::EnergyConfig;

/// Regenerating energy pool.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnergyState {
    /// Current energy, `0..=max_energy`.
    pub energy: u32,

    /// Capacity.
    pub max_energy: u32,

    /// Energy per second (finite, >= 0).
    pub regen_rate: f64,

    /// Instant of the last regeneration that added energy.
    pub last_update: Timestamp,
}

impl EnergyState {
    /// Create a pool.
    ///
    /// `energy` is clamped to `max_energy` and a zero capacity is raised
    /// to 1; a negative or non-finite rate is treated as no regeneration.
    #[must_use]
    pub fn new(energy: u32, max_energy: u32, regen_rate: f64, last_update: Timestamp) -> Self {
        let max_energy = max_energy.max(1);
        let regen_rate = if regen_rate.is_finite() && regen_rate > 0.0 {
            regen_rate
        } else {
            0.0
        };
        Self {
            energy: energy.min(max_energy),
            max_energy,
            regen_rate,
            last_update,
        }
    }

    /// Create a pool from configuration, stamped at `now`.
    #[must_use]
    pub fn from_config(config: &EnergyConfig, now: Timestamp) -> Self {
        Self::new(config.starting_energy(), config.max_energy, config.regen_rate, now)
    }

    /// The same pool with every field brought into range, as [`EnergyState::new`] does.
    #[must_use]
    pub fn normalized(&self) -> Self {
        Self::new(self.energy, self.max_energy, self.regen_rate, self.last_update)
    }

    /// Check if the pool is at capacity.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.energy >= self.max_energy
    }

    /// The pool brought up to date at `now`. See [`refresh`].
    #[must_use]
    pub fn refreshed(&self, now: Timestamp) -> Self {
        refresh(self, now)
    }

    /// Seconds until full. See [`time_to_full`].
    #[must_use]
    pub fn time_to_full(&self) -> Option<u64> {
        time_to_full(self)
    }

    /// Remove `amount` energy.
    ///
    /// Callers validate `amount <= energy` first; the debit saturates at 0.
    pub(crate) fn debit(&mut self, amount: u32) {
        self.energy = self.energy.saturating_sub(amount);
    }
}

/// Whole energy units earned between `since` and `now` at `rate`.
#[must_use]
pub fn energy_earned(since: Timestamp, now: Timestamp, rate: f64) -> u64 {
    let earned = (now.secs_since(since) * rate).floor();
    if earned.is_finite() && earned > 0.0 {
        // `as` saturates for floats beyond u64::MAX.
        earned as u64
    } else {
        0
    }
}

/// Bring `state` up to date at `now`.
///
/// - `energy_to_add = floor(elapsed_seconds * regen_rate)`
/// - if `energy_to_add > 0` and the pool is not full, energy grows
///   (clamped to capacity) and `last_update` becomes `now`
/// - otherwise the state is returned unchanged, timestamp included
///
/// Time running backwards counts as no elapsed time. Calling this twice
/// with the same `now` is the same as calling it once.
///
/// ```
/// use card_progression::core::Timestamp;
/// use card_progression::energy::{refresh, EnergyState};
///
/// let t0 = Timestamp::from_secs(1_000);
/// let state = EnergyState::new(10, 100, 2.0, t0);
///
/// let later = refresh(&state, t0.plus_millis(2_750));
/// assert_eq!(later.energy, 15); // floor(2.75 * 2)
/// assert_eq!(later.last_update, t0.plus_millis(2_750));
/// ```
#[must_use]
pub fn refresh(state: &EnergyState, now: Timestamp) -> EnergyState {
    let earned = energy_earned(state.last_update, now, state.regen_rate);
    if earned == 0 || state.is_full() {
        return state.clone();
    }

    let headroom = u64::from(state.max_energy - state.energy);
    // Bounded by headroom, which fits in u32.
    let added = earned.min(headroom) as u32;

    trace!(
        target: "energy.regen",
        before = state.energy,
        added,
        earned,
        max = state.max_energy,
        "energy regenerated"
    );

    EnergyState {
        energy: state.energy + added,
        last_update: now,
        ..state.clone()
    }
}

/// Seconds until the pool is full at the current rate.
///
/// Returns `Some(0)` when already full and `None` when the pool will
/// never fill (`regen_rate` is zero or not finite).
#[must_use]
pub fn time_to_full(state: &EnergyState) -> Option<u64> {
    if state.is_full() {
        return Some(0);
    }
    if !state.regen_rate.is_finite() || state.regen_rate <= 0.0 {
        return None;
    }
    let missing = f64::from(state.max_energy - state.energy);
    Some((missing / state.regen_rate).ceil() as u64)
}
