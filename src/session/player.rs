//! One player's live session.
//!
//! `PlayerSession` owns a `ProgressionState` behind a mutex and runs
//! refresh + validate + apply + commit as one critical section, so
//! concurrent requests against the same player are serialized and can
//! never both spend the same energy.
//!
//! The engine works on a cheap clone; the shared state is replaced only
//! when a request succeeds.

use std::sync::{Mutex, MutexGuard};

use thiserror::Error;
use tracing::{debug, info, warn};

use super::limiter::{FixedWindowLimiter, RateLimiter};
use super::store::{StateStore, StoreError};
use crate::cards::{default_catalog, CardCatalog};
use crate::core::clock::{Clock, SystemClock};
use crate::core::config::{EnergyConfig, GameConfig};
use crate::core::error::{ConfigError, UpgradeError};
use crate::core::state::ProgressionState;
use crate::progression::{EnergyStatus, ProgressionEngine, UpgradeMode, UpgradeOutcome, UpgradeRequest};

/// Session-level failures.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Upgrade(#[from] UpgradeError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("rate limit exceeded for client {client_id}")]
    RateLimited { client_id: String },
}

impl SessionError {
    /// The upgrade error, if this is one.
    #[must_use]
    pub fn as_upgrade(&self) -> Option<&UpgradeError> {
        match self {
            SessionError::Upgrade(err) => Some(err),
            _ => None,
        }
    }
}

/// A player's progression state plus the collaborators that serve it.
pub struct PlayerSession<C: Clock = SystemClock> {
    state: Mutex<ProgressionState>,
    engine: ProgressionEngine,
    catalog: CardCatalog,
    energy_config: EnergyConfig,
    clock: C,
    store: Option<Box<dyn StateStore>>,
    limiter: Option<Mutex<Box<dyn RateLimiter>>>,
}

impl<C: Clock> PlayerSession<C> {
    /// Wrap an existing state.
    ///
    /// `config` is used as given and its `rate_limit` section is not
    /// applied; [`PlayerSession::from_config`] validates and applies both.
    #[must_use]
    pub fn new(state: ProgressionState, catalog: CardCatalog, config: &GameConfig, clock: C) -> Self {
        Self {
            state: Mutex::new(state),
            engine: ProgressionEngine::new(config.engine.clone()),
            catalog,
            energy_config: config.energy.clone(),
            clock,
            store: None,
            limiter: None,
        }
    }

    /// Start a fresh game from `catalog`. See [`PlayerSession::new`]
    /// for how `config` is used.
    #[must_use]
    pub fn fresh(catalog: CardCatalog, config: &GameConfig, clock: C) -> Self {
        let state = ProgressionState::from_config(&catalog, &config.energy, clock.now());
        Self::new(state, catalog, config, clock)
    }

    /// Open a session backed by `store`.
    ///
    /// Validates `config`, then loads the saved state if there is one.
    /// Saved data that fails validation is discarded and a fresh game
    /// starts; io errors are returned.
    pub fn open(
        catalog: CardCatalog,
        config: &GameConfig,
        clock: C,
        store: Box<dyn StateStore>,
    ) -> Result<Self, SessionError> {
        config.validate()?;
        let loaded = match store.load() {
            Ok(state) => state,
            Err(err @ (StoreError::Invalid(_) | StoreError::Decode(_))) => {
                warn!(target: "session", error = %err, "discarding unreadable saved state");
                None
            }
            Err(err) => return Err(err.into()),
        };

        let restored = loaded.is_some();
        let state = loaded.unwrap_or_else(|| {
            ProgressionState::from_config(&catalog, &config.energy, clock.now())
        });
        info!(target: "session", restored, cards = state.card_count(), "session opened");

        let mut session = Self::new(state, catalog, config, clock);
        session.store = Some(store);
        Ok(session)
    }

    /// Build a session from a validated `config`.
    ///
    /// Opens from `store` when one is given, otherwise starts fresh, and
    /// attaches a `FixedWindowLimiter` built from `config.rate_limit`.
    pub fn from_config(
        catalog: CardCatalog,
        config: &GameConfig,
        clock: C,
        store: Option<Box<dyn StateStore>>,
    ) -> Result<Self, SessionError> {
        config.validate()?;
        let session = match store {
            Some(store) => Self::open(catalog, config, clock, store)?,
            None => Self::fresh(catalog, config, clock),
        };
        Ok(session.with_rate_limiter(FixedWindowLimiter::new(config.rate_limit.clone())))
    }

    /// Attach a rate limiter for the `*_for` request methods.
    #[must_use]
    pub fn with_rate_limiter(mut self, limiter: impl RateLimiter + 'static) -> Self {
        self.limiter = Some(Mutex::new(Box::new(limiter)));
        self
    }

    /// Attach a store without loading from it.
    #[must_use]
    pub fn with_store(mut self, store: Box<dyn StateStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Get the engine.
    #[must_use]
    pub fn engine(&self) -> &ProgressionEngine {
        &self.engine
    }

    /// Get the catalog.
    #[must_use]
    pub fn catalog(&self) -> &CardCatalog {
        &self.catalog
    }

    // === Upgrades ===

    /// Apply an interactive upgrade.
    pub fn upgrade(&self, request: &UpgradeRequest) -> Result<UpgradeOutcome, SessionError> {
        self.apply(request, UpgradeMode::Single)
    }

    /// Apply a bulk upgrade.
    pub fn batch_upgrade(&self, request: &UpgradeRequest) -> Result<UpgradeOutcome, SessionError> {
        self.apply(request, UpgradeMode::Batch)
    }

    /// Apply an interactive upgrade on behalf of `client_id`, subject to
    /// rate limiting.
    pub fn upgrade_for(
        &self,
        client_id: &str,
        request: &UpgradeRequest,
    ) -> Result<UpgradeOutcome, SessionError> {
        self.check_rate(client_id)?;
        self.apply(request, UpgradeMode::Single)
    }

    /// Apply a bulk upgrade on behalf of `client_id`, subject to rate
    /// limiting.
    pub fn batch_upgrade_for(
        &self,
        client_id: &str,
        request: &UpgradeRequest,
    ) -> Result<UpgradeOutcome, SessionError> {
        self.check_rate(client_id)?;
        self.apply(request, UpgradeMode::Batch)
    }

    fn apply(&self, request: &UpgradeRequest, mode: UpgradeMode) -> Result<UpgradeOutcome, SessionError> {
        let mut state = self.lock_state();
        let now = self.clock.now();
        let (next, outcome) = self.engine.apply_request(&state, request, mode, now)?;
        *state = next;
        Ok(outcome)
    }

    /// Spend energy directly.
    pub fn spend_energy(&self, amount: u32) -> Result<EnergyStatus, SessionError> {
        let mut state = self.lock_state();
        let (next, status) = self.engine.spend_energy(&state, amount, self.clock.now())?;
        *state = next;
        Ok(status)
    }

    // === Queries ===

    /// Full state after regeneration. The regenerated energy is kept.
    #[must_use]
    pub fn snapshot(&self) -> ProgressionState {
        let mut state = self.lock_state();
        let refreshed = self.engine.refreshed(&state, self.clock.now());
        *state = refreshed.clone();
        refreshed
    }

    /// Energy reading after regeneration.
    #[must_use]
    pub fn energy_status(&self) -> EnergyStatus {
        EnergyStatus::from(self.snapshot().energy())
    }

    // === Lifecycle ===

    /// Write the current state to the store, if one is attached.
    ///
    /// The state lock is held until the write finishes, so saves and
    /// resets reach the store in the order they took effect.
    pub fn save(&self) -> Result<(), SessionError> {
        let Some(store) = &self.store else {
            return Ok(());
        };
        let mut state = self.lock_state();
        let refreshed = self.engine.refreshed(&state, self.clock.now());
        *state = refreshed;
        store.save(&state).map_err(|err| {
            warn!(target: "session", error = %err, "failed to save state");
            SessionError::from(err)
        })
    }

    /// Discard all progress and start over from the catalog.
    ///
    /// The store, if any, is cleared and the fresh state saved while the
    /// state lock is held. If the store fails, the in-memory progress is
    /// kept.
    pub fn reset(&self) -> Result<(), SessionError> {
        let mut state = self.lock_state();
        let fresh = ProgressionState::from_config(&self.catalog, &self.energy_config, self.clock.now());
        if let Some(store) = &self.store {
            store.clear()?;
            store.save(&fresh)?;
        }
        *state = fresh;
        info!(target: "session", "progress reset");
        Ok(())
    }

    fn check_rate(&self, client_id: &str) -> Result<(), SessionError> {
        let Some(limiter) = &self.limiter else {
            return Ok(());
        };
        let allowed = limiter
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .allow(client_id, self.clock.now());
        if allowed {
            Ok(())
        } else {
            debug!(target: "session", client = client_id, "rate limited");
            Err(SessionError::RateLimited {
                client_id: client_id.to_string(),
            })
        }
    }

    // The state is only ever replaced whole, so a poisoned lock still
    // guards a consistent value.
    fn lock_state(&self) -> MutexGuard<'_, ProgressionState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl PlayerSession<SystemClock> {
    /// The default game on the system clock.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::fresh(default_catalog(), &GameConfig::default(), SystemClock)
    }
}

impl<C: Clock> std::fmt::Debug for PlayerSession<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlayerSession")
            .field("engine", &self.engine)
            .field("cards", &self.catalog.len())
            .field("has_store", &self.store.is_some())
            .field("has_limiter", &self.limiter.is_some())
            .finish()
    }
}
