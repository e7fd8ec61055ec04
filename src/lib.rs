//! # card-progression
//!
//! A single-player progression economy: spend regenerating energy to
//! advance cards, max them out, and unlock the cards and content levels
//! gated behind them.
//!
//! ## Design Principles
//!
//! 1. **Pure Core**: The engine maps `(state, request, now)` to a new
//!    state plus an outcome. No global state, no hidden clock.
//!
//! 2. **All or Nothing**: Validation precedes mutation. A rejected
//!    request leaves the state exactly as it was.
//!
//! 3. **Configuration Over Convention**: Click economics, limits and
//!    energy parameters come from `GameConfig`.
//!
//! ## Architecture
//!
//! - **Lazy Regeneration**: Energy is recomputed from elapsed time on
//!   every observation, never ticked in the background.
//!
//! - **Persistent Data Structures**: `im` collections make cloning the
//!   state O(1), so each upgrade is applied to a copy and committed whole.
//!
//! - **Sessions**: One mutex-guarded state per player serializes
//!   concurrent requests.
//!
//! ## Modules
//!
//! - `core`: Clock, configuration, errors, progression state
//! - `cards`: Card definitions, runtime cards, catalog
//! - `energy`: Regeneration
//! - `progression`: Upgrade engine and unlock cascade
//! - `session`: Per-player sessions, persistence, rate limiting

pub mod cards;
pub mod core;
pub mod energy;
pub mod progression;
pub mod session;

// Re-export commonly used types
pub use crate::core::{
    Clock, ManualClock, SystemClock, Timestamp,
    EnergyConfig, EngineConfig, GameConfig, RateLimitConfig,
    CatalogError, ConfigError, RestoreError, UpgradeError,
    PersistedState, ProgressionState, BASE_LEVEL,
};

pub use crate::cards::{
    default_catalog, Card, CardCatalog, CardDefinition, CardId, CardStatus, Category,
};

pub use crate::energy::{refresh, time_to_full, EnergyState};

pub use crate::progression::{
    CascadeResult, EnergyStatus, ProgressionEngine, UpgradeMode, UpgradeOutcome, UpgradeRequest,
};

pub use crate::session::{
    FixedWindowLimiter, JsonFileStore, MemoryStore, PlayerSession, RateLimiter, SessionError,
    StateStore, StoreError,
};
