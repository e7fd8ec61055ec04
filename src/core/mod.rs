//! Core types: clock, configuration, errors and progression state.
//!
//! This module contains the building blocks every other module shares.
//! Integrators configure behavior via `GameConfig` rather than modifying
//! the engine.

pub mod clock;
pub mod config;
pub mod error;
pub mod state;

pub use clock::{Clock, ManualClock, SystemClock, Timestamp};
pub use config::{EnergyConfig, EngineConfig, GameConfig, RateLimitConfig};
pub use error::{CatalogError, ConfigError, RestoreError, UpgradeError};
pub use state::{PersistedState, ProgressionState, BASE_LEVEL};
