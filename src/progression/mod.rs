//! Progression: upgrade validation, progress, and unlock cascades.
//!
//! `ProgressionEngine` is pure: it maps a state, a request and the
//! current time to a new state plus an outcome. Sharing and locking
//! are the session's job.

pub mod cascade;
pub mod engine;
pub mod outcome;

pub use cascade::CascadeResult;
pub use engine::{ProgressionEngine, UpgradeMode};
pub use outcome::{EnergyStatus, UpgradeOutcome, UpgradeRequest};
