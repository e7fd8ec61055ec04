//! Sessions: shared, lock-protected progression state per player.
//!
//! - `PlayerSession`: serializes requests against one player's state
//! - `StateStore`: load/save boundary (`MemoryStore`, `JsonFileStore`)
//! - `RateLimiter`: per-client request gate (`FixedWindowLimiter`)
//!
//! Each player is an independent session; nothing is shared between them.

pub mod limiter;
pub mod player;
pub mod store;

pub use limiter::{FixedWindowLimiter, RateLimiter};
pub use player::{PlayerSession, SessionError};
pub use store::{JsonFileStore, MemoryStore, StateStore, StoreError};
