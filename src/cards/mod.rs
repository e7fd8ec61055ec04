//! Card system: definitions, runtime cards, and the catalog.
//!
//! ## Key Types
//!
//! - `CardId`: Stable string identifier
//! - `Category`: Weapon, armor or accessory
//! - `CardDefinition`: Static catalog data (tier, cap, prerequisite, display)
//! - `Card`: Runtime progress and unlock flag
//! - `CardCatalog`: Ordered definitions with id lookup
//!
//! ## Prerequisites
//!
//! A card with `required_card_id` starts locked and is unlocked when
//! the referenced card reaches its max progress.

pub mod card;
pub mod catalog;
pub mod definition;

pub use card::{Card, CardStatus};
pub use catalog::{default_catalog, CardCatalog};
pub use definition::{CardDefinition, CardId, Category};
