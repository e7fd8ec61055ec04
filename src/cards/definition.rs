//! Card definitions - static catalog data.
//!
//! `CardDefinition` holds the immutable properties of a card: its tier,
//! how much progress completes it, and which card unlocks it. Display
//! metadata (name, description, image) rides along for integrators but
//! is never interpreted by the engine.
//!
//! Runtime progress is stored separately in `Card`.

use serde::{Deserialize, Serialize};

/// Unique, stable identifier for a card.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CardId(pub String);

impl CardId {
    /// Create a new card ID.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the raw ID value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Check if the ID is empty or whitespace.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl std::fmt::Display for CardId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CardId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for CardId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl std::borrow::Borrow<str> for CardId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Equipment slot a card belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Weapon,
    Armor,
    Accessory,
}

impl Category {
    /// All categories in display order.
    pub const ALL: [Category; 3] = [Category::Weapon, Category::Armor, Category::Accessory];
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Category::Weapon => "weapon",
            Category::Armor => "armor",
            Category::Accessory => "accessory",
        };
        f.write_str(name)
    }
}

/// Static card definition.
///
/// ## Example
///
/// ```
/// use card_progression::cards::{CardDefinition, Category};
///
/// let sword = CardDefinition::new("iron_sword", "Iron Sword", Category::Weapon, 2)
///     .with_max_progress(100)
///     .requires("wooden_sword");
///
/// assert_eq!(sword.level, 2);
/// assert!(!sword.unlocked);
/// assert_eq!(sword.required_card_id.as_ref().map(|id| id.as_str()), Some("wooden_sword"));
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardDefinition {
    /// Unique identifier.
    pub id: CardId,

    /// Display name.
    pub name: String,

    /// Equipment slot.
    pub category: Category,

    /// Content tier this card belongs to (1-based).
    pub level: u32,

    /// Progress needed to max the card.
    pub max_progress: u32,

    /// Whether the card starts unlocked.
    pub unlocked: bool,

    /// Card whose completion unlocks this one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required_card_id: Option<CardId>,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub image: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weapon_type: Option<String>,
}

impl CardDefinition {
    /// Create a new card definition.
    ///
    /// Defaults: `max_progress` 100, locked unless `level` is 1,
    /// no prerequisite.
    #[must_use]
    pub fn new(
        id: impl Into<CardId>,
        name: impl Into<String>,
        category: Category,
        level: u32,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            category,
            level,
            max_progress: 100,
            unlocked: level <= 1,
            required_card_id: None,
            description: String::new(),
            image: String::new(),
            weapon_type: None,
        }
    }

    /// Set max progress (builder pattern).
    #[must_use]
    pub fn with_max_progress(mut self, max_progress: u32) -> Self {
        self.max_progress = max_progress;
        self
    }

    /// Gate this card behind another card's completion.
    ///
    /// Gated cards start locked.
    #[must_use]
    pub fn requires(mut self, card: impl Into<CardId>) -> Self {
        self.required_card_id = Some(card.into());
        self.unlocked = false;
        self
    }

    /// Override the initial unlock flag.
    #[must_use]
    pub fn with_unlocked(mut self, unlocked: bool) -> Self {
        self.unlocked = unlocked;
        self
    }

    /// Set the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the image path.
    #[must_use]
    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = image.into();
        self
    }

    /// Set the weapon subtype.
    #[must_use]
    pub fn with_weapon_type(mut self, weapon_type: impl Into<String>) -> Self {
        self.weapon_type = Some(weapon_type.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_card_id() {
        let id = CardId::new("sword");
        assert_eq!(id.as_str(), "sword");
        assert_eq!(format!("{}", id), "sword");
        assert!(!id.is_blank());
        assert!(CardId::new("  ").is_blank());
    }

    #[test]
    fn test_category_display() {
        assert_eq!(Category::Weapon.to_string(), "weapon");
        assert_eq!(Category::ALL.len(), 3);
    }

    #[test]
    fn test_level_one_starts_unlocked() {
        let base = CardDefinition::new("a", "A", Category::Armor, 1);
        assert!(base.unlocked);

        let higher = CardDefinition::new("b", "B", Category::Armor, 2);
        assert!(!higher.unlocked);
    }

    #[test]
    fn test_requires_locks_card() {
        let card = CardDefinition::new("b", "B", Category::Weapon, 1).requires("a");
        assert!(!card.unlocked);
        assert_eq!(card.required_card_id, Some(CardId::new("a")));
    }

    #[test]
    fn test_definition_serialization() {
        let card = CardDefinition::new("ring", "Ring", Category::Accessory, 1)
            .with_max_progress(40)
            .with_description("Shiny");

        let json = serde_json::to_string(&card).unwrap();
        assert!(json.contains("\"maxProgress\":40"));
        assert!(json.contains("\"category\":\"accessory\""));
        assert!(!json.contains("requiredCardId"));

        let deserialized: CardDefinition = serde_json::from_str(&json).unwrap();
        assert_eq!(card, deserialized);
    }
}
