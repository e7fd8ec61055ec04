//! Card catalog: the ordered, read-only set of card definitions.
//!
//! The catalog is supplied once when a progression state is created.
//! It preserves definition order (cascade results are reported in this
//! order) and provides fast lookup by `CardId`.

use rustc_hash::FxHashMap;

use super::card::Card;
use super::definition::{CardDefinition, CardId, Category};
use crate::core::error::CatalogError;

/// Ordered catalog of card definitions.
///
/// ## Example
///
/// ```
/// use card_progression::cards::{CardCatalog, CardDefinition, Category};
///
/// let catalog = CardCatalog::new(vec![
///     CardDefinition::new("dagger", "Dagger", Category::Weapon, 1),
///     CardDefinition::new("sword", "Sword", Category::Weapon, 2).requires("dagger"),
/// ])
/// .unwrap();
///
/// assert_eq!(catalog.len(), 2);
/// assert_eq!(catalog.get("sword").unwrap().level, 2);
/// ```
#[derive(Clone, Debug, Default)]
pub struct CardCatalog {
    cards: Vec<CardDefinition>,
    index: FxHashMap<CardId, usize>,
}

impl CardCatalog {
    /// Build a catalog, validating ids, shapes and prerequisites.
    pub fn new(cards: Vec<CardDefinition>) -> Result<Self, CatalogError> {
        let mut index = FxHashMap::default();
        for (position, card) in cards.iter().enumerate() {
            if card.id.is_blank() {
                return Err(CatalogError::InvalidCard(card.id.clone(), "blank id".to_string()));
            }
            if card.max_progress == 0 {
                return Err(CatalogError::InvalidCard(
                    card.id.clone(),
                    "max progress must be positive".to_string(),
                ));
            }
            if card.level == 0 {
                return Err(CatalogError::InvalidCard(
                    card.id.clone(),
                    "level must be positive".to_string(),
                ));
            }
            if index.insert(card.id.clone(), position).is_some() {
                return Err(CatalogError::DuplicateId(card.id.clone()));
            }
        }

        for card in &cards {
            if let Some(required) = &card.required_card_id {
                if !index.contains_key(required) {
                    return Err(CatalogError::UnknownPrerequisite {
                        card: card.id.clone(),
                        required: required.clone(),
                    });
                }
            }
        }

        Ok(Self { cards, index })
    }

    /// Get a definition by ID.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&CardDefinition> {
        self.index.get(id).map(|&i| &self.cards[i])
    }

    /// Check if a card ID is in the catalog.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Number of definitions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    /// Check if the catalog is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Iterate over definitions in catalog order.
    pub fn iter(&self) -> impl Iterator<Item = &CardDefinition> {
        self.cards.iter()
    }

    /// Definitions of one category, in catalog order.
    pub fn find_by_category(&self, category: Category) -> impl Iterator<Item = &CardDefinition> {
        self.cards.iter().filter(move |c| c.category == category)
    }

    /// Definitions directly gated by `id`, in catalog order.
    pub fn dependents_of<'a>(&'a self, id: &'a CardId) -> impl Iterator<Item = &'a CardDefinition> {
        self.cards
            .iter()
            .filter(move |c| c.required_card_id.as_ref() == Some(id))
    }

    /// Runtime cards with zero progress, in catalog order.
    #[must_use]
    pub fn instantiate(&self) -> Vec<Card> {
        self.cards.iter().map(Card::from_definition).collect()
    }
}

/// The built-in catalog: three equipment lines across three tiers.
///
/// Completing a level-1 card unlocks its level-2 successors; the
/// level-1 sword fans out to two weapons.
#[must_use]
pub fn default_catalog() -> CardCatalog {
    let defs = vec![
        CardDefinition::new("wooden_sword", "Wooden Sword", Category::Weapon, 1)
            .with_max_progress(20)
            .with_weapon_type("sword")
            .with_description("A practice blade carved from oak.")
            .with_image("/images/cards/wooden_sword.png"),
        CardDefinition::new("leather_armor", "Leather Armor", Category::Armor, 1)
            .with_max_progress(20)
            .with_description("Light armor stitched from cured hide.")
            .with_image("/images/cards/leather_armor.png"),
        CardDefinition::new("copper_ring", "Copper Ring", Category::Accessory, 1)
            .with_max_progress(20)
            .with_description("A simple band that hums faintly.")
            .with_image("/images/cards/copper_ring.png"),
        CardDefinition::new("iron_sword", "Iron Sword", Category::Weapon, 2)
            .with_max_progress(50)
            .with_weapon_type("sword")
            .requires("wooden_sword")
            .with_description("Forged iron with a keen edge.")
            .with_image("/images/cards/iron_sword.png"),
        CardDefinition::new("hunting_bow", "Hunting Bow", Category::Weapon, 2)
            .with_max_progress(50)
            .with_weapon_type("bow")
            .requires("wooden_sword")
            .with_description("A yew bow strung for the hunt.")
            .with_image("/images/cards/hunting_bow.png"),
        CardDefinition::new("chainmail", "Chainmail", Category::Armor, 2)
            .with_max_progress(50)
            .requires("leather_armor")
            .with_description("Interlocking rings of steel.")
            .with_image("/images/cards/chainmail.png"),
        CardDefinition::new("silver_ring", "Silver Ring", Category::Accessory, 2)
            .with_max_progress(50)
            .requires("copper_ring")
            .with_description("Polished silver that wards off chill.")
            .with_image("/images/cards/silver_ring.png"),
        CardDefinition::new("steel_sword", "Steel Sword", Category::Weapon, 3)
            .with_max_progress(100)
            .with_weapon_type("sword")
            .requires("iron_sword")
            .with_description("Tempered steel, balanced for war.")
            .with_image("/images/cards/steel_sword.png"),
        CardDefinition::new("plate_armor", "Plate Armor", Category::Armor, 3)
            .with_max_progress(100)
            .requires("chainmail")
            .with_description("Full plate, heavy and near impervious.")
            .with_image("/images/cards/plate_armor.png"),
        CardDefinition::new("gold_amulet", "Gold Amulet", Category::Accessory, 3)
            .with_max_progress(100)
            .requires("silver_ring")
            .with_description("An heirloom amulet set with amber.")
            .with_image("/images/cards/gold_amulet.png"),
    ];

    // The definitions above are static and reference only each other.
    match CardCatalog::new(defs) {
        Ok(catalog) => catalog,
        Err(err) => unreachable!("built-in catalog is invalid: {err}"),
    }
}
