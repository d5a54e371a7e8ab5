//! Read-only content collaborator: move, species and item templates by id.

use crate::data::items::ItemTemplate;
use crate::data::moves::MoveTemplate;
use crate::data::species::SpeciesTemplate;
use crate::data::types::{self, normalize_id, Type};
use crate::error::{BattleError, ConfigError};
use once_cell::sync::Lazy;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;

/// Lookups fail with [`ConfigError`] instead of guessing.
pub trait ContentStore {
    fn move_template(&self, id: &str) -> Result<Arc<MoveTemplate>, BattleError>;

    fn species_template(&self, id: &str) -> Result<Arc<SpeciesTemplate>, BattleError>;

    fn item_template(&self, id: &str) -> Result<Arc<ItemTemplate>, BattleError>;

    fn type_effectiveness(&self, attacking: Type, defending: Type) -> f32 {
        types::effectiveness(attacking, defending)
    }
}

#[derive(Deserialize)]
struct RawContent {
    #[serde(default)]
    moves: Vec<MoveTemplate>,
    #[serde(default)]
    species: Vec<SpeciesTemplate>,
    #[serde(default)]
    items: Vec<ItemTemplate>,
}

/// In-memory store keyed by normalized id. Templates are shared, never copied into combatants.
#[derive(Clone, Debug, Default)]
pub struct Dex {
    moves: HashMap<String, Arc<MoveTemplate>>,
    species: HashMap<String, Arc<SpeciesTemplate>>,
    items: HashMap<String, Arc<ItemTemplate>>,
}

static BUILTIN: Lazy<Result<Dex, BattleError>> =
    Lazy::new(|| Dex::from_json_str(include_str!("../../content/dex.json")));

impl Dex {
    /// Content shipped with the crate.
    pub fn builtin() -> Result<&'static Dex, BattleError> {
        BUILTIN.as_ref().map_err(Clone::clone)
    }

    pub fn from_json_str(raw: &str) -> Result<Self, BattleError> {
        let parsed: RawContent =
            serde_json::from_str(raw).map_err(|err| ConfigError::Malformed(err.to_string()))?;
        let mut dex = Dex::default();
        for mv in parsed.moves {
            dex.insert_move(mv)?;
        }
        for species in parsed.species {
            dex.insert_species(species)?;
        }
        for item in parsed.items {
            dex.insert_item(item)?;
        }
        tracing::debug!(
            moves = dex.moves.len(),
            species = dex.species.len(),
            items = dex.items.len(),
            "content loaded"
        );
        Ok(dex)
    }

    pub fn insert_move(&mut self, mv: MoveTemplate) -> Result<(), BattleError> {
        mv.validate()?;
        let key = normalize_id(&mv.id);
        let id = mv.id.clone();
        if self.moves.insert(key, Arc::new(mv)).is_some() {
            return Err(duplicate("move", &id));
        }
        Ok(())
    }

    pub fn insert_species(&mut self, species: SpeciesTemplate) -> Result<(), BattleError> {
        species.validate()?;
        let key = normalize_id(&species.id);
        let id = species.id.clone();
        if self.species.insert(key, Arc::new(species)).is_some() {
            return Err(duplicate("species", &id));
        }
        Ok(())
    }

    pub fn insert_item(&mut self, item: ItemTemplate) -> Result<(), BattleError> {
        item.validate()?;
        let key = normalize_id(&item.id);
        let id = item.id.clone();
        if self.items.insert(key, Arc::new(item)).is_some() {
            return Err(duplicate("item", &id));
        }
        Ok(())
    }

    pub fn move_count(&self) -> usize {
        self.moves.len()
    }

    pub fn species_count(&self) -> usize {
        self.species.len()
    }
}

fn duplicate(kind: &str, id: &str) -> BattleError {
    ConfigError::Malformed(format!("duplicate {kind} id `{id}`")).into()
}

impl ContentStore for Dex {
    fn move_template(&self, id: &str) -> Result<Arc<MoveTemplate>, BattleError> {
        self.moves
            .get(normalize_id(id).as_str())
            .cloned()
            .ok_or_else(|| ConfigError::UnknownMove(id.to_string()).into())
    }

    fn species_template(&self, id: &str) -> Result<Arc<SpeciesTemplate>, BattleError> {
        self.species
            .get(normalize_id(id).as_str())
            .cloned()
            .ok_or_else(|| ConfigError::UnknownSpecies(id.to_string()).into())
    }

    fn item_template(&self, id: &str) -> Result<Arc<ItemTemplate>, BattleError> {
        self.items
            .get(normalize_id(id).as_str())
            .cloned()
            .ok_or_else(|| ConfigError::UnknownItem(id.to_string()).into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_content_loads() {
        let dex = Dex::builtin().unwrap();
        assert!(dex.move_count() > 20);
        assert!(dex.species_count() > 5);
        let surf = dex.move_template("Surf").unwrap();
        assert_eq!(surf.element, Type::Water);
        assert!(dex.item_template("potion").is_ok());
    }

    #[test]
    fn unknown_ids_are_configuration_errors() {
        let dex = Dex::builtin().unwrap();
        assert_eq!(
            dex.move_template("splashdance").unwrap_err(),
            BattleError::Configuration(ConfigError::UnknownMove("splashdance".to_string()))
        );
        assert!(matches!(
            dex.species_template("missingno"),
            Err(BattleError::Configuration(ConfigError::UnknownSpecies(_)))
        ));
    }

    #[test]
    fn malformed_effect_fails_the_whole_load() {
        let raw = r#"{"moves": [{"id": "bad", "name": "Bad", "type": "fire", "category": "special",
            "power": 50, "effects": [{"effect": {"kind": "combust"}}]}]}"#;
        assert!(matches!(
            Dex::from_json_str(raw),
            Err(BattleError::Configuration(ConfigError::Malformed(_)))
        ));
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let raw = r#"{"species": [
            {"id": "a", "name": "A", "types": ["fire"], "base_stats": {"hp": 1, "atk": 1, "def": 1, "spa": 1, "spd": 1, "spe": 1}},
            {"id": "A", "name": "A", "types": ["fire"], "base_stats": {"hp": 1, "atk": 1, "def": 1, "spa": 1, "spd": 1, "spe": 1}}
        ]}"#;
        assert!(Dex::from_json_str(raw).is_err());
    }

    #[test]
    fn store_effectiveness_defers_to_chart() {
        let dex = Dex::default();
        assert_eq!(dex.type_effectiveness(Type::Water, Type::Fire), 2.0);
    }
}
