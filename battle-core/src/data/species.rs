use crate::data::types::Type;
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct BaseStats {
    pub hp: u16,
    pub atk: u16,
    pub def: u16,
    pub spa: u16,
    pub spd: u16,
    pub spe: u16,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpeciesTemplate {
    pub id: String,
    pub name: String,
    pub types: Vec<Type>,
    pub base_stats: BaseStats,
}

impl SpeciesTemplate {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |reason: &str| ConfigError::InvalidTemplate {
            id: self.id.clone(),
            reason: reason.to_string(),
        };
        if self.id.is_empty() {
            return Err(ConfigError::Malformed("species with empty id".to_string()));
        }
        if self.types.is_empty() || self.types.len() > 2 {
            return Err(invalid("species need one or two types"));
        }
        if self.types.contains(&Type::Typeless) {
            return Err(invalid("typeless is not a species type"));
        }
        if self.base_stats.hp == 0 {
            return Err(invalid("base hp must be positive"));
        }
        Ok(())
    }
}
