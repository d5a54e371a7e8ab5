use crate::data::effects::{EffectSpec, TargetSelector};
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};

/// A bag item usable as a turn action. Effect targets are relative to the user's active.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ItemTemplate {
    pub id: String,
    pub name: String,
    pub effects: Vec<EffectSpec>,
}

impl ItemTemplate {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.id.is_empty() {
            return Err(ConfigError::Malformed("item with empty id".to_string()));
        }
        if self.effects.is_empty() {
            return Err(ConfigError::InvalidTemplate {
                id: self.id.clone(),
                reason: "items need at least one effect".to_string(),
            });
        }
        for spec in &self.effects {
            spec.validate(&self.id)?;
            if spec.shapes_pipeline() {
                return Err(ConfigError::InvalidTemplate {
                    id: self.id.clone(),
                    reason: format!("{} only applies to moves", spec.effect),
                });
            }
            if spec.target == TargetSelector::All {
                return Err(ConfigError::InvalidTemplate {
                    id: self.id.clone(),
                    reason: "items cannot target all combatants".to_string(),
                });
            }
        }
        Ok(())
    }
}
