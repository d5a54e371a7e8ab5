use crate::data::effects::{EffectKind, EffectSpec, OtherEffect};
use crate::data::types::Type;
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoveCategory {
    Physical,
    Special,
    Status,
}

/// Who the move itself is aimed at. Effects carry their own selectors.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoveTarget {
    #[default]
    Opponent,
    #[serde(rename = "self")]
    User,
    Field,
    All,
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MoveFlags {
    pub contact: bool,
    pub punch: bool,
    pub sound: bool,
    /// Hits through protection.
    pub bypass_protect: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MoveTemplate {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub element: Type,
    pub category: MoveCategory,
    #[serde(default)]
    pub power: u16,
    /// `None` means the move never misses.
    #[serde(default = "default_accuracy")]
    pub accuracy: Option<u8>,
    #[serde(default = "default_pp")]
    pub pp: u8,
    #[serde(default)]
    pub priority: i8,
    #[serde(default)]
    pub target: MoveTarget,
    #[serde(default)]
    pub flags: MoveFlags,
    #[serde(default)]
    pub effects: Vec<EffectSpec>,
}

fn default_accuracy() -> Option<u8> {
    Some(100)
}

fn default_pp() -> u8 {
    10
}

impl MoveTemplate {
    pub fn is_damaging(&self) -> bool {
        !matches!(self.category, MoveCategory::Status)
    }

    pub fn multi_hit(&self) -> Option<(u8, u8)> {
        self.other_effects().find_map(|other| match other {
            OtherEffect::MultiHit { min, max } => Some((min, max)),
            _ => None,
        })
    }

    pub fn has_other(&self, wanted: OtherEffect) -> bool {
        self.other_effects().any(|other| other == wanted)
    }

    pub fn counter_category(&self) -> Option<MoveCategory> {
        self.other_effects().find_map(|other| match other {
            OtherEffect::Counter { category } => Some(category),
            _ => None,
        })
    }

    fn other_effects(&self) -> impl Iterator<Item = OtherEffect> + '_ {
        self.effects.iter().filter_map(|spec| match spec.effect {
            EffectKind::Other(other) => Some(other),
            _ => None,
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |reason: String| ConfigError::InvalidTemplate {
            id: self.id.clone(),
            reason,
        };
        if self.id.is_empty() {
            return Err(ConfigError::Malformed("move with empty id".to_string()));
        }
        if self.pp == 0 {
            return Err(invalid("pp must be at least 1".to_string()));
        }
        if let Some(acc) = self.accuracy {
            if acc == 0 || acc > 100 {
                return Err(invalid(format!("accuracy {acc} must be within 1..=100")));
            }
        }
        if !(-7..=5).contains(&self.priority) {
            return Err(invalid(format!("priority {} must be within -7..=5", self.priority)));
        }
        if self.is_damaging() && self.element == Type::Typeless {
            return Err(invalid("damaging moves need a real element".to_string()));
        }
        if !self.is_damaging() && self.power > 0 {
            return Err(invalid("status moves cannot have power".to_string()));
        }
        let multi_hits = self
            .other_effects()
            .filter(|other| matches!(other, OtherEffect::MultiHit { .. }))
            .count();
        if multi_hits > 1 {
            return Err(invalid("more than one multi_hit effect".to_string()));
        }
        for spec in &self.effects {
            spec.validate(&self.id)?;
            if spec.shapes_pipeline() && !self.is_damaging() {
                return Err(invalid(format!("{} only applies to damaging moves", spec.effect)));
            }
        }
        Ok(())
    }
}
