//! Declarative secondary effects attached to moves, items and ability hooks.
//!
//! The set of kinds is closed: an unknown `kind` or a missing kind-specific field
//! fails deserialization, and [`EffectSpec::validate`] rejects specs that parse
//! but cannot be applied (a heal with a zero denominator, a status aimed at the field).

use crate::data::moves::MoveCategory;
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Who an effect lands on, relative to whoever produced it.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetSelector {
    #[serde(rename = "self")]
    User,
    #[default]
    Opponent,
    Field,
    All,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EffectSpec {
    #[serde(default)]
    pub target: TargetSelector,
    /// Trigger probability in percent. 100 never consumes a random draw.
    #[serde(default = "always")]
    pub chance: u8,
    pub effect: EffectKind,
}

fn always() -> u8 {
    100
}

impl EffectSpec {
    pub fn new(target: TargetSelector, effect: EffectKind) -> Self {
        Self {
            target,
            chance: 100,
            effect,
        }
    }

    pub fn with_chance(mut self, chance: u8) -> Self {
        self.chance = chance;
        self
    }

    /// True for kinds consumed by the move pipeline rather than the effect engine.
    pub fn shapes_pipeline(&self) -> bool {
        matches!(
            self.effect,
            EffectKind::Other(
                OtherEffect::MultiHit { .. }
                    | OtherEffect::Recharge
                    | OtherEffect::Charge
                    | OtherEffect::Counter { .. }
                    | OtherEffect::Ohko
                    | OtherEffect::HighCrit
                    | OtherEffect::Pursuit
            )
        )
    }

    pub fn validate(&self, owner: &str) -> Result<(), ConfigError> {
        let invalid = |reason: String| ConfigError::InvalidEffect {
            owner: owner.to_string(),
            reason,
        };
        if self.chance > 100 {
            return Err(invalid(format!("chance {} exceeds 100", self.chance)));
        }
        let on_combatant = matches!(
            self.target,
            TargetSelector::User | TargetSelector::Opponent | TargetSelector::All
        );
        match &self.effect {
            EffectKind::StatusInflict { .. } | EffectKind::FixedDamage { .. } if !on_combatant => {
                Err(invalid(format!("{} cannot target the field", self.effect)))
            }
            EffectKind::StatChange { changes } => {
                if !on_combatant {
                    return Err(invalid("stat_change cannot target the field".to_string()));
                }
                if changes.is_empty() {
                    return Err(invalid("stat_change lists no stats".to_string()));
                }
                if let Some(bad) = changes.iter().find(|c| c.delta == 0 || c.delta.unsigned_abs() > 12) {
                    return Err(invalid(format!(
                        "stat_change delta {} for {} must be non-zero and within 12",
                        bad.delta, bad.stat
                    )));
                }
                Ok(())
            }
            EffectKind::Heal { mode } => {
                if !on_combatant {
                    return Err(invalid("heal cannot target the field".to_string()));
                }
                match mode {
                    HealMode::Fraction { num, den } if *den == 0 || *num == 0 || num > den => {
                        Err(invalid(format!("heal fraction {num}/{den} is not within (0, 1]")))
                    }
                    HealMode::Drain { percent } if *percent == 0 || *percent > 100 => {
                        Err(invalid(format!("drain percent {percent} must be within 1..=100")))
                    }
                    _ => Ok(()),
                }
            }
            EffectKind::Recoil { percent } => {
                if self.target != TargetSelector::User {
                    return Err(invalid("recoil must target self".to_string()));
                }
                if *percent == 0 || *percent > 100 {
                    return Err(invalid(format!("recoil percent {percent} must be within 1..=100")));
                }
                Ok(())
            }
            EffectKind::WeatherSet { .. } if self.target != TargetSelector::Field => {
                Err(invalid("weather_set must target the field".to_string()))
            }
            EffectKind::FieldSet { condition } => {
                let side_local = condition.is_side_local();
                if side_local && !matches!(self.target, TargetSelector::User | TargetSelector::Opponent) {
                    return Err(invalid(format!("{condition} must target self or opponent")));
                }
                if !side_local && self.target != TargetSelector::Field {
                    return Err(invalid(format!("{condition} must target the field")));
                }
                Ok(())
            }
            EffectKind::FixedDamage { amount } => match amount {
                FixedAmount::Flat { hp } if *hp == 0 => Err(invalid("flat damage of 0".to_string())),
                FixedAmount::FractionMax { num, den } if *den == 0 || *num == 0 || num > den => {
                    Err(invalid(format!("damage fraction {num}/{den} is not within (0, 1]")))
                }
                _ => Ok(()),
            },
            EffectKind::Other(other) => other.validate(self.target).map_err(invalid),
            _ => Ok(()),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EffectKind {
    StatusInflict { status: StatusKind },
    StatChange { changes: Vec<StatDelta> },
    Heal { mode: HealMode },
    Recoil { percent: u8 },
    WeatherSet { weather: Weather },
    FieldSet { condition: FieldCondition },
    FixedDamage { amount: FixedAmount },
    Other(OtherEffect),
}

impl fmt::Display for EffectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EffectKind::StatusInflict { .. } => f.write_str("status_inflict"),
            EffectKind::StatChange { .. } => f.write_str("stat_change"),
            EffectKind::Heal { .. } => f.write_str("heal"),
            EffectKind::Recoil { .. } => f.write_str("recoil"),
            EffectKind::WeatherSet { .. } => f.write_str("weather_set"),
            EffectKind::FieldSet { .. } => f.write_str("field_set"),
            EffectKind::FixedDamage { .. } => f.write_str("fixed_damage"),
            EffectKind::Other(other) => write!(f, "other:{other:?}"),
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusKind {
    Sleep,
    Freeze,
    Paralysis,
    Burn,
    Poison,
    BadlyPoisoned,
}

impl fmt::Display for StatusKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StatusKind::Sleep => "sleep",
            StatusKind::Freeze => "freeze",
            StatusKind::Paralysis => "paralysis",
            StatusKind::Burn => "burn",
            StatusKind::Poison => "poison",
            StatusKind::BadlyPoisoned => "bad poison",
        };
        f.write_str(name)
    }
}

/// Stats that carry a stage in [-6, 6]. HP never does.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoostStat {
    Atk,
    Def,
    Spa,
    Spd,
    Spe,
    Accuracy,
    Evasion,
}

impl BoostStat {
    pub const ALL: [BoostStat; 7] = [
        BoostStat::Atk,
        BoostStat::Def,
        BoostStat::Spa,
        BoostStat::Spd,
        BoostStat::Spe,
        BoostStat::Accuracy,
        BoostStat::Evasion,
    ];
}

impl fmt::Display for BoostStat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BoostStat::Atk => "attack",
            BoostStat::Def => "defense",
            BoostStat::Spa => "special attack",
            BoostStat::Spd => "special defense",
            BoostStat::Spe => "speed",
            BoostStat::Accuracy => "accuracy",
            BoostStat::Evasion => "evasion",
        };
        f.write_str(name)
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct StatDelta {
    pub stat: BoostStat,
    pub delta: i8,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HealMode {
    /// `num/den` of the target's max HP.
    Fraction { num: u16, den: u16 },
    /// Percentage of the damage the triggering move dealt.
    Drain { percent: u8 },
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FixedAmount {
    Flat { hp: u16 },
    /// Equal to the user's level.
    Level,
    /// Half of the target's current HP, at least 1.
    HalfCurrent,
    /// `num/den` of the target's max HP, at least 1.
    FractionMax { num: u16, den: u16 },
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Weather {
    Sun,
    Rain,
    Sandstorm,
    Hail,
}

impl fmt::Display for Weather {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Weather::Sun => "harsh sunlight",
            Weather::Rain => "rain",
            Weather::Sandstorm => "sandstorm",
            Weather::Hail => "hail",
        };
        f.write_str(name)
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Terrain {
    Electric,
    Grassy,
    Misty,
    Psychic,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldCondition {
    ElectricTerrain,
    GrassyTerrain,
    MistyTerrain,
    PsychicTerrain,
    Gravity,
    TrickRoom,
    Reflect,
    LightScreen,
    Tailwind,
    Spikes,
    ToxicSpikes,
    StealthRock,
}

impl FieldCondition {
    pub fn is_side_local(self) -> bool {
        matches!(
            self,
            FieldCondition::Reflect
                | FieldCondition::LightScreen
                | FieldCondition::Tailwind
                | FieldCondition::Spikes
                | FieldCondition::ToxicSpikes
                | FieldCondition::StealthRock
        )
    }

    pub fn terrain(self) -> Option<Terrain> {
        match self {
            FieldCondition::ElectricTerrain => Some(Terrain::Electric),
            FieldCondition::GrassyTerrain => Some(Terrain::Grassy),
            FieldCondition::MistyTerrain => Some(Terrain::Misty),
            FieldCondition::PsychicTerrain => Some(Terrain::Psychic),
            _ => None,
        }
    }
}

impl fmt::Display for FieldCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FieldCondition::ElectricTerrain => "electric terrain",
            FieldCondition::GrassyTerrain => "grassy terrain",
            FieldCondition::MistyTerrain => "misty terrain",
            FieldCondition::PsychicTerrain => "psychic terrain",
            FieldCondition::Gravity => "gravity",
            FieldCondition::TrickRoom => "trick room",
            FieldCondition::Reflect => "reflect",
            FieldCondition::LightScreen => "light screen",
            FieldCondition::Tailwind => "tailwind",
            FieldCondition::Spikes => "spikes",
            FieldCondition::ToxicSpikes => "toxic spikes",
            FieldCondition::StealthRock => "stealth rock",
        };
        f.write_str(name)
    }
}

/// Everything that is neither a plain stat/status/heal/damage effect nor a field change.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(tag = "effect", rename_all = "snake_case")]
pub enum OtherEffect {
    Flinch,
    Confuse,
    /// Partial traps chip 1/8 per turn and expire; full traps last until the target leaves.
    Trap {
        #[serde(default)]
        partial: bool,
    },
    Seed,
    Substitute,
    Protect,
    MultiHit { min: u8, max: u8 },
    Recharge,
    Charge,
    ForceSwitch,
    SelfSwitch,
    /// Returns double the last damage of `category` the user took this turn.
    Counter { category: MoveCategory },
    Ohko,
    Disable,
    Taunt,
    Yawn,
    Root,
    AquaRing,
    HighCrit,
    Pursuit,
    CureStatus,
    Haze,
    BreakScreens,
    ClearHazards,
}

impl OtherEffect {
    fn validate(self, target: TargetSelector) -> Result<(), String> {
        let self_only = matches!(
            self,
            OtherEffect::Substitute
                | OtherEffect::Protect
                | OtherEffect::SelfSwitch
                | OtherEffect::Root
                | OtherEffect::AquaRing
                | OtherEffect::ClearHazards
        );
        if self_only && target != TargetSelector::User {
            return Err(format!("{self:?} must target self"));
        }
        let opponent_only = matches!(
            self,
            OtherEffect::Flinch
                | OtherEffect::Trap { .. }
                | OtherEffect::Seed
                | OtherEffect::ForceSwitch
                | OtherEffect::Disable
                | OtherEffect::Taunt
                | OtherEffect::Yawn
                | OtherEffect::BreakScreens
        );
        if opponent_only && target != TargetSelector::Opponent {
            return Err(format!("{self:?} must target the opponent"));
        }
        match self {
            OtherEffect::MultiHit { min, max } if min == 0 || min > max => {
                Err(format!("multi_hit range {min}..={max} is empty"))
            }
            OtherEffect::Counter { category: MoveCategory::Status } => {
                Err("counter cannot reflect status moves".to_string())
            }
            OtherEffect::Haze if target != TargetSelector::Field && target != TargetSelector::All => {
                Err("haze must target the field or all".to_string())
            }
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_tagged_effects() {
        let raw = r#"[
            {"target": "opponent", "chance": 10, "effect": {"kind": "status_inflict", "status": "burn"}},
            {"target": "self", "effect": {"kind": "stat_change", "changes": [{"stat": "atk", "delta": 2}]}},
            {"target": "self", "effect": {"kind": "heal", "mode": {"type": "fraction", "num": 1, "den": 2}}},
            {"effect": {"kind": "other", "effect": "multi_hit", "min": 2, "max": 5}}
        ]"#;
        let specs: Vec<EffectSpec> = serde_json::from_str(raw).unwrap();
        assert_eq!(specs.len(), 4);
        assert_eq!(specs[0].chance, 10);
        assert_eq!(specs[1].target, TargetSelector::User);
        assert_eq!(specs[3].chance, 100);
        assert_eq!(
            specs[3].effect,
            EffectKind::Other(OtherEffect::MultiHit { min: 2, max: 5 })
        );
        assert!(specs[3].shapes_pipeline());
        for spec in &specs {
            spec.validate("test").unwrap();
        }
    }

    #[test]
    fn unknown_kind_is_a_parse_error() {
        let raw = r#"{"effect": {"kind": "teleport"}}"#;
        assert!(serde_json::from_str::<EffectSpec>(raw).is_err());
    }

    #[test]
    fn missing_kind_field_is_a_parse_error() {
        let raw = r#"{"effect": {"kind": "status_inflict"}}"#;
        assert!(serde_json::from_str::<EffectSpec>(raw).is_err());
    }

    #[test]
    fn rejects_wrong_targets_and_ranges() {
        let weather_on_foe = EffectSpec::new(
            TargetSelector::Opponent,
            EffectKind::WeatherSet { weather: Weather::Rain },
        );
        assert!(weather_on_foe.validate("rain dance").is_err());

        let empty_hits = EffectSpec::new(
            TargetSelector::Opponent,
            EffectKind::Other(OtherEffect::MultiHit { min: 5, max: 2 }),
        );
        assert!(empty_hits.validate("bad").is_err());

        let too_likely = EffectSpec::new(
            TargetSelector::Opponent,
            EffectKind::Other(OtherEffect::Flinch),
        )
        .with_chance(101);
        assert!(too_likely.validate("bad").is_err());

        let screens_on_field = EffectSpec::new(
            TargetSelector::Field,
            EffectKind::FieldSet { condition: FieldCondition::Reflect },
        );
        assert!(screens_on_field.validate("reflect").is_err());
    }
}
