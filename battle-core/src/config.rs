use serde::{Deserialize, Serialize};

/// Engine tunables. Every field has a default so partial JSON files work.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BattleConfig {
    pub crit_multiplier: f32,
    pub weather_turns: u8,
    pub terrain_turns: u8,
    pub screen_turns: u8,
    pub tailwind_turns: u8,
    pub trick_room_turns: u8,
    pub gravity_turns: u8,
    pub freeze_thaw_chance: f64,
    pub full_paralysis_chance: f64,
    pub confusion_self_hit_chance: f64,
    /// Inclusive range of turns spent asleep.
    pub sleep_turns: (u8, u8),
    pub confusion_turns: (u8, u8),
    pub partial_trap_turns: (u8, u8),
    pub disable_turns: u8,
    pub taunt_turns: u8,
    /// Each consecutive protection divides its success chance by this value.
    pub protect_decay_divisor: u32,
    /// Turn cap used by simulation drivers; the engine itself never stops on it.
    pub max_turns: u32,
}

impl Default for BattleConfig {
    fn default() -> Self {
        Self {
            crit_multiplier: 1.5,
            weather_turns: 5,
            terrain_turns: 5,
            screen_turns: 5,
            tailwind_turns: 4,
            trick_room_turns: 5,
            gravity_turns: 5,
            freeze_thaw_chance: 0.2,
            full_paralysis_chance: 0.25,
            confusion_self_hit_chance: 1.0 / 3.0,
            sleep_turns: (1, 3),
            confusion_turns: (2, 5),
            partial_trap_turns: (4, 5),
            disable_turns: 4,
            taunt_turns: 3,
            protect_decay_divisor: 3,
            max_turns: 500,
        }
    }
}

impl BattleConfig {
    pub fn from_json_str(raw: &str) -> Result<Self, crate::error::BattleError> {
        let config: BattleConfig = serde_json::from_str(raw)
            .map_err(|err| crate::error::ConfigError::Malformed(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), crate::error::ConfigError> {
        let ranges = [
            ("sleep_turns", self.sleep_turns),
            ("confusion_turns", self.confusion_turns),
            ("partial_trap_turns", self.partial_trap_turns),
        ];
        for (name, (lo, hi)) in ranges {
            if lo == 0 || lo > hi {
                return Err(crate::error::ConfigError::Malformed(format!(
                    "{name} must be a non-empty range starting at 1 or more, got ({lo}, {hi})"
                )));
            }
        }
        let chances = [
            ("freeze_thaw_chance", self.freeze_thaw_chance),
            ("full_paralysis_chance", self.full_paralysis_chance),
            ("confusion_self_hit_chance", self.confusion_self_hit_chance),
        ];
        for (name, p) in chances {
            if !(0.0..=1.0).contains(&p) {
                return Err(crate::error::ConfigError::Malformed(format!(
                    "{name} must be within [0, 1], got {p}"
                )));
            }
        }
        if self.protect_decay_divisor == 0 {
            return Err(crate::error::ConfigError::Malformed(
                "protect_decay_divisor must be at least 1".to_string(),
            ));
        }
        if self.crit_multiplier < 1.0 {
            return Err(crate::error::ConfigError::Malformed(format!(
                "crit_multiplier must be at least 1.0, got {}",
                self.crit_multiplier
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let config = BattleConfig::from_json_str(r#"{"crit_multiplier": 2.0}"#).unwrap();
        assert_eq!(config.crit_multiplier, 2.0);
        assert_eq!(config.weather_turns, 5);
        assert_eq!(config.sleep_turns, (1, 3));
    }

    #[test]
    fn rejects_inverted_range() {
        let err = BattleConfig::from_json_str(r#"{"sleep_turns": [3, 1]}"#).unwrap_err();
        assert!(matches!(
            err,
            crate::error::BattleError::Configuration(crate::error::ConfigError::Malformed(_))
        ));
    }
}
