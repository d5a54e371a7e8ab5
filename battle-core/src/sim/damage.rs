use crate::config::BattleConfig;
use crate::data::moves::{MoveCategory, MoveTemplate};
use crate::data::types::Type;
use crate::sim::abilities::{HookDispatcher, MoveContext};
use crate::sim::combatant::{Combatant, PrimaryStatus};
use crate::sim::field::{terrain_damage_modifier, weather_damage_modifier, GlobalField, SideConditions};
use crate::sim::stats::{apply_stage_multiplier, Stat};
use rand::Rng;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DamageModifiers {
    pub weather: f32,
    pub crit: f32,
    pub burn: f32,
    pub final_modifier: f32,
}

impl Default for DamageModifiers {
    fn default() -> Self {
        Self {
            weather: 1.0,
            crit: 1.0,
            burn: 1.0,
            final_modifier: 1.0,
        }
    }
}

/// Combines two modifiers in 4096ths, rounding half up.
pub(crate) fn chain_modifier(previous: f32, next: f32) -> f32 {
    let previous = (previous * 4096.0).floor() as u64;
    let next = (next * 4096.0).floor() as u64;
    let chained = (previous * next + 2048) >> 12;
    chained as f32 / 4096.0
}

fn apply_modifier(value: u32, modifier: f32) -> u32 {
    if modifier <= 0.0 {
        return 0;
    }
    let modifier = (modifier * 4096.0).floor() as u64;
    let value = value as u64;
    ((value * modifier + 2048 - 1) / 4096) as u32
}

fn apply_random_factor(value: u32, percent: u8) -> u32 {
    value.saturating_mul(percent.clamp(85, 100) as u32) / 100
}

/// Effectiveness is a power of two (or 0), so it is applied as a shift.
fn apply_type_effectiveness(value: u32, effectiveness: f32) -> u32 {
    if effectiveness <= 0.0 {
        return 0;
    }
    let steps = effectiveness.log2().round() as i32;
    if steps >= 0 {
        value.saturating_mul(1u32 << steps.min(8))
    } else {
        value >> (-steps).min(31)
    }
}

fn compute_base_damage(level: u8, attack: u16, defense: u16, power: u16) -> u32 {
    let mut base_damage = 2 * level as u32 / 5 + 2;
    base_damage = base_damage.saturating_mul(power as u32);
    base_damage = base_damage.saturating_mul(attack as u32);
    base_damage /= defense.max(1) as u32;
    base_damage /= 50;
    base_damage
}

/// `floor(((2L/5 + 2) * P * A / D / 50 + 2) * modifiers)`, applied one modifier at a
/// time with a floor after each. Immune targets take 0; anything else takes at least 1.
#[allow(clippy::too_many_arguments)]
pub fn calculate_damage_with_modifiers(
    level: u8,
    attack: u16,
    defense: u16,
    power: u16,
    effectiveness: f32,
    stab: f32,
    random_percent: u8,
    modifiers: DamageModifiers,
) -> u16 {
    if effectiveness == 0.0 {
        return 0;
    }
    let mut damage = compute_base_damage(level, attack, defense, power).saturating_add(2);
    damage = apply_modifier(damage, modifiers.weather);
    if (modifiers.crit - 1.0).abs() > f32::EPSILON {
        damage = ((damage as f32) * modifiers.crit).floor() as u32;
    }
    damage = apply_random_factor(damage, random_percent);
    if (stab - 1.0).abs() > f32::EPSILON {
        damage = apply_modifier(damage, stab);
    }
    damage = apply_type_effectiveness(damage, effectiveness);
    damage = apply_modifier(damage, modifiers.burn);
    damage = apply_modifier(damage, modifiers.final_modifier);
    if damage == 0 {
        return 1;
    }
    damage.min(u16::MAX as u32) as u16
}

#[allow(clippy::too_many_arguments)]
pub fn calculate_damage(
    level: u8,
    attack: u16,
    defense: u16,
    power: u16,
    effectiveness: f32,
    stab: f32,
    random_percent: u8,
    other_modifiers: f32,
) -> u16 {
    calculate_damage_with_modifiers(
        level,
        attack,
        defense,
        power,
        effectiveness,
        stab,
        random_percent,
        DamageModifiers {
            final_modifier: other_modifiers,
            ..DamageModifiers::default()
        },
    )
}

pub fn is_stab(move_type: Type, types: &[Type]) -> bool {
    move_type != Type::Typeless && types.contains(&move_type)
}

pub fn roll_random_percent<R: Rng + ?Sized>(rng: &mut R) -> u8 {
    rng.gen_range(85..=100)
}

/// Critical-hit probability by stage: 1/24, 1/8, 1/2, then guaranteed.
pub fn crit_chance(stage: u8) -> f64 {
    match stage {
        0 => 1.0 / 24.0,
        1 => 1.0 / 8.0,
        2 => 0.5,
        _ => 1.0,
    }
}

pub fn roll_crit<R: Rng + ?Sized>(rng: &mut R, stage: u8) -> bool {
    stage >= 3 || rng.gen_bool(crit_chance(stage))
}

/// Hit count for a multi-hit move. 2-5 hitters use the 35/35/15/15 split.
pub fn roll_hit_count<R: Rng + ?Sized>(rng: &mut R, min: u8, max: u8) -> u8 {
    if (min, max) == (2, 5) {
        return match rng.gen_range(0..100u8) {
            0..=34 => 2,
            35..=69 => 3,
            70..=84 => 4,
            _ => 5,
        };
    }
    if min >= max {
        return min;
    }
    rng.gen_range(min..=max)
}

/// One attacker-on-defender hit with everything resolved except the random draws.
pub struct Strike<'a> {
    pub attacker: &'a Combatant,
    pub defender: &'a Combatant,
    pub mv: &'a MoveTemplate,
    pub move_type: Type,
    pub power: u16,
    pub effectiveness: f32,
    pub critical: bool,
    pub random_percent: u8,
}

impl<'a> Strike<'a> {
    pub fn context(&self, field: &'a GlobalField) -> MoveContext<'a> {
        MoveContext {
            attacker: self.attacker,
            defender: self.defender,
            mv: self.mv,
            move_type: self.move_type,
            power: self.power,
            effectiveness: self.effectiveness,
            critical: self.critical,
            field,
        }
    }
}

/// Full damage for one hit, folding field, screens and ability hooks into the formula.
/// Critical hits ignore the attacker's drops, the defender's boosts, and screens.
pub fn strike_damage(
    strike: &Strike,
    dispatcher: &HookDispatcher,
    field: &GlobalField,
    defender_side: &SideConditions,
    config: &BattleConfig,
) -> u16 {
    if strike.effectiveness == 0.0 || strike.power == 0 {
        return 0;
    }
    let physical = strike.mv.category == MoveCategory::Physical;
    let (atk_stat, def_stat) = if physical {
        (Stat::Atk, Stat::Def)
    } else {
        (Stat::Spa, Stat::Spd)
    };
    let (mut atk_stage, mut def_stage) = if physical {
        (strike.attacker.stages.atk, strike.defender.stages.def)
    } else {
        (strike.attacker.stages.spa, strike.defender.stages.spd)
    };
    if strike.critical {
        atk_stage = atk_stage.max(0);
        def_stage = def_stage.min(0);
    }
    let attack = apply_stage_multiplier(strike.attacker.stats.get(atk_stat), atk_stage);
    let defense = apply_stage_multiplier(strike.defender.stats.get(def_stat), def_stage);

    let base_stab = if is_stab(strike.move_type, &strike.attacker.types) {
        1.5
    } else {
        1.0
    };
    let stab = dispatcher.stab(base_stab);
    let crit = if strike.critical {
        dispatcher.crit_multiplier(config.crit_multiplier)
    } else {
        1.0
    };
    let burn = if physical
        && strike.attacker.status == PrimaryStatus::Burn
        && !dispatcher.attacker_ignores_burn()
    {
        0.5
    } else {
        1.0
    };
    let screened = !strike.critical
        && if physical {
            defender_side.reflect_turns > 0
        } else {
            defender_side.light_screen_turns > 0
        };
    let screen = if screened { 0.5 } else { 1.0 };
    let terrain = terrain_damage_modifier(
        field.terrain(),
        strike.attacker,
        strike.defender,
        strike.move_type,
        field.gravity(),
    );
    let ability = dispatcher.damage_modifier(&strike.context(field));
    let final_modifier = chain_modifier(chain_modifier(screen, terrain), ability);

    calculate_damage_with_modifiers(
        strike.attacker.level,
        attack,
        defense,
        strike.power,
        strike.effectiveness,
        stab,
        strike.random_percent,
        DamageModifiers {
            weather: weather_damage_modifier(field.weather(), strike.move_type),
            crit,
            burn,
            final_modifier,
        },
    )
}
