//! One handler per ability tag. Parameterized handlers are shared by tags that
//! differ only in an element, a weather or a stat.

use super::hooks::{Absorb, Affliction, AbilityHooks, HookRole, KoContext, KoRole, MoveContext, TurnContext, TypeChange};
use crate::data::effects::{
    BoostStat, EffectKind, EffectSpec, FieldCondition, FixedAmount, HealMode, OtherEffect, StatDelta, StatusKind,
    TargetSelector, Weather,
};
use crate::data::moves::MoveTemplate;
use crate::data::types::Type;
use crate::sim::combatant::Combatant;
use crate::sim::field::GlobalField;
use crate::sim::volatile::VolatileKind;

fn on_self(effect: EffectKind) -> EffectSpec {
    EffectSpec::new(TargetSelector::User, effect)
}

fn on_opponent(effect: EffectKind) -> EffectSpec {
    EffectSpec::new(TargetSelector::Opponent, effect)
}

fn boost(stat: BoostStat, delta: i8) -> EffectKind {
    EffectKind::StatChange {
        changes: vec![StatDelta { stat, delta }],
    }
}

fn heal(num: u16, den: u16) -> EffectKind {
    EffectKind::Heal {
        mode: HealMode::Fraction { num, den },
    }
}

fn chip(num: u16, den: u16) -> EffectKind {
    EffectKind::FixedDamage {
        amount: FixedAmount::FractionMax { num, den },
    }
}

fn inflict(status: StatusKind) -> EffectKind {
    EffectKind::StatusInflict { status }
}

fn weather_is(field: &GlobalField, weather: Weather) -> bool {
    field.weather() == Some(weather)
}

pub struct NoAbility;

impl AbilityHooks for NoAbility {}

pub struct Intimidate;

impl AbilityHooks for Intimidate {
    fn on_switch_in(&self, ctx: &TurnContext) -> Vec<EffectSpec> {
        if ctx.opponent.is_fainted() {
            return Vec::new();
        }
        vec![on_opponent(boost(BoostStat::Atk, -1))]
    }
}

pub struct WeatherSetter(pub Weather);

impl AbilityHooks for WeatherSetter {
    fn on_switch_in(&self, _ctx: &TurnContext) -> Vec<EffectSpec> {
        vec![EffectSpec::new(
            TargetSelector::Field,
            EffectKind::WeatherSet { weather: self.0 },
        )]
    }

    fn check_weather_immunity(&self, weather: Weather) -> bool {
        weather == self.0 && matches!(weather, Weather::Sandstorm | Weather::Hail)
    }
}

pub struct TerrainSetter(pub FieldCondition);

impl AbilityHooks for TerrainSetter {
    fn on_switch_in(&self, _ctx: &TurnContext) -> Vec<EffectSpec> {
        vec![EffectSpec::new(
            TargetSelector::Field,
            EffectKind::FieldSet { condition: self.0 },
        )]
    }
}

pub struct NaturalCure;

impl AbilityHooks for NaturalCure {
    fn on_switch_out(&self, holder: &Combatant) -> Vec<EffectSpec> {
        if holder.status.is_none() {
            return Vec::new();
        }
        vec![on_self(EffectKind::Other(OtherEffect::CureStatus))]
    }
}

pub struct Regenerator;

impl AbilityHooks for Regenerator {
    fn on_switch_out(&self, holder: &Combatant) -> Vec<EffectSpec> {
        if holder.is_full_hp() || holder.is_fainted() {
            return Vec::new();
        }
        vec![on_self(heal(1, 3))]
    }
}

pub struct PhysicalBoost(pub f32);

impl AbilityHooks for PhysicalBoost {
    fn modify_outgoing_damage(&self, ctx: &MoveContext) -> f32 {
        if ctx.is_physical() {
            self.0
        } else {
            1.0
        }
    }
}

pub struct Hustle;

impl AbilityHooks for Hustle {
    fn modify_outgoing_damage(&self, ctx: &MoveContext) -> f32 {
        if ctx.is_physical() {
            1.5
        } else {
            1.0
        }
    }

    fn modify_accuracy(&self, ctx: &MoveContext, role: HookRole) -> f32 {
        if role == HookRole::Attacker && ctx.is_physical() {
            0.8
        } else {
            1.0
        }
    }
}

pub struct Guts;

impl AbilityHooks for Guts {
    fn modify_outgoing_damage(&self, ctx: &MoveContext) -> f32 {
        if ctx.is_physical() && !ctx.attacker.status.is_none() {
            1.5
        } else {
            1.0
        }
    }

    fn ignores_burn_penalty(&self) -> bool {
        true
    }
}

/// 1.5x to moves of one element at or below a third of max HP.
pub struct PinchBoost(pub Type);

impl AbilityHooks for PinchBoost {
    fn modify_outgoing_damage(&self, ctx: &MoveContext) -> f32 {
        let low = ctx.attacker.hp as u32 * 3 <= ctx.attacker.max_hp() as u32;
        if low && ctx.move_type == self.0 {
            1.5
        } else {
            1.0
        }
    }
}

pub struct Technician;

impl AbilityHooks for Technician {
    fn modify_outgoing_damage(&self, ctx: &MoveContext) -> f32 {
        if ctx.power > 0 && ctx.power <= 60 {
            1.5
        } else {
            1.0
        }
    }
}

pub struct IronFist;

impl AbilityHooks for IronFist {
    fn modify_outgoing_damage(&self, ctx: &MoveContext) -> f32 {
        if ctx.mv.flags.punch {
            1.2
        } else {
            1.0
        }
    }
}

pub struct ToughClaws;

impl AbilityHooks for ToughClaws {
    fn modify_outgoing_damage(&self, ctx: &MoveContext) -> f32 {
        if ctx.mv.flags.contact {
            1.3
        } else {
            1.0
        }
    }
}

pub struct SandForce;

impl AbilityHooks for SandForce {
    fn modify_outgoing_damage(&self, ctx: &MoveContext) -> f32 {
        let boosted = matches!(ctx.move_type, Type::Rock | Type::Ground | Type::Steel);
        if boosted && weather_is(ctx.field, Weather::Sandstorm) {
            1.3
        } else {
            1.0
        }
    }

    fn check_weather_immunity(&self, weather: Weather) -> bool {
        weather == Weather::Sandstorm
    }
}

pub struct FlashFire;

impl AbilityHooks for FlashFire {
    fn modify_outgoing_damage(&self, ctx: &MoveContext) -> f32 {
        if ctx.move_type == Type::Fire && ctx.attacker.volatiles.has(VolatileKind::FlashFire) {
            1.5
        } else {
            1.0
        }
    }

    fn check_type_immunity(&self, ctx: &MoveContext) -> Option<Absorb> {
        (ctx.move_type == Type::Fire).then(|| Absorb {
            effects: Vec::new(),
            volatile: Some(VolatileKind::FlashFire),
        })
    }
}

pub struct Adaptability;

impl AbilityHooks for Adaptability {
    fn modify_stab(&self, stab: f32) -> f32 {
        if stab > 1.0 {
            2.0
        } else {
            stab
        }
    }
}

pub struct Sniper;

impl AbilityHooks for Sniper {
    fn modify_crit_damage(&self, multiplier: f32) -> f32 {
        multiplier * 1.5
    }
}

pub struct SuperLuck;

impl AbilityHooks for SuperLuck {
    fn modify_crit_stage(&self, _ctx: &MoveContext) -> u8 {
        1
    }
}

/// Normal-type moves become `self.0` with a 1.2x boost.
pub struct TypeConverter(pub Type);

impl AbilityHooks for TypeConverter {
    fn check_type_change(&self, _holder: &Combatant, mv: &MoveTemplate) -> Option<TypeChange> {
        (mv.element == Type::Normal && mv.is_damaging()).then(|| TypeChange {
            move_type: Some(self.0),
            user_types: None,
            power_modifier: 1.2,
        })
    }
}

pub struct Normalize;

impl AbilityHooks for Normalize {
    fn check_type_change(&self, _holder: &Combatant, mv: &MoveTemplate) -> Option<TypeChange> {
        mv.is_damaging().then(|| TypeChange {
            move_type: Some(Type::Normal),
            user_types: None,
            power_modifier: 1.2,
        })
    }
}

/// The user becomes the element of the move it is about to use.
pub struct Protean;

impl AbilityHooks for Protean {
    fn check_type_change(&self, holder: &Combatant, mv: &MoveTemplate) -> Option<TypeChange> {
        if mv.element == Type::Typeless || holder.types == [mv.element] {
            return None;
        }
        Some(TypeChange {
            move_type: None,
            user_types: Some(vec![mv.element]),
            power_modifier: 1.0,
        })
    }
}

pub struct ThickFat;

impl AbilityHooks for ThickFat {
    fn modify_incoming_damage(&self, ctx: &MoveContext) -> f32 {
        if matches!(ctx.move_type, Type::Fire | Type::Ice) {
            0.5
        } else {
            1.0
        }
    }
}

pub struct Filter;

impl AbilityHooks for Filter {
    fn modify_incoming_damage(&self, ctx: &MoveContext) -> f32 {
        if ctx.effectiveness > 1.0 {
            0.75
        } else {
            1.0
        }
    }
}

pub struct Multiscale;

impl AbilityHooks for Multiscale {
    fn modify_incoming_damage(&self, ctx: &MoveContext) -> f32 {
        if ctx.defender.is_full_hp() {
            0.5
        } else {
            1.0
        }
    }
}

pub struct FurCoat;

impl AbilityHooks for FurCoat {
    fn modify_incoming_damage(&self, ctx: &MoveContext) -> f32 {
        if ctx.is_physical() {
            0.5
        } else {
            1.0
        }
    }
}

pub struct Levitate;

impl AbilityHooks for Levitate {
    fn check_type_immunity(&self, ctx: &MoveContext) -> Option<Absorb> {
        (ctx.move_type == Type::Ground && !ctx.field.gravity()).then(Absorb::default)
    }
}

/// Absorbs one element and restores a quarter of max HP.
pub struct HealAbsorb(pub Type);

impl AbilityHooks for HealAbsorb {
    fn check_type_immunity(&self, ctx: &MoveContext) -> Option<Absorb> {
        (ctx.move_type == self.0).then(|| Absorb {
            effects: vec![on_self(heal(1, 4))],
            volatile: None,
        })
    }
}

/// Absorbs one element and raises a stat by one stage.
pub struct BoostAbsorb(pub Type, pub BoostStat);

impl AbilityHooks for BoostAbsorb {
    fn check_type_immunity(&self, ctx: &MoveContext) -> Option<Absorb> {
        (ctx.move_type == self.0).then(|| Absorb {
            effects: vec![on_self(boost(self.1, 1))],
            volatile: None,
        })
    }
}

pub struct WonderGuard;

impl AbilityHooks for WonderGuard {
    fn check_type_immunity(&self, ctx: &MoveContext) -> Option<Absorb> {
        (ctx.mv.is_damaging() && ctx.effectiveness <= 1.0 && ctx.move_type != Type::Typeless)
            .then(Absorb::default)
    }
}

pub struct StatusImmunity(pub StatusKind);

impl AbilityHooks for StatusImmunity {
    fn check_status_immunity(&self, _holder: &Combatant, affliction: Affliction) -> bool {
        match (self.0, affliction) {
            (StatusKind::Poison, Affliction::Status(StatusKind::Poison | StatusKind::BadlyPoisoned)) => true,
            (guarded, Affliction::Status(status)) => guarded == status,
            _ => false,
        }
    }
}

pub struct OwnTempo;

impl AbilityHooks for OwnTempo {
    fn check_status_immunity(&self, _holder: &Combatant, affliction: Affliction) -> bool {
        affliction == Affliction::Confusion
    }
}

pub struct InnerFocus;

impl AbilityHooks for InnerFocus {
    fn check_status_immunity(&self, _holder: &Combatant, affliction: Affliction) -> bool {
        affliction == Affliction::Flinch
    }
}

/// Blocks opponent-caused drops of one stat, or of every stat when `None`.
pub struct StatGuard(pub Option<BoostStat>);

impl AbilityHooks for StatGuard {
    fn check_stat_drop_immunity(&self, stat: BoostStat) -> bool {
        self.0.map_or(true, |guarded| guarded == stat)
    }
}

pub struct ContactStatus(pub StatusKind);

impl AbilityHooks for ContactStatus {
    fn on_contact(&self, ctx: &MoveContext) -> Vec<EffectSpec> {
        if ctx.attacker.is_fainted() {
            return Vec::new();
        }
        vec![on_opponent(inflict(self.0)).with_chance(30)]
    }
}

pub struct EffectSpore;

impl AbilityHooks for EffectSpore {
    fn on_contact(&self, ctx: &MoveContext) -> Vec<EffectSpec> {
        if ctx.attacker.is_fainted() || ctx.attacker.has_type(Type::Grass) {
            return Vec::new();
        }
        [StatusKind::Sleep, StatusKind::Poison, StatusKind::Paralysis]
            .into_iter()
            .map(|status| on_opponent(inflict(status)).with_chance(10))
            .collect()
    }
}

pub struct ContactDamage;

impl AbilityHooks for ContactDamage {
    fn on_contact(&self, ctx: &MoveContext) -> Vec<EffectSpec> {
        if ctx.attacker.is_fainted() {
            return Vec::new();
        }
        vec![on_opponent(chip(1, 8))]
    }
}

pub struct Stench;

impl AbilityHooks for Stench {
    fn on_after_attacking(&self, ctx: &MoveContext) -> Vec<EffectSpec> {
        if ctx.defender.is_fainted() {
            return Vec::new();
        }
        vec![on_opponent(EffectKind::Other(OtherEffect::Flinch)).with_chance(10)]
    }
}

pub struct PoisonTouch;

impl AbilityHooks for PoisonTouch {
    fn on_after_attacking(&self, ctx: &MoveContext) -> Vec<EffectSpec> {
        if !ctx.mv.flags.contact || ctx.defender.is_fainted() {
            return Vec::new();
        }
        vec![on_opponent(inflict(StatusKind::Poison)).with_chance(30)]
    }
}

pub struct Moxie;

impl AbilityHooks for Moxie {
    fn on_ko(&self, ctx: &KoContext) -> Vec<EffectSpec> {
        if ctx.role != KoRole::Attacker || ctx.holder.is_fainted() {
            return Vec::new();
        }
        vec![on_self(boost(BoostStat::Atk, 1))]
    }
}

pub struct Aftermath;

impl AbilityHooks for Aftermath {
    fn on_ko(&self, ctx: &KoContext) -> Vec<EffectSpec> {
        if ctx.role != KoRole::Victim || !ctx.mv.flags.contact || ctx.other.is_fainted() {
            return Vec::new();
        }
        vec![on_opponent(chip(1, 4))]
    }
}

pub struct SpeedBoost;

impl AbilityHooks for SpeedBoost {
    fn on_start_of_turn(&self, _ctx: &TurnContext) -> Vec<EffectSpec> {
        vec![on_self(boost(BoostStat::Spe, 1))]
    }
}

pub struct ShedSkin;

impl AbilityHooks for ShedSkin {
    fn on_start_of_turn(&self, ctx: &TurnContext) -> Vec<EffectSpec> {
        if ctx.holder.status.is_none() {
            return Vec::new();
        }
        vec![on_self(EffectKind::Other(OtherEffect::CureStatus)).with_chance(33)]
    }
}

pub struct Hydration;

impl AbilityHooks for Hydration {
    fn on_start_of_turn(&self, ctx: &TurnContext) -> Vec<EffectSpec> {
        if ctx.holder.status.is_none() || !weather_is(ctx.field, Weather::Rain) {
            return Vec::new();
        }
        vec![on_self(EffectKind::Other(OtherEffect::CureStatus))]
    }
}

pub struct PoisonHeal;

impl AbilityHooks for PoisonHeal {
    fn heals_from_poison(&self) -> bool {
        true
    }
}

pub struct BadDreams;

impl AbilityHooks for BadDreams {
    fn on_end_of_turn(&self, ctx: &TurnContext) -> Vec<EffectSpec> {
        let asleep = matches!(ctx.opponent.status.kind(), Some(StatusKind::Sleep));
        if !asleep || ctx.opponent.is_fainted() {
            return Vec::new();
        }
        vec![on_opponent(chip(1, 8))]
    }
}

pub struct WeatherHeal(pub Weather);

impl AbilityHooks for WeatherHeal {
    fn on_end_of_turn(&self, ctx: &TurnContext) -> Vec<EffectSpec> {
        if !weather_is(ctx.field, self.0) || ctx.holder.is_full_hp() {
            return Vec::new();
        }
        vec![on_self(heal(1, 16))]
    }

    fn check_weather_immunity(&self, weather: Weather) -> bool {
        weather == self.0
    }
}

pub struct WeatherSpeed(pub Weather);

impl AbilityHooks for WeatherSpeed {
    fn modify_speed(&self, _holder: &Combatant, field: &GlobalField) -> f32 {
        if weather_is(field, self.0) {
            2.0
        } else {
            1.0
        }
    }

    fn check_weather_immunity(&self, weather: Weather) -> bool {
        weather == self.0 && matches!(weather, Weather::Sandstorm)
    }
}

pub struct QuickFeet;

impl AbilityHooks for QuickFeet {
    fn modify_speed(&self, holder: &Combatant, _field: &GlobalField) -> f32 {
        if holder.status.is_none() {
            1.0
        } else {
            1.5
        }
    }
}

pub struct CompoundEyes;

impl AbilityHooks for CompoundEyes {
    fn modify_accuracy(&self, _ctx: &MoveContext, role: HookRole) -> f32 {
        if role == HookRole::Attacker {
            1.3
        } else {
            1.0
        }
    }
}

pub struct WeatherEvasion(pub Weather);

impl AbilityHooks for WeatherEvasion {
    fn modify_accuracy(&self, ctx: &MoveContext, role: HookRole) -> f32 {
        if role == HookRole::Defender && weather_is(ctx.field, self.0) {
            0.8
        } else {
            1.0
        }
    }

    fn check_weather_immunity(&self, weather: Weather) -> bool {
        weather == self.0
    }
}

pub struct Steadfast;

impl AbilityHooks for Steadfast {
    fn on_flinch(&self) -> Vec<EffectSpec> {
        vec![on_self(boost(BoostStat::Spe, 1))]
    }
}

pub struct AngerPoint;

impl AbilityHooks for AngerPoint {
    fn on_crit_received(&self) -> Vec<EffectSpec> {
        vec![on_self(boost(BoostStat::Atk, 12))]
    }
}

pub struct ShadowTag;

impl AbilityHooks for ShadowTag {
    fn check_trapping(&self, _holder: &Combatant, opponent: &Combatant, _field: &GlobalField) -> bool {
        !matches!(opponent.ability, crate::sim::abilities::Ability::ShadowTag) && !opponent.has_type(Type::Ghost)
    }
}

pub struct ArenaTrap;

impl AbilityHooks for ArenaTrap {
    fn check_trapping(&self, _holder: &Combatant, opponent: &Combatant, field: &GlobalField) -> bool {
        opponent.is_grounded(field.gravity()) && !opponent.has_type(Type::Ghost)
    }
}

pub struct MagnetPull;

impl AbilityHooks for MagnetPull {
    fn check_trapping(&self, _holder: &Combatant, opponent: &Combatant, _field: &GlobalField) -> bool {
        opponent.has_type(Type::Steel) && !opponent.has_type(Type::Ghost)
    }
}

pub struct SkillLink;

impl AbilityHooks for SkillLink {
    fn modify_multi_hit(&self, _min: u8, max: u8) -> Option<u8> {
        Some(max)
    }
}

pub struct MoldBreaker;

impl AbilityHooks for MoldBreaker {
    fn check_mold_breaker(&self) -> bool {
        true
    }
}

pub struct Simple;

impl AbilityHooks for Simple {
    fn modify_stat_change(&self, delta: i8) -> i8 {
        delta.saturating_mul(2)
    }
}

pub struct Contrary;

impl AbilityHooks for Contrary {
    fn modify_stat_change(&self, delta: i8) -> i8 {
        delta.saturating_neg()
    }
}

pub struct RockHead;

impl AbilityHooks for RockHead {
    fn check_recoil_immunity(&self) -> bool {
        true
    }
}

pub struct Overcoat;

impl AbilityHooks for Overcoat {
    fn check_weather_immunity(&self, _weather: Weather) -> bool {
        true
    }
}

pub struct MagicGuard;

impl AbilityHooks for MagicGuard {
    fn check_recoil_immunity(&self) -> bool {
        true
    }

    fn check_weather_immunity(&self, _weather: Weather) -> bool {
        true
    }

    fn blocks_indirect_damage(&self) -> bool {
        true
    }
}

pub struct Sturdy;

impl AbilityHooks for Sturdy {
    fn prevents_ko_from_full(&self) -> bool {
        true
    }

    fn check_type_immunity(&self, ctx: &MoveContext) -> Option<Absorb> {
        ctx.mv.has_other(OtherEffect::Ohko).then(Absorb::default)
    }
}
