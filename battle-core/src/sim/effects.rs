//! Effect Application Engine: applies one declarative [`EffectSpec`] against the battle.
//!
//! Targets are resolved relative to [`EffectContext::source`]. Every spec is independently
//! probability-gated; a spec with chance 100 never draws from the RNG. A rule that prevents
//! an effect is an ordinary outcome ([`EffectOutcome::Blocked`] or [`EffectOutcome::Fizzled`]),
//! never an error.

use crate::data::effects::{
    EffectKind, EffectSpec, FieldCondition, FixedAmount, HealMode, OtherEffect, StatDelta, StatusKind,
    TargetSelector, Terrain, Weather,
};
use crate::data::types::Type;
use crate::events::{BattleEvent, DamageSource, EventLog, SwitchReason};
use crate::sim::abilities::dispatch::hooks_for;
use crate::sim::abilities::{Ability, Affliction};
use crate::sim::combatant::PrimaryStatus;
use crate::sim::field::{TerrainState, WeatherState, MAX_SPIKES, MAX_TOXIC_SPIKES};
use crate::sim::state::{BattleState, SideId};
use crate::sim::switching;
use crate::sim::volatile::VolatileKind;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum BlockReason {
    AlreadyStatused,
    TypeImmune,
    Ability { ability: Ability },
    Terrain,
    Substitute,
    Rooted,
}

impl fmt::Display for BlockReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlockReason::AlreadyStatused => f.write_str("already has a status"),
            BlockReason::TypeImmune => f.write_str("immune by type"),
            BlockReason::Ability { ability } => write!(f, "protected by {ability}"),
            BlockReason::Terrain => f.write_str("protected by terrain"),
            BlockReason::Substitute => f.write_str("behind a substitute"),
            BlockReason::Rooted => f.write_str("anchored by its roots"),
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FizzleReason {
    ChanceMissed,
    NoTarget,
    FullHp,
    NoDamageDealt,
    AtLimit,
    AlreadyActive,
    NotEnoughHp,
    NoLastMove,
    NoSwitchCandidates,
    NothingToCure,
    Failed,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum EffectOutcome {
    Applied,
    Fizzled(FizzleReason),
    Blocked(BlockReason),
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum EffectOrigin {
    Move,
    Ability(Ability),
    Item,
    Residual,
}

#[derive(Clone, Copy, Debug)]
pub struct EffectContext {
    /// Side whose active produced the effect.
    pub source: SideId,
    /// Damage the triggering move dealt, for drain and recoil.
    pub damage_dealt: u16,
    /// The defender's ability is suppressed for opponent-targeted effects.
    pub mold_breaker: bool,
    pub origin: EffectOrigin,
}

impl EffectContext {
    pub fn from_move(source: SideId, damage_dealt: u16, mold_breaker: bool) -> Self {
        Self {
            source,
            damage_dealt,
            mold_breaker,
            origin: EffectOrigin::Move,
        }
    }

    pub fn from_ability(source: SideId, ability: Ability) -> Self {
        Self {
            source,
            damage_dealt: 0,
            mold_breaker: false,
            origin: EffectOrigin::Ability(ability),
        }
    }

    pub fn from_item(source: SideId) -> Self {
        Self {
            source,
            damage_dealt: 0,
            mold_breaker: false,
            origin: EffectOrigin::Item,
        }
    }

    pub fn residual(source: SideId) -> Self {
        Self {
            source,
            damage_dealt: 0,
            mold_breaker: false,
            origin: EffectOrigin::Residual,
        }
    }
}

/// Rolls the chance of each hook effect, then announces `side`'s ability and applies the ones that triggered.
pub(crate) fn apply_ability_effects<R: Rng + ?Sized>(
    state: &mut BattleState,
    side: SideId,
    specs: Vec<EffectSpec>,
    rng: &mut R,
    log: &mut EventLog,
) -> Vec<EffectOutcome> {
    let triggered: Vec<EffectSpec> = specs
        .into_iter()
        .filter(|spec| !spec.shapes_pipeline())
        .filter_map(|spec| {
            if spec.chance >= 100 {
                return Some(spec);
            }
            let roll: u8 = rng.gen_range(0..100);
            (roll < spec.chance).then(|| spec.with_chance(100))
        })
        .collect();
    if triggered.is_empty() {
        return Vec::new();
    }
    let holder = state.active(side);
    let ability = holder.ability;
    log.push(BattleEvent::AbilityActivated {
        side,
        name: holder.name.clone(),
        ability,
    });
    apply_all(&triggered, &EffectContext::from_ability(side, ability), state, rng, log)
}

/// Applies each spec in declared order.
pub fn apply_all<R: Rng + ?Sized>(
    specs: &[EffectSpec],
    ctx: &EffectContext,
    state: &mut BattleState,
    rng: &mut R,
    log: &mut EventLog,
) -> Vec<EffectOutcome> {
    specs
        .iter()
        .flat_map(|spec| apply_spec(spec, ctx, state, rng, log))
        .collect()
}

/// Applies one spec. Returns one outcome per resolved target, or a single outcome for
/// field-wide effects. Pipeline-shaping kinds produce no outcome.
pub fn apply_spec<R: Rng + ?Sized>(
    spec: &EffectSpec,
    ctx: &EffectContext,
    state: &mut BattleState,
    rng: &mut R,
    log: &mut EventLog,
) -> Vec<EffectOutcome> {
    if spec.shapes_pipeline() || state.is_terminal() {
        return Vec::new();
    }
    if spec.chance < 100 {
        let roll: u8 = rng.gen_range(0..100);
        if roll >= spec.chance {
            tracing::trace!(effect = %spec.effect, roll, chance = spec.chance, "effect roll failed");
            return vec![EffectOutcome::Fizzled(FizzleReason::ChanceMissed)];
        }
    }
    let announce = spec.chance >= 100;

    match spec.target {
        TargetSelector::Field => vec![apply_to_field(spec, ctx, state, log)],
        TargetSelector::User => vec![apply_to_side(spec, ctx, ctx.source, announce, state, rng, log)],
        TargetSelector::Opponent => {
            vec![apply_to_side(spec, ctx, ctx.source.opponent(), announce, state, rng, log)]
        }
        TargetSelector::All => [ctx.source, ctx.source.opponent()]
            .into_iter()
            .map(|side| apply_to_side(spec, ctx, side, announce, state, rng, log))
            .collect(),
    }
}

fn apply_to_field(spec: &EffectSpec, ctx: &EffectContext, state: &mut BattleState, log: &mut EventLog) -> EffectOutcome {
    match &spec.effect {
        EffectKind::WeatherSet { weather } => set_weather(state, *weather, log),
        EffectKind::FieldSet { condition } => set_field(state, *condition, ctx.source, log),
        EffectKind::Other(OtherEffect::Haze) => {
            haze(state, log);
            EffectOutcome::Applied
        }
        other => {
            tracing::warn!(effect = %other, "field target for a combatant effect");
            EffectOutcome::Fizzled(FizzleReason::NoTarget)
        }
    }
}

fn apply_to_side<R: Rng + ?Sized>(
    spec: &EffectSpec,
    ctx: &EffectContext,
    target: SideId,
    announce: bool,
    state: &mut BattleState,
    rng: &mut R,
    log: &mut EventLog,
) -> EffectOutcome {
    let side_wide = matches!(
        spec.effect,
        EffectKind::FieldSet { .. }
            | EffectKind::WeatherSet { .. }
            | EffectKind::Other(OtherEffect::BreakScreens | OtherEffect::ClearHazards | OtherEffect::Haze)
    );
    if !side_wide && state.active(target).is_fainted() {
        return EffectOutcome::Fizzled(FizzleReason::NoTarget);
    }
    let opposing = target != ctx.source;
    if opposing
        && ctx.origin == EffectOrigin::Move
        && blocked_by_substitute(&spec.effect)
        && state.active(target).volatiles.has(VolatileKind::Substitute)
    {
        if announce {
            blocked_event(state, target, BlockReason::Substitute, log);
        }
        return EffectOutcome::Blocked(BlockReason::Substitute);
    }

    let outcome = match &spec.effect {
        EffectKind::StatusInflict { status } => inflict_status(state, target, *status, ctx, rng, log),
        EffectKind::StatChange { changes } => change_stats(state, target, changes, ctx, log),
        EffectKind::Heal { mode } => heal(state, target, *mode, ctx, log),
        EffectKind::Recoil { percent } => recoil(state, target, *percent, ctx, log),
        EffectKind::WeatherSet { weather } => set_weather(state, *weather, log),
        EffectKind::FieldSet { condition } => set_field(state, *condition, target, log),
        EffectKind::FixedDamage { amount } => fixed_damage(state, target, *amount, ctx, log),
        EffectKind::Other(other) => apply_other(state, target, *other, ctx, rng, log),
    };
    if let EffectOutcome::Blocked(reason) = outcome {
        if announce {
            blocked_event(state, target, reason, log);
        }
    }
    outcome
}

fn blocked_by_substitute(effect: &EffectKind) -> bool {
    match effect {
        EffectKind::StatusInflict { .. } | EffectKind::StatChange { .. } => true,
        EffectKind::Other(other) => matches!(
            other,
            OtherEffect::Flinch
                | OtherEffect::Confuse
                | OtherEffect::Trap { .. }
                | OtherEffect::Seed
                | OtherEffect::Disable
                | OtherEffect::Taunt
                | OtherEffect::Yawn
        ),
        _ => false,
    }
}

fn blocked_event(state: &BattleState, side: SideId, reason: BlockReason, log: &mut EventLog) {
    log.push(BattleEvent::EffectBlocked {
        side,
        name: state.active(side).name.clone(),
        reason,
    });
}

/// Removes up to `amount` HP from `side`'s active. Returns the HP actually lost.
pub(crate) fn damage_combatant(
    state: &mut BattleState,
    side: SideId,
    amount: u16,
    source: DamageSource,
    log: &mut EventLog,
) -> u16 {
    let target = state.active_mut(side);
    if target.is_fainted() || amount == 0 {
        return 0;
    }
    let lost = target.take_damage(amount);
    log.push(BattleEvent::Damage {
        side,
        name: target.name.clone(),
        amount: lost,
        hp: target.hp,
        max_hp: target.max_hp(),
        source,
    });
    lost
}

pub(crate) fn heal_combatant(state: &mut BattleState, side: SideId, amount: u16, log: &mut EventLog) -> u16 {
    let target = state.active_mut(side);
    if target.is_fainted() {
        return 0;
    }
    let restored = target.heal(amount);
    if restored > 0 {
        log.push(BattleEvent::Heal {
            side,
            name: target.name.clone(),
            amount: restored,
            hp: target.hp,
            max_hp: target.max_hp(),
        });
    }
    restored
}

/// Routes damage into `side`'s substitute. Returns the substitute HP removed.
pub(crate) fn hit_substitute(state: &mut BattleState, side: SideId, amount: u16, log: &mut EventLog) -> u16 {
    let target = state.active_mut(side);
    let Some(sub) = target.volatiles.get_mut(VolatileKind::Substitute) else {
        return 0;
    };
    let absorbed = amount.min(sub.value);
    sub.value -= absorbed;
    let broke = sub.value == 0;
    let name = target.name.clone();
    log.push(BattleEvent::SubstituteDamaged {
        side,
        name: name.clone(),
        amount: absorbed,
    });
    if broke {
        target.volatiles.remove(VolatileKind::Substitute);
        log.push(BattleEvent::SubstituteBroke { side, name });
    }
    absorbed
}

/// Whether an element makes its holder immune to a primary status.
pub fn status_type_immune(status: StatusKind, types: &[Type]) -> bool {
    let has = |element: Type| types.contains(&element);
    match status {
        StatusKind::Burn => has(Type::Fire),
        StatusKind::Freeze => has(Type::Ice),
        StatusKind::Paralysis => has(Type::Electric),
        StatusKind::Poison | StatusKind::BadlyPoisoned => has(Type::Poison) || has(Type::Steel),
        StatusKind::Sleep => false,
    }
}

fn inflict_status<R: Rng + ?Sized>(
    state: &mut BattleState,
    target: SideId,
    status: StatusKind,
    ctx: &EffectContext,
    rng: &mut R,
    log: &mut EventLog,
) -> EffectOutcome {
    let suppressed = ctx.mold_breaker && target != ctx.source;
    let gravity = state.field.gravity();
    let terrain = state.field.terrain();
    let sleep_turns = state.config.sleep_turns;
    let combatant = state.active(target);
    if !combatant.status.is_none() {
        return EffectOutcome::Blocked(BlockReason::AlreadyStatused);
    }
    if status_type_immune(status, &combatant.types) {
        return EffectOutcome::Blocked(BlockReason::TypeImmune);
    }
    if hooks_for(combatant, suppressed).check_status_immunity(combatant, Affliction::Status(status)) {
        return EffectOutcome::Blocked(BlockReason::Ability {
            ability: combatant.ability,
        });
    }
    if combatant.is_grounded(gravity) {
        let terrain_blocks = match terrain {
            Some(Terrain::Misty) => true,
            Some(Terrain::Electric) => status == StatusKind::Sleep,
            _ => false,
        };
        if terrain_blocks {
            return EffectOutcome::Blocked(BlockReason::Terrain);
        }
    }

    let primary = match status {
        StatusKind::Sleep => PrimaryStatus::Sleep {
            turns: rng.gen_range(sleep_turns.0..=sleep_turns.1),
        },
        StatusKind::Freeze => PrimaryStatus::Freeze,
        StatusKind::Paralysis => PrimaryStatus::Paralysis,
        StatusKind::Burn => PrimaryStatus::Burn,
        StatusKind::Poison => PrimaryStatus::Poison,
        StatusKind::BadlyPoisoned => PrimaryStatus::BadlyPoisoned { counter: 1 },
    };
    let combatant = state.active_mut(target);
    combatant.status = primary;
    combatant.volatiles.remove(VolatileKind::Yawn);
    log.push(BattleEvent::StatusInflicted {
        side: target,
        name: combatant.name.clone(),
        status,
    });
    EffectOutcome::Applied
}

fn change_stats(
    state: &mut BattleState,
    target: SideId,
    changes: &[StatDelta],
    ctx: &EffectContext,
    log: &mut EventLog,
) -> EffectOutcome {
    let opposing = target != ctx.source;
    let combatant = state.active_mut(target);
    let hooks = hooks_for(combatant, opposing && ctx.mold_breaker);
    let mut applied = false;
    let mut blocked = false;
    for change in changes {
        let delta = hooks.modify_stat_change(change.delta);
        if delta < 0 && opposing && hooks.check_stat_drop_immunity(change.stat) {
            blocked = true;
            continue;
        }
        let result = combatant.stages.apply(change.stat, delta);
        if result.had_effect() {
            applied = true;
            log.push(BattleEvent::StatChanged {
                side: target,
                name: combatant.name.clone(),
                stat: change.stat,
                delta: result.applied,
                now: result.now,
            });
        } else {
            log.push(BattleEvent::StatUnchanged {
                side: target,
                name: combatant.name.clone(),
                stat: change.stat,
                raising: delta > 0,
            });
        }
    }
    if applied {
        EffectOutcome::Applied
    } else if blocked {
        EffectOutcome::Blocked(BlockReason::Ability {
            ability: combatant.ability,
        })
    } else {
        EffectOutcome::Fizzled(FizzleReason::AtLimit)
    }
}

fn heal(state: &mut BattleState, target: SideId, mode: HealMode, ctx: &EffectContext, log: &mut EventLog) -> EffectOutcome {
    let combatant = state.active(target);
    if combatant.is_full_hp() {
        return EffectOutcome::Fizzled(FizzleReason::FullHp);
    }
    let amount = match mode {
        HealMode::Fraction { num, den } => combatant.fraction_of_max(num, den),
        HealMode::Drain { percent } => {
            if ctx.damage_dealt == 0 {
                return EffectOutcome::Fizzled(FizzleReason::NoDamageDealt);
            }
            (ctx.damage_dealt as u32 * percent as u32 / 100).max(1) as u16
        }
    };
    heal_combatant(state, target, amount, log);
    EffectOutcome::Applied
}

fn recoil(state: &mut BattleState, target: SideId, percent: u8, ctx: &EffectContext, log: &mut EventLog) -> EffectOutcome {
    if ctx.damage_dealt == 0 {
        return EffectOutcome::Fizzled(FizzleReason::NoDamageDealt);
    }
    let combatant = state.active(target);
    if combatant.ability.hooks().check_recoil_immunity() {
        return EffectOutcome::Blocked(BlockReason::Ability {
            ability: combatant.ability,
        });
    }
    let amount = (ctx.damage_dealt as u32 * percent as u32 / 100).max(1) as u16;
    damage_combatant(state, target, amount, DamageSource::Recoil, log);
    EffectOutcome::Applied
}

fn fixed_damage(
    state: &mut BattleState,
    target: SideId,
    amount: FixedAmount,
    ctx: &EffectContext,
    log: &mut EventLog,
) -> EffectOutcome {
    let source_level = state.active(ctx.source).level;
    let combatant = state.active(target);
    let hp = match amount {
        FixedAmount::Flat { hp } => hp,
        FixedAmount::Level => source_level as u16,
        FixedAmount::HalfCurrent => (combatant.hp / 2).max(1),
        FixedAmount::FractionMax { num, den } => combatant.fraction_of_max(num, den),
    };
    match ctx.origin {
        EffectOrigin::Move => {
            if target != ctx.source && combatant.volatiles.has(VolatileKind::Substitute) {
                hit_substitute(state, target, hp, log);
                return EffectOutcome::Applied;
            }
            damage_combatant(state, target, hp, DamageSource::Effect, log);
        }
        EffectOrigin::Ability(ability) => {
            if combatant.ability.hooks().blocks_indirect_damage() {
                return EffectOutcome::Blocked(BlockReason::Ability {
                    ability: combatant.ability,
                });
            }
            damage_combatant(state, target, hp, DamageSource::Ability { ability }, log);
        }
        EffectOrigin::Item | EffectOrigin::Residual => {
            if combatant.ability.hooks().blocks_indirect_damage() {
                return EffectOutcome::Blocked(BlockReason::Ability {
                    ability: combatant.ability,
                });
            }
            damage_combatant(state, target, hp, DamageSource::Effect, log);
        }
    }
    EffectOutcome::Applied
}

fn set_weather(state: &mut BattleState, weather: Weather, log: &mut EventLog) -> EffectOutcome {
    state.field.weather = Some(WeatherState {
        kind: weather,
        turns: state.config.weather_turns,
    });
    log.push(BattleEvent::WeatherStarted { weather });
    EffectOutcome::Applied
}

fn set_field(state: &mut BattleState, condition: FieldCondition, side: SideId, log: &mut EventLog) -> EffectOutcome {
    let config = state.config.clone();
    if let Some(terrain) = condition.terrain() {
        state.field.terrain = Some(TerrainState {
            kind: terrain,
            turns: config.terrain_turns,
        });
        log.push(BattleEvent::FieldStarted { condition, side: None });
        return EffectOutcome::Applied;
    }
    let screen_turns = config.screen_turns;
    let tailwind_turns = config.tailwind_turns;
    match condition {
        FieldCondition::Gravity => state.field.gravity_turns = config.gravity_turns,
        FieldCondition::TrickRoom => state.field.trick_room_turns = config.trick_room_turns,
        _ => {
            let conditions = &mut state.side_mut(side).conditions;
            match condition {
                FieldCondition::Reflect => conditions.reflect_turns = screen_turns,
                FieldCondition::LightScreen => conditions.light_screen_turns = screen_turns,
                FieldCondition::Tailwind => conditions.tailwind_turns = tailwind_turns,
                FieldCondition::Spikes => {
                    if conditions.spikes >= MAX_SPIKES {
                        return EffectOutcome::Fizzled(FizzleReason::AtLimit);
                    }
                    conditions.spikes += 1;
                }
                FieldCondition::ToxicSpikes => {
                    if conditions.toxic_spikes >= MAX_TOXIC_SPIKES {
                        return EffectOutcome::Fizzled(FizzleReason::AtLimit);
                    }
                    conditions.toxic_spikes += 1;
                }
                FieldCondition::StealthRock => {
                    if conditions.stealth_rock {
                        return EffectOutcome::Fizzled(FizzleReason::AlreadyActive);
                    }
                    conditions.stealth_rock = true;
                }
                _ => {}
            }
            log.push(BattleEvent::FieldStarted {
                condition,
                side: Some(side),
            });
            return EffectOutcome::Applied;
        }
    }
    log.push(BattleEvent::FieldStarted { condition, side: None });
    EffectOutcome::Applied
}

fn haze(state: &mut BattleState, log: &mut EventLog) {
    for side in SideId::BOTH {
        state.active_mut(side).stages.reset();
    }
    log.push(BattleEvent::StagesReset);
}

fn start_volatile(
    state: &mut BattleState,
    target: SideId,
    kind: VolatileKind,
    turns: Option<u8>,
    value: u16,
    log: &mut EventLog,
) -> EffectOutcome {
    let combatant = state.active_mut(target);
    if combatant.volatiles.has(kind) {
        return EffectOutcome::Fizzled(FizzleReason::AlreadyActive);
    }
    combatant.volatiles.insert(kind, turns, value);
    log.push(BattleEvent::VolatileStarted {
        side: target,
        name: combatant.name.clone(),
        kind,
    });
    EffectOutcome::Applied
}

fn apply_other<R: Rng + ?Sized>(
    state: &mut BattleState,
    target: SideId,
    effect: OtherEffect,
    ctx: &EffectContext,
    rng: &mut R,
    log: &mut EventLog,
) -> EffectOutcome {
    let suppressed = ctx.mold_breaker && target != ctx.source;
    match effect {
        OtherEffect::Flinch => {
            let combatant = state.active_mut(target);
            if hooks_for(combatant, suppressed).check_status_immunity(combatant, Affliction::Flinch) {
                return EffectOutcome::Blocked(BlockReason::Ability {
                    ability: combatant.ability,
                });
            }
            combatant.volatiles.insert(VolatileKind::Flinch, None, 0);
            EffectOutcome::Applied
        }
        OtherEffect::Confuse => {
            let gravity = state.field.gravity();
            let misty = state.field.terrain() == Some(Terrain::Misty);
            let (lo, hi) = state.config.confusion_turns;
            let combatant = state.active(target);
            if hooks_for(combatant, suppressed).check_status_immunity(combatant, Affliction::Confusion) {
                return EffectOutcome::Blocked(BlockReason::Ability {
                    ability: combatant.ability,
                });
            }
            if misty && combatant.is_grounded(gravity) {
                return EffectOutcome::Blocked(BlockReason::Terrain);
            }
            if combatant.volatiles.has(VolatileKind::Confusion) {
                return EffectOutcome::Fizzled(FizzleReason::AlreadyActive);
            }
            let turns = rng.gen_range(lo..=hi);
            start_volatile(state, target, VolatileKind::Confusion, Some(turns), 0, log)
        }
        OtherEffect::Trap { partial: true } => {
            if state.active(target).volatiles.has(VolatileKind::PartiallyTrapped) {
                return EffectOutcome::Fizzled(FizzleReason::AlreadyActive);
            }
            let (lo, hi) = state.config.partial_trap_turns;
            let turns = rng.gen_range(lo..=hi);
            start_volatile(state, target, VolatileKind::PartiallyTrapped, Some(turns), 0, log)
        }
        OtherEffect::Trap { partial: false } => {
            if state.active(target).has_type(Type::Ghost) {
                return EffectOutcome::Blocked(BlockReason::TypeImmune);
            }
            start_volatile(state, target, VolatileKind::Trapped, None, 0, log)
        }
        OtherEffect::Seed => {
            if state.active(target).has_type(Type::Grass) {
                return EffectOutcome::Blocked(BlockReason::TypeImmune);
            }
            start_volatile(state, target, VolatileKind::Seeded, None, ctx.source.index() as u16, log)
        }
        OtherEffect::Substitute => {
            let combatant = state.active(target);
            if combatant.volatiles.has(VolatileKind::Substitute) {
                return EffectOutcome::Fizzled(FizzleReason::AlreadyActive);
            }
            let cost = combatant.fraction_of_max(1, 4);
            if combatant.hp <= cost {
                log.push(BattleEvent::MoveFailed {
                    side: target,
                    name: combatant.name.clone(),
                });
                return EffectOutcome::Fizzled(FizzleReason::NotEnoughHp);
            }
            damage_combatant(state, target, cost, DamageSource::Effect, log);
            let combatant = state.active_mut(target);
            combatant.volatiles.insert(VolatileKind::Substitute, None, cost);
            log.push(BattleEvent::SubstituteCreated {
                side: target,
                name: combatant.name.clone(),
            });
            EffectOutcome::Applied
        }
        OtherEffect::Protect => protect(state, target, rng, log),
        OtherEffect::ForceSwitch => {
            if state.active(target).volatiles.has(VolatileKind::Rooted) {
                return EffectOutcome::Blocked(BlockReason::Rooted);
            }
            match switching::pick_random_switch(state.side(target), rng) {
                Some(bench) => {
                    switching::perform_switch(state, target, bench, SwitchReason::Dragged, rng, log);
                    EffectOutcome::Applied
                }
                None => EffectOutcome::Fizzled(FizzleReason::NoSwitchCandidates),
            }
        }
        OtherEffect::SelfSwitch => match switching::pick_random_switch(state.side(target), rng) {
            Some(bench) => {
                switching::perform_switch(state, target, bench, SwitchReason::Pivot, rng, log);
                EffectOutcome::Applied
            }
            None => EffectOutcome::Fizzled(FizzleReason::NoSwitchCandidates),
        },
        OtherEffect::Disable => {
            let Some(slot) = state.active(target).last_move else {
                return EffectOutcome::Fizzled(FizzleReason::NoLastMove);
            };
            let turns = state.config.disable_turns;
            start_volatile(state, target, VolatileKind::Disabled, Some(turns), slot as u16, log)
        }
        OtherEffect::Taunt => {
            let turns = state.config.taunt_turns;
            start_volatile(state, target, VolatileKind::Taunt, Some(turns), 0, log)
        }
        OtherEffect::Yawn => {
            if !state.active(target).status.is_none() {
                return EffectOutcome::Blocked(BlockReason::AlreadyStatused);
            }
            start_volatile(state, target, VolatileKind::Yawn, Some(2), 0, log)
        }
        OtherEffect::Root => start_volatile(state, target, VolatileKind::Rooted, None, 0, log),
        OtherEffect::AquaRing => start_volatile(state, target, VolatileKind::AquaRing, None, 0, log),
        OtherEffect::CureStatus => {
            let combatant = state.active_mut(target);
            let Some(status) = combatant.status.kind() else {
                return EffectOutcome::Fizzled(FizzleReason::NothingToCure);
            };
            combatant.clear_status();
            log.push(BattleEvent::StatusCured {
                side: target,
                name: combatant.name.clone(),
                status,
            });
            EffectOutcome::Applied
        }
        OtherEffect::Haze => {
            haze(state, log);
            EffectOutcome::Applied
        }
        OtherEffect::BreakScreens => {
            let conditions = &mut state.side_mut(target).conditions;
            let mut ended = Vec::new();
            if conditions.reflect_turns > 0 {
                conditions.reflect_turns = 0;
                ended.push(FieldCondition::Reflect);
            }
            if conditions.light_screen_turns > 0 {
                conditions.light_screen_turns = 0;
                ended.push(FieldCondition::LightScreen);
            }
            if ended.is_empty() {
                return EffectOutcome::Fizzled(FizzleReason::NoTarget);
            }
            for condition in ended {
                log.push(BattleEvent::FieldEnded {
                    condition,
                    side: Some(target),
                });
            }
            EffectOutcome::Applied
        }
        OtherEffect::ClearHazards => {
            let combatant = state.active_mut(target);
            for kind in [VolatileKind::Seeded, VolatileKind::PartiallyTrapped] {
                if combatant.volatiles.remove(kind).is_some() {
                    log.push(BattleEvent::VolatileEnded {
                        side: target,
                        name: combatant.name.clone(),
                        kind,
                    });
                }
            }
            let conditions = &mut state.side_mut(target).conditions;
            if !conditions.has_hazards() {
                return EffectOutcome::Fizzled(FizzleReason::NothingToCure);
            }
            conditions.clear_hazards();
            log.push(BattleEvent::HazardsCleared { side: target });
            EffectOutcome::Applied
        }
        OtherEffect::MultiHit { .. }
        | OtherEffect::Recharge
        | OtherEffect::Charge
        | OtherEffect::Counter { .. }
        | OtherEffect::Ohko
        | OtherEffect::HighCrit
        | OtherEffect::Pursuit => EffectOutcome::Fizzled(FizzleReason::Failed),
    }
}

/// Success chance is `1 / divisor^streak`, so the first use always works.
fn protect<R: Rng + ?Sized>(state: &mut BattleState, target: SideId, rng: &mut R, log: &mut EventLog) -> EffectOutcome {
    let divisor = state.config.protect_decay_divisor as f64;
    let combatant = state.active_mut(target);
    let streak = combatant.volatiles.value(VolatileKind::ProtectionStreak).unwrap_or(0);
    let succeeds = streak == 0 || rng.gen_bool(1.0 / divisor.powi(streak.min(16) as i32));
    if !succeeds {
        combatant.volatiles.remove(VolatileKind::ProtectionStreak);
        log.push(BattleEvent::MoveFailed {
            side: target,
            name: combatant.name.clone(),
        });
        return EffectOutcome::Fizzled(FizzleReason::Failed);
    }
    combatant.volatiles.insert(VolatileKind::ProtectionStreak, None, streak + 1);
    combatant.volatiles.insert(VolatileKind::Protected, None, 0);
    log.push(BattleEvent::VolatileStarted {
        side: target,
        name: combatant.name.clone(),
        kind: VolatileKind::Protected,
    });
    EffectOutcome::Applied
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BattleConfig;
    use crate::data::effects::BoostStat;
    use crate::data::moves::MoveCategory;
    use crate::sim::combatant::test_support::{attack, make_combatant};
    use crate::sim::state::Side;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn state_with(a_types: &[Type], b_types: &[Type]) -> BattleState {
        let tackle = attack("tackle", Type::Normal, MoveCategory::Physical, 40);
        let a = make_combatant("Alpha", a_types, vec![tackle.clone()]);
        let b = make_combatant("Beta", b_types, vec![tackle]);
        BattleState::new(
            Side::new(SideId::A, "A", vec![a]).unwrap(),
            Side::new(SideId::B, "B", vec![b]).unwrap(),
            BattleConfig::default(),
        )
        .unwrap()
    }

    fn stat_spec(target: TargetSelector, stat: BoostStat, delta: i8) -> EffectSpec {
        EffectSpec::new(
            target,
            EffectKind::StatChange {
                changes: vec![StatDelta { stat, delta }],
            },
        )
    }

    #[test]
    fn boost_at_cap_logs_no_effect() {
        let mut state = state_with(&[Type::Normal], &[Type::Normal]);
        state.active_mut(SideId::A).stages.atk = 6;
        let mut rng = SmallRng::seed_from_u64(1);
        let mut log = EventLog::new();
        let ctx = EffectContext::from_move(SideId::A, 0, false);
        let outcome = apply_spec(&stat_spec(TargetSelector::User, BoostStat::Atk, 2), &ctx, &mut state, &mut rng, &mut log);
        assert_eq!(outcome, vec![EffectOutcome::Fizzled(FizzleReason::AtLimit)]);
        assert_eq!(state.active(SideId::A).stages.atk, 6);
        assert!(matches!(
            log.events(),
            [BattleEvent::StatUnchanged { raising: true, .. }]
        ));
    }

    #[test]
    fn multi_stat_change_applies_partially() {
        let mut state = state_with(&[Type::Normal], &[Type::Normal]);
        state.active_mut(SideId::A).stages.atk = 6;
        let spec = EffectSpec::new(
            TargetSelector::User,
            EffectKind::StatChange {
                changes: vec![
                    StatDelta { stat: BoostStat::Atk, delta: 1 },
                    StatDelta { stat: BoostStat::Spe, delta: 1 },
                ],
            },
        );
        let mut rng = SmallRng::seed_from_u64(1);
        let mut log = EventLog::new();
        let ctx = EffectContext::from_move(SideId::A, 0, false);
        assert_eq!(apply_spec(&spec, &ctx, &mut state, &mut rng, &mut log), vec![EffectOutcome::Applied]);
        assert_eq!(state.active(SideId::A).stages.spe, 1);
        assert_eq!(log.len(), 2);
    }

    #[test]
    fn fire_types_cannot_burn() {
        let mut state = state_with(&[Type::Normal], &[Type::Fire]);
        let spec = EffectSpec::new(
            TargetSelector::Opponent,
            EffectKind::StatusInflict { status: StatusKind::Burn },
        );
        let mut rng = SmallRng::seed_from_u64(3);
        let mut log = EventLog::new();
        let ctx = EffectContext::from_move(SideId::A, 0, false);
        let outcome = apply_spec(&spec, &ctx, &mut state, &mut rng, &mut log);
        assert_eq!(outcome, vec![EffectOutcome::Blocked(BlockReason::TypeImmune)]);
        assert!(state.active(SideId::B).status.is_none());
    }

    #[test]
    fn second_status_is_blocked() {
        let mut state = state_with(&[Type::Normal], &[Type::Normal]);
        state.active_mut(SideId::B).status = PrimaryStatus::Paralysis;
        let spec = EffectSpec::new(
            TargetSelector::Opponent,
            EffectKind::StatusInflict { status: StatusKind::Sleep },
        );
        let mut rng = SmallRng::seed_from_u64(3);
        let mut log = EventLog::new();
        let ctx = EffectContext::from_move(SideId::A, 0, false);
        let outcome = apply_spec(&spec, &ctx, &mut state, &mut rng, &mut log);
        assert_eq!(outcome, vec![EffectOutcome::Blocked(BlockReason::AlreadyStatused)]);
        assert_eq!(state.active(SideId::B).status, PrimaryStatus::Paralysis);
    }

    #[test]
    fn sleep_duration_comes_from_config() {
        let mut state = state_with(&[Type::Normal], &[Type::Normal]);
        state.config.sleep_turns = (2, 2);
        let spec = EffectSpec::new(
            TargetSelector::Opponent,
            EffectKind::StatusInflict { status: StatusKind::Sleep },
        );
        let mut rng = SmallRng::seed_from_u64(9);
        let mut log = EventLog::new();
        let ctx = EffectContext::from_move(SideId::A, 0, false);
        apply_spec(&spec, &ctx, &mut state, &mut rng, &mut log);
        assert_eq!(state.active(SideId::B).status, PrimaryStatus::Sleep { turns: 2 });
    }

    #[test]
    fn substitute_blocks_opposing_stat_drops() {
        let mut state = state_with(&[Type::Normal], &[Type::Normal]);
        state.active_mut(SideId::B).volatiles.insert(VolatileKind::Substitute, None, 20);
        let mut rng = SmallRng::seed_from_u64(3);
        let mut log = EventLog::new();
        let ctx = EffectContext::from_move(SideId::A, 0, false);
        let outcome = apply_spec(&stat_spec(TargetSelector::Opponent, BoostStat::Def, -1), &ctx, &mut state, &mut rng, &mut log);
        assert_eq!(outcome, vec![EffectOutcome::Blocked(BlockReason::Substitute)]);
        assert_eq!(state.active(SideId::B).stages.def, 0);
    }

    #[test]
    fn clear_body_blocks_opponent_drops_but_not_mold_breaker() {
        let mut state = state_with(&[Type::Normal], &[Type::Steel]);
        state.active_mut(SideId::B).ability = Ability::ClearBody;
        let spec = stat_spec(TargetSelector::Opponent, BoostStat::Atk, -1);
        let mut rng = SmallRng::seed_from_u64(3);
        let mut log = EventLog::new();
        let plain = EffectContext::from_move(SideId::A, 0, false);
        assert_eq!(
            apply_spec(&spec, &plain, &mut state, &mut rng, &mut log),
            vec![EffectOutcome::Blocked(BlockReason::Ability { ability: Ability::ClearBody })]
        );
        let breaker = EffectContext::from_move(SideId::A, 0, true);
        assert_eq!(apply_spec(&spec, &breaker, &mut state, &mut rng, &mut log), vec![EffectOutcome::Applied]);
        assert_eq!(state.active(SideId::B).stages.atk, -1);
    }

    #[test]
    fn weather_overwrites_and_resets_duration() {
        let mut state = state_with(&[Type::Normal], &[Type::Normal]);
        state.field.weather = Some(WeatherState { kind: Weather::Rain, turns: 1 });
        let spec = EffectSpec::new(TargetSelector::Field, EffectKind::WeatherSet { weather: Weather::Sun });
        let mut rng = SmallRng::seed_from_u64(3);
        let mut log = EventLog::new();
        let ctx = EffectContext::from_move(SideId::A, 0, false);
        apply_spec(&spec, &ctx, &mut state, &mut rng, &mut log);
        assert_eq!(state.field.weather, Some(WeatherState { kind: Weather::Sun, turns: 5 }));
    }

    #[test]
    fn drain_heals_a_share_of_damage_dealt() {
        let mut state = state_with(&[Type::Grass], &[Type::Normal]);
        let max = state.active(SideId::A).max_hp();
        state.active_mut(SideId::A).hp = max - 30;
        let spec = EffectSpec::new(TargetSelector::User, EffectKind::Heal { mode: HealMode::Drain { percent: 50 } });
        let mut rng = SmallRng::seed_from_u64(3);
        let mut log = EventLog::new();
        let ctx = EffectContext::from_move(SideId::A, 40, false);
        apply_spec(&spec, &ctx, &mut state, &mut rng, &mut log);
        assert_eq!(state.active(SideId::A).hp, max - 10);
    }

    #[test]
    fn spikes_stop_at_three_layers() {
        let mut state = state_with(&[Type::Normal], &[Type::Normal]);
        let spec = EffectSpec::new(TargetSelector::Opponent, EffectKind::FieldSet { condition: FieldCondition::Spikes });
        let mut rng = SmallRng::seed_from_u64(3);
        let mut log = EventLog::new();
        let ctx = EffectContext::from_move(SideId::A, 0, false);
        for _ in 0..3 {
            assert_eq!(apply_spec(&spec, &ctx, &mut state, &mut rng, &mut log), vec![EffectOutcome::Applied]);
        }
        assert_eq!(
            apply_spec(&spec, &ctx, &mut state, &mut rng, &mut log),
            vec![EffectOutcome::Fizzled(FizzleReason::AtLimit)]
        );
        assert_eq!(state.side(SideId::B).conditions.spikes, 3);
    }

    #[test]
    fn zero_chance_never_applies() {
        let mut state = state_with(&[Type::Normal], &[Type::Normal]);
        let spec = EffectSpec::new(
            TargetSelector::Opponent,
            EffectKind::StatusInflict { status: StatusKind::Paralysis },
        )
        .with_chance(0);
        let mut rng = SmallRng::seed_from_u64(11);
        let mut log = EventLog::new();
        let ctx = EffectContext::from_move(SideId::A, 0, false);
        for _ in 0..20 {
            apply_spec(&spec, &ctx, &mut state, &mut rng, &mut log);
        }
        assert!(state.active(SideId::B).status.is_none());
        assert!(log.is_empty());
    }
}
