//! Action Resolver: orders a turn's actions and runs each one through the move pipeline.
//!
//! The faint check runs after every single action, so a combatant knocked out before its
//! turn comes up silently loses its queued action.

use crate::data::effects::{EffectSpec, OtherEffect};
use crate::data::moves::{MoveCategory, MoveTarget, MoveTemplate};
use crate::data::types::{effectiveness_against, Type};
use crate::events::{BattleEvent, DamageSource, EventLog, SwitchReason};
use crate::sim::abilities::{HookDispatcher, MoveContext};
use crate::sim::action::{bracket_for, chosen_move, Action, ActionKind, Bracket, STRUGGLE};
use crate::sim::combatant::{LastHit, PrimaryStatus};
use crate::sim::damage::{
    calculate_damage, roll_crit, roll_hit_count, roll_random_percent, strike_damage, Strike,
};
use crate::sim::effects::{self, EffectContext};
use crate::sim::state::{BattleResult, BattleState, SideId};
use crate::sim::stats::{accuracy_multiplier, Stat};
use crate::sim::switching;
use crate::sim::volatile::VolatileKind;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

const CONFUSION_POWER: u16 = 40;

/// Why a combatant lost its action this turn.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CannotAct {
    Recharging,
    Asleep,
    Frozen,
    Flinched,
    FullyParalyzed,
    ConfusionSelfHit,
    Disabled,
    Taunted,
}

impl fmt::Display for CannotAct {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            CannotAct::Recharging => "must recharge",
            CannotAct::Asleep => "fast asleep",
            CannotAct::Frozen => "frozen solid",
            CannotAct::Flinched => "flinched",
            CannotAct::FullyParalyzed => "fully paralyzed",
            CannotAct::ConfusionSelfHit => "hurt itself in its confusion",
            CannotAct::Disabled => "the move is disabled",
            CannotAct::Taunted => "taunted into attacking",
        };
        f.write_str(reason)
    }
}

/// Bench slot each side had active when the turn's actions were ordered.
/// A side whose active changed since then was replaced mid-turn.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct TurnEntrants([usize; 2]);

impl TurnEntrants {
    pub fn capture(state: &BattleState) -> Self {
        Self([state.sides[0].active, state.sides[1].active])
    }

    pub fn replaced(&self, state: &BattleState, side: SideId) -> bool {
        state.side(side).active != self.0[side.index()]
    }
}

/// Speed used for ordering: staged speed, halved by paralysis, then ability and tailwind.
pub fn effective_speed(state: &BattleState, side: SideId) -> u32 {
    let combatant = state.active(side);
    let mut speed = combatant.staged_stat(Stat::Spe) as f32;
    if combatant.status == PrimaryStatus::Paralysis {
        speed *= 0.5;
    }
    speed *= combatant.ability.hooks().modify_speed(combatant, &state.field);
    if state.side(side).conditions.tailwind_turns > 0 {
        speed *= 2.0;
    }
    speed.floor() as u32
}

/// Sorts by bracket, then priority, then speed (reversed under trick room). Actions whose
/// keys are fully equal form a tie group that is shuffled with `rng`; no draw happens
/// when nothing ties.
pub fn order_actions<R: Rng + ?Sized>(state: &BattleState, actions: &[Action], rng: &mut R) -> Vec<Action> {
    let trick_room = state.field.trick_room();
    let mut keyed: Vec<((Bracket, i8, i64), Action)> = actions
        .iter()
        .map(|action| {
            let opponent_switching = actions
                .iter()
                .any(|other| other.side == action.side.opponent() && other.is_switch());
            let (bracket, priority) = bracket_for(state, action, opponent_switching);
            let speed = effective_speed(state, action.side) as i64;
            let speed = if trick_room { -speed } else { speed };
            ((bracket, priority, speed), *action)
        })
        .collect();
    keyed.sort_by(|a, b| b.0.cmp(&a.0));

    let mut ordered = Vec::with_capacity(keyed.len());
    let mut start = 0;
    while start < keyed.len() {
        let key = keyed[start].0;
        let end = keyed[start..]
            .iter()
            .position(|(other, _)| *other != key)
            .map_or(keyed.len(), |offset| start + offset);
        let mut group: Vec<Action> = keyed[start..end].iter().map(|(_, action)| *action).collect();
        if group.len() > 1 {
            group.shuffle(rng);
            tracing::debug!(?key, ?group, "speed tie shuffled");
        }
        ordered.extend(group);
        start = end;
    }
    tracing::debug!(?ordered, trick_room, "action order");
    ordered
}

/// Resolves `ordered` one action at a time, settling faints after each.
pub fn resolve_actions<R: Rng + ?Sized>(
    state: &mut BattleState,
    ordered: &[Action],
    rng: &mut R,
    log: &mut EventLog,
) {
    let entrants = TurnEntrants::capture(state);
    for action in ordered {
        if state.is_terminal() {
            break;
        }
        resolve_action(state, action, &entrants, rng, log);
        settle_faints(state, log);
    }
    reset_unused_protection(state);
}

/// Clears the protection streak of every active that did not protect this turn,
/// whether it attacked, used an item or never got to act.
fn reset_unused_protection(state: &mut BattleState) {
    for side in SideId::BOTH {
        let combatant = state.active_mut(side);
        if !combatant.volatiles.has(VolatileKind::Protected) {
            combatant.volatiles.remove(VolatileKind::ProtectionStreak);
        }
    }
}

/// Runs one action. Actions from a fainted or replaced source are dropped without an event.
pub fn resolve_action<R: Rng + ?Sized>(
    state: &mut BattleState,
    action: &Action,
    entrants: &TurnEntrants,
    rng: &mut R,
    log: &mut EventLog,
) {
    let side = action.side;
    if state.active(side).is_fainted() || entrants.replaced(state, side) {
        tracing::trace!(?action, "source gone, action dropped");
        return;
    }
    match action.kind {
        ActionKind::Switch { bench } => {
            let roster = state.side(side);
            let usable = roster.bench.get(bench).is_some_and(|member| !member.is_fainted());
            if usable && bench != roster.active {
                switching::perform_switch(state, side, bench, SwitchReason::Voluntary, rng, log);
            }
        }
        ActionKind::Item { slot } => use_item(state, side, slot, rng, log),
        ActionKind::Flee => {
            let result = BattleResult::Winner(side.opponent());
            log.push(BattleEvent::Forfeit { side });
            log.push(BattleEvent::BattleEnded { result });
            state.result = Some(result);
        }
        ActionKind::Fight { slot } => use_move(state, side, slot, entrants, rng, log),
    }
}

/// Marks zero-HP actives fainted and ends the battle once a side has nobody left.
pub(crate) fn settle_faints(state: &mut BattleState, log: &mut EventLog) -> Option<BattleResult> {
    for side in SideId::BOTH {
        let combatant = state.active_mut(side);
        if combatant.hp == 0 && !combatant.fainted {
            combatant.fainted = true;
            combatant.volatiles.clear();
            log.push(BattleEvent::Fainted {
                side,
                name: combatant.name.clone(),
            });
        }
    }
    if state.result.is_none() {
        if let Some(result) = state.elimination_result() {
            state.result = Some(result);
            log.push(BattleEvent::BattleEnded { result });
        }
    }
    state.result
}

fn use_item<R: Rng + ?Sized>(state: &mut BattleState, side: SideId, slot: usize, rng: &mut R, log: &mut EventLog) {
    let Some(stack) = state.side_mut(side).inventory.get_mut(slot) else {
        return;
    };
    if stack.count == 0 {
        return;
    }
    stack.count -= 1;
    let template = Arc::clone(&stack.template);
    log.push(BattleEvent::ItemUsed {
        side,
        item: template.name.clone(),
    });
    effects::apply_all(&template.effects, &EffectContext::from_item(side), state, rng, log);
}

fn aims_at_opponent(mv: &MoveTemplate) -> bool {
    matches!(mv.target, MoveTarget::Opponent | MoveTarget::All)
}

/// Type effectiveness, with gravity grounding flying defenders against ground moves.
fn move_effectiveness(state: &BattleState, defender: SideId, move_type: Type) -> f32 {
    let types = &state.active(defender).types;
    if move_type == Type::Ground && state.field.gravity() {
        let grounded: Vec<Type> = types.iter().copied().filter(|t| *t != Type::Flying).collect();
        return effectiveness_against(move_type, &grounded);
    }
    effectiveness_against(move_type, types)
}

/// Checks everything that can stop `side` from acting. Returns the reason it could not.
fn check_can_act<R: Rng + ?Sized>(
    state: &mut BattleState,
    side: SideId,
    slot: usize,
    mv: &MoveTemplate,
    struggling: bool,
    rng: &mut R,
    log: &mut EventLog,
) -> Option<CannotAct> {
    let combatant = state.active(side);
    match combatant.status {
        PrimaryStatus::Sleep { .. } => return Some(CannotAct::Asleep),
        PrimaryStatus::Freeze => return Some(CannotAct::Frozen),
        _ => {}
    }
    if state.active_mut(side).volatiles.remove(VolatileKind::Flinch).is_some() {
        let specs = state.active(side).ability.hooks().on_flinch();
        effects::apply_ability_effects(state, side, specs, rng, log);
        return Some(CannotAct::Flinched);
    }
    if state.active(side).volatiles.has(VolatileKind::Confusion)
        && rng.gen_bool(state.config.confusion_self_hit_chance)
    {
        let combatant = state.active(side);
        let damage = calculate_damage(
            combatant.level,
            combatant.staged_stat(Stat::Atk),
            combatant.staged_stat(Stat::Def),
            CONFUSION_POWER,
            1.0,
            1.0,
            roll_random_percent(rng),
            1.0,
        );
        log.push(BattleEvent::CannotAct {
            side,
            name: combatant.name.clone(),
            reason: CannotAct::ConfusionSelfHit,
        });
        effects::damage_combatant(state, side, damage, DamageSource::Confusion, log);
        return Some(CannotAct::ConfusionSelfHit);
    }
    if state.active(side).status == PrimaryStatus::Paralysis && rng.gen_bool(state.config.full_paralysis_chance) {
        return Some(CannotAct::FullyParalyzed);
    }
    if struggling {
        return None;
    }
    let combatant = state.active(side);
    if combatant.volatiles.value(VolatileKind::Disabled) == Some(slot as u16) {
        return Some(CannotAct::Disabled);
    }
    if combatant.volatiles.has(VolatileKind::Taunt) && !mv.is_damaging() {
        return Some(CannotAct::Taunted);
    }
    None
}

fn use_move<R: Rng + ?Sized>(
    state: &mut BattleState,
    side: SideId,
    slot: usize,
    entrants: &TurnEntrants,
    rng: &mut R,
    log: &mut EventLog,
) {
    let target = side.opponent();
    let attacker = state.active(side);
    let name = attacker.name.clone();

    if state.active_mut(side).volatiles.remove(VolatileKind::Recharge).is_some() {
        log.push(BattleEvent::CannotAct {
            side,
            name,
            reason: CannotAct::Recharging,
        });
        return;
    }

    let attacker = state.active(side);
    let charging_slot = attacker.volatiles.value(VolatileKind::Charging).map(usize::from);
    let slot = charging_slot.unwrap_or(slot);
    let mv = chosen_move(attacker, side, slot);
    let struggling = Arc::ptr_eq(&mv, &STRUGGLE);
    let releasing = state.active_mut(side).volatiles.remove(VolatileKind::Charging).is_some();

    if let Some(reason) = check_can_act(state, side, slot, &mv, struggling, rng, log) {
        if reason != CannotAct::ConfusionSelfHit {
            log.push(BattleEvent::CannotAct { side, name, reason });
        }
        return;
    }

    let attacker = state.active_mut(side);
    if !struggling {
        if !releasing {
            if let Some(move_slot) = attacker.moves.get_mut(slot) {
                move_slot.pp = move_slot.pp.saturating_sub(1);
            }
        }
        attacker.last_move = Some(slot);
    }
    log.push(BattleEvent::MoveUsed {
        side,
        name: name.clone(),
        move_name: mv.name.clone(),
    });

    if mv.has_other(OtherEffect::Charge) && !releasing {
        state
            .active_mut(side)
            .volatiles
            .insert(VolatileKind::Charging, None, slot as u16);
        log.push(BattleEvent::Charging {
            side,
            name,
            move_name: mv.name.clone(),
        });
        return;
    }

    let offensive = aims_at_opponent(&mv);
    if offensive && state.active(target).is_fainted() {
        log.push(BattleEvent::NoTarget { side, name });
        return;
    }

    let mut move_type = mv.element;
    let mut power_modifier = 1.0;
    let attacker = state.active(side);
    if let Some(change) = attacker.ability.hooks().check_type_change(attacker, &mv) {
        move_type = change.move_type.unwrap_or(move_type);
        power_modifier = change.power_modifier;
        if let Some(types) = change.user_types {
            let ability = attacker.ability;
            log.push(BattleEvent::AbilityActivated {
                side,
                name: name.clone(),
                ability,
            });
            state.active_mut(side).types = types.clone();
            log.push(BattleEvent::TypeChanged {
                side,
                name: name.clone(),
                types,
            });
        }
    }

    if !offensive {
        effects::apply_all(&mv.effects, &EffectContext::from_move(side, 0, false), state, rng, log);
        return;
    }

    let defender = state.active(target);
    if defender.volatiles.has(VolatileKind::Protected) && !mv.flags.bypass_protect {
        log.push(BattleEvent::Protected {
            side: target,
            name: defender.name.clone(),
        });
        return;
    }

    let dispatcher = HookDispatcher::for_move(state.active(side), state.active(target));
    let effectiveness = if mv.is_damaging() {
        move_effectiveness(state, target, move_type)
    } else {
        1.0
    };
    let mut power = (mv.power as f32 * power_modifier).floor() as u16;
    if mv.has_other(OtherEffect::Pursuit) && entrants.replaced(state, target) {
        power = power.saturating_mul(2);
    }

    if !accuracy_check(state, side, &mv, move_type, power, effectiveness, &dispatcher, rng) {
        log.push(BattleEvent::Missed { side, name });
        return;
    }

    let absorb = {
        let ctx = MoveContext {
            attacker: state.active(side),
            defender: state.active(target),
            mv: &mv,
            move_type,
            power,
            effectiveness,
            critical: false,
            field: &state.field,
        };
        dispatcher.type_immunity(&ctx)
    };
    if effectiveness == 0.0 || absorb.is_some() {
        let defender = state.active(target);
        log.push(BattleEvent::Immune {
            side: target,
            name: defender.name.clone(),
        });
        if let Some(absorb) = absorb {
            effects::apply_ability_effects(state, target, absorb.effects, rng, log);
            if let Some(kind) = absorb.volatile {
                let defender = state.active_mut(target);
                if !defender.volatiles.has(kind) {
                    defender.volatiles.insert(kind, None, 0);
                    log.push(BattleEvent::VolatileStarted {
                        side: target,
                        name: defender.name.clone(),
                        kind,
                    });
                }
            }
        }
        return;
    }

    if !mv.is_damaging() {
        let ctx = EffectContext::from_move(side, 0, dispatcher.mold_breaker());
        effects::apply_all(&mv.effects, &ctx, state, rng, log);
        return;
    }

    let dealt = if let Some(category) = mv.counter_category() {
        match state.active(side).last_hit {
            Some(hit) if hit.category == category && hit.damage > 0 => {
                let amount = hit.damage.saturating_mul(2);
                land_hit(state, side, &mv, amount, &dispatcher, log).0
            }
            _ => {
                log.push(BattleEvent::MoveFailed { side, name });
                return;
            }
        }
    } else if mv.has_other(OtherEffect::Ohko) {
        let amount = state.active(target).hp;
        let (dealt, _) = land_hit(state, side, &mv, amount, &dispatcher, log);
        if state.active(target).hp == 0 {
            log.push(BattleEvent::OneHitKo {
                side: target,
                name: state.active(target).name.clone(),
            });
        }
        dealt
    } else if power == 0 {
        0
    } else {
        strike_sequence(state, side, &mv, move_type, power, effectiveness, &dispatcher, rng, log)
    };

    if mv.has_other(OtherEffect::Recharge) {
        state.active_mut(side).volatiles.insert(VolatileKind::Recharge, None, 0);
    }
    let ctx = EffectContext::from_move(side, dealt, dispatcher.mold_breaker());
    effects::apply_all(&mv.effects, &ctx, state, rng, log);
}

/// `accuracy × stage(acc − eva) × ability modifiers × gravity`, rolled on `1..=100`.
/// One-hit KO moves use `30 + level gap` and fail outright against higher levels.
#[allow(clippy::too_many_arguments)]
fn accuracy_check<R: Rng + ?Sized>(
    state: &BattleState,
    side: SideId,
    mv: &MoveTemplate,
    move_type: Type,
    power: u16,
    effectiveness: f32,
    dispatcher: &HookDispatcher,
    rng: &mut R,
) -> bool {
    let attacker = state.active(side);
    let defender = state.active(side.opponent());
    if mv.has_other(OtherEffect::Ohko) {
        if attacker.level < defender.level {
            return false;
        }
        let threshold = 30 + u32::from(attacker.level - defender.level);
        return rng.gen_range(1..=100u32) <= threshold;
    }
    let Some(accuracy) = mv.accuracy else {
        return true;
    };
    let ctx = MoveContext {
        attacker,
        defender,
        mv,
        move_type,
        power,
        effectiveness,
        critical: false,
        field: &state.field,
    };
    let stage = (attacker.stages.accuracy - defender.stages.evasion).clamp(-6, 6);
    let mut threshold = accuracy as f32 * accuracy_multiplier(stage) * dispatcher.accuracy_modifier(&ctx);
    if state.field.gravity() {
        threshold *= 5.0 / 3.0;
    }
    let roll = rng.gen_range(1..=100u32);
    tracing::trace!(roll, threshold, "accuracy roll");
    roll as f32 <= threshold
}

/// Every hit of a damaging move plus the hooks hits trigger. Returns total damage dealt.
#[allow(clippy::too_many_arguments)]
fn strike_sequence<R: Rng + ?Sized>(
    state: &mut BattleState,
    side: SideId,
    mv: &Arc<MoveTemplate>,
    move_type: Type,
    power: u16,
    effectiveness: f32,
    dispatcher: &HookDispatcher,
    rng: &mut R,
    log: &mut EventLog,
) -> u16 {
    let target = side.opponent();
    let context = |state: &BattleState, critical: bool| -> (u8, Vec<EffectSpec>) {
        let ctx = MoveContext {
            attacker: state.active(side),
            defender: state.active(target),
            mv,
            move_type,
            power,
            effectiveness,
            critical,
            field: &state.field,
        };
        (dispatcher.crit_stage_bonus(&ctx), dispatcher.contact_effects(&ctx))
    };
    let (bonus, _) = context(state, false);
    let crit_stage = bonus + u8::from(mv.has_other(OtherEffect::HighCrit));
    let hits = match mv.multi_hit() {
        Some((min, max)) => dispatcher
            .multi_hit(min, max)
            .unwrap_or_else(|| roll_hit_count(rng, min, max)),
        None => 1,
    };

    let mut total: u16 = 0;
    let mut landed: u8 = 0;
    for _ in 0..hits {
        if state.active(side).is_fainted() || state.active(target).is_fainted() {
            break;
        }
        let critical = roll_crit(rng, crit_stage);
        let random_percent = roll_random_percent(rng);
        let damage = {
            let strike = Strike {
                attacker: state.active(side),
                defender: state.active(target),
                mv,
                move_type,
                power,
                effectiveness,
                critical,
                random_percent,
            };
            strike_damage(
                &strike,
                dispatcher,
                &state.field,
                &state.side(target).conditions,
                &state.config,
            )
        };
        if critical {
            log.push(BattleEvent::CriticalHit {
                side: target,
                name: state.active(target).name.clone(),
            });
        }
        let (dealt, behind_substitute) = land_hit(state, side, mv, damage, dispatcher, log);
        total = total.saturating_add(dealt);
        landed += 1;
        if behind_substitute {
            continue;
        }
        if critical {
            effects::apply_ability_effects(state, target, dispatcher.crit_received_effects(), rng, log);
        }
        if mv.flags.contact {
            let (_, specs) = context(state, critical);
            effects::apply_ability_effects(state, target, specs, rng, log);
        }
    }

    let defender_name = state.active(target).name.clone();
    if effectiveness > 1.0 {
        log.push(BattleEvent::SuperEffective {
            side: target,
            name: defender_name,
        });
    } else if effectiveness < 1.0 {
        log.push(BattleEvent::NotVeryEffective {
            side: target,
            name: defender_name,
        });
    }
    if mv.multi_hit().is_some() {
        log.push(BattleEvent::HitCount { hits: landed });
    }

    if landed > 0 && !state.active(side).is_fainted() {
        let specs = {
            let ctx = MoveContext {
                attacker: state.active(side),
                defender: state.active(target),
                mv,
                move_type,
                power,
                effectiveness,
                critical: false,
                field: &state.field,
            };
            dispatcher.after_attacking_effects(&ctx)
        };
        effects::apply_ability_effects(state, side, specs, rng, log);
    }
    if state.active(target).hp == 0 {
        let (victim, attacker) = {
            let ctx = MoveContext {
                attacker: state.active(side),
                defender: state.active(target),
                mv,
                move_type,
                power,
                effectiveness,
                critical: false,
                field: &state.field,
            };
            dispatcher.ko_effects(&ctx)
        };
        effects::apply_ability_effects(state, target, victim, rng, log);
        effects::apply_ability_effects(state, side, attacker, rng, log);
    }
    total
}

/// Applies one hit's damage to the defender, routing it into a substitute when one stands
/// and the move is not sound-based. Returns (damage dealt, absorbed by substitute).
fn land_hit(
    state: &mut BattleState,
    side: SideId,
    mv: &MoveTemplate,
    amount: u16,
    dispatcher: &HookDispatcher,
    log: &mut EventLog,
) -> (u16, bool) {
    let target = side.opponent();
    let defender = state.active(target);
    if defender.volatiles.has(VolatileKind::Substitute) && !mv.flags.sound {
        return (effects::hit_substitute(state, target, amount, log), true);
    }
    let endures = dispatcher.defender_endures() && defender.is_full_hp() && amount >= defender.hp;
    let amount = if endures { defender.hp.saturating_sub(1) } else { amount };
    let lost = effects::damage_combatant(state, target, amount, DamageSource::Move, log);
    let defender = state.active_mut(target);
    if mv.category != MoveCategory::Status {
        defender.last_hit = Some(LastHit {
            category: mv.category,
            damage: lost,
        });
    }
    if endures {
        let ability = defender.ability;
        log.push(BattleEvent::Endured {
            side: target,
            name: defender.name.clone(),
            ability,
        });
    }
    (lost, false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BattleConfig;
    use crate::data::effects::{EffectKind, StatusKind, TargetSelector};
    use crate::sim::abilities::Ability;
    use crate::sim::combatant::test_support::{attack, make_combatant};
    use crate::sim::combatant::Combatant;
    use crate::sim::state::Side;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn duel(a: Combatant, b: Combatant) -> BattleState {
        BattleState::new(
            Side::new(SideId::A, "A", vec![a]).unwrap(),
            Side::new(SideId::B, "B", vec![b]).unwrap(),
            BattleConfig::default(),
        )
        .unwrap()
    }

    fn tackle() -> MoveTemplate {
        attack("tackle", Type::Normal, MoveCategory::Physical, 40)
    }

    #[test]
    fn switches_go_before_priority_moves() {
        let mut quick = tackle();
        quick.priority = 1;
        let a = make_combatant("A1", &[Type::Normal], vec![quick]);
        let mut state = duel(a.clone(), a.clone());
        state.side_mut(SideId::B).bench.push(a);
        let mut rng = SmallRng::seed_from_u64(1);
        let order = order_actions(
            &state,
            &[Action::fight(SideId::A, 0), Action::switch(SideId::B, 1)],
            &mut rng,
        );
        assert_eq!(order[0], Action::switch(SideId::B, 1));
    }

    #[test]
    fn faster_moves_first_and_trick_room_reverses() {
        let a = make_combatant("Fast", &[Type::Normal], vec![tackle()]);
        let b = make_combatant("Slow", &[Type::Normal], vec![tackle()]);
        let mut state = duel(a, b);
        state.active_mut(SideId::B).stats.spe = 50;
        let actions = [Action::fight(SideId::B, 0), Action::fight(SideId::A, 0)];
        let mut rng = SmallRng::seed_from_u64(1);
        assert_eq!(order_actions(&state, &actions, &mut rng)[0].side, SideId::A);
        state.field.trick_room_turns = 3;
        assert_eq!(order_actions(&state, &actions, &mut rng)[0].side, SideId::B);
    }

    #[test]
    fn speed_ties_follow_the_seed() {
        let a = make_combatant("Twin", &[Type::Normal], vec![tackle()]);
        let state = duel(a.clone(), a);
        let actions = [Action::fight(SideId::A, 0), Action::fight(SideId::B, 0)];
        let first = |seed| order_actions(&state, &actions, &mut SmallRng::seed_from_u64(seed))[0].side;
        assert_eq!(first(9), first(9));
        let winners: Vec<SideId> = (0..32).map(first).collect();
        assert!(winners.contains(&SideId::A) && winners.contains(&SideId::B));
    }

    #[test]
    fn paralysis_halves_ordering_speed() {
        let a = make_combatant("A", &[Type::Normal], vec![tackle()]);
        let mut state = duel(a.clone(), a);
        let before = effective_speed(&state, SideId::A);
        state.active_mut(SideId::A).status = PrimaryStatus::Paralysis;
        assert_eq!(effective_speed(&state, SideId::A), before / 2);
    }

    #[test]
    fn immune_target_takes_nothing_and_gets_no_effects() {
        let mut bolt = attack("thunderbolt", Type::Electric, MoveCategory::Special, 90);
        bolt.effects = vec![EffectSpec::new(
            TargetSelector::Opponent,
            EffectKind::StatusInflict {
                status: StatusKind::Paralysis,
            },
        )];
        let a = make_combatant("Pikachu", &[Type::Electric], vec![bolt]);
        let b = make_combatant("Diglett", &[Type::Ground], vec![tackle()]);
        let mut state = duel(a, b);
        let mut rng = SmallRng::seed_from_u64(3);
        let mut log = EventLog::new();
        let entrants = TurnEntrants::capture(&state);
        resolve_action(&mut state, &Action::fight(SideId::A, 0), &entrants, &mut rng, &mut log);
        let defender = state.active(SideId::B);
        assert!(defender.is_full_hp());
        assert!(defender.status.is_none());
        assert!(log.iter().any(|event| matches!(event, BattleEvent::Immune { .. })));
    }

    #[test]
    fn absorbing_ability_heals_instead() {
        let bolt = attack("thunderbolt", Type::Electric, MoveCategory::Special, 90);
        let a = make_combatant("Pikachu", &[Type::Electric], vec![bolt]);
        let mut b = make_combatant("Lanturn", &[Type::Water], vec![tackle()]);
        b.ability = Ability::VoltAbsorb;
        b.hp = 100;
        let mut state = duel(a, b);
        let mut rng = SmallRng::seed_from_u64(3);
        let mut log = EventLog::new();
        let entrants = TurnEntrants::capture(&state);
        resolve_action(&mut state, &Action::fight(SideId::A, 0), &entrants, &mut rng, &mut log);
        assert!(state.active(SideId::B).hp > 100);
    }

    #[test]
    fn sleeping_combatant_loses_its_move() {
        let a = make_combatant("A", &[Type::Normal], vec![tackle()]);
        let mut state = duel(a.clone(), a);
        state.active_mut(SideId::A).status = PrimaryStatus::Sleep { turns: 2 };
        let mut rng = SmallRng::seed_from_u64(3);
        let mut log = EventLog::new();
        let entrants = TurnEntrants::capture(&state);
        resolve_action(&mut state, &Action::fight(SideId::A, 0), &entrants, &mut rng, &mut log);
        assert!(state.active(SideId::B).is_full_hp());
        assert_eq!(state.active(SideId::A).moves[0].pp, state.active(SideId::A).moves[0].template.pp);
        assert!(matches!(
            log.events()[0],
            BattleEvent::CannotAct {
                reason: CannotAct::Asleep,
                ..
            }
        ));
    }

    #[test]
    fn protection_stops_the_hit() {
        let a = make_combatant("A", &[Type::Normal], vec![tackle()]);
        let mut state = duel(a.clone(), a);
        state.active_mut(SideId::B).volatiles.insert(VolatileKind::Protected, None, 0);
        let mut rng = SmallRng::seed_from_u64(3);
        let mut log = EventLog::new();
        let entrants = TurnEntrants::capture(&state);
        resolve_action(&mut state, &Action::fight(SideId::A, 0), &entrants, &mut rng, &mut log);
        assert!(state.active(SideId::B).is_full_hp());
        assert!(log.iter().any(|event| matches!(event, BattleEvent::Protected { .. })));
    }

    #[test]
    fn sturdy_holds_at_one_hp() {
        let mut nuke = attack("nuke", Type::Normal, MoveCategory::Physical, 250);
        nuke.accuracy = None;
        let a = make_combatant("A", &[Type::Normal], vec![nuke]);
        let mut b = make_combatant("B", &[Type::Normal], vec![tackle()]);
        b.ability = Ability::Sturdy;
        b.stats.def = 10;
        let mut state = duel(a, b);
        let mut rng = SmallRng::seed_from_u64(3);
        let mut log = EventLog::new();
        let entrants = TurnEntrants::capture(&state);
        resolve_action(&mut state, &Action::fight(SideId::A, 0), &entrants, &mut rng, &mut log);
        assert_eq!(state.active(SideId::B).hp, 1);
        assert!(log.iter().any(|event| matches!(event, BattleEvent::Endured { .. })));
    }

    #[test]
    fn knocked_out_combatant_forfeits_its_queued_move() {
        let mut nuke = attack("nuke", Type::Normal, MoveCategory::Physical, 250);
        nuke.accuracy = None;
        let a = make_combatant("A", &[Type::Normal], vec![nuke]);
        let b = make_combatant("B", &[Type::Normal], vec![tackle()]);
        let mut state = duel(a, b);
        state.active_mut(SideId::B).hp = 1;
        let mut rng = SmallRng::seed_from_u64(3);
        let mut log = EventLog::new();
        resolve_actions(
            &mut state,
            &[Action::fight(SideId::A, 0), Action::fight(SideId::B, 0)],
            &mut rng,
            &mut log,
        );
        assert!(state.active(SideId::B).fainted);
        assert!(state.active(SideId::A).is_full_hp());
        assert_eq!(state.result, Some(BattleResult::Winner(SideId::A)));
        assert!(!log
            .iter()
            .any(|event| matches!(event, BattleEvent::MoveUsed { side: SideId::B, .. })));
    }

    #[test]
    fn flee_hands_the_win_over() {
        let a = make_combatant("A", &[Type::Normal], vec![tackle()]);
        let mut state = duel(a.clone(), a);
        let mut rng = SmallRng::seed_from_u64(3);
        let mut log = EventLog::new();
        resolve_actions(&mut state, &[Action::flee(SideId::B)], &mut rng, &mut log);
        assert_eq!(state.result, Some(BattleResult::Winner(SideId::A)));
    }

    #[test]
    fn counter_returns_double_the_last_physical_hit() {
        let mut counter = attack("counter", Type::Fighting, MoveCategory::Physical, 0);
        counter.accuracy = None;
        counter.effects = vec![EffectSpec::new(
            TargetSelector::Opponent,
            EffectKind::Other(OtherEffect::Counter {
                category: MoveCategory::Physical,
            }),
        )];
        let a = make_combatant("A", &[Type::Normal], vec![counter]);
        let b = make_combatant("B", &[Type::Normal], vec![tackle()]);
        let mut state = duel(a, b);
        let mut rng = SmallRng::seed_from_u64(3);
        let mut log = EventLog::new();
        let entrants = TurnEntrants::capture(&state);
        resolve_action(&mut state, &Action::fight(SideId::A, 0), &entrants, &mut rng, &mut log);
        assert!(log.iter().any(|event| matches!(event, BattleEvent::MoveFailed { .. })));

        state.active_mut(SideId::A).last_hit = Some(LastHit {
            category: MoveCategory::Physical,
            damage: 20,
        });
        resolve_action(&mut state, &Action::fight(SideId::A, 0), &entrants, &mut rng, &mut log);
        let defender = state.active(SideId::B);
        assert_eq!(defender.max_hp() - defender.hp, 40);
    }

    #[test]
    fn two_turn_moves_charge_first() {
        let mut beam = attack("solar beam", Type::Grass, MoveCategory::Special, 120);
        beam.accuracy = None;
        beam.effects = vec![EffectSpec::new(TargetSelector::User, EffectKind::Other(OtherEffect::Charge))];
        let a = make_combatant("A", &[Type::Grass], vec![beam]);
        let b = make_combatant("B", &[Type::Water], vec![tackle()]);
        let mut state = duel(a, b);
        let mut rng = SmallRng::seed_from_u64(3);
        let mut log = EventLog::new();
        let entrants = TurnEntrants::capture(&state);
        resolve_action(&mut state, &Action::fight(SideId::A, 0), &entrants, &mut rng, &mut log);
        assert!(state.active(SideId::B).is_full_hp());
        assert!(state.active(SideId::A).volatiles.has(VolatileKind::Charging));
        resolve_action(&mut state, &Action::fight(SideId::A, 0), &entrants, &mut rng, &mut log);
        assert!(!state.active(SideId::B).is_full_hp());
        assert!(!state.active(SideId::A).volatiles.has(VolatileKind::Charging));
        assert_eq!(state.active(SideId::A).moves[0].pp, state.active(SideId::A).moves[0].template.pp - 1);
    }
}
