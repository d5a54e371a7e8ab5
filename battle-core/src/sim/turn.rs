//! Turn Orchestrator: `PreTurn -> ActionBrackets -> EndTurn -> FaintCheck`, then either
//! back to `AwaitingActions` or `Terminal`.
//!
//! [`execute_turn`] mutates the state in place. Validation runs before anything changes,
//! so an illegal submission leaves the state exactly as it was. Structural invariants are
//! checked after every phase.

use crate::data::effects::{EffectKind, EffectSpec, FieldCondition, StatusKind, TargetSelector, Terrain, Weather};
use crate::error::{BattleError, IllegalAction};
use crate::events::{BattleEvent, DamageSource, EventLog, SwitchReason};
use crate::sim::abilities::TurnContext;
use crate::sim::action::{validate_actions, Action};
use crate::sim::combatant::PrimaryStatus;
use crate::sim::effects::{self, EffectContext};
use crate::sim::field::{weather_type_immune, SideTimer};
use crate::sim::items::{HeldItemHooks, NoHeldItems};
use crate::sim::resolver::{order_actions, resolve_actions, settle_faints};
use crate::sim::state::{BattleResult, BattleState, SideId, TurnPhase};
use crate::sim::switching;
use crate::sim::volatile::VolatileKind;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// What one call to [`execute_turn`] produced.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TurnOutcome {
    pub events: EventLog,
    pub terminal: Option<BattleResult>,
    /// Sides that must answer with [`apply_forced_switch`] before the next turn.
    pub forced_switches: Vec<SideId>,
}

/// Sends in both leads, side A first. Only meaningful before the first turn.
pub fn begin_battle<R: Rng + ?Sized>(state: &mut BattleState, rng: &mut R) -> EventLog {
    let mut log = EventLog::new();
    if state.turn > 0 || state.is_terminal() {
        return log;
    }
    for side in SideId::BOTH {
        switching::send_in(state, side, SwitchReason::Lead, rng, &mut log);
    }
    settle_faints(state, &mut log);
    log
}

pub fn execute_turn<R: Rng + ?Sized>(
    state: &mut BattleState,
    actions: &[Action],
    rng: &mut R,
) -> Result<TurnOutcome, BattleError> {
    execute_turn_with_items(state, actions, &NoHeldItems, rng)
}

pub fn execute_turn_with_items<R: Rng + ?Sized>(
    state: &mut BattleState,
    actions: &[Action],
    items: &dyn HeldItemHooks,
    rng: &mut R,
) -> Result<TurnOutcome, BattleError> {
    state.check_invariants()?;
    validate_actions(state, actions)?;
    let mut log = EventLog::new();

    enter(state, TurnPhase::PreTurn);
    pre_turn(state, rng, &mut log);
    settle_faints(state, &mut log);
    state.check_invariants()?;

    if !state.is_terminal() {
        enter(state, TurnPhase::ActionBrackets);
        let ordered = order_actions(state, actions, rng);
        resolve_actions(state, &ordered, rng, &mut log);
        state.check_invariants()?;
    }

    if !state.is_terminal() {
        enter(state, TurnPhase::EndTurn);
        end_turn(state, items, rng, &mut log);
        state.check_invariants()?;
    }

    enter(state, TurnPhase::FaintCheck);
    let terminal = settle_faints(state, &mut log);
    let forced_switches = state.pending_forced_switches();
    for side in &forced_switches {
        log.push(BattleEvent::ForcedSwitchRequired { side: *side });
    }
    state.check_invariants()?;

    enter(
        state,
        if terminal.is_some() {
            TurnPhase::Terminal
        } else {
            TurnPhase::AwaitingActions
        },
    );
    tracing::debug!(turn = state.turn, events = log.len(), ?terminal, "turn finished");
    Ok(TurnOutcome {
        events: log,
        terminal,
        forced_switches,
    })
}

/// Answers a forced-switch request: sends `bench` in for `side`'s fainted active.
pub fn apply_forced_switch<R: Rng + ?Sized>(
    state: &mut BattleState,
    side: SideId,
    bench: usize,
    rng: &mut R,
) -> Result<EventLog, BattleError> {
    if state.is_terminal() {
        return Err(IllegalAction::BattleOver.into());
    }
    if !state.pending_forced_switches().contains(&side) {
        return Err(IllegalAction::NoForcedSwitchPending(side).into());
    }
    let roster = state.side(side);
    let Some(member) = roster.bench.get(bench) else {
        return Err(IllegalAction::NoSuchBenchMember { side, bench }.into());
    };
    if bench == roster.active {
        return Err(IllegalAction::SwitchTargetActive { side, bench }.into());
    }
    if member.is_fainted() {
        return Err(IllegalAction::SwitchTargetFainted { side, bench }.into());
    }

    let mut log = EventLog::new();
    switching::perform_switch(state, side, bench, SwitchReason::Forced, rng, &mut log);
    if settle_faints(state, &mut log).is_some() {
        state.phase = TurnPhase::Terminal;
    }
    state.check_invariants()?;
    Ok(log)
}

fn enter(state: &mut BattleState, phase: TurnPhase) {
    tracing::trace!(turn = state.turn, ?phase, "phase");
    state.phase = phase;
}

fn pre_turn<R: Rng + ?Sized>(state: &mut BattleState, rng: &mut R, log: &mut EventLog) {
    state.turn += 1;
    log.push(BattleEvent::TurnStarted { turn: state.turn });
    for side in SideId::BOTH {
        let combatant = state.active_mut(side);
        combatant.volatiles.remove(VolatileKind::Flinch);
        combatant.volatiles.remove(VolatileKind::Protected);
        combatant.last_hit = None;
    }

    if let Some(weather @ (Weather::Sandstorm | Weather::Hail)) = state.field.weather() {
        for side in SideId::BOTH {
            let combatant = state.active(side);
            let hooks = combatant.ability.hooks();
            if combatant.is_fainted()
                || weather_type_immune(weather, combatant)
                || hooks.check_weather_immunity(weather)
                || hooks.blocks_indirect_damage()
            {
                continue;
            }
            let amount = combatant.fraction_of_max(1, 16);
            effects::damage_combatant(state, side, amount, DamageSource::Weather { weather }, log);
        }
    }

    for side in SideId::BOTH {
        let specs = {
            let holder = state.active(side);
            if holder.is_fainted() {
                continue;
            }
            let ctx = TurnContext {
                holder,
                opponent: state.active(side.opponent()),
                field: &state.field,
            };
            holder.ability.hooks().on_start_of_turn(&ctx)
        };
        effects::apply_ability_effects(state, side, specs, rng, log);
    }

    let thaw_chance = state.config.freeze_thaw_chance;
    for side in SideId::BOTH {
        let combatant = state.active_mut(side);
        if combatant.is_fainted() {
            continue;
        }
        match combatant.status {
            PrimaryStatus::Sleep { turns: 0 } => {
                combatant.clear_status();
                log.push(BattleEvent::Woke {
                    side,
                    name: combatant.name.clone(),
                });
            }
            PrimaryStatus::Sleep { turns } => {
                combatant.status = PrimaryStatus::Sleep { turns: turns - 1 };
            }
            PrimaryStatus::Freeze if rng.gen_bool(thaw_chance) => {
                combatant.clear_status();
                log.push(BattleEvent::Thawed {
                    side,
                    name: combatant.name.clone(),
                });
            }
            _ => {}
        }
    }
}

fn end_turn<R: Rng + ?Sized>(state: &mut BattleState, items: &dyn HeldItemHooks, rng: &mut R, log: &mut EventLog) {
    for side in SideId::BOTH {
        let (ability_specs, item_specs) = {
            let holder = state.active(side);
            if holder.is_fainted() {
                continue;
            }
            let ctx = TurnContext {
                holder,
                opponent: state.active(side.opponent()),
                field: &state.field,
            };
            (holder.ability.hooks().on_end_of_turn(&ctx), items.on_end_of_turn(&ctx))
        };
        effects::apply_ability_effects(state, side, ability_specs, rng, log);
        effects::apply_all(&item_specs, &EffectContext::from_item(side), state, rng, log);
    }

    for side in SideId::BOTH {
        apply_residuals(state, side, log);
    }

    for side in SideId::BOTH {
        tick_volatiles(state, side, rng, log);
    }

    tick_field(state, log);
}

/// Status damage, leech seed, binding and passive healing, in that order.
fn apply_residuals(state: &mut BattleState, side: SideId, log: &mut EventLog) {
    let gravity = state.field.gravity();
    let grassy = state.field.terrain() == Some(Terrain::Grassy);
    let combatant = state.active(side);
    if combatant.is_fainted() {
        return;
    }
    let hooks = combatant.ability.hooks();
    let guarded = hooks.blocks_indirect_damage();

    match combatant.status {
        PrimaryStatus::Burn if !guarded => {
            let amount = combatant.fraction_of_max(1, 16);
            let source = DamageSource::Status {
                status: StatusKind::Burn,
            };
            effects::damage_combatant(state, side, amount, source, log);
        }
        PrimaryStatus::Poison | PrimaryStatus::BadlyPoisoned { .. } if hooks.heals_from_poison() => {
            let amount = combatant.fraction_of_max(1, 8);
            if !combatant.is_full_hp() {
                log.push(BattleEvent::AbilityActivated {
                    side,
                    name: combatant.name.clone(),
                    ability: combatant.ability,
                });
            }
            effects::heal_combatant(state, side, amount, log);
        }
        PrimaryStatus::Poison if !guarded => {
            let amount = combatant.fraction_of_max(1, 8);
            let source = DamageSource::Status {
                status: StatusKind::Poison,
            };
            effects::damage_combatant(state, side, amount, source, log);
        }
        PrimaryStatus::BadlyPoisoned { counter } if !guarded => {
            let amount = combatant.fraction_of_max(u16::from(counter), 16);
            state.active_mut(side).status = PrimaryStatus::BadlyPoisoned {
                counter: counter.saturating_add(1).min(15),
            };
            let source = DamageSource::Status {
                status: StatusKind::BadlyPoisoned,
            };
            effects::damage_combatant(state, side, amount, source, log);
        }
        _ => {}
    }

    let combatant = state.active(side);
    if let Some(seeder) = combatant.volatiles.value(VolatileKind::Seeded) {
        if !guarded && !combatant.is_fainted() {
            let amount = combatant.fraction_of_max(1, 8);
            let drained = effects::damage_combatant(state, side, amount, DamageSource::Seed, log);
            if let Some(seeder) = SideId::from_index(seeder as usize) {
                effects::heal_combatant(state, seeder, drained, log);
            }
        }
    }

    let combatant = state.active(side);
    if combatant.volatiles.has(VolatileKind::PartiallyTrapped) && !guarded && !combatant.is_fainted() {
        let amount = combatant.fraction_of_max(1, 8);
        effects::damage_combatant(state, side, amount, DamageSource::Trap, log);
    }

    let combatant = state.active(side);
    if combatant.is_fainted() {
        return;
    }
    let mut heal = 0u16;
    for kind in [VolatileKind::AquaRing, VolatileKind::Rooted] {
        if combatant.volatiles.has(kind) {
            heal = heal.saturating_add(combatant.fraction_of_max(1, 16));
        }
    }
    if grassy && combatant.is_grounded(gravity) {
        heal = heal.saturating_add(combatant.fraction_of_max(1, 16));
    }
    if heal > 0 {
        effects::heal_combatant(state, side, heal, log);
    }
}

/// Counts down volatiles. A drowsy combatant whose counter runs out falls asleep.
fn tick_volatiles<R: Rng + ?Sized>(state: &mut BattleState, side: SideId, rng: &mut R, log: &mut EventLog) {
    let combatant = state.active_mut(side);
    if combatant.is_fainted() {
        return;
    }
    let expired = combatant.volatiles.tick();
    let name = combatant.name.clone();
    for kind in expired {
        log.push(BattleEvent::VolatileEnded {
            side,
            name: name.clone(),
            kind,
        });
        if kind == VolatileKind::Yawn {
            let spec = EffectSpec::new(
                TargetSelector::User,
                EffectKind::StatusInflict {
                    status: StatusKind::Sleep,
                },
            );
            effects::apply_spec(&spec, &EffectContext::residual(side), state, rng, log);
        }
    }
}

fn terrain_condition(terrain: Terrain) -> FieldCondition {
    match terrain {
        Terrain::Electric => FieldCondition::ElectricTerrain,
        Terrain::Grassy => FieldCondition::GrassyTerrain,
        Terrain::Misty => FieldCondition::MistyTerrain,
        Terrain::Psychic => FieldCondition::PsychicTerrain,
    }
}

/// Decrements a running counter and reports whether it just reached zero.
fn count_down(turns: &mut u8) -> bool {
    if *turns == 0 {
        return false;
    }
    *turns -= 1;
    *turns == 0
}

/// Weather, terrain, gravity and trick room, then each side's screens and tailwind.
/// A condition set with zero turns lasts until replaced.
fn tick_field(state: &mut BattleState, log: &mut EventLog) {
    if let Some(weather) = state.field.weather.as_mut() {
        if count_down(&mut weather.turns) {
            let kind = weather.kind;
            state.field.weather = None;
            log.push(BattleEvent::WeatherEnded { weather: kind });
        }
    }
    if let Some(terrain) = state.field.terrain.as_mut() {
        if count_down(&mut terrain.turns) {
            let condition = terrain_condition(terrain.kind);
            state.field.terrain = None;
            log.push(BattleEvent::FieldEnded { condition, side: None });
        }
    }
    if count_down(&mut state.field.gravity_turns) {
        log.push(BattleEvent::FieldEnded {
            condition: FieldCondition::Gravity,
            side: None,
        });
    }
    if count_down(&mut state.field.trick_room_turns) {
        log.push(BattleEvent::FieldEnded {
            condition: FieldCondition::TrickRoom,
            side: None,
        });
    }
    for side in SideId::BOTH {
        for timer in state.side_mut(side).conditions.tick() {
            let condition = match timer {
                SideTimer::Reflect => FieldCondition::Reflect,
                SideTimer::LightScreen => FieldCondition::LightScreen,
                SideTimer::Tailwind => FieldCondition::Tailwind,
            };
            log.push(BattleEvent::FieldEnded {
                condition,
                side: Some(side),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BattleConfig;
    use crate::data::effects::OtherEffect;
    use crate::data::moves::{MoveCategory, MoveTarget, MoveTemplate};
    use crate::data::types::Type;
    use crate::sim::combatant::test_support::{attack, make_combatant};
    use crate::sim::combatant::Combatant;
    use crate::sim::field::WeatherState;
    use crate::sim::state::Side;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn tackle() -> MoveTemplate {
        attack("tackle", Type::Normal, MoveCategory::Physical, 40)
    }

    fn duel(a: Vec<Combatant>, b: Vec<Combatant>) -> BattleState {
        BattleState::new(
            Side::new(SideId::A, "A", a).unwrap(),
            Side::new(SideId::B, "B", b).unwrap(),
            BattleConfig::default(),
        )
        .unwrap()
    }

    fn both_fight() -> [Action; 2] {
        [Action::fight(SideId::A, 0), Action::fight(SideId::B, 0)]
    }

    fn protect() -> MoveTemplate {
        let mut mv = attack("protect", Type::Normal, MoveCategory::Status, 0);
        mv.accuracy = None;
        mv.priority = 4;
        mv.target = MoveTarget::User;
        mv.effects = vec![EffectSpec::new(TargetSelector::User, EffectKind::Other(OtherEffect::Protect))];
        mv
    }

    /// B knows protect in slot 0 and tackle in slot 1.
    fn protect_duel(divisor: u32) -> BattleState {
        let a = make_combatant("A", &[Type::Normal], vec![tackle()]);
        let b = make_combatant("B", &[Type::Normal], vec![protect(), tackle()]);
        let mut state = duel(vec![a], vec![b]);
        state.config.protect_decay_divisor = divisor;
        state
    }

    fn streak(state: &BattleState) -> Option<u16> {
        state.active(SideId::B).volatiles.value(VolatileKind::ProtectionStreak)
    }

    #[test]
    fn illegal_submission_leaves_state_untouched() {
        let a = make_combatant("A", &[Type::Normal], vec![tackle()]);
        let mut state = duel(vec![a.clone()], vec![a]);
        let before = state.clone();
        let mut rng = SmallRng::seed_from_u64(1);
        let err = execute_turn(&mut state, &[Action::fight(SideId::A, 0)], &mut rng).unwrap_err();
        assert_eq!(err, BattleError::IllegalAction(IllegalAction::MissingAction(SideId::B)));
        let err = execute_turn(
            &mut state,
            &[Action::fight(SideId::A, 3), Action::fight(SideId::B, 0)],
            &mut rng,
        )
        .unwrap_err();
        assert!(matches!(err, BattleError::IllegalAction(IllegalAction::NoSuchMove { .. })));
        assert_eq!(state, before);
    }

    #[test]
    fn a_turn_returns_to_awaiting_actions() {
        let a = make_combatant("A", &[Type::Normal], vec![tackle()]);
        let mut state = duel(vec![a.clone()], vec![a]);
        let mut rng = SmallRng::seed_from_u64(1);
        let outcome = execute_turn(&mut state, &both_fight(), &mut rng).unwrap();
        assert_eq!(state.turn, 1);
        assert_eq!(state.phase, TurnPhase::AwaitingActions);
        assert!(outcome.terminal.is_none());
        assert_eq!(outcome.events.events()[0], BattleEvent::TurnStarted { turn: 1 });
    }

    #[test]
    fn same_seed_same_battle() {
        let a = make_combatant("A", &[Type::Normal], vec![tackle()]);
        let b = make_combatant("B", &[Type::Fighting], vec![tackle()]);
        let run = |seed| {
            let mut state = duel(vec![a.clone()], vec![b.clone()]);
            let mut rng = SmallRng::seed_from_u64(seed);
            let mut events = Vec::new();
            while !state.is_terminal() && state.turn < 50 {
                let outcome = execute_turn(&mut state, &both_fight(), &mut rng).unwrap();
                events.extend(outcome.events);
            }
            (events, state)
        };
        assert_eq!(run(77), run(77));
    }

    #[test]
    fn sandstorm_chips_non_rock_types() {
        let a = make_combatant("A", &[Type::Normal], vec![tackle()]);
        let b = make_combatant("B", &[Type::Rock], vec![tackle()]);
        let mut state = duel(vec![a], vec![b]);
        state.field.weather = Some(WeatherState {
            kind: Weather::Sandstorm,
            turns: 5,
        });
        let mut rng = SmallRng::seed_from_u64(1);
        let mut log = EventLog::new();
        pre_turn(&mut state, &mut rng, &mut log);
        let a = state.active(SideId::A);
        assert_eq!(a.max_hp() - a.hp, a.max_hp() / 16);
        assert!(state.active(SideId::B).is_full_hp());
    }

    #[test]
    fn toxic_counter_grows_each_turn() {
        let a = make_combatant("A", &[Type::Normal], vec![tackle()]);
        let mut state = duel(vec![a.clone()], vec![a]);
        state.active_mut(SideId::A).status = PrimaryStatus::BadlyPoisoned { counter: 1 };
        let mut log = EventLog::new();
        apply_residuals(&mut state, SideId::A, &mut log);
        apply_residuals(&mut state, SideId::A, &mut log);
        let a = state.active(SideId::A);
        assert_eq!(a.max_hp() - a.hp, a.max_hp() / 16 + a.max_hp() * 2 / 16);
        assert_eq!(a.status, PrimaryStatus::BadlyPoisoned { counter: 3 });
    }

    #[test]
    fn leech_seed_feeds_the_seeder() {
        let a = make_combatant("A", &[Type::Normal], vec![tackle()]);
        let mut state = duel(vec![a.clone()], vec![a]);
        state.active_mut(SideId::A).hp = 100;
        state
            .active_mut(SideId::B)
            .volatiles
            .insert(VolatileKind::Seeded, None, SideId::A.index() as u16);
        let mut log = EventLog::new();
        apply_residuals(&mut state, SideId::B, &mut log);
        let drained = state.active(SideId::B).max_hp() - state.active(SideId::B).hp;
        assert_eq!(drained, state.active(SideId::B).max_hp() / 8);
        assert_eq!(state.active(SideId::A).hp, 100 + drained);
    }

    #[test]
    fn yawn_puts_the_target_to_sleep_when_it_expires() {
        let a = make_combatant("A", &[Type::Normal], vec![tackle()]);
        let mut state = duel(vec![a.clone()], vec![a]);
        state.active_mut(SideId::A).volatiles.insert(VolatileKind::Yawn, Some(2), 0);
        let mut rng = SmallRng::seed_from_u64(1);
        let mut log = EventLog::new();
        tick_volatiles(&mut state, SideId::A, &mut rng, &mut log);
        assert!(state.active(SideId::A).status.is_none());
        tick_volatiles(&mut state, SideId::A, &mut rng, &mut log);
        assert!(matches!(state.active(SideId::A).status, PrimaryStatus::Sleep { .. }));
    }

    #[test]
    fn field_counters_end_exactly_at_zero() {
        let a = make_combatant("A", &[Type::Normal], vec![tackle()]);
        let mut state = duel(vec![a.clone()], vec![a]);
        state.field.weather = Some(WeatherState {
            kind: Weather::Rain,
            turns: 2,
        });
        state.side_mut(SideId::B).conditions.reflect_turns = 1;
        let mut log = EventLog::new();
        tick_field(&mut state, &mut log);
        assert_eq!(state.field.weather(), Some(Weather::Rain));
        assert_eq!(state.side(SideId::B).conditions.reflect_turns, 0);
        tick_field(&mut state, &mut log);
        assert_eq!(state.field.weather(), None);
        assert!(log
            .iter()
            .any(|event| *event == BattleEvent::WeatherEnded { weather: Weather::Rain }));
    }

    #[test]
    fn fainted_active_raises_a_forced_switch() {
        let mut nuke = attack("nuke", Type::Normal, MoveCategory::Physical, 250);
        nuke.accuracy = None;
        nuke.priority = 1;
        let a = make_combatant("A", &[Type::Normal], vec![nuke]);
        let b = make_combatant("B", &[Type::Normal], vec![tackle()]);
        let reserve = make_combatant("Reserve", &[Type::Normal], vec![tackle()]);
        let mut state = duel(vec![a], vec![b, reserve]);
        state.active_mut(SideId::B).hp = 1;
        let mut rng = SmallRng::seed_from_u64(1);
        let outcome = execute_turn(&mut state, &both_fight(), &mut rng).unwrap();
        assert_eq!(outcome.forced_switches, vec![SideId::B]);
        assert!(outcome.terminal.is_none());

        let err = execute_turn(&mut state, &both_fight(), &mut rng).unwrap_err();
        assert_eq!(err, BattleError::IllegalAction(IllegalAction::PendingForcedSwitch(SideId::B)));
        let err = apply_forced_switch(&mut state, SideId::A, 0, &mut rng).unwrap_err();
        assert_eq!(err, BattleError::IllegalAction(IllegalAction::NoForcedSwitchPending(SideId::A)));

        let log = apply_forced_switch(&mut state, SideId::B, 1, &mut rng).unwrap();
        assert!(matches!(
            log.events()[0],
            BattleEvent::SwitchedIn {
                reason: SwitchReason::Forced,
                ..
            }
        ));
        assert_eq!(state.active(SideId::B).name, "Reserve");
        assert!(execute_turn(&mut state, &both_fight(), &mut rng).is_ok());
    }

    #[test]
    fn last_faint_ends_the_battle() {
        let mut nuke = attack("nuke", Type::Normal, MoveCategory::Physical, 250);
        nuke.accuracy = None;
        nuke.priority = 1;
        let a = make_combatant("A", &[Type::Normal], vec![nuke]);
        let b = make_combatant("B", &[Type::Normal], vec![tackle()]);
        let mut state = duel(vec![a], vec![b]);
        state.active_mut(SideId::B).hp = 1;
        let mut rng = SmallRng::seed_from_u64(1);
        let outcome = execute_turn(&mut state, &both_fight(), &mut rng).unwrap();
        assert_eq!(outcome.terminal, Some(BattleResult::Winner(SideId::A)));
        assert_eq!(state.phase, TurnPhase::Terminal);
        let err = execute_turn(&mut state, &both_fight(), &mut rng).unwrap_err();
        assert_eq!(err, BattleError::IllegalAction(IllegalAction::BattleOver));
    }

    struct Leftovers;

    impl HeldItemHooks for Leftovers {
        fn on_end_of_turn(&self, _ctx: &TurnContext) -> Vec<EffectSpec> {
            vec![EffectSpec::new(
                TargetSelector::User,
                EffectKind::Heal {
                    mode: crate::data::effects::HealMode::Fraction { num: 1, den: 16 },
                },
            )]
        }
    }

    #[test]
    fn held_item_hooks_run_at_end_of_turn() {
        let mut growl = attack("growl", Type::Normal, MoveCategory::Status, 0);
        growl.accuracy = None;
        let a = make_combatant("A", &[Type::Normal], vec![growl]);
        let mut state = duel(vec![a.clone()], vec![a]);
        state.active_mut(SideId::A).hp = 100;
        let mut rng = SmallRng::seed_from_u64(1);
        execute_turn_with_items(&mut state, &both_fight(), &Leftovers, &mut rng).unwrap();
        let a = state.active(SideId::A);
        assert_eq!(a.hp, 100 + a.max_hp() / 16);
    }

    #[test]
    fn corrupt_state_is_rejected_before_the_turn_runs() {
        let a = make_combatant("A", &[Type::Normal], vec![tackle()]);
        let mut state = duel(vec![a.clone()], vec![a]);
        state.side_mut(SideId::A).active = 9;
        let before = state.clone();
        let mut rng = SmallRng::seed_from_u64(1);
        let err = execute_turn(&mut state, &both_fight(), &mut rng).unwrap_err();
        assert!(matches!(err, BattleError::InvariantViolation { .. }));
        assert_eq!(state, before);
    }

    #[test]
    fn consecutive_protection_decays() {
        let mut state = protect_duel(1_000_000);
        let mut rng = SmallRng::seed_from_u64(5);
        let first = execute_turn(&mut state, &both_fight(), &mut rng).unwrap();
        assert!(first.events.iter().any(|event| matches!(event, BattleEvent::Protected { .. })));
        assert_eq!(streak(&state), Some(1));
        assert!(state.active(SideId::A).is_full_hp() && state.active(SideId::B).is_full_hp());

        let second = execute_turn(&mut state, &both_fight(), &mut rng).unwrap();
        assert!(second
            .events
            .iter()
            .any(|event| matches!(event, BattleEvent::MoveFailed { side: SideId::B, .. })));
        assert!(!second.events.iter().any(|event| matches!(event, BattleEvent::Protected { .. })));
        assert!(!state.active(SideId::B).is_full_hp());
        assert_eq!(streak(&state), None);
    }

    #[test]
    fn attacking_resets_the_protection_streak() {
        let mut state = protect_duel(1_000_000);
        let mut rng = SmallRng::seed_from_u64(5);
        execute_turn(&mut state, &both_fight(), &mut rng).unwrap();
        assert_eq!(streak(&state), Some(1));

        execute_turn(&mut state, &[Action::fight(SideId::A, 0), Action::fight(SideId::B, 1)], &mut rng).unwrap();
        assert_eq!(streak(&state), None);

        let outcome = execute_turn(&mut state, &both_fight(), &mut rng).unwrap();
        assert!(outcome.events.iter().any(|event| matches!(event, BattleEvent::Protected { .. })));
        assert_eq!(streak(&state), Some(1));
    }

    #[test]
    fn protection_streak_resets_after_a_turn_asleep() {
        let mut state = protect_duel(1_000_000);
        let mut rng = SmallRng::seed_from_u64(5);
        execute_turn(&mut state, &both_fight(), &mut rng).unwrap();
        assert_eq!(streak(&state), Some(1));

        state.active_mut(SideId::B).status = PrimaryStatus::Sleep { turns: 3 };
        let asleep = execute_turn(&mut state, &both_fight(), &mut rng).unwrap();
        assert!(!asleep.events.iter().any(|event| matches!(event, BattleEvent::MoveUsed { side: SideId::B, .. })));
        assert_eq!(streak(&state), None);

        state.active_mut(SideId::B).clear_status();
        let outcome = execute_turn(&mut state, &both_fight(), &mut rng).unwrap();
        assert!(outcome.events.iter().any(|event| matches!(event, BattleEvent::Protected { .. })));
        assert!(state.active(SideId::B).volatiles.has(VolatileKind::Protected));
    }
}
