use crate::data::effects::{EffectKind, EffectSpec, FieldCondition, StatusKind, TargetSelector};
use crate::data::types::{effectiveness_against, Type};
use crate::events::{BattleEvent, DamageSource, EventLog, SwitchReason};
use crate::sim::abilities::TurnContext;
use crate::sim::effects::{self, EffectContext};
use crate::sim::state::{BattleState, Side, SideId};
use crate::sim::volatile::VolatileKind;
use rand::seq::SliceRandom;
use rand::Rng;

/// Whether `side`'s active may leave the field by its own choice.
pub fn can_switch(state: &BattleState, side: SideId) -> bool {
    let active = state.active(side);
    if active.is_fainted() {
        return true;
    }
    if active.is_trapped() {
        return false;
    }
    let opponent = state.active(side.opponent());
    if opponent.is_fainted() {
        return true;
    }
    !opponent.ability.hooks().check_trapping(opponent, active, &state.field)
}

pub fn pick_random_switch<R: Rng + ?Sized>(side: &Side, rng: &mut R) -> Option<usize> {
    side.switch_candidates().choose(rng).copied()
}

/// Swaps `side`'s active for bench slot `bench`: switch-out hooks and reset for the
/// leaving combatant, then hazards and switch-in hooks for the entering one.
pub fn perform_switch<R: Rng + ?Sized>(
    state: &mut BattleState,
    side: SideId,
    bench: usize,
    reason: SwitchReason,
    rng: &mut R,
    log: &mut EventLog,
) {
    let leaving = state.active(side);
    if !leaving.is_fainted() && reason != SwitchReason::Lead {
        let specs = leaving.ability.hooks().on_switch_out(leaving);
        effects::apply_ability_effects(state, side, specs, rng, log);
        let leaving = state.active(side);
        log.push(BattleEvent::SwitchedOut {
            side,
            name: leaving.name.clone(),
        });
        release_opponent(state, side, log);
    }
    state.active_mut(side).reset_on_switch_out();
    state.side_mut(side).active = bench;
    tracing::debug!(%side, bench, ?reason, "switched in");
    send_in(state, side, reason, rng, log);
}

/// Runs the entry sequence for `side`'s current active.
pub(crate) fn send_in<R: Rng + ?Sized>(
    state: &mut BattleState,
    side: SideId,
    reason: SwitchReason,
    rng: &mut R,
    log: &mut EventLog,
) {
    let entering = state.active(side);
    log.push(BattleEvent::SwitchedIn {
        side,
        name: entering.name.clone(),
        hp: entering.hp,
        max_hp: entering.max_hp(),
        reason,
    });
    apply_hazards(state, side, rng, log);
    run_switch_in_hooks(state, side, rng, log);
}

pub(crate) fn run_switch_in_hooks<R: Rng + ?Sized>(
    state: &mut BattleState,
    side: SideId,
    rng: &mut R,
    log: &mut EventLog,
) {
    let holder = state.active(side);
    if holder.is_fainted() {
        return;
    }
    let ctx = TurnContext {
        holder,
        opponent: state.active(side.opponent()),
        field: &state.field,
    };
    let specs = holder.ability.hooks().on_switch_in(&ctx);
    effects::apply_ability_effects(state, side, specs, rng, log);
}

/// Trapping effects the leaving combatant placed on its opponent end with it.
fn release_opponent(state: &mut BattleState, side: SideId, log: &mut EventLog) {
    let opponent_side = side.opponent();
    let opponent = state.active_mut(opponent_side);
    for kind in [VolatileKind::Trapped, VolatileKind::PartiallyTrapped] {
        if opponent.volatiles.remove(kind).is_some() {
            log.push(BattleEvent::VolatileEnded {
                side: opponent_side,
                name: opponent.name.clone(),
                kind,
            });
        }
    }
}

fn apply_hazards<R: Rng + ?Sized>(state: &mut BattleState, side: SideId, rng: &mut R, log: &mut EventLog) {
    let conditions = state.side(side).conditions.clone();
    if !conditions.has_hazards() {
        return;
    }
    let gravity = state.field.gravity();
    let entering = state.active(side);
    let grounded = entering.is_grounded(gravity);
    let guarded = entering.ability.hooks().blocks_indirect_damage();

    if conditions.stealth_rock && !guarded {
        let eff = effectiveness_against(Type::Rock, &entering.types);
        let amount = ((entering.max_hp() as f32 * eff / 8.0) as u16).max(1);
        let source = DamageSource::Hazard {
            condition: FieldCondition::StealthRock,
        };
        effects::damage_combatant(state, side, amount, source, log);
    }
    if grounded && conditions.spikes > 0 && !guarded {
        let den = match conditions.spikes {
            1 => 8,
            2 => 6,
            _ => 4,
        };
        let amount = state.active(side).fraction_of_max(1, den);
        let source = DamageSource::Hazard {
            condition: FieldCondition::Spikes,
        };
        effects::damage_combatant(state, side, amount, source, log);
    }
    if grounded && conditions.toxic_spikes > 0 && !state.active(side).is_fainted() {
        if state.active(side).has_type(Type::Poison) {
            state.side_mut(side).conditions.toxic_spikes = 0;
            log.push(BattleEvent::FieldEnded {
                condition: FieldCondition::ToxicSpikes,
                side: Some(side),
            });
            return;
        }
        let status = if conditions.toxic_spikes >= 2 {
            StatusKind::BadlyPoisoned
        } else {
            StatusKind::Poison
        };
        let spec = EffectSpec::new(TargetSelector::User, EffectKind::StatusInflict { status });
        effects::apply_spec(&spec, &EffectContext::residual(side), state, rng, log);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BattleConfig;
    use crate::data::moves::MoveCategory;
    use crate::sim::abilities::Ability;
    use crate::sim::combatant::test_support::{attack, make_combatant};
    use crate::sim::combatant::PrimaryStatus;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn two_on_one(bench_types: &[Type]) -> BattleState {
        let tackle = attack("tackle", Type::Normal, MoveCategory::Physical, 40);
        let lead = make_combatant("Lead", &[Type::Normal], vec![tackle.clone()]);
        let reserve = make_combatant("Reserve", bench_types, vec![tackle.clone()]);
        let foe = make_combatant("Foe", &[Type::Normal], vec![tackle]);
        BattleState::new(
            Side::new(SideId::A, "A", vec![lead, reserve]).unwrap(),
            Side::new(SideId::B, "B", vec![foe]).unwrap(),
            BattleConfig::default(),
        )
        .unwrap()
    }

    #[test]
    fn switching_resets_the_leaving_combatant() {
        let mut state = two_on_one(&[Type::Normal]);
        state.active_mut(SideId::A).stages.atk = 2;
        state
            .active_mut(SideId::A)
            .volatiles
            .insert(VolatileKind::Confusion, Some(3), 0);
        let mut rng = SmallRng::seed_from_u64(5);
        let mut log = EventLog::new();
        perform_switch(&mut state, SideId::A, 1, SwitchReason::Voluntary, &mut rng, &mut log);
        assert_eq!(state.side(SideId::A).active, 1);
        let benched = &state.side(SideId::A).bench[0];
        assert_eq!(benched.stages.atk, 0);
        assert!(!benched.volatiles.has(VolatileKind::Confusion));
        assert!(matches!(log.events()[0], BattleEvent::SwitchedOut { .. }));
        assert!(matches!(log.events()[1], BattleEvent::SwitchedIn { .. }));
    }

    #[test]
    fn stealth_rock_scales_with_rock_effectiveness() {
        let mut state = two_on_one(&[Type::Fire, Type::Flying]);
        state.side_mut(SideId::A).conditions.stealth_rock = true;
        let mut rng = SmallRng::seed_from_u64(5);
        let mut log = EventLog::new();
        perform_switch(&mut state, SideId::A, 1, SwitchReason::Voluntary, &mut rng, &mut log);
        let entering = state.active(SideId::A);
        assert_eq!(entering.max_hp() - entering.hp, entering.max_hp() / 2);
    }

    #[test]
    fn grounded_poison_type_absorbs_toxic_spikes() {
        let mut state = two_on_one(&[Type::Poison]);
        state.side_mut(SideId::A).conditions.toxic_spikes = 2;
        let mut rng = SmallRng::seed_from_u64(5);
        let mut log = EventLog::new();
        perform_switch(&mut state, SideId::A, 1, SwitchReason::Voluntary, &mut rng, &mut log);
        assert_eq!(state.side(SideId::A).conditions.toxic_spikes, 0);
        assert!(state.active(SideId::A).status.is_none());
    }

    #[test]
    fn toxic_spikes_badly_poison_at_two_layers() {
        let mut state = two_on_one(&[Type::Water]);
        state.side_mut(SideId::A).conditions.toxic_spikes = 2;
        let mut rng = SmallRng::seed_from_u64(5);
        let mut log = EventLog::new();
        perform_switch(&mut state, SideId::A, 1, SwitchReason::Voluntary, &mut rng, &mut log);
        assert_eq!(state.active(SideId::A).status, PrimaryStatus::BadlyPoisoned { counter: 1 });
    }

    #[test]
    fn trapping_blocks_voluntary_switches() {
        let mut state = two_on_one(&[Type::Normal]);
        assert!(can_switch(&state, SideId::A));
        state.active_mut(SideId::B).ability = Ability::ShadowTag;
        assert!(!can_switch(&state, SideId::A));
        state.active_mut(SideId::B).ability = Ability::None;
        state.active_mut(SideId::A).volatiles.insert(VolatileKind::Trapped, None, 0);
        assert!(!can_switch(&state, SideId::A));
    }

    #[test]
    fn intimidate_fires_on_entry() {
        let mut state = two_on_one(&[Type::Normal]);
        state.side_mut(SideId::A).bench[1].ability = Ability::Intimidate;
        let mut rng = SmallRng::seed_from_u64(5);
        let mut log = EventLog::new();
        perform_switch(&mut state, SideId::A, 1, SwitchReason::Voluntary, &mut rng, &mut log);
        assert_eq!(state.active(SideId::B).stages.atk, -1);
    }

    #[test]
    fn random_switch_skips_fainted_and_active() {
        let mut state = two_on_one(&[Type::Normal]);
        let mut rng = SmallRng::seed_from_u64(5);
        assert_eq!(pick_random_switch(state.side(SideId::A), &mut rng), Some(1));
        state.side_mut(SideId::A).bench[1].hp = 0;
        state.side_mut(SideId::A).bench[1].fainted = true;
        assert_eq!(pick_random_switch(state.side(SideId::A), &mut rng), None);
    }
}
