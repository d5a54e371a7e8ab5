//! Player/AI actions, their priority brackets, and legality.

use crate::data::effects::{EffectKind, EffectSpec, FixedAmount, OtherEffect, TargetSelector};
use crate::data::moves::{MoveCategory, MoveFlags, MoveTarget, MoveTemplate};
use crate::data::types::Type;
use crate::error::{BattleError, IllegalAction};
use crate::sim::combatant::Combatant;
use crate::sim::state::{BattleState, SideId};
use crate::sim::switching;
use crate::sim::volatile::VolatileKind;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ActionKind {
    Fight { slot: usize },
    Switch { bench: usize },
    Item { slot: usize },
    Flee,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct Action {
    pub side: SideId,
    pub kind: ActionKind,
}

impl Action {
    pub fn fight(side: SideId, slot: usize) -> Self {
        Self {
            side,
            kind: ActionKind::Fight { slot },
        }
    }

    pub fn switch(side: SideId, bench: usize) -> Self {
        Self {
            side,
            kind: ActionKind::Switch { bench },
        }
    }

    pub fn item(side: SideId, slot: usize) -> Self {
        Self {
            side,
            kind: ActionKind::Item { slot },
        }
    }

    pub fn flee(side: SideId) -> Self {
        Self {
            side,
            kind: ActionKind::Flee,
        }
    }

    pub fn is_switch(&self) -> bool {
        matches!(self.kind, ActionKind::Switch { .. })
    }
}

/// Coarse ordering tier. Declared low to high; higher brackets act first.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum Bracket {
    Negative,
    Normal,
    Positive,
    /// Pursuit-style moves aimed at a switching target.
    Interrupt,
    /// Switches, items and fleeing.
    Switch,
}

/// The move used when every slot is out of PP or unusable.
pub static STRUGGLE: Lazy<Arc<MoveTemplate>> = Lazy::new(|| {
    Arc::new(MoveTemplate {
        id: "struggle".to_string(),
        name: "Struggle".to_string(),
        element: Type::Typeless,
        category: MoveCategory::Physical,
        power: 50,
        accuracy: None,
        pp: 1,
        priority: 0,
        target: MoveTarget::Opponent,
        flags: MoveFlags {
            contact: true,
            ..MoveFlags::default()
        },
        effects: vec![EffectSpec::new(
            TargetSelector::User,
            EffectKind::FixedDamage {
                amount: FixedAmount::FractionMax { num: 1, den: 4 },
            },
        )],
    })
});

/// Why a slot cannot be chosen right now, if it cannot.
fn slot_problem(side: SideId, combatant: &Combatant, slot: usize) -> Option<IllegalAction> {
    let Some(mv) = combatant.moves.get(slot) else {
        return Some(IllegalAction::NoSuchMove { side, slot });
    };
    if mv.pp == 0 {
        return Some(IllegalAction::MoveExhausted { side, slot });
    }
    if combatant.volatiles.value(VolatileKind::Disabled) == Some(slot as u16) {
        return Some(IllegalAction::MoveDisabled { side, slot });
    }
    if combatant.volatiles.has(VolatileKind::Taunt) && !mv.template.is_damaging() {
        return Some(IllegalAction::MoveTaunted { side, slot });
    }
    None
}

/// True when no slot is selectable and the combatant must struggle.
pub fn must_struggle(side: SideId, combatant: &Combatant) -> bool {
    (0..combatant.moves.len()).all(|slot| slot_problem(side, combatant, slot).is_some())
}

/// The template a Fight action will execute.
pub fn chosen_move(combatant: &Combatant, side: SideId, slot: usize) -> Arc<MoveTemplate> {
    if let Some(charging) = combatant.volatiles.value(VolatileKind::Charging) {
        if let Some(mv) = combatant.moves.get(charging as usize) {
            return Arc::clone(&mv.template);
        }
    }
    if must_struggle(side, combatant) {
        return Arc::clone(&STRUGGLE);
    }
    combatant
        .moves
        .get(slot)
        .map(|mv| Arc::clone(&mv.template))
        .unwrap_or_else(|| Arc::clone(&STRUGGLE))
}

/// Bracket and in-bracket priority of `action`. `opponent_switching` promotes pursuit.
pub fn bracket_for(state: &BattleState, action: &Action, opponent_switching: bool) -> (Bracket, i8) {
    match action.kind {
        ActionKind::Switch { .. } | ActionKind::Item { .. } | ActionKind::Flee => (Bracket::Switch, 0),
        ActionKind::Fight { slot } => {
            let combatant = state.active(action.side);
            if combatant.volatiles.has(VolatileKind::Recharge) {
                return (Bracket::Normal, 0);
            }
            let mv = chosen_move(combatant, action.side, slot);
            if opponent_switching && mv.has_other(OtherEffect::Pursuit) {
                return (Bracket::Interrupt, mv.priority);
            }
            let bracket = match mv.priority {
                p if p > 0 => Bracket::Positive,
                p if p < 0 => Bracket::Negative,
                _ => Bracket::Normal,
            };
            (bracket, mv.priority)
        }
    }
}

pub fn validate_action(state: &BattleState, action: &Action) -> Result<(), IllegalAction> {
    let side = action.side;
    if state.is_terminal() {
        return Err(IllegalAction::BattleOver);
    }
    let combatant = state.active(side);
    if combatant.is_fainted() {
        return Err(IllegalAction::PendingForcedSwitch(side));
    }
    match action.kind {
        ActionKind::Fight { slot } => {
            if let Some(charging) = combatant.volatiles.value(VolatileKind::Charging) {
                if charging as usize != slot {
                    return Err(IllegalAction::LockedIntoMove {
                        side,
                        slot: charging as usize,
                    });
                }
                return Ok(());
            }
            if combatant.volatiles.has(VolatileKind::Recharge) || must_struggle(side, combatant) {
                return Ok(());
            }
            match slot_problem(side, combatant, slot) {
                Some(problem) => Err(problem),
                None => Ok(()),
            }
        }
        ActionKind::Switch { bench } => {
            let roster = &state.side(side).bench;
            let Some(member) = roster.get(bench) else {
                return Err(IllegalAction::NoSuchBenchMember { side, bench });
            };
            if bench == state.side(side).active {
                return Err(IllegalAction::SwitchTargetActive { side, bench });
            }
            if member.is_fainted() {
                return Err(IllegalAction::SwitchTargetFainted { side, bench });
            }
            if combatant.is_locked() {
                return Err(IllegalAction::Locked(side));
            }
            if !switching::can_switch(state, side) {
                return Err(IllegalAction::Trapped(side));
            }
            Ok(())
        }
        ActionKind::Item { slot } => {
            if combatant.is_locked() {
                return Err(IllegalAction::Locked(side));
            }
            match state.side(side).inventory.get(slot) {
                Some(stack) if stack.count > 0 => Ok(()),
                _ => Err(IllegalAction::NoSuchItem { side, slot }),
            }
        }
        ActionKind::Flee => Ok(()),
    }
}

/// Checks a whole turn's submission: exactly one legal action per side.
pub fn validate_actions(state: &BattleState, actions: &[Action]) -> Result<(), BattleError> {
    if state.is_terminal() {
        return Err(IllegalAction::BattleOver.into());
    }
    if let Some(side) = state.pending_forced_switches().first() {
        return Err(IllegalAction::PendingForcedSwitch(*side).into());
    }
    for side in SideId::BOTH {
        match actions.iter().filter(|action| action.side == side).count() {
            0 => return Err(IllegalAction::MissingAction(side).into()),
            1 => {}
            _ => return Err(IllegalAction::DuplicateSide(side).into()),
        }
    }
    for action in actions {
        if let Err(illegal) = validate_action(state, action) {
            tracing::warn!(?action, %illegal, "rejected action");
            return Err(illegal.into());
        }
    }
    Ok(())
}

/// Every action `side` may submit this turn. Fleeing is always legal and not listed.
pub fn legal_actions_for(state: &BattleState, side: SideId) -> Vec<Action> {
    if state.is_terminal() || state.active(side).is_fainted() {
        return Vec::new();
    }
    let combatant = state.active(side);
    if let Some(charging) = combatant.volatiles.value(VolatileKind::Charging) {
        return vec![Action::fight(side, charging as usize)];
    }
    if combatant.volatiles.has(VolatileKind::Recharge) {
        return vec![Action::fight(side, 0)];
    }

    let mut actions: Vec<Action> = (0..combatant.moves.len())
        .filter(|slot| slot_problem(side, combatant, *slot).is_none())
        .map(|slot| Action::fight(side, slot))
        .collect();
    if actions.is_empty() {
        actions.push(Action::fight(side, 0));
    }
    if switching::can_switch(state, side) {
        actions.extend(
            state
                .side(side)
                .switch_candidates()
                .into_iter()
                .map(|bench| Action::switch(side, bench)),
        );
    }
    actions.extend(
        state
            .side(side)
            .inventory
            .iter()
            .enumerate()
            .filter(|(_, stack)| stack.count > 0)
            .map(|(slot, _)| Action::item(side, slot)),
    );
    actions
}

/// Bench slots that may replace a fainted active.
pub fn replacement_options(state: &BattleState, side: SideId) -> Vec<usize> {
    if !state.active(side).is_fainted() {
        return Vec::new();
    }
    state.side(side).switch_candidates()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BattleConfig;
    use crate::sim::combatant::test_support::{attack, make_combatant};
    use crate::sim::state::Side;

    fn state() -> BattleState {
        let tackle = attack("tackle", Type::Normal, MoveCategory::Physical, 40);
        let mut growl = attack("growl", Type::Normal, MoveCategory::Status, 0);
        growl.accuracy = Some(100);
        let mut quick = attack("quick attack", Type::Normal, MoveCategory::Physical, 40);
        quick.priority = 1;
        let a = make_combatant("Alpha", &[Type::Normal], vec![tackle.clone(), growl, quick]);
        let a2 = make_combatant("Alpha Two", &[Type::Normal], vec![tackle.clone()]);
        let b = make_combatant("Beta", &[Type::Normal], vec![tackle]);
        BattleState::new(
            Side::new(SideId::A, "A", vec![a, a2]).unwrap(),
            Side::new(SideId::B, "B", vec![b]).unwrap(),
            BattleConfig::default(),
        )
        .unwrap()
    }

    #[test]
    fn brackets_follow_action_kind_then_priority() {
        let state = state();
        assert_eq!(bracket_for(&state, &Action::switch(SideId::A, 1), false).0, Bracket::Switch);
        assert_eq!(bracket_for(&state, &Action::fight(SideId::A, 2), false).0, Bracket::Positive);
        assert_eq!(bracket_for(&state, &Action::fight(SideId::A, 0), false).0, Bracket::Normal);
        assert!(Bracket::Switch > Bracket::Interrupt);
        assert!(Bracket::Interrupt > Bracket::Positive);
        assert!(Bracket::Normal > Bracket::Negative);
    }

    #[test]
    fn exhausted_and_disabled_slots_are_rejected() {
        let mut state = state();
        state.active_mut(SideId::A).moves[0].pp = 0;
        assert_eq!(
            validate_action(&state, &Action::fight(SideId::A, 0)),
            Err(IllegalAction::MoveExhausted { side: SideId::A, slot: 0 })
        );
        state.active_mut(SideId::A).volatiles.insert(VolatileKind::Disabled, Some(3), 2);
        assert_eq!(
            validate_action(&state, &Action::fight(SideId::A, 2)),
            Err(IllegalAction::MoveDisabled { side: SideId::A, slot: 2 })
        );
        assert_eq!(
            validate_action(&state, &Action::fight(SideId::A, 7)),
            Err(IllegalAction::NoSuchMove { side: SideId::A, slot: 7 })
        );
    }

    #[test]
    fn taunt_blocks_status_moves() {
        let mut state = state();
        state.active_mut(SideId::A).volatiles.insert(VolatileKind::Taunt, Some(3), 0);
        let legal = legal_actions_for(&state, SideId::A);
        assert!(!legal.contains(&Action::fight(SideId::A, 1)));
        assert!(legal.contains(&Action::fight(SideId::A, 0)));
    }

    #[test]
    fn one_action_per_side() {
        let state = state();
        let missing = validate_actions(&state, &[Action::fight(SideId::A, 0)]);
        assert_eq!(missing, Err(IllegalAction::MissingAction(SideId::B).into()));
        let doubled = validate_actions(
            &state,
            &[
                Action::fight(SideId::A, 0),
                Action::fight(SideId::A, 1),
                Action::fight(SideId::B, 0),
            ],
        );
        assert_eq!(doubled, Err(IllegalAction::DuplicateSide(SideId::A).into()));
    }

    #[test]
    fn switching_rules() {
        let mut state = state();
        assert_eq!(
            validate_action(&state, &Action::switch(SideId::A, 0)),
            Err(IllegalAction::SwitchTargetActive { side: SideId::A, bench: 0 })
        );
        assert!(validate_action(&state, &Action::switch(SideId::A, 1)).is_ok());
        state.active_mut(SideId::A).volatiles.insert(VolatileKind::Trapped, None, 0);
        assert_eq!(
            validate_action(&state, &Action::switch(SideId::A, 1)),
            Err(IllegalAction::Trapped(SideId::A))
        );
        assert!(!legal_actions_for(&state, SideId::A).iter().any(Action::is_switch));
    }

    #[test]
    fn out_of_pp_falls_back_to_struggle() {
        let mut state = state();
        for slot in &mut state.active_mut(SideId::B).moves {
            slot.pp = 0;
        }
        assert_eq!(legal_actions_for(&state, SideId::B), vec![Action::fight(SideId::B, 0)]);
        assert!(validate_action(&state, &Action::fight(SideId::B, 0)).is_ok());
        let mv = chosen_move(state.active(SideId::B), SideId::B, 0);
        assert_eq!(mv.id, "struggle");
    }
}
