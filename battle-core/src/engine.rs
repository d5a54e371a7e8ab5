//! High-level battle engine wrapper for step-based simulations.

use crate::error::BattleError;
use crate::events::EventLog;
use crate::sim::action::{legal_actions_for, replacement_options, Action};
use crate::sim::state::{BattleResult, BattleState, SideId};
use crate::sim::turn::{apply_forced_switch, begin_battle, execute_turn};
use rand::rngs::SmallRng;
use rand::SeedableRng;

/// Result of a single engine step.
#[derive(Clone, Debug)]
pub struct StepResult {
    pub events: EventLog,
    /// Reward for side A.
    pub reward_a: f32,
    /// Reward for side B.
    pub reward_b: f32,
    /// State snapshot before the step.
    pub before: BattleState,
    pub outcome: Option<BattleResult>,
    /// Sides that must call [`BattleEngine::replace_fainted`] before the next step.
    pub forced_switches: Vec<SideId>,
}

/// Owns a battle and the one RNG stream every random decision in it draws from.
pub struct BattleEngine {
    state: BattleState,
    rng: SmallRng,
    opening: EventLog,
}

impl BattleEngine {
    /// Sends in both leads right away; their entry events are kept in [`Self::opening`].
    pub fn new(state: BattleState, seed: u64) -> Self {
        let mut state = state;
        let mut rng = SmallRng::seed_from_u64(seed);
        let opening = begin_battle(&mut state, &mut rng);
        Self { state, rng, opening }
    }

    pub fn opening(&self) -> &EventLog {
        &self.opening
    }

    /// Advances the battle by one turn. An illegal submission leaves the battle unchanged.
    pub fn step(&mut self, actions: &[Action]) -> Result<StepResult, BattleError> {
        let before = self.state.clone();
        let outcome = execute_turn(&mut self.state, actions, &mut self.rng)?;
        let (reward_a, reward_b) = outcome_rewards(outcome.terminal);
        Ok(StepResult {
            events: outcome.events,
            reward_a,
            reward_b,
            before,
            outcome: outcome.terminal,
            forced_switches: outcome.forced_switches,
        })
    }

    /// Answers a forced-switch request for `side`.
    pub fn replace_fainted(&mut self, side: SideId, bench: usize) -> Result<EventLog, BattleError> {
        apply_forced_switch(&mut self.state, side, bench, &mut self.rng)
    }

    pub fn legal_actions(&self, side: SideId) -> Vec<Action> {
        legal_actions_for(&self.state, side)
    }

    /// Bench slots `side` may send in; empty unless its active has fainted.
    pub fn replacement_options(&self, side: SideId) -> Vec<usize> {
        replacement_options(&self.state, side)
    }

    pub fn pending_forced_switches(&self) -> Vec<SideId> {
        self.state.pending_forced_switches()
    }

    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }

    pub fn result(&self) -> Option<BattleResult> {
        self.state.result
    }

    /// Read-only view of the battle. Callers never mutate it directly.
    pub fn state(&self) -> &BattleState {
        &self.state
    }
}

fn outcome_rewards(outcome: Option<BattleResult>) -> (f32, f32) {
    match outcome {
        Some(BattleResult::Winner(SideId::A)) => (1.0, -1.0),
        Some(BattleResult::Winner(SideId::B)) => (-1.0, 1.0),
        Some(BattleResult::Draw) | None => (0.0, 0.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BattleConfig;
    use crate::data::moves::MoveCategory;
    use crate::data::types::Type;
    use crate::events::{BattleEvent, SwitchReason};
    use crate::sim::combatant::test_support::{attack, make_combatant};
    use crate::sim::state::Side;

    #[test]
    fn opening_sends_in_both_leads() {
        let tackle = attack("tackle", Type::Normal, MoveCategory::Physical, 40);
        let lead = make_combatant("Lead", &[Type::Normal], vec![tackle]);
        let state = BattleState::new(
            Side::new(SideId::A, "A", vec![lead.clone()]).unwrap(),
            Side::new(SideId::B, "B", vec![lead]).unwrap(),
            BattleConfig::default(),
        )
        .unwrap();
        let mut engine = BattleEngine::new(state, 3);
        let leads: Vec<&BattleEvent> = engine
            .opening()
            .iter()
            .filter(|event| {
                matches!(
                    event,
                    BattleEvent::SwitchedIn {
                        reason: SwitchReason::Lead,
                        ..
                    }
                )
            })
            .collect();
        assert_eq!(leads.len(), 2);

        let step = engine
            .step(&[Action::fight(SideId::A, 0), Action::fight(SideId::B, 0)])
            .unwrap();
        assert_eq!(step.before.turn, 0);
        assert_eq!(engine.state().turn, 1);
        assert_eq!((step.reward_a, step.reward_b), (0.0, 0.0));
    }
}
