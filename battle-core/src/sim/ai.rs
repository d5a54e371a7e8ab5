use crate::sim::action::Action;
use crate::sim::state::BattleState;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// Anything that picks actions for one side: a player, a script, or a policy.
pub trait DecisionSource {
    /// Picks one of `legal`. `None` means the source has nothing to submit.
    fn decide(&mut self, state: &BattleState, legal: &[Action]) -> Option<Action>;

    /// Picks the bench slot that replaces a fainted active.
    fn choose_replacement(&mut self, state: &BattleState, options: &[usize]) -> Option<usize>;
}

/// Uniformly random choices from its own seeded stream.
pub struct RandomDecision {
    rng: SmallRng,
}

impl RandomDecision {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }
}

impl DecisionSource for RandomDecision {
    fn decide(&mut self, _state: &BattleState, legal: &[Action]) -> Option<Action> {
        legal.choose(&mut self.rng).copied()
    }

    fn choose_replacement(&mut self, _state: &BattleState, options: &[usize]) -> Option<usize> {
        options.choose(&mut self.rng).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BattleConfig;
    use crate::data::moves::MoveCategory;
    use crate::data::types::Type;
    use crate::sim::action::legal_actions_for;
    use crate::sim::combatant::test_support::{attack, make_combatant};
    use crate::sim::state::{Side, SideId};

    #[test]
    fn random_decisions_stay_legal_and_repeat_per_seed() {
        let tackle = attack("tackle", Type::Normal, MoveCategory::Physical, 40);
        let lead = make_combatant("Lead", &[Type::Normal], vec![tackle.clone(), tackle.clone()]);
        let state = BattleState::new(
            Side::new(SideId::A, "A", vec![lead.clone(), lead.clone()]).unwrap(),
            Side::new(SideId::B, "B", vec![lead]).unwrap(),
            BattleConfig::default(),
        )
        .unwrap();
        let legal = legal_actions_for(&state, SideId::A);
        let picks = |seed| {
            let mut source = RandomDecision::new(seed);
            (0..10)
                .map(|_| source.decide(&state, &legal))
                .collect::<Vec<_>>()
        };
        assert_eq!(picks(4), picks(4));
        assert!(picks(4).iter().all(|pick| pick.is_some_and(|a| legal.contains(&a))));
        assert_eq!(RandomDecision::new(1).decide(&state, &[]), None);
    }
}
