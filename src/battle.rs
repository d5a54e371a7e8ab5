use battle_core::prelude::*;

/// How a single simulated battle went.
#[derive(Clone, Debug)]
pub struct BattleReport {
    /// `None` when the turn cap ran out first.
    pub result: Option<BattleResult>,
    pub turns: u32,
    pub log: EventLog,
}

/// Plays `state` to the end with one decision source per side, answering forced switches
/// between turns. Stops after `config.max_turns` turns.
pub fn simulate_battle(
    state: BattleState,
    seed: u64,
    policy_a: &mut dyn DecisionSource,
    policy_b: &mut dyn DecisionSource,
) -> Result<BattleReport, BattleError> {
    let max_turns = state.config.max_turns;
    let mut engine = BattleEngine::new(state, seed);
    let mut log = engine.opening().clone();

    loop {
        answer_forced_switches(&mut engine, policy_a, policy_b, &mut log)?;
        if engine.is_terminal() || engine.state().turn >= max_turns {
            break;
        }
        let action_a = choose(&engine, SideId::A, policy_a);
        let action_b = choose(&engine, SideId::B, policy_b);
        let step = engine.step(&[action_a, action_b])?;
        log.extend(step.events);
    }

    if engine.result().is_none() {
        tracing::debug!(seed, max_turns, "battle hit the turn cap");
    }
    Ok(BattleReport {
        result: engine.result(),
        turns: engine.state().turn,
        log,
    })
}

fn choose(engine: &BattleEngine, side: SideId, policy: &mut dyn DecisionSource) -> Action {
    let legal = engine.legal_actions(side);
    // A source with nothing to say gives up the battle.
    policy
        .decide(engine.state(), &legal)
        .unwrap_or_else(|| Action::flee(side))
}

fn answer_forced_switches(
    engine: &mut BattleEngine,
    policy_a: &mut dyn DecisionSource,
    policy_b: &mut dyn DecisionSource,
    log: &mut EventLog,
) -> Result<(), BattleError> {
    // Hazards can knock out a replacement on entry, so keep asking until nobody is pending.
    while let Some(&side) = engine.pending_forced_switches().first() {
        let options = engine.replacement_options(side);
        let policy: &mut dyn DecisionSource = match side {
            SideId::A => &mut *policy_a,
            SideId::B => &mut *policy_b,
        };
        let Some(bench) = policy
            .choose_replacement(engine.state(), &options)
            .or_else(|| options.first().copied())
        else {
            break;
        };
        log.extend(engine.replace_fainted(side, bench)?);
    }
    Ok(())
}

/// Both sides pick uniformly at random from streams derived from `seed`.
pub fn simulate_random_battle(state: BattleState, seed: u64) -> Result<BattleReport, BattleError> {
    let mut policy_a = RandomDecision::new(seed.rotate_left(17) ^ 0xA11C_E5ED);
    let mut policy_b = RandomDecision::new(seed.rotate_left(41) ^ 0xB0B5_1DE5);
    simulate_battle(state, seed, &mut policy_a, &mut policy_b)
}
