use crate::battle::simulate_random_battle;
use battle_core::prelude::*;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;

/// Aggregate of many independent battles between the same two rosters.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SeriesSummary {
    pub battles: usize,
    pub a_wins: usize,
    pub b_wins: usize,
    pub draws: usize,
    /// Battles stopped by the turn cap.
    pub unfinished: usize,
    pub total_turns: u64,
}

impl SeriesSummary {
    /// Side A's score: wins count 1, draws and unfinished battles count half.
    pub fn win_rate_a(&self) -> f64 {
        if self.battles == 0 {
            return 0.0;
        }
        let halves = (self.draws + self.unfinished) as f64;
        (self.a_wins as f64 + 0.5 * halves) / self.battles as f64
    }

    pub fn mean_turns(&self) -> f64 {
        if self.battles == 0 {
            return 0.0;
        }
        self.total_turns as f64 / self.battles as f64
    }

    fn record(&mut self, result: Option<BattleResult>, turns: u32) {
        self.battles += 1;
        self.total_turns += turns as u64;
        match result {
            Some(BattleResult::Winner(SideId::A)) => self.a_wins += 1,
            Some(BattleResult::Winner(SideId::B)) => self.b_wins += 1,
            Some(BattleResult::Draw) => self.draws += 1,
            None => self.unfinished += 1,
        }
    }
}

/// Seed of battle `index`. Depends only on the series seed and the index, never on scheduling.
pub fn battle_seed(seed: u64, index: usize) -> u64 {
    SmallRng::seed_from_u64(seed ^ ((index as u64) << 32)).gen()
}

/// Runs `battles` random-policy battles from clones of `template`, spread over the rayon pool.
pub fn run_series(template: &BattleState, battles: usize, seed: u64) -> Result<SeriesSummary, BattleError> {
    let outcomes: Vec<(Option<BattleResult>, u32)> = (0..battles)
        .into_par_iter()
        .map(|index| {
            let report = simulate_random_battle(template.clone(), battle_seed(seed, index))?;
            Ok((report.result, report.turns))
        })
        .collect::<Result<_, BattleError>>()?;

    let mut summary = SeriesSummary::default();
    for (result, turns) in outcomes {
        summary.record(result, turns);
    }
    Ok(summary)
}
