pub mod battle;
pub mod model;
pub mod series;

use crate::battle::simulate_random_battle;
use crate::model::RosterFile;
use crate::series::{battle_seed, run_series};
use anyhow::Context;
use battle_core::prelude::*;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct CliOptions {
    pub roster_path: PathBuf,
    /// Falls back to the content shipped with `battle-core`.
    pub content_path: Option<PathBuf>,
    pub config_path: Option<PathBuf>,
    pub battles: usize,
    pub seed: u64,
    /// Where to write the first battle's event log as JSON.
    pub log_path: Option<PathBuf>,
}

pub fn load_roster(path: &Path) -> anyhow::Result<RosterFile> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read roster file at {}", path.display()))?;
    let parsed: RosterFile = serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse JSON from {}", path.display()))?;
    if parsed.side_a.members.is_empty() || parsed.side_b.members.is_empty() {
        anyhow::bail!("Both rosters need at least one member");
    }
    Ok(parsed)
}

pub fn load_content(path: Option<&Path>) -> anyhow::Result<Dex> {
    let Some(path) = path else {
        return Ok(Dex::builtin()?.clone());
    };
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read content file at {}", path.display()))?;
    Dex::from_json_str(&raw).with_context(|| format!("Invalid content in {}", path.display()))
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<BattleConfig> {
    let Some(path) = path else {
        return Ok(BattleConfig::default());
    };
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file at {}", path.display()))?;
    BattleConfig::from_json_str(&raw).with_context(|| format!("Invalid config in {}", path.display()))
}

pub fn run(opts: CliOptions) -> anyhow::Result<()> {
    if opts.battles == 0 {
        anyhow::bail!("--battles must be > 0");
    }
    let dex = load_content(opts.content_path.as_deref())?;
    let config = load_config(opts.config_path.as_deref())?;
    let roster = load_roster(&opts.roster_path)?;
    let template = roster.build_state(&dex, config)?;
    tracing::info!(
        battles = opts.battles,
        seed = opts.seed,
        moves = dex.move_count(),
        species = dex.species_count(),
        "starting series"
    );

    let summary = run_series(&template, opts.battles, opts.seed)?;
    println!(
        "{} vs {}: {} battles, A won {}, B won {}, {} draws, {} hit the turn cap",
        template.side(SideId::A).name,
        template.side(SideId::B).name,
        summary.battles,
        summary.a_wins,
        summary.b_wins,
        summary.draws,
        summary.unfinished
    );
    println!(
        "A win rate {:.4}, mean length {:.1} turns",
        summary.win_rate_a(),
        summary.mean_turns()
    );

    if let Some(log_path) = &opts.log_path {
        // Seeds are derived per battle, so replaying battle 0 reproduces it exactly.
        let report = simulate_random_battle(template, battle_seed(opts.seed, 0))?;
        let json = serde_json::to_string_pretty(&report.log.to_json())?;
        std::fs::write(log_path, json)
            .with_context(|| format!("Failed to write event log to {}", log_path.display()))?;
        println!("Wrote {} events to {}", report.log.len(), log_path.display());
    }
    Ok(())
}
