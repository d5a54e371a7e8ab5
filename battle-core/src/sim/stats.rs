use crate::data::effects::BoostStat;
use crate::data::species::BaseStats;
use serde::{Deserialize, Serialize};

pub const MIN_STAGE: i8 = -6;
pub const MAX_STAGE: i8 = 6;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
pub enum Stat {
    Hp,
    Atk,
    Def,
    Spa,
    Spd,
    Spe,
}

pub fn calc_hp(base: u16, iv: u8, ev: u8, level: u8) -> u16 {
    let ev_quarter = (ev / 4) as u32;
    let base_value = base as u32 * 2 + iv as u32 + ev_quarter;
    let intermediate = (base_value * level as u32) / 100;
    (intermediate + level as u32 + 10) as u16
}

pub fn calc_stat(base: u16, iv: u8, ev: u8, level: u8) -> u16 {
    let ev_quarter = (ev / 4) as u32;
    let base_value = base as u32 * 2 + iv as u32 + ev_quarter;
    let intermediate = (base_value * level as u32) / 100;
    (intermediate + 5) as u16
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct StatsSet {
    pub hp: u16,
    pub atk: u16,
    pub def: u16,
    pub spa: u16,
    pub spd: u16,
    pub spe: u16,
}

impl StatsSet {
    /// `evs`/`ivs` are ordered hp, atk, def, spa, spd, spe.
    pub fn from_base(base: BaseStats, level: u8, evs: [u8; 6], ivs: [u8; 6]) -> Self {
        Self {
            hp: calc_hp(base.hp, ivs[0], evs[0], level),
            atk: calc_stat(base.atk, ivs[1], evs[1], level),
            def: calc_stat(base.def, ivs[2], evs[2], level),
            spa: calc_stat(base.spa, ivs[3], evs[3], level),
            spd: calc_stat(base.spd, ivs[4], evs[4], level),
            spe: calc_stat(base.spe, ivs[5], evs[5], level),
        }
    }

    pub fn get(&self, stat: Stat) -> u16 {
        match stat {
            Stat::Hp => self.hp,
            Stat::Atk => self.atk,
            Stat::Def => self.def,
            Stat::Spa => self.spa,
            Stat::Spd => self.spd,
            Stat::Spe => self.spe,
        }
    }
}

/// Outcome of moving one stage: how far it actually moved.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct StageChange {
    pub requested: i8,
    pub applied: i8,
    pub now: i8,
}

impl StageChange {
    pub fn had_effect(&self) -> bool {
        self.applied != 0
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct StatStages {
    pub atk: i8,
    pub def: i8,
    pub spa: i8,
    pub spd: i8,
    pub spe: i8,
    pub accuracy: i8,
    pub evasion: i8,
}

impl StatStages {
    pub fn get(&self, stat: BoostStat) -> i8 {
        match stat {
            BoostStat::Atk => self.atk,
            BoostStat::Def => self.def,
            BoostStat::Spa => self.spa,
            BoostStat::Spd => self.spd,
            BoostStat::Spe => self.spe,
            BoostStat::Accuracy => self.accuracy,
            BoostStat::Evasion => self.evasion,
        }
    }

    fn slot_mut(&mut self, stat: BoostStat) -> &mut i8 {
        match stat {
            BoostStat::Atk => &mut self.atk,
            BoostStat::Def => &mut self.def,
            BoostStat::Spa => &mut self.spa,
            BoostStat::Spd => &mut self.spd,
            BoostStat::Spe => &mut self.spe,
            BoostStat::Accuracy => &mut self.accuracy,
            BoostStat::Evasion => &mut self.evasion,
        }
    }

    /// Moves a stage by `delta`, clamped to [-6, 6].
    pub fn apply(&mut self, stat: BoostStat, delta: i8) -> StageChange {
        let slot = self.slot_mut(stat);
        let before = *slot;
        let now = before.saturating_add(delta).clamp(MIN_STAGE, MAX_STAGE);
        *slot = now;
        StageChange {
            requested: delta,
            applied: now - before,
            now,
        }
    }

    pub fn reset(&mut self) {
        *self = StatStages::default();
    }

    pub fn in_bounds(&self) -> bool {
        BoostStat::ALL
            .iter()
            .all(|stat| (MIN_STAGE..=MAX_STAGE).contains(&self.get(*stat)))
    }
}

/// Battle-stat stage multiplier: (2+s)/2 when raised, 2/(2-s) when lowered.
pub fn stage_multiplier(stage: i8) -> f32 {
    let stage = stage.clamp(MIN_STAGE, MAX_STAGE) as f32;
    if stage >= 0.0 {
        (2.0 + stage) / 2.0
    } else {
        2.0 / (2.0 - stage)
    }
}

/// Accuracy/evasion multiplier on the 3-based scale.
pub fn accuracy_multiplier(stage: i8) -> f32 {
    let stage = stage.clamp(MIN_STAGE, MAX_STAGE) as f32;
    if stage >= 0.0 {
        (3.0 + stage) / 3.0
    } else {
        3.0 / (3.0 - stage)
    }
}

pub fn apply_stage_multiplier(base: u16, stage: i8) -> u16 {
    let value = (base as f32 * stage_multiplier(stage)).floor() as u32;
    value.clamp(1, u16::MAX as u32) as u16
}
