use crate::data::effects::StatusKind;
use crate::data::moves::{MoveCategory, MoveTemplate};
use crate::data::species::SpeciesTemplate;
use crate::data::store::ContentStore;
use crate::data::types::Type;
use crate::error::{BattleError, ConfigError};
use crate::sim::abilities::Ability;
use crate::sim::stats::{apply_stage_multiplier, Stat, StatStages, StatsSet};
use crate::sim::volatile::{VolatileKind, Volatiles};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub const MAX_MOVES: usize = 4;

/// The single mutually exclusive primary status, with its counter where one exists.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PrimaryStatus {
    #[default]
    None,
    Sleep {
        turns: u8,
    },
    Freeze,
    Paralysis,
    Burn,
    Poison,
    BadlyPoisoned {
        counter: u8,
    },
}

impl PrimaryStatus {
    pub fn kind(self) -> Option<StatusKind> {
        match self {
            PrimaryStatus::None => None,
            PrimaryStatus::Sleep { .. } => Some(StatusKind::Sleep),
            PrimaryStatus::Freeze => Some(StatusKind::Freeze),
            PrimaryStatus::Paralysis => Some(StatusKind::Paralysis),
            PrimaryStatus::Burn => Some(StatusKind::Burn),
            PrimaryStatus::Poison => Some(StatusKind::Poison),
            PrimaryStatus::BadlyPoisoned { .. } => Some(StatusKind::BadlyPoisoned),
        }
    }

    pub fn is_none(self) -> bool {
        matches!(self, PrimaryStatus::None)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MoveSlot {
    pub template: Arc<MoveTemplate>,
    pub pp: u8,
}

impl MoveSlot {
    pub fn new(template: Arc<MoveTemplate>) -> Self {
        let pp = template.pp;
        Self { template, pp }
    }
}

/// Damage taken from the most recent hit this turn, read by counter-style moves.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct LastHit {
    pub category: MoveCategory,
    pub damage: u16,
}

/// Roster entry as produced by a roster builder, resolved through a [`ContentStore`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CombatantSpec {
    pub species: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default = "default_level")]
    pub level: u8,
    pub moves: Vec<String>,
    #[serde(default)]
    pub ability: Option<String>,
    #[serde(default)]
    pub evs: [u8; 6],
    #[serde(default = "default_ivs")]
    pub ivs: [u8; 6],
}

fn default_level() -> u8 {
    50
}

fn default_ivs() -> [u8; 6] {
    [31; 6]
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Combatant {
    pub name: String,
    pub species: Arc<SpeciesTemplate>,
    pub level: u8,
    pub stats: StatsSet,
    pub hp: u16,
    /// Current elements; starts as the species' and may change mid-battle.
    pub types: Vec<Type>,
    pub stages: StatStages,
    pub status: PrimaryStatus,
    pub volatiles: Volatiles,
    pub moves: Vec<MoveSlot>,
    pub ability: Ability,
    pub fainted: bool,
    pub last_move: Option<usize>,
    pub last_hit: Option<LastHit>,
}

impl Combatant {
    pub fn new(
        species: Arc<SpeciesTemplate>,
        level: u8,
        moves: Vec<Arc<MoveTemplate>>,
        ability: Ability,
    ) -> Result<Self, BattleError> {
        Self::with_spread(species, level, moves, ability, [0; 6], [31; 6])
    }

    pub fn with_spread(
        species: Arc<SpeciesTemplate>,
        level: u8,
        moves: Vec<Arc<MoveTemplate>>,
        ability: Ability,
        evs: [u8; 6],
        ivs: [u8; 6],
    ) -> Result<Self, BattleError> {
        if !(1..=100).contains(&level) {
            return Err(ConfigError::InvalidRoster(format!(
                "{} has level {level}, expected 1..=100",
                species.name
            ))
            .into());
        }
        if moves.is_empty() || moves.len() > MAX_MOVES {
            return Err(ConfigError::InvalidRoster(format!(
                "{} knows {} moves, expected 1..={MAX_MOVES}",
                species.name,
                moves.len()
            ))
            .into());
        }
        if ivs.iter().any(|iv| *iv > 31) {
            return Err(ConfigError::InvalidRoster(format!("{} has an IV above 31", species.name)).into());
        }
        let stats = StatsSet::from_base(species.base_stats, level, evs, ivs);
        Ok(Self {
            name: species.name.clone(),
            types: species.types.clone(),
            level,
            hp: stats.hp,
            stats,
            stages: StatStages::default(),
            status: PrimaryStatus::None,
            volatiles: Volatiles::default(),
            moves: moves.into_iter().map(MoveSlot::new).collect(),
            ability,
            fainted: false,
            last_move: None,
            last_hit: None,
            species,
        })
    }

    pub fn from_spec(store: &dyn ContentStore, spec: &CombatantSpec) -> Result<Self, BattleError> {
        let species = store.species_template(&spec.species)?;
        let moves = spec
            .moves
            .iter()
            .map(|id| store.move_template(id))
            .collect::<Result<Vec<_>, _>>()?;
        let ability = match spec.ability.as_deref() {
            Some(name) => Ability::from_name(name)?,
            None => Ability::None,
        };
        let mut combatant = Self::with_spread(species, spec.level, moves, ability, spec.evs, spec.ivs)?;
        if let Some(name) = &spec.name {
            combatant.name = name.clone();
        }
        Ok(combatant)
    }

    pub fn max_hp(&self) -> u16 {
        self.stats.hp
    }

    pub fn is_fainted(&self) -> bool {
        self.fainted || self.hp == 0
    }

    pub fn is_full_hp(&self) -> bool {
        self.hp == self.stats.hp
    }

    pub fn has_type(&self, element: Type) -> bool {
        self.types.contains(&element)
    }

    /// Loses up to `amount` HP, clamped at 0. Returns the HP actually lost.
    pub fn take_damage(&mut self, amount: u16) -> u16 {
        let lost = amount.min(self.hp);
        self.hp -= lost;
        lost
    }

    /// Restores up to `amount` HP, clamped at max. Returns the HP actually restored.
    pub fn heal(&mut self, amount: u16) -> u16 {
        let missing = self.stats.hp - self.hp;
        let restored = amount.min(missing);
        self.hp += restored;
        restored
    }

    /// `num/den` of max HP, never below 1.
    pub fn fraction_of_max(&self, num: u16, den: u16) -> u16 {
        ((self.stats.hp as u32 * num as u32) / den.max(1) as u32).max(1) as u16
    }

    /// Stat after its stage multiplier. HP has no stage.
    pub fn staged_stat(&self, stat: Stat) -> u16 {
        let base = self.stats.get(stat);
        let stage = match stat {
            Stat::Hp => return base,
            Stat::Atk => self.stages.atk,
            Stat::Def => self.stages.def,
            Stat::Spa => self.stages.spa,
            Stat::Spd => self.stages.spd,
            Stat::Spe => self.stages.spe,
        };
        apply_stage_multiplier(base, stage)
    }

    pub fn is_grounded(&self, gravity: bool) -> bool {
        gravity || !(self.has_type(Type::Flying) || self.ability == Ability::Levitate)
    }

    pub fn is_trapped(&self) -> bool {
        self.volatiles.has(VolatileKind::Trapped)
            || self.volatiles.has(VolatileKind::PartiallyTrapped)
            || self.volatiles.has(VolatileKind::Rooted)
    }

    /// True while the combatant is committed to a charge or recharge turn.
    pub fn is_locked(&self) -> bool {
        self.volatiles.has(VolatileKind::Charging) || self.volatiles.has(VolatileKind::Recharge)
    }

    pub fn clear_status(&mut self) {
        self.status = PrimaryStatus::None;
    }

    /// Everything that does not survive leaving the field.
    pub fn reset_on_switch_out(&mut self) {
        self.stages.reset();
        self.volatiles.clear();
        self.types = self.species.types.clone();
        self.last_move = None;
        self.last_hit = None;
        if let PrimaryStatus::BadlyPoisoned { .. } = self.status {
            self.status = PrimaryStatus::BadlyPoisoned { counter: 1 };
        }
    }

    pub fn hp_fraction(&self) -> f32 {
        self.hp as f32 / self.stats.hp.max(1) as f32
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;

    #[test]
    fn hp_changes_clamp() {
        let mut c = make_combatant(
            "Dummy",
            &[Type::Normal],
            vec![attack("tackle", Type::Normal, MoveCategory::Physical, 40)],
        );
        let max = c.max_hp();
        assert_eq!(c.heal(10), 0);
        assert_eq!(c.take_damage(max + 50), max);
        assert_eq!(c.hp, 0);
        assert!(c.is_fainted());
        assert_eq!(c.heal(5), 5);
    }

    #[test]
    fn rejects_bad_rosters() {
        let err = Combatant::new(species("Empty", &[Type::Fire], 50), 50, Vec::new(), Ability::None)
            .unwrap_err();
        assert!(matches!(err, BattleError::Configuration(ConfigError::InvalidRoster(_))));
        let mv = Arc::new(attack("ember", Type::Fire, MoveCategory::Special, 40));
        assert!(Combatant::new(species("Old", &[Type::Fire], 50), 101, vec![mv], Ability::None).is_err());
    }

    #[test]
    fn switching_out_clears_battle_state() {
        let mut c = make_combatant(
            "Dummy",
            &[Type::Normal],
            vec![attack("tackle", Type::Normal, MoveCategory::Physical, 40)],
        );
        c.stages.atk = 3;
        c.types = vec![Type::Ghost];
        c.volatiles.insert(VolatileKind::Confusion, Some(2), 0);
        c.status = PrimaryStatus::BadlyPoisoned { counter: 4 };
        c.reset_on_switch_out();
        assert_eq!(c.stages, StatStages::default());
        assert_eq!(c.types, vec![Type::Normal]);
        assert!(!c.volatiles.has(VolatileKind::Confusion));
        assert_eq!(c.status, PrimaryStatus::BadlyPoisoned { counter: 1 });
    }
}
