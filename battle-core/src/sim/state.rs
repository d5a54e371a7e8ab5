use crate::config::BattleConfig;
use crate::data::items::ItemTemplate;
use crate::error::{BattleError, ConfigError};
use crate::sim::combatant::Combatant;
use crate::sim::field::{GlobalField, SideConditions};
use crate::sim::stats::{MAX_STAGE, MIN_STAGE};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub enum SideId {
    A,
    B,
}

impl SideId {
    pub const BOTH: [SideId; 2] = [SideId::A, SideId::B];

    pub fn index(self) -> usize {
        match self {
            SideId::A => 0,
            SideId::B => 1,
        }
    }

    pub fn from_index(index: usize) -> Option<SideId> {
        match index {
            0 => Some(SideId::A),
            1 => Some(SideId::B),
            _ => None,
        }
    }

    pub fn opponent(self) -> SideId {
        match self {
            SideId::A => SideId::B,
            SideId::B => SideId::A,
        }
    }
}

impl fmt::Display for SideId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SideId::A => f.write_str("side A"),
            SideId::B => f.write_str("side B"),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub enum TurnPhase {
    /// Between turns: the caller owns the state and may read it.
    #[default]
    AwaitingActions,
    PreTurn,
    ActionBrackets,
    EndTurn,
    FaintCheck,
    Terminal,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum BattleResult {
    Winner(SideId),
    Draw,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ItemStack {
    pub template: Arc<ItemTemplate>,
    pub count: u8,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Side {
    pub id: SideId,
    pub name: String,
    /// Fixed for the whole battle; fainted members stay in place.
    pub bench: Vec<Combatant>,
    pub active: usize,
    pub conditions: SideConditions,
    #[serde(default)]
    pub inventory: Vec<ItemStack>,
}

impl Side {
    pub fn new(id: SideId, name: impl Into<String>, bench: Vec<Combatant>) -> Result<Self, BattleError> {
        if bench.is_empty() {
            return Err(ConfigError::InvalidRoster(format!("{id} has an empty roster")).into());
        }
        Ok(Self {
            id,
            name: name.into(),
            bench,
            active: 0,
            conditions: SideConditions::default(),
            inventory: Vec::new(),
        })
    }

    pub fn with_inventory(mut self, inventory: Vec<ItemStack>) -> Self {
        self.inventory = inventory;
        self
    }

    pub fn active(&self) -> &Combatant {
        &self.bench[self.active]
    }

    pub fn active_mut(&mut self) -> &mut Combatant {
        &mut self.bench[self.active]
    }

    pub fn has_available(&self) -> bool {
        self.bench.iter().any(|member| !member.is_fainted())
    }

    /// Healthy bench members other than the active one.
    pub fn switch_candidates(&self) -> Vec<usize> {
        self.bench
            .iter()
            .enumerate()
            .filter_map(|(idx, member)| (idx != self.active && !member.is_fainted()).then_some(idx))
            .collect()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BattleState {
    pub sides: [Side; 2],
    pub field: GlobalField,
    pub turn: u32,
    pub phase: TurnPhase,
    pub result: Option<BattleResult>,
    pub config: BattleConfig,
}

impl BattleState {
    pub fn new(side_a: Side, side_b: Side, config: BattleConfig) -> Result<Self, BattleError> {
        config.validate()?;
        if side_a.id != SideId::A || side_b.id != SideId::B {
            return Err(ConfigError::InvalidRoster("sides must be given in A, B order".to_string()).into());
        }
        Ok(Self {
            sides: [side_a, side_b],
            field: GlobalField::default(),
            turn: 0,
            phase: TurnPhase::AwaitingActions,
            result: None,
            config,
        })
    }

    pub fn side(&self, id: SideId) -> &Side {
        &self.sides[id.index()]
    }

    pub fn side_mut(&mut self, id: SideId) -> &mut Side {
        &mut self.sides[id.index()]
    }

    pub fn active(&self, id: SideId) -> &Combatant {
        self.side(id).active()
    }

    pub fn active_mut(&mut self, id: SideId) -> &mut Combatant {
        self.side_mut(id).active_mut()
    }

    /// Split borrow of (`source`'s active, its opponent's active).
    pub fn actives_mut(&mut self, source: SideId) -> (&mut Combatant, &mut Combatant) {
        let [a, b] = &mut self.sides;
        let (src, tgt) = match source {
            SideId::A => (a, b),
            SideId::B => (b, a),
        };
        let src_idx = src.active;
        let tgt_idx = tgt.active;
        (&mut src.bench[src_idx], &mut tgt.bench[tgt_idx])
    }

    pub fn is_terminal(&self) -> bool {
        self.result.is_some()
    }

    /// Sides whose active has fainted and that still have someone to send in.
    pub fn pending_forced_switches(&self) -> Vec<SideId> {
        if self.is_terminal() {
            return Vec::new();
        }
        SideId::BOTH
            .into_iter()
            .filter(|id| {
                let side = self.side(*id);
                side.active().is_fainted() && side.has_available()
            })
            .collect()
    }

    /// Winner by elimination, or a draw when both sides ran out together.
    pub fn elimination_result(&self) -> Option<BattleResult> {
        match (self.sides[0].has_available(), self.sides[1].has_available()) {
            (true, true) => None,
            (true, false) => Some(BattleResult::Winner(SideId::A)),
            (false, true) => Some(BattleResult::Winner(SideId::B)),
            (false, false) => Some(BattleResult::Draw),
        }
    }

    /// Checks the structural invariants that rule code must never break.
    pub fn check_invariants(&self) -> Result<(), BattleError> {
        for side in &self.sides {
            if side.active >= side.bench.len() {
                return Err(BattleError::invariant(
                    self.phase,
                    format!("{} active index {} out of range", side.id, side.active),
                ));
            }
            for member in &side.bench {
                if !member.stages.in_bounds() {
                    return Err(BattleError::invariant(
                        self.phase,
                        format!(
                            "{} of {} has a stat stage outside [{MIN_STAGE}, {MAX_STAGE}]: {:?}",
                            member.name, side.id, member.stages
                        ),
                    ));
                }
                if member.hp > member.max_hp() {
                    return Err(BattleError::invariant(
                        self.phase,
                        format!(
                            "{} of {} has {} HP above its max {}",
                            member.name,
                            side.id,
                            member.hp,
                            member.max_hp()
                        ),
                    ));
                }
                if member.fainted && member.hp > 0 {
                    return Err(BattleError::invariant(
                        self.phase,
                        format!("{} of {} is marked fainted with {} HP", member.name, side.id, member.hp),
                    ));
                }
            }
        }
        Ok(())
    }
}
