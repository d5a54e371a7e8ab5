//! Temporary conditions layered on top of the single primary status.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VolatileKind {
    Confusion,
    Flinch,
    /// Cannot switch until it leaves the field.
    Trapped,
    /// Bound for a few turns, losing 1/8 max HP each end of turn.
    PartiallyTrapped,
    /// `value` is the index of the side that planted the seed.
    Seeded,
    /// `value` is the remaining substitute HP.
    Substitute,
    /// `value` is the disabled move slot.
    Disabled,
    /// `value` counts consecutive successful protections.
    ProtectionStreak,
    Protected,
    /// `value` is the move slot being charged.
    Charging,
    Recharge,
    Taunt,
    Yawn,
    Rooted,
    AquaRing,
    FlashFire,
}

impl fmt::Display for VolatileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            VolatileKind::Confusion => "confusion",
            VolatileKind::Flinch => "flinch",
            VolatileKind::Trapped => "trapped",
            VolatileKind::PartiallyTrapped => "bound",
            VolatileKind::Seeded => "seeded",
            VolatileKind::Substitute => "substitute",
            VolatileKind::Disabled => "disable",
            VolatileKind::ProtectionStreak => "protection streak",
            VolatileKind::Protected => "protect",
            VolatileKind::Charging => "charging",
            VolatileKind::Recharge => "recharge",
            VolatileKind::Taunt => "taunt",
            VolatileKind::Yawn => "drowsy",
            VolatileKind::Rooted => "rooted",
            VolatileKind::AquaRing => "aqua ring",
            VolatileKind::FlashFire => "flash fire",
        };
        f.write_str(name)
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct VolatileState {
    /// Remaining end-of-turn ticks; `None` lasts until removed explicitly.
    pub turns: Option<u8>,
    pub value: u16,
}

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct Volatiles(BTreeMap<VolatileKind, VolatileState>);

impl Volatiles {
    pub fn has(&self, kind: VolatileKind) -> bool {
        self.0.contains_key(&kind)
    }

    pub fn get(&self, kind: VolatileKind) -> Option<&VolatileState> {
        self.0.get(&kind)
    }

    pub fn get_mut(&mut self, kind: VolatileKind) -> Option<&mut VolatileState> {
        self.0.get_mut(&kind)
    }

    pub fn value(&self, kind: VolatileKind) -> Option<u16> {
        self.0.get(&kind).map(|state| state.value)
    }

    /// Inserts or overwrites. A zero-turn counter is treated as already expired.
    pub fn insert(&mut self, kind: VolatileKind, turns: Option<u8>, value: u16) {
        if turns == Some(0) {
            self.0.remove(&kind);
            return;
        }
        self.0.insert(kind, VolatileState { turns, value });
    }

    pub fn remove(&mut self, kind: VolatileKind) -> Option<VolatileState> {
        self.0.remove(&kind)
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (&VolatileKind, &VolatileState)> {
        self.0.iter()
    }

    /// Decrements every counted volatile and removes the ones reaching zero.
    /// Returns the expired kinds in key order.
    pub fn tick(&mut self) -> Vec<VolatileKind> {
        let mut expired = Vec::new();
        for (kind, state) in self.0.iter_mut() {
            if let Some(turns) = state.turns.as_mut() {
                *turns = turns.saturating_sub(1);
                if *turns == 0 {
                    expired.push(*kind);
                }
            }
        }
        for kind in &expired {
            self.0.remove(kind);
        }
        expired
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tick_removes_exactly_at_zero() {
        let mut volatiles = Volatiles::default();
        volatiles.insert(VolatileKind::Taunt, Some(2), 0);
        volatiles.insert(VolatileKind::Substitute, None, 40);
        assert!(volatiles.tick().is_empty());
        assert_eq!(volatiles.get(VolatileKind::Taunt).and_then(|s| s.turns), Some(1));
        assert_eq!(volatiles.tick(), vec![VolatileKind::Taunt]);
        assert!(!volatiles.has(VolatileKind::Taunt));
        assert_eq!(volatiles.value(VolatileKind::Substitute), Some(40));
    }

    #[test]
    fn zero_turn_insert_is_a_no_op() {
        let mut volatiles = Volatiles::default();
        volatiles.insert(VolatileKind::Confusion, Some(0), 0);
        assert!(!volatiles.has(VolatileKind::Confusion));
    }
}
