//! Ordered, structured record of everything observable that happened in a turn.

use crate::data::effects::{BoostStat, FieldCondition, StatusKind, Weather};
use crate::sim::abilities::Ability;
use crate::sim::effects::BlockReason;
use crate::sim::resolver::CannotAct;
use crate::sim::state::{BattleResult, SideId};
use crate::sim::volatile::VolatileKind;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::fmt;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum DamageSource {
    Move,
    Recoil,
    Confusion,
    Weather { weather: Weather },
    Status { status: StatusKind },
    Hazard { condition: FieldCondition },
    Trap,
    Seed,
    Ability { ability: Ability },
    Effect,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SwitchReason {
    Lead,
    Voluntary,
    Forced,
    Dragged,
    Pivot,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum BattleEvent {
    TurnStarted { turn: u32 },
    SwitchedIn { side: SideId, name: String, hp: u16, max_hp: u16, reason: SwitchReason },
    SwitchedOut { side: SideId, name: String },
    MoveUsed { side: SideId, name: String, move_name: String },
    CannotAct { side: SideId, name: String, reason: CannotAct },
    Charging { side: SideId, name: String, move_name: String },
    Woke { side: SideId, name: String },
    Thawed { side: SideId, name: String },
    NoTarget { side: SideId, name: String },
    Protected { side: SideId, name: String },
    Missed { side: SideId, name: String },
    Immune { side: SideId, name: String },
    AbilityActivated { side: SideId, name: String, ability: Ability },
    Damage { side: SideId, name: String, amount: u16, hp: u16, max_hp: u16, source: DamageSource },
    CriticalHit { side: SideId, name: String },
    SuperEffective { side: SideId, name: String },
    NotVeryEffective { side: SideId, name: String },
    HitCount { hits: u8 },
    SubstituteCreated { side: SideId, name: String },
    SubstituteDamaged { side: SideId, name: String, amount: u16 },
    SubstituteBroke { side: SideId, name: String },
    Endured { side: SideId, name: String, ability: Ability },
    Heal { side: SideId, name: String, amount: u16, hp: u16, max_hp: u16 },
    StatChanged { side: SideId, name: String, stat: BoostStat, delta: i8, now: i8 },
    /// The stat was already at its limit; nothing changed.
    StatUnchanged { side: SideId, name: String, stat: BoostStat, raising: bool },
    StagesReset,
    StatusInflicted { side: SideId, name: String, status: StatusKind },
    StatusCured { side: SideId, name: String, status: StatusKind },
    EffectBlocked { side: SideId, name: String, reason: BlockReason },
    VolatileStarted { side: SideId, name: String, kind: VolatileKind },
    VolatileEnded { side: SideId, name: String, kind: VolatileKind },
    TypeChanged { side: SideId, name: String, types: Vec<crate::data::types::Type> },
    WeatherStarted { weather: Weather },
    WeatherEnded { weather: Weather },
    FieldStarted { condition: FieldCondition, side: Option<SideId> },
    FieldEnded { condition: FieldCondition, side: Option<SideId> },
    HazardsCleared { side: SideId },
    MoveFailed { side: SideId, name: String },
    OneHitKo { side: SideId, name: String },
    ItemUsed { side: SideId, item: String },
    Fainted { side: SideId, name: String },
    Forfeit { side: SideId },
    ForcedSwitchRequired { side: SideId },
    BattleEnded { result: BattleResult },
}

impl fmt::Display for BattleEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use BattleEvent::*;
        match self {
            TurnStarted { turn } => write!(f, "== turn {turn} =="),
            SwitchedIn { side, name, hp, max_hp, reason } => {
                write!(f, "{side} sent out {name} ({hp}/{max_hp}) [{reason:?}]")
            }
            SwitchedOut { side, name } => write!(f, "{side} withdrew {name}"),
            MoveUsed { name, move_name, .. } => write!(f, "{name} used {move_name}!"),
            CannotAct { name, reason, .. } => write!(f, "{name} cannot act: {reason}"),
            Charging { name, move_name, .. } => write!(f, "{name} is charging {move_name}"),
            Woke { name, .. } => write!(f, "{name} woke up"),
            Thawed { name, .. } => write!(f, "{name} thawed out"),
            NoTarget { name, .. } => write!(f, "{name} has no target"),
            Protected { name, .. } => write!(f, "{name} protected itself"),
            Missed { name, .. } => write!(f, "{name}'s attack missed"),
            Immune { name, .. } => write!(f, "it doesn't affect {name}"),
            AbilityActivated { name, ability, .. } => write!(f, "[{name}'s {ability}]"),
            Damage { name, amount, hp, max_hp, source, .. } => {
                write!(f, "{name} lost {amount} HP ({hp}/{max_hp}) from {source:?}")
            }
            CriticalHit { .. } => f.write_str("a critical hit!"),
            SuperEffective { .. } => f.write_str("it's super effective!"),
            NotVeryEffective { .. } => f.write_str("it's not very effective..."),
            HitCount { hits } => write!(f, "hit {hits} time(s)"),
            SubstituteCreated { name, .. } => write!(f, "{name} put up a substitute"),
            SubstituteDamaged { name, amount, .. } => {
                write!(f, "{name}'s substitute took {amount} damage")
            }
            SubstituteBroke { name, .. } => write!(f, "{name}'s substitute faded"),
            Endured { name, ability, .. } => write!(f, "{name} hung on thanks to {ability}"),
            Heal { name, amount, hp, max_hp, .. } => {
                write!(f, "{name} restored {amount} HP ({hp}/{max_hp})")
            }
            StatChanged { name, stat, delta, now, .. } => {
                let verb = if *delta > 0 { "rose" } else { "fell" };
                write!(f, "{name}'s {stat} {verb} by {} (now {now:+})", delta.unsigned_abs())
            }
            StatUnchanged { name, stat, raising, .. } => {
                let limit = if *raising { "higher" } else { "lower" };
                write!(f, "{name}'s {stat} won't go any {limit} (no effect)")
            }
            StagesReset => f.write_str("all stat changes were eliminated"),
            StatusInflicted { name, status, .. } => write!(f, "{name} is afflicted with {status}"),
            StatusCured { name, status, .. } => write!(f, "{name} was cured of {status}"),
            EffectBlocked { name, reason, .. } => write!(f, "{name} was unaffected ({reason})"),
            VolatileStarted { name, kind, .. } => write!(f, "{name} is now affected by {kind}"),
            VolatileEnded { name, kind, .. } => write!(f, "{name} is no longer affected by {kind}"),
            TypeChanged { name, types, .. } => {
                let names: Vec<&str> = types.iter().map(|t| t.as_str()).collect();
                write!(f, "{name} became {}", names.join("/"))
            }
            WeatherStarted { weather } => write!(f, "the weather became {weather}"),
            WeatherEnded { weather } => write!(f, "the {weather} subsided"),
            FieldStarted { condition, side: Some(side) } => write!(f, "{condition} began on {side}"),
            FieldStarted { condition, side: None } => write!(f, "{condition} began"),
            FieldEnded { condition, side: Some(side) } => write!(f, "{condition} ended on {side}"),
            FieldEnded { condition, side: None } => write!(f, "{condition} ended"),
            HazardsCleared { side } => write!(f, "hazards were cleared from {side}"),
            MoveFailed { name, .. } => write!(f, "but {name}'s move failed"),
            OneHitKo { name, .. } => write!(f, "{name} was knocked out in one hit"),
            ItemUsed { side, item } => write!(f, "{side} used {item}"),
            Fainted { name, .. } => write!(f, "{name} fainted"),
            Forfeit { side } => write!(f, "{side} forfeited"),
            ForcedSwitchRequired { side } => write!(f, "{side} must send in a replacement"),
            BattleEnded { result: BattleResult::Winner(side) } => write!(f, "{side} won the battle"),
            BattleEnded { result: BattleResult::Draw } => f.write_str("the battle ended in a draw"),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EventLog {
    events: Vec<BattleEvent>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: BattleEvent) {
        tracing::trace!(%event, "event");
        self.events.push(event);
    }

    pub fn extend(&mut self, other: EventLog) {
        self.events.extend(other.events);
    }

    pub fn events(&self) -> &[BattleEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &BattleEvent> {
        self.events.iter()
    }

    pub fn lines(&self) -> Vec<String> {
        self.events.iter().map(ToString::to_string).collect()
    }

    pub fn to_json(&self) -> serde_json::Value {
        json!({
            "events": self.events,
            "lines": self.lines(),
        })
    }
}

impl IntoIterator for EventLog {
    type Item = BattleEvent;
    type IntoIter = std::vec::IntoIter<BattleEvent>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.into_iter()
    }
}
