pub mod abilities;
pub mod action;
pub mod ai;
pub mod combatant;
pub mod damage;
pub mod effects;
pub mod field;
pub mod items;
pub mod resolver;
pub mod state;
pub mod stats;
pub mod switching;
pub mod turn;
pub mod volatile;

pub use combatant::{Combatant, CombatantSpec, PrimaryStatus};
pub use state::{BattleResult, BattleState, Side, SideId, TurnPhase};
