//! Turn-based two-sided combat engine.
//!
//! The main entry point for step-based simulations is [`engine::BattleEngine`]; the turn
//! state machine itself is [`sim::turn::execute_turn`].

pub mod config;
pub mod data;
pub mod engine;
pub mod error;
pub mod events;
pub mod sim;

/// Commonly used exports for external consumers.
pub mod prelude {
    pub use crate::config::BattleConfig;
    pub use crate::data::{ContentStore, Dex};
    pub use crate::engine::{BattleEngine, StepResult};
    pub use crate::error::{BattleError, ConfigError, IllegalAction};
    pub use crate::events::{BattleEvent, EventLog};
    pub use crate::sim::action::{legal_actions_for, Action, ActionKind};
    pub use crate::sim::ai::{DecisionSource, RandomDecision};
    pub use crate::sim::turn::{apply_forced_switch, execute_turn, TurnOutcome};
    pub use crate::sim::{BattleResult, BattleState, Combatant, CombatantSpec, Side, SideId};
}
