//! Error taxonomy for the battle engine.
//!
//! Ordinary battle outcomes (a miss, an immunity, a blocked status) are never
//! errors; they are recorded in the [`EventLog`](crate::events::EventLog).

use crate::sim::state::{SideId, TurnPhase};

/// Top-level error returned by content loading and the turn API.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum BattleError {
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigError),

    #[error("illegal action: {0}")]
    IllegalAction(#[from] IllegalAction),

    #[error("invariant violated during {phase:?}: {detail}")]
    InvariantViolation { phase: TurnPhase, detail: String },
}

impl BattleError {
    pub(crate) fn invariant(phase: TurnPhase, detail: impl Into<String>) -> Self {
        let detail = detail.into();
        tracing::warn!(?phase, %detail, "runtime invariant violated");
        BattleError::InvariantViolation { phase, detail }
    }
}

/// Missing or malformed template data. Raised at load or construction time.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("unknown move `{0}`")]
    UnknownMove(String),

    #[error("unknown species `{0}`")]
    UnknownSpecies(String),

    #[error("unknown item `{0}`")]
    UnknownItem(String),

    #[error("unknown ability `{0}`")]
    UnknownAbility(String),

    #[error("unknown type `{0}`")]
    UnknownType(String),

    #[error("malformed content: {0}")]
    Malformed(String),

    #[error("invalid effect on `{owner}`: {reason}")]
    InvalidEffect { owner: String, reason: String },

    #[error("invalid template `{id}`: {reason}")]
    InvalidTemplate { id: String, reason: String },

    #[error("invalid roster: {0}")]
    InvalidRoster(String),
}

/// A submitted action that cannot be executed. The state is left untouched.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum IllegalAction {
    #[error("the battle is already over")]
    BattleOver,

    #[error("side {0:?} submitted more than one action")]
    DuplicateSide(SideId),

    #[error("side {0:?} did not submit an action")]
    MissingAction(SideId),

    #[error("side {0:?} must replace its fainted active before acting")]
    PendingForcedSwitch(SideId),

    #[error("side {side:?} has no move in slot {slot}")]
    NoSuchMove { side: SideId, slot: usize },

    #[error("side {side:?} has no uses left for slot {slot}")]
    MoveExhausted { side: SideId, slot: usize },

    #[error("side {side:?} cannot use slot {slot} while it is disabled")]
    MoveDisabled { side: SideId, slot: usize },

    #[error("side {side:?} cannot use status moves while taunted (slot {slot})")]
    MoveTaunted { side: SideId, slot: usize },

    #[error("side {side:?} is locked into slot {slot}")]
    LockedIntoMove { side: SideId, slot: usize },

    #[error("side {side:?} has no bench member {bench}")]
    NoSuchBenchMember { side: SideId, bench: usize },

    #[error("side {side:?} cannot switch to bench member {bench}: it has fainted")]
    SwitchTargetFainted { side: SideId, bench: usize },

    #[error("side {side:?} cannot switch to bench member {bench}: it is already active")]
    SwitchTargetActive { side: SideId, bench: usize },

    #[error("side {0:?} is trapped and cannot switch")]
    Trapped(SideId),

    #[error("side {0:?} is locked into its current action")]
    Locked(SideId),

    #[error("side {side:?} has no usable item in slot {slot}")]
    NoSuchItem { side: SideId, slot: usize },

    #[error("side {0:?} has no fainted active to replace")]
    NoForcedSwitchPending(SideId),
}
