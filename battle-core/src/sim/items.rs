//! Held-item hooks. The engine ships no held items; a host that models them plugs its own
//! implementation into [`crate::sim::turn::execute_turn_with_items`].

use crate::data::effects::EffectSpec;
use crate::sim::abilities::TurnContext;

/// End-of-turn item reactions. Effects are targeted relative to the holder.
pub trait HeldItemHooks {
    fn on_end_of_turn(&self, _ctx: &TurnContext) -> Vec<EffectSpec> {
        Vec::new()
    }
}

/// Nobody holds anything.
pub struct NoHeldItems;

impl HeldItemHooks for NoHeldItems {}
