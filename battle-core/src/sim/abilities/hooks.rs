//! The capability interface. Every method is a pure query with a no-op default:
//! handlers return modifiers, vetoes or effect specs, and the engine applies them.
//! Effect targets are relative to the holder (`self` = holder, `opponent` = the other active).

use crate::data::effects::{BoostStat, EffectSpec, StatusKind, Weather};
use crate::data::moves::MoveTemplate;
use crate::data::types::Type;
use crate::sim::combatant::Combatant;
use crate::sim::field::GlobalField;
use crate::sim::volatile::VolatileKind;

/// One attacker/defender interaction.
#[derive(Clone, Copy)]
pub struct MoveContext<'a> {
    pub attacker: &'a Combatant,
    pub defender: &'a Combatant,
    pub mv: &'a MoveTemplate,
    /// Element after any type change.
    pub move_type: Type,
    pub power: u16,
    pub effectiveness: f32,
    pub critical: bool,
    pub field: &'a GlobalField,
}

impl MoveContext<'_> {
    pub fn is_physical(&self) -> bool {
        matches!(self.mv.category, crate::data::moves::MoveCategory::Physical)
    }
}

/// Holder-centred view used by switch-in and residual hooks.
#[derive(Clone, Copy)]
pub struct TurnContext<'a> {
    pub holder: &'a Combatant,
    pub opponent: &'a Combatant,
    pub field: &'a GlobalField,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum KoRole {
    /// The holder knocked the other combatant out.
    Attacker,
    /// The holder was knocked out.
    Victim,
}

#[derive(Clone, Copy)]
pub struct KoContext<'a> {
    pub role: KoRole,
    pub holder: &'a Combatant,
    pub other: &'a Combatant,
    pub mv: &'a MoveTemplate,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum HookRole {
    Attacker,
    Defender,
}

/// Anything an ability can be immune to.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Affliction {
    Status(StatusKind),
    Confusion,
    Flinch,
}

/// A type immunity, plus what the holder gains from absorbing the hit.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Absorb {
    pub effects: Vec<EffectSpec>,
    pub volatile: Option<VolatileKind>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TypeChange {
    pub move_type: Option<Type>,
    pub user_types: Option<Vec<Type>>,
    pub power_modifier: f32,
}

pub trait AbilityHooks {
    fn on_switch_in(&self, _ctx: &TurnContext) -> Vec<EffectSpec> {
        Vec::new()
    }

    fn on_switch_out(&self, _holder: &Combatant) -> Vec<EffectSpec> {
        Vec::new()
    }

    /// Holder is the attacker.
    fn modify_outgoing_damage(&self, _ctx: &MoveContext) -> f32 {
        1.0
    }

    /// Holder is the defender.
    fn modify_incoming_damage(&self, _ctx: &MoveContext) -> f32 {
        1.0
    }

    /// Holder is the defender. `Some` makes the move fail against it.
    fn check_type_immunity(&self, _ctx: &MoveContext) -> Option<Absorb> {
        None
    }

    fn check_status_immunity(&self, _holder: &Combatant, _affliction: Affliction) -> bool {
        false
    }

    /// Only consulted for drops caused by the opponent.
    fn check_stat_drop_immunity(&self, _stat: BoostStat) -> bool {
        false
    }

    /// Holder is the defender, struck by a contact move.
    fn on_contact(&self, _ctx: &MoveContext) -> Vec<EffectSpec> {
        Vec::new()
    }

    /// Holder is the attacker, after its damaging move connected.
    fn on_after_attacking(&self, _ctx: &MoveContext) -> Vec<EffectSpec> {
        Vec::new()
    }

    fn on_ko(&self, _ctx: &KoContext) -> Vec<EffectSpec> {
        Vec::new()
    }

    fn on_start_of_turn(&self, _ctx: &TurnContext) -> Vec<EffectSpec> {
        Vec::new()
    }

    fn on_end_of_turn(&self, _ctx: &TurnContext) -> Vec<EffectSpec> {
        Vec::new()
    }

    fn modify_speed(&self, _holder: &Combatant, _field: &GlobalField) -> f32 {
        1.0
    }

    fn modify_accuracy(&self, _ctx: &MoveContext, _role: HookRole) -> f32 {
        1.0
    }

    /// Holder is the attacker.
    fn modify_crit_stage(&self, _ctx: &MoveContext) -> u8 {
        0
    }

    fn on_flinch(&self) -> Vec<EffectSpec> {
        Vec::new()
    }

    fn on_crit_received(&self) -> Vec<EffectSpec> {
        Vec::new()
    }

    /// Whether the holder prevents `opponent` from switching out.
    fn check_trapping(&self, _holder: &Combatant, _opponent: &Combatant, _field: &GlobalField) -> bool {
        false
    }

    fn modify_stab(&self, stab: f32) -> f32 {
        stab
    }

    /// Holder is the attacker, before the move resolves.
    fn check_type_change(&self, _holder: &Combatant, _mv: &MoveTemplate) -> Option<TypeChange> {
        None
    }

    /// Returns a fixed hit count overriding the random roll.
    fn modify_multi_hit(&self, _min: u8, _max: u8) -> Option<u8> {
        None
    }

    fn check_mold_breaker(&self) -> bool {
        false
    }

    /// Holder is the combatant whose stage is about to move.
    fn modify_stat_change(&self, delta: i8) -> i8 {
        delta
    }

    fn check_recoil_immunity(&self) -> bool {
        false
    }

    fn check_weather_immunity(&self, _weather: Weather) -> bool {
        false
    }

    fn modify_crit_damage(&self, multiplier: f32) -> f32 {
        multiplier
    }

    /// Survives a would-be KO at 1 HP when hit at full HP.
    fn prevents_ko_from_full(&self) -> bool {
        false
    }

    fn ignores_burn_penalty(&self) -> bool {
        false
    }

    /// No HP loss from anything but direct attacks.
    fn blocks_indirect_damage(&self) -> bool {
        false
    }

    fn heals_from_poison(&self) -> bool {
        false
    }
}
