//! Combines the hooks of both sides of one move interaction.
//!
//! The defender's hook is always queried before the attacker's. Multipliers compose by
//! product, vetoes by "any", so the result does not depend on which side answered first.
//! A mold-breaking attacker replaces the defender's hooks with [`NoAbility`] for the
//! whole interaction.

use super::handlers::NoAbility;
use super::hooks::{Absorb, AbilityHooks, HookRole, KoContext, KoRole, MoveContext};
use crate::data::effects::EffectSpec;
use crate::sim::combatant::Combatant;

/// Hooks for `combatant`, or none at all when they are suppressed.
pub fn hooks_for(combatant: &Combatant, suppressed: bool) -> &'static dyn AbilityHooks {
    if suppressed {
        &NoAbility
    } else {
        combatant.ability.hooks()
    }
}

#[derive(Clone, Copy)]
pub struct HookDispatcher {
    attacker: &'static dyn AbilityHooks,
    defender: &'static dyn AbilityHooks,
    mold_breaker: bool,
}

impl HookDispatcher {
    pub fn for_move(attacker: &Combatant, defender: &Combatant) -> Self {
        let attacker_hooks = attacker.ability.hooks();
        let mold_breaker = attacker_hooks.check_mold_breaker();
        if mold_breaker && defender.ability != super::Ability::None {
            tracing::debug!(
                attacker = %attacker.name,
                defender = %defender.name,
                suppressed = %defender.ability,
                "defender ability suppressed"
            );
        }
        Self {
            attacker: attacker_hooks,
            defender: hooks_for(defender, mold_breaker),
            mold_breaker,
        }
    }

    pub fn mold_breaker(&self) -> bool {
        self.mold_breaker
    }

    /// Product of the defender's incoming and the attacker's outgoing modifiers.
    pub fn damage_modifier(&self, ctx: &MoveContext) -> f32 {
        let incoming = self.defender.modify_incoming_damage(ctx);
        let outgoing = self.attacker.modify_outgoing_damage(ctx);
        incoming * outgoing
    }

    pub fn accuracy_modifier(&self, ctx: &MoveContext) -> f32 {
        let defender = self.defender.modify_accuracy(ctx, HookRole::Defender);
        let attacker = self.attacker.modify_accuracy(ctx, HookRole::Attacker);
        defender * attacker
    }

    pub fn type_immunity(&self, ctx: &MoveContext) -> Option<Absorb> {
        self.defender.check_type_immunity(ctx)
    }

    pub fn crit_stage_bonus(&self, ctx: &MoveContext) -> u8 {
        self.attacker.modify_crit_stage(ctx)
    }

    pub fn crit_multiplier(&self, base: f32) -> f32 {
        self.attacker.modify_crit_damage(base)
    }

    pub fn stab(&self, base: f32) -> f32 {
        self.attacker.modify_stab(base)
    }

    pub fn multi_hit(&self, min: u8, max: u8) -> Option<u8> {
        self.attacker.modify_multi_hit(min, max)
    }

    pub fn defender_endures(&self) -> bool {
        self.defender.prevents_ko_from_full()
    }

    pub fn attacker_ignores_burn(&self) -> bool {
        self.attacker.ignores_burn_penalty()
    }

    /// Effects from the defender's contact hooks, each targeted relative to the defender.
    pub fn contact_effects(&self, ctx: &MoveContext) -> Vec<EffectSpec> {
        self.defender.on_contact(ctx)
    }

    /// Effects from the attacker's post-attack hooks, targeted relative to the attacker.
    pub fn after_attacking_effects(&self, ctx: &MoveContext) -> Vec<EffectSpec> {
        self.attacker.on_after_attacking(ctx)
    }

    /// Knock-out reactions: victim first, then attacker.
    pub fn ko_effects(&self, ctx: &MoveContext) -> (Vec<EffectSpec>, Vec<EffectSpec>) {
        let victim = self.defender.on_ko(&KoContext {
            role: KoRole::Victim,
            holder: ctx.defender,
            other: ctx.attacker,
            mv: ctx.mv,
        });
        let attacker = self.attacker.on_ko(&KoContext {
            role: KoRole::Attacker,
            holder: ctx.attacker,
            other: ctx.defender,
            mv: ctx.mv,
        });
        (victim, attacker)
    }

    pub fn crit_received_effects(&self) -> Vec<EffectSpec> {
        self.defender.on_crit_received()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::moves::MoveCategory;
    use crate::data::types::Type;
    use crate::sim::abilities::Ability;
    use crate::sim::combatant::test_support::{attack, make_combatant};
    use crate::sim::field::GlobalField;

    #[test]
    fn mold_breaker_silences_defender_only() {
        let quake = attack("earthquake", Type::Ground, MoveCategory::Physical, 100);
        let plain = make_combatant("Excadrill", &[Type::Ground], vec![quake.clone()]);
        let mut breaker = plain.clone();
        breaker.ability = Ability::MoldBreaker;
        let mut defender = make_combatant("Gengar", &[Type::Ghost], vec![quake.clone()]);
        defender.ability = Ability::Levitate;
        let field = GlobalField::default();
        let ctx = MoveContext {
            attacker: &plain,
            defender: &defender,
            mv: &quake,
            move_type: Type::Ground,
            power: 100,
            effectiveness: 1.0,
            critical: false,
            field: &field,
        };
        assert!(HookDispatcher::for_move(&plain, &defender).type_immunity(&ctx).is_some());

        let ctx = MoveContext { attacker: &breaker, ..ctx };
        let dispatcher = HookDispatcher::for_move(&breaker, &defender);
        assert!(dispatcher.mold_breaker());
        assert!(dispatcher.type_immunity(&ctx).is_none());
    }

    #[test]
    fn modifiers_multiply_across_both_sides() {
        let punch = attack("fire punch", Type::Fire, MoveCategory::Physical, 75);
        let mut attacker = make_combatant("Hitmonchan", &[Type::Fighting], vec![punch.clone()]);
        let mut defender = make_combatant("Snorlax", &[Type::Normal], vec![punch.clone()]);
        attacker.ability = Ability::HugePower;
        defender.ability = Ability::ThickFat;
        let field = GlobalField::default();
        let ctx = MoveContext {
            attacker: &attacker,
            defender: &defender,
            mv: &punch,
            move_type: Type::Fire,
            power: 75,
            effectiveness: 1.0,
            critical: false,
            field: &field,
        };
        let dispatcher = HookDispatcher::for_move(&attacker, &defender);
        assert_eq!(dispatcher.damage_modifier(&ctx), 1.0);
    }
}
