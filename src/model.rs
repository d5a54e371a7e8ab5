use anyhow::Context;
use battle_core::prelude::*;
use battle_core::sim::state::ItemStack;
use serde::Deserialize;

/// Two rosters of combatant specs. Ids are resolved through a [`ContentStore`].
#[derive(Debug, Clone, Deserialize)]
pub struct RosterFile {
    pub side_a: Roster,
    pub side_b: Roster,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Roster {
    #[serde(default)]
    pub name: Option<String>,
    pub members: Vec<CombatantSpec>,
    #[serde(default)]
    pub items: Vec<ItemEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ItemEntry {
    pub id: String,
    #[serde(default = "default_count")]
    pub count: u8,
}

fn default_count() -> u8 {
    1
}

impl Roster {
    pub fn build_side(&self, store: &dyn ContentStore, id: SideId) -> anyhow::Result<Side> {
        let bench = self
            .members
            .iter()
            .enumerate()
            .map(|(idx, spec)| {
                Combatant::from_spec(store, spec)
                    .with_context(|| format!("{id} member #{idx} ({})", spec.species))
            })
            .collect::<anyhow::Result<Vec<_>>>()?;
        let inventory = self
            .items
            .iter()
            .map(|entry| {
                let template = store
                    .item_template(&entry.id)
                    .with_context(|| format!("{id} bag item `{}`", entry.id))?;
                Ok(ItemStack {
                    template,
                    count: entry.count,
                })
            })
            .collect::<anyhow::Result<Vec<_>>>()?;
        let name = self.name.clone().unwrap_or_else(|| id.to_string());
        Ok(Side::new(id, name, bench)?.with_inventory(inventory))
    }
}

impl RosterFile {
    /// Fresh battle between the two rosters. Every simulated battle starts from a clone of this.
    pub fn build_state(&self, store: &dyn ContentStore, config: BattleConfig) -> anyhow::Result<BattleState> {
        let side_a = self.side_a.build_side(store, SideId::A)?;
        let side_b = self.side_b.build_side(store, SideId::B)?;
        Ok(BattleState::new(side_a, side_b, config)?)
    }
}
