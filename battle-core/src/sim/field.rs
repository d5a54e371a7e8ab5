use crate::data::effects::{Terrain, Weather};
use crate::data::types::Type;
use crate::sim::combatant::Combatant;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct WeatherState {
    pub kind: Weather,
    pub turns: u8,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct TerrainState {
    pub kind: Terrain,
    pub turns: u8,
}

/// Conditions shared by both sides.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct GlobalField {
    pub weather: Option<WeatherState>,
    pub terrain: Option<TerrainState>,
    pub gravity_turns: u8,
    /// Slower combatants move first within a bracket while this is non-zero.
    pub trick_room_turns: u8,
}

impl GlobalField {
    pub fn weather(&self) -> Option<Weather> {
        self.weather.map(|state| state.kind)
    }

    pub fn terrain(&self) -> Option<Terrain> {
        self.terrain.map(|state| state.kind)
    }

    pub fn gravity(&self) -> bool {
        self.gravity_turns > 0
    }

    pub fn trick_room(&self) -> bool {
        self.trick_room_turns > 0
    }
}

/// Side-local conditions. Screens and tailwind count down; hazards persist.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct SideConditions {
    pub reflect_turns: u8,
    pub light_screen_turns: u8,
    pub tailwind_turns: u8,
    pub spikes: u8,
    pub toxic_spikes: u8,
    pub stealth_rock: bool,
}

pub const MAX_SPIKES: u8 = 3;
pub const MAX_TOXIC_SPIKES: u8 = 2;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum SideTimer {
    Reflect,
    LightScreen,
    Tailwind,
}

impl SideConditions {
    /// Decrements the screen and tailwind counters and returns the ones that ran out.
    pub fn tick(&mut self) -> Vec<SideTimer> {
        let mut expired = Vec::new();
        for (timer, turns) in [
            (SideTimer::Reflect, &mut self.reflect_turns),
            (SideTimer::LightScreen, &mut self.light_screen_turns),
            (SideTimer::Tailwind, &mut self.tailwind_turns),
        ] {
            if *turns > 0 {
                *turns -= 1;
                if *turns == 0 {
                    expired.push(timer);
                }
            }
        }
        expired
    }

    pub fn has_hazards(&self) -> bool {
        self.spikes > 0 || self.toxic_spikes > 0 || self.stealth_rock
    }

    pub fn clear_hazards(&mut self) {
        self.spikes = 0;
        self.toxic_spikes = 0;
        self.stealth_rock = false;
    }
}

pub fn weather_damage_modifier(weather: Option<Weather>, move_type: Type) -> f32 {
    match weather {
        Some(Weather::Sun) => match move_type {
            Type::Fire => 1.5,
            Type::Water => 0.5,
            _ => 1.0,
        },
        Some(Weather::Rain) => match move_type {
            Type::Water => 1.5,
            Type::Fire => 0.5,
            _ => 1.0,
        },
        _ => 1.0,
    }
}

pub fn terrain_damage_modifier(
    terrain: Option<Terrain>,
    attacker: &Combatant,
    defender: &Combatant,
    move_type: Type,
    gravity: bool,
) -> f32 {
    match terrain {
        Some(Terrain::Electric) if move_type == Type::Electric && attacker.is_grounded(gravity) => 1.3,
        Some(Terrain::Grassy) if move_type == Type::Grass && attacker.is_grounded(gravity) => 1.3,
        Some(Terrain::Psychic) if move_type == Type::Psychic && attacker.is_grounded(gravity) => 1.3,
        Some(Terrain::Misty) if move_type == Type::Dragon && defender.is_grounded(gravity) => 0.5,
        _ => 1.0,
    }
}

/// Whether a combatant's elements shrug off weather chip damage.
pub fn weather_type_immune(weather: Weather, combatant: &Combatant) -> bool {
    match weather {
        Weather::Sandstorm => [Type::Rock, Type::Ground, Type::Steel]
            .iter()
            .any(|t| combatant.has_type(*t)),
        Weather::Hail => combatant.has_type(Type::Ice),
        Weather::Sun | Weather::Rain => true,
    }
}
