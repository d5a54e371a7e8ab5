//! Ability capabilities.
//!
//! Every ability is a tag in [`Ability`]; [`Ability::hooks`] maps each tag to exactly one
//! handler through an exhaustive match, so adding a tag without a handler does not compile.

pub mod dispatch;
pub mod handlers;
pub mod hooks;

use crate::data::effects::{BoostStat, FieldCondition, StatusKind, Weather};
use crate::data::types::{normalize_id, Type};
use crate::error::ConfigError;
use handlers::*;
pub use dispatch::HookDispatcher;
pub use hooks::{Absorb, Affliction, AbilityHooks, HookRole, KoContext, KoRole, MoveContext, TurnContext, TypeChange};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Ability {
    #[default]
    None,
    // switch-in
    Intimidate,
    Drizzle,
    Drought,
    SandStream,
    SnowWarning,
    ElectricSurge,
    GrassySurge,
    MistySurge,
    PsychicSurge,
    // switch-out
    NaturalCure,
    Regenerator,
    // outgoing damage
    HugePower,
    PurePower,
    Hustle,
    Guts,
    Blaze,
    Torrent,
    Overgrow,
    Swarm,
    Technician,
    IronFist,
    ToughClaws,
    SandForce,
    FlashFire,
    Adaptability,
    Sniper,
    SuperLuck,
    // move type change
    Pixilate,
    Aerilate,
    Refrigerate,
    Galvanize,
    Normalize,
    Protean,
    Libero,
    // incoming damage
    ThickFat,
    Filter,
    SolidRock,
    Multiscale,
    FurCoat,
    // type immunities
    Levitate,
    VoltAbsorb,
    WaterAbsorb,
    LightningRod,
    StormDrain,
    SapSipper,
    MotorDrive,
    WonderGuard,
    // status and stat immunities
    Limber,
    Insomnia,
    VitalSpirit,
    Immunity,
    WaterVeil,
    MagmaArmor,
    OwnTempo,
    InnerFocus,
    ClearBody,
    WhiteSmoke,
    HyperCutter,
    KeenEye,
    BigPecks,
    // contact and attack follow-ups
    Static,
    FlameBody,
    PoisonPoint,
    EffectSpore,
    RoughSkin,
    IronBarbs,
    Stench,
    PoisonTouch,
    Moxie,
    Aftermath,
    // residual
    SpeedBoost,
    ShedSkin,
    Hydration,
    PoisonHeal,
    BadDreams,
    IceBody,
    RainDish,
    // speed and accuracy
    SwiftSwim,
    Chlorophyll,
    SandRush,
    SlushRush,
    QuickFeet,
    CompoundEyes,
    SandVeil,
    SnowCloak,
    // reactions
    Steadfast,
    AngerPoint,
    // trapping
    ShadowTag,
    ArenaTrap,
    MagnetPull,
    // move shaping
    SkillLink,
    MoldBreaker,
    Teravolt,
    Turboblaze,
    Simple,
    Contrary,
    // damage prevention
    RockHead,
    Overcoat,
    MagicGuard,
    Sturdy,
}

static ABILITY_IDS: phf::Map<&'static str, Ability> = phf::phf_map! {
    "none" => Ability::None,
    "noability" => Ability::None,
    "intimidate" => Ability::Intimidate,
    "drizzle" => Ability::Drizzle,
    "drought" => Ability::Drought,
    "sandstream" => Ability::SandStream,
    "snowwarning" => Ability::SnowWarning,
    "electricsurge" => Ability::ElectricSurge,
    "grassysurge" => Ability::GrassySurge,
    "mistysurge" => Ability::MistySurge,
    "psychicsurge" => Ability::PsychicSurge,
    "naturalcure" => Ability::NaturalCure,
    "regenerator" => Ability::Regenerator,
    "hugepower" => Ability::HugePower,
    "purepower" => Ability::PurePower,
    "hustle" => Ability::Hustle,
    "guts" => Ability::Guts,
    "blaze" => Ability::Blaze,
    "torrent" => Ability::Torrent,
    "overgrow" => Ability::Overgrow,
    "swarm" => Ability::Swarm,
    "technician" => Ability::Technician,
    "ironfist" => Ability::IronFist,
    "toughclaws" => Ability::ToughClaws,
    "sandforce" => Ability::SandForce,
    "flashfire" => Ability::FlashFire,
    "adaptability" => Ability::Adaptability,
    "sniper" => Ability::Sniper,
    "superluck" => Ability::SuperLuck,
    "pixilate" => Ability::Pixilate,
    "aerilate" => Ability::Aerilate,
    "refrigerate" => Ability::Refrigerate,
    "galvanize" => Ability::Galvanize,
    "normalize" => Ability::Normalize,
    "protean" => Ability::Protean,
    "libero" => Ability::Libero,
    "thickfat" => Ability::ThickFat,
    "filter" => Ability::Filter,
    "solidrock" => Ability::SolidRock,
    "multiscale" => Ability::Multiscale,
    "furcoat" => Ability::FurCoat,
    "levitate" => Ability::Levitate,
    "voltabsorb" => Ability::VoltAbsorb,
    "waterabsorb" => Ability::WaterAbsorb,
    "lightningrod" => Ability::LightningRod,
    "stormdrain" => Ability::StormDrain,
    "sapsipper" => Ability::SapSipper,
    "motordrive" => Ability::MotorDrive,
    "wonderguard" => Ability::WonderGuard,
    "limber" => Ability::Limber,
    "insomnia" => Ability::Insomnia,
    "vitalspirit" => Ability::VitalSpirit,
    "immunity" => Ability::Immunity,
    "waterveil" => Ability::WaterVeil,
    "magmaarmor" => Ability::MagmaArmor,
    "owntempo" => Ability::OwnTempo,
    "innerfocus" => Ability::InnerFocus,
    "clearbody" => Ability::ClearBody,
    "whitesmoke" => Ability::WhiteSmoke,
    "hypercutter" => Ability::HyperCutter,
    "keeneye" => Ability::KeenEye,
    "bigpecks" => Ability::BigPecks,
    "static" => Ability::Static,
    "flamebody" => Ability::FlameBody,
    "poisonpoint" => Ability::PoisonPoint,
    "effectspore" => Ability::EffectSpore,
    "roughskin" => Ability::RoughSkin,
    "ironbarbs" => Ability::IronBarbs,
    "stench" => Ability::Stench,
    "poisontouch" => Ability::PoisonTouch,
    "moxie" => Ability::Moxie,
    "aftermath" => Ability::Aftermath,
    "speedboost" => Ability::SpeedBoost,
    "shedskin" => Ability::ShedSkin,
    "hydration" => Ability::Hydration,
    "poisonheal" => Ability::PoisonHeal,
    "baddreams" => Ability::BadDreams,
    "icebody" => Ability::IceBody,
    "raindish" => Ability::RainDish,
    "swiftswim" => Ability::SwiftSwim,
    "chlorophyll" => Ability::Chlorophyll,
    "sandrush" => Ability::SandRush,
    "slushrush" => Ability::SlushRush,
    "quickfeet" => Ability::QuickFeet,
    "compoundeyes" => Ability::CompoundEyes,
    "sandveil" => Ability::SandVeil,
    "snowcloak" => Ability::SnowCloak,
    "steadfast" => Ability::Steadfast,
    "angerpoint" => Ability::AngerPoint,
    "shadowtag" => Ability::ShadowTag,
    "arenatrap" => Ability::ArenaTrap,
    "magnetpull" => Ability::MagnetPull,
    "skilllink" => Ability::SkillLink,
    "moldbreaker" => Ability::MoldBreaker,
    "teravolt" => Ability::Teravolt,
    "turboblaze" => Ability::Turboblaze,
    "simple" => Ability::Simple,
    "contrary" => Ability::Contrary,
    "rockhead" => Ability::RockHead,
    "overcoat" => Ability::Overcoat,
    "magicguard" => Ability::MagicGuard,
    "sturdy" => Ability::Sturdy,
};

impl Ability {
    /// Accepts display names ("Huge Power") and ids ("hugepower", "huge_power").
    pub fn from_name(name: &str) -> Result<Ability, ConfigError> {
        ABILITY_IDS
            .get(normalize_id(name).as_str())
            .copied()
            .ok_or_else(|| ConfigError::UnknownAbility(name.to_string()))
    }

    /// The one handler for this tag.
    pub fn hooks(self) -> &'static dyn AbilityHooks {
        match self {
            Ability::None => &NoAbility,
            Ability::Intimidate => &Intimidate,
            Ability::Drizzle => &WeatherSetter(Weather::Rain),
            Ability::Drought => &WeatherSetter(Weather::Sun),
            Ability::SandStream => &WeatherSetter(Weather::Sandstorm),
            Ability::SnowWarning => &WeatherSetter(Weather::Hail),
            Ability::ElectricSurge => &TerrainSetter(FieldCondition::ElectricTerrain),
            Ability::GrassySurge => &TerrainSetter(FieldCondition::GrassyTerrain),
            Ability::MistySurge => &TerrainSetter(FieldCondition::MistyTerrain),
            Ability::PsychicSurge => &TerrainSetter(FieldCondition::PsychicTerrain),
            Ability::NaturalCure => &NaturalCure,
            Ability::Regenerator => &Regenerator,
            Ability::HugePower | Ability::PurePower => &PhysicalBoost(2.0),
            Ability::Hustle => &Hustle,
            Ability::Guts => &Guts,
            Ability::Blaze => &PinchBoost(Type::Fire),
            Ability::Torrent => &PinchBoost(Type::Water),
            Ability::Overgrow => &PinchBoost(Type::Grass),
            Ability::Swarm => &PinchBoost(Type::Bug),
            Ability::Technician => &Technician,
            Ability::IronFist => &IronFist,
            Ability::ToughClaws => &ToughClaws,
            Ability::SandForce => &SandForce,
            Ability::FlashFire => &FlashFire,
            Ability::Adaptability => &Adaptability,
            Ability::Sniper => &Sniper,
            Ability::SuperLuck => &SuperLuck,
            Ability::Pixilate => &TypeConverter(Type::Fairy),
            Ability::Aerilate => &TypeConverter(Type::Flying),
            Ability::Refrigerate => &TypeConverter(Type::Ice),
            Ability::Galvanize => &TypeConverter(Type::Electric),
            Ability::Normalize => &Normalize,
            Ability::Protean | Ability::Libero => &Protean,
            Ability::ThickFat => &ThickFat,
            Ability::Filter | Ability::SolidRock => &Filter,
            Ability::Multiscale => &Multiscale,
            Ability::FurCoat => &FurCoat,
            Ability::Levitate => &Levitate,
            Ability::VoltAbsorb => &HealAbsorb(Type::Electric),
            Ability::WaterAbsorb => &HealAbsorb(Type::Water),
            Ability::LightningRod => &BoostAbsorb(Type::Electric, BoostStat::Spa),
            Ability::StormDrain => &BoostAbsorb(Type::Water, BoostStat::Spa),
            Ability::SapSipper => &BoostAbsorb(Type::Grass, BoostStat::Atk),
            Ability::MotorDrive => &BoostAbsorb(Type::Electric, BoostStat::Spe),
            Ability::WonderGuard => &WonderGuard,
            Ability::Limber => &StatusImmunity(StatusKind::Paralysis),
            Ability::Insomnia | Ability::VitalSpirit => &StatusImmunity(StatusKind::Sleep),
            Ability::Immunity => &StatusImmunity(StatusKind::Poison),
            Ability::WaterVeil => &StatusImmunity(StatusKind::Burn),
            Ability::MagmaArmor => &StatusImmunity(StatusKind::Freeze),
            Ability::OwnTempo => &OwnTempo,
            Ability::InnerFocus => &InnerFocus,
            Ability::ClearBody | Ability::WhiteSmoke => &StatGuard(None),
            Ability::HyperCutter => &StatGuard(Some(BoostStat::Atk)),
            Ability::KeenEye => &StatGuard(Some(BoostStat::Accuracy)),
            Ability::BigPecks => &StatGuard(Some(BoostStat::Def)),
            Ability::Static => &ContactStatus(StatusKind::Paralysis),
            Ability::FlameBody => &ContactStatus(StatusKind::Burn),
            Ability::PoisonPoint => &ContactStatus(StatusKind::Poison),
            Ability::EffectSpore => &EffectSpore,
            Ability::RoughSkin | Ability::IronBarbs => &ContactDamage,
            Ability::Stench => &Stench,
            Ability::PoisonTouch => &PoisonTouch,
            Ability::Moxie => &Moxie,
            Ability::Aftermath => &Aftermath,
            Ability::SpeedBoost => &SpeedBoost,
            Ability::ShedSkin => &ShedSkin,
            Ability::Hydration => &Hydration,
            Ability::PoisonHeal => &PoisonHeal,
            Ability::BadDreams => &BadDreams,
            Ability::IceBody => &WeatherHeal(Weather::Hail),
            Ability::RainDish => &WeatherHeal(Weather::Rain),
            Ability::SwiftSwim => &WeatherSpeed(Weather::Rain),
            Ability::Chlorophyll => &WeatherSpeed(Weather::Sun),
            Ability::SandRush => &WeatherSpeed(Weather::Sandstorm),
            Ability::SlushRush => &WeatherSpeed(Weather::Hail),
            Ability::QuickFeet => &QuickFeet,
            Ability::CompoundEyes => &CompoundEyes,
            Ability::SandVeil => &WeatherEvasion(Weather::Sandstorm),
            Ability::SnowCloak => &WeatherEvasion(Weather::Hail),
            Ability::Steadfast => &Steadfast,
            Ability::AngerPoint => &AngerPoint,
            Ability::ShadowTag => &ShadowTag,
            Ability::ArenaTrap => &ArenaTrap,
            Ability::MagnetPull => &MagnetPull,
            Ability::SkillLink => &SkillLink,
            Ability::MoldBreaker | Ability::Teravolt | Ability::Turboblaze => &MoldBreaker,
            Ability::Simple => &Simple,
            Ability::Contrary => &Contrary,
            Ability::RockHead => &RockHead,
            Ability::Overcoat => &Overcoat,
            Ability::MagicGuard => &MagicGuard,
            Ability::Sturdy => &Sturdy,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Ability::None => "No Ability",
            Ability::Intimidate => "Intimidate",
            Ability::Drizzle => "Drizzle",
            Ability::Drought => "Drought",
            Ability::SandStream => "Sand Stream",
            Ability::SnowWarning => "Snow Warning",
            Ability::ElectricSurge => "Electric Surge",
            Ability::GrassySurge => "Grassy Surge",
            Ability::MistySurge => "Misty Surge",
            Ability::PsychicSurge => "Psychic Surge",
            Ability::NaturalCure => "Natural Cure",
            Ability::Regenerator => "Regenerator",
            Ability::HugePower => "Huge Power",
            Ability::PurePower => "Pure Power",
            Ability::Hustle => "Hustle",
            Ability::Guts => "Guts",
            Ability::Blaze => "Blaze",
            Ability::Torrent => "Torrent",
            Ability::Overgrow => "Overgrow",
            Ability::Swarm => "Swarm",
            Ability::Technician => "Technician",
            Ability::IronFist => "Iron Fist",
            Ability::ToughClaws => "Tough Claws",
            Ability::SandForce => "Sand Force",
            Ability::FlashFire => "Flash Fire",
            Ability::Adaptability => "Adaptability",
            Ability::Sniper => "Sniper",
            Ability::SuperLuck => "Super Luck",
            Ability::Pixilate => "Pixilate",
            Ability::Aerilate => "Aerilate",
            Ability::Refrigerate => "Refrigerate",
            Ability::Galvanize => "Galvanize",
            Ability::Normalize => "Normalize",
            Ability::Protean => "Protean",
            Ability::Libero => "Libero",
            Ability::ThickFat => "Thick Fat",
            Ability::Filter => "Filter",
            Ability::SolidRock => "Solid Rock",
            Ability::Multiscale => "Multiscale",
            Ability::FurCoat => "Fur Coat",
            Ability::Levitate => "Levitate",
            Ability::VoltAbsorb => "Volt Absorb",
            Ability::WaterAbsorb => "Water Absorb",
            Ability::LightningRod => "Lightning Rod",
            Ability::StormDrain => "Storm Drain",
            Ability::SapSipper => "Sap Sipper",
            Ability::MotorDrive => "Motor Drive",
            Ability::WonderGuard => "Wonder Guard",
            Ability::Limber => "Limber",
            Ability::Insomnia => "Insomnia",
            Ability::VitalSpirit => "Vital Spirit",
            Ability::Immunity => "Immunity",
            Ability::WaterVeil => "Water Veil",
            Ability::MagmaArmor => "Magma Armor",
            Ability::OwnTempo => "Own Tempo",
            Ability::InnerFocus => "Inner Focus",
            Ability::ClearBody => "Clear Body",
            Ability::WhiteSmoke => "White Smoke",
            Ability::HyperCutter => "Hyper Cutter",
            Ability::KeenEye => "Keen Eye",
            Ability::BigPecks => "Big Pecks",
            Ability::Static => "Static",
            Ability::FlameBody => "Flame Body",
            Ability::PoisonPoint => "Poison Point",
            Ability::EffectSpore => "Effect Spore",
            Ability::RoughSkin => "Rough Skin",
            Ability::IronBarbs => "Iron Barbs",
            Ability::Stench => "Stench",
            Ability::PoisonTouch => "Poison Touch",
            Ability::Moxie => "Moxie",
            Ability::Aftermath => "Aftermath",
            Ability::SpeedBoost => "Speed Boost",
            Ability::ShedSkin => "Shed Skin",
            Ability::Hydration => "Hydration",
            Ability::PoisonHeal => "Poison Heal",
            Ability::BadDreams => "Bad Dreams",
            Ability::IceBody => "Ice Body",
            Ability::RainDish => "Rain Dish",
            Ability::SwiftSwim => "Swift Swim",
            Ability::Chlorophyll => "Chlorophyll",
            Ability::SandRush => "Sand Rush",
            Ability::SlushRush => "Slush Rush",
            Ability::QuickFeet => "Quick Feet",
            Ability::CompoundEyes => "Compound Eyes",
            Ability::SandVeil => "Sand Veil",
            Ability::SnowCloak => "Snow Cloak",
            Ability::Steadfast => "Steadfast",
            Ability::AngerPoint => "Anger Point",
            Ability::ShadowTag => "Shadow Tag",
            Ability::ArenaTrap => "Arena Trap",
            Ability::MagnetPull => "Magnet Pull",
            Ability::SkillLink => "Skill Link",
            Ability::MoldBreaker => "Mold Breaker",
            Ability::Teravolt => "Teravolt",
            Ability::Turboblaze => "Turboblaze",
            Ability::Simple => "Simple",
            Ability::Contrary => "Contrary",
            Ability::RockHead => "Rock Head",
            Ability::Overcoat => "Overcoat",
            Ability::MagicGuard => "Magic Guard",
            Ability::Sturdy => "Sturdy",
        }
    }
}

impl fmt::Display for Ability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
