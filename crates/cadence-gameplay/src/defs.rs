//! Item and archetype definition loading.
//!
//! This module provides:
//! - Designer-authored definition packs in TOML or JSON
//! - Validation on load (weight ranges, durations, base stats, ids)
//! - A registry with lookup by id
//! - Instantiation of definitions into live upgrades, perks and entities

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use cadence_common::SchemaVersion;

use crate::entity::{Archetype, Combatant};
use crate::modifier::{Perk, Rarity, StatPercents, Upgrade};
use crate::stats::StatBlock;
use crate::weapon::WeaponSpec;

/// Errors that can occur during definition loading.
#[derive(Debug, Error)]
pub enum DefError {
    /// Failed to read a definition file.
    #[error("failed to read definition file: {0}")]
    Read(#[from] std::io::Error),

    /// Failed to parse TOML.
    #[error("failed to parse definition TOML: {0}")]
    ParseToml(#[from] toml::de::Error),

    /// Failed to parse JSON.
    #[error("failed to parse definition JSON: {0}")]
    ParseJson(#[from] serde_json::Error),

    /// Pack was written with an incompatible format version.
    #[error("unsupported pack version {found} (current is {current})")]
    UnsupportedVersion {
        /// Version declared by the pack
        found: SchemaVersion,
        /// Version this build reads
        current: SchemaVersion,
    },

    /// Two definitions share an id.
    #[error("duplicate definition id: {0}")]
    DuplicateId(String),

    /// A definition failed validation.
    #[error("definition {id}: {reason}")]
    Invalid {
        /// Offending definition id
        id: String,
        /// What was wrong
        reason: String,
    },
}

/// Result type for definition loading operations.
pub type DefResult<T> = Result<T, DefError>;

fn default_pack_version() -> SchemaVersion {
    SchemaVersion::DEF_PACK
}

/// A parsed definition document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DefPack {
    /// Format version the pack was authored against.
    #[serde(default = "default_pack_version")]
    pub version: SchemaVersion,
    /// Permanent upgrade definitions.
    #[serde(default)]
    pub upgrades: Vec<UpgradeDef>,
    /// Timed perk definitions.
    #[serde(default)]
    pub perks: Vec<PerkDef>,
    /// Entity archetype definitions.
    #[serde(default)]
    pub archetypes: Vec<ArchetypeDef>,
}

/// Checks every contribution weight is inside `[0, 1]`.
fn validate_weights(id: &str, stats: &StatPercents) -> DefResult<()> {
    let fields = [
        ("hp", stats.hp),
        ("dmg", stats.dmg),
        ("atkspd", stats.atkspd),
        ("def", stats.def),
        ("spd", stats.spd),
    ];
    for (field, value) in fields {
        if !(0.0..=1.0).contains(&value) {
            return Err(DefError::Invalid {
                id: id.to_string(),
                reason: format!("{field} weight {value} outside [0, 1]"),
            });
        }
    }
    Ok(())
}

/// Designer parameters of a permanent upgrade.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpgradeDef {
    /// Stable id used for lookups.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Flavor text for the pickup popup.
    #[serde(default)]
    pub description: String,
    /// Per-stat contribution weights.
    #[serde(default)]
    pub stats: StatPercents,
    /// Flat magazine bonus before rarity scaling.
    #[serde(default)]
    pub magazine_bonus: i32,
}

impl UpgradeDef {
    fn validate(&self) -> DefResult<()> {
        validate_weights(&self.id, &self.stats)?;
        if self.magazine_bonus < 0 {
            return Err(DefError::Invalid {
                id: self.id.clone(),
                reason: format!("magazine bonus {} is negative", self.magazine_bonus),
            });
        }
        Ok(())
    }

    /// Builds a live upgrade at the rolled rarity.
    #[must_use]
    pub fn instantiate(&self, rarity: Rarity) -> Upgrade {
        Upgrade::new(self.name.clone(), rarity, self.stats).with_magazine_bonus(self.magazine_bonus)
    }
}

/// Designer parameters of a timed perk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerkDef {
    /// Stable id used for lookups.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Flavor text for the pickup popup.
    #[serde(default)]
    pub description: String,
    /// Per-stat contribution weights.
    #[serde(default)]
    pub stats: StatPercents,
    /// Countdown duration in seconds.
    pub duration: f32,
    /// Whether the perk zeroes the fire cooldown while active.
    #[serde(default)]
    pub zero_cooldown: bool,
    /// Flat magazine bonus before rarity scaling.
    #[serde(default)]
    pub magazine_bonus: i32,
}

impl PerkDef {
    fn validate(&self) -> DefResult<()> {
        validate_weights(&self.id, &self.stats)?;
        if self.duration <= 0.0 {
            return Err(DefError::Invalid {
                id: self.id.clone(),
                reason: format!("duration {} is not positive", self.duration),
            });
        }
        Ok(())
    }

    /// Builds a live perk at the rolled rarity.
    #[must_use]
    pub fn instantiate(&self, rarity: Rarity) -> Perk {
        let mut perk = Perk::new(self.name.clone(), rarity, self.stats, self.duration)
            .with_magazine_bonus(self.magazine_bonus);
        if self.zero_cooldown {
            perk = perk.with_zero_cooldown();
        }
        perk
    }
}

/// Designer parameters of an entity archetype.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArchetypeDef {
    /// Stable id used for lookups.
    pub id: String,
    /// Archetype slot this definition fills.
    pub role: Archetype,
    /// Base hit points.
    pub hp: f32,
    /// Base damage.
    #[serde(default)]
    pub dmg: f32,
    /// Base attack speed.
    #[serde(default)]
    pub atkspd: f32,
    /// Base defense fraction.
    #[serde(default)]
    pub def: f32,
    /// Base movement speed.
    #[serde(default)]
    pub spd: f32,
    /// Ranged weapon carried by this archetype, if any.
    #[serde(default)]
    pub weapon: Option<WeaponSpec>,
}

impl ArchetypeDef {
    fn validate(&self) -> DefResult<()> {
        if self.hp < 1.0 {
            return Err(DefError::Invalid {
                id: self.id.clone(),
                reason: format!("hp {} is below 1", self.hp),
            });
        }
        for (field, value) in [("dmg", self.dmg), ("atkspd", self.atkspd), ("spd", self.spd)] {
            if value < 0.0 {
                return Err(DefError::Invalid {
                    id: self.id.clone(),
                    reason: format!("{field} {value} is negative"),
                });
            }
        }
        if !(0.0..=1.0).contains(&self.def) {
            return Err(DefError::Invalid {
                id: self.id.clone(),
                reason: format!("def {} outside [0, 1]", self.def),
            });
        }
        Ok(())
    }

    /// Base stats described by this definition.
    #[must_use]
    pub fn stat_block(&self) -> StatBlock {
        StatBlock::new(self.hp, self.dmg, self.atkspd, self.def, self.spd)
    }

    /// Spawns a combatant with this definition's stats and weapon.
    #[must_use]
    pub fn spawn(&self) -> Combatant {
        Combatant::with_stats(self.role, self.stat_block(), self.weapon)
    }
}

/// Registry of validated definitions with lookup by id.
#[derive(Debug, Default)]
pub struct DefRegistry {
    upgrades: HashMap<String, UpgradeDef>,
    perks: HashMap<String, PerkDef>,
    archetypes: HashMap<String, ArchetypeDef>,
}

impl DefRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses and merges a TOML pack. Returns the number of definitions
    /// added.
    pub fn load_toml_str(&mut self, text: &str) -> DefResult<usize> {
        let pack: DefPack = toml::from_str(text)?;
        self.merge(pack)
    }

    /// Parses and merges a JSON pack. Returns the number of definitions
    /// added.
    pub fn load_json_str(&mut self, text: &str) -> DefResult<usize> {
        let pack: DefPack = serde_json::from_str(text)?;
        self.merge(pack)
    }

    /// Reads and merges a TOML pack from disk.
    pub fn load_toml_file(&mut self, path: impl AsRef<Path>) -> DefResult<usize> {
        let path = path.as_ref();
        info!("loading definition pack: {}", path.display());
        let text = fs::read_to_string(path)?;
        self.load_toml_str(&text)
    }

    /// Merges a parsed pack after version and per-definition validation.
    pub fn merge(&mut self, pack: DefPack) -> DefResult<usize> {
        let current = SchemaVersion::DEF_PACK;
        if !current.can_read(&pack.version) {
            return Err(DefError::UnsupportedVersion {
                found: pack.version,
                current,
            });
        }

        let mut added = 0;

        for def in pack.upgrades {
            def.validate()?;
            if self.upgrades.contains_key(&def.id) {
                return Err(DefError::DuplicateId(def.id));
            }
            if def.stats.is_zero() && def.magazine_bonus == 0 {
                warn!("upgrade {} grants nothing", def.id);
            }
            debug!("registered upgrade: {}", def.id);
            self.upgrades.insert(def.id.clone(), def);
            added += 1;
        }

        for def in pack.perks {
            def.validate()?;
            if self.perks.contains_key(&def.id) {
                return Err(DefError::DuplicateId(def.id));
            }
            debug!("registered perk: {}", def.id);
            self.perks.insert(def.id.clone(), def);
            added += 1;
        }

        for def in pack.archetypes {
            def.validate()?;
            if self.archetypes.contains_key(&def.id) {
                return Err(DefError::DuplicateId(def.id));
            }
            debug!("registered archetype: {}", def.id);
            self.archetypes.insert(def.id.clone(), def);
            added += 1;
        }

        info!("definition pack merged: {added} definitions");
        Ok(added)
    }

    /// Looks up an upgrade definition by id.
    #[must_use]
    pub fn upgrade(&self, id: &str) -> Option<&UpgradeDef> {
        self.upgrades.get(id)
    }

    /// Looks up a perk definition by id.
    #[must_use]
    pub fn perk(&self, id: &str) -> Option<&PerkDef> {
        self.perks.get(id)
    }

    /// Looks up an archetype definition by id.
    #[must_use]
    pub fn archetype(&self, id: &str) -> Option<&ArchetypeDef> {
        self.archetypes.get(id)
    }

    /// Total number of registered definitions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.upgrades.len() + self.perks.len() + self.archetypes.len()
    }

    /// Whether the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PACK_TOML: &str = r#"
        [[upgrades]]
        id = "hollow_point"
        name = "Hollow Point"
        description = "Rounds that tear through armor."

        [upgrades.stats]
        dmg = 1.0

        [[upgrades]]
        id = "extended_mag"
        name = "Extended Mag"
        magazine_bonus = 10

        [[perks]]
        id = "overclock"
        name = "Overclock"
        duration = 8.0
        zero_cooldown = true

        [[archetypes]]
        id = "rusher"
        role = "melee_enemy"
        hp = 60.0
        dmg = 15.0
        atkspd = 1.0
        spd = 80.0
    "#;

    #[test]
    fn test_load_toml_pack() {
        let mut registry = DefRegistry::new();
        let added = registry.load_toml_str(PACK_TOML).expect("pack is valid");

        assert_eq!(added, 4);
        assert_eq!(registry.len(), 4);
        assert!(registry.upgrade("hollow_point").is_some());
        assert!(registry.perk("overclock").is_some());
        assert!(registry.archetype("rusher").is_some());
        assert!(registry.upgrade("missing").is_none());
    }

    #[test]
    fn test_load_json_pack() {
        let json = r#"{
            "perks": [
                {
                    "id": "adrenaline",
                    "name": "Adrenaline",
                    "stats": { "spd": 1.0 },
                    "duration": 10.0
                }
            ]
        }"#;

        let mut registry = DefRegistry::new();
        registry.load_json_str(json).expect("pack is valid");

        let def = registry.perk("adrenaline").expect("registered");
        assert_eq!(def.stats.spd, 1.0);
        assert!(!def.zero_cooldown);
    }

    #[test]
    fn test_instantiated_upgrade_matches_definition() {
        let mut registry = DefRegistry::new();
        registry.load_toml_str(PACK_TOML).expect("pack is valid");

        let def = registry.upgrade("hollow_point").expect("registered");
        let mut upgrade = def.instantiate(Rarity::Rare);

        let base = StatBlock::new(100.0, 10.0, 1.0, 0.0, 100.0);
        let mut stats = base;
        upgrade.apply(&mut stats, &base, None);
        assert_eq!(stats.dmg(), 11.0);
    }

    #[test]
    fn test_instantiated_perk_carries_flags() {
        let mut registry = DefRegistry::new();
        registry.load_toml_str(PACK_TOML).expect("pack is valid");

        let perk = registry
            .perk("overclock")
            .expect("registered")
            .instantiate(Rarity::Epic);
        assert!(perk.zero_cooldown());
        assert_eq!(perk.duration(), 8.0);
    }

    #[test]
    fn test_archetype_spawn() {
        let mut registry = DefRegistry::new();
        registry.load_toml_str(PACK_TOML).expect("pack is valid");

        let rusher = registry.archetype("rusher").expect("registered").spawn();
        assert_eq!(rusher.archetype(), Archetype::MeleeEnemy);
        assert_eq!(rusher.stats().max_hp(), 60.0);
        assert!(rusher.weapon().is_none());
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let mut registry = DefRegistry::new();
        registry.load_toml_str(PACK_TOML).expect("pack is valid");

        let result = registry.load_toml_str(
            r#"
            [[upgrades]]
            id = "hollow_point"
            name = "Hollow Point Again"
            "#,
        );
        assert!(matches!(result, Err(DefError::DuplicateId(id)) if id == "hollow_point"));
    }

    #[test]
    fn test_out_of_range_weight_rejected() {
        let mut registry = DefRegistry::new();
        let result = registry.load_toml_str(
            r#"
            [[upgrades]]
            id = "broken"
            name = "Broken"

            [upgrades.stats]
            dmg = 1.5
            "#,
        );
        assert!(matches!(result, Err(DefError::Invalid { .. })));
    }

    #[test]
    fn test_nonpositive_duration_rejected() {
        let mut registry = DefRegistry::new();
        let result = registry.load_json_str(
            r#"{ "perks": [{ "id": "p", "name": "P", "duration": 0.0 }] }"#,
        );
        assert!(matches!(result, Err(DefError::Invalid { .. })));
    }

    #[test]
    fn test_low_hp_archetype_rejected() {
        let mut registry = DefRegistry::new();
        let result = registry.load_toml_str(
            r#"
            [[archetypes]]
            id = "ghost"
            role = "ranged_enemy"
            hp = 0.0
            "#,
        );
        assert!(matches!(result, Err(DefError::Invalid { .. })));
    }

    #[test]
    fn test_incompatible_version_rejected() {
        let mut registry = DefRegistry::new();
        let result = registry.load_toml_str(
            r#"
            [version]
            major = 2
            minor = 0
            patch = 0
            "#,
        );
        assert!(matches!(result, Err(DefError::UnsupportedVersion { .. })));
    }

    #[test]
    fn test_missing_pack_file() {
        let mut registry = DefRegistry::new();
        let result = registry.load_toml_file("definitely/not/here.toml");
        assert!(matches!(result, Err(DefError::Read(_))));
    }
}
