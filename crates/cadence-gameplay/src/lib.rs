//! # Cadence Gameplay
//!
//! Gameplay systems for Project Cadence.
//!
//! This crate provides the engine-independent simulation core:
//! - Entity stat blocks with clamped mutation
//! - Rarity-scaled permanent upgrades and timed perks
//! - Magazine/reload bookkeeping and fire gating
//! - Damage resolution and fire-cooldown arithmetic
//! - Entity composition with per-tick modifier expiry
//! - Boss phases, spawn schedules and room cycling
//! - Designer definition packs (TOML/JSON)
//! - An event surface for the presentation layer

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod ammo;
pub mod boss;
pub mod combat;
pub mod defs;
pub mod encounter;
pub mod entity;
pub mod events;
pub mod inventory;
pub mod modifier;
pub mod stats;
pub mod weapon;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::ammo::*;
    pub use crate::boss::*;
    pub use crate::combat::*;
    pub use crate::defs::*;
    pub use crate::encounter::*;
    pub use crate::entity::*;
    pub use crate::events::*;
    pub use crate::inventory::*;
    pub use crate::modifier::*;
    pub use crate::stats::*;
    pub use crate::weapon::*;
}

pub use prelude::*;
