//! Rarity-scaled stat modifiers.
//!
//! This module provides:
//! - Rarity tiers with fixed magnitude multipliers and drop weights
//! - Permanent modifiers (upgrades) applied once at pickup
//! - Timed modifiers (perks) with refresh-on-reapply and expiry reversal
//!
//! Both variants compute their deltas from the owning entity's *base*
//! stat snapshot and cache them, so removal subtracts exactly what was
//! added regardless of any stat drift in between.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::ammo::AmmoState;
use crate::stats::StatBlock;

/// Rarity tier of a dropped modifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rarity {
    /// Common drop (55% weight).
    Uncommon,
    /// Solid drop (30% weight).
    Rare,
    /// Strong drop (10% weight).
    Epic,
    /// Top-tier drop (5% weight).
    Legendary,
}

impl Rarity {
    /// All tiers, weakest first.
    pub const ALL: [Self; 4] = [Self::Uncommon, Self::Rare, Self::Epic, Self::Legendary];

    /// Magnitude multiplier for this tier.
    #[must_use]
    pub const fn multiplier(self) -> f32 {
        match self {
            Self::Uncommon => 0.05,
            Self::Rare => 0.10,
            Self::Epic => 0.20,
            Self::Legendary => 0.35,
        }
    }

    /// Maps a roll in `[0, 100)` onto a tier using the drop weights
    /// 55/30/10/5.
    #[must_use]
    pub fn from_roll(roll: f32) -> Self {
        if roll < 55.0 {
            Self::Uncommon
        } else if roll < 85.0 {
            Self::Rare
        } else if roll < 95.0 {
            Self::Epic
        } else {
            Self::Legendary
        }
    }

    /// Rolls a random tier with the standard drop weights.
    #[must_use]
    pub fn roll(rng: &mut fastrand::Rng) -> Self {
        Self::from_roll(rng.f32() * 100.0)
    }
}

impl std::fmt::Display for Rarity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Uncommon => "Uncommon",
            Self::Rare => "Rare",
            Self::Epic => "Epic",
            Self::Legendary => "Legendary",
        };
        write!(f, "{name}")
    }
}

/// Per-stat contribution weights of a modifier, each in `[0, 1]`.
///
/// A weight of 0 leaves the stat untouched; 1 grants the full
/// rarity-scaled bonus for that stat.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct StatPercents {
    /// Max-hp contribution weight.
    #[serde(default)]
    pub hp: f32,
    /// Damage contribution weight.
    #[serde(default)]
    pub dmg: f32,
    /// Attack-speed contribution weight.
    #[serde(default)]
    pub atkspd: f32,
    /// Defense contribution weight (applied as a flat fraction).
    #[serde(default)]
    pub def: f32,
    /// Movement-speed contribution weight.
    #[serde(default)]
    pub spd: f32,
}

impl StatPercents {
    /// No contributions.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the max-hp weight (clamped to `[0, 1]`).
    #[must_use]
    pub fn with_hp(mut self, weight: f32) -> Self {
        self.hp = weight.clamp(0.0, 1.0);
        self
    }

    /// Sets the damage weight (clamped to `[0, 1]`).
    #[must_use]
    pub fn with_dmg(mut self, weight: f32) -> Self {
        self.dmg = weight.clamp(0.0, 1.0);
        self
    }

    /// Sets the attack-speed weight (clamped to `[0, 1]`).
    #[must_use]
    pub fn with_atkspd(mut self, weight: f32) -> Self {
        self.atkspd = weight.clamp(0.0, 1.0);
        self
    }

    /// Sets the defense weight (clamped to `[0, 1]`).
    #[must_use]
    pub fn with_def(mut self, weight: f32) -> Self {
        self.def = weight.clamp(0.0, 1.0);
        self
    }

    /// Sets the movement-speed weight (clamped to `[0, 1]`).
    #[must_use]
    pub fn with_spd(mut self, weight: f32) -> Self {
        self.spd = weight.clamp(0.0, 1.0);
        self
    }

    /// Whether every weight is zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.hp == 0.0 && self.dmg == 0.0 && self.atkspd == 0.0 && self.def == 0.0 && self.spd == 0.0
    }
}

/// Absolute deltas a modifier added to a stat block, cached at
/// application time so removal is exact.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AppliedDeltas {
    /// Max-hp (and current hp) increase.
    pub hp: f32,
    /// Damage increase.
    pub dmg: f32,
    /// Attack-speed increase.
    pub atkspd: f32,
    /// Defense increase (flat fraction).
    pub def: f32,
    /// Movement-speed increase.
    pub spd: f32,
    /// Magazine-capacity increase (rounds).
    pub magazine: i32,
}

impl AppliedDeltas {
    /// Whether nothing was applied.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        *self == Self::default()
    }
}

/// Magazine-capacity delta for a flat bonus at the given rarity
/// multiplier: `floor(flat * (1 + mult))`, but always at least one round
/// more than the flat bonus itself.
fn magazine_delta(flat: i32, multiplier: f32) -> i32 {
    let scaled = (flat as f32 * (1.0 + multiplier)).floor() as i32;
    scaled.max(flat + 1)
}

/// Computes the deltas a modifier grants against a base stat snapshot.
///
/// Stat deltas are `base * multiplier * weight`; DEF is a flat fraction
/// `multiplier * weight` because its baseline is itself a fraction.
fn compute_deltas(
    base: &StatBlock,
    rarity: Rarity,
    percents: &StatPercents,
    mag_size_flat: i32,
) -> AppliedDeltas {
    let mult = rarity.multiplier();
    AppliedDeltas {
        hp: if percents.hp > 0.0 {
            base.max_hp() * mult * percents.hp
        } else {
            0.0
        },
        dmg: if percents.dmg > 0.0 {
            base.dmg() * mult * percents.dmg
        } else {
            0.0
        },
        atkspd: if percents.atkspd > 0.0 {
            base.atkspd() * mult * percents.atkspd
        } else {
            0.0
        },
        def: if percents.def > 0.0 {
            mult * percents.def
        } else {
            0.0
        },
        spd: if percents.spd > 0.0 {
            base.spd() * mult * percents.spd
        } else {
            0.0
        },
        magazine: if mag_size_flat > 0 {
            magazine_delta(mag_size_flat, mult)
        } else {
            0
        },
    }
}

fn apply_deltas(stats: &mut StatBlock, ammo: Option<&mut AmmoState>, deltas: &AppliedDeltas) {
    stats.set_max_hp(stats.max_hp() + deltas.hp);
    stats.set_hp(stats.hp() + deltas.hp);
    stats.set_dmg(stats.dmg() + deltas.dmg);
    stats.set_atkspd(stats.atkspd() + deltas.atkspd);
    stats.set_def(stats.def() + deltas.def);
    stats.set_spd(stats.spd() + deltas.spd);
    if let Some(ammo) = ammo {
        if deltas.magazine != 0 {
            ammo.add_magazine_size(deltas.magazine);
        }
    }
}

fn remove_deltas(stats: &mut StatBlock, ammo: Option<&mut AmmoState>, deltas: &AppliedDeltas) {
    // Lowering max hp clamps current hp back into range.
    stats.set_max_hp(stats.max_hp() - deltas.hp);
    stats.set_dmg(stats.dmg() - deltas.dmg);
    stats.set_atkspd(stats.atkspd() - deltas.atkspd);
    stats.set_def(stats.def() - deltas.def);
    stats.set_spd(stats.spd() - deltas.spd);
    if let Some(ammo) = ammo {
        if deltas.magazine != 0 {
            ammo.add_magazine_size(-deltas.magazine);
        }
    }
}

/// A permanent, rarity-scaled stat modifier acquired once at pickup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Upgrade {
    name: String,
    rarity: Rarity,
    percents: StatPercents,
    mag_size_flat: i32,
    applied: AppliedDeltas,
}

impl Upgrade {
    /// Creates an upgrade that has not been applied yet.
    #[must_use]
    pub fn new(name: impl Into<String>, rarity: Rarity, percents: StatPercents) -> Self {
        Self {
            name: name.into(),
            rarity,
            percents,
            mag_size_flat: 0,
            applied: AppliedDeltas::default(),
        }
    }

    /// Adds a flat magazine-capacity bonus (scaled by rarity on apply).
    #[must_use]
    pub fn with_magazine_bonus(mut self, rounds: i32) -> Self {
        self.mag_size_flat = rounds;
        self
    }

    /// Display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rarity tier.
    #[must_use]
    pub const fn rarity(&self) -> Rarity {
        self.rarity
    }

    /// Contribution weights.
    #[must_use]
    pub const fn percents(&self) -> &StatPercents {
        &self.percents
    }

    /// Flat magazine bonus before rarity scaling.
    #[must_use]
    pub const fn magazine_bonus(&self) -> i32 {
        self.mag_size_flat
    }

    /// Deltas cached by the last apply (zeroed when not applied).
    #[must_use]
    pub const fn applied_deltas(&self) -> &AppliedDeltas {
        &self.applied
    }

    /// Applies this upgrade to `stats`, computing deltas from the frozen
    /// `base` snapshot so repeated upgrades of the same kind add equal
    /// absolute amounts. Applying an already-applied upgrade is a no-op.
    pub fn apply(&mut self, stats: &mut StatBlock, base: &StatBlock, ammo: Option<&mut AmmoState>) {
        if !self.applied.is_zero() {
            return;
        }
        self.applied = compute_deltas(base, self.rarity, &self.percents, self.mag_size_flat);
        apply_deltas(stats, ammo, &self.applied);
        debug!("applied {} upgrade: {}", self.rarity, self.name);
    }

    /// Subtracts the cached deltas. Idempotent: once the cache is zeroed
    /// a second call has no further effect.
    pub fn remove(&mut self, stats: &mut StatBlock, ammo: Option<&mut AmmoState>) {
        if self.applied.is_zero() {
            return;
        }
        remove_deltas(stats, ammo, &self.applied);
        self.applied = AppliedDeltas::default();
        debug!("removed {} upgrade: {}", self.rarity, self.name);
    }
}

/// A temporary, rarity-scaled stat modifier with a countdown duration.
///
/// State machine: Inactive → Active (first apply) → Active, refreshed
/// (reapply while active) → Inactive (tick expiry, followed by
/// [`Perk::remove`]). No other transitions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Perk {
    name: String,
    rarity: Rarity,
    percents: StatPercents,
    mag_size_flat: i32,
    duration: f32,
    zero_cooldown: bool,
    remaining: f32,
    active: bool,
    stats_applied: bool,
    applied: AppliedDeltas,
}

impl Perk {
    /// Creates an inactive perk.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        rarity: Rarity,
        percents: StatPercents,
        duration: f32,
    ) -> Self {
        Self {
            name: name.into(),
            rarity,
            percents,
            mag_size_flat: 0,
            duration: duration.max(0.0),
            zero_cooldown: false,
            remaining: 0.0,
            active: false,
            stats_applied: false,
            applied: AppliedDeltas::default(),
        }
    }

    /// Adds a flat magazine-capacity bonus (scaled by rarity on apply).
    #[must_use]
    pub fn with_magazine_bonus(mut self, rounds: i32) -> Self {
        self.mag_size_flat = rounds;
        self
    }

    /// Marks this perk as granting a zero fire cooldown while active.
    #[must_use]
    pub fn with_zero_cooldown(mut self) -> Self {
        self.zero_cooldown = true;
        self
    }

    /// Display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rarity tier.
    #[must_use]
    pub const fn rarity(&self) -> Rarity {
        self.rarity
    }

    /// Full duration in seconds.
    #[must_use]
    pub const fn duration(&self) -> f32 {
        self.duration
    }

    /// Seconds left before expiry (0 when inactive).
    #[must_use]
    pub const fn remaining_time(&self) -> f32 {
        self.remaining
    }

    /// Whether the perk is currently counting down.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// Whether this perk grants a zero fire cooldown while active.
    #[must_use]
    pub const fn zero_cooldown(&self) -> bool {
        self.zero_cooldown
    }

    /// Applies the perk, or refreshes its timer if it is already active.
    ///
    /// A refresh only resets `remaining_time` to the full duration; the
    /// live stats are untouched because the deltas are already in place.
    pub fn apply(&mut self, stats: &mut StatBlock, base: &StatBlock, ammo: Option<&mut AmmoState>) {
        if self.active && self.stats_applied {
            self.remaining = self.duration;
            debug!("refreshed perk: {} ({}s)", self.name, self.duration);
            return;
        }

        self.applied = compute_deltas(base, self.rarity, &self.percents, self.mag_size_flat);
        apply_deltas(stats, ammo, &self.applied);
        self.stats_applied = true;
        self.active = true;
        self.remaining = self.duration;
        debug!("applied perk: {} ({}s)", self.name, self.duration);
    }

    /// Advances the countdown. Returns `true` exactly when the perk
    /// transitions from active to expired on this tick; the caller is
    /// then responsible for invoking [`Perk::remove`].
    pub fn tick(&mut self, delta: f32) -> bool {
        if !self.active {
            return false;
        }
        self.remaining -= delta;
        if self.remaining <= 0.0 {
            self.remaining = 0.0;
            self.active = false;
            return true;
        }
        false
    }

    /// Subtracts the cached deltas. Guarded so a second call (or a call
    /// on a perk whose stats were never applied) is a no-op.
    pub fn remove(&mut self, stats: &mut StatBlock, ammo: Option<&mut AmmoState>) {
        if !self.stats_applied {
            return;
        }
        remove_deltas(stats, ammo, &self.applied);
        self.applied = AppliedDeltas::default();
        self.stats_applied = false;
        self.active = false;
        self.remaining = 0.0;
        debug!("removed perk: {}", self.name);
    }
}
