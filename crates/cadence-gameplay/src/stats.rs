//! Entity stat block with clamped mutation.
//!
//! This module provides:
//! - The five base stats (HP/MaxHP/DMG/ATKSPD/DEF/SPD)
//! - Clamping setters that uphold the stat invariants
//! - Damage and heal arithmetic
//! - Read-only queries for the presentation layer

use serde::{Deserialize, Serialize};

use crate::combat;

/// The numeric state of a combat entity.
///
/// Invariants (upheld by every setter):
/// - `0 <= hp <= max_hp`
/// - `max_hp >= 1`
/// - `dmg >= 0`, `atkspd >= 0`, `spd >= 0`
/// - `0 <= def <= 1` (damage-reduction fraction; 1.0 = full immunity)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StatBlock {
    /// Current hit points.
    hp: f32,
    /// Maximum hit points.
    max_hp: f32,
    /// Outgoing damage per hit.
    dmg: f32,
    /// Attack speed multiplier (divides the base fire cooldown).
    atkspd: f32,
    /// Damage-reduction fraction in [0, 1].
    def: f32,
    /// Movement speed.
    spd: f32,
}

impl Default for StatBlock {
    fn default() -> Self {
        Self {
            hp: 1.0,
            max_hp: 1.0,
            dmg: 0.0,
            atkspd: 0.0,
            def: 0.0,
            spd: 0.0,
        }
    }
}

impl StatBlock {
    /// Creates a stat block from designer base values.
    ///
    /// Equivalent to a default block followed by [`StatBlock::set_base`].
    #[must_use]
    pub fn new(hp: f32, dmg: f32, atkspd: f32, def: f32, spd: f32) -> Self {
        let mut stats = Self::default();
        stats.set_base(hp, dmg, atkspd, def, spd);
        stats
    }

    /// Sets all base values at once. Used once at entity initialization.
    ///
    /// `max_hp` becomes `hp` (floored at 1), current hp is filled to the
    /// maximum, and every other field passes through its clamp rule.
    /// Out-of-range inputs are clamped here, never propagated as errors.
    pub fn set_base(&mut self, hp: f32, dmg: f32, atkspd: f32, def: f32, spd: f32) {
        self.set_max_hp(hp);
        self.set_hp(hp);
        self.set_dmg(dmg);
        self.set_atkspd(atkspd);
        self.set_def(def);
        self.set_spd(spd);
    }

    /// Current hit points.
    #[must_use]
    pub const fn hp(&self) -> f32 {
        self.hp
    }

    /// Maximum hit points.
    #[must_use]
    pub const fn max_hp(&self) -> f32 {
        self.max_hp
    }

    /// Outgoing damage per hit.
    #[must_use]
    pub const fn dmg(&self) -> f32 {
        self.dmg
    }

    /// Attack speed multiplier.
    #[must_use]
    pub const fn atkspd(&self) -> f32 {
        self.atkspd
    }

    /// Damage-reduction fraction in [0, 1].
    #[must_use]
    pub const fn def(&self) -> f32 {
        self.def
    }

    /// Movement speed.
    #[must_use]
    pub const fn spd(&self) -> f32 {
        self.spd
    }

    /// Sets current hp, clamped into `[0, max_hp]`.
    pub fn set_hp(&mut self, value: f32) {
        self.hp = value.clamp(0.0, self.max_hp);
    }

    /// Sets maximum hp (floored at 1). Lowering it below the current hp
    /// clamps hp down immediately.
    pub fn set_max_hp(&mut self, value: f32) {
        self.max_hp = value.max(1.0);
        if self.hp > self.max_hp {
            self.hp = self.max_hp;
        }
    }

    /// Sets outgoing damage, floored at 0.
    pub fn set_dmg(&mut self, value: f32) {
        self.dmg = value.max(0.0);
    }

    /// Sets attack speed, floored at 0.
    pub fn set_atkspd(&mut self, value: f32) {
        self.atkspd = value.max(0.0);
    }

    /// Sets the damage-reduction fraction, clamped into `[0, 1]`.
    pub fn set_def(&mut self, value: f32) {
        self.def = value.clamp(0.0, 1.0);
    }

    /// Sets movement speed, floored at 0.
    pub fn set_spd(&mut self, value: f32) {
        self.spd = value.max(0.0);
    }

    /// Whether the entity is still alive.
    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.hp > 0.0
    }

    /// Current hp as a fraction of the maximum (0 when the maximum is 0).
    #[must_use]
    pub fn hp_percent(&self) -> f32 {
        if self.max_hp > 0.0 {
            self.hp / self.max_hp
        } else {
            0.0
        }
    }

    /// Applies incoming damage through the combat resolver.
    ///
    /// Returns the hp actually lost (0 when already dead).
    pub fn apply_damage(&mut self, raw_amount: f32) -> f32 {
        combat::resolve_damage(self, raw_amount).applied
    }

    /// Restores hp up to the maximum.
    ///
    /// Returns the hp actually gained (0 when dead or `amount <= 0`).
    pub fn heal(&mut self, amount: f32) -> f32 {
        if !self.is_alive() || amount <= 0.0 {
            return 0.0;
        }
        let before = self.hp;
        self.set_hp(self.hp + amount);
        self.hp - before
    }
}
