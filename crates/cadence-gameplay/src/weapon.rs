//! Ranged weapon cooldown and ammo gating.

use serde::{Deserialize, Serialize};

use crate::ammo::AmmoState;
use crate::combat;

/// Designer parameters of a ranged weapon.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeaponSpec {
    /// Cooldown between shots at ATKSPD 1.0, in seconds.
    #[serde(default = "WeaponSpec::default_fire_cooldown")]
    pub base_fire_cooldown: f32,
    /// Magazine capacity in rounds.
    #[serde(default = "WeaponSpec::default_magazine")]
    pub magazine: u32,
    /// Full reload duration in seconds.
    #[serde(default = "WeaponSpec::default_reload_time")]
    pub reload_time: f32,
}

impl Default for WeaponSpec {
    fn default() -> Self {
        Self {
            base_fire_cooldown: Self::default_fire_cooldown(),
            magazine: Self::default_magazine(),
            reload_time: Self::default_reload_time(),
        }
    }
}

impl WeaponSpec {
    const fn default_fire_cooldown() -> f32 {
        0.20
    }

    const fn default_magazine() -> u32 {
        10
    }

    const fn default_reload_time() -> f32 {
        2.0
    }
}

/// Per-weapon fire gate: a shot needs an elapsed fire timer *and* a
/// round in the magazine, and re-arms the timer with the shooter's
/// effective cooldown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FireControl {
    spec: WeaponSpec,
    fire_timer: f32,
    ammo: AmmoState,
}

impl FireControl {
    /// Creates a ready weapon with a full magazine.
    #[must_use]
    pub fn new(spec: WeaponSpec) -> Self {
        Self {
            spec,
            fire_timer: 0.0,
            ammo: AmmoState::new(spec.magazine, spec.reload_time),
        }
    }

    /// The weapon's designer parameters.
    #[must_use]
    pub const fn spec(&self) -> &WeaponSpec {
        &self.spec
    }

    /// Magazine state.
    #[must_use]
    pub const fn ammo(&self) -> &AmmoState {
        &self.ammo
    }

    /// Mutable magazine state (capacity modifiers, top-ups).
    pub fn ammo_mut(&mut self) -> &mut AmmoState {
        &mut self.ammo
    }

    /// Whether the fire timer has elapsed.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.fire_timer <= 0.0
    }

    /// Advances the fire timer and the reload countdown.
    pub fn tick(&mut self, delta: f32) {
        if self.fire_timer > 0.0 {
            self.fire_timer = (self.fire_timer - delta).max(0.0);
        }
        self.ammo.tick(delta);
    }

    /// Attempts a shot with the shooter's ATKSPD and zero-cooldown
    /// override. On success one round is consumed and the fire timer is
    /// re-armed with the effective cooldown.
    pub fn try_fire(&mut self, atkspd: f32, zero_cooldown: bool) -> bool {
        if !self.is_ready() {
            return false;
        }
        if !self.ammo.try_fire() {
            return false;
        }
        self.fire_timer =
            combat::effective_fire_cooldown(self.spec.base_fire_cooldown, atkspd, zero_cooldown);
        true
    }
}
