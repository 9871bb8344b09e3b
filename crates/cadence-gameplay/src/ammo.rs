//! Magazine and reload bookkeeping for ranged attacks.
//!
//! This module provides:
//! - Fire gating against the current magazine
//! - Reload countdown with auto-trigger on an empty magazine
//! - Runtime capacity changes (increase refills, decrease clamps)
//! - A reload-progress query for the presentation layer

use serde::{Deserialize, Serialize};

/// Magazine state of a ranged-attack component.
///
/// Invariant: `0 <= current_ammo <= max_ammo`. Firing is disallowed
/// while reloading or with an empty magazine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmmoState {
    max_ammo: u32,
    current_ammo: u32,
    is_reloading: bool,
    reload_timer: f32,
    reload_time: f32,
}

impl AmmoState {
    /// Creates a full magazine.
    #[must_use]
    pub fn new(max_ammo: u32, reload_time: f32) -> Self {
        Self {
            max_ammo,
            current_ammo: max_ammo,
            is_reloading: false,
            reload_timer: 0.0,
            reload_time: reload_time.max(0.0),
        }
    }

    /// Magazine capacity.
    #[must_use]
    pub const fn max_ammo(&self) -> u32 {
        self.max_ammo
    }

    /// Rounds left in the magazine.
    #[must_use]
    pub const fn current_ammo(&self) -> u32 {
        self.current_ammo
    }

    /// Whether a reload is in progress.
    #[must_use]
    pub const fn is_reloading(&self) -> bool {
        self.is_reloading
    }

    /// Seconds a full reload takes.
    #[must_use]
    pub const fn reload_time(&self) -> f32 {
        self.reload_time
    }

    /// Whether a shot would succeed right now.
    #[must_use]
    pub const fn can_fire(&self) -> bool {
        !self.is_reloading && self.current_ammo > 0
    }

    /// Consumes one round. Returns `false` while reloading or empty.
    pub fn try_fire(&mut self) -> bool {
        if !self.can_fire() {
            return false;
        }
        self.current_ammo -= 1;
        true
    }

    /// Advances the reload countdown.
    ///
    /// An empty magazine auto-triggers a reload, which consumes this
    /// tick's delta immediately; the reload finishes (full refill) in
    /// the tick its timer elapses.
    pub fn tick(&mut self, delta: f32) {
        if !self.is_reloading && self.current_ammo == 0 {
            self.start_reload();
        }
        if self.is_reloading {
            self.reload_timer -= delta;
            if self.reload_timer <= 0.0 {
                self.reload_timer = 0.0;
                self.current_ammo = self.max_ammo;
                self.is_reloading = false;
            }
        }
    }

    /// Changes the magazine capacity at runtime.
    ///
    /// An increase refills the magazine to the new maximum; a decrease
    /// clamps both the capacity (at 0) and the current rounds down.
    pub fn add_magazine_size(&mut self, amount: i32) {
        if amount == 0 {
            return;
        }
        if amount > 0 {
            self.max_ammo += amount as u32;
            self.current_ammo = self.max_ammo;
        } else {
            self.max_ammo = self.max_ammo.saturating_sub(amount.unsigned_abs());
            self.current_ammo = self.current_ammo.min(self.max_ammo);
        }
    }

    /// Adds (or drains) rounds without touching the capacity, clamped
    /// into `[0, max_ammo]`.
    pub fn add_ammo(&mut self, amount: i32) {
        if amount >= 0 {
            self.current_ammo = (self.current_ammo + amount as u32).min(self.max_ammo);
        } else {
            self.current_ammo = self.current_ammo.saturating_sub(amount.unsigned_abs());
        }
    }

    /// Reload completion fraction: 0 when idle, approaching 1 as the
    /// reload finishes.
    #[must_use]
    pub fn reload_progress(&self) -> f32 {
        if self.is_reloading && self.reload_time > 0.0 {
            1.0 - self.reload_timer / self.reload_time
        } else {
            0.0
        }
    }

    fn start_reload(&mut self) {
        // Never reload a magazine that is already full.
        if self.is_reloading || self.current_ammo >= self.max_ammo {
            return;
        }
        self.is_reloading = true;
        self.reload_timer = self.reload_time;
    }
}
