//! Boss phase state machine and guardian shield gate.
//!
//! The boss fight runs in three phases keyed off the boss's hp fraction
//! and only becomes damageable once every guardian in the arena is dead.
//! Phase transitions are monotonic: healing back above a threshold never
//! reverts an earlier phase.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::combat::{self, DamageOutcome};
use crate::stats::StatBlock;

/// Phase of the boss fight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BossPhase {
    /// Opening phase (full health).
    One,
    /// Mid phase.
    Two,
    /// Final phase.
    Three,
}

/// Phase and shield bookkeeping for a boss entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BossState {
    phase: BossPhase,
    guardians_alive: u32,
    phase2_threshold: f32,
    phase3_threshold: f32,
}

impl BossState {
    /// Creates a phase-one boss shielded by `guardians` arena guardians
    /// (0 spawns it vulnerable).
    #[must_use]
    pub fn new(guardians: u32) -> Self {
        Self {
            phase: BossPhase::One,
            guardians_alive: guardians,
            phase2_threshold: 0.6,
            phase3_threshold: 0.2,
        }
    }

    /// Overrides the hp fractions below which phases two and three begin.
    #[must_use]
    pub fn with_thresholds(mut self, phase2: f32, phase3: f32) -> Self {
        self.phase2_threshold = phase2.clamp(0.0, 1.0);
        self.phase3_threshold = phase3.clamp(0.0, 1.0);
        self
    }

    /// Current phase.
    #[must_use]
    pub const fn phase(&self) -> BossPhase {
        self.phase
    }

    /// Guardians still alive.
    #[must_use]
    pub const fn guardians_alive(&self) -> u32 {
        self.guardians_alive
    }

    /// Whether the boss is still immune to damage.
    #[must_use]
    pub const fn is_shielded(&self) -> bool {
        self.guardians_alive > 0
    }

    /// Records a guardian death. Returns `true` when this was the last
    /// guardian and the shield just dropped.
    pub fn guardian_died(&mut self) -> bool {
        if self.guardians_alive == 0 {
            return false;
        }
        self.guardians_alive -= 1;
        if self.guardians_alive == 0 {
            info!("boss shield broken");
            return true;
        }
        false
    }

    /// Advances the phase from the boss's current hp fraction.
    ///
    /// Returns the phase entered on this observation, if any.
    pub fn observe_hp(&mut self, hp_percent: f32) -> Option<BossPhase> {
        if hp_percent < self.phase3_threshold && self.phase != BossPhase::Three {
            self.phase = BossPhase::Three;
            info!("boss entering phase 3");
            return Some(BossPhase::Three);
        }
        if hp_percent < self.phase2_threshold && self.phase == BossPhase::One {
            self.phase = BossPhase::Two;
            info!("boss entering phase 2");
            return Some(BossPhase::Two);
        }
        None
    }

    /// Applies incoming damage through the shield gate: a zero outcome
    /// while any guardian lives, normal resolution otherwise.
    pub fn resolve_damage(&self, stats: &mut StatBlock, raw_damage: f32) -> DamageOutcome {
        if self.is_shielded() {
            return DamageOutcome::none();
        }
        combat::resolve_damage(stats, raw_damage)
    }
}
