//! Combat entity composition.
//!
//! An entity is a value, not a class hierarchy: a [`Combatant`] owns its
//! stat block, the frozen base-stat snapshot modifiers are computed
//! against, the active upgrade/perk lists and an optional weapon. Enemy
//! and player shapes differ only by their [`Archetype`] preset.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use cadence_common::EntityId;

use crate::combat::{self, DamageOutcome};
use crate::events::GameEvent;
use crate::modifier::{Perk, Upgrade};
use crate::stats::StatBlock;
use crate::weapon::{FireControl, WeaponSpec};

/// Base-stat preset an entity spawns with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Archetype {
    /// The player character.
    Player,
    /// Close-range chaser.
    MeleeEnemy,
    /// Projectile enemy.
    RangedEnemy,
    /// Slow, armored bruiser.
    TankEnemy,
    /// Stationary boss-arena guardian.
    Guardian,
    /// The multi-phase boss.
    Boss,
}

impl Archetype {
    /// Designer base stats for this archetype.
    #[must_use]
    pub fn base_stats(self) -> StatBlock {
        match self {
            Self::Player => StatBlock::new(100.0, 10.0, 1.0, 0.0, 100.0),
            Self::MeleeEnemy => StatBlock::new(60.0, 15.0, 1.0, 0.0, 80.0),
            Self::RangedEnemy => StatBlock::new(40.0, 8.0, 1.2, 0.0, 60.0),
            Self::TankEnemy => StatBlock::new(220.0, 20.0, 0.5, 0.3, 40.0),
            Self::Guardian => StatBlock::new(500.0, 0.0, 0.0, 0.0, 0.0),
            Self::Boss => StatBlock::new(1500.0, 30.0, 0.0, 0.0, 0.0),
        }
    }

    /// Ranged weapon this archetype carries, if any.
    #[must_use]
    pub fn weapon(self) -> Option<WeaponSpec> {
        match self {
            Self::Player => Some(WeaponSpec::default()),
            Self::RangedEnemy => Some(WeaponSpec {
                base_fire_cooldown: 0.8,
                magazine: 6,
                reload_time: 2.5,
            }),
            _ => None,
        }
    }

    /// Whether this archetype fights against the player.
    #[must_use]
    pub const fn is_hostile(self) -> bool {
        !matches!(self, Self::Player)
    }
}

/// A combat entity: stats, modifiers and an optional ranged weapon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Combatant {
    id: EntityId,
    archetype: Archetype,
    stats: StatBlock,
    base: StatBlock,
    upgrades: Vec<Upgrade>,
    perks: Vec<Perk>,
    weapon: Option<FireControl>,
}

impl Combatant {
    /// Spawns an entity with its archetype's presets.
    #[must_use]
    pub fn spawn(archetype: Archetype) -> Self {
        Self::with_stats(archetype, archetype.base_stats(), archetype.weapon())
    }

    /// Spawns an entity with designer-overridden stats (the snapshot the
    /// modifiers will be computed against is frozen here).
    #[must_use]
    pub fn with_stats(archetype: Archetype, stats: StatBlock, weapon: Option<WeaponSpec>) -> Self {
        Self {
            id: EntityId::new(),
            archetype,
            stats,
            base: stats,
            upgrades: Vec::new(),
            perks: Vec::new(),
            weapon: weapon.map(FireControl::new),
        }
    }

    /// Unique entity ID.
    #[must_use]
    pub const fn id(&self) -> EntityId {
        self.id
    }

    /// Archetype preset.
    #[must_use]
    pub const fn archetype(&self) -> Archetype {
        self.archetype
    }

    /// Live stats.
    #[must_use]
    pub const fn stats(&self) -> &StatBlock {
        &self.stats
    }

    /// Mutable live stats, for callers that gate or script damage
    /// themselves (e.g. the boss shield wrapper).
    pub fn stats_mut(&mut self) -> &mut StatBlock {
        &mut self.stats
    }

    /// The frozen base-stat snapshot.
    #[must_use]
    pub const fn base(&self) -> &StatBlock {
        &self.base
    }

    /// The carried weapon, if any.
    #[must_use]
    pub const fn weapon(&self) -> Option<&FireControl> {
        self.weapon.as_ref()
    }

    /// Applied upgrades, in pickup order.
    #[must_use]
    pub fn upgrades(&self) -> &[Upgrade] {
        &self.upgrades
    }

    /// Perks currently counting down.
    pub fn active_perks(&self) -> impl Iterator<Item = &Perk> {
        self.perks.iter().filter(|perk| perk.is_active())
    }

    /// Whether the entity is still alive.
    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.stats.is_alive()
    }

    /// Current hp as a fraction of the maximum.
    #[must_use]
    pub fn hp_percent(&self) -> f32 {
        self.stats.hp_percent()
    }

    /// Rounds left in the magazine (`None` without a weapon).
    #[must_use]
    pub fn current_ammo(&self) -> Option<u32> {
        self.weapon.as_ref().map(|weapon| weapon.ammo().current_ammo())
    }

    /// Reload completion fraction (0 without a weapon or while idle).
    #[must_use]
    pub fn reload_progress(&self) -> f32 {
        self.weapon
            .as_ref()
            .map_or(0.0, |weapon| weapon.ammo().reload_progress())
    }

    /// Whether any active perk grants a zero fire cooldown.
    #[must_use]
    pub fn zero_cooldown_active(&self) -> bool {
        self.active_perks().any(Perk::zero_cooldown)
    }

    /// Picks up a permanent upgrade: applies it against the base
    /// snapshot and records it.
    pub fn pickup_upgrade(&mut self, mut upgrade: Upgrade) -> GameEvent {
        let Self {
            id,
            stats,
            base,
            upgrades,
            weapon,
            ..
        } = self;

        upgrade.apply(stats, base, weapon.as_mut().map(FireControl::ammo_mut));
        info!("{:?} collected {} upgrade: {}", id, upgrade.rarity(), upgrade.name());

        let event = GameEvent::UpgradeApplied {
            entity: *id,
            name: upgrade.name().to_string(),
            rarity: upgrade.rarity(),
        };
        upgrades.push(upgrade);
        event
    }

    /// Picks up a timed perk. A perk with the same name that is still
    /// active is refreshed instead of stacked.
    pub fn pickup_perk(&mut self, perk: Perk) -> GameEvent {
        let Self {
            id,
            stats,
            base,
            perks,
            weapon,
            ..
        } = self;
        let ammo = weapon.as_mut().map(FireControl::ammo_mut);

        if let Some(existing) = perks
            .iter_mut()
            .find(|active| active.is_active() && active.name() == perk.name())
        {
            existing.apply(stats, base, ammo);
            return GameEvent::PerkRefreshed {
                entity: *id,
                name: existing.name().to_string(),
            };
        }

        let mut perk = perk;
        perk.apply(stats, base, ammo);
        let event = GameEvent::PerkApplied {
            entity: *id,
            name: perk.name().to_string(),
            rarity: perk.rarity(),
            duration: perk.duration(),
        };
        perks.push(perk);
        event
    }

    /// Applies incoming damage. The caller reacts to a lethal outcome
    /// (death sequence is presentation-layer work).
    pub fn take_damage(&mut self, raw_damage: f32) -> DamageOutcome {
        let outcome = combat::resolve_damage(&mut self.stats, raw_damage);
        if outcome.lethal {
            info!("{:?} died ({:?})", self.id, self.archetype);
        }
        outcome
    }

    /// Restores hp up to the maximum; returns the hp actually gained.
    pub fn heal(&mut self, amount: f32) -> f32 {
        self.stats.heal(amount)
    }

    /// Attempts a shot with the entity's ATKSPD and perk overrides.
    /// Returns `false` without a weapon.
    pub fn try_fire(&mut self) -> bool {
        let zero_cooldown = self.zero_cooldown_active();
        let atkspd = self.stats.atkspd();
        match self.weapon.as_mut() {
            Some(weapon) => weapon.try_fire(atkspd, zero_cooldown),
            None => false,
        }
    }

    /// Per-frame update: advances perk countdowns, reverses expired
    /// perks and advances weapon timers.
    ///
    /// Expired perks are collected first and removed back-to-front so
    /// the in-place removal cannot skip elements.
    pub fn tick(&mut self, delta: f32) -> Vec<GameEvent> {
        let Self {
            id,
            stats,
            perks,
            weapon,
            ..
        } = self;

        let mut expired = Vec::new();
        for (index, perk) in perks.iter_mut().enumerate() {
            if perk.tick(delta) {
                expired.push(index);
            }
        }

        let mut events = Vec::new();
        for &index in expired.iter().rev() {
            let mut perk = perks.remove(index);
            perk.remove(stats, weapon.as_mut().map(FireControl::ammo_mut));
            debug!("perk expired: {}", perk.name());
            events.push(GameEvent::PerkExpired {
                entity: *id,
                name: perk.name().to_string(),
            });
        }

        if let Some(weapon) = weapon.as_mut() {
            weapon.tick(delta);
        }

        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modifier::{Rarity, StatPercents};

    #[test]
    fn test_spawn_presets() {
        let player = Combatant::spawn(Archetype::Player);
        assert_eq!(player.stats().max_hp(), 100.0);
        assert!(player.weapon().is_some());
        assert!(!player.archetype().is_hostile());

        let boss = Combatant::spawn(Archetype::Boss);
        assert_eq!(boss.stats().max_hp(), 1500.0);
        assert!(boss.weapon().is_none());
        assert!(boss.archetype().is_hostile());
    }

    #[test]
    fn test_pickup_upgrade_leaves_base_snapshot_untouched() {
        let mut player = Combatant::spawn(Archetype::Player);
        let upgrade = Upgrade::new(
            "Hollow Point",
            Rarity::Rare,
            StatPercents::new().with_dmg(1.0),
        );

        let event = player.pickup_upgrade(upgrade);
        assert!(matches!(event, GameEvent::UpgradeApplied { .. }));
        assert_eq!(player.stats().dmg(), 11.0);
        assert_eq!(player.base().dmg(), 10.0);
        assert_eq!(player.upgrades().len(), 1);
    }

    #[test]
    fn test_magazine_upgrade_reaches_the_weapon() {
        let mut player = Combatant::spawn(Archetype::Player);
        let upgrade = Upgrade::new("Extended Mag", Rarity::Rare, StatPercents::new())
            .with_magazine_bonus(10);

        player.pickup_upgrade(upgrade);
        assert_eq!(player.current_ammo(), Some(21));
    }

    #[test]
    fn test_perk_expires_through_tick() {
        let mut player = Combatant::spawn(Archetype::Player);
        let perk = Perk::new(
            "Adrenaline",
            Rarity::Epic,
            StatPercents::new().with_spd(1.0),
            5.0,
        );

        player.pickup_perk(perk);
        assert_eq!(player.stats().spd(), 120.0);
        assert_eq!(player.active_perks().count(), 1);

        assert!(player.tick(3.0).is_empty());

        let events = player.tick(2.5);
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], GameEvent::PerkExpired { .. }));
        assert_eq!(player.stats().spd(), 100.0);
        assert_eq!(player.active_perks().count(), 0);
    }

    #[test]
    fn test_perk_pickup_refreshes_active_perk() {
        let mut player = Combatant::spawn(Archetype::Player);
        let perk = Perk::new(
            "Adrenaline",
            Rarity::Epic,
            StatPercents::new().with_spd(1.0),
            5.0,
        );

        player.pickup_perk(perk.clone());
        player.tick(4.0);

        let event = player.pickup_perk(perk);
        assert!(matches!(event, GameEvent::PerkRefreshed { .. }));
        // Refreshed, not stacked: stats unchanged, timer back to full.
        assert_eq!(player.stats().spd(), 120.0);
        let remaining: Vec<f32> = player.active_perks().map(Perk::remaining_time).collect();
        assert_eq!(remaining, vec![5.0]);
    }

    #[test]
    fn test_multiple_perks_expiring_same_tick() {
        let mut player = Combatant::spawn(Archetype::Player);
        player.pickup_perk(Perk::new(
            "Adrenaline",
            Rarity::Epic,
            StatPercents::new().with_spd(1.0),
            2.0,
        ));
        player.pickup_perk(Perk::new(
            "Iron Skin",
            Rarity::Rare,
            StatPercents::new().with_def(1.0),
            2.0,
        ));

        let events = player.tick(3.0);
        assert_eq!(events.len(), 2);
        assert_eq!(player.stats().spd(), 100.0);
        assert_eq!(player.stats().def(), 0.0);
        assert_eq!(player.active_perks().count(), 0);
    }

    #[test]
    fn test_zero_cooldown_perk_enables_rapid_fire() {
        let mut player = Combatant::spawn(Archetype::Player);
        assert!(!player.zero_cooldown_active());

        player.pickup_perk(
            Perk::new("Overclock", Rarity::Legendary, StatPercents::new(), 10.0)
                .with_zero_cooldown(),
        );
        assert!(player.zero_cooldown_active());

        // Back-to-back shots drain the whole magazine without a tick.
        let mut shots = 0;
        while player.try_fire() {
            shots += 1;
        }
        assert_eq!(shots, 10);
    }

    #[test]
    fn test_take_damage_reports_lethal() {
        let mut enemy = Combatant::spawn(Archetype::MeleeEnemy);

        let outcome = enemy.take_damage(59.0);
        assert!(!outcome.lethal);
        assert!(enemy.is_alive());

        let outcome = enemy.take_damage(10.0);
        assert!(outcome.lethal);
        assert!(!enemy.is_alive());
        assert_eq!(outcome.applied, 1.0);
    }

    #[test]
    fn test_tank_defense_reduces_damage() {
        let mut tank = Combatant::spawn(Archetype::TankEnemy);
        let outcome = tank.take_damage(100.0);
        // 30% defense scales 100 down to 70.
        assert_eq!(outcome.applied, 70.0);
    }

    #[test]
    fn test_fire_without_weapon() {
        let mut guardian = Combatant::spawn(Archetype::Guardian);
        assert!(!guardian.try_fire());
        assert_eq!(guardian.current_ammo(), None);
        assert_eq!(guardian.reload_progress(), 0.0);
    }
}
