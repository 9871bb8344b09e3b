//! The run's collected-upgrade ledger.
//!
//! Read by the (out-of-scope) inventory UI: pickup order, per-rarity
//! counts and the aggregate stat bonus across the whole run.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::modifier::{Rarity, Upgrade};

/// Inventory error types.
#[derive(Debug, Clone, Error)]
pub enum InventoryError {
    /// No upgrade at the requested slot
    #[error("no upgrade at slot {0}")]
    SlotOutOfRange(usize),
}

/// Result type for inventory operations.
pub type InventoryResult<T> = Result<T, InventoryError>;

/// Aggregate fractional stat bonus of every collected upgrade.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct StatBonusSummary {
    /// Total max-hp bonus fraction.
    pub hp: f32,
    /// Total damage bonus fraction.
    pub dmg: f32,
    /// Total attack-speed bonus fraction.
    pub atkspd: f32,
    /// Total defense bonus fraction.
    pub def: f32,
    /// Total movement-speed bonus fraction.
    pub spd: f32,
}

/// Ordered ledger of the upgrades collected during a run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpgradeInventory {
    upgrades: Vec<Upgrade>,
}

impl UpgradeInventory {
    /// Creates an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of collected upgrades.
    #[must_use]
    pub fn len(&self) -> usize {
        self.upgrades.len()
    }

    /// Whether nothing has been collected yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.upgrades.is_empty()
    }

    /// Records a collected upgrade.
    pub fn record(&mut self, upgrade: Upgrade) {
        self.upgrades.push(upgrade);
    }

    /// Collected upgrades in pickup order.
    pub fn iter(&self) -> impl Iterator<Item = &Upgrade> {
        self.upgrades.iter()
    }

    /// Number of collected upgrades of the given rarity.
    #[must_use]
    pub fn count_by_rarity(&self, rarity: Rarity) -> usize {
        self.upgrades
            .iter()
            .filter(|upgrade| upgrade.rarity() == rarity)
            .count()
    }

    /// Sums every upgrade's rarity-scaled contribution weights into one
    /// per-stat bonus summary.
    #[must_use]
    pub fn summary(&self) -> StatBonusSummary {
        let mut summary = StatBonusSummary::default();
        for upgrade in &self.upgrades {
            let mult = upgrade.rarity().multiplier();
            let percents = upgrade.percents();
            summary.hp += mult * percents.hp;
            summary.dmg += mult * percents.dmg;
            summary.atkspd += mult * percents.atkspd;
            summary.def += mult * percents.def;
            summary.spd += mult * percents.spd;
        }
        summary
    }

    /// Takes an upgrade out of the ledger by slot, so its cached deltas
    /// can be reversed on the owning entity.
    pub fn take(&mut self, slot: usize) -> InventoryResult<Upgrade> {
        if slot >= self.upgrades.len() {
            return Err(InventoryError::SlotOutOfRange(slot));
        }
        Ok(self.upgrades.remove(slot))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modifier::StatPercents;

    fn sample(name: &str, rarity: Rarity) -> Upgrade {
        Upgrade::new(name, rarity, StatPercents::new().with_dmg(1.0))
    }

    #[test]
    fn test_record_and_count() {
        let mut inventory = UpgradeInventory::new();
        assert!(inventory.is_empty());

        inventory.record(sample("A", Rarity::Uncommon));
        inventory.record(sample("B", Rarity::Rare));
        inventory.record(sample("C", Rarity::Rare));

        assert_eq!(inventory.len(), 3);
        assert_eq!(inventory.count_by_rarity(Rarity::Rare), 2);
        assert_eq!(inventory.count_by_rarity(Rarity::Legendary), 0);
    }

    #[test]
    fn test_summary_accumulates_rarity_scaled_weights() {
        let mut inventory = UpgradeInventory::new();
        inventory.record(Upgrade::new(
            "A",
            Rarity::Rare,
            StatPercents::new().with_dmg(1.0).with_hp(0.5),
        ));
        inventory.record(Upgrade::new(
            "B",
            Rarity::Legendary,
            StatPercents::new().with_dmg(1.0),
        ));

        let summary = inventory.summary();
        assert!((summary.dmg - 0.45).abs() < 1e-6);
        assert!((summary.hp - 0.05).abs() < 1e-6);
        assert_eq!(summary.spd, 0.0);
    }

    #[test]
    fn test_take_preserves_pickup_order() {
        let mut inventory = UpgradeInventory::new();
        inventory.record(sample("A", Rarity::Uncommon));
        inventory.record(sample("B", Rarity::Rare));

        let taken = inventory.take(0).expect("slot 0 exists");
        assert_eq!(taken.name(), "A");
        assert_eq!(inventory.len(), 1);

        assert!(matches!(
            inventory.take(5),
            Err(InventoryError::SlotOutOfRange(5))
        ));
    }
}
