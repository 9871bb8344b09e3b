//! Event surface for the presentation layer.
//!
//! The core never triggers animation, audio or UI work directly; it
//! emits [`GameEvent`] values that the (out-of-scope) presentation layer
//! drains once per frame and reacts to.

use crossbeam_channel::{bounded, Receiver, Sender};
use serde::{Deserialize, Serialize};

use cadence_common::EntityId;

use crate::boss::BossPhase;
use crate::modifier::Rarity;

/// Events observable by the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    /// Entity took damage.
    Damaged {
        /// Entity that was hit
        entity: EntityId,
        /// Hp actually lost
        amount: f32,
        /// Whether the hit was lethal
        lethal: bool,
    },
    /// Entity was healed.
    Healed {
        /// Entity that was healed
        entity: EntityId,
        /// Hp actually gained
        amount: f32,
    },
    /// Entity died.
    Died {
        /// Entity that died
        entity: EntityId,
    },
    /// Permanent upgrade picked up and applied.
    UpgradeApplied {
        /// Entity that picked it up
        entity: EntityId,
        /// Upgrade display name
        name: String,
        /// Rarity tier
        rarity: Rarity,
    },
    /// Timed perk picked up and applied.
    PerkApplied {
        /// Entity that picked it up
        entity: EntityId,
        /// Perk display name
        name: String,
        /// Rarity tier
        rarity: Rarity,
        /// Countdown duration in seconds
        duration: f32,
    },
    /// Active perk picked up again; only its timer was reset.
    PerkRefreshed {
        /// Entity holding the perk
        entity: EntityId,
        /// Perk display name
        name: String,
    },
    /// Perk countdown expired and its deltas were reversed.
    PerkExpired {
        /// Entity that held the perk
        entity: EntityId,
        /// Perk display name
        name: String,
    },
    /// Boss advanced to a new phase.
    BossPhaseChanged {
        /// Boss entity
        entity: EntityId,
        /// Phase entered
        phase: BossPhase,
    },
    /// The last guardian died and the boss became damageable.
    BossShieldBroken {
        /// Boss entity
        entity: EntityId,
    },
    /// All enemies in the room are dead; the reward chest appears.
    ChestRevealed,
}

/// Bounded broadcast bus for game events.
///
/// Publishing never blocks; events are dropped when the channel is full.
#[derive(Debug)]
pub struct EventBus {
    sender: Sender<GameEvent>,
    receiver: Receiver<GameEvent>,
    capacity: usize,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(1024)
    }
}

impl EventBus {
    /// Creates a new event bus with the given capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, receiver) = bounded(capacity);
        Self {
            sender,
            receiver,
            capacity,
        }
    }

    /// Publishes an event to the bus.
    pub fn publish(&self, event: GameEvent) {
        // Non-blocking send - if full, event is dropped
        let _ = self.sender.try_send(event);
    }

    /// Publishes a batch of events.
    pub fn publish_all(&self, events: impl IntoIterator<Item = GameEvent>) {
        for event in events {
            self.publish(event);
        }
    }

    /// Drains all pending events.
    pub fn drain(&self) -> Vec<GameEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.receiver.try_recv() {
            events.push(event);
        }
        events
    }

    /// Returns the number of pending events.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.receiver.len()
    }

    /// Returns the channel capacity.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Creates a new sender handle for publishing events.
    #[must_use]
    pub fn sender(&self) -> Sender<GameEvent> {
        self.sender.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_publish_and_drain() {
        let bus = EventBus::new(16);
        let entity = EntityId::from_raw(1);

        bus.publish(GameEvent::Damaged {
            entity,
            amount: 10.0,
            lethal: false,
        });
        bus.publish(GameEvent::Died { entity });

        assert_eq!(bus.pending_count(), 2);
        let events = bus.drain();
        assert_eq!(events.len(), 2);
        assert_eq!(bus.pending_count(), 0);
        assert_eq!(events[1], GameEvent::Died { entity });
    }

    #[test]
    fn test_full_bus_drops_events() {
        let bus = EventBus::new(1);

        bus.publish(GameEvent::ChestRevealed);
        bus.publish(GameEvent::ChestRevealed);

        assert_eq!(bus.drain().len(), 1);
    }

    #[test]
    fn test_sender_handle() {
        let bus = EventBus::new(4);
        let sender = bus.sender();
        sender
            .try_send(GameEvent::ChestRevealed)
            .expect("bus should have capacity");

        assert_eq!(bus.drain().len(), 1);
    }
}
