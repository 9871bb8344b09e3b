//! Room and wave sequencing.
//!
//! This module provides:
//! - Timed enemy spawn scheduling (initial delay, fixed interval, cap)
//! - Alive-enemy tracking with the reward-chest reveal signal
//! - Normal/boss room cycling

use serde::{Deserialize, Serialize};

/// Tick-driven spawn timer for one room's wave.
///
/// Waits `initial_delay`, then yields one spawn every `interval` seconds
/// until `total` enemies have been produced. A non-positive interval
/// yields everything remaining as soon as the delay elapses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpawnSchedule {
    interval: f32,
    total: u32,
    spawned: u32,
    timer: f32,
}

impl SpawnSchedule {
    /// Creates a schedule that spawns `total` enemies.
    #[must_use]
    pub fn new(initial_delay: f32, interval: f32, total: u32) -> Self {
        Self {
            interval,
            total,
            spawned: 0,
            timer: initial_delay.max(0.0),
        }
    }

    /// Enemies produced so far.
    #[must_use]
    pub const fn spawned(&self) -> u32 {
        self.spawned
    }

    /// Enemies still to come.
    #[must_use]
    pub const fn remaining(&self) -> u32 {
        self.total - self.spawned
    }

    /// Whether every enemy has been produced.
    #[must_use]
    pub const fn is_finished(&self) -> bool {
        self.spawned >= self.total
    }

    /// Advances the timer and returns how many spawns are due this tick.
    pub fn tick(&mut self, delta: f32) -> u32 {
        if self.is_finished() {
            return 0;
        }

        self.timer -= delta;
        let mut due = 0;
        while self.timer <= 0.0 && !self.is_finished() {
            due += 1;
            self.spawned += 1;
            if self.interval > 0.0 {
                self.timer += self.interval;
            }
            // interval <= 0: the timer stays elapsed and the loop
            // drains the remaining spawns.
        }
        due
    }
}

/// Alive-enemy bookkeeping for the current room.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoomTracker {
    alive: u32,
    chest_revealed: bool,
}

impl RoomTracker {
    /// Creates a tracker for an empty room.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enemies currently alive.
    #[must_use]
    pub const fn alive(&self) -> u32 {
        self.alive
    }

    /// Whether the reward chest has been revealed.
    #[must_use]
    pub const fn chest_revealed(&self) -> bool {
        self.chest_revealed
    }

    /// Records an enemy spawn.
    pub fn on_enemy_spawned(&mut self) {
        self.alive += 1;
    }

    /// Records an enemy death. Returns `true` exactly once: when the
    /// last enemy falls and the reward chest should be revealed.
    pub fn on_enemy_died(&mut self) -> bool {
        self.alive = self.alive.saturating_sub(1);
        if self.alive == 0 && !self.chest_revealed {
            self.chest_revealed = true;
            return true;
        }
        false
    }
}

/// Kind of room the run advances into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoomKind {
    /// A regular combat room.
    Normal,
    /// A boss arena.
    Boss,
}

/// Normal/boss room cycling: `rooms_per_cycle` normal rooms, then one
/// boss room, then the cycle restarts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomCycle {
    rooms_per_cycle: u32,
    cleared: u32,
}

impl Default for RoomCycle {
    fn default() -> Self {
        Self::new(3)
    }
}

impl RoomCycle {
    /// Creates a cycle with `rooms_per_cycle` normal rooms per boss.
    #[must_use]
    pub const fn new(rooms_per_cycle: u32) -> Self {
        Self {
            rooms_per_cycle,
            cleared: 0,
        }
    }

    /// Normal rooms cleared in the current cycle.
    #[must_use]
    pub const fn cleared(&self) -> u32 {
        self.cleared
    }

    /// Picks the next room to enter.
    pub fn next_room(&mut self) -> RoomKind {
        if self.cleared < self.rooms_per_cycle {
            self.cleared += 1;
            RoomKind::Normal
        } else {
            self.cleared = 0;
            RoomKind::Boss
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_spawns_before_initial_delay() {
        let mut schedule = SpawnSchedule::new(2.0, 0.5, 5);

        assert_eq!(schedule.tick(1.0), 0);
        assert_eq!(schedule.tick(0.9), 0);
        // Delay elapses here and the first enemy comes out.
        assert_eq!(schedule.tick(0.1), 1);
    }

    #[test]
    fn test_spawns_at_fixed_interval_up_to_total() {
        let mut schedule = SpawnSchedule::new(0.0, 1.0, 3);

        let mut produced = schedule.tick(0.0);
        for _ in 0..100 {
            produced += schedule.tick(0.25);
        }
        assert_eq!(produced, 3);
        assert!(schedule.is_finished());
        assert_eq!(schedule.remaining(), 0);
    }

    #[test]
    fn test_large_tick_yields_multiple_spawns() {
        let mut schedule = SpawnSchedule::new(0.0, 0.5, 10);
        // 2.0 seconds covers the delay plus four whole intervals.
        assert_eq!(schedule.tick(2.0), 5);
    }

    #[test]
    fn test_nonpositive_interval_drains_after_delay() {
        let mut schedule = SpawnSchedule::new(1.0, 0.0, 4);
        assert_eq!(schedule.tick(0.5), 0);
        assert_eq!(schedule.tick(0.5), 4);
        assert!(schedule.is_finished());
    }

    #[test]
    fn test_chest_reveals_exactly_once() {
        let mut room = RoomTracker::new();
        room.on_enemy_spawned();
        room.on_enemy_spawned();

        assert!(!room.on_enemy_died());
        assert!(room.on_enemy_died());
        assert!(room.chest_revealed());

        // Late deaths never re-reveal.
        room.on_enemy_spawned();
        assert!(!room.on_enemy_died());
    }

    #[test]
    fn test_room_cycle_three_normals_then_boss() {
        let mut cycle = RoomCycle::default();

        assert_eq!(cycle.next_room(), RoomKind::Normal);
        assert_eq!(cycle.next_room(), RoomKind::Normal);
        assert_eq!(cycle.next_room(), RoomKind::Normal);
        assert_eq!(cycle.next_room(), RoomKind::Boss);
        // Cycle restarts after the boss.
        assert_eq!(cycle.next_room(), RoomKind::Normal);
    }
}
