//! Event System
//!
//! Systems report what happened during a frame by pushing events; the host
//! drains them after the systems run. The coin pickup is the important one:
//! it is how the economy counter hears about collections without the
//! collision code knowing the economy exists.

use macroquad::math::Vec2;

use super::entity::Entity;

/// Events of one type, collected during a frame
#[derive(Debug)]
pub struct EventQueue<T> {
    events: Vec<T>,
}

impl<T> EventQueue<T> {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn send(&mut self, event: T) {
        self.events.push(event);
    }

    pub fn drain(&mut self) -> impl Iterator<Item = T> + '_ {
        self.events.drain(..)
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.events.len()
    }
}

impl<T> Default for EventQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Default)]
pub struct Events {
    pub coin_collected: EventQueue<CoinCollectedEvent>,
    pub damage: EventQueue<DamageEvent>,
    pub enemy_killed: EventQueue<EnemyKilledEvent>,
    pub player_died: EventQueue<PlayerDiedEvent>,
}

impl Events {
    pub fn new() -> Self {
        Self::default()
    }

    /// Call at end of frame
    pub fn clear_all(&mut self) {
        self.coin_collected.clear();
        self.damage.clear();
        self.enemy_killed.clear();
        self.player_died.clear();
    }
}

// =============================================================================
// Event Types
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoinCollectedEvent {
    /// Already despawned when the event is read
    pub coin: Entity,
    pub collector: Entity,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DamageEvent {
    pub target: Entity,
    pub amount: i32,
    pub position: Vec2,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnemyKilledEvent {
    pub enemy: Entity,
    pub position: Vec2,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayerDiedEvent {
    pub player: Entity,
    pub position: Vec2,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_queue() {
        let mut queue: EventQueue<i32> = EventQueue::new();
        queue.send(1);
        queue.send(2);
        assert_eq!(queue.len(), 2);

        let drained: Vec<_> = queue.drain().collect();
        assert_eq!(drained, vec![1, 2]);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_clear_all() {
        let mut events = Events::new();
        events.coin_collected.send(CoinCollectedEvent {
            coin: Entity::NULL,
            collector: Entity::NULL,
        });
        events.enemy_killed.send(EnemyKilledEvent {
            enemy: Entity::NULL,
            position: Vec2::ZERO,
        });
        events.clear_all();
        assert!(events.coin_collected.is_empty());
        assert!(events.enemy_killed.is_empty());
    }
}
