//! Generational Entity Handles
//!
//! Aircraft, coins and bullets come and go constantly, and their slots get
//! recycled. A handle carries the generation of its slot, so a handle kept by
//! a task after the entity died never matches whatever reuses the slot. The
//! player handle doubles as the player's identity token: a new player in the
//! same slot is still a different player.

use serde::{Deserialize, Serialize};

/// Handle to a world entity: slot index plus slot generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Entity {
    index: u32,
    generation: u32,
}

impl Entity {
    /// Placeholder that is never alive
    pub const NULL: Entity = Entity { index: u32::MAX, generation: 0 };

    pub(crate) fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn is_null(&self) -> bool {
        self.index == u32::MAX
    }
}

impl Default for Entity {
    fn default() -> Self {
        Entity::NULL
    }
}

/// Hands out entity slots and tracks which handles are still live.
#[derive(Debug, Default)]
pub struct EntityAllocator {
    generations: Vec<u32>,
    /// Recycled slots, reused LIFO
    free_indices: Vec<u32>,
}

impl EntityAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allocate(&mut self) -> Entity {
        match self.free_indices.pop() {
            // Generation was bumped when the slot was freed
            Some(index) => Entity::new(index, self.generations[index as usize]),
            None => {
                let index = self.generations.len() as u32;
                self.generations.push(0);
                Entity::new(index, 0)
            }
        }
    }

    /// Retire a handle. Returns false if it was already dead, so freeing
    /// twice is harmless.
    pub fn free(&mut self, entity: Entity) -> bool {
        if !self.is_alive(entity) {
            return false;
        }
        let slot = &mut self.generations[entity.index as usize];
        *slot = slot.wrapping_add(1);
        self.free_indices.push(entity.index);
        true
    }

    pub fn is_alive(&self, entity: Entity) -> bool {
        !entity.is_null()
            && self
                .generations
                .get(entity.index as usize)
                .is_some_and(|&gen| gen == entity.generation)
    }

    /// Handle for the current generation of a slot. Only meaningful for
    /// slots known to be occupied (e.g. found through a component storage).
    pub fn current(&self, index: u32) -> Option<Entity> {
        self.generations
            .get(index as usize)
            .map(|&gen| Entity::new(index, gen))
    }

    #[cfg(test)]
    pub fn alive_count(&self) -> u32 {
        (self.generations.len() - self.free_indices.len()) as u32
    }

    /// Slots ever handed out (live or recycled)
    #[cfg(test)]
    pub fn capacity(&self) -> u32 {
        self.generations.len() as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allocate_and_free() {
        let mut alloc = EntityAllocator::new();
        let a = alloc.allocate();
        let b = alloc.allocate();
        assert_eq!(alloc.alive_count(), 2);

        assert!(alloc.free(a));
        assert_eq!(alloc.alive_count(), 1);
        assert!(!alloc.is_alive(a));
        assert!(alloc.is_alive(b));
    }

    #[test]
    fn test_double_free_is_noop() {
        let mut alloc = EntityAllocator::new();
        let a = alloc.allocate();
        assert!(alloc.free(a));
        assert!(!alloc.free(a));
        assert_eq!(alloc.alive_count(), 0);
    }

    #[test]
    fn test_reused_slot_is_new_identity() {
        let mut alloc = EntityAllocator::new();
        let first_player = alloc.allocate();
        alloc.free(first_player);

        let second_player = alloc.allocate();
        assert_eq!(second_player.index(), first_player.index());
        assert_ne!(second_player, first_player);
        assert!(!alloc.is_alive(first_player));
        assert!(alloc.is_alive(second_player));
        assert_eq!(alloc.capacity(), 1);
    }

    #[test]
    fn test_null_entity() {
        let alloc = EntityAllocator::new();
        assert!(!alloc.is_alive(Entity::NULL));
        assert!(Entity::default().is_null());
    }
}
