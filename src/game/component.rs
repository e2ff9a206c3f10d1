//! Component Storage
//!
//! `ComponentStorage<T>` is a sparse array keyed by entity slot index. The
//! playfield holds a few dozen entities at most, so a `Vec<Option<T>>` beats
//! anything cleverer.

use super::entity::Entity;

pub struct ComponentStorage<T> {
    slots: Vec<Option<T>>,
}

impl<T> ComponentStorage<T> {
    pub fn new() -> Self {
        Self { slots: Vec::new() }
    }

    /// Insert or replace the component for `entity`.
    pub fn insert(&mut self, entity: Entity, component: T) {
        let idx = entity.index() as usize;
        if idx >= self.slots.len() {
            self.slots.resize_with(idx + 1, || None);
        }
        self.slots[idx] = Some(component);
    }

    #[cfg(test)]
    pub fn remove(&mut self, entity: Entity) -> Option<T> {
        self.slots.get_mut(entity.index() as usize).and_then(Option::take)
    }

    pub fn get(&self, entity: Entity) -> Option<&T> {
        self.slots.get(entity.index() as usize).and_then(Option::as_ref)
    }

    pub fn get_mut(&mut self, entity: Entity) -> Option<&mut T> {
        self.slots.get_mut(entity.index() as usize).and_then(Option::as_mut)
    }

    pub fn contains(&self, entity: Entity) -> bool {
        self.get(entity).is_some()
    }

    /// (slot index, component) pairs. Callers rebuild full handles through
    /// `World::entity_at`.
    pub fn iter(&self) -> impl Iterator<Item = (u32, &T)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(idx, slot)| slot.as_ref().map(|c| (idx as u32, c)))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (u32, &mut T)> {
        self.slots
            .iter_mut()
            .enumerate()
            .filter_map(|(idx, slot)| slot.as_mut().map(|c| (idx as u32, c)))
    }

    pub fn clear_slot(&mut self, index: u32) {
        if let Some(slot) = self.slots.get_mut(index as usize) {
            *slot = None;
        }
    }

    #[cfg(test)]
    pub fn count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }
}

impl<T> Default for ComponentStorage<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_get_remove() {
        let mut storage: ComponentStorage<i32> = ComponentStorage::new();
        let e = Entity::new(4, 0);

        storage.insert(e, 7);
        assert_eq!(storage.get(e), Some(&7));
        *storage.get_mut(e).unwrap() += 1;
        assert_eq!(storage.remove(e), Some(8));
        assert!(!storage.contains(e));
        assert_eq!(storage.remove(e), None);
    }

    #[test]
    fn test_sparse_iteration() {
        let mut storage: ComponentStorage<&str> = ComponentStorage::new();
        storage.insert(Entity::new(0, 0), "player");
        storage.insert(Entity::new(9, 0), "coin");

        let items: Vec<_> = storage.iter().collect();
        assert_eq!(items, vec![(0, &"player"), (9, &"coin")]);
        assert_eq!(storage.count(), 2);

        storage.clear_slot(9);
        assert_eq!(storage.count(), 1);
        // Out of range is ignored
        storage.clear_slot(500);
    }
}
