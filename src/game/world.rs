//! Game World
//!
//! Container for everything on the playfield:
//! - entity allocation and liveness (generational handles)
//! - one typed storage per component
//! - deferred despawn, so systems can retire entities mid-iteration
//!
//! This is the entity-creation/destruction capability the session logic
//! relies on: `spawn_*` to create, `despawn_immediate` to destroy now,
//! `despawn` to destroy at the end of the frame.

use macroquad::math::Vec2;

use super::component::ComponentStorage;
use super::components::*;
use super::entity::{Entity, EntityAllocator};
use crate::config::{CoinSettings, EnemySettings, PlayerSettings};
use crate::error::{GameError, GameResult};
use crate::runtime::Signal;

/// Radius of every projectile
pub const PROJECTILE_RADIUS: f32 = 0.08;

pub struct World {
    entities: EntityAllocator,
    despawn_queue: Vec<Entity>,

    // Core
    pub positions: ComponentStorage<Position>,
    pub velocities: ComponentStorage<Velocity>,
    pub colliders: ComponentStorage<Collider>,
    pub health: ComponentStorage<Health>,

    // Kinds
    pub players: ComponentStorage<Player>,
    pub weapons: ComponentStorage<Vec<Weapon>>,
    pub enemies: ComponentStorage<Enemy>,
    pub coins: ComponentStorage<Coin>,
    pub projectiles: ComponentStorage<Projectile>,
}

impl World {
    pub fn new() -> Self {
        Self {
            entities: EntityAllocator::new(),
            despawn_queue: Vec::new(),
            positions: ComponentStorage::new(),
            velocities: ComponentStorage::new(),
            colliders: ComponentStorage::new(),
            health: ComponentStorage::new(),
            players: ComponentStorage::new(),
            weapons: ComponentStorage::new(),
            enemies: ComponentStorage::new(),
            coins: ComponentStorage::new(),
            projectiles: ComponentStorage::new(),
        }
    }

    // =========================================================================
    // Entity Management
    // =========================================================================

    /// Bare entity with a position; every entity has one.
    pub fn spawn_at(&mut self, position: Vec2) -> Entity {
        let entity = self.entities.allocate();
        self.positions.insert(entity, Position(position));
        entity
    }

    /// Queue a despawn for the end of the frame. Dead handles are ignored.
    pub fn despawn(&mut self, entity: Entity) {
        if self.is_alive(entity) && !self.despawn_queue.contains(&entity) {
            self.despawn_queue.push(entity);
        }
    }

    /// Remove an entity and all its components now. Returns false if the
    /// handle was already dead (collected coin, killed enemy, ...).
    pub fn despawn_immediate(&mut self, entity: Entity) -> bool {
        if !self.entities.free(entity) {
            return false;
        }
        let idx = entity.index();
        self.positions.clear_slot(idx);
        self.velocities.clear_slot(idx);
        self.colliders.clear_slot(idx);
        self.health.clear_slot(idx);
        self.players.clear_slot(idx);
        self.weapons.clear_slot(idx);
        self.enemies.clear_slot(idx);
        self.coins.clear_slot(idx);
        self.projectiles.clear_slot(idx);
        true
    }

    pub fn flush_despawns(&mut self) {
        let queue = std::mem::take(&mut self.despawn_queue);
        for entity in queue {
            self.despawn_immediate(entity);
        }
    }

    pub fn is_alive(&self, entity: Entity) -> bool {
        self.entities.is_alive(entity)
    }

    #[cfg(test)]
    pub fn entity_count(&self) -> u32 {
        self.entities.alive_count()
    }

    /// Full handle for an occupied slot index (as yielded by storage iteration)
    pub fn entity_at(&self, index: u32) -> Entity {
        self.entities.current(index).unwrap_or(Entity::NULL)
    }

    pub fn position(&self, entity: Entity) -> Option<Vec2> {
        self.positions.get(entity).map(|p| p.0)
    }

    /// Live handles of every entity carrying component `T`
    pub fn handles<T>(&self, storage: &ComponentStorage<T>) -> Vec<Entity> {
        storage.iter().map(|(idx, _)| self.entity_at(idx)).collect()
    }

    // =========================================================================
    // Player Capability
    // =========================================================================

    pub fn spawn_player(&mut self, settings: &PlayerSettings) -> Entity {
        let (x, y) = settings.start_position;
        let entity = self.spawn_at(Vec2::new(x, y));
        self.players.insert(entity, Player::default());
        self.health.insert(entity, Health::new(settings.max_health));
        self.velocities.insert(entity, Velocity::default());
        self.colliders.insert(entity, Collider { radius: settings.radius });
        self.weapons.insert(entity, vec![Weapon::new(WeaponKind::Cannon)]);
        entity
    }

    /// Alive means: handle still valid and death not yet signalled.
    pub fn player_alive(&self, entity: Entity) -> bool {
        self.is_alive(entity) && self.players.get(entity).is_some_and(Player::is_alive)
    }

    /// The player's death event, awaitable via `Signal::wait`.
    pub fn player_death(&self, entity: Entity) -> GameResult<Signal> {
        if !self.is_alive(entity) {
            return Err(GameError::DeadEntity(entity));
        }
        self.players
            .get(entity)
            .map(|p| p.death.clone())
            .ok_or(GameError::NotAPlayer(entity))
    }

    /// Equip an extra weapon. Grants stack: each call adds another gun.
    pub fn grant_weapon(&mut self, entity: Entity, kind: WeaponKind) -> GameResult<()> {
        if !self.is_alive(entity) {
            return Err(GameError::DeadEntity(entity));
        }
        if !self.players.contains(entity) {
            return Err(GameError::NotAPlayer(entity));
        }
        let weapon = Weapon::new(kind);
        match self.weapons.get_mut(entity) {
            Some(list) => list.push(weapon),
            None => self.weapons.insert(entity, vec![weapon]),
        }
        Ok(())
    }

    pub fn weapons_of(&self, entity: Entity) -> &[Weapon] {
        self.weapons.get(entity).map(Vec::as_slice).unwrap_or(&[])
    }

    // =========================================================================
    // Other Spawners
    // =========================================================================

    pub fn spawn_enemy(&mut self, position: Vec2, settings: &EnemySettings, fire_timer: f32, strafe_dir: f32) -> Entity {
        let entity = self.spawn_at(position);
        self.enemies.insert(entity, Enemy::new(fire_timer, strafe_dir));
        self.health.insert(entity, Health::new(settings.max_health));
        self.velocities.insert(entity, Velocity(Vec2::new(0.0, -settings.speed)));
        self.colliders.insert(entity, Collider { radius: settings.radius });
        entity
    }

    /// A coin starts its drop-in effect immediately.
    pub fn spawn_coin(&mut self, position: Vec2, settings: &CoinSettings) -> Entity {
        let entity = self.spawn_at(position);
        self.coins.insert(entity, Coin::new(settings.appear_secs));
        self.velocities.insert(entity, Velocity(Vec2::new(0.0, -settings.fall_speed)));
        self.colliders.insert(entity, Collider { radius: settings.radius });
        entity
    }

    pub fn spawn_projectile(&mut self, position: Vec2, velocity: Vec2, team: Team, damage: i32) -> Entity {
        let entity = self.spawn_at(position);
        self.projectiles.insert(entity, Projectile { team, damage, ttl: 3.0 });
        self.velocities.insert(entity, Velocity(velocity));
        self.colliders.insert(entity, Collider { radius: PROJECTILE_RADIUS });
        entity
    }

    /// Remove every shot in flight. Returns how many were removed.
    pub fn clear_projectiles(&mut self) -> usize {
        let shots = self.handles(&self.projectiles);
        shots.into_iter().filter(|&shot| self.despawn_immediate(shot)).count()
    }

    /// True while the coin exists and its appear effect is still running.
    pub fn coin_appearing(&self, coin: Entity) -> bool {
        self.is_alive(coin) && self.coins.get(coin).is_some_and(Coin::is_appearing)
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}
