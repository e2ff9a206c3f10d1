//! Enemy Spawner
//!
//! Owns the enemy population of the current session. `start_spawning`
//! launches a background task that drops a wave every `spawn_interval`
//! seconds; `kill_all` removes every tracked enemy on the spot and stops
//! that task at its next check.
//!
//! Each `start_spawning` call arms a new epoch. A spawner task only keeps
//! going while its epoch is the armed one, so a task left over from an
//! earlier session can never add enemies to a later one.

use macroquad::math::Vec2;
use rand::Rng;

use super::context::{GameContext, GameHandle};
use super::entity::Entity;
use super::world::World;
use crate::config::EnemySettings;
use crate::error::GameResult;
use crate::runtime::TaskId;

/// Vertical gap between enemies of the same wave
const WAVE_STAGGER: f32 = 1.2;

#[derive(Debug, Default)]
pub struct EnemySpawner {
    tracked: Vec<Entity>,
    running: bool,
    epoch: u64,
    wave: u32,
}

impl EnemySpawner {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Start a new epoch; tasks holding an older one stop.
    pub fn arm(&mut self) -> u64 {
        self.epoch += 1;
        self.running = true;
        self.wave = 0;
        self.epoch
    }

    pub fn is_current(&self, epoch: u64) -> bool {
        self.running && self.epoch == epoch
    }

    pub fn track(&mut self, enemy: Entity) {
        self.tracked.push(enemy);
    }

    /// Forget enemies that died on their own.
    pub fn prune(&mut self, world: &World) {
        self.tracked.retain(|&e| world.is_alive(e));
    }

    /// Live tracked enemies
    #[cfg(test)]
    pub fn active(&self, world: &World) -> usize {
        self.tracked.iter().filter(|&&e| world.is_alive(e)).count()
    }

    pub fn waves_spawned(&self) -> u32 {
        self.wave
    }

    /// Enemies in the next wave: one more every `wave_growth` waves, capped.
    pub fn wave_size(&self, settings: &EnemySettings) -> u32 {
        let grown = settings.first_wave + self.wave / settings.wave_growth.max(1);
        grown.min(settings.max_wave)
    }

    /// Destroy every tracked enemy now and halt spawning. Returns how many
    /// enemies were removed; calling it again removes nothing.
    pub fn kill_all(&mut self, world: &mut World) -> usize {
        self.running = false;
        let killed = self
            .tracked
            .drain(..)
            .filter(|&e| world.despawn_immediate(e))
            .count();
        tracing::debug!(killed, "enemy spawner cleared");
        killed
    }
}

/// Arm the spawner and launch its task. Non-blocking.
pub fn start_spawning(handle: &GameHandle) -> TaskId {
    let epoch = handle.ctx.borrow_mut().enemies.arm();
    handle.tasks.spawn("enemy-spawner", run(handle.clone(), epoch))
}

pub async fn run(handle: GameHandle, epoch: u64) -> GameResult<()> {
    loop {
        let interval = {
            let mut ctx = handle.ctx.borrow_mut();
            if !ctx.enemies.is_current(epoch) {
                break;
            }
            spawn_wave(&mut ctx);
            ctx.config.enemies.spawn_interval
        };

        let ctx = handle.ctx.clone();
        handle
            .clock
            .sleep_while(interval as f64, move || ctx.borrow().enemies.is_current(epoch))
            .await;
    }

    tracing::debug!(epoch, "enemy spawner stopped");
    Ok(())
}

/// Drop one wave across the top of the playfield. Returns its size.
pub fn spawn_wave(ctx: &mut GameContext) -> u32 {
    let settings = &ctx.config.enemies;
    ctx.enemies.prune(&ctx.world);

    let count = ctx.enemies.wave_size(settings);
    let half_width = (ctx.config.player.bounds.0 - settings.radius).max(0.0);
    for i in 0..count {
        let x = ctx.rng.gen_range(-half_width..=half_width);
        let y = settings.spawn_height + i as f32 * WAVE_STAGGER;
        let fire_timer = ctx.rng.gen::<f32>() * settings.fire_interval;
        let strafe_dir = if ctx.rng.gen_bool(0.5) { 1.0 } else { -1.0 };

        let enemy = ctx.world.spawn_enemy(Vec2::new(x, y), settings, fire_timer, strafe_dir);
        ctx.enemies.track(enemy);
    }

    ctx.enemies.wave += 1;
    tracing::debug!(wave = ctx.enemies.wave, count, "enemy wave spawned");
    count
}
