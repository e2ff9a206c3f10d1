//! Per-tick Systems
//!
//! The simulation half of a frame, run by the host before the scheduler
//! steps. Systems only touch the world and push events; they never await.
//!
//! Order matters:
//! 1. steering and weapon fire (player)
//! 2. enemy behavior and enemy fire
//! 3. coin appear effect
//! 4. movement, clamping, projectile aging, culling
//! 5. collisions (shots, contact, pickups)
//! 6. death detection, invincibility countdown
//! 7. deferred despawns

use macroquad::math::Vec2;

use super::components::*;
use super::context::GameContext;
use super::entity::Entity;
use super::event::*;
use super::world::{World, PROJECTILE_RADIUS};
use crate::config::{EnemySettings, GameConfig, PlayerSettings};

/// Extra room around the playfield before things are culled
const OFFSCREEN_MARGIN: f32 = 2.0;

/// Shots leave the nose, not the center
const MUZZLE_OFFSET: f32 = 0.4;

pub fn update(ctx: &mut GameContext, dt: f32) {
    let player = ctx.current_player().filter(|&p| ctx.world.player_alive(p));

    if let Some(p) = player {
        steer_player(ctx, p);
        fire_weapons(&mut ctx.world, p, dt);
    }
    update_enemies(ctx, player, dt);
    update_coins(&mut ctx.world, dt);

    integrate(&mut ctx.world, dt);
    if let Some(p) = player {
        clamp_player(&mut ctx.world, p, &ctx.config.player);
    }
    age_projectiles(&mut ctx.world, &ctx.config.player, dt);
    cull_enemies(&mut ctx.world, &ctx.config.player);

    resolve_player_shots(&mut ctx.world, &mut ctx.events);
    if let Some(p) = player {
        resolve_hits_on_player(&mut ctx.world, &mut ctx.events, p, &ctx.config);
        collect_coins(&mut ctx.world, &mut ctx.events, p);
        detect_death(&mut ctx.world, &mut ctx.events, p);
    }

    tick_invincibility(&mut ctx.world);
    ctx.world.flush_despawns();
}

// =============================================================================
// Player
// =============================================================================

fn steer_player(ctx: &mut GameContext, player: Entity) {
    let velocity = ctx.steer.clamp_length_max(1.0) * ctx.config.player.speed;
    if let Some(v) = ctx.world.velocities.get_mut(player) {
        v.0 = velocity;
    }
}

fn clamp_player(world: &mut World, player: Entity, settings: &PlayerSettings) {
    let (bx, by) = settings.bounds;
    if let Some(pos) = world.positions.get_mut(player) {
        pos.0.x = pos.0.x.clamp(-bx, bx);
        pos.0.y = pos.0.y.clamp(-by, by);
    }
}

/// Every equipped weapon fires on its own cooldown.
fn fire_weapons(world: &mut World, player: Entity, dt: f32) {
    let Some(origin) = world.position(player) else { return };

    let mut volleys = Vec::new();
    if let Some(weapons) = world.weapons.get_mut(player) {
        for weapon in weapons.iter_mut() {
            weapon.cooldown -= dt;
            if weapon.cooldown <= 0.0 {
                weapon.cooldown = weapon.kind.fire_interval();
                volleys.push(weapon.kind);
            }
        }
    }

    let muzzle = origin + Vec2::new(0.0, MUZZLE_OFFSET);
    for kind in volleys {
        for &vx in kind.spread() {
            world.spawn_projectile(muzzle, Vec2::new(vx, kind.shot_speed()), Team::Player, kind.damage());
        }
    }
}

/// Damage the player unless they are still blinking from the last hit.
/// Returns true if the hit landed.
fn hurt_player(world: &mut World, player: Entity, amount: i32, invincible_frames: u8) -> bool {
    let Some(health) = world.health.get_mut(player) else { return false };
    if health.invincible_frames > 0 || health.is_dead() {
        return false;
    }
    health.damage(amount);
    health.invincible_frames = invincible_frames;
    true
}

/// Fire the death signal the first frame health reads zero.
fn detect_death(world: &mut World, events: &mut Events, player: Entity) {
    if !world.health.get(player).is_some_and(Health::is_dead) {
        return;
    }
    let Some(state) = world.players.get(player) else { return };
    if !state.is_alive() {
        return;
    }

    state.death.fire();
    let position = world.position(player).unwrap_or_default();
    events.player_died.send(PlayerDiedEvent { player, position });
}

// =============================================================================
// Enemies
// =============================================================================

/// Approach until the hover line, then strafe between the walls and shoot
/// at the player.
fn update_enemies(ctx: &mut GameContext, player: Option<Entity>, dt: f32) {
    let settings = &ctx.config.enemies;
    let target = player.and_then(|p| ctx.world.position(p));
    let edge = (ctx.config.player.bounds.0 - settings.radius).max(0.0);

    let mut shots = Vec::new();
    for e in ctx.world.handles(&ctx.world.enemies) {
        let Some(pos) = ctx.world.position(e) else { continue };
        let Some(enemy) = ctx.world.enemies.get_mut(e) else { continue };

        let velocity = steer_enemy(enemy, pos, edge, settings);

        if enemy.behavior == EnemyBehavior::Strafe {
            enemy.fire_timer -= dt;
            if enemy.fire_timer <= 0.0 {
                enemy.fire_timer = settings.fire_interval;
                if let Some(target) = target {
                    let aim = (target - pos).normalize_or_zero();
                    let aim = if aim == Vec2::ZERO { Vec2::NEG_Y } else { aim };
                    shots.push((pos, aim * settings.shot_speed));
                }
            }
        }

        if let Some(v) = ctx.world.velocities.get_mut(e) {
            v.0 = velocity;
        }
    }

    for (pos, velocity) in shots {
        ctx.world.spawn_projectile(pos, velocity, Team::Enemy, settings.shot_damage);
    }
}

fn steer_enemy(enemy: &mut Enemy, pos: Vec2, edge: f32, settings: &EnemySettings) -> Vec2 {
    if enemy.behavior == EnemyBehavior::Approach {
        if pos.y > settings.hover_height {
            return Vec2::new(0.0, -settings.speed);
        }
        enemy.behavior = EnemyBehavior::Strafe;
    }

    if (pos.x >= edge && enemy.strafe_dir > 0.0) || (pos.x <= -edge && enemy.strafe_dir < 0.0) {
        enemy.strafe_dir = -enemy.strafe_dir;
    }
    Vec2::new(enemy.strafe_dir * settings.speed, 0.0)
}

fn cull_enemies(world: &mut World, bounds: &PlayerSettings) {
    let floor = -(bounds.bounds.1 + OFFSCREEN_MARGIN);
    for e in world.handles(&world.enemies) {
        if world.position(e).is_some_and(|p| p.y < floor) {
            world.despawn(e);
        }
    }
}

// =============================================================================
// Coins
// =============================================================================

/// Run the drop-in effect: a coin falls while appearing and stops when the
/// effect ends.
pub fn update_coins(world: &mut World, dt: f32) {
    for coin in world.handles(&world.coins) {
        let Some(state) = world.coins.get_mut(coin) else { continue };
        if !state.is_appearing() {
            continue;
        }
        state.appear_remaining = (state.appear_remaining - dt).max(0.0);
        if !state.is_appearing() {
            if let Some(v) = world.velocities.get_mut(coin) {
                v.0 = Vec2::ZERO;
            }
        }
    }
}

fn collect_coins(world: &mut World, events: &mut Events, player: Entity) {
    let (Some(ppos), Some(pcol)) = (world.position(player), world.colliders.get(player).copied()) else {
        return;
    };

    for coin in world.handles(&world.coins) {
        let (Some(pos), Some(col)) = (world.position(coin), world.colliders.get(coin).copied()) else {
            continue;
        };
        if !pcol.overlaps(ppos, &col, pos) {
            continue;
        }
        let Some(state) = world.coins.get_mut(coin) else { continue };
        if state.collected {
            continue;
        }
        state.collected = true;
        world.despawn(coin);
        events.coin_collected.send(CoinCollectedEvent { coin, collector: player });
    }
}

// =============================================================================
// Movement / Projectiles
// =============================================================================

fn integrate(world: &mut World, dt: f32) {
    let moves: Vec<(Entity, Vec2)> = world
        .velocities
        .iter()
        .map(|(idx, v)| (world.entity_at(idx), v.0 * dt))
        .collect();

    for (entity, delta) in moves {
        if let Some(pos) = world.positions.get_mut(entity) {
            pos.0 += delta;
        }
    }
}

fn age_projectiles(world: &mut World, bounds: &PlayerSettings, dt: f32) {
    let (bx, by) = bounds.bounds;
    for shot in world.handles(&world.projectiles) {
        let expired = match world.projectiles.get_mut(shot) {
            Some(p) => {
                p.ttl -= dt;
                p.ttl <= 0.0
            }
            None => continue,
        };
        let outside = world.position(shot).is_some_and(|pos| {
            pos.x.abs() > bx + OFFSCREEN_MARGIN || pos.y.abs() > by + OFFSCREEN_MARGIN
        });
        if expired || outside {
            world.despawn(shot);
        }
    }
}

// =============================================================================
// Collisions
// =============================================================================

/// Player shots vs enemies. A shot hits at most one enemy.
fn resolve_player_shots(world: &mut World, events: &mut Events) {
    let shot_collider = Collider { radius: PROJECTILE_RADIUS };
    let enemies = world.handles(&world.enemies);

    for shot in world.handles(&world.projectiles) {
        let Some(projectile) = world.projectiles.get(shot).copied() else { continue };
        if projectile.team != Team::Player {
            continue;
        }
        let Some(shot_pos) = world.position(shot) else { continue };

        for &enemy in &enemies {
            if world.health.get(enemy).map_or(true, Health::is_dead) {
                continue;
            }
            let (Some(pos), Some(col)) = (world.position(enemy), world.colliders.get(enemy).copied()) else {
                continue;
            };
            if !shot_collider.overlaps(shot_pos, &col, pos) {
                continue;
            }

            world.despawn(shot);
            events.damage.send(DamageEvent {
                target: enemy,
                amount: projectile.damage,
                position: pos,
            });
            let lethal = world
                .health
                .get_mut(enemy)
                .is_some_and(|h| h.damage(projectile.damage));
            if lethal {
                world.despawn(enemy);
                events.enemy_killed.send(EnemyKilledEvent { enemy, position: pos });
            }
            break;
        }
    }
}

/// Enemy shots and enemy bodies vs the player. Ramming destroys the enemy.
fn resolve_hits_on_player(world: &mut World, events: &mut Events, player: Entity, config: &GameConfig) {
    let (Some(ppos), Some(pcol)) = (world.position(player), world.colliders.get(player).copied()) else {
        return;
    };
    let frames = config.player.invincible_frames;
    let shot_collider = Collider { radius: PROJECTILE_RADIUS };

    for shot in world.handles(&world.projectiles) {
        let Some(projectile) = world.projectiles.get(shot).copied() else { continue };
        if projectile.team != Team::Enemy {
            continue;
        }
        let Some(pos) = world.position(shot) else { continue };
        if !shot_collider.overlaps(pos, &pcol, ppos) {
            continue;
        }

        world.despawn(shot);
        if hurt_player(world, player, projectile.damage, frames) {
            events.damage.send(DamageEvent {
                target: player,
                amount: projectile.damage,
                position: ppos,
            });
        }
    }

    for enemy in world.handles(&world.enemies) {
        if world.health.get(enemy).map_or(true, Health::is_dead) {
            continue;
        }
        let (Some(pos), Some(col)) = (world.position(enemy), world.colliders.get(enemy).copied()) else {
            continue;
        };
        if !col.overlaps(pos, &pcol, ppos) {
            continue;
        }

        if let Some(h) = world.health.get_mut(enemy) {
            h.current = 0;
        }
        world.despawn(enemy);
        events.enemy_killed.send(EnemyKilledEvent { enemy, position: pos });

        let amount = config.enemies.contact_damage;
        if hurt_player(world, player, amount, frames) {
            events.damage.send(DamageEvent {
                target: player,
                amount,
                position: ppos,
            });
        }
    }
}

fn tick_invincibility(world: &mut World) {
    for (_, health) in world.health.iter_mut() {
        health.tick_invincibility();
    }
}
