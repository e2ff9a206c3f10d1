//! Player Session
//!
//! One playthrough: zero the economy, spawn the player, start both spawners,
//! then sleep until the player's death signal fires. Teardown removes every
//! enemy, every shot and the player before the session returns, so the next
//! session starts on an empty playfield.
//!
//! The coin spawner is not stopped here. It notices the session token went
//! stale and retires its own coin.

use macroquad::math::Vec2;

use super::coins;
use super::context::{GameContext, GameHandle, SessionToken};
use super::enemies;
use super::entity::Entity;
use crate::error::GameResult;

/// Creates the session's player. Must return an entity with a player
/// component; anything else faults the session.
pub type PlayerFactory = fn(&mut GameContext) -> Entity;

pub fn spawn_default_player(ctx: &mut GameContext) -> Entity {
    ctx.world.spawn_player(&ctx.config.player)
}

/// Run a session to completion. Only returns once the player is dead and
/// everything the session spawned is gone.
pub async fn run_session(handle: &GameHandle, factory: PlayerFactory) -> GameResult<()> {
    let (token, death) = {
        let mut guard = handle.ctx.borrow_mut();
        let ctx = &mut *guard;
        ctx.reset_economy();
        ctx.steer = Vec2::ZERO;

        let player = factory(ctx);
        let death = match ctx.world.player_death(player) {
            Ok(death) => death,
            Err(e) => {
                ctx.world.despawn_immediate(player);
                return Err(e);
            }
        };
        (ctx.begin_session(player), death)
    };
    tracing::info!(generation = token.generation(), "session started");

    enemies::start_spawning(handle);
    coins::start(handle, token);

    death.wait().await;

    teardown(&mut handle.ctx.borrow_mut(), token);
    Ok(())
}

/// Remove what a session leaves behind and retire its token.
pub fn teardown(ctx: &mut GameContext, token: SessionToken) {
    let enemies = ctx.enemies.kill_all(&mut ctx.world);
    let shots = ctx.world.clear_projectiles();
    ctx.world.despawn_immediate(token.player());
    ctx.end_session(token);

    tracing::info!(
        generation = token.generation(),
        coins = ctx.economy.coins(),
        waves = ctx.enemies.waves_spawned(),
        enemies,
        shots,
        "session ended"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::error::{FaultPolicy, GameError};
    use crate::runtime::{Scheduler, TaskExit, TaskId};

    fn setup() -> (Scheduler, GameHandle) {
        let sched = Scheduler::new(FaultPolicy::Continue);
        let ctx = GameContext::shared(GameConfig {
            seed: Some(11),
            ..GameConfig::default()
        });
        let handle = GameHandle::new(ctx, sched.clock().clone(), sched.spawner().clone());
        (sched, handle)
    }

    fn spawn_session(handle: &GameHandle, factory: PlayerFactory) -> TaskId {
        let h = handle.clone();
        handle
            .tasks
            .spawn("session", async move { run_session(&h, factory).await })
    }

    fn kill_player(handle: &GameHandle) {
        let ctx = handle.ctx.borrow();
        let player = ctx.current_player().unwrap();
        ctx.world.players.get(player).unwrap().death.fire();
    }

    #[test]
    fn test_immortal_player_never_completes() {
        let (mut sched, handle) = setup();
        let id = spawn_session(&handle, spawn_default_player);

        for _ in 0..1000 {
            let report = sched.step(0.1);
            assert!(report.exit_of(id).is_none());
        }
        assert!(sched.is_alive(id));
        assert!(handle.ctx.borrow().current_session().is_some());
    }

    #[test]
    fn test_session_starts_spawners() {
        let (mut sched, handle) = setup();
        spawn_session(&handle, spawn_default_player);
        sched.step(0.1);

        let ctx = handle.ctx.borrow();
        assert!(ctx.enemies.is_running());
        assert!(ctx.world.enemies.count() > 0);
        assert_eq!(ctx.world.coins.count(), 1);
        assert_eq!(ctx.hud.text(), "0 coins");
    }

    #[test]
    fn test_death_tears_everything_down() {
        let (mut sched, handle) = setup();
        let id = spawn_session(&handle, spawn_default_player);
        sched.step(0.1);
        let player = handle.ctx.borrow().current_player().unwrap();
        handle
            .ctx
            .borrow_mut()
            .world
            .spawn_projectile(Vec2::ZERO, Vec2::Y, crate::game::components::Team::Player, 1);

        kill_player(&handle);
        let report = sched.step(0.1);

        assert_eq!(report.exit_of(id), Some(&TaskExit::Completed));
        let ctx = handle.ctx.borrow();
        assert!(!ctx.world.is_alive(player));
        assert!(!ctx.enemies.is_running());
        assert_eq!(ctx.world.enemies.count(), 0);
        assert_eq!(ctx.world.coins.count(), 0);
        assert_eq!(ctx.world.projectiles.count(), 0);
        assert_eq!(ctx.current_session(), None);
        assert_eq!(sched.task_count(), 0);
    }

    #[test]
    fn test_next_session_sees_nothing_from_previous() {
        let (mut sched, handle) = setup();
        spawn_session(&handle, spawn_default_player);
        sched.step(0.1);
        let (old_coin, old_enemies) = {
            let ctx = handle.ctx.borrow();
            (ctx.world.handles(&ctx.world.coins)[0], ctx.world.handles(&ctx.world.enemies))
        };

        kill_player(&handle);
        sched.step(0.1);
        spawn_session(&handle, spawn_default_player);
        sched.step(0.1);

        let ctx = handle.ctx.borrow();
        assert!(!ctx.world.is_alive(old_coin));
        assert!(old_enemies.iter().all(|&e| !ctx.world.is_alive(e)));
        assert_eq!(ctx.world.coins.count(), 1);
        assert_eq!(ctx.world.players.count(), 1);
    }

    #[test]
    fn test_economy_reset_at_start() {
        let (mut sched, handle) = setup();
        {
            let mut ctx = handle.ctx.borrow_mut();
            let mut hud = crate::game::hud::HudLabel::default();
            ctx.economy.update(3, &mut hud);
        }
        spawn_session(&handle, spawn_default_player);
        sched.step(0.1);

        let ctx = handle.ctx.borrow();
        assert_eq!(ctx.economy.coins(), 0);
        assert_eq!(ctx.hud.text(), "0 coins");
    }

    #[test]
    fn test_factory_without_player_faults() {
        fn not_a_player(ctx: &mut GameContext) -> Entity {
            ctx.world.spawn_at(Vec2::ZERO)
        }

        let (mut sched, handle) = setup();
        let id = spawn_session(&handle, not_a_player);
        let report = sched.step(0.1);

        assert!(matches!(
            report.exit_of(id),
            Some(TaskExit::Faulted(GameError::NotAPlayer(_)))
        ));
        let ctx = handle.ctx.borrow();
        assert_eq!(ctx.current_session(), None);
        assert!(!ctx.enemies.is_running());
        // The rejected entity does not outlive the failed session
        assert_eq!(ctx.world.entity_count(), 0);
    }
}
