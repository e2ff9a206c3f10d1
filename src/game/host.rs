//! Game Host
//!
//! Owns the scheduler and the shared context and drives one tick per frame:
//!
//! 1. input (exit is a hard stop, nothing else runs)
//! 2. simulation systems
//! 3. event dispatch (coin pickups feed the economy)
//! 4. scheduler step (menu, session and spawner tasks)
//!
//! If the game-loop task dies while the fault policy says continue, the host
//! clears whatever the broken session left behind and starts a fresh loop on
//! the short menu. Under the break policy the host freezes instead: nothing
//! advances, the last frame stays on screen, and only exit is honored.

use std::cell::Ref;

use super::context::{GameContext, GameHandle};
use super::session::{self, PlayerFactory};
use super::{game_loop, systems};
use crate::config::GameConfig;
use crate::error::FaultPolicy;
use crate::input::InputFrame;
#[cfg(test)]
use crate::runtime::Clock;
use crate::runtime::{Scheduler, TaskExit, TaskId};

pub struct GameHost {
    scheduler: Scheduler,
    handle: GameHandle,
    factory: PlayerFactory,
    policy: FaultPolicy,
    root: TaskId,
    /// Fault policy said break; the frozen state stays up until exit
    halted: bool,
    finished: bool,
}

impl GameHost {
    pub fn new(config: GameConfig) -> Self {
        Self::with_factory(config, session::spawn_default_player)
    }

    pub fn with_factory(config: GameConfig, factory: PlayerFactory) -> Self {
        let policy = config.faults;
        let scheduler = Scheduler::new(policy);
        let ctx = GameContext::shared(config);
        let handle = GameHandle::new(ctx, scheduler.clock().clone(), scheduler.spawner().clone());
        let root = game_loop::start(&handle, true, factory);

        Self {
            scheduler,
            handle,
            factory,
            policy,
            root,
            halted: false,
            finished: false,
        }
    }

    pub fn tick(&mut self, dt: f32, input: &InputFrame) {
        if self.finished {
            return;
        }
        if input.exit {
            self.request_exit();
            return;
        }
        if self.halted {
            return;
        }

        {
            let mut ctx = self.handle.ctx.borrow_mut();
            apply_input(&mut ctx, input);
            systems::update(&mut ctx, dt);
        }

        if self.dispatch_events() {
            self.halt();
            return;
        }

        let report = self.scheduler.step(dt as f64);
        if report.halted {
            self.halt();
            return;
        }
        if let Some(exit) = report.exit_of(self.root) {
            self.restart_loop(exit);
        }
    }

    /// Hard stop: every suspended task is dropped where it stands.
    pub fn request_exit(&mut self) {
        if self.finished {
            return;
        }
        let dropped = self.scheduler.shutdown();
        self.finished = true;
        tracing::info!(dropped, "exit requested, tasks dropped");
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn is_halted(&self) -> bool {
        self.halted
    }

    pub fn context(&self) -> Ref<'_, GameContext> {
        self.handle.ctx.borrow()
    }

    #[cfg(test)]
    pub fn handle(&self) -> &GameHandle {
        &self.handle
    }

    #[cfg(test)]
    pub fn clock(&self) -> &Clock {
        self.scheduler.clock()
    }

    #[cfg(test)]
    pub fn task_count(&self) -> usize {
        self.scheduler.task_count()
    }

    /// Feed this frame's events to their listeners. Returns true if a fault
    /// asked to halt.
    fn dispatch_events(&mut self) -> bool {
        let mut guard = self.handle.ctx.borrow_mut();
        let ctx = &mut *guard;

        let collected: Vec<_> = ctx.events.coin_collected.drain().collect();
        let mut halt = false;
        for event in collected {
            tracing::trace!(coin = ?event.coin, "coin collected");
            if let Err(e) = ctx.collect_coin(event.collector) {
                halt |= self.policy.handle("coin-collected", &e);
            }
        }

        let player = ctx.current_player();
        for hit in ctx.events.damage.drain() {
            if Some(hit.target) == player {
                ctx.stats.damage_taken += hit.amount.max(0) as u32;
                tracing::debug!(amount = hit.amount, x = hit.position.x, y = hit.position.y, "player hit");
            }
        }

        for kill in ctx.events.enemy_killed.drain() {
            ctx.stats.enemies_killed += 1;
            tracing::trace!(enemy = ?kill.enemy, x = kill.position.x, y = kill.position.y, "enemy destroyed");
        }

        for death in ctx.events.player_died.drain() {
            ctx.stats.deaths += 1;
            tracing::info!(player = ?death.player, x = death.position.x, y = death.position.y, "player shot down");
        }

        ctx.events.clear_all();
        halt
    }

    /// The root task should never finish. If it does, recover.
    fn restart_loop(&mut self, exit: &TaskExit) {
        match exit {
            TaskExit::Faulted(error) => {
                tracing::warn!(%error, "game loop faulted, restarting")
            }
            TaskExit::Completed => tracing::warn!("game loop returned, restarting"),
        }

        {
            let mut ctx = self.handle.ctx.borrow_mut();
            if let Some(token) = ctx.current_session() {
                session::teardown(&mut ctx, token);
            }
            ctx.menu = None;
        }
        self.root = game_loop::start(&self.handle, false, self.factory);
    }

    fn halt(&mut self) {
        tracing::error!("halted by fault policy, press exit to quit");
        self.halted = true;
    }
}

fn apply_input(ctx: &mut GameContext, input: &InputFrame) {
    ctx.steer = input.steer;
    if input.start {
        ctx.request_start();
    }
    if let Some(show) = input.show_colliders {
        ctx.show_colliders = show;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::components::Team;
    use crate::game::entity::Entity;
    use crate::game::menu::MenuVariant;
    use macroquad::math::Vec2;

    const DT: f32 = 1.0 / 60.0;

    fn config(policy: FaultPolicy) -> GameConfig {
        GameConfig {
            seed: Some(21),
            faults: policy,
            ..GameConfig::default()
        }
    }

    fn idle() -> InputFrame {
        InputFrame::default()
    }

    fn start() -> InputFrame {
        InputFrame {
            start: true,
            ..InputFrame::default()
        }
    }

    fn not_a_player(ctx: &mut GameContext) -> Entity {
        ctx.world.spawn_at(Vec2::ZERO)
    }

    #[test]
    fn test_first_tick_shows_full_menu() {
        let mut host = GameHost::new(config(FaultPolicy::Continue));
        host.tick(DT, &idle());
        assert_eq!(host.context().menu, Some(MenuVariant::Full));
        assert!(host.context().current_session().is_none());
    }

    #[test]
    fn test_start_begins_session() {
        let mut host = GameHost::new(config(FaultPolicy::Continue));
        host.tick(DT, &idle());
        host.tick(DT, &start());

        let ctx = host.context();
        assert_eq!(ctx.menu, None);
        let player = ctx.current_player().unwrap();
        assert!(ctx.world.player_alive(player));
        assert_eq!(ctx.world.coins.count(), 1);
        assert!(ctx.world.enemies.count() > 0);
        assert_eq!(ctx.hud.text(), "0 coins");
    }

    #[test]
    fn test_death_returns_to_short_menu() {
        let mut host = GameHost::new(config(FaultPolicy::Continue));
        host.tick(DT, &idle());
        host.tick(DT, &start());
        for _ in 0..10 {
            host.tick(DT, &idle());
        }

        {
            let ctx = host.handle().ctx.clone();
            let mut ctx = ctx.borrow_mut();
            let player = ctx.current_player().unwrap();
            ctx.world.health.get_mut(player).unwrap().current = 0;
        }
        host.tick(DT, &idle());

        let ctx = host.context();
        assert_eq!(ctx.menu, Some(MenuVariant::Short));
        assert_eq!(ctx.world.enemies.count(), 0);
        assert_eq!(ctx.world.coins.count(), 0);
        assert_eq!(ctx.world.players.count(), 0);
        assert_eq!(ctx.world.projectiles.count(), 0);
        assert_eq!(ctx.stats.deaths, 1);
    }

    #[test]
    fn test_hits_on_player_are_counted() {
        let mut host = GameHost::new(config(FaultPolicy::Continue));
        host.tick(DT, &idle());
        host.tick(DT, &start());

        {
            let ctx = host.handle().ctx.clone();
            let mut ctx = ctx.borrow_mut();
            let player = ctx.current_player().unwrap();
            let pos = ctx.world.position(player).unwrap();
            ctx.world.spawn_projectile(pos, Vec2::ZERO, Team::Enemy, 5);
        }
        host.tick(DT, &idle());

        let ctx = host.context();
        assert_eq!(ctx.stats.damage_taken, 5);
        assert_eq!(ctx.stats.deaths, 0);
    }

    #[test]
    fn test_coin_pickup_updates_hud() {
        let mut host = GameHost::new(config(FaultPolicy::Continue));
        host.tick(DT, &idle());
        host.tick(DT, &start());

        {
            let ctx = host.handle().ctx.clone();
            let mut guard = ctx.borrow_mut();
            let ctx = &mut *guard;
            let player = ctx.current_player().unwrap();
            let pos = ctx.world.position(player).unwrap();
            ctx.world.spawn_coin(pos, &ctx.config.coins);
        }
        host.tick(DT, &idle());
        assert_eq!(host.context().hud.text(), "1 coins");
    }

    #[test]
    fn test_exit_stops_everything() {
        let mut host = GameHost::new(config(FaultPolicy::Continue));
        host.tick(DT, &idle());
        host.tick(DT, &start());
        assert!(host.task_count() > 0);

        host.tick(
            DT,
            &InputFrame {
                exit: true,
                ..InputFrame::default()
            },
        );
        assert!(host.is_finished());
        assert_eq!(host.task_count(), 0);

        // Later ticks do nothing, not even advance time
        let now = host.clock().now();
        host.tick(DT, &start());
        assert_eq!(host.clock().now(), now);
    }

    #[test]
    fn test_collider_toggle() {
        let mut host = GameHost::new(config(FaultPolicy::Continue));
        let show = InputFrame {
            show_colliders: Some(true),
            ..InputFrame::default()
        };
        host.tick(DT, &show);
        assert!(host.context().show_colliders);
        host.tick(DT, &idle());
        assert!(host.context().show_colliders);
        let hide = InputFrame {
            show_colliders: Some(false),
            ..InputFrame::default()
        };
        host.tick(DT, &hide);
        assert!(!host.context().show_colliders);
    }

    #[test]
    fn test_root_fault_restarts_on_short_menu() {
        let mut host = GameHost::with_factory(config(FaultPolicy::Continue), not_a_player);
        host.tick(DT, &idle());
        host.tick(DT, &start());
        // The replacement loop puts its menu up on the next step
        host.tick(DT, &idle());

        assert!(!host.is_finished());
        let ctx = host.context();
        assert_eq!(ctx.menu, Some(MenuVariant::Short));
        assert!(ctx.current_session().is_none());
    }

    #[test]
    fn test_faulted_starts_leave_no_entities() {
        let mut host = GameHost::with_factory(config(FaultPolicy::Continue), not_a_player);
        host.tick(DT, &idle());
        for _ in 0..3 {
            host.tick(DT, &start());
            host.tick(DT, &idle());
        }

        let ctx = host.context();
        assert_eq!(ctx.world.entity_count(), 0);
        assert!(ctx.current_session().is_none());
        assert_eq!(ctx.menu, Some(MenuVariant::Short));
    }

    #[test]
    fn test_break_policy_halts() {
        let mut host = GameHost::with_factory(config(FaultPolicy::Break), not_a_player);
        host.tick(DT, &idle());
        host.tick(DT, &start());
        assert!(host.is_halted());
        assert!(!host.is_finished());

        // Frozen: time stands still until exit
        let now = host.clock().now();
        host.tick(DT, &idle());
        assert_eq!(host.clock().now(), now);
        host.tick(
            DT,
            &InputFrame {
                exit: true,
                ..InputFrame::default()
            },
        );
        assert!(host.is_finished());
    }
}
