//! Game Loop
//!
//! The root task: menu, session, menu, session, ... forever. The first menu
//! of a run is the full one; after that the player gets the short prompt.
//! Only the host can stop it, by shutting the scheduler down.

use super::context::GameHandle;
use super::menu::{self, MenuVariant};
use super::session::{self, PlayerFactory};
use crate::error::GameResult;
use crate::runtime::TaskId;

pub fn start(handle: &GameHandle, first_cycle: bool, factory: PlayerFactory) -> TaskId {
    handle
        .tasks
        .spawn("game-loop", run_game_loop(handle.clone(), first_cycle, factory))
}

pub async fn run_game_loop(handle: GameHandle, first_cycle: bool, factory: PlayerFactory) -> GameResult<()> {
    let mut first = first_cycle;
    let mut cycle = 0u32;
    loop {
        cycle += 1;
        tracing::debug!(cycle, "game loop cycle");

        menu::show_start_menu(&handle, MenuVariant::for_cycle(first)).await;
        menu::dismiss(&handle);

        session::run_session(&handle, factory).await?;
        first = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::error::FaultPolicy;
    use crate::game::context::GameContext;
    use crate::game::session::spawn_default_player;
    use crate::runtime::Scheduler;

    fn setup() -> (Scheduler, GameHandle) {
        let sched = Scheduler::new(FaultPolicy::Continue);
        let ctx = GameContext::shared(GameConfig {
            seed: Some(5),
            ..GameConfig::default()
        });
        let handle = GameHandle::new(ctx, sched.clock().clone(), sched.spawner().clone());
        (sched, handle)
    }

    fn kill_player(handle: &GameHandle) {
        let ctx = handle.ctx.borrow();
        let player = ctx.current_player().unwrap();
        ctx.world.players.get(player).unwrap().death.fire();
    }

    #[test]
    fn test_full_menu_then_short_menu() {
        let (mut sched, handle) = setup();
        start(&handle, true, spawn_default_player);

        sched.step(0.1);
        assert_eq!(handle.ctx.borrow().menu, Some(MenuVariant::Full));

        handle.ctx.borrow_mut().request_start();
        sched.step(0.1);
        assert_eq!(handle.ctx.borrow().menu, None);
        assert!(handle.ctx.borrow().current_session().is_some());

        kill_player(&handle);
        sched.step(0.1);
        assert_eq!(handle.ctx.borrow().menu, Some(MenuVariant::Short));
        assert_eq!(handle.ctx.borrow().current_session(), None);
    }

    #[test]
    fn test_menu_waits_for_start() {
        let (mut sched, handle) = setup();
        start(&handle, true, spawn_default_player);

        // A press before the menu is up does not count
        handle.ctx.borrow_mut().request_start();
        for _ in 0..50 {
            sched.step(0.1);
        }
        let ctx = handle.ctx.borrow();
        assert_eq!(ctx.menu, Some(MenuVariant::Full));
        assert_eq!(ctx.current_session(), None);
        assert_eq!(ctx.world.entity_count(), 0);
    }

    #[test]
    fn test_sessions_never_overlap() {
        let (mut sched, handle) = setup();
        start(&handle, true, spawn_default_player);
        sched.step(0.1);

        for round in 0..3 {
            handle.ctx.borrow_mut().request_start();
            sched.step(0.1);
            assert_eq!(handle.ctx.borrow().world.players.count(), 1, "round {}", round);

            kill_player(&handle);
            sched.step(0.1);
            let ctx = handle.ctx.borrow();
            assert_eq!(ctx.world.entity_count(), 0, "round {}", round);
            assert_eq!(ctx.menu, Some(MenuVariant::Short));
        }
        assert_eq!(handle.ctx.borrow().stats.sessions, 3);
    }
}
