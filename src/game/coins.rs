//! Coin Spawner
//!
//! Drops one coin at a time above the player for as long as the session it
//! was started for is live: drop-in effect, a fixed lifetime, then the coin
//! is removed (a no-op if the player already grabbed it).
//!
//! Nobody stops this task explicitly. It checks its session token before
//! every coin and while waiting, and quits once the player is dead or a newer
//! session has taken over.

use macroquad::math::Vec2;
use rand::Rng;

use super::context::{GameHandle, SessionToken};
use super::entity::Entity;
use crate::error::GameResult;
use crate::runtime::{wait_until, TaskId};

pub fn start(handle: &GameHandle, token: SessionToken) -> TaskId {
    handle.tasks.spawn("coin-spawner", run(handle.clone(), token))
}

pub async fn run(handle: GameHandle, token: SessionToken) -> GameResult<()> {
    let mut spawned = 0u32;
    loop {
        let (coin, lifetime) = {
            let mut guard = handle.ctx.borrow_mut();
            let ctx = &mut *guard;
            if !ctx.session_live(token) {
                break;
            }
            let settings = &ctx.config.coins;
            let band = settings.band_half_width.max(0.0);
            let x = ctx.rng.gen_range(-band..=band);
            let coin = ctx.world.spawn_coin(Vec2::new(x, settings.spawn_height), settings);
            (coin, settings.lifetime_secs)
        };
        spawned += 1;

        appear_effect(&handle, coin, token).await;

        let ctx = handle.ctx.clone();
        handle
            .clock
            .sleep_while(lifetime as f64, move || ctx.borrow().session_live(token))
            .await;

        // Collected coins are already gone; despawning again is harmless
        handle.ctx.borrow_mut().world.despawn_immediate(coin);
    }

    tracing::debug!(generation = token.generation(), spawned, "coin spawner stopped");
    Ok(())
}

/// Completes when the coin's drop-in effect ends, the coin disappears, or
/// the session goes stale.
pub async fn appear_effect(handle: &GameHandle, coin: Entity, token: SessionToken) {
    let ctx = handle.ctx.clone();
    wait_until(move || {
        let ctx = ctx.borrow();
        !ctx.world.coin_appearing(coin) || !ctx.session_live(token)
    })
    .await;
}
