//! Shared Game Context
//!
//! Everything the tasks and systems share lives here instead of in globals:
//! the world, the economy, the HUD, the menu state and the authoritative
//! "current session" token. Tasks hold a `GameHandle` and borrow the context
//! only between suspension points, never across an `.await`.

use std::cell::RefCell;
use std::rc::Rc;

use macroquad::math::Vec2;
use rand::rngs::StdRng;
use rand::SeedableRng;

use super::components::WeaponKind;
use super::economy::Economy;
use super::enemies::EnemySpawner;
use super::entity::Entity;
use super::event::Events;
use super::hud::HudLabel;
use super::menu::MenuVariant;
use super::world::World;
use crate::config::GameConfig;
use crate::error::GameResult;
use crate::runtime::{Clock, TaskSpawner};

pub type SharedContext = Rc<RefCell<GameContext>>;

/// Identity of one session: a generation number plus the player handle.
///
/// Background tasks capture the token when they start and compare it with
/// the context's current one every iteration. A mismatch means their
/// session is over and they must stop touching the world.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionToken {
    generation: u64,
    player: Entity,
}

impl SessionToken {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn player(&self) -> Entity {
        self.player
    }
}

/// Counters for the whole run, logged on exit
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    pub sessions: u32,
    pub deaths: u32,
    pub enemies_killed: u32,
    pub damage_taken: u32,
    pub best_coins: u32,
}

pub struct GameContext {
    pub config: GameConfig,
    pub world: World,
    pub events: Events,
    pub economy: Economy,
    pub hud: HudLabel,
    /// Menu currently on screen, if any
    pub menu: Option<MenuVariant>,
    pub enemies: EnemySpawner,
    pub rng: StdRng,
    pub stats: RunStats,
    /// Steering input for this frame, x/y in [-1, 1]
    pub steer: Vec2,
    /// Collision debug overlay
    pub show_colliders: bool,
    start_pending: bool,
    generation: u64,
    session: Option<SessionToken>,
}

impl GameContext {
    pub fn new(config: GameConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            economy: Economy::new(config.economy.reward_every),
            config,
            world: World::new(),
            events: Events::new(),
            hud: HudLabel::default(),
            menu: None,
            enemies: EnemySpawner::new(),
            rng,
            stats: RunStats::default(),
            steer: Vec2::ZERO,
            show_colliders: false,
            start_pending: false,
            generation: 0,
            session: None,
        }
    }

    pub fn shared(config: GameConfig) -> SharedContext {
        Rc::new(RefCell::new(Self::new(config)))
    }

    // =========================================================================
    // Session Identity
    // =========================================================================

    /// Make `player` the current player. Any token issued before is stale.
    pub fn begin_session(&mut self, player: Entity) -> SessionToken {
        self.generation += 1;
        let token = SessionToken {
            generation: self.generation,
            player,
        };
        self.session = Some(token);
        self.stats.sessions += 1;
        token
    }

    /// Clear the current session if it is still `token`'s.
    pub fn end_session(&mut self, token: SessionToken) {
        if self.session == Some(token) {
            self.session = None;
        }
    }

    pub fn current_session(&self) -> Option<SessionToken> {
        self.session
    }

    pub fn current_player(&self) -> Option<Entity> {
        self.session.map(|t| t.player)
    }

    pub fn is_current(&self, token: SessionToken) -> bool {
        self.session == Some(token)
    }

    /// Staleness guard for background tasks: the token is current and its
    /// player is still flying.
    pub fn session_live(&self, token: SessionToken) -> bool {
        self.is_current(token) && self.world.player_alive(token.player)
    }

    // =========================================================================
    // Start Signal
    // =========================================================================

    pub fn request_start(&mut self) {
        self.start_pending = true;
    }

    /// Consume a pending start request.
    pub fn take_start(&mut self) -> bool {
        std::mem::take(&mut self.start_pending)
    }

    /// Forget presses made before the menu appeared.
    pub fn clear_start(&mut self) {
        self.start_pending = false;
    }

    // =========================================================================
    // Economy
    // =========================================================================

    pub fn reset_economy(&mut self) {
        self.economy.update(0, &mut self.hud);
    }

    /// Count a collected coin; every threshold equips the collector with a
    /// Mass Machine Gun.
    pub fn collect_coin(&mut self, collector: Entity) -> GameResult<()> {
        if self.economy.on_collected(&mut self.hud) {
            let kind = WeaponKind::MassMachineGun;
            self.world.grant_weapon(collector, kind)?;
            tracing::info!(coins = self.economy.coins(), weapon = kind.label(), "weapon upgrade granted");
        }
        self.stats.best_coins = self.stats.best_coins.max(self.economy.coins());
        Ok(())
    }
}

/// What every task captures: shared state, the clock and a way to start
/// more tasks.
#[derive(Clone)]
pub struct GameHandle {
    pub ctx: SharedContext,
    pub clock: Clock,
    pub tasks: TaskSpawner,
}

impl GameHandle {
    pub fn new(ctx: SharedContext, clock: Clock, tasks: TaskSpawner) -> Self {
        Self { ctx, clock, tasks }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_context() -> GameContext {
        GameContext::new(GameConfig {
            seed: Some(1),
            ..GameConfig::default()
        })
    }

    #[test]
    fn test_new_session_invalidates_old_token() {
        let mut ctx = test_context();
        let p1 = ctx.world.spawn_player(&ctx.config.player.clone());
        let t1 = ctx.begin_session(p1);
        assert!(ctx.session_live(t1));

        let p2 = ctx.world.spawn_player(&ctx.config.player.clone());
        let t2 = ctx.begin_session(p2);
        assert!(!ctx.is_current(t1));
        assert!(!ctx.session_live(t1));
        assert!(ctx.session_live(t2));

        // Ending a stale token leaves the current session alone
        ctx.end_session(t1);
        assert_eq!(ctx.current_session(), Some(t2));
        ctx.end_session(t2);
        assert_eq!(ctx.current_session(), None);
    }

    #[test]
    fn test_same_player_new_generation_is_stale() {
        let mut ctx = test_context();
        let p = ctx.world.spawn_player(&ctx.config.player.clone());
        let t1 = ctx.begin_session(p);
        let t2 = ctx.begin_session(p);
        assert_ne!(t1, t2);
        assert!(!ctx.session_live(t1));
    }

    #[test]
    fn test_start_request_is_consumed_once() {
        let mut ctx = test_context();
        assert!(!ctx.take_start());
        ctx.request_start();
        assert!(ctx.take_start());
        assert!(!ctx.take_start());

        ctx.request_start();
        ctx.clear_start();
        assert!(!ctx.take_start());
    }

    #[test]
    fn test_collect_coin_grants_every_fifth() {
        let mut ctx = test_context();
        let p = ctx.world.spawn_player(&ctx.config.player.clone());
        ctx.begin_session(p);
        ctx.reset_economy();

        for _ in 0..10 {
            ctx.collect_coin(p).unwrap();
        }
        assert_eq!(ctx.world.weapons_of(p).len(), 3);
        assert_eq!(ctx.hud.text(), "10 coins");
        assert_eq!(ctx.stats.best_coins, 10);
    }
}
