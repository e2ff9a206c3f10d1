//! Game Module
//!
//! A small ECS-style world plus the async game flow layered on top of it.
//!
//! Key concepts:
//! - Entity: generational index for safe entity references
//! - Component: plain data structs attached to entities
//! - World: container for all entities and their components
//! - Event: decoupled communication between systems and listeners
//! - Tasks: the game loop, sessions and spawners are futures driven by the
//!   scheduler in `crate::runtime`, one step per frame
//!
//! Flow: `host` ticks `systems` (simulation) and then the scheduler, which
//! runs `game_loop` -> `menu` -> `session` -> (`enemies`, `coins`).

pub mod entity;
pub mod component;
pub mod components;
pub mod world;
pub mod event;
pub mod hud;
pub mod economy;
pub mod context;
pub mod menu;
pub mod coins;
pub mod enemies;
pub mod session;
pub mod game_loop;
pub mod systems;
pub mod host;
pub mod renderer;

// Re-export main types
pub use entity::Entity;
pub use host::GameHost;
