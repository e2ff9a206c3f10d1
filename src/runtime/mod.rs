//! Cooperative runtime
//!
//! A single-threaded task scheduler stepped once per frame, plus the
//! suspension points game logic awaits on:
//! - `Clock::sleep` / `Clock::sleep_while` for time
//! - `Signal::wait` for one-shot events (player death)
//! - `wait_until` for arbitrary state conditions (menu confirmation)

pub mod clock;
pub mod scheduler;
pub mod signal;

pub use clock::{wait_until, Clock};
pub use scheduler::{Scheduler, TaskExit, TaskId, TaskSpawner};
pub use signal::Signal;
