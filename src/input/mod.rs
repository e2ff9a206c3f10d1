//! Input handling with gamepad support
//!
//! Action-based input over keyboard and gamepad. The game only ever sees the
//! per-frame `InputFrame` produced by `InputState::poll`.
//!
//! Native: gilrs for gamepads
//! WASM: keyboard only

mod actions;
mod gamepad;
mod state;

pub use actions::Action;
pub use state::{InputFrame, InputState};
