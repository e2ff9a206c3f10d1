//! Error types and fault policy
//!
//! Task futures return `Result<(), GameError>`. Nothing inside a task
//! recovers from a fault; the scheduler hands every error (or caught panic)
//! to the `FaultPolicy` configured for the process.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::game::Entity;

/// Result alias used by game tasks and world operations.
pub type GameResult<T> = Result<T, GameError>;

/// Faults raised by world/capability calls.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GameError {
    /// Operation targeted an entity that was already despawned
    #[error("entity {0:?} is not alive")]
    DeadEntity(Entity),

    /// Entity is alive but lacks the player component
    #[error("entity {0:?} is not a player")]
    NotAPlayer(Entity),

    /// A task panicked while being polled
    #[error("task '{task}' panicked: {message}")]
    Panicked { task: &'static str, message: String },
}

/// What to do with a task fault.
///
/// `Break` mirrors "stop in the debugger": the host halts so the state can be
/// inspected. `Continue` logs the fault, marks it handled and keeps running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FaultPolicy {
    #[default]
    Continue,
    Break,
}

impl FaultPolicy {
    /// Report a fault. Returns true if execution should stop.
    pub fn handle(self, task: &'static str, error: &GameError) -> bool {
        match self {
            FaultPolicy::Continue => {
                tracing::error!(task, %error, "task faulted, continuing");
                false
            }
            FaultPolicy::Break => {
                tracing::error!(task, %error, "task faulted, halting");
                true
            }
        }
    }
}

/// Turn a `catch_unwind` payload into a readable message.
pub fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
