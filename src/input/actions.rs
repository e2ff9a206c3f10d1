//! Game action definitions

/// Everything the player can ask for
///
/// Keyboard / gamepad:
/// - Steer*: arrows or WASD / left stick or d-pad
/// - Start: Enter or Space / Start or A
/// - Exit: Esc / Select
/// - ShowColliders / HideColliders: C / V (keyboard only)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    SteerUp,
    SteerDown,
    SteerLeft,
    SteerRight,

    Start,
    Exit,

    // Collision debug overlay
    ShowColliders,
    HideColliders,
}
