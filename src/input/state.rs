//! Input state management
//!
//! Polls keyboard (macroquad) and gamepad (gilrs) once per frame and folds
//! them into an `InputFrame`, the only thing the game host ever sees.

use macroquad::prelude::*;

use super::gamepad::{button, Gamepad};
use super::Action;

/// One frame of player intent
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct InputFrame {
    /// Steering, y up, length <= 1
    pub steer: Vec2,
    pub start: bool,
    pub exit: bool,
    /// `Some(true)` show, `Some(false)` hide, `None` leave as is
    pub show_colliders: Option<bool>,
}

/// Unified input state that handles both keyboard and gamepad
pub struct InputState {
    gamepad: Gamepad,
}

impl InputState {
    pub fn new() -> Self {
        Self {
            gamepad: Gamepad::new(),
        }
    }

    /// Call once per frame
    pub fn poll(&mut self) -> InputFrame {
        self.gamepad.poll();

        let show_colliders = if self.action_pressed(Action::ShowColliders) {
            Some(true)
        } else if self.action_pressed(Action::HideColliders) {
            Some(false)
        } else {
            None
        };

        InputFrame {
            steer: self.steer(),
            start: self.action_pressed(Action::Start),
            exit: self.action_pressed(Action::Exit),
            show_colliders,
        }
    }

    /// Keyboard/d-pad direction, or the stick when it is pushed further
    fn steer(&self) -> Vec2 {
        let mut digital = Vec2::ZERO;
        if self.action_down(Action::SteerUp) { digital.y += 1.0; }
        if self.action_down(Action::SteerDown) { digital.y -= 1.0; }
        if self.action_down(Action::SteerLeft) { digital.x -= 1.0; }
        if self.action_down(Action::SteerRight) { digital.x += 1.0; }

        combine_steer(digital, self.gamepad.left_stick())
    }

    pub fn action_down(&self, action: Action) -> bool {
        self.keyboard_down(action) || self.gamepad_down(action)
    }

    /// Check if action was just pressed this frame
    pub fn action_pressed(&self, action: Action) -> bool {
        self.keyboard_pressed(action) || self.gamepad_pressed(action)
    }

    fn keyboard_down(&self, action: Action) -> bool {
        match action {
            Action::SteerUp => is_key_down(KeyCode::W) || is_key_down(KeyCode::Up),
            Action::SteerDown => is_key_down(KeyCode::S) || is_key_down(KeyCode::Down),
            Action::SteerLeft => is_key_down(KeyCode::A) || is_key_down(KeyCode::Left),
            Action::SteerRight => is_key_down(KeyCode::D) || is_key_down(KeyCode::Right),
            _ => false,
        }
    }

    fn gamepad_down(&self, action: Action) -> bool {
        match action {
            Action::SteerUp => self.gamepad.is_button_down(button::DPAD_UP),
            Action::SteerDown => self.gamepad.is_button_down(button::DPAD_DOWN),
            Action::SteerLeft => self.gamepad.is_button_down(button::DPAD_LEFT),
            Action::SteerRight => self.gamepad.is_button_down(button::DPAD_RIGHT),
            _ => false,
        }
    }

    fn keyboard_pressed(&self, action: Action) -> bool {
        match action {
            Action::Start => is_key_pressed(KeyCode::Enter) || is_key_pressed(KeyCode::Space),
            Action::Exit => is_key_pressed(KeyCode::Escape),
            Action::ShowColliders => is_key_pressed(KeyCode::C),
            Action::HideColliders => is_key_pressed(KeyCode::V),
            _ => false,
        }
    }

    fn gamepad_pressed(&self, action: Action) -> bool {
        match action {
            Action::Start => {
                self.gamepad.is_button_pressed(button::START) || self.gamepad.is_button_pressed(button::A)
            }
            Action::Exit => self.gamepad.is_button_pressed(button::SELECT),
            _ => false,
        }
    }

    pub fn has_gamepad(&self) -> bool {
        self.gamepad.has_gamepad()
    }
}

impl Default for InputState {
    fn default() -> Self {
        Self::new()
    }
}

/// Take whichever source is pushed further, normalized so diagonals are not
/// faster.
pub fn combine_steer(digital: Vec2, stick: Vec2) -> Vec2 {
    let result = if stick.length() > digital.length() { stick } else { digital };
    if result.length() > 1.0 {
        result.normalize()
    } else {
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagonal_is_normalized() {
        let steer = combine_steer(Vec2::new(1.0, 1.0), Vec2::ZERO);
        assert!((steer.length() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_stronger_source_wins() {
        let stick = Vec2::new(0.3, 0.0);
        assert_eq!(combine_steer(Vec2::ZERO, stick), stick);
        assert_eq!(combine_steer(Vec2::new(0.0, -1.0), stick), Vec2::new(0.0, -1.0));
    }
}
