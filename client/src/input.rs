//! Keyboard sampling with edge detection for the action and debug keys

use macroquad::prelude::*;
use shared::InputState;

/// Debug switches pressed this frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Toggles {
    pub smoothing: bool,
    pub boxes: bool,
}

/// Turns raw key state into one [`InputState`] per rendered frame
pub struct InputManager {
    // Previous frame key states for edge detection
    prev_action: bool,
    prev_key_1: bool,
    prev_key_b: bool,
}

impl InputManager {
    pub fn new() -> Self {
        Self {
            prev_action: false,
            prev_key_1: false,
            prev_key_b: false,
        }
    }

    /// Samples the keyboard. Movement keys are level-triggered, everything
    /// else fires only on the frame the key goes down.
    pub fn update(&mut self) -> (InputState, Toggles) {
        let action = is_key_down(KeyCode::Space);
        let key_1 = is_key_down(KeyCode::Key1);
        let key_b = is_key_down(KeyCode::B);

        let input = InputState {
            up: is_key_down(KeyCode::W) || is_key_down(KeyCode::Up),
            down: is_key_down(KeyCode::S) || is_key_down(KeyCode::Down),
            left: is_key_down(KeyCode::A) || is_key_down(KeyCode::Left),
            right: is_key_down(KeyCode::D) || is_key_down(KeyCode::Right),
            action_pressed: rising_edge(action, self.prev_action),
        };

        let toggles = Toggles {
            smoothing: rising_edge(key_1, self.prev_key_1),
            boxes: rising_edge(key_b, self.prev_key_b),
        };

        self.prev_action = action;
        self.prev_key_1 = key_1;
        self.prev_key_b = key_b;

        (input, toggles)
    }
}

impl Default for InputManager {
    fn default() -> Self {
        Self::new()
    }
}

fn rising_edge(current: bool, previous: bool) -> bool {
    current && !previous
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_manager_creation() {
        let input_manager = InputManager::new();
        assert!(!input_manager.prev_action);
        assert!(!input_manager.prev_key_1);
    }

    #[test]
    fn test_rising_edge() {
        assert!(rising_edge(true, false));
        assert!(!rising_edge(true, true));
        assert!(!rising_edge(false, true));
        assert!(!rising_edge(false, false));
    }
}
