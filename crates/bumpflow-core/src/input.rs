//! Pointer events fed into the editor.

use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Mouse button identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

/// Pointer event in canvas coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PointerEvent {
    Down { position: Point, button: MouseButton },
    Up { position: Point, button: MouseButton },
    Move { position: Point },
}

impl PointerEvent {
    /// Left-button press at `position`.
    pub fn press(position: Point) -> Self {
        PointerEvent::Down {
            position,
            button: MouseButton::Left,
        }
    }

    /// Left-button release at `position`.
    pub fn release(position: Point) -> Self {
        PointerEvent::Up {
            position,
            button: MouseButton::Left,
        }
    }
}
