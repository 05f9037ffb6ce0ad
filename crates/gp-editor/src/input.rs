//! Input abstraction layer.
//!
//! Normalizes browser pointer, click, context-menu and wheel events into a
//! unified `InputEvent` consumed by the interaction state machine. All
//! positions are in screen pixels relative to the canvas element.

use kurbo::Point;

/// Which button produced a press.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PointerButton {
    #[default]
    Primary,
    Middle,
    Secondary,
}

impl PointerButton {
    /// Map `PointerEvent.button`.
    pub fn from_dom(button: i16) -> Self {
        match button {
            1 => Self::Middle,
            2 => Self::Secondary,
            _ => Self::Primary,
        }
    }
}

/// A normalized input event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    PointerDown { at: Point, button: PointerButton },
    PointerMove { at: Point },
    PointerUp { at: Point },
    /// Fires after a press/release pair, possibly after a drag.
    Click { at: Point },
    /// Right click or long press.
    ContextMenu { at: Point },
    Wheel { at: Point, delta_y: f64 },
}

impl InputEvent {
    pub fn pointer_down(x: f64, y: f64, button: i16) -> Self {
        Self::PointerDown {
            at: Point::new(x, y),
            button: PointerButton::from_dom(button),
        }
    }

    pub fn pointer_move(x: f64, y: f64) -> Self {
        Self::PointerMove { at: Point::new(x, y) }
    }

    pub fn pointer_up(x: f64, y: f64) -> Self {
        Self::PointerUp { at: Point::new(x, y) }
    }

    pub fn click(x: f64, y: f64) -> Self {
        Self::Click { at: Point::new(x, y) }
    }

    pub fn context_menu(x: f64, y: f64) -> Self {
        Self::ContextMenu { at: Point::new(x, y) }
    }

    pub fn wheel(x: f64, y: f64, delta_y: f64) -> Self {
        Self::Wheel {
            at: Point::new(x, y),
            delta_y,
        }
    }

    /// Screen position of the event.
    pub fn position(&self) -> Point {
        match *self {
            Self::PointerDown { at, .. }
            | Self::PointerMove { at }
            | Self::PointerUp { at }
            | Self::Click { at }
            | Self::ContextMenu { at }
            | Self::Wheel { at, .. } => at,
        }
    }

    /// Whether the shape under the pointer matters for this event.
    pub fn needs_target(&self) -> bool {
        matches!(
            self,
            Self::PointerDown { .. } | Self::Click { .. } | Self::ContextMenu { .. }
        )
    }
}
