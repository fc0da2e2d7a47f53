use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Pointer button relevant to camera manipulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PointerButton {
    /// Drives the dolly drag.
    Left,
    /// Drives the orbit drag.
    Right,
}

/// Pointer event delivered by the platform loop.
///
/// The window layer maps its own event types into these so the camera
/// controller stays independent of any particular windowing crate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PointerEvent {
    ButtonDown {
        button: PointerButton,
        position: Vec2,
    },
    ButtonUp {
        button: PointerButton,
    },
    Moved {
        position: Vec2,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_round_trip_through_serde() {
        let event = PointerEvent::ButtonDown {
            button: PointerButton::Right,
            position: Vec2::new(100.0, 100.0),
        };
        let json = serde_json::to_string(&event).unwrap();
        let back: PointerEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(event, back);
    }
}
