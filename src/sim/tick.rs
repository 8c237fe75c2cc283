//! Per-frame input snapshot
//!
//! The controller polls the input device once per frame and hands the
//! snapshot down, so every consumer within a step sees the same values.

use serde::{Deserialize, Serialize};

use crate::platform::InputSource;

/// Input commands for a single step
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TickInput {
    /// -1 (left) to +1 (right)
    pub steering: f32,
    /// 0 to 1
    pub acceleration: f32,
    pub fire: bool,
    /// Confirm key held (respawn / next level / leave game over)
    pub confirm: bool,
    /// Pause toggle pressed this frame
    pub pause: bool,
    /// Debug "destroy all asteroids"
    pub godmode: bool,
}

impl TickInput {
    /// Snapshot the device. The godmode button only works in debug builds.
    pub fn poll(source: &dyn InputSource) -> Self {
        Self {
            steering: source.steering().clamp(-1.0, 1.0),
            acceleration: source.acceleration().clamp(0.0, 1.0),
            fire: source.is_firing(),
            confirm: source.is_pressing_confirm(),
            pause: source.pause_pressed(),
            godmode: cfg!(debug_assertions) && source.is_pressing_godmode(),
        }
    }
}

/// A snapshot doubles as a device that keeps reporting the same state
/// (replays, scripted tests)
impl InputSource for TickInput {
    fn steering(&self) -> f32 {
        self.steering
    }

    fn acceleration(&self) -> f32 {
        self.acceleration
    }

    fn is_firing(&self) -> bool {
        self.fire
    }

    fn is_pressing_confirm(&self) -> bool {
        self.confirm
    }

    fn pause_pressed(&self) -> bool {
        self.pause
    }

    fn is_pressing_godmode(&self) -> bool {
        self.godmode
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_poll_clamps_axes() {
        let raw = TickInput {
            steering: -3.0,
            acceleration: 2.0,
            fire: true,
            ..Default::default()
        };
        let polled = TickInput::poll(&raw);
        assert_eq!(polled.steering, -1.0);
        assert_eq!(polled.acceleration, 1.0);
        assert!(polled.fire);
        assert!(!polled.confirm);
    }

    #[test]
    fn test_godmode_only_in_debug_builds() {
        let raw = TickInput {
            godmode: true,
            ..Default::default()
        };
        assert_eq!(TickInput::poll(&raw).godmode, cfg!(debug_assertions));
    }
}
