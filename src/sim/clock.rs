//! Simulation clock
//!
//! Two timelines: scaled game time drives entities and timed gameplay
//! (projectile expiry, fire cooldowns, spawn delays); real time drives scene
//! fades so they keep running while the game is paused.

use serde::{Deserialize, Serialize};

/// Longest frame accepted before clamping (avoids huge steps after a stall)
pub const MAX_FRAME_DT: f32 = 0.1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Clock {
    /// Scaled game time (seconds)
    pub time: f32,
    /// Scaled duration of the current step
    pub delta_time: f32,
    /// Unscaled time since start
    pub real_time: f32,
    /// Unscaled duration of the current step
    pub real_delta_time: f32,
    /// 0 while paused, 1 otherwise
    scale: f32,
}

impl Default for Clock {
    fn default() -> Self {
        Self {
            time: 0.0,
            delta_time: 0.0,
            real_time: 0.0,
            real_delta_time: 0.0,
            scale: 1.0,
        }
    }
}

impl Clock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance both timelines by one frame
    pub fn advance(&mut self, real_dt: f32) {
        let real_dt = real_dt.clamp(0.0, MAX_FRAME_DT);
        self.real_delta_time = real_dt;
        self.real_time += real_dt;
        self.delta_time = real_dt * self.scale;
        self.time += self.delta_time;
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn set_scale(&mut self, scale: f32) {
        self.scale = scale.max(0.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scale_freezes_game_time_only() {
        let mut clock = Clock::new();
        clock.advance(0.05);
        clock.set_scale(0.0);
        clock.advance(0.05);

        assert!((clock.time - 0.05).abs() < 1e-6);
        assert_eq!(clock.delta_time, 0.0);
        assert!((clock.real_time - 0.1).abs() < 1e-6);
    }

    #[test]
    fn test_long_frames_clamped() {
        let mut clock = Clock::new();
        clock.advance(3.0);
        assert_eq!(clock.real_delta_time, MAX_FRAME_DT);
        clock.advance(-1.0);
        assert_eq!(clock.real_delta_time, 0.0);
    }
}
