//! Scene fade sequencer
//!
//! Idle -> FadingOut -> Swapping -> FadingIn -> Idle, driven by real time so
//! fades keep running while the game is paused. The swap is reported exactly
//! once, when the fade-out has fully covered the screen.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FadePhase {
    Idle,
    FadingOut,
    /// Screen fully covered; waiting for the new scene to start its fade-in
    Swapping,
    FadingIn,
}

/// Edge reported by [`FadeSequencer::tick`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FadeEvent {
    /// Fade-out finished: swap scenes now
    SwapReady,
    /// Fade-in finished: the new scene is fully visible
    FadeInComplete,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FadeSequencer {
    phase: FadePhase,
    /// Real time at which the current fade ends
    ends_at: f32,
    duration: f32,
    /// Scene visibility, 0 = fully covered, 1 = fully visible
    factor: f32,
}

impl Default for FadeSequencer {
    fn default() -> Self {
        Self {
            phase: FadePhase::Idle,
            ends_at: 0.0,
            duration: 0.0,
            factor: 1.0,
        }
    }
}

impl FadeSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a fade, replacing any fade in progress
    pub fn begin_fade(&mut self, fade_in: bool, now: f32, duration: f32) {
        if self.is_fading() {
            log::debug!("Fade {:?} interrupted", self.phase);
        }
        self.duration = duration.max(f32::EPSILON);
        self.ends_at = now + self.duration;
        if fade_in {
            self.phase = FadePhase::FadingIn;
            self.factor = 0.0;
        } else {
            self.phase = FadePhase::FadingOut;
            self.factor = 1.0;
        }
    }

    /// Advance to `now`. Returns the edge crossed this tick, if any.
    pub fn tick(&mut self, now: f32) -> Option<FadeEvent> {
        match self.phase {
            FadePhase::Idle | FadePhase::Swapping => None,
            FadePhase::FadingOut | FadePhase::FadingIn => {
                let fading_in = self.phase == FadePhase::FadingIn;
                if now >= self.ends_at {
                    if fading_in {
                        self.factor = 1.0;
                        self.phase = FadePhase::Idle;
                        Some(FadeEvent::FadeInComplete)
                    } else {
                        self.factor = 0.0;
                        self.phase = FadePhase::Swapping;
                        Some(FadeEvent::SwapReady)
                    }
                } else {
                    let t = 1.0 - (self.ends_at - now) / self.duration;
                    let t = t.clamp(0.0, 1.0);
                    self.factor = if fading_in { t } else { 1.0 - t };
                    None
                }
            }
        }
    }

    pub fn phase(&self) -> FadePhase {
        self.phase
    }

    /// Scene visibility (0 = covered, 1 = visible)
    pub fn factor(&self) -> f32 {
        self.factor
    }

    /// Opacity of the full-screen fader
    pub fn fader_alpha(&self) -> f32 {
        1.0 - self.factor
    }

    pub fn is_fading(&self) -> bool {
        matches!(self.phase, FadePhase::FadingOut | FadePhase::FadingIn)
    }
}
