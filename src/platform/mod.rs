//! Platform abstraction layer
//!
//! Bundles the collaborators the simulation talks to (scene graph, audio,
//! HUD) and defines the polled input device.

use crate::audio::{AudioSink, NullAudio};
use crate::renderer::{NullScene, SceneGraph};
use crate::ui::{Hud, NullHud};

/// Everything outside the simulation core
pub struct Services {
    pub scene: Box<dyn SceneGraph>,
    pub audio: Box<dyn AudioSink>,
    pub ui: Box<dyn Hud>,
}

impl Services {
    pub fn new(scene: Box<dyn SceneGraph>, audio: Box<dyn AudioSink>, ui: Box<dyn Hud>) -> Self {
        Self { scene, audio, ui }
    }

    /// No rendering, no sound, no UI
    pub fn headless() -> Self {
        Self::new(
            Box::new(NullScene::default()),
            Box::new(NullAudio::default()),
            Box::new(NullHud),
        )
    }
}

/// Polled input device (keyboard, gamepad, replay, autopilot)
pub trait InputSource {
    /// -1 (left), 0 or +1 (right)
    fn steering(&self) -> f32;
    /// 0 or 1
    fn acceleration(&self) -> f32;
    fn is_firing(&self) -> bool;
    fn is_pressing_confirm(&self) -> bool;
    /// Edge-triggered pause toggle
    fn pause_pressed(&self) -> bool;
    /// Debug "destroy all asteroids" button
    fn is_pressing_godmode(&self) -> bool;
}
