//! Test doubles: collaborators that record every call

use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use crate::audio::{AudioSink, SoundHandle};
use crate::platform::Services;
use crate::renderer::{EffectHandle, NodeId, NodeTransform, SceneGraph};
use crate::settings::Settings;
use crate::sim::clock::Clock;
use crate::sim::collision::CollisionHandler;
use crate::sim::entity::{Bounds, EntityIds, StepContext};
use crate::tuning::Tuning;
use crate::ui::{Hud, StatusLabel};

/// One recorded collaborator call
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    CreateNode(NodeId),
    DestroyNode(NodeId),
    Effect(String, Vec2),
    LightFlash(Vec2),
    AddPostEffect(String),
    RemovePostEffect(String),
    Shake(f32),
    Fader(f32),
    Background(u32),
    ClearScene,
    Sound(String, bool),
    StopSound(SoundHandle),
    Gain(SoundHandle, f32),
    SetScore(u32),
    AddScore(u32),
    ShipCount(u32),
    Label(StatusLabel),
    HideLabels,
    Hud(bool),
    MainMenu(bool),
    PauseMenu(bool),
}

#[derive(Debug, Default)]
struct Log {
    calls: Vec<Call>,
    missing: HashSet<String>,
    next_id: u32,
}

/// Shared call log implementing every collaborator trait
#[derive(Debug, Clone, Default)]
pub struct Recorder {
    log: Rc<RefCell<Log>>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Services whose every call lands in this recorder
    pub fn services(&self) -> Services {
        Services::new(
            Box::new(self.clone()),
            Box::new(self.clone()),
            Box::new(self.clone()),
        )
    }

    /// Make a named asset unavailable
    pub fn mark_missing(&self, name: &str) {
        self.log.borrow_mut().missing.insert(name.to_string());
    }

    pub fn calls(&self) -> Vec<Call> {
        self.log.borrow().calls.clone()
    }

    pub fn clear(&self) {
        self.log.borrow_mut().calls.clear();
    }

    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.log.borrow().calls.iter().filter(|c| pred(c)).count()
    }

    pub fn count_effects(&self, name: &str) -> usize {
        self.count(|c| matches!(c, Call::Effect(n, _) if n == name))
    }

    pub fn count_sounds(&self, name: &str) -> usize {
        self.count(|c| matches!(c, Call::Sound(n, _) if n == name))
    }

    pub fn count_destroyed_nodes(&self) -> usize {
        self.count(|c| matches!(c, Call::DestroyNode(_)))
    }

    pub fn has_label(&self, label: StatusLabel) -> bool {
        self.count(|c| *c == Call::Label(label)) > 0
    }

    fn push(&self, call: Call) {
        self.log.borrow_mut().calls.push(call);
    }

    fn is_missing(&self, name: &str) -> bool {
        self.log.borrow().missing.contains(name)
    }

    fn allocate(&self) -> u32 {
        let mut log = self.log.borrow_mut();
        log.next_id += 1;
        log.next_id
    }
}

impl SceneGraph for Recorder {
    fn create_node(&mut self, _parent: Option<NodeId>) -> Option<NodeId> {
        let node = NodeId(self.allocate());
        self.push(Call::CreateNode(node));
        Some(node)
    }

    fn destroy_node(&mut self, node: NodeId) {
        self.push(Call::DestroyNode(node));
    }

    fn attach_model(&mut self, _node: NodeId, model: &str) -> bool {
        !self.is_missing(model)
    }

    fn attach_sprite(&mut self, _node: NodeId, sprite: &str) -> bool {
        !self.is_missing(sprite)
    }

    fn set_transform(&mut self, _node: NodeId, _transform: NodeTransform) {}

    fn spawn_effect(&mut self, name: &str, position: Vec2) -> Option<EffectHandle> {
        if self.is_missing(name) {
            return None;
        }
        self.push(Call::Effect(name.to_string(), position));
        Some(EffectHandle(self.allocate()))
    }

    fn move_effect(&mut self, _effect: EffectHandle, _position: Vec2, _heading_deg: f32) {}

    fn set_effect_emitting(&mut self, _effect: EffectHandle, _emitting: bool) {}

    fn spawn_light_flash(&mut self, position: Vec2, _color: [u8; 3], _intensity: f32, _duration: f32) {
        self.push(Call::LightFlash(position));
    }

    fn add_post_effect(&mut self, name: &str) -> bool {
        if self.is_missing(name) {
            return false;
        }
        self.push(Call::AddPostEffect(name.to_string()));
        true
    }

    fn remove_post_effect(&mut self, name: &str) {
        self.push(Call::RemovePostEffect(name.to_string()));
    }

    fn set_post_effect_param(&mut self, _name: &str, _param: &str, _value: f32) {}

    fn shake_camera(&mut self, intensity: f32, _duration: f32) {
        self.push(Call::Shake(intensity));
    }

    fn set_fader(&mut self, alpha: f32) {
        self.push(Call::Fader(alpha));
    }

    fn set_background(&mut self, index: u32) {
        self.push(Call::Background(index));
    }

    fn view_bounds(&self) -> Option<(Vec2, Vec2)> {
        Some((Vec2::new(-30.0, -18.0), Vec2::new(30.0, 18.0)))
    }

    fn clear(&mut self) {
        self.push(Call::ClearScene);
    }
}

impl AudioSink for Recorder {
    fn play(&mut self, name: &str, looping: bool) -> Option<SoundHandle> {
        if self.is_missing(name) {
            return None;
        }
        self.push(Call::Sound(name.to_string(), looping));
        Some(SoundHandle(self.allocate()))
    }

    fn stop(&mut self, sound: SoundHandle) {
        self.push(Call::StopSound(sound));
    }

    fn set_gain(&mut self, sound: SoundHandle, gain: f32) {
        self.push(Call::Gain(sound, gain));
    }
}

impl Hud for Recorder {
    fn set_score(&mut self, score: u32) {
        self.push(Call::SetScore(score));
    }

    fn add_score(&mut self, amount: u32) {
        self.push(Call::AddScore(amount));
    }

    fn set_ship_count(&mut self, ships: u32) {
        self.push(Call::ShipCount(ships));
    }

    fn show_label(&mut self, label: StatusLabel) {
        self.push(Call::Label(label));
    }

    fn hide_labels(&mut self) {
        self.push(Call::HideLabels);
    }

    fn toggle_hud(&mut self, visible: bool) {
        self.push(Call::Hud(visible));
    }

    fn toggle_main_menu(&mut self, visible: bool) {
        self.push(Call::MainMenu(visible));
    }

    fn toggle_pause_menu(&mut self, visible: bool) {
        self.push(Call::PauseMenu(visible));
    }
}

/// Owned pieces of a [`StepContext`] for unit tests
pub struct TestWorld {
    pub clock: Clock,
    pub bounds: Bounds,
    pub tuning: Tuning,
    pub settings: Settings,
    pub services: Services,
    pub recorder: Recorder,
    pub collisions: CollisionHandler,
    pub ids: EntityIds,
    pub rng: Pcg32,
    pub difficulty: f32,
}

impl TestWorld {
    pub fn new() -> Self {
        let recorder = Recorder::new();
        Self {
            clock: Clock::new(),
            bounds: Bounds::new(Vec2::new(-32.0, -20.0), Vec2::new(32.0, 20.0)),
            tuning: Tuning::default(),
            settings: Settings::default(),
            services: recorder.services(),
            recorder,
            collisions: CollisionHandler::new(),
            ids: EntityIds::default(),
            rng: Pcg32::seed_from_u64(1234),
            difficulty: 1.0,
        }
    }

    pub fn ctx(&mut self) -> StepContext<'_> {
        StepContext {
            clock: &self.clock,
            bounds: self.bounds,
            tuning: &self.tuning,
            settings: &self.settings,
            services: &mut self.services,
            collisions: &mut self.collisions,
            ids: &mut self.ids,
            rng: &mut self.rng,
            difficulty: self.difficulty,
        }
    }

    /// Advance the clock by one frame
    pub fn step(&mut self, dt: f32) {
        self.clock.advance(dt);
    }
}
