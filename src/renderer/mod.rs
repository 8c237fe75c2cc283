//! Rendering collaborator interface
//!
//! The simulation never draws anything itself. It asks the scene graph for
//! nodes, pushes transforms into them and requests named effects. Assets are
//! looked up by name; a missing asset makes the call a no-op (`None`/`false`)
//! and the simulation carries on without it.

use glam::{Vec2, Vec3};

/// Handle of a visual node owned by the scene graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub u32);

/// Handle of a running particle effect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EffectHandle(pub u32);

/// Local transform of a node. The playfield is the XZ plane; `position` maps
/// to (x, z) and `heading_deg` rotates around the vertical axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeTransform {
    pub position: Vec2,
    pub heading_deg: f32,
    pub scale: Vec3,
}

impl NodeTransform {
    pub fn at(position: Vec2) -> Self {
        Self {
            position,
            heading_deg: 0.0,
            scale: Vec3::ONE,
        }
    }

    pub fn with_heading(mut self, heading_deg: f32) -> Self {
        self.heading_deg = heading_deg;
        self
    }

    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }
}

/// Named particle effects the simulation spawns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    ShipExplosion,
    AsteroidExplosion,
    AsteroidDust,
    PlayerProjectileHit,
    EnemyProjectileHit,
    PlayerProjectileTrail,
    EnemyProjectileTrail,
    EngineTrail,
    Warp,
}

impl Effect {
    pub fn name(&self) -> &'static str {
        match self {
            Effect::ShipExplosion => "ship-explosion",
            Effect::AsteroidExplosion => "asteroid-explosion",
            Effect::AsteroidDust => "asteroid-dust",
            Effect::PlayerProjectileHit => "projectile-hit",
            Effect::EnemyProjectileHit => "projectile2-hit",
            Effect::PlayerProjectileTrail => "projectile-trail",
            Effect::EnemyProjectileTrail => "projectile2-trail",
            Effect::EngineTrail => "engine-trail",
            Effect::Warp => "ftl",
        }
    }
}

/// Full-screen post-processing effect used by the ship warp-in
pub const BLOOM_POST_EFFECT: &str = "effect-bloom";

/// Scene graph operations consumed by the simulation
pub trait SceneGraph {
    /// Create an empty node under `parent` (or the scene root)
    fn create_node(&mut self, parent: Option<NodeId>) -> Option<NodeId>;
    /// Destroy a node and its children
    fn destroy_node(&mut self, node: NodeId);
    /// Attach a named model; `false` if the model does not exist
    fn attach_model(&mut self, node: NodeId, model: &str) -> bool;
    /// Attach a named sprite; `false` if the sprite does not exist
    fn attach_sprite(&mut self, node: NodeId, sprite: &str) -> bool;
    fn set_transform(&mut self, node: NodeId, transform: NodeTransform);

    /// Spawn a named effect at a world position
    fn spawn_effect(&mut self, name: &str, position: Vec2) -> Option<EffectHandle>;
    fn move_effect(&mut self, effect: EffectHandle, position: Vec2, heading_deg: f32);
    /// Start or stop emission. A stopped effect is reclaimed once its
    /// particles die out.
    fn set_effect_emitting(&mut self, effect: EffectHandle, emitting: bool);
    fn spawn_light_flash(&mut self, position: Vec2, color: [u8; 3], intensity: f32, duration: f32);

    /// Add a named post-processing effect; `false` if the shader does not exist
    fn add_post_effect(&mut self, name: &str) -> bool;
    fn remove_post_effect(&mut self, name: &str);
    /// Set a named float parameter on an active post-processing effect
    fn set_post_effect_param(&mut self, name: &str, param: &str, value: f32);

    fn shake_camera(&mut self, intensity: f32, duration: f32);
    /// Opacity of the full-screen fader (0 = clear, 1 = black)
    fn set_fader(&mut self, alpha: f32);
    fn set_background(&mut self, index: u32);

    /// World-space (min, max) corners of the camera view, if a camera exists
    fn view_bounds(&self) -> Option<(Vec2, Vec2)>;
    /// Drop every node of the current scene (scene swap)
    fn clear(&mut self);
}

/// Scene graph that renders nothing. Used by the headless runner.
#[derive(Debug, Clone)]
pub struct NullScene {
    next_id: u32,
    half_extents: Vec2,
}

impl Default for NullScene {
    fn default() -> Self {
        Self::new(Vec2::new(32.0, 18.0))
    }
}

impl NullScene {
    pub fn new(half_extents: Vec2) -> Self {
        Self {
            next_id: 1,
            half_extents,
        }
    }

    fn allocate(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

impl SceneGraph for NullScene {
    fn create_node(&mut self, _parent: Option<NodeId>) -> Option<NodeId> {
        Some(NodeId(self.allocate()))
    }

    fn destroy_node(&mut self, _node: NodeId) {}

    fn attach_model(&mut self, _node: NodeId, _model: &str) -> bool {
        true
    }

    fn attach_sprite(&mut self, _node: NodeId, _sprite: &str) -> bool {
        true
    }

    fn set_transform(&mut self, _node: NodeId, _transform: NodeTransform) {}

    fn spawn_effect(&mut self, _name: &str, _position: Vec2) -> Option<EffectHandle> {
        Some(EffectHandle(self.allocate()))
    }

    fn move_effect(&mut self, _effect: EffectHandle, _position: Vec2, _heading_deg: f32) {}

    fn set_effect_emitting(&mut self, _effect: EffectHandle, _emitting: bool) {}

    fn spawn_light_flash(&mut self, _position: Vec2, _color: [u8; 3], _intensity: f32, _duration: f32) {}

    fn add_post_effect(&mut self, _name: &str) -> bool {
        true
    }

    fn remove_post_effect(&mut self, _name: &str) {}

    fn set_post_effect_param(&mut self, _name: &str, _param: &str, _value: f32) {}

    fn shake_camera(&mut self, _intensity: f32, _duration: f32) {}

    fn set_fader(&mut self, _alpha: f32) {}

    fn set_background(&mut self, _index: u32) {}

    fn view_bounds(&self) -> Option<(Vec2, Vec2)> {
        Some((-self.half_extents, self.half_extents))
    }

    fn clear(&mut self) {}
}
