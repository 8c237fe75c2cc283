//! Shared entity state and the per-step context handed to entity logic
//!
//! Every entity is owned by exactly one collection (a handler or the game
//! scene). Everything else refers to it by [`EntityId`], which stays valid as a
//! lookup key after destruction; lookups of a removed id just miss.

use glam::Vec2;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::clock::Clock;
use super::collision::CollisionHandler;
use crate::audio::{AudioSinkExt, SoundEffect, SoundHandle};
use crate::consts::BOUNDS_PADDING;
use crate::platform::Services;
use crate::renderer::{Effect, EffectHandle, NodeId, NodeTransform};
use crate::settings::Settings;
use crate::tuning::Tuning;

/// Stable entity handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub u32);

/// Closed set of entity variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Asteroid,
    Ship,
    Projectile,
    Ufo,
    PowerUp,
}

/// Allocates entity ids for the whole session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityIds {
    next_id: u32,
}

impl Default for EntityIds {
    fn default() -> Self {
        Self { next_id: 1 }
    }
}

impl EntityIds {
    pub fn next(&mut self) -> EntityId {
        let id = self.next_id;
        self.next_id += 1;
        EntityId(id)
    }
}

/// Physical state
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Body {
    pub position: Vec2,
    pub velocity: Vec2,
    pub mass: f32,
    /// Bounding circle used for collision checks
    pub radius: f32,
}

impl Body {
    pub fn new(radius: f32, mass: f32) -> Self {
        Self {
            position: Vec2::ZERO,
            velocity: Vec2::ZERO,
            mass,
            radius,
        }
    }

    /// Move by velocity over `dt` and wrap around the playfield
    pub fn integrate(&mut self, dt: f32, bounds: &Bounds) {
        self.position = bounds.wrap(self.position + self.velocity * dt);
    }
}

/// Rectangular playfield with wrap-around edges
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min: Vec2,
    pub max: Vec2,
}

impl Default for Bounds {
    fn default() -> Self {
        Self {
            min: Vec2::splat(-50.0),
            max: Vec2::splat(50.0),
        }
    }
}

impl Bounds {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    /// Boundaries from the camera's visible area, padded so entities leave
    /// the screen completely before wrapping
    pub fn from_view(view: Option<(Vec2, Vec2)>) -> Self {
        match view {
            Some((min, max)) => Self::new(min - BOUNDS_PADDING, max + BOUNDS_PADDING),
            None => Self::default(),
        }
    }

    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    pub fn contains(&self, position: Vec2) -> bool {
        position.x > self.min.x
            && position.x < self.max.x
            && position.y > self.min.y
            && position.y < self.max.y
    }

    /// Jump to the opposite edge when leaving the playfield
    pub fn wrap(&self, position: Vec2) -> Vec2 {
        let mut wrapped = position;
        if position.x < self.min.x {
            wrapped.x = self.max.x;
        }
        if position.x > self.max.x {
            wrapped.x = self.min.x;
        }
        if position.y < self.min.y {
            wrapped.y = self.max.y;
        }
        if position.y > self.max.y {
            wrapped.y = self.min.y;
        }
        wrapped
    }
}

/// Common lifecycle and physical state of every entity.
///
/// `killed` means "remove this step"; `destroyed` means the one-time
/// destruction side effects have already run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityCore {
    pub id: EntityId,
    pub kind: EntityKind,
    pub body: Body,
    /// Non-collidable entities never collide with each other
    pub collidable: bool,
    health: Option<u32>,
    spawned: bool,
    killed: bool,
    destroyed: bool,
    #[serde(skip)]
    node: Option<NodeId>,
}

impl EntityCore {
    pub fn new(id: EntityId, kind: EntityKind, body: Body) -> Self {
        Self {
            id,
            kind,
            body,
            collidable: true,
            health: None,
            spawned: false,
            killed: false,
            destroyed: false,
            node: None,
        }
    }

    /// Spawned and not yet destroyed
    pub fn is_spawned(&self) -> bool {
        self.spawned && !self.destroyed
    }

    pub fn is_killed(&self) -> bool {
        self.killed
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    pub fn position(&self) -> Vec2 {
        self.body.position
    }

    pub fn node(&self) -> Option<NodeId> {
        self.node
    }

    pub fn health(&self) -> Option<u32> {
        self.health
    }

    pub fn set_health(&mut self, health: u32) {
        self.health = Some(health);
    }

    /// Mark for removal at the end of this step
    pub fn kill(&mut self) {
        if self.is_spawned() {
            self.killed = true;
        }
    }

    /// Take one point of damage; kills at zero. Entities without health are
    /// unaffected.
    pub fn decrease_health(&mut self) {
        if !self.is_spawned() {
            return;
        }
        if let Some(health) = self.health.as_mut() {
            *health = health.saturating_sub(1);
            if *health == 0 {
                self.kill();
            }
        }
    }

    /// Enter the scene: create the root node and join collision checks.
    /// Returns false if already spawned.
    pub fn begin_spawn(&mut self, ctx: &mut StepContext) -> bool {
        if self.spawned || self.destroyed {
            return false;
        }
        self.spawned = true;
        self.node = ctx.spawn_scene_object(None);
        ctx.collisions.register_entity(self.id);
        true
    }

    /// Leave the scene. Returns true exactly once; later calls are no-ops so
    /// destruction side effects never run twice.
    pub fn begin_destroy(&mut self, ctx: &mut StepContext) -> bool {
        if !self.is_spawned() {
            return false;
        }
        self.destroyed = true;
        self.killed = true;
        ctx.collisions.unregister_entity(self.id);
        if let Some(node) = self.node.take() {
            ctx.services.scene.destroy_node(node);
        }
        true
    }

    /// Push the entity's transform into its scene node
    pub fn sync_node(&self, ctx: &mut StepContext, transform: NodeTransform) {
        if let Some(node) = self.node {
            ctx.services.scene.set_transform(node, transform);
        }
    }

    pub fn collider(&self) -> Collider {
        Collider {
            id: self.id,
            kind: self.kind,
            position: self.body.position,
            radius: self.body.radius,
            collidable: self.collidable,
            owner: None,
        }
    }
}

/// Who fired a projectile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Owner {
    pub id: EntityId,
    pub kind: EntityKind,
}

/// Snapshot of an entity taken at the start of collision checks. Collision
/// callbacks receive the other party as a snapshot, never as a live
/// reference.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Collider {
    pub id: EntityId,
    pub kind: EntityKind,
    pub position: Vec2,
    pub radius: f32,
    pub collidable: bool,
    /// Set for projectiles
    pub owner: Option<Owner>,
}

impl Collider {
    pub fn overlaps(&self, other: &Collider) -> bool {
        self.position.distance(other.position) <= self.radius + other.radius
    }

    /// Projectile fired by the player's ship
    pub fn is_player_shot(&self) -> bool {
        self.kind == EntityKind::Projectile
            && self.owner.is_some_and(|o| o.kind == EntityKind::Ship)
    }

    /// Projectile fired by anything other than the player
    pub fn is_enemy_shot(&self) -> bool {
        self.kind == EntityKind::Projectile && !self.is_player_shot()
    }
}

/// Capabilities shared by every entity variant
pub trait Entity {
    fn core(&self) -> &EntityCore;
    fn core_mut(&mut self) -> &mut EntityCore;

    /// Enter the scene. No-op when already spawned.
    fn spawn(&mut self, ctx: &mut StepContext);

    /// Advance one step. No-op once destroyed.
    fn update(&mut self, ctx: &mut StepContext);

    /// Run destruction side effects. Returns true only on the first call.
    fn destroy(&mut self, ctx: &mut StepContext) -> bool;

    /// React to overlapping `other` this step
    fn on_collide_with(&mut self, other: &Collider, services: &mut Services);

    fn collider(&self) -> Collider {
        self.core().collider()
    }

    fn id(&self) -> EntityId {
        self.core().id
    }

    fn position(&self) -> Vec2 {
        self.core().body.position
    }

    fn is_killed(&self) -> bool {
        self.core().is_killed()
    }

    fn is_destroyed(&self) -> bool {
        self.core().is_destroyed()
    }
}

/// Everything entity logic may touch during one simulation step
pub struct StepContext<'a> {
    pub clock: &'a Clock,
    pub bounds: Bounds,
    pub tuning: &'a Tuning,
    pub settings: &'a Settings,
    pub services: &'a mut Services,
    pub collisions: &'a mut CollisionHandler,
    pub ids: &'a mut EntityIds,
    pub rng: &'a mut Pcg32,
    /// Difficulty multiplier of the current level (1.0 - 2.0)
    pub difficulty: f32,
}

impl StepContext<'_> {
    pub fn time(&self) -> f32 {
        self.clock.time
    }

    pub fn dt(&self) -> f32 {
        self.clock.delta_time
    }

    /// Request a node from the active scene
    pub fn spawn_scene_object(&mut self, parent: Option<NodeId>) -> Option<NodeId> {
        self.services.scene.create_node(parent)
    }

    pub fn spawn_effect(&mut self, effect: Effect, position: Vec2) -> Option<EffectHandle> {
        let handle = self.services.scene.spawn_effect(effect.name(), position);
        if handle.is_none() {
            log::warn!("Effect '{}' not found", effect.name());
        }
        handle
    }

    /// Shake the camera unless the player turned shaking off
    pub fn shake_camera(&mut self, intensity: f32, duration: f32) {
        if self.settings.effective_screen_shake() {
            self.services.scene.shake_camera(intensity, duration);
        }
    }

    pub fn play_sound(&mut self, effect: SoundEffect) -> Option<SoundHandle> {
        let handle = self.services.audio.play_effect(effect);
        match handle {
            Some(sound) => self.services.audio.set_gain(sound, self.settings.sfx_gain()),
            None => log::warn!("Sound '{}' not found", effect.name()),
        }
        handle
    }
}
