//! Asteroids and the handler that owns the asteroid field
//!
//! Asteroids come in three sizes. Breaking a Large one yields two Medium
//! fragments, a Medium one two Small fragments, a Small one nothing.

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use super::entity::{Body, Collider, Entity, EntityCore, EntityId, EntityKind, StepContext};
use crate::audio::SoundEffect;
use crate::platform::Services;
use crate::renderer::{Effect, NodeTransform};
use crate::{random_between, random_direction, wrap_degrees};

/// Model attached to every asteroid
const ASTEROID_MODEL: &str = "rock01";
/// Fragments produced by breaking a Large or Medium asteroid
pub const FRAGMENT_COUNT: usize = 2;
/// Placement attempts before falling back to the safe-zone rim
const PLACEMENT_ATTEMPTS: u32 = 32;

/// Asteroid size tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AsteroidSize {
    Large,
    Medium,
    Small,
}

impl AsteroidSize {
    /// Model scale
    pub fn scale(&self) -> f32 {
        match self {
            AsteroidSize::Large => 3.0,
            AsteroidSize::Medium => 2.0,
            AsteroidSize::Small => 1.0,
        }
    }

    pub fn mass(&self) -> f32 {
        match self {
            AsteroidSize::Large => 300.0,
            AsteroidSize::Medium => 150.0,
            AsteroidSize::Small => 50.0,
        }
    }

    /// Player hits needed to break it
    pub fn health(&self) -> u32 {
        match self {
            AsteroidSize::Large => 3,
            AsteroidSize::Medium => 2,
            AsteroidSize::Small => 1,
        }
    }

    /// Smaller rocks move faster
    pub fn speed_multiplier(&self) -> f32 {
        match self {
            AsteroidSize::Large => 1.0,
            AsteroidSize::Medium => 1.5,
            AsteroidSize::Small => 2.0,
        }
    }

    pub fn bounding_radius(&self) -> f32 {
        0.8 * self.scale()
    }

    /// Points for breaking it
    pub fn score(&self) -> u32 {
        match self {
            AsteroidSize::Large => 100,
            AsteroidSize::Medium => 150,
            AsteroidSize::Small => 200,
        }
    }

    /// Size of the fragments it splits into
    pub fn fragment_size(&self) -> Option<AsteroidSize> {
        match self {
            AsteroidSize::Large => Some(AsteroidSize::Medium),
            AsteroidSize::Medium => Some(AsteroidSize::Small),
            AsteroidSize::Small => None,
        }
    }
}

/// A floating rock
#[derive(Debug, Clone)]
pub struct Asteroid {
    core: EntityCore,
    size: AsteroidSize,
    /// Visual spin (degrees, degrees/sec)
    rotation: f32,
    spin: f32,
}

impl Asteroid {
    pub fn new(id: EntityId, size: AsteroidSize) -> Self {
        let mut core = EntityCore::new(
            id,
            EntityKind::Asteroid,
            Body::new(size.bounding_radius(), size.mass()),
        );
        core.set_health(size.health());
        Self {
            core,
            size,
            rotation: 0.0,
            spin: 0.0,
        }
    }

    pub fn size(&self) -> AsteroidSize {
        self.size
    }

    /// Highest speed this asteroid can be given
    pub fn max_speed(&self, ctx: &StepContext) -> f32 {
        self.size.speed_multiplier() * ctx.tuning.asteroid.speed_max
    }

    /// Head along `direction` at a random speed from the size's range
    pub fn set_direction(&mut self, direction: Vec2, ctx: &mut StepContext) {
        let tuning = &ctx.tuning.asteroid;
        let base = random_between(ctx.rng, tuning.speed_min, tuning.speed_max);
        let speed = self.size.speed_multiplier() * base;
        self.core.body.velocity = direction.normalize_or(Vec2::X) * speed;
    }
}

impl Entity for Asteroid {
    fn core(&self) -> &EntityCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut EntityCore {
        &mut self.core
    }

    fn spawn(&mut self, ctx: &mut StepContext) {
        if !self.core.begin_spawn(ctx) {
            return;
        }

        // Model hangs off a child node so the root can spin freely
        if let Some(child) = ctx.spawn_scene_object(self.core.node()) {
            if !ctx.services.scene.attach_model(child, ASTEROID_MODEL) {
                log::warn!("Model '{}' not found", ASTEROID_MODEL);
            }
        }

        self.rotation = random_between(ctx.rng, 0.0, 360.0);
        self.spin = random_between(ctx.rng, -45.0, 45.0);
    }

    fn update(&mut self, ctx: &mut StepContext) {
        if !self.core.is_spawned() {
            return;
        }

        let dt = ctx.dt();
        self.core.body.integrate(dt, &ctx.bounds);
        self.rotation = wrap_degrees(self.rotation + self.spin * dt);

        let scale = self.size.scale();
        self.core.sync_node(
            ctx,
            NodeTransform::at(self.core.position())
                .with_heading(self.rotation)
                .with_scale(Vec3::splat(scale)),
        );
    }

    fn destroy(&mut self, ctx: &mut StepContext) -> bool {
        let position = self.core.position();
        if !self.core.begin_destroy(ctx) {
            return false;
        }

        ctx.spawn_effect(Effect::AsteroidExplosion, position);
        ctx.services
            .scene
            .spawn_light_flash(position, [255, 175, 50], 10.0, 0.25);
        ctx.play_sound(SoundEffect::SmallExplosion);
        true
    }

    fn on_collide_with(&mut self, other: &Collider, services: &mut Services) {
        if !self.core.is_spawned() {
            return;
        }

        match other.kind {
            // UFO fire passes through rocks
            EntityKind::Projectile if other.is_player_shot() => self.core.decrease_health(),
            EntityKind::Asteroid => {
                services
                    .scene
                    .spawn_effect(Effect::AsteroidDust.name(), self.core.position());
            }
            _ => {}
        }
    }
}

/// Record of one asteroid leaving the field
#[derive(Debug, Clone, PartialEq)]
pub struct AsteroidDestroyed {
    pub id: EntityId,
    pub size: AsteroidSize,
    pub position: Vec2,
    /// Broken by damage (scores and splits) rather than force-destroyed
    pub by_damage: bool,
    /// Ids of the fragments it split into
    pub fragments: Vec<EntityId>,
}

/// Owns every asteroid in the current scene
#[derive(Debug, Clone)]
pub struct AsteroidHandler {
    /// Live asteroids in spawn order
    asteroids: Vec<Asteroid>,
    has_spawned: bool,
    total_spawned: u32,
}

impl Default for AsteroidHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl AsteroidHandler {
    pub fn new() -> Self {
        Self {
            asteroids: Vec::new(),
            has_spawned: false,
            total_spawned: 0,
        }
    }

    /// Scatter `count` asteroids across the field, clear of the central
    /// safe zone, each heading in a random direction
    pub fn spawn_initial_asteroids(&mut self, ctx: &mut StepContext, size: AsteroidSize, count: u32) {
        let center = ctx.bounds.center();
        let keep_out = ctx.tuning.asteroid.spawn_safe_radius + size.bounding_radius();

        for _ in 0..count {
            let position = Self::random_position_outside(ctx, center, keep_out);
            let direction = random_direction(ctx.rng);
            self.spawn_asteroid(ctx, size, position, direction);
        }

        log::debug!("Spawned {} {:?} asteroids", count, size);
    }

    fn random_position_outside(ctx: &mut StepContext, center: Vec2, keep_out: f32) -> Vec2 {
        let bounds = ctx.bounds;
        for _ in 0..PLACEMENT_ATTEMPTS {
            let candidate = Vec2::new(
                random_between(ctx.rng, bounds.min.x, bounds.max.x),
                random_between(ctx.rng, bounds.min.y, bounds.max.y),
            );
            if candidate.distance(center) >= keep_out {
                return candidate;
            }
        }
        // Playfield barely larger than the safe zone: sit on its rim
        center + random_direction(ctx.rng) * keep_out
    }

    /// Create and spawn a single asteroid
    pub fn spawn_asteroid(
        &mut self,
        ctx: &mut StepContext,
        size: AsteroidSize,
        position: Vec2,
        direction: Vec2,
    ) -> EntityId {
        let id = ctx.ids.next();
        let mut asteroid = Asteroid::new(id, size);
        asteroid.spawn(ctx);
        asteroid.core.body.position = position;
        asteroid.set_direction(direction, ctx);

        self.asteroids.push(asteroid);
        self.has_spawned = true;
        self.total_spawned += 1;
        id
    }

    /// Move every asteroid
    pub fn update(&mut self, ctx: &mut StepContext) {
        for asteroid in &mut self.asteroids {
            asteroid.update(ctx);
        }
    }

    /// Destroy asteroids killed this step and split them. Fragments are
    /// spawned only after the whole collection has been swept.
    pub fn resolve_destroyed(&mut self, ctx: &mut StepContext) -> Vec<AsteroidDestroyed> {
        let mut destroyed = Vec::new();
        for asteroid in &mut self.asteroids {
            if asteroid.is_killed() && asteroid.destroy(ctx) {
                destroyed.push(AsteroidDestroyed {
                    id: asteroid.id(),
                    size: asteroid.size,
                    position: asteroid.position(),
                    by_damage: true,
                    fragments: Vec::new(),
                });
            }
        }

        for record in &destroyed {
            self.remove_reference(record.id);
        }

        for record in &mut destroyed {
            record.fragments = self.split(ctx, record.size, record.position);
        }

        destroyed
    }

    /// Spawn the fragments of a broken asteroid
    fn split(&mut self, ctx: &mut StepContext, size: AsteroidSize, position: Vec2) -> Vec<EntityId> {
        let Some(fragment_size) = size.fragment_size() else {
            return Vec::new();
        };

        // Each fragment picks its own heading; siblings aren't forced apart
        let fragments: Vec<EntityId> = (0..FRAGMENT_COUNT)
            .map(|_| {
                let direction = random_direction(ctx.rng);
                self.spawn_asteroid(ctx, fragment_size, position, direction)
            })
            .collect();

        log::debug!("{:?} asteroid split into {:?}", size, fragments);
        fragments
    }

    /// Remove the whole field at once without splitting or scoring
    pub fn destroy_all_asteroids(&mut self, ctx: &mut StepContext) -> Vec<AsteroidDestroyed> {
        let mut destroyed = Vec::new();
        for asteroid in &mut self.asteroids {
            let position = asteroid.position();
            if asteroid.destroy(ctx) {
                destroyed.push(AsteroidDestroyed {
                    id: asteroid.id(),
                    size: asteroid.size,
                    position,
                    by_damage: false,
                    fragments: Vec::new(),
                });
            }
        }
        self.asteroids.retain(|a| !a.is_destroyed());
        destroyed
    }

    /// True once asteroids have been spawned and every one is gone
    pub fn all_asteroids_destroyed(&self) -> bool {
        self.has_spawned && self.asteroids.is_empty()
    }

    pub fn has_spawned(&self) -> bool {
        self.has_spawned
    }

    /// No live asteroid comes within `radius` of `point`
    pub fn is_clear_of_asteroids(&self, point: Vec2, radius: f32) -> bool {
        self.asteroids
            .iter()
            .filter(|a| !a.is_destroyed())
            .all(|a| a.position().distance(point) >= radius + a.core.body.radius)
    }

    /// Detach a destroyed asteroid. Unknown ids are ignored.
    pub fn remove_reference(&mut self, id: EntityId) {
        self.asteroids.retain(|a| a.id() != id);
    }

    pub fn get(&self, id: EntityId) -> Option<&Asteroid> {
        self.asteroids.iter().find(|a| a.id() == id)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Asteroid> {
        self.asteroids.iter_mut().find(|a| a.id() == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Asteroid> {
        self.asteroids.iter()
    }

    pub fn len(&self) -> usize {
        self.asteroids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.asteroids.is_empty()
    }

    /// Asteroids created since this handler was made, fragments included
    pub fn total_spawned(&self) -> u32 {
        self.total_spawned
    }
}
