//! Enemy saucer
//!
//! Drifts across the field, changing course now and then, and takes shots at
//! the player. Speed, fire rate and accuracy scale with the difficulty
//! multiplier.

use glam::{Vec2, Vec3};
use rand::Rng;

use super::entity::{Body, Bounds, Collider, Entity, EntityCore, EntityId, EntityKind, Owner, StepContext};
use super::projectile::ProjectileHandler;
use crate::audio::SoundEffect;
use crate::consts::{UFO_HEALTH, UFO_MASS, UFO_RADIUS};
use crate::platform::Services;
use crate::renderer::{Effect, NodeTransform};
use crate::{random_between, rotate, wrap_degrees};

const UFO_MODEL: &str = "ufo";
/// Visual spin (degrees per second)
const SPIN_SPEED: f32 = 90.0;
/// Largest course change when re-rolling the heading (degrees)
const MAX_COURSE_CHANGE: f32 = 60.0;

/// Random point on one of the four edges and a direction pointing back into
/// the playfield
pub fn random_spawn_position<R: Rng + ?Sized>(bounds: &Bounds, rng: &mut R) -> (Vec2, Vec2) {
    let (min, max) = (bounds.min, bounds.max);
    let (position, direction) = match rng.random_range(0..4) {
        // Left
        0 => (
            Vec2::new(min.x, random_between(rng, min.y, max.y)),
            Vec2::new(random_between(rng, 0.0, 1.0), random_between(rng, -1.0, 1.0)),
        ),
        // Right
        1 => (
            Vec2::new(max.x, random_between(rng, min.y, max.y)),
            Vec2::new(-random_between(rng, 0.0, 1.0), random_between(rng, -1.0, 1.0)),
        ),
        // Top
        2 => (
            Vec2::new(random_between(rng, min.x, max.x), max.y),
            Vec2::new(random_between(rng, -1.0, 1.0), -random_between(rng, 0.0, 1.0)),
        ),
        // Bottom
        _ => (
            Vec2::new(random_between(rng, min.x, max.x), min.y),
            Vec2::new(random_between(rng, -1.0, 1.0), random_between(rng, 0.0, 1.0)),
        ),
    };

    // A zero inward component would slide along the edge forever
    let inward = bounds.center() - position;
    let direction = if direction.dot(inward) > 0.0 {
        direction.normalize_or(inward.normalize_or(Vec2::X))
    } else {
        inward.normalize_or(Vec2::X)
    };
    (position, direction)
}

#[derive(Debug, Clone)]
pub struct Ufo {
    core: EntityCore,
    rotation: f32,
    /// Game times of the next course change and shot
    next_turn: f32,
    next_fire: f32,
}

impl Ufo {
    pub fn new(id: EntityId) -> Self {
        let mut core = EntityCore::new(id, EntityKind::Ufo, Body::new(UFO_RADIUS, UFO_MASS));
        core.set_health(UFO_HEALTH);
        Self {
            core,
            rotation: 0.0,
            next_turn: 0.0,
            next_fire: 0.0,
        }
    }

    /// Place on the playfield edge, heading inward at the current difficulty
    pub fn enter_at(&mut self, position: Vec2, direction: Vec2, ctx: &StepContext) {
        self.core.body.position = position;
        self.core.body.velocity = direction.normalize_or(Vec2::X) * self.speed(ctx);
    }

    fn speed(&self, ctx: &StepContext) -> f32 {
        ctx.tuning.ufo.speed * ctx.difficulty
    }

    fn fire_interval(&self, ctx: &StepContext) -> f32 {
        ctx.tuning.ufo.fire_interval / ctx.difficulty.max(1.0)
    }

    /// Maximum aim error in degrees
    pub fn aim_spread(&self, ctx: &StepContext) -> f32 {
        ctx.tuning.ufo.aim_spread / ctx.difficulty.max(1.0)
    }

    /// Steer and shoot at `target` (the player's ship, when there is one).
    /// Returns true if a shot was fired.
    pub fn think(&mut self, target: Option<Vec2>, projectiles: &mut ProjectileHandler, ctx: &mut StepContext) -> bool {
        if !self.core.is_spawned() || self.core.is_killed() {
            return false;
        }

        let time = ctx.time();
        if time >= self.next_turn {
            self.next_turn = time + ctx.tuning.ufo.turn_interval;
            let change = random_between(ctx.rng, -MAX_COURSE_CHANGE, MAX_COURSE_CHANGE);
            let direction = rotate(self.core.body.velocity.normalize_or(Vec2::X), change.to_radians());
            self.core.body.velocity = direction * self.speed(ctx);
        }

        let Some(target) = target else {
            return false;
        };
        if time < self.next_fire {
            return false;
        }
        self.next_fire = time + self.fire_interval(ctx);

        let position = self.core.position();
        let spread = self.aim_spread(ctx);
        let error = random_between(ctx.rng, -spread, spread);
        let aim = rotate((target - position).normalize_or(Vec2::X), error.to_radians());
        let owner = Owner {
            id: self.core.id,
            kind: EntityKind::Ufo,
        };
        projectiles.fire_projectile(ctx, Some(owner), position, aim);
        ctx.play_sound(SoundEffect::EnemyLaser);
        true
    }
}

impl Entity for Ufo {
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

        if let Some(model) = ctx.spawn_scene_object(self.core.node()) {
            if !ctx.services.scene.attach_model(model, UFO_MODEL) {
                log::warn!("Model '{}' not found", UFO_MODEL);
            }
        }

        // First shot comes after a full interval so the player can react
        let time = ctx.time();
        self.next_turn = time + ctx.tuning.ufo.turn_interval;
        self.next_fire = time + self.fire_interval(ctx);
    }

    fn update(&mut self, ctx: &mut StepContext) {
        if !self.core.is_spawned() {
            return;
        }

        let dt = ctx.dt();
        self.core.body.integrate(dt, &ctx.bounds);
        self.rotation = wrap_degrees(self.rotation + SPIN_SPEED * dt);
        self.core.sync_node(
            ctx,
            NodeTransform::at(self.core.position())
                .with_heading(self.rotation)
                .with_scale(Vec3::splat(1.0)),
        );
    }

    fn destroy(&mut self, ctx: &mut StepContext) -> bool {
        let position = self.core.position();
        if !self.core.begin_destroy(ctx) {
            return false;
        }

        ctx.spawn_effect(Effect::ShipExplosion, position);
        ctx.services
            .scene
            .spawn_light_flash(position, [200, 100, 150], 10.0, 0.4);
        ctx.shake_camera(0.5, 0.3);
        ctx.play_sound(SoundEffect::Explosion);
        true
    }

    fn on_collide_with(&mut self, other: &Collider, _services: &mut Services) {
        if !self.core.is_spawned() {
            return;
        }

        if other.is_player_shot() {
            self.core.decrease_health();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::TestWorld;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn shot(owner_kind: EntityKind) -> Collider {
        Collider {
            id: EntityId(77),
            kind: EntityKind::Projectile,
            position: Vec2::ZERO,
            radius: 0.3,
            collidable: false,
            owner: Some(Owner { id: EntityId(78), kind: owner_kind }),
        }
    }

    #[test]
    fn test_spawn_position_on_edge_heading_inward() {
        let bounds = Bounds::new(Vec2::new(-30.0, -20.0), Vec2::new(30.0, 20.0));
        let mut rng = Pcg32::seed_from_u64(99);
        for _ in 0..200 {
            let (position, direction) = random_spawn_position(&bounds, &mut rng);
            let on_edge = position.x == bounds.min.x
                || position.x == bounds.max.x
                || position.y == bounds.min.y
                || position.y == bounds.max.y;
            assert!(on_edge, "{:?} not on an edge", position);
            assert!((direction.length() - 1.0).abs() < 1e-4);
            assert!(direction.dot(bounds.center() - position) > 0.0);
        }
    }

    #[test]
    fn test_only_player_shots_damage() {
        let mut world = TestWorld::new();
        let mut ufo = Ufo::new(EntityId(5));
        ufo.spawn(&mut world.ctx());

        ufo.on_collide_with(&shot(EntityKind::Ufo), &mut world.services);
        let rock = Collider { kind: EntityKind::Asteroid, owner: None, ..shot(EntityKind::Ship) };
        ufo.on_collide_with(&rock, &mut world.services);
        assert_eq!(ufo.core().health(), Some(UFO_HEALTH));

        for _ in 0..UFO_HEALTH {
            ufo.on_collide_with(&shot(EntityKind::Ship), &mut world.services);
        }
        assert!(ufo.is_killed());

        assert!(ufo.destroy(&mut world.ctx()));
        assert!(!ufo.destroy(&mut world.ctx()));
        assert_eq!(world.recorder.count_effects("ship-explosion"), 1);
    }

    #[test]
    fn test_difficulty_scales_speed_and_aim() {
        let mut world = TestWorld::new();
        let mut ufo = Ufo::new(EntityId(5));
        ufo.enter_at(Vec2::ZERO, Vec2::X, &world.ctx());
        assert!((ufo.core().body.velocity.length() - 4.0).abs() < 1e-4);
        assert!((ufo.aim_spread(&world.ctx()) - 25.0).abs() < 1e-4);

        world.difficulty = 2.0;
        ufo.enter_at(Vec2::ZERO, Vec2::X, &world.ctx());
        assert!((ufo.core().body.velocity.length() - 8.0).abs() < 1e-4);
        assert!((ufo.aim_spread(&world.ctx()) - 12.5).abs() < 1e-4);
    }

    #[test]
    fn test_fires_at_target_on_interval() {
        let mut world = TestWorld::new();
        let mut ufo = Ufo::new(EntityId(5));
        let mut projectiles = ProjectileHandler::new();
        ufo.spawn(&mut world.ctx());
        ufo.enter_at(Vec2::ZERO, Vec2::X, &world.ctx());

        let target = Some(Vec2::new(0.0, 10.0));
        let mut shots = 0;
        // Five seconds at difficulty 1: a shot every 2 seconds
        for _ in 0..50 {
            world.step(0.1);
            if ufo.think(target, &mut projectiles, &mut world.ctx()) {
                shots += 1;
            }
        }
        assert_eq!(shots, 2);
        assert_eq!(world.recorder.count_sounds("Laser"), 2);

        let max_error = 25.0f32.to_radians() + 1e-3;
        for projectile in projectiles.iter() {
            assert!(projectile.collider().is_enemy_shot());
            let direction = projectile.core().body.velocity.normalize();
            assert!(direction.angle_to(Vec2::Y).abs() <= max_error);
        }
    }

    #[test]
    fn test_holds_fire_without_target() {
        let mut world = TestWorld::new();
        let mut ufo = Ufo::new(EntityId(5));
        let mut projectiles = ProjectileHandler::new();
        ufo.spawn(&mut world.ctx());
        for _ in 0..40 {
            world.step(0.1);
            ufo.think(None, &mut projectiles, &mut world.ctx());
        }
        assert!(projectiles.is_empty());
    }
}
