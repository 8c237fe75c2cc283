//! Player ship
//!
//! Spawns with a warp-in effect during which it can't be hit, then flies
//! under player control until an asteroid or enemy shot destroys it.

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use super::entity::{Body, Collider, Entity, EntityCore, EntityId, EntityKind, Owner, StepContext};
use super::projectile::ProjectileHandler;
use super::state::PowerUpTier;
use super::tick::TickInput;
use crate::audio::SoundEffect;
use crate::consts::{
    DOUBLE_SHOT_SPACING, SHIP_MASS, SHIP_MUZZLE_OFFSET, SHIP_RADIUS, WIDE_SHOT_ARC_DEG,
    WIDE_SHOT_COUNT,
};
use crate::platform::Services;
use crate::renderer::{BLOOM_POST_EFFECT, Effect, EffectHandle, NodeTransform};
use crate::{heading_to_direction, rotate, wrap_degrees};

const SHIP_MODEL: &str = "plane";
const MODEL_SCALE: f32 = 0.8;
/// Engine trail sits this far behind the ship's center
const ENGINE_TRAIL_OFFSET: f32 = -1.2;

/// Ship lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShipState {
    /// Warping in; lethal contacts are ignored
    Spawning,
    Active,
    Destroyed,
}

/// Warp-in animation progress
#[derive(Debug, Clone, Copy)]
struct Warp {
    elapsed: f32,
    bloom: bool,
}

#[derive(Debug, Clone)]
pub struct Ship {
    core: EntityCore,
    /// Degrees in [0, 360)
    heading: f32,
    state: ShipState,
    /// Game time when the weapon may fire again
    next_fire: f32,
    warp: Option<Warp>,
    engine_trail: Option<EffectHandle>,
    engine_on: bool,
}

impl Ship {
    pub fn new(id: EntityId) -> Self {
        Self {
            core: EntityCore::new(id, EntityKind::Ship, Body::new(SHIP_RADIUS, SHIP_MASS)),
            heading: 0.0,
            state: ShipState::Spawning,
            next_fire: 0.0,
            warp: None,
            engine_trail: None,
            engine_on: false,
        }
    }

    pub fn state(&self) -> ShipState {
        self.state
    }

    pub fn heading(&self) -> f32 {
        self.heading
    }

    pub fn set_heading(&mut self, heading: f32) {
        self.heading = wrap_degrees(heading);
    }

    pub fn set_position(&mut self, position: Vec2) {
        self.core.body.position = position;
    }

    pub fn is_invulnerable(&self) -> bool {
        self.state == ShipState::Spawning
    }

    fn as_owner(&self) -> Owner {
        Owner {
            id: self.core.id,
            kind: EntityKind::Ship,
        }
    }

    /// Steer, thrust and fire from this step's input. Returns the number of
    /// projectiles fired.
    pub fn process_input(
        &mut self,
        input: &TickInput,
        tier: PowerUpTier,
        projectiles: &mut ProjectileHandler,
        ctx: &mut StepContext,
    ) -> usize {
        if !self.core.is_spawned() || self.core.is_killed() {
            return 0;
        }

        let dt = ctx.dt();
        let tuning = &ctx.tuning.ship;

        if input.steering != 0.0 {
            self.heading = wrap_degrees(self.heading + dt * tuning.turn_speed * input.steering);
        }

        let thrusting = input.acceleration != 0.0;
        if thrusting {
            let boost = heading_to_direction(self.heading) * input.acceleration * tuning.acceleration * dt;
            self.core.body.velocity = (self.core.body.velocity + boost).clamp_length_max(tuning.max_speed);
        }
        self.set_engine(thrusting, ctx);

        let time = ctx.time();
        if input.fire && time >= self.next_fire {
            let rate = ctx.tuning.ship.fire_rates[tier.index()];
            self.next_fire = time + 1.0 / rate;
            return self.fire_weapon(tier, projectiles, ctx);
        }
        0
    }

    fn set_engine(&mut self, on: bool, ctx: &mut StepContext) {
        if on == self.engine_on {
            return;
        }
        self.engine_on = on;
        if let Some(trail) = self.engine_trail {
            ctx.services.scene.set_effect_emitting(trail, on);
        }
    }

    /// One volley for the current weapon tier
    fn fire_weapon(&mut self, tier: PowerUpTier, projectiles: &mut ProjectileHandler, ctx: &mut StepContext) -> usize {
        let owner = Some(self.as_owner());
        let position = self.core.position();
        let angle = -self.heading.to_radians();
        let direction = heading_to_direction(self.heading);

        match tier {
            PowerUpTier::None => {
                let muzzle = position + rotate(Vec2::new(SHIP_MUZZLE_OFFSET, 0.0), angle);
                projectiles.fire_projectile(ctx, owner, muzzle, direction);
                ctx.play_sound(SoundEffect::Laser);
                1
            }
            PowerUpTier::WeaponDouble => {
                // Two parallel barrels either side of the nose
                for side in [-1.0, 1.0] {
                    let offset = Vec2::new(SHIP_MUZZLE_OFFSET, side * DOUBLE_SHOT_SPACING);
                    projectiles.fire_projectile(ctx, owner, position + rotate(offset, angle), direction);
                }
                ctx.play_sound(SoundEffect::LaserDouble);
                2
            }
            PowerUpTier::WeaponWide => {
                // Fan evenly spread across the arc, all from the nose
                let muzzle = position + rotate(Vec2::new(SHIP_MUZZLE_OFFSET, 0.0), angle);
                let arc = WIDE_SHOT_ARC_DEG.to_radians();
                let last = (WIDE_SHOT_COUNT - 1) as f32;
                for i in 0..WIDE_SHOT_COUNT {
                    let spread = (-0.5 + i as f32 / last) * arc;
                    projectiles.fire_projectile(ctx, owner, muzzle, Vec2::from_angle(angle + spread));
                }
                ctx.play_sound(SoundEffect::LaserWide);
                WIDE_SHOT_COUNT as usize
            }
        }
    }

    fn start_warp(&mut self, ctx: &mut StepContext) {
        ctx.spawn_effect(Effect::Warp, self.core.position());

        let scene = &mut ctx.services.scene;
        let bloom = scene.add_post_effect(BLOOM_POST_EFFECT);
        if bloom {
            scene.set_post_effect_param(BLOOM_POST_EFFECT, "BloomQuality", 2.5);
            scene.set_post_effect_param(BLOOM_POST_EFFECT, "BloomFactor", 0.0);
        } else {
            log::warn!("Post effect '{}' not found", BLOOM_POST_EFFECT);
        }

        ctx.shake_camera(0.3, 0.4);
        ctx.play_sound(SoundEffect::Warp);
        self.warp = Some(Warp { elapsed: 0.0, bloom });
    }

    /// Advance the warp-in. Returns the model scale for this frame.
    fn update_warp(&mut self, ctx: &mut StepContext) -> Vec3 {
        let Some(warp) = self.warp.as_mut() else {
            return Vec3::splat(MODEL_SCALE);
        };

        warp.elapsed += ctx.dt();
        let duration = ctx.tuning.ship.warp_duration;
        let t = if duration > 0.0 { (warp.elapsed / duration).clamp(0.0, 1.0) } else { 1.0 };

        // Stretched along the heading, shrinking back to normal proportions
        let scale = Vec3::new(5.0 + (MODEL_SCALE - 5.0) * t, t * MODEL_SCALE, t * MODEL_SCALE);

        if warp.bloom {
            ctx.services
                .scene
                .set_post_effect_param(BLOOM_POST_EFFECT, "BloomFactor", 1.0 - t);
        }

        if t >= 1.0 {
            self.finish_warp(ctx);
            self.state = ShipState::Active;
        }
        scale
    }

    fn finish_warp(&mut self, ctx: &mut StepContext) {
        if let Some(warp) = self.warp.take() {
            if warp.bloom {
                ctx.services.scene.remove_post_effect(BLOOM_POST_EFFECT);
            }
        }
    }
}

impl Entity for Ship {
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
            if !ctx.services.scene.attach_model(model, SHIP_MODEL) {
                log::warn!("Model '{}' not found", SHIP_MODEL);
            }
        }

        self.engine_trail = ctx.spawn_effect(Effect::EngineTrail, self.core.position());
        if let Some(trail) = self.engine_trail {
            ctx.services.scene.set_effect_emitting(trail, false);
        }

        self.state = ShipState::Spawning;
        self.start_warp(ctx);
        log::debug!("Ship {:?} spawned at {:?}", self.core.id, self.core.position());
    }

    fn update(&mut self, ctx: &mut StepContext) {
        if !self.core.is_spawned() {
            return;
        }

        self.core.body.integrate(ctx.dt(), &ctx.bounds);
        let scale = self.update_warp(ctx);

        let position = self.core.position();
        self.core.sync_node(
            ctx,
            NodeTransform::at(position)
                .with_heading(self.heading)
                .with_scale(scale),
        );

        if let Some(trail) = self.engine_trail {
            let offset = rotate(Vec2::new(ENGINE_TRAIL_OFFSET, 0.0), -self.heading.to_radians());
            ctx.services
                .scene
                .move_effect(trail, position + offset, self.heading);
        }
    }

    fn destroy(&mut self, ctx: &mut StepContext) -> bool {
        let position = self.core.position();
        if !self.core.begin_destroy(ctx) {
            return false;
        }

        self.state = ShipState::Destroyed;
        self.finish_warp(ctx);
        if let Some(trail) = self.engine_trail.take() {
            ctx.services.scene.set_effect_emitting(trail, false);
        }

        ctx.spawn_effect(Effect::ShipExplosion, position);
        ctx.shake_camera(1.0, 0.5);
        ctx.play_sound(SoundEffect::Explosion);
        true
    }

    fn on_collide_with(&mut self, other: &Collider, _services: &mut Services) {
        if !self.core.is_spawned() || self.is_invulnerable() {
            return;
        }

        if other.kind == EntityKind::Asteroid || other.is_enemy_shot() {
            self.core.kill();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Call, TestWorld};

    fn spawn_ship(world: &mut TestWorld) -> Ship {
        let mut ship = Ship::new(EntityId(50));
        ship.spawn(&mut world.ctx());
        ship
    }

    /// Step until the warp-in completes
    fn finish_warp(ship: &mut Ship, world: &mut TestWorld) {
        for _ in 0..10 {
            world.step(0.1);
            ship.update(&mut world.ctx());
        }
        assert_eq!(ship.state(), ShipState::Active);
    }

    fn rock() -> Collider {
        Collider {
            id: EntityId(7),
            kind: EntityKind::Asteroid,
            position: Vec2::ZERO,
            radius: 2.4,
            collidable: true,
            owner: None,
        }
    }

    #[test]
    fn test_warp_in_side_effects() {
        let mut world = TestWorld::new();
        let mut ship = spawn_ship(&mut world);
        assert_eq!(ship.state(), ShipState::Spawning);
        assert_eq!(world.recorder.count_effects("ftl"), 1);
        assert_eq!(world.recorder.count_sounds("Warp"), 1);
        assert_eq!(world.recorder.count(|c| *c == Call::AddPostEffect(BLOOM_POST_EFFECT.into())), 1);
        assert_eq!(world.recorder.count(|c| matches!(c, Call::Shake(_))), 1);

        finish_warp(&mut ship, &mut world);
        assert_eq!(world.recorder.count(|c| *c == Call::RemovePostEffect(BLOOM_POST_EFFECT.into())), 1);
    }

    #[test]
    fn test_warp_in_without_assets() {
        let mut world = TestWorld::new();
        world.recorder.mark_missing(SHIP_MODEL);
        world.recorder.mark_missing(Effect::Warp.name());
        world.recorder.mark_missing(BLOOM_POST_EFFECT);

        let mut ship = spawn_ship(&mut world);
        assert_eq!(ship.state(), ShipState::Spawning);
        assert!(world.collisions.is_registered(ship.id()));
        assert_eq!(ship.warp.as_ref().map(|w| w.bloom), Some(false));
        assert_eq!(world.recorder.count_effects("ftl"), 0);
        assert_eq!(world.recorder.count_sounds("Warp"), 1);

        finish_warp(&mut ship, &mut world);
        assert!(ship.warp.is_none());
        let post_effects = world
            .recorder
            .count(|c| matches!(c, Call::AddPostEffect(_) | Call::RemovePostEffect(_)));
        assert_eq!(post_effects, 0);
    }

    #[test]
    fn test_invulnerable_while_warping() {
        let mut world = TestWorld::new();
        let mut ship = spawn_ship(&mut world);

        ship.on_collide_with(&rock(), &mut world.services);
        assert!(!ship.is_killed());

        finish_warp(&mut ship, &mut world);
        ship.on_collide_with(&rock(), &mut world.services);
        assert!(ship.is_killed());
    }

    #[test]
    fn test_lethal_contacts() {
        let mut world = TestWorld::new();
        let mut ship = spawn_ship(&mut world);
        finish_warp(&mut ship, &mut world);

        let own_shot = Collider {
            kind: EntityKind::Projectile,
            collidable: false,
            owner: Some(Owner { id: EntityId(50), kind: EntityKind::Ship }),
            ..rock()
        };
        let pickup = Collider { kind: EntityKind::PowerUp, ..rock() };
        ship.on_collide_with(&own_shot, &mut world.services);
        ship.on_collide_with(&pickup, &mut world.services);
        assert!(!ship.is_killed());

        let enemy_shot = Collider {
            owner: Some(Owner { id: EntityId(9), kind: EntityKind::Ufo }),
            ..own_shot
        };
        ship.on_collide_with(&enemy_shot, &mut world.services);
        assert!(ship.is_killed());
    }

    #[test]
    fn test_turn_and_thrust() {
        let mut world = TestWorld::new();
        let mut ship = spawn_ship(&mut world);
        let mut projectiles = ProjectileHandler::new();

        let input = TickInput { steering: 1.0, ..Default::default() };
        world.step(0.1);
        ship.process_input(&input, PowerUpTier::None, &mut projectiles, &mut world.ctx());
        assert!((ship.heading() - 18.0).abs() < 1e-4);

        let input = TickInput { steering: -1.0, ..Default::default() };
        world.step(0.1);
        ship.process_input(&input, PowerUpTier::None, &mut projectiles, &mut world.ctx());
        world.step(0.1);
        ship.process_input(&input, PowerUpTier::None, &mut projectiles, &mut world.ctx());
        assert!((ship.heading() - 342.0).abs() < 1e-3);

        ship.set_heading(0.0);
        let input = TickInput { acceleration: 1.0, ..Default::default() };
        world.step(0.1);
        ship.process_input(&input, PowerUpTier::None, &mut projectiles, &mut world.ctx());
        assert!((ship.core().body.velocity - Vec2::new(4.0, 0.0)).length() < 1e-4);

        for _ in 0..20 {
            world.step(0.1);
            ship.process_input(&input, PowerUpTier::None, &mut projectiles, &mut world.ctx());
        }
        assert!((ship.core().body.velocity.length() - 20.0).abs() < 1e-3);
    }

    #[test]
    fn test_fire_cadence_per_tier() {
        for (tier, per_volley, rate) in [
            (PowerUpTier::None, 1, 6.0),
            (PowerUpTier::WeaponDouble, 2, 5.0),
            (PowerUpTier::WeaponWide, 4, 3.0),
        ] {
            let mut world = TestWorld::new();
            let mut ship = spawn_ship(&mut world);
            let mut projectiles = ProjectileHandler::new();
            let input = TickInput { fire: true, ..Default::default() };

            // One second of holding the trigger at 100 steps per second
            let mut fired = 0;
            for _ in 0..100 {
                world.step(0.01);
                fired += ship.process_input(&input, tier, &mut projectiles, &mut world.ctx());
            }
            let volleys = fired / per_volley;
            assert_eq!(fired % per_volley, 0);
            assert!((volleys as f32 - rate).abs() <= 1.0, "{:?} fired {} volleys", tier, volleys);
        }
    }

    #[test]
    fn test_double_shot_offsets() {
        let mut world = TestWorld::new();
        let mut ship = spawn_ship(&mut world);
        ship.set_heading(90.0);
        let mut projectiles = ProjectileHandler::new();
        let input = TickInput { fire: true, ..Default::default() };
        ship.process_input(&input, PowerUpTier::WeaponDouble, &mut projectiles, &mut world.ctx());

        let positions: Vec<Vec2> = projectiles.iter().map(|p| p.position()).collect();
        assert_eq!(positions.len(), 2);
        // Heading 90 points along -Y; barrels spread along X
        for p in &positions {
            assert!((p.y + SHIP_MUZZLE_OFFSET).abs() < 1e-4);
        }
        let spread = (positions[0].x - positions[1].x).abs();
        assert!((spread - 2.0 * DOUBLE_SHOT_SPACING).abs() < 1e-4);
        for p in projectiles.iter() {
            let v = p.core().body.velocity.normalize();
            assert!((v - Vec2::new(0.0, -1.0)).length() < 1e-4);
        }
        assert_eq!(world.recorder.count_sounds("Laser2"), 1);
    }

    #[test]
    fn test_wide_shot_fan() {
        let mut world = TestWorld::new();
        let mut ship = spawn_ship(&mut world);
        let mut projectiles = ProjectileHandler::new();
        let input = TickInput { fire: true, ..Default::default() };
        ship.process_input(&input, PowerUpTier::WeaponWide, &mut projectiles, &mut world.ctx());

        let angles: Vec<f32> = projectiles
            .iter()
            .map(|p| p.core().body.velocity.to_angle().to_degrees())
            .collect();
        assert_eq!(angles.len(), 4);
        assert!((angles[0] + 5.0).abs() < 1e-3);
        assert!((angles[3] - 5.0).abs() < 1e-3);
        assert!(angles.windows(2).all(|w| w[1] > w[0]));
    }

    #[test]
    fn test_destroy_once() {
        let mut world = TestWorld::new();
        let mut ship = spawn_ship(&mut world);
        assert!(ship.destroy(&mut world.ctx()));
        assert!(!ship.destroy(&mut world.ctx()));
        assert_eq!(ship.state(), ShipState::Destroyed);
        assert_eq!(world.recorder.count_effects("ship-explosion"), 1);
        assert_eq!(world.recorder.count_sounds("Explosion"), 1);
        // Destroyed mid-warp: bloom must not linger
        assert_eq!(world.recorder.count(|c| *c == Call::RemovePostEffect(BLOOM_POST_EFFECT.into())), 1);

        let mut projectiles = ProjectileHandler::new();
        let input = TickInput { fire: true, ..Default::default() };
        assert_eq!(ship.process_input(&input, PowerUpTier::None, &mut projectiles, &mut world.ctx()), 0);
    }
}
