//! Projectiles and their handler

use glam::{Vec2, Vec3};

use super::entity::{Body, Collider, Entity, EntityCore, EntityId, EntityKind, Owner, StepContext};
use crate::consts::PROJECTILE_RADIUS;
use crate::platform::Services;
use crate::renderer::{Effect, EffectHandle, NodeTransform};

const PLAYER_SPRITE: &str = "gloweffect/4";
const ENEMY_SPRITE: &str = "gloweffect-purple/4";

/// A single shot
#[derive(Debug, Clone)]
pub struct Projectile {
    core: EntityCore,
    owner: Option<Owner>,
    /// Game time at which the shot fizzles out
    expires_at: f32,
    trail: Option<EffectHandle>,
}

impl Projectile {
    pub fn new(id: EntityId, owner: Option<Owner>) -> Self {
        let mut core = EntityCore::new(id, EntityKind::Projectile, Body::new(PROJECTILE_RADIUS, 1.0));
        core.collidable = false;
        Self {
            core,
            owner,
            expires_at: 0.0,
            trail: None,
        }
    }

    pub fn owner(&self) -> Option<Owner> {
        self.owner
    }

    pub fn is_owned_by_player(&self) -> bool {
        self.owner.is_some_and(|o| o.kind == EntityKind::Ship)
    }

    pub fn expires_at(&self) -> f32 {
        self.expires_at
    }

    /// (speed, lifetime) for this shot's owner class
    fn ballistics(&self, ctx: &StepContext) -> (f32, f32) {
        let tuning = &ctx.tuning.projectile;
        if self.is_owned_by_player() {
            (tuning.player_speed, tuning.player_lifetime)
        } else {
            (tuning.enemy_speed, tuning.enemy_lifetime)
        }
    }

    fn hit_effect(&self) -> Effect {
        if self.is_owned_by_player() {
            Effect::PlayerProjectileHit
        } else {
            Effect::EnemyProjectileHit
        }
    }
}

impl Entity for Projectile {
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

        let (sprite, trail) = if self.is_owned_by_player() {
            (PLAYER_SPRITE, Effect::PlayerProjectileTrail)
        } else {
            (ENEMY_SPRITE, Effect::EnemyProjectileTrail)
        };

        if let Some(node) = self.core.node() {
            if !ctx.services.scene.attach_sprite(node, sprite) {
                log::warn!("Sprite '{}' not found", sprite);
            }
        }
        self.trail = ctx.spawn_effect(trail, self.core.position());

        let (_, lifetime) = self.ballistics(ctx);
        self.expires_at = ctx.time() + lifetime;
    }

    fn update(&mut self, ctx: &mut StepContext) {
        if !self.core.is_spawned() {
            return;
        }

        self.core.body.integrate(ctx.dt(), &ctx.bounds);

        if self.core.is_killed() || ctx.time() >= self.expires_at {
            self.destroy(ctx);
            return;
        }

        let position = self.core.position();
        self.core
            .sync_node(ctx, NodeTransform::at(position).with_scale(Vec3::splat(0.15)));
        if let Some(trail) = self.trail {
            ctx.services.scene.move_effect(trail, position, 0.0);
        }
    }

    fn destroy(&mut self, ctx: &mut StepContext) -> bool {
        if !self.core.begin_destroy(ctx) {
            return false;
        }
        // Particles already in flight die out on their own
        if let Some(trail) = self.trail.take() {
            ctx.services.scene.set_effect_emitting(trail, false);
        }
        true
    }

    fn on_collide_with(&mut self, other: &Collider, services: &mut Services) {
        if !self.core.is_spawned() || self.core.is_killed() {
            return;
        }
        if other.kind == EntityKind::Projectile || self.owner.is_some_and(|o| o.id == other.id) {
            return;
        }

        self.core.kill();
        services
            .scene
            .spawn_effect(self.hit_effect().name(), self.core.position());
    }

    fn collider(&self) -> Collider {
        Collider {
            owner: self.owner,
            ..self.core.collider()
        }
    }
}

/// Owns every projectile in flight
#[derive(Debug, Clone, Default)]
pub struct ProjectileHandler {
    projectiles: Vec<Projectile>,
}

impl ProjectileHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fire one projectile from `origin` along `direction`. Speed and
    /// lifetime depend on who fired it.
    pub fn fire_projectile(
        &mut self,
        ctx: &mut StepContext,
        owner: Option<Owner>,
        origin: Vec2,
        direction: Vec2,
    ) -> EntityId {
        let id = ctx.ids.next();
        let mut projectile = Projectile::new(id, owner);
        projectile.core.body.position = origin;
        projectile.spawn(ctx);

        let (speed, _) = projectile.ballistics(ctx);
        projectile.core.body.velocity = direction.normalize_or(Vec2::X) * speed;

        self.projectiles.push(projectile);
        id
    }

    /// Move every projectile, then drop the ones that hit something or
    /// expired
    pub fn update(&mut self, ctx: &mut StepContext) {
        for projectile in &mut self.projectiles {
            projectile.update(ctx);
        }
        self.projectiles.retain(|p| !p.is_destroyed());
    }

    /// Detach a projectile. Unknown ids are ignored.
    pub fn remove_reference(&mut self, id: EntityId) {
        self.projectiles.retain(|p| p.id() != id);
    }

    pub fn get(&self, id: EntityId) -> Option<&Projectile> {
        self.projectiles.iter().find(|p| p.id() == id)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Projectile> {
        self.projectiles.iter_mut().find(|p| p.id() == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Projectile> {
        self.projectiles.iter()
    }

    pub fn len(&self) -> usize {
        self.projectiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.projectiles.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::TestWorld;

    const SHIP: Owner = Owner { id: EntityId(100), kind: EntityKind::Ship };
    const UFO: Owner = Owner { id: EntityId(200), kind: EntityKind::Ufo };

    fn rock_at(position: Vec2) -> Collider {
        Collider {
            id: EntityId(300),
            kind: EntityKind::Asteroid,
            position,
            radius: 2.4,
            collidable: true,
            owner: None,
        }
    }

    #[test]
    fn test_speed_and_lifetime_by_owner() {
        let mut world = TestWorld::new();
        let mut handler = ProjectileHandler::new();
        let player = handler.fire_projectile(&mut world.ctx(), Some(SHIP), Vec2::ZERO, Vec2::new(0.0, 2.0));
        let enemy = handler.fire_projectile(&mut world.ctx(), Some(UFO), Vec2::ZERO, Vec2::X);

        let player = handler.get(player).unwrap();
        assert!((player.core().body.velocity - Vec2::new(0.0, 25.0)).length() < 1e-4);
        assert!((player.expires_at() - 1.0).abs() < 1e-6);
        assert!(player.collider().is_player_shot());
        assert!(!player.collider().collidable);

        let enemy = handler.get(enemy).unwrap();
        assert!((enemy.core().body.velocity.length() - 12.0).abs() < 1e-4);
        assert!((enemy.expires_at() - 2.0).abs() < 1e-6);
        assert!(enemy.collider().is_enemy_shot());

        assert_eq!(world.recorder.count_effects("projectile-trail"), 1);
        assert_eq!(world.recorder.count_effects("projectile2-trail"), 1);
    }

    #[test]
    fn test_expiry_reaps_projectile() {
        let mut world = TestWorld::new();
        let mut handler = ProjectileHandler::new();
        let id = handler.fire_projectile(&mut world.ctx(), Some(SHIP), Vec2::ZERO, Vec2::X);

        for _ in 0..9 {
            world.step(0.1);
            handler.update(&mut world.ctx());
        }
        assert_eq!(handler.len(), 1);

        for _ in 0..2 {
            world.step(0.1);
            handler.update(&mut world.ctx());
        }
        assert!(handler.is_empty());
        assert!(!world.collisions.is_registered(id));
    }

    #[test]
    fn test_impact_kills_and_reaps_once() {
        let mut world = TestWorld::new();
        let mut handler = ProjectileHandler::new();
        let id = handler.fire_projectile(&mut world.ctx(), Some(SHIP), Vec2::ZERO, Vec2::X);

        let projectile = handler.get_mut(id).unwrap();
        projectile.on_collide_with(&rock_at(Vec2::ZERO), &mut world.services);
        projectile.on_collide_with(&rock_at(Vec2::ZERO), &mut world.services);
        assert!(projectile.is_killed());
        assert_eq!(world.recorder.count_effects("projectile-hit"), 1);

        world.step(0.016);
        handler.update(&mut world.ctx());
        assert!(handler.is_empty());
    }

    #[test]
    fn test_ignores_owner_and_other_projectiles() {
        let mut world = TestWorld::new();
        let mut handler = ProjectileHandler::new();
        let id = handler.fire_projectile(&mut world.ctx(), Some(UFO), Vec2::ZERO, Vec2::X);

        let owner = Collider {
            id: UFO.id,
            kind: EntityKind::Ufo,
            ..rock_at(Vec2::ZERO)
        };
        let other_shot = handler.get(id).unwrap().collider();
        let other_shot = Collider { id: EntityId(999), ..other_shot };

        let projectile = handler.get_mut(id).unwrap();
        projectile.on_collide_with(&owner, &mut world.services);
        projectile.on_collide_with(&other_shot, &mut world.services);
        assert!(!projectile.is_killed());

        // Enemy fire stops on rocks even though it doesn't damage them
        projectile.on_collide_with(&rock_at(Vec2::ZERO), &mut world.services);
        assert!(projectile.is_killed());
        assert_eq!(world.recorder.count_effects("projectile2-hit"), 1);
    }

    #[test]
    fn test_remove_reference_unknown_is_noop() {
        let mut world = TestWorld::new();
        let mut handler = ProjectileHandler::new();
        let id = handler.fire_projectile(&mut world.ctx(), None, Vec2::ZERO, Vec2::Y);
        handler.remove_reference(EntityId(12345));
        assert_eq!(handler.len(), 1);
        handler.remove_reference(id);
        assert!(handler.is_empty());
    }
}
