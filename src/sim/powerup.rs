//! Weapon upgrade pickup

use glam::{Vec2, Vec3};

use super::entity::{Body, Collider, Entity, EntityCore, EntityId, EntityKind, StepContext};
use crate::audio::SoundEffect;
use crate::consts::{POWERUP_MASS, POWERUP_RADIUS};
use crate::platform::Services;
use crate::renderer::NodeTransform;
use crate::{random_between, random_direction, wrap_degrees};

const CRATE_MODEL: &str = "crate";
const SPIN_SPEED: f32 = 40.0;

/// How a pickup left the field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerUpFate {
    Collected,
    Expired,
}

/// Floating crate that upgrades the ship's weapon when touched
#[derive(Debug, Clone)]
pub struct PowerUp {
    core: EntityCore,
    rotation: f32,
    expires_at: f32,
    collected: bool,
}

impl PowerUp {
    pub fn new(id: EntityId) -> Self {
        Self {
            core: EntityCore::new(id, EntityKind::PowerUp, Body::new(POWERUP_RADIUS, POWERUP_MASS)),
            rotation: 0.0,
            expires_at: f32::INFINITY,
            collected: false,
        }
    }

    pub fn set_position(&mut self, position: Vec2) {
        self.core.body.position = position;
    }

    pub fn is_collected(&self) -> bool {
        self.collected
    }

    /// `None` while still in play
    pub fn fate(&self) -> Option<PowerUpFate> {
        if self.collected {
            Some(PowerUpFate::Collected)
        } else if self.core.is_killed() {
            Some(PowerUpFate::Expired)
        } else {
            None
        }
    }
}

impl Entity for PowerUp {
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
            if !ctx.services.scene.attach_model(model, CRATE_MODEL) {
                log::warn!("Model '{}' not found", CRATE_MODEL);
            }
        }

        let tuning = &ctx.tuning.powerup;
        let speed = random_between(ctx.rng, 0.5 * tuning.max_speed, tuning.max_speed);
        self.core.body.velocity = random_direction(ctx.rng) * speed;
        self.expires_at = ctx.time() + tuning.lifetime;
    }

    fn update(&mut self, ctx: &mut StepContext) {
        if !self.core.is_spawned() {
            return;
        }

        let dt = ctx.dt();
        self.core.body.integrate(dt, &ctx.bounds);
        self.rotation = wrap_degrees(self.rotation + SPIN_SPEED * dt);

        if ctx.time() >= self.expires_at {
            self.core.kill();
        }

        self.core.sync_node(
            ctx,
            NodeTransform::at(self.core.position())
                .with_heading(self.rotation)
                .with_scale(Vec3::splat(0.6)),
        );
    }

    fn destroy(&mut self, ctx: &mut StepContext) -> bool {
        if !self.core.begin_destroy(ctx) {
            return false;
        }
        if self.collected {
            ctx.play_sound(SoundEffect::PowerUp);
            ctx.play_sound(SoundEffect::Reload);
        }
        true
    }

    fn on_collide_with(&mut self, other: &Collider, _services: &mut Services) {
        if !self.core.is_spawned() || self.core.is_killed() {
            return;
        }
        if other.kind == EntityKind::Ship {
            self.collected = true;
            self.core.kill();
        }
    }
}
