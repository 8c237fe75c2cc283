//! Scenes: the main menu backdrop and the in-game level
//!
//! A scene owns every entity alive in it. Asteroids and projectiles live in
//! their handlers; the ship, UFO and pickup are held directly, at most one of
//! each. Entities killed during collision checks are torn down at fixed
//! points: asteroids right after collisions, the ship, UFO and pickup at the
//! start of the next update.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::asteroid::{AsteroidHandler, AsteroidSize};
use super::collision::CollisionWorld;
use super::entity::{Collider, Entity, EntityId, StepContext};
use super::powerup::{PowerUp, PowerUpFate};
use super::projectile::ProjectileHandler;
use super::ship::Ship;
use super::state::Session;
use super::tick::TickInput;
use super::ufo::{Ufo, random_spawn_position};
use crate::consts::UFO_SCORE;
use crate::platform::Services;
use crate::ui::StatusLabel;

/// Background shown behind the main menu
const MENU_BACKGROUND: u32 = 4;
const MENU_LARGE_ASTEROIDS: u32 = 3;
const MENU_MEDIUM_ASTEROIDS: u32 = 5;
/// Large asteroids at level N: BASE + N
const LEVEL_BASE_ASTEROIDS: u32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SceneKind {
    Menu,
    InGame,
}

/// Everything that happened in one scene update worth reporting upward
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SceneReport {
    pub ship_destroyed: bool,
    pub ufo_destroyed: bool,
    pub ufo_spawned: bool,
    pub power_up_spawned: bool,
    pub power_up_collected: bool,
    pub asteroids_destroyed: usize,
}

#[derive(Debug, Clone)]
pub struct Scene {
    kind: SceneKind,
    pub asteroids: AsteroidHandler,
    pub projectiles: ProjectileHandler,
    ship: Option<Ship>,
    ufo: Option<Ufo>,
    power_up: Option<PowerUp>,
    /// Game time at which the level's first ship appears
    ship_spawn_time: Option<f32>,
}

impl Scene {
    pub fn new(kind: SceneKind) -> Self {
        Self {
            kind,
            asteroids: AsteroidHandler::new(),
            projectiles: ProjectileHandler::new(),
            ship: None,
            ufo: None,
            power_up: None,
            ship_spawn_time: None,
        }
    }

    pub fn kind(&self) -> SceneKind {
        self.kind
    }

    pub fn ship(&self) -> Option<&Ship> {
        self.ship.as_ref()
    }

    pub fn ship_mut(&mut self) -> Option<&mut Ship> {
        self.ship.as_mut()
    }

    pub fn ufo(&self) -> Option<&Ufo> {
        self.ufo.as_ref()
    }

    pub fn ufo_mut(&mut self) -> Option<&mut Ufo> {
        self.ufo.as_mut()
    }

    pub fn power_up(&self) -> Option<&PowerUp> {
        self.power_up.as_ref()
    }

    pub fn power_up_mut(&mut self) -> Option<&mut PowerUp> {
        self.power_up.as_mut()
    }

    pub fn ship_spawn_time(&self) -> Option<f32> {
        self.ship_spawn_time
    }

    /// Populate the scene and show its UI
    pub fn setup_level(&mut self, session: &Session, ctx: &mut StepContext) {
        match self.kind {
            SceneKind::Menu => {
                ctx.services.scene.set_background(MENU_BACKGROUND);
                self.asteroids
                    .spawn_initial_asteroids(ctx, AsteroidSize::Large, MENU_LARGE_ASTEROIDS);
                self.asteroids
                    .spawn_initial_asteroids(ctx, AsteroidSize::Medium, MENU_MEDIUM_ASTEROIDS);
                ctx.services.ui.toggle_hud(false);
                ctx.services.ui.toggle_main_menu(true);
            }
            SceneKind::InGame => {
                let level = session.level;
                ctx.services.scene.set_background(level.saturating_sub(1));
                self.asteroids.spawn_initial_asteroids(
                    ctx,
                    AsteroidSize::Large,
                    LEVEL_BASE_ASTEROIDS + level,
                );
                ctx.services.ui.toggle_main_menu(false);
                ctx.services.ui.toggle_hud(true);
                ctx.services.ui.show_label(StatusLabel::LevelStart(level));
                self.ship_spawn_time = Some(ctx.time() + ctx.tuning.ship.spawn_delay);
            }
        }
    }

    /// Advance the scene by one step (before collision checks)
    pub fn update(&mut self, session: &mut Session, input: &TickInput, ctx: &mut StepContext) -> SceneReport {
        let mut report = SceneReport::default();
        if self.kind == SceneKind::Menu {
            self.asteroids.update(ctx);
            return report;
        }

        if self.ship_spawn_time.is_some_and(|t| ctx.time() >= t) {
            self.ship_spawn_time = None;
            self.spawn_ship(ctx);
        }

        if session.should_ufo_spawn() && self.ufo.is_none() {
            self.spawn_ufo(ctx);
            session.reset_ufo_counter();
            report.ufo_spawned = true;
        }

        self.update_ship(session, input, ctx, &mut report);
        self.update_ufo(session, ctx, &mut report);
        self.update_power_up(session, ctx, &mut report);

        self.asteroids.update(ctx);
        self.projectiles.update(ctx);

        if cfg!(debug_assertions) && input.godmode {
            let destroyed = self.asteroids.destroy_all_asteroids(ctx);
            log::debug!("Godmode: destroyed {} asteroids", destroyed.len());
            report.asteroids_destroyed += destroyed.len();
            for record in destroyed {
                report.power_up_spawned |= self.on_entity_destroyed(record.position, session, ctx);
            }
        }

        report
    }

    fn update_ship(&mut self, session: &mut Session, input: &TickInput, ctx: &mut StepContext, report: &mut SceneReport) {
        let Some(ship) = self.ship.as_mut() else {
            return;
        };

        if ship.is_killed() {
            session.on_ship_destroyed();
            ship.destroy(ctx);
            self.ship = None;
            report.ship_destroyed = true;

            ctx.services.ui.set_ship_count(session.lives);
            if session.is_game_over() {
                log::info!("Game over with {} points", session.score);
                ctx.services.ui.show_label(StatusLabel::GameOver);
            } else {
                ctx.services.ui.show_label(StatusLabel::ShipDestroyed);
            }
            return;
        }

        ship.process_input(input, session.tier, &mut self.projectiles, ctx);
        ship.update(ctx);
    }

    fn update_ufo(&mut self, session: &mut Session, ctx: &mut StepContext, report: &mut SceneReport) {
        let Some(ufo) = self.ufo.as_mut() else {
            return;
        };

        if ufo.is_killed() {
            let position = ufo.position();
            ufo.destroy(ctx);
            self.ufo = None;
            report.ufo_destroyed = true;

            log::debug!("UFO destroyed at {:?}", position);
            award(session, ctx, UFO_SCORE);
            report.power_up_spawned |= self.on_entity_destroyed(position, session, ctx);
            return;
        }

        let target = self.ship.as_ref().filter(|s| !s.is_killed()).map(|s| s.position());
        ufo.think(target, &mut self.projectiles, ctx);
        ufo.update(ctx);
    }

    fn update_power_up(&mut self, session: &mut Session, ctx: &mut StepContext, report: &mut SceneReport) {
        let Some(power_up) = self.power_up.as_mut() else {
            return;
        };

        match power_up.fate() {
            Some(fate) => {
                if fate == PowerUpFate::Collected {
                    let tier = session.on_power_up_collected();
                    log::debug!("Power-up collected, weapon is now {:?}", tier);
                    report.power_up_collected = true;
                } else {
                    log::debug!("Power-up expired");
                }
                power_up.destroy(ctx);
                self.power_up = None;
            }
            None => power_up.update(ctx),
        }
    }

    /// Post-collision cleanup: break killed asteroids, award their points and
    /// spawn their fragments
    pub fn resolve(&mut self, session: &mut Session, ctx: &mut StepContext) -> SceneReport {
        let mut report = SceneReport::default();
        let destroyed = self.asteroids.resolve_destroyed(ctx);
        report.asteroids_destroyed = destroyed.len();

        for record in destroyed {
            if self.kind == SceneKind::InGame && record.by_damage {
                award(session, ctx, record.size.score());
            }
            report.power_up_spawned |= self.on_entity_destroyed(record.position, session, ctx);
        }
        report
    }

    /// An asteroid or UFO left the field at `position`. Drops a pickup there
    /// when one has been earned and none is in play.
    pub fn on_entity_destroyed(&mut self, position: Vec2, session: &Session, ctx: &mut StepContext) -> bool {
        if self.kind != SceneKind::InGame || self.power_up.is_some() || !session.has_earned_power_up() {
            return false;
        }

        let mut power_up = PowerUp::new(ctx.ids.next());
        power_up.set_position(position);
        power_up.spawn(ctx);
        self.power_up = Some(power_up);
        log::debug!("Power-up dropped at {:?}", position);
        true
    }

    fn spawn_ship(&mut self, ctx: &mut StepContext) {
        let mut ship = Ship::new(ctx.ids.next());
        ship.set_position(ctx.bounds.center());
        ship.spawn(ctx);
        self.ship = Some(ship);
    }

    fn spawn_ufo(&mut self, ctx: &mut StepContext) {
        let (position, direction) = random_spawn_position(&ctx.bounds, ctx.rng);
        let mut ufo = Ufo::new(ctx.ids.next());
        ufo.enter_at(position, direction, ctx);
        ufo.spawn(ctx);
        log::debug!("UFO entering at {:?}", position);
        self.ufo = Some(ufo);
    }

    /// Bring the ship back after a loss. No-op while a ship exists.
    pub fn respawn_ship(&mut self, ctx: &mut StepContext) -> bool {
        if self.ship.is_some() {
            return false;
        }
        self.spawn_ship(ctx);
        ctx.services.ui.hide_labels();
        true
    }

    /// No asteroid overlaps the respawn zone around the center
    pub fn is_spawn_area_clear(&self, ctx: &StepContext) -> bool {
        self.asteroids
            .is_clear_of_asteroids(ctx.bounds.center(), ctx.tuning.respawn_safe_radius)
    }

    /// Level is done: asteroids gone (after having been spawned) and no UFO
    pub fn is_cleared(&self) -> bool {
        self.kind == SceneKind::InGame && self.asteroids.all_asteroids_destroyed() && self.ufo.is_none()
    }

    fn entity(&self, id: EntityId) -> Option<&dyn Entity> {
        if let Some(ship) = self.ship.as_ref().filter(|e| e.id() == id) {
            return Some(ship);
        }
        if let Some(ufo) = self.ufo.as_ref().filter(|e| e.id() == id) {
            return Some(ufo);
        }
        if let Some(power_up) = self.power_up.as_ref().filter(|e| e.id() == id) {
            return Some(power_up);
        }
        if let Some(asteroid) = self.asteroids.get(id) {
            return Some(asteroid);
        }
        self.projectiles.get(id).map(|p| p as &dyn Entity)
    }

    fn entity_mut(&mut self, id: EntityId) -> Option<&mut dyn Entity> {
        if let Some(ship) = self.ship.as_mut().filter(|e| e.id() == id) {
            return Some(ship);
        }
        if let Some(ufo) = self.ufo.as_mut().filter(|e| e.id() == id) {
            return Some(ufo);
        }
        if let Some(power_up) = self.power_up.as_mut().filter(|e| e.id() == id) {
            return Some(power_up);
        }
        if let Some(asteroid) = self.asteroids.get_mut(id) {
            return Some(asteroid);
        }
        self.projectiles.get_mut(id).map(|p| p as &mut dyn Entity)
    }

    /// Collision view over this scene
    pub fn contacts<'a>(&'a mut self, services: &'a mut Services) -> SceneContacts<'a> {
        SceneContacts { scene: self, services }
    }
}

fn award(session: &mut Session, ctx: &mut StepContext, amount: u32) {
    session.add_score(amount);
    ctx.services.ui.add_score(amount);
}

/// Routes collision callbacks to the scene's entities by id
pub struct SceneContacts<'a> {
    scene: &'a mut Scene,
    services: &'a mut Services,
}

impl CollisionWorld for SceneContacts<'_> {
    fn collider(&self, id: EntityId) -> Option<Collider> {
        self.scene
            .entity(id)
            .filter(|e| !e.is_destroyed())
            .map(|e| e.collider())
    }

    fn dispatch(&mut self, target: EntityId, other: &Collider) {
        if let Some(entity) = self.scene.entity_mut(target) {
            entity.on_collide_with(other, self.services);
        }
    }
}
