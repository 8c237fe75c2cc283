//! Simulation module
//!
//! All gameplay logic lives here. The simulation never renders, plays or
//! draws anything itself; it talks to the outside world only through the
//! collaborator traits bundled in [`Services`](crate::platform::Services).
//! - Seeded RNG only
//! - Destruction deferred to fixed points within a step
//! - Entities referenced by id outside their owning collection

pub mod asteroid;
pub mod clock;
pub mod collision;
pub mod entity;
pub mod fade;
pub mod powerup;
pub mod projectile;
pub mod scene;
pub mod ship;
pub mod state;
pub mod tick;
pub mod ufo;

pub use asteroid::{Asteroid, AsteroidDestroyed, AsteroidHandler, AsteroidSize};
pub use clock::Clock;
pub use collision::{CollisionHandler, CollisionWorld, find_contacts};
pub use entity::{
    Body, Bounds, Collider, Entity, EntityCore, EntityId, EntityIds, EntityKind, Owner, StepContext,
};
pub use fade::{FadeEvent, FadePhase, FadeSequencer};
pub use powerup::{PowerUp, PowerUpFate};
pub use projectile::{Projectile, ProjectileHandler};
pub use scene::{Scene, SceneContacts, SceneKind, SceneReport};
pub use ship::{Ship, ShipState};
pub use state::{GamePhase, PowerUpTier, Session};
pub use tick::TickInput;
pub use ufo::{Ufo, random_spawn_position};
