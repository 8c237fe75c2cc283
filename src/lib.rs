//! Asteroid Field - simulation core of an arcade space shooter
//!
//! Core modules:
//! - `sim`: Simulation (entities, collisions, spawning, progression)
//! - `game`: Top-level controller driving one simulation step per frame
//! - `renderer`, `audio`, `ui`, `platform`: Collaborator interfaces
//! - `settings`, `tuning`: Player preferences and data-driven game balance

pub mod audio;
pub mod game;
pub mod platform;
pub mod renderer;
pub mod settings;
pub mod sim;
pub mod tuning;
pub mod ui;

#[cfg(test)]
pub(crate) mod testing;

pub use game::Game;
pub use settings::Settings;
pub use tuning::Tuning;

use glam::Vec2;
use rand::Rng;

/// Game configuration constants
pub mod consts {
    /// Lives at the start of a new game
    pub const STARTING_LIVES: u32 = 3;
    /// First level of a new game
    pub const FIRST_LEVEL: u32 = 1;

    /// Ship collision radius
    pub const SHIP_RADIUS: f32 = 1.5;
    /// Ship mass
    pub const SHIP_MASS: f32 = 200.0;
    /// Muzzle offset in front of the ship's center
    pub const SHIP_MUZZLE_OFFSET: f32 = 2.5;
    /// Perpendicular spacing of the double-barrel shots (each side)
    pub const DOUBLE_SHOT_SPACING: f32 = 0.5;
    /// Angular width of the wide-shot fan (degrees)
    pub const WIDE_SHOT_ARC_DEG: f32 = 10.0;
    /// Projectiles per volley in the wide tier
    pub const WIDE_SHOT_COUNT: u32 = 4;

    /// Projectile collision radius
    pub const PROJECTILE_RADIUS: f32 = 0.3;

    /// UFO collision radius
    pub const UFO_RADIUS: f32 = 1.6;
    /// UFO mass
    pub const UFO_MASS: f32 = 250.0;
    /// Player hits needed to bring down a UFO
    pub const UFO_HEALTH: u32 = 3;

    /// Pickup collision radius
    pub const POWERUP_RADIUS: f32 = 1.0;
    /// Pickup mass
    pub const POWERUP_MASS: f32 = 20.0;

    /// Points awarded for a destroyed UFO
    pub const UFO_SCORE: u32 = 1000;

    /// Padding added around the camera view when computing world boundaries
    pub const BOUNDS_PADDING: f32 = 2.0;
}

/// Wrap an angle in degrees to [0, 360)
#[inline]
pub fn wrap_degrees(angle: f32) -> f32 {
    let wrapped = angle.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    if wrapped >= 360.0 { 0.0 } else { wrapped }
}

/// Unit direction for a heading in degrees.
///
/// Headings grow clockwise on screen, so the Y component is negated.
#[inline]
pub fn heading_to_direction(heading_deg: f32) -> Vec2 {
    let rad = heading_deg.to_radians();
    Vec2::new(rad.cos(), -rad.sin())
}

/// Rotate a vector by an angle in radians
#[inline]
pub fn rotate(v: Vec2, angle: f32) -> Vec2 {
    Vec2::from_angle(angle).rotate(v)
}

/// Uniform float in [min, max]; returns `min` for an empty or inverted range
#[inline]
pub fn random_between<R: Rng + ?Sized>(rng: &mut R, min: f32, max: f32) -> f32 {
    if max > min {
        rng.random_range(min..=max)
    } else {
        min
    }
}

/// Random unit vector
#[inline]
pub fn random_direction<R: Rng + ?Sized>(rng: &mut R) -> Vec2 {
    let angle = rng.random_range(0.0..std::f32::consts::TAU);
    Vec2::from_angle(angle)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_degrees() {
        assert_eq!(wrap_degrees(0.0), 0.0);
        assert_eq!(wrap_degrees(360.0), 0.0);
        assert!((wrap_degrees(-90.0) - 270.0).abs() < 1e-4);
        assert!((wrap_degrees(725.0) - 5.0).abs() < 1e-4);
    }

    #[test]
    fn test_heading_to_direction() {
        let right = heading_to_direction(0.0);
        assert!((right - Vec2::X).length() < 1e-5);

        // 90 degrees turns clockwise on screen (negative Y)
        let down = heading_to_direction(90.0);
        assert!((down - Vec2::new(0.0, -1.0)).length() < 1e-5);
    }

    #[test]
    fn test_random_between_degenerate_range() {
        use rand::SeedableRng;
        let mut rng = rand_pcg::Pcg32::seed_from_u64(7);
        assert_eq!(random_between(&mut rng, 3.0, 3.0), 3.0);
        assert_eq!(random_between(&mut rng, 5.0, 1.0), 5.0);
        let v = random_between(&mut rng, 1.0, 2.0);
        assert!((1.0..=2.0).contains(&v));
    }

    proptest::proptest! {
        #[test]
        fn prop_wrap_degrees_in_range(angle in -10_000.0f32..10_000.0) {
            let wrapped = wrap_degrees(angle);
            proptest::prop_assert!((0.0..360.0).contains(&wrapped));
        }
    }
}
