//! Data-driven game balance
//!
//! Defaults reproduce the shipped balance. A JSON file may override any
//! subset of fields; missing fields keep their defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::consts::SHIP_RADIUS;

/// Errors raised while loading tuning data
#[derive(Debug, thiserror::Error)]
pub enum TuningError {
    #[error("failed to read tuning file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid tuning data: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid tuning value: {0}")]
    Invalid(String),
}

/// Player ship handling
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShipTuning {
    /// Degrees per second at full steering
    pub turn_speed: f32,
    /// Units per second squared
    pub acceleration: f32,
    /// Units per second
    pub max_speed: f32,
    /// Shots per second, indexed by power-up tier
    pub fire_rates: [f32; 3],
    /// Delay between level start and the ship appearing (seconds)
    pub spawn_delay: f32,
    /// Length of the warp-in effect, during which the ship can't be hit
    pub warp_duration: f32,
}

impl Default for ShipTuning {
    fn default() -> Self {
        Self {
            turn_speed: 180.0,
            acceleration: 40.0,
            max_speed: 20.0,
            fire_rates: [6.0, 5.0, 3.0],
            spawn_delay: 1.0,
            warp_duration: 0.6,
        }
    }
}

/// Projectile ballistics per owner class
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectileTuning {
    pub player_speed: f32,
    pub player_lifetime: f32,
    pub enemy_speed: f32,
    pub enemy_lifetime: f32,
}

impl Default for ProjectileTuning {
    fn default() -> Self {
        Self {
            player_speed: 25.0,
            player_lifetime: 1.0,
            enemy_speed: 12.0,
            enemy_lifetime: 2.0,
        }
    }
}

/// Asteroid field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AsteroidTuning {
    /// Base movement speed range before the size multiplier
    pub speed_min: f32,
    pub speed_max: f32,
    /// Initial asteroids are never placed closer than this to the map center
    pub spawn_safe_radius: f32,
}

impl Default for AsteroidTuning {
    fn default() -> Self {
        Self {
            speed_min: 1.0,
            speed_max: 3.0,
            spawn_safe_radius: 10.0,
        }
    }
}

/// Enemy saucer. Speed, fire interval and aim spread are scaled by the
/// difficulty multiplier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UfoTuning {
    pub speed: f32,
    /// Seconds between shots at difficulty 1.0
    pub fire_interval: f32,
    /// Max aim error (degrees) at difficulty 1.0
    pub aim_spread: f32,
    /// Seconds between heading changes
    pub turn_interval: f32,
}

impl Default for UfoTuning {
    fn default() -> Self {
        Self {
            speed: 4.0,
            fire_interval: 2.0,
            aim_spread: 25.0,
            turn_interval: 3.0,
        }
    }
}

/// Weapon pickup crate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PowerUpTuning {
    pub max_speed: f32,
    /// Seconds before an uncollected pickup disappears
    pub lifetime: f32,
}

impl Default for PowerUpTuning {
    fn default() -> Self {
        Self {
            max_speed: 5.0,
            lifetime: 15.0,
        }
    }
}

/// Complete balance sheet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub ship: ShipTuning,
    pub projectile: ProjectileTuning,
    pub asteroid: AsteroidTuning,
    pub ufo: UfoTuning,
    pub powerup: PowerUpTuning,
    /// Scene fade duration (real-time seconds)
    pub fade_duration: f32,
    /// Respawn is refused while an asteroid overlaps this radius around the center
    pub respawn_safe_radius: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            ship: ShipTuning::default(),
            projectile: ProjectileTuning::default(),
            asteroid: AsteroidTuning::default(),
            ufo: UfoTuning::default(),
            powerup: PowerUpTuning::default(),
            fade_duration: 0.5,
            respawn_safe_radius: SHIP_RADIUS + 1.0,
        }
    }
}

impl Tuning {
    /// Parse and validate tuning JSON
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Load tuning from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, TuningError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| TuningError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// Load tuning, falling back to defaults on any error
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        match Self::load(path) {
            Ok(tuning) => {
                log::info!("Loaded tuning overrides");
                tuning
            }
            Err(e) => {
                log::warn!("Using default tuning: {}", e);
                Self::default()
            }
        }
    }

    /// Reject values that would stall or break the simulation
    pub fn validate(&self) -> Result<(), TuningError> {
        if self.ship.fire_rates.iter().any(|&rate| rate <= 0.0) {
            return Err(TuningError::Invalid("ship fire rates must be positive".into()));
        }
        if self.projectile.player_lifetime <= 0.0 || self.projectile.enemy_lifetime <= 0.0 {
            return Err(TuningError::Invalid("projectile lifetimes must be positive".into()));
        }
        if self.asteroid.speed_min > self.asteroid.speed_max {
            return Err(TuningError::Invalid(format!(
                "asteroid speed range is inverted ({} > {})",
                self.asteroid.speed_min, self.asteroid.speed_max
            )));
        }
        if self.ufo.fire_interval <= 0.0 || self.ufo.turn_interval <= 0.0 {
            return Err(TuningError::Invalid("ufo intervals must be positive".into()));
        }
        if self.fade_duration <= 0.0 {
            return Err(TuningError::Invalid("fade duration must be positive".into()));
        }
        Ok(())
    }
}
