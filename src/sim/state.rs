//! Session progression state
//!
//! Score, lives, level and weapon tier for one playthrough. The controller
//! owns the only instance and is its only writer.

use serde::{Deserialize, Serialize};

use crate::consts::{FIRST_LEVEL, STARTING_LIVES};

/// Level at which the difficulty multiplier stops growing
pub const MAX_DIFFICULTY_LEVEL: u32 = 10;
/// Ceiling of the difficulty multiplier
pub const MAX_DIFFICULTY: f32 = 2.0;

/// Weapon upgrade tier. Never decreases except on ship loss.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub enum PowerUpTier {
    #[default]
    None,
    WeaponDouble,
    WeaponWide,
}

impl PowerUpTier {
    /// Last tier; nothing further can be earned
    pub const MAXED: PowerUpTier = PowerUpTier::WeaponWide;

    /// Index into per-tier tables (fire rates)
    pub fn index(&self) -> usize {
        match self {
            PowerUpTier::None => 0,
            PowerUpTier::WeaponDouble => 1,
            PowerUpTier::WeaponWide => 2,
        }
    }

    pub fn next(&self) -> Option<PowerUpTier> {
        match self {
            PowerUpTier::None => Some(PowerUpTier::WeaponDouble),
            PowerUpTier::WeaponDouble => Some(PowerUpTier::WeaponWide),
            PowerUpTier::WeaponWide => None,
        }
    }

    /// Score needed since the last tier change to earn the next tier
    pub fn earn_threshold(&self) -> Option<u32> {
        match self {
            PowerUpTier::None => Some(1750),
            PowerUpTier::WeaponDouble => Some(3500),
            PowerUpTier::WeaponWide => None,
        }
    }
}

/// Where the session currently is. Pause is tracked separately since it
/// overlays the in-level phases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    MainMenu,
    /// Fading towards a new scene
    LoadingLevel,
    InLevel,
    /// Asteroids cleared, waiting for confirm
    LevelCompleted,
    /// Ship lost, waiting for a safe confirm
    RespawnPending,
}

/// Progression counters for one playthrough
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub level: u32,
    pub score: u32,
    pub score_since_ufo: u32,
    pub score_since_power_up: u32,
    pub lives: u32,
    pub tier: PowerUpTier,
    pub paused: bool,
    pub level_completed: bool,
    pub respawning: bool,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            level: FIRST_LEVEL,
            score: 0,
            score_since_ufo: 0,
            score_since_power_up: 0,
            lives: STARTING_LIVES,
            tier: PowerUpTier::None,
            paused: false,
            level_completed: false,
            respawning: false,
        }
    }
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset every counter for a fresh playthrough
    pub fn start_new_game(&mut self) {
        *self = Self::default();
    }

    pub fn add_score(&mut self, amount: u32) {
        self.score = self.score.saturating_add(amount);
        self.score_since_ufo = self.score_since_ufo.saturating_add(amount);
        self.score_since_power_up = self.score_since_power_up.saturating_add(amount);
    }

    /// 1.0 at level 1, rising linearly to 2.0 at level 10, flat afterwards
    pub fn difficulty_multiplier(&self) -> f32 {
        let steps = self.level.saturating_sub(1) as f32;
        let difficulty = 1.0 + steps / (MAX_DIFFICULTY_LEVEL - 1) as f32;
        difficulty.min(MAX_DIFFICULTY)
    }

    /// Score needed between UFO appearances at the current level
    pub fn ufo_spawn_threshold(&self) -> u32 {
        match self.level {
            0..=2 => 2500,
            3..=4 => 3500,
            5..=6 => 4500,
            _ => 5000,
        }
    }

    pub fn should_ufo_spawn(&self) -> bool {
        self.score_since_ufo >= self.ufo_spawn_threshold()
    }

    pub fn reset_ufo_counter(&mut self) {
        self.score_since_ufo = 0;
    }

    /// Enough score banked for the next weapon tier
    pub fn has_earned_power_up(&self) -> bool {
        self.tier
            .earn_threshold()
            .is_some_and(|threshold| self.score_since_power_up >= threshold)
    }

    /// Advance the weapon tier. Stays put once maxed.
    pub fn on_power_up_collected(&mut self) -> PowerUpTier {
        self.score_since_power_up = 0;
        if let Some(next) = self.tier.next() {
            self.tier = next;
        }
        self.tier
    }

    /// Lose a life and the weapon upgrades, then wait for a respawn
    pub fn on_ship_destroyed(&mut self) {
        self.respawning = true;
        self.lives = self.lives.saturating_sub(1);
        self.score_since_power_up = 0;
        self.tier = PowerUpTier::None;
    }

    pub fn on_level_completed(&mut self) {
        self.level_completed = true;
    }

    pub fn is_game_over(&self) -> bool {
        self.lives == 0
    }

    pub fn phase(&self, in_game: bool, loading: bool) -> GamePhase {
        if loading {
            GamePhase::LoadingLevel
        } else if !in_game {
            GamePhase::MainMenu
        } else if self.level_completed {
            GamePhase::LevelCompleted
        } else if self.respawning {
            GamePhase::RespawnPending
        } else {
            GamePhase::InLevel
        }
    }
}
