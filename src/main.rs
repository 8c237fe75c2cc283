//! Asteroid Field headless runner
//!
//! Plays a game on autopilot with no rendering, sound or UI, for smoke runs
//! and balance checks:
//!
//! ```text
//! asteroid-field [seed] [seconds]
//! ```
//!
//! `tuning.json` and `settings.json` in the working directory are picked up
//! when present.

use std::path::Path;

use asteroid_field::heading_to_direction;
use asteroid_field::platform::Services;
use asteroid_field::sim::{Entity, GamePhase, TickInput};
use asteroid_field::{Game, Settings, Tuning};

const DEFAULT_SEED: u64 = 0x5EED;
const DEFAULT_SECONDS: f32 = 120.0;
/// 60 Hz frames
const FRAME_DT: f32 = 1.0 / 60.0;
/// Frames between confirm taps (respawn, next level, leave game over)
const CONFIRM_EVERY: u64 = 30;
/// Aim tolerance before firing (radians)
const FIRE_CONE: f32 = 0.3;

/// Turns towards the closest target and shoots when roughly lined up
#[derive(Debug, Default)]
struct Autopilot {
    frames: u64,
}

impl Autopilot {
    fn input(&mut self, game: &Game) -> TickInput {
        self.frames += 1;
        let mut input = TickInput {
            confirm: self.frames % CONFIRM_EVERY == 0,
            ..Default::default()
        };

        let Some(scene) = game.scene() else {
            return input;
        };
        let Some(ship) = scene.ship() else {
            return input;
        };

        let position = ship.position();
        let target = scene
            .asteroids
            .iter()
            .map(|a| a.position())
            .chain(scene.ufo().map(|u| u.position()))
            .min_by(|a, b| a.distance_squared(position).total_cmp(&b.distance_squared(position)));
        let Some(target) = target else {
            return input;
        };

        // Headings grow clockwise, angles counter-clockwise
        let angle = heading_to_direction(ship.heading()).angle_to(target - position);
        if angle.abs() > 0.05 {
            input.steering = -angle.signum();
        }
        input.fire = angle.abs() < FIRE_CONE;
        input
    }
}

fn load_config() -> (Tuning, Settings) {
    let tuning = if Path::new("tuning.json").exists() {
        Tuning::load_or_default("tuning.json")
    } else {
        Tuning::default()
    };
    let settings = if Path::new("settings.json").exists() {
        Settings::load_or_default("settings.json")
    } else {
        Settings::default()
    };
    (tuning, settings)
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Asteroid Field (headless) starting...");

    let mut args = std::env::args().skip(1);
    let seed = args.next().and_then(|s| s.parse().ok()).unwrap_or(DEFAULT_SEED);
    let seconds = args
        .next()
        .and_then(|s| s.parse::<f32>().ok())
        .unwrap_or(DEFAULT_SECONDS);

    let (tuning, settings) = load_config();
    let mut game = Game::new(Services::headless(), tuning, settings, seed);
    game.start_new_game();

    let mut autopilot = Autopilot::default();
    let frames = (seconds / FRAME_DT) as u64;
    let mut played = 0;
    for _ in 0..frames {
        let input = autopilot.input(&game);
        game.update(&input, FRAME_DT);
        played += 1;
        if game.phase() == GamePhase::MainMenu {
            break;
        }
    }

    let session = game.session();
    println!(
        "seed {}: {:.1}s played, level {}, score {}, lives {}, weapon {:?}",
        seed,
        played as f32 * FRAME_DT,
        session.level,
        session.score,
        session.lives,
        session.tier
    );
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // No headless runner on the web
}
