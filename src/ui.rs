//! HUD / menu collaborator interface

/// Status labels shown in the middle of the screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLabel {
    /// "Sector N" at the start of a level
    LevelStart(u32),
    /// Respawn requested while asteroids occupy the safe zone
    RespawnUnsafe,
    /// All asteroids cleared, waiting for confirm
    LevelComplete,
    /// Ship lost with lives remaining
    ShipDestroyed,
    /// Ship lost with no lives remaining
    GameOver,
}

impl StatusLabel {
    /// Headline and help text
    pub fn text(&self) -> (String, &'static str) {
        match self {
            StatusLabel::LevelStart(level) => {
                let help = if *level == 1 { "Destroy all the asteroids" } else { "" };
                (format!("Sector {}", level), help)
            }
            StatusLabel::RespawnUnsafe => (String::new(), "Unsafe to spawn"),
            StatusLabel::LevelComplete => ("SECTOR CLEAR".to_string(), "Press ENTER to continue"),
            StatusLabel::ShipDestroyed => ("SHIP DESTROYED".to_string(), "Press ENTER to respawn"),
            StatusLabel::GameOver => (
                "GAME OVER".to_string(),
                "Press ENTER to return to main menu",
            ),
        }
    }
}

/// UI operations consumed by the simulation
pub trait Hud {
    fn set_score(&mut self, score: u32);
    /// Animate the score counter up by `amount`
    fn add_score(&mut self, amount: u32);
    fn set_ship_count(&mut self, ships: u32);
    fn show_label(&mut self, label: StatusLabel);
    fn hide_labels(&mut self);
    fn toggle_hud(&mut self, visible: bool);
    fn toggle_main_menu(&mut self, visible: bool);
    fn toggle_pause_menu(&mut self, visible: bool);
}

/// HUD that displays nothing
#[derive(Debug, Default)]
pub struct NullHud;

impl Hud for NullHud {
    fn set_score(&mut self, _score: u32) {}
    fn add_score(&mut self, _amount: u32) {}
    fn set_ship_count(&mut self, _ships: u32) {}
    fn show_label(&mut self, label: StatusLabel) {
        let (headline, help) = label.text();
        log::debug!("HUD label: {} {}", headline, help);
    }
    fn hide_labels(&mut self) {}
    fn toggle_hud(&mut self, _visible: bool) {}
    fn toggle_main_menu(&mut self, _visible: bool) {}
    fn toggle_pause_menu(&mut self, _visible: bool) {}
}
