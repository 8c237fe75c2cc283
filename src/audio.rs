//! Audio collaborator interface
//!
//! Sounds are requested by name. A sound that fails to load simply doesn't
//! play; the simulation never depends on audio succeeding.

/// Handle of a playing sound instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SoundHandle(pub u32);

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundEffect {
    /// Single shot
    Laser,
    /// Double-barrel volley
    LaserDouble,
    /// Wide-fan volley
    LaserWide,
    /// Ship or UFO destroyed
    Explosion,
    /// Asteroid broken
    SmallExplosion,
    /// Pickup collected
    PowerUp,
    /// Weapon upgraded
    Reload,
    /// Ship warping in
    Warp,
    /// Enemy shot
    EnemyLaser,
    /// In-game music track
    GameMusic,
    /// Menu music track
    MenuMusic,
}

impl SoundEffect {
    pub fn name(&self) -> &'static str {
        match self {
            SoundEffect::Laser => "Laser",
            SoundEffect::LaserDouble => "Laser2",
            SoundEffect::LaserWide => "Laser3",
            SoundEffect::Explosion => "Explosion",
            SoundEffect::SmallExplosion => "SmallExplosion",
            SoundEffect::PowerUp => "Powerup",
            SoundEffect::Reload => "Reload",
            SoundEffect::Warp => "Warp",
            SoundEffect::EnemyLaser => "Laser",
            SoundEffect::GameMusic => "Game",
            SoundEffect::MenuMusic => "Menu",
        }
    }
}

/// Audio operations consumed by the simulation
pub trait AudioSink {
    /// Play a named sound; `None` if it could not be found
    fn play(&mut self, name: &str, looping: bool) -> Option<SoundHandle>;
    fn stop(&mut self, sound: SoundHandle);
    fn set_gain(&mut self, sound: SoundHandle, gain: f32);
}

/// Convenience wrappers over the raw sink
pub trait AudioSinkExt: AudioSink {
    /// Fire-and-forget effect
    fn play_effect(&mut self, effect: SoundEffect) -> Option<SoundHandle> {
        self.play(effect.name(), false)
    }

    /// Start a looping track
    fn play_looping(&mut self, effect: SoundEffect) -> Option<SoundHandle> {
        self.play(effect.name(), true)
    }
}

impl<T: AudioSink + ?Sized> AudioSinkExt for T {}

/// Audio sink that plays nothing
#[derive(Debug, Default)]
pub struct NullAudio {
    next_id: u32,
}

impl AudioSink for NullAudio {
    fn play(&mut self, _name: &str, _looping: bool) -> Option<SoundHandle> {
        self.next_id += 1;
        Some(SoundHandle(self.next_id))
    }

    fn stop(&mut self, _sound: SoundHandle) {}

    fn set_gain(&mut self, _sound: SoundHandle, _gain: f32) {}
}
