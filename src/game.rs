//! Top-level game controller
//!
//! Owns the session, the active scene and every collaborator, and runs one
//! simulation step per frame:
//! scene update -> fade -> collisions -> asteroid cleanup -> level / respawn checks.

use rand::SeedableRng;
use rand_pcg::Pcg32;

use crate::audio::{AudioSinkExt, SoundEffect, SoundHandle};
use crate::consts::FIRST_LEVEL;
use crate::platform::Services;
use crate::renderer::NodeId;
use crate::settings::Settings;
use crate::sim::{
    Bounds, Clock, CollisionHandler, EntityIds, FadeEvent, FadeSequencer, GamePhase, Scene, SceneKind, Session,
    StepContext, TickInput,
};
use crate::tuning::Tuning;
use crate::ui::StatusLabel;

/// Scene change requested by the end-of-step checks
enum Transition {
    MainMenu,
    Level(u32),
}

pub struct Game {
    session: Session,
    clock: Clock,
    services: Services,
    collisions: CollisionHandler,
    ids: EntityIds,
    rng: Pcg32,
    tuning: Tuning,
    settings: Settings,
    bounds: Bounds,
    scene: Option<Scene>,
    /// Scene waiting for the fade-out to finish
    next_scene: Option<SceneKind>,
    /// Level the next in-game scene starts at
    pending_level: Option<u32>,
    fade: FadeSequencer,
    music: Option<SoundHandle>,
    /// Confirm state last frame (confirm acts on the press, not the hold)
    confirm_held: bool,
}

impl Game {
    /// Create the game and fade in the main menu
    pub fn new(services: Services, tuning: Tuning, settings: Settings, seed: u64) -> Self {
        log::info!("Game initialized with seed: {}", seed);
        let mut game = Self {
            session: Session::new(),
            clock: Clock::new(),
            services,
            collisions: CollisionHandler::new(),
            ids: EntityIds::default(),
            rng: Pcg32::seed_from_u64(seed),
            tuning,
            settings,
            bounds: Bounds::default(),
            scene: None,
            next_scene: None,
            pending_level: None,
            fade: FadeSequencer::new(),
            music: None,
            confirm_held: false,
        };
        game.change_scene(SceneKind::Menu);
        game.fade
            .begin_fade(true, game.clock.real_time, game.tuning.fade_duration);
        game
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    #[cfg(test)]
    pub(crate) fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    pub fn scene(&self) -> Option<&Scene> {
        self.scene.as_ref()
    }

    pub fn scene_mut(&mut self) -> Option<&mut Scene> {
        self.scene.as_mut()
    }

    pub fn clock(&self) -> &Clock {
        &self.clock
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn fade(&self) -> &FadeSequencer {
        &self.fade
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Replace the player preferences; the music gain follows immediately
    pub fn set_settings(&mut self, settings: Settings) {
        self.settings = settings;
        if let Some(music) = self.music {
            self.services.audio.set_gain(music, self.settings.music_gain());
        }
    }

    pub fn is_paused(&self) -> bool {
        self.session.paused
    }

    /// A scene change is waiting on the fade-out
    pub fn is_loading_level(&self) -> bool {
        self.next_scene.is_some()
    }

    pub fn phase(&self) -> GamePhase {
        let in_game = self.scene.as_ref().is_some_and(|s| s.kind() == SceneKind::InGame);
        self.session.phase(in_game, self.is_loading_level())
    }

    /// Reset the session and load the first level
    pub fn start_new_game(&mut self) {
        log::info!("Starting new game");
        // The session reset drops the flag, so resume the clock first
        if self.session.paused {
            self.set_paused(false);
        }
        self.session.start_new_game();
        self.load_level(FIRST_LEVEL);
    }

    /// Fade out and swap in level `level`
    pub fn load_level(&mut self, level: u32) {
        log::info!("Loading level {}", level);
        self.pending_level = Some(level);
        self.begin_transition(SceneKind::InGame);
    }

    pub fn load_main_menu(&mut self) {
        log::info!("Returning to main menu");
        self.services.ui.toggle_pause_menu(false);
        self.pending_level = None;
        self.begin_transition(SceneKind::Menu);
    }

    fn begin_transition(&mut self, kind: SceneKind) {
        self.next_scene = Some(kind);
        self.fade
            .begin_fade(false, self.clock.real_time, self.tuning.fade_duration);
    }

    /// Request a node from the active scene
    pub fn spawn_scene_object(&mut self, parent: Option<NodeId>) -> Option<NodeId> {
        self.scene.as_ref()?;
        self.services.scene.create_node(parent)
    }

    /// Toggle pause. Only honoured in a running level.
    pub fn toggle_pause(&mut self) {
        let in_game = self.scene.as_ref().is_some_and(|s| s.kind() == SceneKind::InGame);
        if !in_game || self.is_loading_level() {
            return;
        }
        self.set_paused(!self.session.paused);
    }

    fn set_paused(&mut self, paused: bool) {
        self.session.paused = paused;
        self.clock.set_scale(if paused { 0.0 } else { 1.0 });
        self.services.ui.toggle_pause_menu(paused);
        log::info!("Game {}", if paused { "paused" } else { "resumed" });
    }

    /// Split self into the scene, the session and a context over the rest
    fn context(&mut self) -> (Option<&mut Scene>, &mut Session, StepContext<'_>) {
        let difficulty = self.session.difficulty_multiplier();
        let ctx = StepContext {
            clock: &self.clock,
            bounds: self.bounds,
            tuning: &self.tuning,
            settings: &self.settings,
            services: &mut self.services,
            collisions: &mut self.collisions,
            ids: &mut self.ids,
            rng: &mut self.rng,
            difficulty,
        };
        (self.scene.as_mut(), &mut self.session, ctx)
    }

    /// Run one simulation step
    pub fn update(&mut self, input: &TickInput, real_dt: f32) {
        self.clock.advance(real_dt);

        let confirm = input.confirm && !self.confirm_held;
        self.confirm_held = input.confirm;

        if input.pause {
            self.toggle_pause();
        }
        let paused = self.session.paused;
        let scene_input = if paused { TickInput::default() } else { input.clone() };

        {
            let (scene, session, mut ctx) = self.context();
            if let Some(scene) = scene {
                scene.update(session, &scene_input, &mut ctx);
            }
        }

        self.update_fade();

        if self.is_loading_level() {
            self.fade_music();
            return;
        }
        if paused {
            return;
        }

        if let Some(scene) = self.scene.as_mut() {
            self.collisions.update(&mut scene.contacts(&mut self.services));
        }

        let transition = self.check_progress(confirm);
        match transition {
            Some(Transition::MainMenu) => self.load_main_menu(),
            Some(Transition::Level(level)) => self.load_level(level),
            None => {}
        }
    }

    /// Post-collision cleanup, then level completion and respawn requests
    fn check_progress(&mut self, confirm: bool) -> Option<Transition> {
        let (scene, session, mut ctx) = self.context();
        let scene = scene?;
        scene.resolve(session, &mut ctx);

        if scene.is_cleared() && !session.level_completed {
            session.on_level_completed();
            ctx.services.ui.show_label(StatusLabel::LevelComplete);
            log::info!("Level {} completed", session.level);
        }

        if !confirm {
            return None;
        }

        // A lost ship outranks a cleared level so game over always wins
        if session.respawning {
            if !scene.is_spawn_area_clear(&ctx) {
                ctx.services.ui.show_label(StatusLabel::RespawnUnsafe);
                return None;
            }
            session.respawning = false;
            if session.is_game_over() {
                return Some(Transition::MainMenu);
            }
            scene.respawn_ship(&mut ctx);
            log::debug!("Ship respawned, {} lives left", session.lives);
            None
        } else if session.level_completed {
            Some(Transition::Level(session.level + 1))
        } else {
            None
        }
    }

    fn update_fade(&mut self) {
        let event = self.fade.tick(self.clock.real_time);
        match event {
            Some(FadeEvent::SwapReady) => {
                if let Some(kind) = self.next_scene.take() {
                    self.change_scene(kind);
                }
                self.fade
                    .begin_fade(true, self.clock.real_time, self.tuning.fade_duration);
            }
            Some(FadeEvent::FadeInComplete) => log::debug!("Fade-in complete"),
            None => {}
        }

        if event.is_some() || self.fade.is_fading() {
            self.services.scene.set_fader(self.fade.fader_alpha());
        }
    }

    /// While fading towards a different kind of scene the track fades too
    fn fade_music(&mut self) {
        let (Some(next), Some(scene), Some(music)) = (self.next_scene, self.scene.as_ref(), self.music) else {
            return;
        };
        if next != scene.kind() {
            let gain = self.fade.factor() * self.settings.music_gain();
            self.services.audio.set_gain(music, gain);
        }
    }

    /// Tear down the current scene and build `kind` in its place
    fn change_scene(&mut self, kind: SceneKind) {
        if self.session.paused {
            self.set_paused(false);
        }

        let previous = self.scene.take().map(|s| s.kind());
        self.collisions.unregister_all();
        self.services.scene.clear();
        self.bounds = Bounds::from_view(self.services.scene.view_bounds());

        if kind == SceneKind::InGame {
            if let Some(level) = self.pending_level.take() {
                self.session.level = level;
            }
            self.session.respawning = false;
        }
        self.session.level_completed = false;

        let mut scene = Scene::new(kind);
        {
            let (_, session, mut ctx) = self.context();
            scene.setup_level(session, &mut ctx);
        }
        self.scene = Some(scene);

        self.services.ui.set_score(self.session.score);
        self.services.ui.set_ship_count(self.session.lives);
        log::info!("Scene changed to {:?} (level {})", kind, self.session.level);

        if previous != Some(kind) {
            self.swap_music(kind);
        }
    }

    fn swap_music(&mut self, kind: SceneKind) {
        if let Some(music) = self.music.take() {
            self.services.audio.stop(music);
        }

        let track = match kind {
            SceneKind::Menu => SoundEffect::MenuMusic,
            SceneKind::InGame => SoundEffect::GameMusic,
        };
        self.music = self.services.audio.play_looping(track);
        match self.music {
            Some(music) => self.services.audio.set_gain(music, self.settings.music_gain()),
            None => log::warn!("Sound '{}' not found", track.name()),
        }
    }
}
