//! Game lifecycle: start, restart, exit and the end-of-game hook
//!
//! The host drives `frame` once per display refresh, passing back the
//! generation it was given by `start_game`. Frames from a loop that belongs to
//! an earlier game are ignored, so a restart never races the old loop.

use glam::Vec2;

use super::snapshot::Snapshot;
use super::state::{GameEvent, GamePhase, GameResult, GameState};
use super::tick::{TickInput, tick};
use crate::settings::Settings;

/// Callback fired once per finished game
pub type EndHook = Box<dyn FnMut(GameResult)>;

pub struct Game {
    settings: Settings,
    state: GameState,
    /// Bumped on every start; stale frame callbacks carry an older value
    generation: u64,
    pointer: Vec2,
    on_game_end: Option<EndHook>,
    end_reported: bool,
}

impl Game {
    pub fn new(settings: Settings) -> Self {
        let state = GameState::new(&settings, settings.seed);
        Self {
            settings,
            state,
            generation: 0,
            pointer: Vec2::splat(0.5),
            on_game_end: None,
            end_reported: false,
        }
    }

    pub fn set_on_game_end(&mut self, hook: impl FnMut(GameResult) + 'static) {
        self.on_game_end = Some(Box::new(hook));
    }

    /// Reset every store and both ships and begin playing.
    ///
    /// Returns the generation the host must pass to `frame`.
    pub fn start_game(&mut self) -> u64 {
        self.generation += 1;
        let seed = self.settings.seed.wrapping_add(self.generation);
        self.state = GameState::new(&self.settings, seed);
        self.state.phase = GamePhase::Playing;
        self.state.spawner.start();
        self.pointer = Vec2::splat(0.5);
        self.end_reported = false;
        log::info!(
            "Game {} started ({}, {}x{})",
            self.generation,
            self.settings.variant.as_str(),
            self.settings.stage_width,
            self.settings.stage_height
        );
        self.generation
    }

    pub fn restart_game(&mut self) -> u64 {
        self.start_game()
    }

    /// Abandon the current game without reporting a result
    pub fn exit_to_menu(&mut self) {
        self.generation += 1;
        self.state.spawner.stop();
        self.state.phase = GamePhase::NotStarted;
        self.end_reported = true;
        log::info!("Exited to menu");
    }

    /// Swap in new settings and return to the menu. The generation keeps counting,
    /// so loops scheduled under the old settings stay stale.
    pub fn reconfigure(&mut self, settings: Settings) {
        self.exit_to_menu();
        self.state = GameState::new(&settings, settings.seed);
        self.settings = settings;
        log::info!("Settings applied: {}", self.settings.variant.as_str());
    }

    /// Finish a game in play with `result`. Ignored outside `Playing`.
    pub fn end(&mut self, result: GameResult) {
        if self.state.phase != GamePhase::Playing {
            log::debug!("Ignoring end({}) in phase {:?}", result.as_str(), self.state.phase);
            return;
        }
        self.finish(result);
    }

    /// Settle on `result`; only the first call per game notifies the hook
    fn finish(&mut self, result: GameResult) {
        self.state.spawner.stop();
        self.state.phase = GamePhase::Ended(result);
        if self.end_reported {
            return;
        }
        self.end_reported = true;
        if let Some(hook) = self.on_game_end.as_mut() {
            hook(result);
        }
    }

    /// Latest pointer position, normalized to the viewport
    pub fn set_pointer(&mut self, pointer: Vec2) {
        if pointer.is_finite() {
            self.pointer = pointer;
        }
    }

    pub fn pointer(&self) -> Vec2 {
        self.pointer
    }

    /// Run one frame. Returns false when the caller's loop should stop.
    pub fn frame(&mut self, generation: u64, elapsed_ms: f32) -> bool {
        if generation != self.generation {
            log::debug!("Dropping frame from stale generation {generation}");
            return false;
        }
        if self.state.phase != GamePhase::Playing {
            return false;
        }

        let input = TickInput {
            pointer: self.pointer,
            elapsed_ms,
        };
        tick(&mut self.state, &input);

        for event in self.state.drain_events() {
            match event {
                GameEvent::GameOver { result } => self.finish(result),
                GameEvent::ShipDestroyed { side } => log::debug!("{side:?} ship destroyed"),
                GameEvent::ShipHit { side, lives_left } => {
                    log::debug!("{side:?} hit, {lives_left} lives left")
                }
                GameEvent::BulletFired { .. } => {}
            }
        }

        self.state.phase == GamePhase::Playing
    }

    pub fn phase(&self) -> GamePhase {
        self.state.phase
    }

    pub fn result(&self) -> Option<GameResult> {
        match self.state.phase {
            GamePhase::Ended(result) => Some(result),
            _ => None,
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }

    pub fn snapshot(&self) -> Snapshot<'_> {
        Snapshot::capture(&self.state)
    }
}
