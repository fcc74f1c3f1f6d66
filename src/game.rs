//! Host-facing game facade
//!
//! Owns the session, the input adapter and the soundtrack. A host forwards
//! raw events (taps, keys, sensor samples, resizes) and calls `frame` once
//! per display refresh.

use crossbeam_channel::Sender;

use crate::audio::{Soundtrack, ensure_playing};
use crate::consts::MUSIC_VOLUME;
use crate::settings::{ConfigError, Tuning};
use crate::sim::{
    Direction, GameEvent, GamePhase, GameState, InputAdapter, SensorEvent, TiltPermission,
    on_activation_gesture, tick,
};
use crate::view::{Frame, advance_road_offset};

pub struct Game<S: Soundtrack> {
    state: GameState,
    input: InputAdapter,
    soundtrack: S,
    /// Music was asked for; retried on later gestures until it plays
    music_wanted: bool,
    road_offset: f32,
}

impl<S: Soundtrack> Game<S> {
    pub fn new(
        tuning: Tuning,
        width: f32,
        height: f32,
        seed: u64,
        soundtrack: S,
    ) -> Result<Self, ConfigError> {
        let state = GameState::new(tuning, width, height, seed)?;
        log::info!(
            "Game ready: {} road, {} lane(s), {:?} steering",
            state.tuning.axis.as_str(),
            state.geometry.lane_count(),
            state.tuning.steering
        );
        Ok(Self {
            state,
            input: InputAdapter::new(),
            soundtrack,
            music_wanted: false,
            road_offset: 0.0,
        })
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn phase(&self) -> GamePhase {
        self.state.phase
    }

    pub fn soundtrack(&self) -> &S {
        &self.soundtrack
    }

    pub fn permission(&self) -> TiltPermission {
        self.input.permission()
    }

    /// Channel for sensor callbacks (orientation samples, permission result)
    pub fn sensor_sender(&self) -> Sender<SensorEvent> {
        self.input.sensor_sender()
    }

    /// Tap / click / pointer press
    pub fn activate(&mut self) -> Vec<GameEvent> {
        // Browsers only allow playback from a gesture; an earlier start may have been refused
        if self.music_wanted && ensure_playing(&mut self.soundtrack, MUSIC_VOLUME) {
            log::debug!("Retrying soundtrack start");
        }
        on_activation_gesture(&mut self.state);
        self.dispatch_events()
    }

    /// Key or on-screen button press/release
    pub fn set_direction(&mut self, direction: Direction, held: bool) {
        self.input.set_held(direction, held);
    }

    /// Window lost focus; nothing stays held
    pub fn release_keys(&mut self) {
        self.input.release_all();
    }

    /// Canvas size changed. On error the previous layout stays in place.
    pub fn resize(&mut self, width: f32, height: f32) -> Result<(), ConfigError> {
        self.state.resize(width, height)
    }

    /// Run one display refresh: sample input, tick, play side effects.
    /// Returns the events emitted this frame.
    pub fn frame(&mut self) -> Vec<GameEvent> {
        let command = self.input.sample(&self.state.tuning);
        tick(&mut self.state, &command);
        self.road_offset = advance_road_offset(self.road_offset, self.state.speed());
        self.dispatch_events()
    }

    /// Snapshot for the renderer
    pub fn view(&self) -> Frame {
        Frame::build(&self.state, self.road_offset)
    }

    fn dispatch_events(&mut self) -> Vec<GameEvent> {
        let events = self.state.drain_events();
        for event in &events {
            if *event == GameEvent::AmbientMusic {
                self.music_wanted = true;
                if ensure_playing(&mut self.soundtrack, MUSIC_VOLUME) {
                    log::debug!("Soundtrack loop started");
                }
            }
        }
        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::SilentSoundtrack;
    use crate::sim::PermissionOutcome;

    fn game() -> Game<SilentSoundtrack> {
        Game::new(Tuning::default(), 800.0, 600.0, 9, SilentSoundtrack::new()).unwrap()
    }

    #[test]
    fn test_music_starts_once_on_first_tap() {
        let mut game = game();
        assert!(!game.soundtrack().is_playing());
        game.activate();
        assert!(game.soundtrack().is_playing());
        game.activate();
        game.activate();
        assert_eq!(game.soundtrack().starts(), 1);
        assert_eq!(game.phase(), GamePhase::Playing);
    }

    /// Refuses the first start, like a browser blocking autoplay
    #[derive(Default)]
    struct BlockedOnce {
        attempts: u32,
        playing: bool,
    }

    impl Soundtrack for BlockedOnce {
        fn is_playing(&self) -> bool {
            self.playing
        }

        fn start_loop(&mut self, _volume: f32) {
            self.attempts += 1;
            self.playing = self.attempts > 1;
        }
    }

    #[test]
    fn test_blocked_music_retries_on_next_tap() {
        let mut game = Game::new(Tuning::default(), 800.0, 600.0, 9, BlockedOnce::default()).unwrap();
        game.activate();
        assert_eq!(game.phase(), GamePhase::Instructions);
        assert!(!game.soundtrack().is_playing());

        game.activate();
        assert_eq!(game.phase(), GamePhase::Playing);
        assert!(game.soundtrack().is_playing());
        assert_eq!(game.soundtrack().attempts, 2);

        // Playing now; further taps leave it alone
        game.activate();
        assert_eq!(game.soundtrack().attempts, 2);
    }

    #[test]
    fn test_no_music_before_first_tap() {
        let mut game = Game::new(Tuning::default(), 800.0, 600.0, 9, BlockedOnce::default()).unwrap();
        for _ in 0..3 {
            game.frame();
        }
        assert_eq!(game.soundtrack().attempts, 0);
    }

    #[test]
    fn test_keys_steer_during_frames() {
        let mut game = game();
        game.activate();
        game.activate();
        game.set_direction(Direction::Down, true);
        for _ in 0..10 {
            game.frame();
        }
        assert!(game.state().player.pos.y > 300.0);

        game.release_keys();
        let y = game.state().player.pos.y;
        game.frame();
        // Still drifting, but slower
        assert!(game.state().player.pos.y >= y);
    }

    #[test]
    fn test_sensor_channel_reaches_input() {
        let mut game = game();
        let tx = game.sensor_sender();
        tx.send(SensorEvent::PermissionResolved(PermissionOutcome::Granted))
            .unwrap();
        assert_eq!(game.permission(), TiltPermission::Pending);
        game.frame();
        assert_eq!(game.permission(), TiltPermission::Granted);
    }

    #[test]
    fn test_frames_on_title_only_scroll_the_road() {
        let mut game = game();
        for _ in 0..5 {
            assert!(game.frame().is_empty());
        }
        assert_eq!(game.state().time_ticks, 0);
        assert_eq!(game.view().dashes[0].from.x, -5.0);
    }

    #[test]
    fn test_bad_resize_keeps_layout() {
        let mut game = game();
        assert!(game.resize(1.0, 1.0).is_err());
        assert_eq!(game.state().geometry.width, 800.0);
        assert!(game.resize(1024.0, 768.0).is_ok());
        assert_eq!(game.view().width, 1024.0);
    }
}
