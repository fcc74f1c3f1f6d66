//! Tilt Racer - A scrolling lane-dodging arcade racer
//!
//! Core modules:
//! - `sim`: Simulation (kinematics, spawners, collisions, screen flow)
//! - `settings`: Data-driven tuning for each game variant
//! - `view`: Renderer-agnostic frame snapshot
//! - `audio`: Ambient soundtrack playback
//! - `game`: Host-facing facade tying input, simulation and audio together

pub mod audio;
pub mod game;
pub mod settings;
pub mod sim;
pub mod view;

pub use game::Game;
pub use settings::{ConfigError, ScrollAxis, Steering, Tuning};

/// Game configuration constants
pub mod consts {
    /// Minimum playable canvas (pixels)
    pub const MIN_WIDTH: f32 = 320.0;
    pub const MIN_HEIGHT: f32 = 240.0;

    /// Most lanes a corridor can be split into
    pub const MAX_LANES: u8 = 3;

    /// Road dash spacing; the dash offset wraps at this length
    pub const DASH_SPACING: f32 = 100.0;

    /// Soundtrack volume (0.0 - 1.0)
    pub const MUSIC_VOLUME: f32 = 0.4;
}

/// 8-bit RGB color handed to the renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    /// CSS color string (`rgb(r, g, b)`)
    pub fn css(&self) -> String {
        format!("rgb({}, {}, {})", self.0, self.1, self.2)
    }
}
