//! Game tuning and variant selection
//!
//! Every structural difference between variants (scroll axis, lane count,
//! steering model) and every balance constant lives here. Tuning can be
//! loaded from LocalStorage on the web or from a JSON file on native.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::{MAX_LANES, MIN_HEIGHT, MIN_WIDTH};

/// Direction the road scrolls on screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ScrollAxis {
    /// Traffic enters on the right edge and leaves on the left
    #[default]
    Horizontal,
    /// Traffic enters on the top edge and leaves on the bottom
    Vertical,
}

impl ScrollAxis {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScrollAxis::Horizontal => "Horizontal",
            ScrollAxis::Vertical => "Vertical",
        }
    }

    /// Length of the road along the scroll direction for a canvas
    pub fn track_length(&self, width: f32, height: f32) -> f32 {
        match self {
            ScrollAxis::Horizontal => width,
            ScrollAxis::Vertical => height,
        }
    }

    /// Width of the road across the scroll direction for a canvas
    pub fn track_breadth(&self, width: f32, height: f32) -> f32 {
        match self {
            ScrollAxis::Horizontal => height,
            ScrollAxis::Vertical => width,
        }
    }

    /// Convert a screen-space vector (x right, y down) into track space
    /// (`x` = along, decreasing toward the exit; `y` = across).
    pub fn screen_to_track(&self, v: Vec2) -> Vec2 {
        match self {
            ScrollAxis::Horizontal => v,
            ScrollAxis::Vertical => Vec2::new(-v.y, v.x),
        }
    }

    /// Convert a track-space point into screen space
    pub fn track_to_screen(&self, p: Vec2, track_length: f32) -> Vec2 {
        match self {
            ScrollAxis::Horizontal => p,
            ScrollAxis::Vertical => Vec2::new(p.y, track_length - p.x),
        }
    }

    /// Convert track-space half extents into screen-space half extents
    pub fn half_to_screen(&self, half: Vec2) -> Vec2 {
        match self {
            ScrollAxis::Horizontal => half,
            ScrollAxis::Vertical => Vec2::new(half.y, half.x),
        }
    }
}

/// How the player steers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Steering {
    /// Continuous 2-axis motion driven by forces
    #[default]
    Free,
    /// Snaps between lane centers on discrete commands
    LaneLocked,
}

/// Rejected tuning values
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("lane count must be between 1 and {max}, got {got}")]
    LaneCount { got: u8, max: u8 },
    #[error("canvas {width}x{height} is smaller than the minimum playable {min_width}x{min_height}")]
    CanvasTooSmall {
        width: f32,
        height: f32,
        min_width: f32,
        min_height: f32,
    },
    #[error("road is too narrow: {breadth} across with {shoulder} shoulders leaves no room for a {body} body")]
    RoadTooNarrow { breadth: f32, shoulder: f32, body: f32 },
    #[error("{name} = {value} is out of range ({range})")]
    OutOfRange {
        name: &'static str,
        value: f32,
        range: &'static str,
    },
    #[error("{name} must be a positive tick count")]
    ZeroPeriod { name: &'static str },
    #[error("invalid tuning JSON: {0}")]
    Parse(String),
}

/// Game tuning for one variant
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Layout ===
    pub axis: ScrollAxis,
    pub steering: Steering,
    /// Number of lanes (1-3)
    pub lanes: u8,
    /// Skip the instructions screen (title goes straight to playing)
    pub skip_instructions: bool,
    /// Shoulder margin on each side of the road
    pub shoulder: f32,
    /// Extra gap kept between the player body and the shoulder
    pub edge_inset: f32,
    /// Player start distance from the exit edge
    pub player_start_along: f32,

    // === Bodies (half extents, x = along, y = across) ===
    pub player_half: Vec2,
    pub obstacle_half: Vec2,
    /// In lane-locked play, across half-extent = lane extent * this
    pub lane_body_factor: f32,

    // === Kinematics ===
    /// Velocity kept per tick (0-1)
    pub friction: f32,
    /// Per-tick blend toward the target lane center (0-1)
    pub lane_blend: f32,

    // === Difficulty ===
    pub base_speed: f32,
    pub speed_increment: f32,
    pub max_speed: f32,
    /// Speed steps up every time score reaches a multiple of this
    pub milestone: u32,
    pub biome_period: u32,

    // === Spawning ===
    pub obstacle_period: u32,
    pub scenery_period: u32,
    pub obstacle_exit_margin: f32,
    pub scenery_exit_margin: f32,
    /// Scenery appears this far beyond the entry edge
    pub scenery_spawn_lead: f32,
    /// Scenery speed relative to traffic (0-1)
    pub parallax: f32,

    // === Input ===
    /// Tilt clamp (degrees)
    pub tilt_limit: f32,
    pub tilt_gain: f32,
    pub key_force: f32,
    /// Tilt past this angle counts as a lane change in lane-locked play
    pub tilt_lane_threshold: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            axis: ScrollAxis::Horizontal,
            steering: Steering::Free,
            lanes: 3,
            skip_instructions: false,
            shoulder: 50.0,
            edge_inset: 5.0,
            player_start_along: 150.0,

            player_half: Vec2::new(25.0, 15.0),
            obstacle_half: Vec2::new(20.0, 10.0),
            lane_body_factor: 0.38,

            friction: 0.94,
            lane_blend: 0.18,

            base_speed: 5.0,
            speed_increment: 0.5,
            max_speed: 15.0,
            milestone: 10,
            biome_period: 1800,

            obstacle_period: 50,
            scenery_period: 30,
            obstacle_exit_margin: 100.0,
            scenery_exit_margin: 50.0,
            scenery_spawn_lead: 50.0,
            parallax: 0.8,

            tilt_limit: 25.0,
            tilt_gain: 0.12,
            key_force: 0.6,
            tilt_lane_threshold: 12.0,
        }
    }
}

impl Tuning {
    /// Vertical road with lane-locked steering
    pub fn vertical_lanes(lanes: u8) -> Self {
        Self {
            axis: ScrollAxis::Vertical,
            steering: Steering::LaneLocked,
            lanes,
            shoulder: 100.0,
            player_half: Vec2::new(45.0, 45.0),
            obstacle_half: Vec2::new(40.0, 40.0),
            obstacle_period: 60,
            scenery_period: 35,
            ..Self::default()
        }
    }

    pub fn is_lane_locked(&self) -> bool {
        self.steering == Steering::LaneLocked
    }

    /// Check every value the simulation relies on
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.lanes == 0 || self.lanes > MAX_LANES {
            return Err(ConfigError::LaneCount {
                got: self.lanes,
                max: MAX_LANES,
            });
        }

        unit_interval("friction", self.friction)?;
        unit_interval("lane_blend", self.lane_blend)?;
        unit_interval("parallax", self.parallax)?;
        unit_interval("lane_body_factor", self.lane_body_factor)?;

        if self.base_speed <= 0.0 {
            return Err(out_of_range("base_speed", self.base_speed, "> 0"));
        }
        if self.max_speed < self.base_speed {
            return Err(out_of_range("max_speed", self.max_speed, ">= base_speed"));
        }
        if self.speed_increment < 0.0 {
            return Err(out_of_range("speed_increment", self.speed_increment, ">= 0"));
        }
        if self.shoulder < 0.0 {
            return Err(out_of_range("shoulder", self.shoulder, ">= 0"));
        }
        if self.tilt_limit <= 0.0 {
            return Err(out_of_range("tilt_limit", self.tilt_limit, "> 0"));
        }
        for (name, half) in [
            ("player_half", self.player_half),
            ("obstacle_half", self.obstacle_half),
        ] {
            if half.x <= 0.0 || half.y <= 0.0 {
                return Err(out_of_range(name, half.x.min(half.y), "> 0"));
            }
        }

        for (name, period) in [
            ("milestone", self.milestone),
            ("biome_period", self.biome_period),
            ("obstacle_period", self.obstacle_period),
            ("scenery_period", self.scenery_period),
        ] {
            if period == 0 {
                return Err(ConfigError::ZeroPeriod { name });
            }
        }

        Ok(())
    }

    /// Parse and validate tuning from JSON
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let tuning: Tuning =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// LocalStorage key
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "tilt_racer_tuning";

    /// Environment variable naming a tuning file (native only)
    #[allow(dead_code)]
    const TUNING_ENV: &'static str = "TILT_RACER_TUNING";

    /// Load tuning from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                match Self::from_json(&json) {
                    Ok(tuning) => {
                        log::info!("Loaded tuning from LocalStorage");
                        return tuning;
                    }
                    Err(e) => log::warn!("Ignoring stored tuning: {}", e),
                }
            }
        }

        log::info!("Using default tuning");
        Self::default()
    }

    /// Load tuning from the file named by `TILT_RACER_TUNING`, if any
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        let Ok(path) = std::env::var(Self::TUNING_ENV) else {
            log::info!("Using default tuning");
            return Self::default();
        };

        match std::fs::read_to_string(&path) {
            Ok(json) => match Self::from_json(&json) {
                Ok(tuning) => {
                    log::info!("Loaded tuning from {}", path);
                    tuning
                }
                Err(e) => {
                    log::warn!("Ignoring tuning file {}: {}", path, e);
                    Self::default()
                }
            },
            Err(e) => {
                log::warn!("Cannot read tuning file {}: {}", path, e);
                Self::default()
            }
        }
    }
}

fn out_of_range(name: &'static str, value: f32, range: &'static str) -> ConfigError {
    ConfigError::OutOfRange { name, value, range }
}

/// Open interval (0, 1)
fn unit_interval(name: &'static str, value: f32) -> Result<(), ConfigError> {
    if value > 0.0 && value < 1.0 {
        Ok(())
    } else {
        Err(out_of_range(name, value, "0 < x < 1"))
    }
}

/// Reject canvases below the minimum playable size
pub fn check_canvas(width: f32, height: f32) -> Result<(), ConfigError> {
    if width < MIN_WIDTH || height < MIN_HEIGHT || !width.is_finite() || !height.is_finite() {
        return Err(ConfigError::CanvasTooSmall {
            width,
            height,
            min_width: MIN_WIDTH,
            min_height: MIN_HEIGHT,
        });
    }
    Ok(())
}
