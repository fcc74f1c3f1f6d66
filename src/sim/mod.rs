//! Simulation module
//!
//! All gameplay logic lives here. This module must stay free of rendering
//! and platform dependencies:
//! - One synchronous `tick` per display refresh
//! - Randomness only through the session's injected RNG
//! - Stable pool iteration order (spawn order)

pub mod collision;
pub mod difficulty;
pub mod entity;
pub mod flow;
pub mod geometry;
pub mod input;
pub mod player;
pub mod state;
pub mod tick;

pub use collision::{aabb_overlap, first_collision, player_hits};
pub use difficulty::{Biome, DifficultyController};
pub use entity::{EntityPool, Obstacle, Scenery, SceneryKind, Scrolling, spawn_obstacle, spawn_scenery};
pub use flow::{on_activation_gesture, on_collision};
pub use geometry::{Bounds, GeometryConfig};
pub use input::{
    Direction, InputAdapter, PermissionOutcome, SensorEvent, TickInput, TiltPermission,
};
pub use player::{LaneSteer, Player};
pub use state::{GameEvent, GamePhase, GameState};
pub use tick::tick;
