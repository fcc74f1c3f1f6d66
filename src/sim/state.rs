//! Game state and session lifecycle
//!
//! Everything the frame loop mutates lives in one `GameState` value that is
//! passed explicitly to `tick` and the screen-flow handlers.

use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::difficulty::{Biome, DifficultyController};
use super::entity::{EntityPool, Obstacle, Scenery, spawn_obstacle, spawn_scenery};
use super::geometry::GeometryConfig;
use super::player::Player;
use crate::settings::{ConfigError, Tuning};

/// Current screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Title card, waiting for the first tap
    Title,
    /// How-to-play card
    Instructions,
    /// Active driving
    Playing,
    /// Crashed; shows final and best distance until the next tap
    GameOver,
}

/// Side effects for the host to act on (audio, UI)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    /// Start the looping soundtrack unless it is already playing
    AmbientMusic,
    /// A new run started
    Reset { biome: Biome },
    /// The player hit traffic
    Crash { score: u32, high_score: u32, new_record: bool },
    SpeedUp { speed: f32 },
    BiomeChanged { biome: Biome },
}

fn take_id(next: &mut u32) -> u32 {
    let id = *next;
    *next = next.wrapping_add(1);
    id
}

/// Complete session state
#[derive(Debug, Clone)]
pub struct GameState {
    pub tuning: Tuning,
    pub geometry: GeometryConfig,
    pub phase: GamePhase,
    /// Distance score of the current run
    pub score: u32,
    /// Best score since the process started
    pub high_score: u32,
    pub difficulty: DifficultyController,
    pub player: Player,
    pub obstacles: EntityPool<Obstacle>,
    pub scenery: EntityPool<Scenery>,
    /// Ticks simulated in the current run
    pub time_ticks: u64,
    pub rng: Pcg32,
    events: Vec<GameEvent>,
    next_id: u32,
}

impl GameState {
    /// Create a session on the title screen
    pub fn new(tuning: Tuning, width: f32, height: f32, seed: u64) -> Result<Self, ConfigError> {
        tuning.validate()?;
        let geometry = GeometryConfig::from_tuning(&tuning, width, height)?;
        let player = Player::new(&tuning, &geometry);

        Ok(Self {
            difficulty: DifficultyController::new(&tuning, Biome::Forest),
            obstacles: EntityPool::new(tuning.obstacle_period, tuning.obstacle_exit_margin),
            scenery: EntityPool::new(tuning.scenery_period, tuning.scenery_exit_margin),
            tuning,
            geometry,
            phase: GamePhase::Title,
            score: 0,
            high_score: 0,
            player,
            time_ticks: 0,
            rng: Pcg32::seed_from_u64(seed),
            events: Vec::new(),
            next_id: 1,
        })
    }

    #[cfg(test)]
    pub(crate) fn next_entity_id(&mut self) -> u32 {
        take_id(&mut self.next_id)
    }

    /// Spawn a car and a scenery item if this tick is on their cadence
    pub fn spawn_due(&mut self) {
        let now = self.time_ticks;
        let Self {
            obstacles,
            scenery,
            rng,
            tuning,
            geometry,
            next_id,
            ..
        } = self;

        let spawned = obstacles.spawn_if_due(now, || {
            spawn_obstacle(&mut *rng, take_id(next_id), tuning, geometry)
        });
        if spawned {
            if let Some(car) = obstacles.items().last() {
                log::debug!("Spawned car {} at across {:.0}", car.id, car.pos.y);
            }
        }
        scenery.spawn_if_due(now, || {
            spawn_scenery(&mut *rng, take_id(next_id), tuning, geometry)
        });
    }

    #[inline]
    pub fn speed(&self) -> f32 {
        self.difficulty.speed()
    }

    #[inline]
    pub fn biome(&self) -> Biome {
        self.difficulty.biome()
    }

    pub fn push_event(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Take every event emitted since the last call
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Start a fresh run: zero score, base speed, empty pools, new biome, new car
    pub fn reset(&mut self) {
        self.score = 0;
        self.time_ticks = 0;
        self.difficulty.reset(&mut self.rng);
        self.obstacles.clear();
        self.scenery.clear();
        self.player = Player::new(&self.tuning, &self.geometry);
        self.push_event(GameEvent::Reset {
            biome: self.biome(),
        });
        log::info!("New run in the {} biome", self.biome().as_str());
    }

    /// Recompute the road for a new canvas size and re-seat everything on it
    pub fn resize(&mut self, width: f32, height: f32) -> Result<(), ConfigError> {
        let geometry = self.geometry.resized(width, height)?;
        self.player
            .refit(&self.geometry, &geometry, self.tuning.lane_body_factor);
        for obstacle in self.obstacles.items_mut() {
            obstacle.refit(&self.tuning, &geometry);
        }
        self.geometry = geometry;
        log::debug!("Road resized to {}x{}", width, height);
        Ok(())
    }
}
