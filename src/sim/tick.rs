//! Fixed-step simulation tick
//!
//! One call per display refresh. The order below is part of the game feel
//! and must not be rearranged: steer, move the car (friction after the
//! move), spawn, advance and recycle traffic, then test collisions against
//! whatever is still on the road, then difficulty upkeep.

use super::collision::first_collision;
use super::flow::on_collision;
use super::input::TickInput;
use super::state::{GameEvent, GamePhase, GameState};

/// Advance the game state by one tick
pub fn tick(state: &mut GameState, input: &TickInput) {
    // Other screens are static
    if state.phase != GamePhase::Playing {
        return;
    }

    state.time_ticks += 1;
    let now = state.time_ticks;

    // Player
    if input.lane_change != 0 {
        let lanes = state.geometry.lane_count();
        state.player.change_lane(input.lane_change, lanes);
    }
    state.player.apply_force(input.force);
    state.player.update(&state.geometry);

    // Spawns
    state.spawn_due();

    // Advance and recycle; every car that got past scores a point
    let speed = state.speed();
    let passed = state.obstacles.advance(speed);
    for _ in 0..passed {
        state.score += 1;
        if let Some(speed) = state.difficulty.on_score(state.score) {
            log::debug!("Speed up to {:.1} at {}m", speed, state.score);
            state.push_event(GameEvent::SpeedUp { speed });
        }
    }
    state.scenery.advance(speed);

    let hit = first_collision(&state.player, state.obstacles.items()).map(|o| o.id);

    if let Some(biome) = state.difficulty.tick(now, &mut state.rng) {
        log::debug!("Biome changed to {}", biome.as_str());
        state.push_event(GameEvent::BiomeChanged { biome });
    }

    if let Some(id) = hit {
        log::debug!("Hit car {}", id);
        on_collision(state);
    }
}
