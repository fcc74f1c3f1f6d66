//! Screen flow
//!
//! Title -> Instructions -> Playing -> GameOver -> Playing. The activation
//! gesture (tap/click) drives every manual transition; a crash is the only
//! automatic one. Anything else is a no-op.

use super::state::{GameEvent, GamePhase, GameState};

/// Handle a tap/click/pointer press
pub fn on_activation_gesture(state: &mut GameState) {
    match state.phase {
        GamePhase::Title => {
            state.push_event(GameEvent::AmbientMusic);
            if state.tuning.skip_instructions {
                start_run(state);
            } else {
                state.phase = GamePhase::Instructions;
                log::info!("Showing instructions");
            }
        }
        GamePhase::Instructions | GamePhase::GameOver => start_run(state),
        // Taps while driving belong to the input layer
        GamePhase::Playing => {}
    }
}

/// End the run after the player hit traffic
pub fn on_collision(state: &mut GameState) {
    if state.phase != GamePhase::Playing {
        return;
    }

    state.phase = GamePhase::GameOver;
    let new_record = state.score > state.high_score;
    if new_record {
        state.high_score = state.score;
    }
    state.push_event(GameEvent::Crash {
        score: state.score,
        high_score: state.high_score,
        new_record,
    });
    log::info!(
        "Crashed at {}m (best {}m{})",
        state.score,
        state.high_score,
        if new_record { ", new record" } else { "" }
    );
}

fn start_run(state: &mut GameState) {
    state.reset();
    state.phase = GamePhase::Playing;
}
