//! Renderer-agnostic frame snapshot
//!
//! Converts the game state into screen-space shapes and text. Drawing them
//! (canvas, GPU, terminal) is the host's job.

use glam::Vec2;

use crate::Rgb;
use crate::consts::DASH_SPACING;
use crate::sim::{GamePhase, GameState, SceneryKind};

pub const SKY: Rgb = Rgb(135, 206, 235);
pub const ROAD: Rgb = Rgb(60, 60, 60);
pub const LANE_PAINT: Rgb = Rgb(255, 255, 255);
pub const PLAYER_PAINT: Rgb = Rgb(255, 69, 0);
pub const HUD_TEXT: Rgb = Rgb(255, 255, 0);
const PROMPT: Rgb = Rgb(0, 255, 150);
const WHITE: Rgb = Rgb(255, 255, 255);

/// Axis-aligned rectangle in screen space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenRect {
    pub center: Vec2,
    pub half: Vec2,
}

impl ScreenRect {
    /// Top-left corner
    pub fn origin(&self) -> Vec2 {
        self.center - self.half
    }

    pub fn size(&self) -> Vec2 {
        self.half * 2.0
    }
}

/// Something to draw on the road
#[derive(Debug, Clone, PartialEq)]
pub enum Sprite {
    Player { rect: ScreenRect },
    Car {
        rect: ScreenRect,
        color: Rgb,
        label: String,
    },
    Decoration {
        kind: SceneryKind,
        pos: Vec2,
        scale: f32,
    },
}

/// A painted lane-line segment
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Dash {
    pub from: Vec2,
    pub to: Vec2,
}

/// Centered line of overlay text
#[derive(Debug, Clone, PartialEq)]
pub struct TextLine {
    pub text: String,
    pub size: f32,
    pub color: Rgb,
    /// Offset from the canvas center
    pub offset_y: f32,
}

/// Full-screen card shown outside of play
#[derive(Debug, Clone, PartialEq)]
pub struct Overlay {
    /// Darkening alpha (0-255)
    pub dim: u8,
    pub lines: Vec<TextLine>,
}

/// Distance readouts shown while driving
#[derive(Debug, Clone, PartialEq)]
pub struct Hud {
    pub distance: String,
    pub best: String,
}

/// Everything a renderer needs for one frame
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub width: f32,
    pub height: f32,
    /// Shoulder strips as (rect, color): far side first
    pub shoulders: [(ScreenRect, Rgb); 2],
    pub road: ScreenRect,
    pub dashes: Vec<Dash>,
    pub sprites: Vec<Sprite>,
    pub hud: Option<Hud>,
    pub overlay: Option<Overlay>,
}

/// Scroll the lane dashes by one tick
pub fn advance_road_offset(offset: f32, speed: f32) -> f32 {
    let next = offset - speed;
    if next < -DASH_SPACING { 0.0 } else { next }
}

fn line(text: impl Into<String>, size: f32, color: Rgb, offset_y: f32) -> TextLine {
    TextLine {
        text: text.into(),
        size,
        color,
        offset_y,
    }
}

/// Text card for the current screen
pub fn overlay_for(state: &GameState) -> Option<Overlay> {
    match state.phase {
        GamePhase::Title => Some(Overlay {
            dim: 150,
            lines: vec![
                line("SENNA RACER", 50.0, Rgb(255, 204, 0), -50.0),
                line("Safety First! Avoid the Cars.", 20.0, WHITE, 0.0),
                line("Tap to Start", 20.0, PROMPT, 60.0),
            ],
        }),
        GamePhase::Instructions => {
            let steer = if state.tuning.is_lane_locked() {
                "Tilt your phone to change lanes."
            } else {
                "Tilt your phone to steer."
            };
            Some(Overlay {
                dim: 180,
                lines: vec![
                    line("DRIVER INSTRUCTIONS", 24.0, WHITE, -state.geometry.height / 6.0),
                    line(steer, 18.0, WHITE, -24.0),
                    line("On Laptop: Use Arrow Keys.", 18.0, WHITE, 0.0),
                    line("Don't hit the other cars!", 18.0, WHITE, 24.0),
                    line("Tap to Ride", 18.0, PROMPT, 120.0),
                ],
            })
        }
        GamePhase::GameOver => Some(Overlay {
            dim: 200,
            lines: vec![
                line("CRASH!", 48.0, Rgb(255, 50, 50), -60.0),
                line(format!("Final Distance: {}m", state.score), 24.0, WHITE, 0.0),
                line(format!("Session Record: {}m", state.high_score), 24.0, WHITE, 40.0),
                line("Tap to Restart", 24.0, PROMPT, 100.0),
            ],
        }),
        GamePhase::Playing => None,
    }
}

impl Frame {
    /// Snapshot the game for drawing
    pub fn build(state: &GameState, road_offset: f32) -> Self {
        let g = &state.geometry;
        let axis = g.axis;
        let to_rect = |center: Vec2, half: Vec2| ScreenRect {
            center: axis.track_to_screen(center, g.length),
            half: axis.half_to_screen(half),
        };

        let (far, near) = state.biome().shoulder_colors();
        let strip = Vec2::new(g.length / 2.0, g.shoulder / 2.0);
        let shoulders = [
            (to_rect(Vec2::new(g.length / 2.0, g.shoulder / 2.0), strip), far),
            (
                to_rect(Vec2::new(g.length / 2.0, g.breadth - g.shoulder / 2.0), strip),
                near,
            ),
        ];
        let road = to_rect(
            Vec2::new(g.length / 2.0, g.breadth / 2.0),
            Vec2::new(g.length / 2.0, g.corridor() / 2.0),
        );

        let mut dashes = Vec::new();
        for across in g.lane_dividers() {
            let mut along = road_offset;
            while along < g.length {
                dashes.push(Dash {
                    from: axis.track_to_screen(Vec2::new(along + 20.0, across), g.length),
                    to: axis.track_to_screen(Vec2::new(along + 70.0, across), g.length),
                });
                along += DASH_SPACING;
            }
        }

        let mut sprites = Vec::new();
        if state.phase == GamePhase::Playing {
            for s in state.scenery.items() {
                sprites.push(Sprite::Decoration {
                    kind: s.kind,
                    pos: axis.track_to_screen(s.pos, g.length),
                    scale: s.scale,
                });
            }
            for o in state.obstacles.items() {
                sprites.push(Sprite::Car {
                    rect: to_rect(o.pos, o.half),
                    color: o.color,
                    label: o.label.clone(),
                });
            }
            sprites.push(Sprite::Player {
                rect: to_rect(state.player.pos, state.player.half),
            });
        }

        let hud = (state.phase == GamePhase::Playing).then(|| Hud {
            distance: format!("Distance: {}m", state.score),
            best: format!("Best: {}m", state.high_score),
        });

        Self {
            width: g.width,
            height: g.height,
            shoulders,
            road,
            dashes,
            sprites,
            hud,
            overlay: overlay_for(state),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Tuning;
    use crate::sim::on_activation_gesture;

    #[test]
    fn test_title_frame_has_card_only() {
        let state = GameState::new(Tuning::default(), 800.0, 600.0, 1).unwrap();
        let frame = Frame::build(&state, 0.0);
        let overlay = frame.overlay.unwrap();
        assert_eq!(overlay.lines[0].text, "SENNA RACER");
        assert!(frame.hud.is_none());
        assert!(frame.sprites.is_empty());
        // Two dividers for three lanes, dashes every 100 units across 800
        assert_eq!(frame.dashes.len(), 2 * 8);
    }

    #[test]
    fn test_playing_frame_shows_hud_and_player() {
        let mut state = GameState::new(Tuning::default(), 800.0, 600.0, 1).unwrap();
        on_activation_gesture(&mut state);
        on_activation_gesture(&mut state);
        state.score = 42;
        let frame = Frame::build(&state, 0.0);
        assert!(frame.overlay.is_none());
        assert_eq!(frame.hud.unwrap().distance, "Distance: 42m");
        assert_eq!(
            frame.sprites.last(),
            Some(&Sprite::Player {
                rect: ScreenRect {
                    center: Vec2::new(150.0, 300.0),
                    half: Vec2::new(25.0, 15.0),
                }
            })
        );
    }

    #[test]
    fn test_vertical_frame_rotates_bodies() {
        let mut state = GameState::new(Tuning::vertical_lanes(3), 700.0, 1000.0, 1).unwrap();
        on_activation_gesture(&mut state);
        on_activation_gesture(&mut state);
        let frame = Frame::build(&state, 0.0);
        let Some(Sprite::Player { rect }) = frame.sprites.last() else {
            panic!("player sprite missing");
        };
        assert_eq!(rect.center, Vec2::new(350.0, 850.0));
        assert_eq!(rect.half.y, 45.0);
        // Shoulders run down the left and right edges
        assert_eq!(frame.shoulders[0].0.center, Vec2::new(50.0, 500.0));
    }

    #[test]
    fn test_game_over_card_shows_scores() {
        let mut state = GameState::new(Tuning::default(), 800.0, 600.0, 1).unwrap();
        state.phase = GamePhase::GameOver;
        state.score = 8;
        state.high_score = 20;
        let overlay = overlay_for(&state).unwrap();
        let texts: Vec<&str> = overlay.lines.iter().map(|l| l.text.as_str()).collect();
        assert_eq!(
            texts,
            vec!["CRASH!", "Final Distance: 8m", "Session Record: 20m", "Tap to Restart"]
        );
    }

    #[test]
    fn test_road_offset_wraps() {
        assert_eq!(advance_road_offset(0.0, 5.0), -5.0);
        assert_eq!(advance_road_offset(-98.0, 5.0), 0.0);
    }
}
