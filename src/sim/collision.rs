//! Collision detection between the player and traffic
//!
//! Axis-aligned boxes with strict overlap: boxes that only touch edges do
//! not collide. The test is symmetric in its two arguments.

use glam::Vec2;

use super::entity::Obstacle;
use super::player::Player;

/// Strict AABB overlap of two boxes given by center and half extents
#[inline]
pub fn aabb_overlap(a_pos: Vec2, a_half: Vec2, b_pos: Vec2, b_half: Vec2) -> bool {
    let gap = (a_pos - b_pos).abs();
    let reach = a_half + b_half;
    gap.x < reach.x && gap.y < reach.y
}

/// Whether the player overlaps one obstacle
#[inline]
pub fn player_hits(player: &Player, obstacle: &Obstacle) -> bool {
    aabb_overlap(player.pos, player.half, obstacle.pos, obstacle.half)
}

/// First obstacle (in pool order) the player overlaps, if any
pub fn first_collision<'a>(player: &Player, obstacles: &'a [Obstacle]) -> Option<&'a Obstacle> {
    obstacles.iter().find(|o| player_hits(player, o))
}
