//! Player vehicle kinematics
//!
//! Free steering integrates impulses with per-tick friction. Lane-locked
//! steering eases the car toward the center of a target lane instead.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::geometry::{Bounds, GeometryConfig};
use crate::settings::Tuning;

/// Lane-locked steering state
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LaneSteer {
    /// Lane the car is easing toward
    pub target: usize,
    /// Fraction of the remaining gap closed each tick
    pub blend: f32,
}

/// The player's car (track space: x = along, y = across)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub pos: Vec2,
    pub vel: Vec2,
    /// Velocity kept per tick
    pub friction: f32,
    pub half: Vec2,
    /// Clearance kept from the shoulders and canvas edges
    pub inset: f32,
    /// `Some` in lane-locked variants
    pub lane: Option<LaneSteer>,
}

impl Player {
    /// Fresh car at the start position
    pub fn new(tuning: &Tuning, geometry: &GeometryConfig) -> Self {
        let (half, across, lane) = if tuning.is_lane_locked() {
            let target = geometry.middle_lane();
            (
                Vec2::new(tuning.player_half.x, geometry.lane_body_half(tuning.lane_body_factor)),
                geometry.lane_center(target),
                Some(LaneSteer {
                    target,
                    blend: tuning.lane_blend,
                }),
            )
        } else {
            (tuning.player_half, geometry.breadth / 2.0, None)
        };

        let mut player = Self {
            pos: Vec2::new(tuning.player_start_along, across),
            vel: Vec2::ZERO,
            friction: tuning.friction,
            half,
            inset: tuning.edge_inset,
            lane,
        };
        player.pos = player.bounds(geometry).clamp(player.pos);
        player
    }

    /// Legal rectangle for the car's center
    pub fn bounds(&self, geometry: &GeometryConfig) -> Bounds {
        geometry.travel_bounds(self.half, self.inset)
    }

    /// Add an impulse straight into velocity
    pub fn apply_force(&mut self, force: Vec2) {
        self.vel += force;
    }

    /// Shift the target lane by one step (clamped to the road)
    pub fn change_lane(&mut self, direction: i8, lane_count: usize) {
        if let Some(steer) = self.lane.as_mut() {
            let target = steer.target as i64 + direction.signum() as i64;
            steer.target = target.clamp(0, lane_count as i64 - 1) as usize;
        }
    }

    /// Advance one tick.
    ///
    /// Order matters: position moves by the current velocity before friction
    /// decays it, and the clamp runs last.
    pub fn update(&mut self, geometry: &GeometryConfig) {
        match self.lane {
            Some(steer) => {
                let target = geometry.lane_center(steer.target);
                self.pos.y += (target - self.pos.y) * steer.blend;
            }
            None => {
                self.pos += self.vel;
                self.vel *= self.friction;
            }
        }
        self.pos = self.bounds(geometry).clamp(self.pos);
    }

    /// Re-seat the car after the road layout changed
    pub fn refit(&mut self, old: &GeometryConfig, new: &GeometryConfig, lane_body_factor: f32) {
        match self.lane {
            Some(steer) => {
                self.half.y = new.lane_body_half(lane_body_factor);
                self.pos.y = new.lane_center(steer.target);
            }
            None => {
                let t = (self.pos.y - old.shoulder) / old.corridor();
                self.pos.y = new.shoulder + t * new.corridor();
            }
        }
        self.pos = self.bounds(new).clamp(self.pos);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::{ScrollAxis, Steering};

    fn road() -> GeometryConfig {
        GeometryConfig::new(ScrollAxis::Horizontal, 800.0, 600.0, 3, 50.0).unwrap()
    }

    #[test]
    fn test_starts_at_default_position() {
        let p = Player::new(&Tuning::default(), &road());
        assert_eq!(p.pos, Vec2::new(150.0, 300.0));
        assert_eq!(p.vel, Vec2::ZERO);
    }

    #[test]
    fn test_friction_applies_after_move() {
        let g = road();
        let mut p = Player::new(&Tuning::default(), &g);
        p.apply_force(Vec2::new(10.0, 0.0));
        p.update(&g);
        // Moved by the full impulse, then velocity decayed
        assert_eq!(p.pos.x, 160.0);
        assert!((p.vel.x - 9.4).abs() < 1e-5);
        p.update(&g);
        assert!((p.pos.x - 169.4).abs() < 1e-4);
    }

    #[test]
    fn test_clamped_to_road() {
        let g = road();
        let mut p = Player::new(&Tuning::default(), &g);
        p.apply_force(Vec2::new(-1000.0, 1000.0));
        p.update(&g);
        assert_eq!(p.pos, Vec2::new(30.0, 530.0));
    }

    #[test]
    fn test_lane_change_eases_and_clamps() {
        let tuning = Tuning {
            steering: Steering::LaneLocked,
            ..Default::default()
        };
        let g = road();
        let mut p = Player::new(&tuning, &g);
        assert_eq!(p.lane.unwrap().target, 1);
        assert_eq!(p.pos.y, 300.0);

        p.change_lane(1, 3);
        p.change_lane(1, 3);
        assert_eq!(p.lane.unwrap().target, 2);

        p.update(&g);
        // 18% of the 166.67 gap to lane 2
        assert!((p.pos.y - (300.0 + 166.666_67 * 0.18)).abs() < 0.01);
        for _ in 0..200 {
            p.update(&g);
        }
        assert!((p.pos.y - g.lane_center(2)).abs() < 0.01);

        p.change_lane(-1, 3);
        p.change_lane(-1, 3);
        p.change_lane(-1, 3);
        assert_eq!(p.lane.unwrap().target, 0);
    }

    #[test]
    fn test_refit_keeps_car_on_new_road() {
        let g = road();
        let mut p = Player::new(&Tuning::default(), &g);
        p.pos = Vec2::new(700.0, 520.0);
        let small = g.resized(400.0, 300.0).unwrap();
        p.refit(&g, &small, 0.38);
        assert!(p.bounds(&small).contains(p.pos));
    }
}
