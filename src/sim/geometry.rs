//! Road layout derived from canvas size
//!
//! The road is described in track space: `along` runs from the exit edge
//! (0) to the entry edge (`length`), `across` runs from the far edge (0) to
//! the near edge (`breadth`). A shoulder of fixed width borders the road on
//! both `across` edges; the corridor between them is split evenly into lanes.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::MAX_LANES;
use crate::settings::{ConfigError, ScrollAxis, Tuning, check_canvas};

/// Axis-aligned rectangle in track space
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min: Vec2,
    pub max: Vec2,
}

impl Bounds {
    /// Clamp a point into the rectangle
    #[inline]
    pub fn clamp(&self, p: Vec2) -> Vec2 {
        Vec2::new(p.x.clamp(self.min.x, self.max.x), p.y.clamp(self.min.y, self.max.y))
    }

    #[inline]
    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    /// Build from possibly inverted edges; an inverted axis collapses to its midpoint
    fn from_edges(lo: Vec2, hi: Vec2) -> Self {
        let fix = |lo: f32, hi: f32| {
            if lo <= hi {
                (lo, hi)
            } else {
                let mid = (lo + hi) * 0.5;
                (mid, mid)
            }
        };
        let (min_x, max_x) = fix(lo.x, hi.x);
        let (min_y, max_y) = fix(lo.y, hi.y);
        Self {
            min: Vec2::new(min_x, min_y),
            max: Vec2::new(max_x, max_y),
        }
    }
}

/// Lane and shoulder layout for the current canvas
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeometryConfig {
    pub axis: ScrollAxis,
    /// Canvas size (screen pixels)
    pub width: f32,
    pub height: f32,
    /// Road size in track space
    pub length: f32,
    pub breadth: f32,
    pub shoulder: f32,
    /// Width of one lane across the road
    pub lane_extent: f32,
    lane_centers: Vec<f32>,
}

impl GeometryConfig {
    /// Compute the layout for a canvas
    pub fn new(
        axis: ScrollAxis,
        width: f32,
        height: f32,
        lanes: u8,
        shoulder: f32,
    ) -> Result<Self, ConfigError> {
        if lanes == 0 || lanes > MAX_LANES {
            return Err(ConfigError::LaneCount {
                got: lanes,
                max: MAX_LANES,
            });
        }
        check_canvas(width, height)?;

        let length = axis.track_length(width, height);
        let breadth = axis.track_breadth(width, height);
        let corridor = breadth - 2.0 * shoulder;
        if corridor <= 0.0 {
            return Err(ConfigError::RoadTooNarrow {
                breadth,
                shoulder,
                body: 0.0,
            });
        }

        let lane_extent = corridor / lanes as f32;
        let lane_centers = (0..lanes)
            .map(|i| shoulder + lane_extent * (i as f32 + 0.5))
            .collect();

        Ok(Self {
            axis,
            width,
            height,
            length,
            breadth,
            shoulder,
            lane_extent,
            lane_centers,
        })
    }

    /// Compute the layout for a canvas and check the player body fits the road
    pub fn from_tuning(tuning: &Tuning, width: f32, height: f32) -> Result<Self, ConfigError> {
        let geometry = Self::new(tuning.axis, width, height, tuning.lanes, tuning.shoulder)?;
        let body = 2.0 * (tuning.player_half.y + tuning.edge_inset);
        if !tuning.is_lane_locked() && geometry.corridor() < body {
            return Err(ConfigError::RoadTooNarrow {
                breadth: geometry.breadth,
                shoulder: geometry.shoulder,
                body,
            });
        }
        Ok(geometry)
    }

    /// Recompute for a new canvas, keeping axis, lane count and shoulder
    pub fn resized(&self, width: f32, height: f32) -> Result<Self, ConfigError> {
        Self::new(self.axis, width, height, self.lane_count() as u8, self.shoulder)
    }

    #[inline]
    pub fn lane_count(&self) -> usize {
        self.lane_centers.len()
    }

    pub fn lane_centers(&self) -> &[f32] {
        &self.lane_centers
    }

    /// Center of a lane, clamped to the valid lane range
    pub fn lane_center(&self, lane: usize) -> f32 {
        self.lane_centers[lane.min(self.lane_count() - 1)]
    }

    /// Middle lane (the lower-index one when the count is even)
    pub fn middle_lane(&self) -> usize {
        (self.lane_count() - 1) / 2
    }

    /// Traversable width between the shoulders
    #[inline]
    pub fn corridor(&self) -> f32 {
        self.breadth - 2.0 * self.shoulder
    }

    /// Across coordinates of the painted lines between lanes
    pub fn lane_dividers(&self) -> impl Iterator<Item = f32> + '_ {
        (1..self.lane_count()).map(|i| self.shoulder + self.lane_extent * i as f32)
    }

    /// Legal rectangle for the center of a body with the given half extents.
    ///
    /// The body stays on the road between the shoulders and fully inside the
    /// canvas along the scroll axis, with `inset` extra clearance on each side.
    pub fn travel_bounds(&self, half: Vec2, inset: f32) -> Bounds {
        let lo = Vec2::new(half.x + inset, self.shoulder + half.y + inset);
        let hi = Vec2::new(
            self.length - half.x - inset,
            self.breadth - self.shoulder - half.y - inset,
        );
        Bounds::from_edges(lo, hi)
    }

    /// Across half-extent of a body riding a lane
    #[inline]
    pub fn lane_body_half(&self, factor: f32) -> f32 {
        self.lane_extent * factor
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 0.05
    }

    #[test]
    fn test_three_lane_layout() {
        let g = GeometryConfig::new(ScrollAxis::Horizontal, 1000.0, 700.0, 3, 100.0).unwrap();
        assert!(approx(g.lane_extent, 166.67));
        let centers = g.lane_centers();
        assert_eq!(centers.len(), 3);
        assert!(approx(centers[0], 183.33));
        assert!(approx(centers[1], 350.0));
        assert!(approx(centers[2], 516.67));
    }

    #[test]
    fn test_vertical_uses_width_as_breadth() {
        let g = GeometryConfig::new(ScrollAxis::Vertical, 700.0, 1000.0, 3, 100.0).unwrap();
        assert_eq!(g.length, 1000.0);
        assert_eq!(g.breadth, 700.0);
        assert!(approx(g.lane_center(1), 350.0));
    }

    #[test]
    fn test_rejects_degenerate_geometry() {
        assert!(matches!(
            GeometryConfig::new(ScrollAxis::Horizontal, 800.0, 600.0, 0, 50.0),
            Err(ConfigError::LaneCount { .. })
        ));
        assert!(matches!(
            GeometryConfig::new(ScrollAxis::Horizontal, 100.0, 100.0, 2, 50.0),
            Err(ConfigError::CanvasTooSmall { .. })
        ));
        assert!(matches!(
            GeometryConfig::new(ScrollAxis::Horizontal, 800.0, 300.0, 2, 150.0),
            Err(ConfigError::RoadTooNarrow { .. })
        ));
    }

    #[test]
    fn test_resize_preserves_lane_count() {
        let g = GeometryConfig::new(ScrollAxis::Horizontal, 1000.0, 700.0, 2, 100.0).unwrap();
        let r = g.resized(1200.0, 900.0).unwrap();
        assert_eq!(r.lane_count(), 2);
        assert!(approx(r.lane_extent, 350.0));
        assert_eq!(r.lane_dividers().collect::<Vec<_>>(), vec![450.0]);
    }

    #[test]
    fn test_travel_bounds_match_clamp_edges() {
        let g = GeometryConfig::new(ScrollAxis::Horizontal, 800.0, 600.0, 3, 50.0).unwrap();
        let b = g.travel_bounds(Vec2::new(25.0, 15.0), 5.0);
        assert_eq!(b.min, Vec2::new(30.0, 70.0));
        assert_eq!(b.max, Vec2::new(770.0, 530.0));
        assert_eq!(b.clamp(Vec2::new(-10.0, 900.0)), Vec2::new(30.0, 530.0));
    }

    #[test]
    fn test_middle_lane() {
        let g = GeometryConfig::new(ScrollAxis::Horizontal, 1000.0, 700.0, 3, 100.0).unwrap();
        assert_eq!(g.middle_lane(), 1);
        let g = GeometryConfig::new(ScrollAxis::Horizontal, 1000.0, 700.0, 2, 100.0).unwrap();
        assert_eq!(g.middle_lane(), 0);
    }
}
