//! Traffic and roadside scenery
//!
//! Both entity kinds share one lifecycle: spawned beyond the entry edge on a
//! fixed tick cadence, advanced toward the exit edge every tick, and dropped
//! from their pool the tick they pass the exit boundary. Only `Obstacle`
//! takes part in collisions; scenery is decoration.

use glam::Vec2;
use rand::Rng;
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};

use super::geometry::GeometryConfig;
use crate::Rgb;
use crate::settings::Tuning;

/// Body paint for oncoming cars
pub const CAR_PALETTE: [Rgb; 6] = [
    Rgb(220, 40, 40),
    Rgb(240, 90, 20),
    Rgb(180, 30, 90),
    Rgb(250, 200, 30),
    Rgb(40, 110, 220),
    Rgb(235, 235, 235),
];

/// Badges drawn on oncoming cars
pub const CAR_LABELS: [&str; 5] = ["GT", "RS", "TURBO", "V8", "EVO"];

/// Anything that scrolls toward the exit edge
pub trait Scrolling {
    /// Position along the road (decreases toward the exit)
    fn along(&self) -> f32;
    /// Move one tick at the given road speed
    fn advance(&mut self, road_speed: f32);
}

/// An oncoming car
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Obstacle {
    pub id: u32,
    pub pos: Vec2,
    pub half: Vec2,
    /// Lane ridden in lane-locked variants
    pub lane: Option<usize>,
    pub label: String,
    pub color: Rgb,
}

impl Scrolling for Obstacle {
    #[inline]
    fn along(&self) -> f32 {
        self.pos.x
    }

    #[inline]
    fn advance(&mut self, road_speed: f32) {
        self.pos.x -= road_speed;
    }
}

impl Obstacle {
    /// Body size for the current layout
    pub fn body_half(tuning: &Tuning, geometry: &GeometryConfig) -> Vec2 {
        if tuning.is_lane_locked() {
            Vec2::new(
                tuning.obstacle_half.x,
                geometry.lane_body_half(tuning.lane_body_factor),
            )
        } else {
            tuning.obstacle_half
        }
    }

    /// Re-seat after the road layout changed
    pub fn refit(&mut self, tuning: &Tuning, geometry: &GeometryConfig) {
        self.half = Self::body_half(tuning, geometry);
        if let Some(lane) = self.lane {
            self.pos.y = geometry.lane_center(lane);
        }
    }
}

/// Roadside decoration variants
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SceneryKind {
    /// Tall flower on the near verge
    Lily { stem_height: f32 },
    Hydrangea,
    House,
    /// Flies over the far side of the road
    Bird,
}

impl SceneryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SceneryKind::Lily { .. } => "lily",
            SceneryKind::Hydrangea => "hydrangea",
            SceneryKind::House => "house",
            SceneryKind::Bird => "bird",
        }
    }
}

/// A piece of roadside decoration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenery {
    pub id: u32,
    pub pos: Vec2,
    pub kind: SceneryKind,
    /// Speed relative to traffic (0-1)
    pub parallax: f32,
    pub scale: f32,
}

impl Scrolling for Scenery {
    #[inline]
    fn along(&self) -> f32 {
        self.pos.x
    }

    #[inline]
    fn advance(&mut self, road_speed: f32) {
        self.pos.x -= road_speed * self.parallax;
    }
}

/// Uniform sample from `[lo, hi)`; collapses to `lo` on an empty range
fn sample<R: Rng + ?Sized>(rng: &mut R, lo: f32, hi: f32) -> f32 {
    if hi > lo {
        rng.random_range(lo..hi)
    } else {
        lo
    }
}

/// Build a car just beyond the entry edge
pub fn spawn_obstacle<R: Rng + ?Sized>(
    rng: &mut R,
    id: u32,
    tuning: &Tuning,
    geometry: &GeometryConfig,
) -> Obstacle {
    let half = Obstacle::body_half(tuning, geometry);
    let (across, lane) = if tuning.is_lane_locked() {
        let lane = rng.random_range(0..geometry.lane_count());
        (geometry.lane_center(lane), Some(lane))
    } else {
        let bounds = geometry.travel_bounds(half, tuning.edge_inset);
        (sample(rng, bounds.min.y, bounds.max.y), None)
    };

    Obstacle {
        id,
        pos: Vec2::new(geometry.length + half.x, across),
        half,
        lane,
        label: CAR_LABELS.choose(rng).copied().unwrap_or(CAR_LABELS[0]).to_string(),
        color: CAR_PALETTE.choose(rng).copied().unwrap_or(CAR_PALETTE[0]),
    }
}

/// Build a decoration just beyond the entry edge
pub fn spawn_scenery<R: Rng + ?Sized>(
    rng: &mut R,
    id: u32,
    tuning: &Tuning,
    geometry: &GeometryConfig,
) -> Scenery {
    let near = geometry.breadth;
    let (kind, across) = match rng.random_range(0..4) {
        0 => (
            SceneryKind::Lily {
                stem_height: sample(rng, 100.0, 200.0),
            },
            sample(rng, near - 100.0, near - 50.0),
        ),
        1 => (SceneryKind::Hydrangea, sample(rng, near - 150.0, near - 50.0)),
        2 => (SceneryKind::House, sample(rng, near - 150.0, near - 50.0)),
        _ => (SceneryKind::Bird, sample(rng, 50.0, 200.0f32.min(near))),
    };

    Scenery {
        id,
        pos: Vec2::new(geometry.length + tuning.scenery_spawn_lead, across),
        kind,
        parallax: tuning.parallax,
        scale: sample(rng, 0.8, 1.2),
    }
}

/// Cadence-gated collection of scrolling entities
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityPool<T> {
    items: Vec<T>,
    /// Spawn once every `period` ticks
    period: u32,
    /// How far past the exit edge an entity travels before removal
    exit_margin: f32,
}

impl<T: Scrolling> EntityPool<T> {
    pub fn new(period: u32, exit_margin: f32) -> Self {
        Self {
            items: Vec::new(),
            period,
            exit_margin,
        }
    }

    /// True on the ticks this pool spawns
    #[inline]
    fn due(&self, tick: u64) -> bool {
        tick.is_multiple_of(self.period as u64)
    }

    /// Append the entity built by `make` if this is a spawn tick
    pub fn spawn_if_due(&mut self, tick: u64, make: impl FnOnce() -> T) -> bool {
        if self.due(tick) {
            self.items.push(make());
            true
        } else {
            false
        }
    }

    #[cfg(test)]
    pub(crate) fn push(&mut self, item: T) {
        self.items.push(item);
    }

    /// Advance every entity and drop the ones past the exit boundary.
    ///
    /// Walks the pool from the back so removing the current entry never
    /// shifts an entry that has not been visited yet. Returns how many
    /// entities were removed.
    pub fn advance(&mut self, road_speed: f32) -> usize {
        let mut removed = 0;
        for i in (0..self.items.len()).rev() {
            self.items[i].advance(road_speed);
            if self.items[i].along() < -self.exit_margin {
                self.items.remove(i);
                removed += 1;
            }
        }
        removed
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn items_mut(&mut self) -> &mut [T] {
        &mut self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::{ScrollAxis, Steering};
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn road() -> GeometryConfig {
        GeometryConfig::new(ScrollAxis::Horizontal, 800.0, 600.0, 3, 50.0).unwrap()
    }

    fn car_at(id: u32, along: f32) -> Obstacle {
        Obstacle {
            id,
            pos: Vec2::new(along, 300.0),
            half: Vec2::new(20.0, 10.0),
            lane: None,
            label: "GT".to_string(),
            color: CAR_PALETTE[0],
        }
    }

    #[test]
    fn test_spawn_cadence() {
        let mut pool: EntityPool<Obstacle> = EntityPool::new(50, 100.0);
        let mut spawned = 0;
        for tick in 1..=200u64 {
            if pool.spawn_if_due(tick, || car_at(tick as u32, 900.0)) {
                spawned += 1;
            }
        }
        assert_eq!(spawned, 4);
        assert_eq!(pool.len(), 4);
    }

    #[test]
    fn test_removed_once_when_crossing_exit() {
        let mut pool = EntityPool::new(50, 100.0);
        pool.push(car_at(1, -95.0));
        pool.push(car_at(2, 400.0));
        pool.push(car_at(3, -99.0));

        // -95 -> -100 is not yet past the boundary; -99 -> -104 is
        assert_eq!(pool.advance(5.0), 1);
        let ids: Vec<u32> = pool.items().iter().map(|o| o.id).collect();
        assert_eq!(ids, vec![1, 2]);

        assert_eq!(pool.advance(5.0), 1);
        let ids: Vec<u32> = pool.items().iter().map(|o| o.id).collect();
        assert_eq!(ids, vec![2]);
        assert_eq!(pool.items()[0].pos.x, 390.0);
    }

    #[test]
    fn test_adjacent_exits_are_all_removed() {
        let mut pool = EntityPool::new(50, 100.0);
        for id in 0..5 {
            pool.push(car_at(id, -98.0));
        }
        assert_eq!(pool.advance(5.0), 5);
        assert!(pool.is_empty());
    }

    #[test]
    fn test_scenery_uses_parallax() {
        let mut rng = Pcg32::seed_from_u64(3);
        let g = road();
        let mut s = spawn_scenery(&mut rng, 1, &Tuning::default(), &g);
        let start = s.along();
        assert_eq!(start, 850.0);
        s.advance(10.0);
        assert!((s.along() - (start - 8.0)).abs() < 1e-4);
    }

    #[test]
    fn test_free_obstacle_spawns_on_road() {
        let mut rng = Pcg32::seed_from_u64(11);
        let tuning = Tuning::default();
        let g = road();
        let bounds = g.travel_bounds(tuning.obstacle_half, tuning.edge_inset);
        for id in 0..100 {
            let o = spawn_obstacle(&mut rng, id, &tuning, &g);
            assert_eq!(o.pos.x, 820.0);
            assert!(o.pos.y >= bounds.min.y && o.pos.y <= bounds.max.y);
            assert_eq!(o.lane, None);
            assert!(CAR_LABELS.contains(&o.label.as_str()));
            assert!(CAR_PALETTE.contains(&o.color));
        }
    }

    #[test]
    fn test_lane_obstacle_sits_on_lane_center() {
        let mut rng = Pcg32::seed_from_u64(5);
        let tuning = Tuning {
            steering: Steering::LaneLocked,
            ..Default::default()
        };
        let g = road();
        for id in 0..30 {
            let o = spawn_obstacle(&mut rng, id, &tuning, &g);
            let lane = o.lane.unwrap();
            assert!(lane < 3);
            assert_eq!(o.pos.y, g.lane_center(lane));
            assert!((o.half.y - g.lane_extent * 0.38).abs() < 1e-4);
        }
    }

    #[test]
    fn test_scenery_placement_by_kind() {
        let mut rng = Pcg32::seed_from_u64(9);
        let g = road();
        for id in 0..200 {
            let s = spawn_scenery(&mut rng, id, &Tuning::default(), &g);
            match s.kind {
                SceneryKind::Bird => assert!(s.pos.y >= 50.0 && s.pos.y <= 200.0),
                SceneryKind::Lily { stem_height } => {
                    assert!((100.0..=200.0).contains(&stem_height));
                    assert!(s.pos.y >= 500.0);
                }
                SceneryKind::House | SceneryKind::Hydrangea => assert!(s.pos.y >= 450.0),
            }
            assert!((0.8..=1.2).contains(&s.scale));
        }
    }
}
