//! Steering input
//!
//! Merges held directional keys with device tilt into one command per tick.
//! Tilt samples and the permission result arrive from host callbacks as
//! `SensorEvent`s on a channel and are drained at the start of each tick,
//! so nothing inside the frame loop ever waits on the host.

use std::collections::HashSet;

use crossbeam_channel::{Receiver, Sender, TryRecvError};
use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::settings::Tuning;

/// Screen-space directions a key or on-screen button can hold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// Unit vector in screen space (y grows downward)
    pub fn unit(&self) -> Vec2 {
        match self {
            Direction::Up => Vec2::new(0.0, -1.0),
            Direction::Down => Vec2::new(0.0, 1.0),
            Direction::Left => Vec2::new(-1.0, 0.0),
            Direction::Right => Vec2::new(1.0, 0.0),
        }
    }

    /// Map a DOM `KeyboardEvent.key` value
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "ArrowUp" | "w" | "W" => Some(Direction::Up),
            "ArrowDown" | "s" | "S" => Some(Direction::Down),
            "ArrowLeft" | "a" | "A" => Some(Direction::Left),
            "ArrowRight" | "d" | "D" => Some(Direction::Right),
            _ => None,
        }
    }
}

/// Result of asking the host for orientation access
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PermissionOutcome {
    Granted,
    Denied,
    /// The device has no orientation sensor
    Unsupported,
}

/// Tilt capability as seen by the adapter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TiltPermission {
    /// Not resolved yet (a user gesture may still grant it)
    Pending,
    Granted,
    Denied,
    Unsupported,
}

/// Messages from host sensor callbacks
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SensorEvent {
    /// Device orientation sample (degrees): gamma tilts left/right, beta front/back
    Orientation { gamma: f32, beta: f32 },
    PermissionResolved(PermissionOutcome),
}

/// Steering command for one tick
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TickInput {
    /// Impulse in track space (x = along, y = across)
    pub force: Vec2,
    /// Lane step for lane-locked steering (-1, 0, 1)
    pub lane_change: i8,
}

/// Combines keys and tilt into `TickInput`s
pub struct InputAdapter {
    held: HashSet<Direction>,
    prev_held: HashSet<Direction>,
    /// Last clamped tilt sample (gamma, beta)
    tilt: Vec2,
    permission: TiltPermission,
    /// Tilt must return near level before it can trigger another lane change
    tilt_lane_armed: bool,
    tx: Sender<SensorEvent>,
    rx: Receiver<SensorEvent>,
}

impl Default for InputAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl InputAdapter {
    pub fn new() -> Self {
        let (tx, rx) = crossbeam_channel::unbounded();
        Self {
            held: HashSet::new(),
            prev_held: HashSet::new(),
            tilt: Vec2::ZERO,
            permission: TiltPermission::Pending,
            tilt_lane_armed: true,
            tx,
            rx,
        }
    }

    /// Handle for host callbacks to post sensor events
    pub fn sensor_sender(&self) -> Sender<SensorEvent> {
        self.tx.clone()
    }

    pub fn permission(&self) -> TiltPermission {
        self.permission
    }

    /// Record a key/button press or release
    pub fn set_held(&mut self, direction: Direction, held: bool) {
        if held {
            self.held.insert(direction);
        } else {
            self.held.remove(&direction);
        }
    }

    /// Release every key (focus loss, screen change)
    pub fn release_all(&mut self) {
        self.held.clear();
    }

    /// Apply every sensor event posted since the last tick
    pub fn drain_events(&mut self, tilt_limit: f32) {
        loop {
            match self.rx.try_recv() {
                Ok(SensorEvent::Orientation { gamma, beta }) => {
                    let level = |deg: f32| {
                        if deg.is_finite() {
                            deg.clamp(-tilt_limit, tilt_limit)
                        } else {
                            0.0
                        }
                    };
                    self.tilt = Vec2::new(level(gamma), level(beta));
                }
                Ok(SensorEvent::PermissionResolved(outcome)) => self.resolve(outcome),
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
    }

    fn resolve(&mut self, outcome: PermissionOutcome) {
        if self.permission != TiltPermission::Pending {
            log::debug!("Ignoring late tilt permission result {:?}", outcome);
            return;
        }
        self.permission = match outcome {
            PermissionOutcome::Granted => {
                log::info!("Tilt steering enabled");
                TiltPermission::Granted
            }
            PermissionOutcome::Denied => {
                log::warn!("Tilt permission denied - keyboard steering only");
                TiltPermission::Denied
            }
            PermissionOutcome::Unsupported => {
                log::warn!("Device orientation not supported - keyboard steering only");
                TiltPermission::Unsupported
            }
        };
    }

    /// Build this tick's steering command
    pub fn sample(&mut self, tuning: &Tuning) -> TickInput {
        self.drain_events(tuning.tilt_limit);

        // Already clamped when the sample arrived
        let tilt = if self.permission == TiltPermission::Granted {
            self.tilt
        } else {
            Vec2::ZERO
        };

        let input = if tuning.is_lane_locked() {
            TickInput {
                force: Vec2::ZERO,
                lane_change: self.lane_command(tuning, tilt),
            }
        } else {
            let keys: Vec2 = Direction::ALL
                .iter()
                .filter(|d| self.held.contains(d))
                .map(|d| d.unit() * tuning.key_force)
                .sum();
            let screen_force = keys + tilt * tuning.tilt_gain;
            TickInput {
                force: tuning.axis.screen_to_track(screen_force),
                lane_change: 0,
            }
        };

        self.prev_held.clone_from(&self.held);
        input
    }

    /// Lane step from fresh key presses, or from tilting past the threshold.
    ///
    /// Presses are edges of the held set between two samples. A key pressed
    /// and released between the same pair of frames is never seen as held
    /// and moves no lane.
    fn lane_command(&mut self, tuning: &Tuning, tilt: Vec2) -> i8 {
        let mut step: f32 = Direction::ALL
            .iter()
            .filter(|d| self.held.contains(d) && !self.prev_held.contains(d))
            .map(|d| tuning.axis.screen_to_track(d.unit()).y)
            .sum();

        let lateral = tuning.axis.screen_to_track(tilt).y;
        if self.tilt_lane_armed && lateral.abs() > tuning.tilt_lane_threshold {
            step += lateral.signum();
            self.tilt_lane_armed = false;
        } else if lateral.abs() < tuning.tilt_lane_threshold * 0.5 {
            self.tilt_lane_armed = true;
        }

        if step > 0.0 {
            1
        } else if step < 0.0 {
            -1
        } else {
            0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::{ScrollAxis, Steering};

    fn approx(a: Vec2, b: Vec2) -> bool {
        (a - b).length() < 1e-4
    }

    #[test]
    fn test_keys_add_fixed_impulse_every_tick() {
        let tuning = Tuning::default();
        let mut input = InputAdapter::new();
        input.set_held(Direction::Right, true);
        input.set_held(Direction::Up, true);

        for _ in 0..3 {
            let cmd = input.sample(&tuning);
            assert!(approx(cmd.force, Vec2::new(0.6, -0.6)));
        }

        input.set_held(Direction::Up, false);
        assert!(approx(input.sample(&tuning).force, Vec2::new(0.6, 0.0)));
    }

    #[test]
    fn test_tilt_ignored_until_granted() {
        let tuning = Tuning::default();
        let mut input = InputAdapter::new();
        let tx = input.sensor_sender();
        tx.send(SensorEvent::Orientation {
            gamma: 10.0,
            beta: -5.0,
        })
        .unwrap();
        assert_eq!(input.sample(&tuning).force, Vec2::ZERO);

        tx.send(SensorEvent::PermissionResolved(PermissionOutcome::Granted))
            .unwrap();
        // Last tilt sample is held without new orientation events
        assert!(approx(input.sample(&tuning).force, Vec2::new(1.2, -0.6)));
        assert!(approx(input.sample(&tuning).force, Vec2::new(1.2, -0.6)));
    }

    #[test]
    fn test_tilt_is_clamped() {
        let tuning = Tuning::default();
        let mut input = InputAdapter::new();
        let tx = input.sensor_sender();
        tx.send(SensorEvent::PermissionResolved(PermissionOutcome::Granted))
            .unwrap();
        tx.send(SensorEvent::Orientation {
            gamma: 90.0,
            beta: f32::NAN,
        })
        .unwrap();
        assert!(approx(input.sample(&tuning).force, Vec2::new(3.0, 0.0)));
        // The held sample stays at the limit
        assert!(approx(input.sample(&tuning).force, Vec2::new(3.0, 0.0)));
    }

    #[test]
    fn test_tilt_before_grant_is_stored_clamped() {
        let tuning = Tuning::default();
        let mut input = InputAdapter::new();
        let tx = input.sensor_sender();
        tx.send(SensorEvent::Orientation {
            gamma: -90.0,
            beta: 40.0,
        })
        .unwrap();
        assert_eq!(input.sample(&tuning).force, Vec2::ZERO);

        tx.send(SensorEvent::PermissionResolved(PermissionOutcome::Granted))
            .unwrap();
        assert!(approx(input.sample(&tuning).force, Vec2::new(-3.0, 3.0)));
    }

    #[test]
    fn test_denied_permission_is_final() {
        let tuning = Tuning::default();
        let mut input = InputAdapter::new();
        let tx = input.sensor_sender();
        tx.send(SensorEvent::PermissionResolved(PermissionOutcome::Denied))
            .unwrap();
        tx.send(SensorEvent::PermissionResolved(PermissionOutcome::Granted))
            .unwrap();
        tx.send(SensorEvent::Orientation {
            gamma: 20.0,
            beta: 0.0,
        })
        .unwrap();
        input.set_held(Direction::Left, true);
        assert!(approx(input.sample(&tuning).force, Vec2::new(-0.6, 0.0)));
        assert_eq!(input.permission(), TiltPermission::Denied);
    }

    #[test]
    fn test_vertical_axis_maps_keys_into_track_space() {
        let tuning = Tuning {
            axis: ScrollAxis::Vertical,
            ..Default::default()
        };
        let mut input = InputAdapter::new();
        input.set_held(Direction::Right, true);
        assert!(approx(input.sample(&tuning).force, Vec2::new(0.0, 0.6)));
    }

    #[test]
    fn test_lane_changes_fire_on_press_only() {
        let tuning = Tuning {
            steering: Steering::LaneLocked,
            ..Default::default()
        };
        let mut input = InputAdapter::new();
        input.set_held(Direction::Down, true);
        assert_eq!(input.sample(&tuning).lane_change, 1);
        assert_eq!(input.sample(&tuning).lane_change, 0);

        input.set_held(Direction::Down, false);
        input.set_held(Direction::Up, true);
        assert_eq!(input.sample(&tuning).lane_change, -1);
        // Along-axis keys do nothing in a horizontal lane-locked road
        input.set_held(Direction::Left, true);
        assert_eq!(input.sample(&tuning).lane_change, 0);
    }

    #[test]
    fn test_tap_between_frames_moves_no_lane() {
        let tuning = Tuning {
            steering: Steering::LaneLocked,
            ..Default::default()
        };
        let mut input = InputAdapter::new();
        assert_eq!(input.sample(&tuning).lane_change, 0);
        input.set_held(Direction::Down, true);
        input.set_held(Direction::Down, false);
        assert_eq!(input.sample(&tuning).lane_change, 0);
        assert_eq!(input.sample(&tuning).lane_change, 0);
    }

    #[test]
    fn test_tilt_lane_change_rearms_near_level() {
        let tuning = Tuning::vertical_lanes(3);
        let mut input = InputAdapter::new();
        let tx = input.sensor_sender();
        tx.send(SensorEvent::PermissionResolved(PermissionOutcome::Granted))
            .unwrap();
        tx.send(SensorEvent::Orientation {
            gamma: 20.0,
            beta: 0.0,
        })
        .unwrap();
        assert_eq!(input.sample(&tuning).lane_change, 1);
        assert_eq!(input.sample(&tuning).lane_change, 0);

        tx.send(SensorEvent::Orientation {
            gamma: 0.0,
            beta: 0.0,
        })
        .unwrap();
        assert_eq!(input.sample(&tuning).lane_change, 0);
        tx.send(SensorEvent::Orientation {
            gamma: -20.0,
            beta: 0.0,
        })
        .unwrap();
        assert_eq!(input.sample(&tuning).lane_change, -1);
    }
}
