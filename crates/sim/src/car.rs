//! Vehicle kinematic model: a fixed-wheelbase car advanced one time-slice
//! per step, with radar sensing and collision bookkeeping.

use glam::DVec2;
use swarmdrive_shared::{
    CarPose, Map, SensorReadings, CAR_RADIUS, RADAR_FRONT_OFFSET, RADAR_LEFT_OFFSET,
    RADAR_RIGHT_OFFSET, WHEELBASE, WHEEL_ANGLE_LIMIT,
};

use crate::geometry;

/// The simulated vehicle. `step` is the only mutator of the pose; once the
/// car has collided it stays terminated and further steps are no-ops.
#[derive(Debug, Clone)]
pub struct Car {
    pose: CarPose,
    collided: bool,
}

impl Car {
    /// Place the car at the map's start pose with the wheels centered.
    pub fn from_map(map: &Map) -> Self {
        let pose = CarPose {
            position: map.start_pos,
            heading: normalize_deg(map.start_angle),
            wheel_angle: 0.0,
        };
        Self {
            collided: geometry::is_collided(pose.position, CAR_RADIUS, &map.walls),
            pose,
        }
    }

    pub fn pose(&self) -> &CarPose {
        &self.pose
    }

    pub fn is_collided(&self) -> bool {
        self.collided
    }

    /// Radar distances at the current pose, in the canonical
    /// (front, right, left) order.
    pub fn sense(&self, map: &Map) -> SensorReadings {
        let probe = |offset| {
            geometry::radar_distance(self.pose.position, self.pose.heading, offset, &map.walls)
        };
        SensorReadings {
            front: probe(RADAR_FRONT_OFFSET),
            right: probe(RADAR_RIGHT_OFFSET),
            left: probe(RADAR_LEFT_OFFSET),
        }
    }

    /// Advance one time-slice with the commanded wheel angle (degrees).
    /// The command is clamped to the mechanical range. Collision flips the
    /// car into its terminated state; there is no error, callers check
    /// `is_collided` each tick.
    pub fn step(&mut self, map: &Map, wheel_deg: f64) {
        if self.collided {
            return;
        }

        let wheel = wheel_deg.clamp(-WHEEL_ANGLE_LIMIT, WHEEL_ANGLE_LIMIT);
        let phi = self.pose.heading.to_radians();
        let theta = wheel.to_radians();

        let dx = (phi + theta).cos() + theta.sin() * phi.sin();
        let dy = (phi + theta).sin() - theta.sin() * phi.cos();
        let dphi = (2.0 * theta.sin() / WHEELBASE).asin();

        self.pose.position += DVec2::new(dx, dy);
        self.pose.heading = normalize_deg((phi - dphi).to_degrees());
        self.pose.wheel_angle = wheel;

        self.collided = geometry::is_collided(self.pose.position, CAR_RADIUS, &map.walls);
    }
}

/// Normalize an angle in degrees to (-180, 180].
fn normalize_deg(mut deg: f64) -> f64 {
    while deg > 180.0 {
        deg -= 360.0;
    }
    while deg <= -180.0 {
        deg += 360.0;
    }
    deg
}
