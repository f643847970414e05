use glam::DVec2;
use serde::{Deserialize, Serialize};

/// One wall segment between two points.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Wall {
    pub a: DVec2,
    pub b: DVec2,
}

/// Chain an ordered sequence of points into wall segments.
pub fn walls_from_polyline(points: &[DVec2]) -> Vec<Wall> {
    points
        .windows(2)
        .map(|pair| Wall {
            a: pair[0],
            b: pair[1],
        })
        .collect()
}

/// A track: start pose, goal rectangle, and the walls bounding the
/// drivable region. Immutable once constructed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Map {
    pub start_pos: DVec2,
    /// Initial heading in degrees.
    pub start_angle: f64,
    /// Goal rectangle, left-top corner (larger y).
    pub end_lt: DVec2,
    /// Goal rectangle, right-bottom corner (smaller y).
    pub end_rb: DVec2,
    pub walls: Vec<Wall>,
}

impl Map {
    /// Whether a position lies inside the goal rectangle (inclusive).
    pub fn goal_contains(&self, p: DVec2) -> bool {
        self.end_lt.x <= p.x && p.x <= self.end_rb.x && self.end_rb.y <= p.y && p.y <= self.end_lt.y
    }
}

/// One labeled example: radar distances in, steering angle (degrees) out.
/// Inputs are ordered (front, right, left).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TrainingExample {
    pub inputs: [f64; 3],
    pub target: f64,
}

/// Radar distances for the three sensor directions.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SensorReadings {
    pub front: f64,
    pub right: f64,
    pub left: f64,
}

impl SensorReadings {
    /// The canonical (front, right, left) order used by training data and
    /// the network input layout.
    pub fn as_array(&self) -> [f64; 3] {
        [self.front, self.right, self.left]
    }

    pub fn all_finite(&self) -> bool {
        self.front.is_finite() && self.right.is_finite() && self.left.is_finite()
    }
}

/// Vehicle pose: position, heading and wheel angle in degrees.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CarPose {
    pub position: DVec2,
    pub heading: f64,
    pub wheel_angle: f64,
}

/// One recorded step of a simulation run.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TrajectorySample {
    pub position: DVec2,
    pub readings: SensorReadings,
    /// Steering command fed to the vehicle on this tick, degrees.
    pub wheel_angle: f64,
}

/// Terminal state of a simulation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunOutcome {
    Arrived,
    Collided,
    Aborted,
    SensorError,
}

/// Result of one simulation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunRecord {
    pub outcome: RunOutcome,
    pub trajectory: Vec<TrajectorySample>,
    pub ticks: u32,
}

/// Fitness summary for one training iteration.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct IterationStats {
    pub iteration: usize,
    /// Best fitness found so far across all iterations. Non-increasing.
    pub best_fitness: f64,
    /// Mean fitness across the swarm this iteration.
    pub avg_fitness: f64,
    /// Minimum fitness across the swarm this iteration.
    pub min_fitness: f64,
}

/// How a training session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrainStatus {
    Completed,
    Stopped,
}
