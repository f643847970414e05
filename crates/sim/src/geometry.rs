//! Ray casting and collision tests against a set of wall segments.
//! Everything here is pure and safe to call from concurrent runs.

use glam::DVec2;
use swarmdrive_shared::{Wall, NO_HIT_DISTANCE};

const PARALLEL_EPS: f64 = 1e-12;

/// Nearest intersection of a ray with the walls.
#[derive(Debug, Clone, Copy)]
pub struct RayHit {
    pub point: DVec2,
    pub distance: f64,
}

/// Cast a ray from `origin` at `direction_deg` (degrees, world frame) and
/// return the nearest wall intersection. Ties at equal distance resolve to
/// the first segment in iteration order. With no wall within
/// `NO_HIT_DISTANCE`, the sentinel distance is reported and the point is
/// projected that far along the ray.
pub fn cast_ray(origin: DVec2, direction_deg: f64, walls: &[Wall]) -> RayHit {
    let dir = DVec2::from_angle(direction_deg.to_radians());

    let mut nearest = NO_HIT_DISTANCE;
    for wall in walls {
        if let Some(t) = ray_segment_intersection(origin, dir, wall.a, wall.b) {
            if t < nearest {
                nearest = t;
            }
        }
    }

    RayHit {
        point: origin + dir * nearest,
        distance: nearest,
    }
}

/// Distance to the nearest wall along one sensor direction.
/// `relative_deg` is the sensor's offset from the vehicle heading.
pub fn radar_distance(position: DVec2, heading_deg: f64, relative_deg: f64, walls: &[Wall]) -> f64 {
    cast_ray(position, heading_deg + relative_deg, walls).distance
}

/// Whether a circle of `radius` around `position` touches any wall.
pub fn is_collided(position: DVec2, radius: f64, walls: &[Wall]) -> bool {
    walls
        .iter()
        .any(|wall| point_segment_distance(position, wall.a, wall.b) <= radius)
}

/// Parameter `t` along the unit ray `origin + t * dir` where it crosses
/// segment `a..b`, if it does. Parallel (including collinear) segments
/// report no crossing.
fn ray_segment_intersection(origin: DVec2, dir: DVec2, a: DVec2, b: DVec2) -> Option<f64> {
    let seg = b - a;
    let denom = dir.perp_dot(seg);
    if denom.abs() < PARALLEL_EPS {
        return None;
    }

    let offset = a - origin;
    let t = offset.perp_dot(seg) / denom;
    let u = offset.perp_dot(dir) / denom;
    if t >= 0.0 && (0.0..=1.0).contains(&u) {
        Some(t)
    } else {
        None
    }
}

/// Shortest distance from a point to segment `a..b`.
pub fn point_segment_distance(p: DVec2, a: DVec2, b: DVec2) -> f64 {
    let seg = b - a;
    let len_sq = seg.length_squared();
    if len_sq < PARALLEL_EPS {
        return p.distance(a);
    }
    let t = ((p - a).dot(seg) / len_sq).clamp(0.0, 1.0);
    p.distance(a + seg * t)
}
