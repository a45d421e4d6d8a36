//! Wheel trajectory modifier
//!
//! Each wheel sits at a fixed offset from the robot's centre in the chassis
//! frame, longitudinal offsets positive to the front and lateral offsets
//! positive to the left. Wheel kinematics are found by differencing the
//! offset positions.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use nalgebra::Vector2;

use super::{GenerationError, KinematicsModifier, SwerveQuad, TankPair, TrajPoint, Trajectory};
use util::maths::get_ang_dist_2pi;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Steps shorter than this are treated as stationary when finding curvature.
const MIN_STEP_LENGTH: f64 = 1e-9;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Rigid body wheel modifier.
#[derive(Debug, Clone, Copy, Default)]
pub struct WheelModifier;

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl WheelModifier {
    pub fn new() -> Self {
        Self
    }
}

impl KinematicsModifier for WheelModifier {
    fn tank(&self, source: &Trajectory, track_width: f64) -> Result<TankPair, GenerationError> {
        check_geometry(source, track_width, 0.0)?;

        let half = track_width / 2.0;

        Ok(TankPair {
            left: offset(source, 0.0, half),
            right: offset(source, 0.0, -half),
        })
    }

    fn swerve(
        &self,
        source: &Trajectory,
        track_width: f64,
        wheel_base_depth: f64,
    ) -> Result<SwerveQuad, GenerationError> {
        check_geometry(source, track_width, wheel_base_depth)?;

        let lat = track_width / 2.0;
        let long = wheel_base_depth / 2.0;

        Ok(SwerveQuad {
            front_left: offset(source, long, lat),
            front_right: offset(source, long, -lat),
            back_left: offset(source, -long, lat),
            back_right: offset(source, -long, -lat),
        })
    }
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

fn check_geometry(
    source: &Trajectory,
    track_width: f64,
    wheel_base_depth: f64,
) -> Result<(), GenerationError> {
    if !track_width.is_finite() || track_width <= 0.0 {
        return Err(GenerationError::InvalidGeometry(format!(
            "track width must be finite and > 0, found {}",
            track_width
        )));
    }
    if !wheel_base_depth.is_finite() || wheel_base_depth < 0.0 {
        return Err(GenerationError::InvalidGeometry(format!(
            "wheel base depth must be finite and >= 0, found {}",
            wheel_base_depth
        )));
    }
    if source.is_empty() {
        return Err(GenerationError::EmptySource);
    }

    Ok(())
}

/// Trajectory of a point fixed at (`long`, `lat`) in the chassis frame.
fn offset(source: &Trajectory, long: f64, lat: f64) -> Trajectory {
    let dt = source.dt_s();
    let src = source.points();

    let mut points: Vec<TrajPoint> = Vec::with_capacity(src.len());

    // Direction of travel over the previous step, starting along the heading
    let mut travel_dir = src[0].heading_rad;

    for s in src.iter() {
        let forward = Vector2::new(s.heading_rad.cos(), s.heading_rad.sin());
        let left = Vector2::new(-s.heading_rad.sin(), s.heading_rad.cos());
        let pos = Vector2::new(s.x, s.y) + forward * long + left * lat;

        let point = match points.last() {
            None => TrajPoint {
                x: pos.x,
                y: pos.y,
                position: 0.0,
                curvature: 0.0,
                ..*s
            },
            Some(prev) => {
                let step = pos - Vector2::new(prev.x, prev.y);
                let dist = step.norm();

                let curvature = if dist > MIN_STEP_LENGTH {
                    let dir = step.y.atan2(step.x);
                    let k = get_ang_dist_2pi(travel_dir, dir) / dist;
                    travel_dir = dir;
                    k
                } else {
                    0.0
                };

                let velocity = dist / dt;
                let acceleration = (velocity - prev.velocity) / dt;

                TrajPoint {
                    time_s: s.time_s,
                    x: pos.x,
                    y: pos.y,
                    position: prev.position + dist,
                    velocity,
                    acceleration,
                    jerk: (acceleration - prev.acceleration) / dt,
                    heading_rad: s.heading_rad,
                    curvature,
                }
            }
        };

        points.push(point);
    }

    Trajectory::new(dt, points)
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::traj::{GenRequest, HermiteEngine, SampleDensity, TrajectoryEngine};
    use crate::project::{ProjectConfig, Waypoint};

    /// Straight run along the x axis at constant speed.
    fn straight(n: usize) -> Trajectory {
        let points = (0..n)
            .map(|i| TrajPoint {
                time_s: i as f64 * 0.1,
                x: i as f64 * 0.2,
                position: i as f64 * 0.2,
                velocity: 2.0,
                ..TrajPoint::default()
            })
            .collect();

        Trajectory::new(0.1, points)
    }

    #[test]
    fn test_tank_straight() {
        let pair = WheelModifier::new().tank(&straight(10), 1.0).unwrap();

        assert_eq!(pair.left.len(), 10);
        assert_eq!(pair.right.len(), 10);

        for (l, r) in pair.left.points().iter().zip(pair.right.points()) {
            assert!((l.y - 0.5).abs() < 1e-12);
            assert!((r.y + 0.5).abs() < 1e-12);
            assert!((l.velocity - 2.0).abs() < 1e-9);
            assert_eq!(l.curvature, 0.0);
        }

        assert!((pair.left.length() - 1.8).abs() < 1e-9);
    }

    #[test]
    fn test_swerve_corners() {
        let quad = WheelModifier::new().swerve(&straight(3), 2.0, 1.0).unwrap();

        let first = |t: &Trajectory| (t.points()[0].x, t.points()[0].y);
        assert_eq!(first(&quad.front_left), (0.5, 1.0));
        assert_eq!(first(&quad.front_right), (0.5, -1.0));
        assert_eq!(first(&quad.back_left), (-0.5, 1.0));
        assert_eq!(first(&quad.back_right), (-0.5, -1.0));
    }

    #[test]
    fn test_turning_wheel_speeds() {
        let waypoints = [
            Waypoint::from_degrees(0.0, 0.0, 0.0).unwrap(),
            Waypoint::from_degrees(4.0, 4.0, 90.0).unwrap(),
        ];
        let mut req = GenRequest::from_config(&ProjectConfig::default());
        req.sample_density = SampleDensity::Fast;
        let source = HermiteEngine::new().generate(&waypoints, &req).unwrap();

        let pair = WheelModifier::new().tank(&source, 1.0).unwrap();

        // Left turn, so the outer right wheel travels further
        assert!(pair.right.length() > source.length());
        assert!(pair.left.length() < source.length());
        assert_eq!(pair.left.len(), source.len());

        let mid = source.len() / 2;
        assert!(pair.left.points()[mid].curvature > 0.0);
    }

    #[test]
    fn test_invalid_geometry() {
        let m = WheelModifier::new();

        assert!(matches!(
            m.tank(&straight(3), 0.0),
            Err(GenerationError::InvalidGeometry(_))
        ));
        assert!(matches!(
            m.swerve(&straight(3), 1.0, -1.0),
            Err(GenerationError::InvalidGeometry(_))
        ));
        assert_eq!(
            m.tank(&Trajectory::new(0.1, Vec::new()), 1.0),
            Err(GenerationError::EmptySource)
        );
    }
}
