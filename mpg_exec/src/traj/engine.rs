//! Built in trajectory engine
//!
//! Joins each pair of waypoints with a Hermite spline, profiles the centre's
//! motion along the total path length, then samples the splines at the
//! profiled distances.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::debug;

use super::{
    GenRequest, GenerationError, HermiteSpline, SCurveProfile, TrajPoint, Trajectory,
    TrajectoryEngine,
};
use crate::project::Waypoint;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Hermite spline path with a jerk limited velocity profile.
#[derive(Debug, Clone, Copy, Default)]
pub struct HermiteEngine;

/// The fitted path through all waypoints.
struct Path {
    splines: Vec<HermiteSpline>,

    /// Distance at the start of each spline
    offsets: Vec<f64>,

    length: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl HermiteEngine {
    pub fn new() -> Self {
        Self
    }
}

impl TrajectoryEngine for HermiteEngine {
    fn generate(
        &self,
        waypoints: &[Waypoint],
        request: &GenRequest,
    ) -> Result<Trajectory, GenerationError> {
        if waypoints.len() < 2 {
            return Err(GenerationError::TooFewWaypoints(waypoints.len()));
        }

        let path = Path::fit(waypoints, request)?;

        let profile = SCurveProfile::new(
            path.length,
            request.max_velocity,
            request.max_acceleration,
            request.max_jerk,
            request.time_step_s,
        )?;

        debug!(
            "Profiled {} waypoints: length {:.4}, {} samples, cruise velocity {:.4}",
            waypoints.len(),
            path.length,
            profile.samples.len(),
            profile.cruise_velocity
        );

        let points = profile
            .samples
            .iter()
            .enumerate()
            .map(|(i, s)| {
                let (spline, t) = path.locate(s.position);
                let p = spline.point(t);

                TrajPoint {
                    time_s: i as f64 * request.time_step_s,
                    x: p.x,
                    y: p.y,
                    position: s.position,
                    velocity: s.velocity,
                    acceleration: s.acceleration,
                    jerk: s.jerk,
                    heading_rad: spline.heading(t),
                    curvature: spline.curvature(t),
                }
            })
            .collect();

        Ok(Trajectory::new(request.time_step_s, points))
    }
}

impl Path {
    fn fit(waypoints: &[Waypoint], request: &GenRequest) -> Result<Self, GenerationError> {
        let mut splines = Vec::with_capacity(waypoints.len() - 1);
        let mut offsets = Vec::with_capacity(waypoints.len() - 1);
        let mut length = 0.0;

        for (i, pair) in waypoints.windows(2).enumerate() {
            let spline = HermiteSpline::fit(
                &pair[0],
                &pair[1],
                request.fit_method,
                request.sample_density.samples(),
            )
            .ok_or(GenerationError::DegenerateWaypoints(i, i + 1))?;

            offsets.push(length);
            length += spline.length();
            splines.push(spline);
        }

        Ok(Self {
            splines,
            offsets,
            length,
        })
    }

    /// Find the spline and parameter at the given distance along the path.
    fn locate(&self, distance: f64) -> (&HermiteSpline, f64) {
        let idx = self
            .offsets
            .partition_point(|&o| o <= distance)
            .saturating_sub(1);

        let spline = &self.splines[idx];
        (spline, spline.param_at_distance(distance - self.offsets[idx]))
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::project::{FitMethod, ProjectConfig};
    use crate::traj::SampleDensity;

    fn request(fit_method: FitMethod) -> GenRequest {
        let mut req = GenRequest::from_config(&ProjectConfig::default());
        req.fit_method = fit_method;
        req.sample_density = SampleDensity::Low;
        req
    }

    fn wp(x: f64, y: f64, heading_deg: f64) -> Waypoint {
        Waypoint::from_degrees(x, y, heading_deg).unwrap()
    }

    #[test]
    fn test_generate_curve() {
        let waypoints = [wp(0.0, 0.0, 0.0), wp(4.0, 4.0, 0.0)];

        for &method in &[FitMethod::Cubic, FitMethod::Quintic] {
            let traj = HermiteEngine::new()
                .generate(&waypoints, &request(method))
                .unwrap();

            assert!(!traj.is_empty());
            assert_eq!(traj.dt_s(), 0.05);

            let points = traj.points();
            assert_eq!(points[0].time_s, 0.0);
            assert!(points.windows(2).all(|p| p[1].time_s > p[0].time_s));

            // Longer than the chord, and finishing on the last waypoint
            let last = points[points.len() - 1];
            assert!(traj.length() > 32f64.sqrt());
            assert!((last.x - 4.0).abs() < 1e-3);
            assert!((last.y - 4.0).abs() < 1e-3);
            assert!(last.heading_rad.abs() < 1e-2);
            assert_eq!(last.velocity, 0.0);
        }
    }

    #[test]
    fn test_generate_multi_segment() {
        let waypoints = [
            wp(0.0, 0.0, 0.0),
            wp(5.0, 0.0, 0.0),
            wp(10.0, 0.0, 0.0),
        ];
        let traj = HermiteEngine::new()
            .generate(&waypoints, &request(FitMethod::Cubic))
            .unwrap();

        assert!((traj.length() - 10.0).abs() < 1e-6);

        for p in traj.points() {
            assert!(p.y.abs() < 1e-9);
            assert!(p.curvature.abs() < 1e-9);
            assert!((p.x - p.position).abs() < 1e-3);
        }
    }

    #[test]
    fn test_generate_errors() {
        let engine = HermiteEngine::new();
        let req = request(FitMethod::Cubic);

        assert_eq!(
            engine.generate(&[wp(0.0, 0.0, 0.0)], &req),
            Err(GenerationError::TooFewWaypoints(1))
        );
        assert_eq!(
            engine.generate(
                &[wp(0.0, 0.0, 0.0), wp(1.0, 0.0, 0.0), wp(1.0, 0.0, 90.0)],
                &req
            ),
            Err(GenerationError::DegenerateWaypoints(1, 2))
        );

        let mut bad = req;
        bad.max_velocity = 0.0;
        assert!(matches!(
            engine.generate(&[wp(0.0, 0.0, 0.0), wp(1.0, 0.0, 0.0)], &bad),
            Err(GenerationError::Infeasible(_))
        ));
    }
}
