//! # Trajectory module
//!
//! Trajectories are produced by two collaborators which the rest of the crate
//! only knows through traits:
//!
//! - a [`TrajectoryEngine`] fits a path through the waypoints and profiles
//!   the robot centre's motion along it, giving the source trajectory;
//! - a [`KinematicsModifier`] decomposes the source trajectory into one
//!   trajectory per wheel (two for tank, four for swerve).
//!
//! [`HermiteEngine`] and [`WheelModifier`] are the default implementations.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod engine;
mod modifier;
mod profile;
mod spline;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::project::{FitMethod, ProjectConfig, Waypoint};

pub use engine::HermiteEngine;
pub use modifier::WheelModifier;
pub use profile::{ProfileSample, SCurveProfile};
pub use spline::HermiteSpline;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A single trajectory sample.
///
/// Lengths and rates are in the project's units, angles in radians.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TrajPoint {
    /// Time since the start of the trajectory.
    ///
    /// Units: seconds
    pub time_s: f64,

    pub x: f64,

    pub y: f64,

    /// Distance travelled along the trajectory.
    pub position: f64,

    pub velocity: f64,

    pub acceleration: f64,

    pub jerk: f64,

    /// Chassis heading.
    ///
    /// Units: radians
    pub heading_rad: f64,

    /// Signed curvature of the travelled path, positive to the left.
    ///
    /// Units: 1/length
    pub curvature: f64,
}

/// An ordered sequence of samples at a fixed time step.
#[derive(Debug, Clone, PartialEq)]
pub struct Trajectory {
    dt_s: f64,
    points: Vec<TrajPoint>,
}

/// Everything the engine needs besides the waypoints.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenRequest {
    pub fit_method: FitMethod,
    pub sample_density: SampleDensity,
    pub time_step_s: f64,
    pub max_velocity: f64,
    pub max_acceleration: f64,
    pub max_jerk: f64,
}

/// Left and right wheel trajectories of a tank drive base.
#[derive(Debug, Clone, PartialEq)]
pub struct TankPair {
    pub left: Trajectory,
    pub right: Trajectory,
}

/// Wheel trajectories of a swerve drive base.
#[derive(Debug, Clone, PartialEq)]
pub struct SwerveQuad {
    pub front_left: Trajectory,
    pub front_right: Trajectory,
    pub back_left: Trajectory,
    pub back_right: Trajectory,
}

/// A source trajectory together with its wheel trajectories.
#[derive(Debug, Clone, PartialEq)]
pub struct TrajectorySet {
    pub source: Trajectory,
    pub wheels: WheelTrajectories,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Wheel trajectories, shaped by the drive base they were generated for.
#[derive(Debug, Clone, PartialEq)]
pub enum WheelTrajectories {
    Tank(TankPair),
    Swerve(SwerveQuad),
}

/// Number of samples used to fit each spline segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleDensity {
    Fast,
    Low,
    High,
}

/// The current waypoints or configuration can't be turned into trajectories.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GenerationError {
    #[error("At least 2 waypoints are needed to generate a trajectory, found {0}")]
    TooFewWaypoints(usize),

    #[error("Waypoints {0} and {1} are at the same position")]
    DegenerateWaypoints(usize, usize),

    #[error("The requested motion is infeasible: {0}")]
    Infeasible(String),

    #[error("Invalid drive base geometry: {0}")]
    InvalidGeometry(String),

    #[error("The source trajectory has no samples")]
    EmptySource,

    #[error("No trajectories have been generated for the current project")]
    NotGenerated,
}

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// Fits and profiles a path through a sequence of waypoints.
pub trait TrajectoryEngine {
    /// Generate the trajectory of the robot's centre.
    fn generate(
        &self,
        waypoints: &[Waypoint],
        request: &GenRequest,
    ) -> Result<Trajectory, GenerationError>;
}

/// Decomposes a centre trajectory into wheel trajectories.
pub trait KinematicsModifier {
    /// Offset the source by half the track width to either side.
    fn tank(&self, source: &Trajectory, track_width: f64) -> Result<TankPair, GenerationError>;

    /// Offset the source to each corner of a `track_width` by
    /// `wheel_base_depth` rectangle.
    fn swerve(
        &self,
        source: &Trajectory,
        track_width: f64,
        wheel_base_depth: f64,
    ) -> Result<SwerveQuad, GenerationError>;
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Trajectory {
    pub fn new(dt_s: f64, points: Vec<TrajPoint>) -> Self {
        Self { dt_s, points }
    }

    /// Time step between samples.
    ///
    /// Units: seconds
    pub fn dt_s(&self) -> f64 {
        self.dt_s
    }

    pub fn points(&self) -> &[TrajPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Time of the last sample, zero for an empty trajectory.
    pub fn duration_s(&self) -> f64 {
        self.points.last().map(|p| p.time_s).unwrap_or(0.0)
    }

    /// Distance travelled by the end of the trajectory.
    pub fn length(&self) -> f64 {
        self.points.last().map(|p| p.position).unwrap_or(0.0)
    }
}

impl SampleDensity {
    /// Samples per spline segment.
    pub fn samples(&self) -> usize {
        match self {
            SampleDensity::Fast => 1_000,
            SampleDensity::Low => 10_000,
            SampleDensity::High => 100_000,
        }
    }
}

impl GenRequest {
    /// Build a request from a project's configuration.
    ///
    /// Generation always uses the high sample density.
    pub fn from_config(config: &ProjectConfig) -> Self {
        Self {
            fit_method: config.fit_method,
            sample_density: SampleDensity::High,
            time_step_s: config.time_step_s,
            max_velocity: config.max_velocity,
            max_acceleration: config.max_acceleration,
            max_jerk: config.max_jerk,
        }
    }
}

impl TrajectorySet {
    /// The front left wheel, or the left side of a tank drive.
    pub fn front_left(&self) -> &Trajectory {
        match &self.wheels {
            WheelTrajectories::Tank(t) => &t.left,
            WheelTrajectories::Swerve(s) => &s.front_left,
        }
    }

    /// The front right wheel, or the right side of a tank drive.
    pub fn front_right(&self) -> &Trajectory {
        match &self.wheels {
            WheelTrajectories::Tank(t) => &t.right,
            WheelTrajectories::Swerve(s) => &s.front_right,
        }
    }

    /// The back left wheel, absent for tank drives.
    pub fn back_left(&self) -> Option<&Trajectory> {
        match &self.wheels {
            WheelTrajectories::Tank(_) => None,
            WheelTrajectories::Swerve(s) => Some(&s.back_left),
        }
    }

    /// The back right wheel, absent for tank drives.
    pub fn back_right(&self) -> Option<&Trajectory> {
        match &self.wheels {
            WheelTrajectories::Tank(_) => None,
            WheelTrajectories::Swerve(s) => Some(&s.back_right),
        }
    }

    /// Wheel trajectories paired with the file suffix they are exported
    /// under.
    pub fn named_wheels(&self) -> Vec<(&'static str, &Trajectory)> {
        match &self.wheels {
            WheelTrajectories::Tank(t) => vec![("left", &t.left), ("right", &t.right)],
            WheelTrajectories::Swerve(s) => vec![
                ("fl", &s.front_left),
                ("fr", &s.front_right),
                ("bl", &s.back_left),
                ("br", &s.back_right),
            ],
        }
    }
}
