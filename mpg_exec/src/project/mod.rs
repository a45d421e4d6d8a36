//! # Project module
//!
//! A project is the ordered list of waypoints the robot must pass through and
//! the configuration used to turn them into trajectories. [`ProjectState`] is
//! the single owner of both and enforces the constraints on every edit.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod config;
mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub use config::*;
pub use state::*;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A point the path must pass through.
///
/// The heading is the direction of the path's tangent at the point, not just
/// the robot's orientation. Every component is guaranteed to be finite.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Waypoint {
    x: f64,
    y: f64,
    heading_rad: f64,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Spline family used to interpolate between waypoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FitMethod {
    #[serde(alias = "HERMITE_CUBIC")]
    Cubic,

    #[serde(alias = "HERMITE_QUINTIC")]
    Quintic,
}

/// The drivetrain layout trajectories are decomposed for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DriveBase {
    /// Two driven sides, left and right.
    Tank,

    /// Four independently steered and driven wheels.
    Swerve,
}

/// A value rejected by a project setter. The project is left unchanged.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("The {field} must be {}, found {value}", .field.constraint())]
    OutOfRange { field: ConfigField, value: f64 },

    #[error("Waypoint {component} must be finite, found {value}")]
    NonFiniteWaypoint { component: &'static str, value: f64 },
}

/// An index or range of waypoints that doesn't exist.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RangeError {
    #[error("The waypoint range {start}..{end} is inverted")]
    Inverted { start: usize, end: usize },

    #[error("The waypoint range {start}..{end} is out of bounds for {len} waypoints")]
    OutOfBounds { start: usize, end: usize, len: usize },

    #[error("The waypoint index {index} is out of bounds for {len} waypoints")]
    IndexOutOfBounds { index: usize, len: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown {kind} {name:?}")]
pub struct UnknownVariantError {
    pub kind: &'static str,
    pub name: String,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Waypoint {
    /// Create a new waypoint, rejecting non-finite components.
    pub fn new(x: f64, y: f64, heading_rad: f64) -> Result<Self, ValidationError> {
        for &(component, value) in &[("x", x), ("y", y), ("heading", heading_rad)] {
            if !value.is_finite() {
                return Err(ValidationError::NonFiniteWaypoint { component, value });
            }
        }

        Ok(Self { x, y, heading_rad })
    }

    /// Create a new waypoint with the heading given in degrees.
    pub fn from_degrees(x: f64, y: f64, heading_deg: f64) -> Result<Self, ValidationError> {
        Self::new(x, y, heading_deg.to_radians())
    }

    pub fn x(&self) -> f64 {
        self.x
    }

    pub fn y(&self) -> f64 {
        self.y
    }

    /// Tangent heading at this waypoint.
    ///
    /// Units: radians
    pub fn heading_rad(&self) -> f64 {
        self.heading_rad
    }
}

impl FitMethod {
    /// The name used for this fit method inside project files.
    pub fn file_name(&self) -> &'static str {
        match self {
            FitMethod::Cubic => "HERMITE_CUBIC",
            FitMethod::Quintic => "HERMITE_QUINTIC",
        }
    }
}

impl fmt::Display for FitMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FitMethod::Cubic => write!(f, "CUBIC"),
            FitMethod::Quintic => write!(f, "QUINTIC"),
        }
    }
}

impl FromStr for FitMethod {
    type Err = UnknownVariantError;

    /// Accepts `CUBIC`/`QUINTIC` in any case, with or without a `HERMITE_`
    /// prefix.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        let name = upper.strip_prefix("HERMITE_").unwrap_or(&upper);

        match name {
            "CUBIC" => Ok(FitMethod::Cubic),
            "QUINTIC" => Ok(FitMethod::Quintic),
            _ => Err(UnknownVariantError {
                kind: "fit method",
                name: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for DriveBase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DriveBase::Tank => write!(f, "TANK"),
            DriveBase::Swerve => write!(f, "SWERVE"),
        }
    }
}

impl FromStr for DriveBase {
    type Err = UnknownVariantError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "TANK" => Ok(DriveBase::Tank),
            "SWERVE" => Ok(DriveBase::Swerve),
            _ => Err(UnknownVariantError {
                kind: "drive base",
                name: s.to_string(),
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_waypoint_rejects_non_finite() {
        assert!(Waypoint::new(1.0, 2.0, 0.5).is_ok());
        assert!(matches!(
            Waypoint::new(f64::NAN, 2.0, 0.5),
            Err(ValidationError::NonFiniteWaypoint { component: "x", .. })
        ));
        assert!(matches!(
            Waypoint::new(0.0, f64::INFINITY, 0.0),
            Err(ValidationError::NonFiniteWaypoint { component: "y", .. })
        ));
        assert!(matches!(
            Waypoint::new(0.0, 0.0, f64::NEG_INFINITY),
            Err(ValidationError::NonFiniteWaypoint { component: "heading", .. })
        ));
    }

    #[test]
    fn test_waypoint_degrees() {
        let w = Waypoint::from_degrees(1.0, 2.0, 90.0).unwrap();
        assert!((w.heading_rad() - std::f64::consts::FRAC_PI_2).abs() < 1e-12);
    }

    #[test]
    fn test_fit_method_names() {
        assert_eq!("CUBIC".parse::<FitMethod>(), Ok(FitMethod::Cubic));
        assert_eq!("quintic".parse::<FitMethod>(), Ok(FitMethod::Quintic));
        assert_eq!("HERMITE_CUBIC".parse::<FitMethod>(), Ok(FitMethod::Cubic));
        assert_eq!("hermite_quintic\r".parse::<FitMethod>(), Ok(FitMethod::Quintic));
        assert!("LINEAR".parse::<FitMethod>().is_err());
        assert_eq!(FitMethod::Quintic.file_name(), "HERMITE_QUINTIC");
    }

    #[test]
    fn test_drive_base_names() {
        assert_eq!("TANK".parse::<DriveBase>(), Ok(DriveBase::Tank));
        assert_eq!("swerve".parse::<DriveBase>(), Ok(DriveBase::Swerve));
        assert!("MECANUM".parse::<DriveBase>().is_err());
        assert_eq!(DriveBase::Swerve.to_string(), "SWERVE");
    }
}
