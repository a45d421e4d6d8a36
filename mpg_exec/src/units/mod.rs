//! # Unit conversion
//!
//! Projects are stored in either imperial (feet) or metric (meters) units.
//! Lengths and their time derivatives share a single conversion factor as
//! time is never rescaled, while headings are always radians.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use util::maths::round_to;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Number of meters in one foot.
pub const METERS_PER_FOOT: f64 = 0.3048;

/// Number of decimal places converted values are rounded to.
pub const CONVERSION_DECIMAL_PLACES: i32 = 4;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// The unit system a project is expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Units {
    /// Feet (and feet per second, ...)
    Imperial,

    /// Meters (and meters per second, ...)
    Metric,
}

/// The kind of quantity being converted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quantity {
    /// Positions and distances, e.g. waypoint coordinates or track width.
    Length,

    /// Time derivatives of a length: velocity, acceleration or jerk.
    Rate,

    /// Angles in radians, which are the same in both systems.
    Angle,
}

#[derive(Debug, Error, PartialEq)]
#[error("Unknown unit system {0:?}, expected IMPERIAL or METRIC")]
pub struct UnknownUnitsError(pub String);

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Convert a value of the given kind from one unit system into another.
///
/// Converted lengths and rates are rounded to
/// [`CONVERSION_DECIMAL_PLACES`]. Converting within the same system, or
/// converting an angle, returns the value untouched.
pub fn convert(value: f64, kind: Quantity, from: Units, to: Units) -> f64 {
    if from == to {
        return value;
    }

    match kind {
        Quantity::Length | Quantity::Rate => {
            round_to(value * factor(from, to), CONVERSION_DECIMAL_PLACES)
        }
        Quantity::Angle => value,
    }
}

/// The multiplicative factor taking a length in `from` units into `to` units.
pub fn factor(from: Units, to: Units) -> f64 {
    match (from, to) {
        (Units::Imperial, Units::Metric) => METERS_PER_FOOT,
        (Units::Metric, Units::Imperial) => 1.0 / METERS_PER_FOOT,
        (Units::Imperial, Units::Imperial) | (Units::Metric, Units::Metric) => 1.0,
    }
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Units {
    /// Name of the unit of length in this system.
    pub fn length_name(&self) -> &'static str {
        match self {
            Units::Imperial => "ft",
            Units::Metric => "m",
        }
    }
}

impl Default for Units {
    fn default() -> Self {
        Units::Imperial
    }
}

impl fmt::Display for Units {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Units::Imperial => write!(f, "IMPERIAL"),
            Units::Metric => write!(f, "METRIC"),
        }
    }
}

impl FromStr for Units {
    type Err = UnknownUnitsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "IMPERIAL" => Ok(Units::Imperial),
            "METRIC" => Ok(Units::Metric),
            _ => Err(UnknownUnitsError(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
