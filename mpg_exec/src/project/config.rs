//! Project configuration

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};
use std::fmt;

use super::{DriveBase, FitMethod, ValidationError};
use crate::units::{Quantity, Units};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Generation configuration of a project.
///
/// Lengths are in the project's `units` (feet or meters), rates are those
/// lengths per second, per second squared and per second cubed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// Spacing between trajectory samples.
    ///
    /// Units: seconds
    pub time_step_s: f64,

    /// Maximum velocity of the robot's centre.
    pub max_velocity: f64,

    /// Maximum acceleration of the robot's centre.
    pub max_acceleration: f64,

    /// Maximum jerk of the robot's centre.
    pub max_jerk: f64,

    /// Lateral distance between the left and right wheel paths.
    pub track_width: f64,

    /// Longitudinal distance between front and back wheels. Only used for
    /// swerve drive bases.
    pub wheel_base_depth: f64,

    pub fit_method: FitMethod,

    pub drive_base: DriveBase,

    pub units: Units,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// The numeric fields of a [`ProjectConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigField {
    TimeStep,
    MaxVelocity,
    MaxAcceleration,
    MaxJerk,
    TrackWidth,
    WheelBaseDepth,
}

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

impl ConfigField {
    /// All numeric fields, in project file order.
    pub const ALL: [ConfigField; 6] = [
        ConfigField::TimeStep,
        ConfigField::MaxVelocity,
        ConfigField::MaxAcceleration,
        ConfigField::MaxJerk,
        ConfigField::TrackWidth,
        ConfigField::WheelBaseDepth,
    ];
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl ConfigField {
    /// Human readable name of the field.
    pub fn name(&self) -> &'static str {
        match self {
            ConfigField::TimeStep => "time step",
            ConfigField::MaxVelocity => "max velocity",
            ConfigField::MaxAcceleration => "max acceleration",
            ConfigField::MaxJerk => "max jerk",
            ConfigField::TrackWidth => "track width",
            ConfigField::WheelBaseDepth => "wheel base depth",
        }
    }

    /// Human readable description of the field's constraint.
    pub fn constraint(&self) -> &'static str {
        match self {
            ConfigField::WheelBaseDepth => "finite and >= 0",
            _ => "finite and > 0",
        }
    }

    /// Whether the value satisfies the field's constraint.
    pub fn accepts(&self, value: f64) -> bool {
        if !value.is_finite() {
            return false;
        }

        match self {
            ConfigField::WheelBaseDepth => value >= 0.0,
            _ => value > 0.0,
        }
    }

    /// The kind of quantity this field holds when changing unit systems, or
    /// `None` if the field is unaffected by the unit system.
    pub fn quantity(&self) -> Option<Quantity> {
        match self {
            ConfigField::TimeStep => None,
            ConfigField::MaxVelocity | ConfigField::MaxAcceleration | ConfigField::MaxJerk => {
                Some(Quantity::Rate)
            }
            ConfigField::TrackWidth | ConfigField::WheelBaseDepth => Some(Quantity::Length),
        }
    }
}

impl fmt::Display for ConfigField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl ProjectConfig {
    /// Get the value of a numeric field.
    pub fn get(&self, field: ConfigField) -> f64 {
        match field {
            ConfigField::TimeStep => self.time_step_s,
            ConfigField::MaxVelocity => self.max_velocity,
            ConfigField::MaxAcceleration => self.max_acceleration,
            ConfigField::MaxJerk => self.max_jerk,
            ConfigField::TrackWidth => self.track_width,
            ConfigField::WheelBaseDepth => self.wheel_base_depth,
        }
    }

    /// Return a copy of the config with the field set to `value`, or an error
    /// if the value violates the field's constraint.
    pub fn with(&self, field: ConfigField, value: f64) -> Result<Self, ValidationError> {
        if !field.accepts(value) {
            return Err(ValidationError::OutOfRange { field, value });
        }

        let mut config = *self;
        match field {
            ConfigField::TimeStep => config.time_step_s = value,
            ConfigField::MaxVelocity => config.max_velocity = value,
            ConfigField::MaxAcceleration => config.max_acceleration = value,
            ConfigField::MaxJerk => config.max_jerk = value,
            ConfigField::TrackWidth => config.track_width = value,
            ConfigField::WheelBaseDepth => config.wheel_base_depth = value,
        }

        Ok(config)
    }

    /// Check every numeric field against its constraint.
    pub fn validate(&self) -> Result<(), ValidationError> {
        for &field in ConfigField::ALL.iter() {
            let value = self.get(field);
            if !field.accepts(value) {
                return Err(ValidationError::OutOfRange { field, value });
            }
        }

        Ok(())
    }
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            time_step_s: 0.05,
            max_velocity: 4.0,
            max_acceleration: 3.0,
            max_jerk: 60.0,
            track_width: 1.464,
            wheel_base_depth: 0.0,
            fit_method: FitMethod::Cubic,
            drive_base: DriveBase::Tank,
            units: Units::Imperial,
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
    fn test_default_is_valid() {
        assert_eq!(ProjectConfig::default().validate(), Ok(()));
    }

    #[test]
    fn test_with_enforces_constraints() {
        let config = ProjectConfig::default();

        assert_eq!(config.with(ConfigField::MaxJerk, 30.0).unwrap().max_jerk, 30.0);
        assert_eq!(config.with(ConfigField::WheelBaseDepth, 0.0).unwrap().wheel_base_depth, 0.0);

        assert_eq!(
            config.with(ConfigField::TimeStep, 0.0),
            Err(ValidationError::OutOfRange { field: ConfigField::TimeStep, value: 0.0 })
        );
        assert!(config.with(ConfigField::TrackWidth, -1.0).is_err());
        assert!(config.with(ConfigField::WheelBaseDepth, -0.1).is_err());
        assert!(config.with(ConfigField::MaxVelocity, f64::INFINITY).is_err());
        assert!(config.with(ConfigField::MaxAcceleration, f64::NAN).is_err());
    }

    #[test]
    fn test_validation_message() {
        let err = ValidationError::OutOfRange { field: ConfigField::MaxVelocity, value: -2.0 };
        assert_eq!(err.to_string(), "The max velocity must be finite and > 0, found -2");
    }

    #[test]
    fn test_quantities() {
        assert_eq!(ConfigField::TimeStep.quantity(), None);
        assert_eq!(ConfigField::MaxJerk.quantity(), Some(Quantity::Rate));
        assert_eq!(ConfigField::TrackWidth.quantity(), Some(Quantity::Length));
    }
}
