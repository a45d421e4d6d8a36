//! Project state

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::{debug, info};
use std::ops::Range;
use std::path::{Path, PathBuf};

use super::*;
use crate::units::{convert, Quantity, Units};
use util::maths::round_to_multiple;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Headings of click-added waypoints are snapped to multiples of this angle.
///
/// Units: degrees
pub const HEADING_SNAP_DEG: f64 = 45.0;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The waypoints and configuration of one project.
///
/// Every mutation either fully applies or leaves the state untouched, and
/// bumps the state's revision so that derived data (trajectories) can tell
/// it has gone stale.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectState {
    /// Waypoints in path traversal order
    waypoints: Vec<Waypoint>,

    config: ProjectConfig,

    /// Project file later saves are written to
    bound_file: Option<PathBuf>,

    /// Incremented on every mutation affecting trajectories
    revision: u64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl ProjectState {
    /// Create an empty project with the default configuration.
    pub fn new() -> Self {
        Self {
            waypoints: Vec::new(),
            config: ProjectConfig::default(),
            bound_file: None,
            revision: 0,
        }
    }

    /// Create a project from a configuration and a list of waypoints.
    pub fn from_parts(
        config: ProjectConfig,
        waypoints: Vec<Waypoint>,
    ) -> Result<Self, ValidationError> {
        config.validate()?;

        Ok(Self {
            waypoints,
            config,
            bound_file: None,
            revision: 0,
        })
    }

    // ---- ACCESSORS ----

    pub fn waypoints(&self) -> &[Waypoint] {
        &self.waypoints
    }

    pub fn config(&self) -> &ProjectConfig {
        &self.config
    }

    pub fn units(&self) -> Units {
        self.config.units
    }

    /// The project file this project is bound to, if any.
    pub fn bound_file(&self) -> Option<&Path> {
        self.bound_file.as_deref()
    }

    /// Revision counter, changes whenever the waypoints or configuration do.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    // ---- WAYPOINTS ----

    /// Append a waypoint to the end of the path.
    pub fn add_waypoint(&mut self, waypoint: Waypoint) {
        self.waypoints.push(waypoint);
        self.touch();
    }

    /// Append a waypoint at (x, y) whose heading points away from the
    /// previous waypoint, snapped to the nearest [`HEADING_SNAP_DEG`].
    ///
    /// The first waypoint of a path gets a heading of zero.
    pub fn add_waypoint_towards(&mut self, x: f64, y: f64) -> Result<Waypoint, ValidationError> {
        let heading_deg = match self.waypoints.last() {
            Some(prev) => {
                let raw_deg = (y - prev.y()).atan2(x - prev.x()).to_degrees();
                round_to_multiple(raw_deg, HEADING_SNAP_DEG)
            }
            None => 0.0,
        };

        let waypoint = Waypoint::from_degrees(x, y, heading_deg)?;
        self.add_waypoint(waypoint);

        Ok(waypoint)
    }

    /// Replace the waypoint at the given index.
    pub fn update_waypoint(&mut self, index: usize, waypoint: Waypoint) -> Result<(), RangeError> {
        let len = self.waypoints.len();
        match self.waypoints.get_mut(index) {
            Some(w) => *w = waypoint,
            None => return Err(RangeError::IndexOutOfBounds { index, len }),
        }

        self.touch();
        Ok(())
    }

    /// Remove a contiguous, half open range of waypoints.
    ///
    /// An empty range is accepted and changes nothing.
    pub fn remove_waypoints(&mut self, range: Range<usize>) -> Result<(), RangeError> {
        let (start, end, len) = (range.start, range.end, self.waypoints.len());

        if start > end {
            return Err(RangeError::Inverted { start, end });
        }
        if end > len {
            return Err(RangeError::OutOfBounds { start, end, len });
        }
        if start == end {
            return Ok(());
        }

        self.waypoints.drain(range);
        self.touch();

        debug!("Removed waypoints {}..{}, {} remaining", start, end, self.waypoints.len());

        Ok(())
    }

    /// Remove all waypoints.
    pub fn clear(&mut self) {
        self.waypoints.clear();
        self.touch();
    }

    /// Start a new project: clear the waypoints, unbind the project file and
    /// restore the given default configuration.
    pub fn reset(&mut self, defaults: ProjectConfig) -> Result<(), ValidationError> {
        defaults.validate()?;

        self.waypoints.clear();
        self.config = defaults;
        self.bound_file = None;
        self.touch();

        Ok(())
    }

    // ---- CONFIGURATION ----

    /// Set a numeric configuration field, rejecting values which violate the
    /// field's constraint.
    pub fn set_field(&mut self, field: ConfigField, value: f64) -> Result<(), ValidationError> {
        self.config = self.config.with(field, value)?;
        self.touch();

        Ok(())
    }

    pub fn set_time_step(&mut self, time_step_s: f64) -> Result<(), ValidationError> {
        self.set_field(ConfigField::TimeStep, time_step_s)
    }

    pub fn set_max_velocity(&mut self, max_velocity: f64) -> Result<(), ValidationError> {
        self.set_field(ConfigField::MaxVelocity, max_velocity)
    }

    pub fn set_max_acceleration(&mut self, max_acceleration: f64) -> Result<(), ValidationError> {
        self.set_field(ConfigField::MaxAcceleration, max_acceleration)
    }

    pub fn set_max_jerk(&mut self, max_jerk: f64) -> Result<(), ValidationError> {
        self.set_field(ConfigField::MaxJerk, max_jerk)
    }

    pub fn set_track_width(&mut self, track_width: f64) -> Result<(), ValidationError> {
        self.set_field(ConfigField::TrackWidth, track_width)
    }

    pub fn set_wheel_base_depth(&mut self, wheel_base_depth: f64) -> Result<(), ValidationError> {
        self.set_field(ConfigField::WheelBaseDepth, wheel_base_depth)
    }

    pub fn set_fit_method(&mut self, fit_method: FitMethod) {
        self.config.fit_method = fit_method;
        self.touch();
    }

    pub fn set_drive_base(&mut self, drive_base: DriveBase) {
        self.config.drive_base = drive_base;
        self.touch();
    }

    /// Change the unit system, converting every waypoint position and every
    /// length or rate field.
    ///
    /// Either everything is converted or, if any converted value would be
    /// invalid, nothing is. Setting the current unit system does nothing.
    pub fn set_units(&mut self, units: Units) -> Result<(), ValidationError> {
        let from = self.config.units;
        if units == from {
            return Ok(());
        }

        // Build the converted state off to the side first
        let mut config = self.config;
        for &field in ConfigField::ALL.iter() {
            if let Some(kind) = field.quantity() {
                config = config.with(field, convert(config.get(field), kind, from, units))?;
            }
        }
        config.units = units;

        let waypoints = self
            .waypoints
            .iter()
            .map(|w| {
                Waypoint::new(
                    convert(w.x(), Quantity::Length, from, units),
                    convert(w.y(), Quantity::Length, from, units),
                    convert(w.heading_rad(), Quantity::Angle, from, units),
                )
            })
            .collect::<Result<Vec<_>, _>>()?;

        // Commit
        self.config = config;
        self.waypoints = waypoints;
        self.touch();

        info!("Converted project from {} to {}", from, units);

        Ok(())
    }

    // ---- FILE BINDING ----

    /// Bind the project to a file which later saves will write to. No I/O is
    /// performed.
    pub fn bind_file<P: Into<PathBuf>>(&mut self, path: P) {
        self.bound_file = Some(path.into());
    }

    /// Forget the bound project file.
    pub fn unbind(&mut self) {
        self.bound_file = None;
    }

    fn touch(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }
}

impl Default for ProjectState {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
