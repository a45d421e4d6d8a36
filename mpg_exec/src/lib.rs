//! # Motion profile generator library.
//!
//! Plans robot paths through waypoints and generates the time parametrised
//! trajectories of the robot's centre and of each of its wheels.
//!
//! The [`planner::Planner`] ties everything together: it owns the
//! [`project::ProjectState`] being edited and a
//! [`orchestrator::TrajOrchestrator`] which regenerates trajectories after
//! every edit.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

/// Planner errors - the five kinds of failure reported to callers
pub mod error;

/// Trajectory orchestrator - generates and caches the trajectories of a project
pub mod orchestrator;

/// Planner parameters
pub mod params;

/// Persistence - project files, legacy imports and trajectory exports
pub mod persist;

/// Planner - a project and its trajectories, regenerated after every edit
pub mod planner;

/// Project state - waypoints and configuration
pub mod project;

/// Trajectory generation - path fitting, profiling and wheel decomposition
pub mod traj;

/// Unit conversion between imperial and metric projects
pub mod units;

// ---------------------------------------------------------------------------
// EXPORTS
// ---------------------------------------------------------------------------

pub use error::PlanError;
pub use planner::{Planner, RegenStatus};
