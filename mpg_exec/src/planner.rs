//! # Planner
//!
//! Owns one project and its trajectory orchestrator. Every edit is applied to
//! the project and then immediately followed by a full regeneration, so once
//! a call returns the cached trajectories either match the project or are
//! absent.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::{debug, warn};
use std::io;
use std::ops::Range;
use std::path::{Path, PathBuf};

use crate::error::PlanError;
use crate::orchestrator::{Freshness, TrajOrchestrator};
use crate::persist::{bot_file, export, project_file, ExportFormat, IoError};
use crate::project::{ConfigField, DriveBase, FitMethod, ProjectConfig, ProjectState, Waypoint};
use crate::traj::{
    GenerationError, HermiteEngine, KinematicsModifier, TrajectoryEngine, TrajectorySet,
    WheelModifier,
};
use crate::units::Units;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A project together with the trajectories generated from it.
#[derive(Debug)]
pub struct Planner<E = HermiteEngine, M = WheelModifier> {
    state: ProjectState,
    orchestrator: TrajOrchestrator<E, M>,

    /// Configuration new projects start from
    defaults: ProjectConfig,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Outcome of the regeneration following an accepted edit.
#[derive(Debug, Clone, PartialEq)]
pub enum RegenStatus {
    /// Trajectories match the edited project.
    Fresh,

    /// Too few waypoints to generate anything.
    Stale,

    /// The edit was applied but the project can't currently be generated.
    Failed(GenerationError),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Planner {
    /// Create an empty project using the built in engine and modifier.
    pub fn new(defaults: ProjectConfig) -> Result<Self, PlanError> {
        Self::with_orchestrator(defaults, TrajOrchestrator::new())
    }
}

impl<E, M> Planner<E, M>
where
    E: TrajectoryEngine,
    M: KinematicsModifier,
{
    /// Create an empty project generated by the given orchestrator.
    pub fn with_orchestrator(
        defaults: ProjectConfig,
        orchestrator: TrajOrchestrator<E, M>,
    ) -> Result<Self, PlanError> {
        let mut state = ProjectState::new();
        state.reset(defaults)?;

        Ok(Self {
            state,
            orchestrator,
            defaults,
        })
    }

    // ---- ACCESSORS ----

    pub fn state(&self) -> &ProjectState {
        &self.state
    }

    pub fn orchestrator(&self) -> &TrajOrchestrator<E, M> {
        &self.orchestrator
    }

    /// Whether the cached trajectories match the project.
    pub fn freshness(&self) -> Freshness {
        self.orchestrator.state(&self.state)
    }

    /// Trajectories of the current project, if generated.
    pub fn trajectories(&self) -> Option<&TrajectorySet> {
        self.orchestrator.trajectories(&self.state)
    }

    // ---- GENERATION ----

    /// Regenerate the trajectories.
    ///
    /// Returns [`Freshness::Stale`] when there are too few waypoints.
    pub fn regenerate(&mut self) -> Result<Freshness, PlanError> {
        Ok(self.orchestrator.regenerate(&self.state)?)
    }

    // ---- WAYPOINTS ----

    pub fn add_waypoint(&mut self, waypoint: Waypoint) -> RegenStatus {
        self.state.add_waypoint(waypoint);
        self.refresh()
    }

    /// Add a waypoint at (x, y) heading away from the previous one.
    pub fn add_waypoint_towards(&mut self, x: f64, y: f64) -> Result<RegenStatus, PlanError> {
        self.state.add_waypoint_towards(x, y)?;
        Ok(self.refresh())
    }

    pub fn update_waypoint(
        &mut self,
        index: usize,
        waypoint: Waypoint,
    ) -> Result<RegenStatus, PlanError> {
        self.state.update_waypoint(index, waypoint)?;
        Ok(self.refresh())
    }

    pub fn remove_waypoints(&mut self, range: Range<usize>) -> Result<RegenStatus, PlanError> {
        self.state.remove_waypoints(range)?;
        Ok(self.refresh())
    }

    pub fn clear(&mut self) -> RegenStatus {
        self.state.clear();
        self.refresh()
    }

    /// Start a new, unbound project from the default configuration.
    pub fn reset(&mut self) -> Result<RegenStatus, PlanError> {
        self.state.reset(self.defaults)?;
        Ok(self.refresh())
    }

    // ---- CONFIGURATION ----

    pub fn set_field(&mut self, field: ConfigField, value: f64) -> Result<RegenStatus, PlanError> {
        self.state.set_field(field, value)?;
        Ok(self.refresh())
    }

    pub fn set_fit_method(&mut self, fit_method: FitMethod) -> RegenStatus {
        self.state.set_fit_method(fit_method);
        self.refresh()
    }

    pub fn set_drive_base(&mut self, drive_base: DriveBase) -> RegenStatus {
        self.state.set_drive_base(drive_base);
        self.refresh()
    }

    /// Convert the project to another unit system.
    pub fn set_units(&mut self, units: Units) -> Result<RegenStatus, PlanError> {
        if units == self.state.units() {
            return Ok(self.status());
        }

        self.state.set_units(units)?;
        Ok(self.refresh())
    }

    // ---- PERSISTENCE ----

    /// Save to `path`, adding the project extension if missing, and bind the
    /// project to the saved file.
    pub fn save_as<P: AsRef<Path>>(&mut self, path: P) -> Result<PathBuf, PlanError> {
        let path = project_file::with_project_extension(path);

        project_file::save(&self.state, &path)?;
        self.state.bind_file(path.clone());

        Ok(path)
    }

    /// Save to the bound project file.
    pub fn save(&self) -> Result<PathBuf, PlanError> {
        let path = self.state.bound_file().ok_or_else(|| {
            IoError::new(
                "save",
                PathBuf::new(),
                io::Error::new(io::ErrorKind::NotFound, "the project isn't bound to a file"),
            )
        })?;

        project_file::save(&self.state, path)?;

        Ok(path.to_path_buf())
    }

    /// Replace the project with the one saved at `path`. On failure the
    /// current project is kept.
    pub fn load<P: AsRef<Path>>(&mut self, path: P) -> Result<RegenStatus, PlanError> {
        let state = project_file::load(path.as_ref())?;
        Ok(self.replace(state))
    }

    /// Replace the project with the contents of a legacy `.bot` file whose
    /// lengths are in `units`. The new project isn't bound to any file.
    pub fn import_bot<P: AsRef<Path>>(
        &mut self,
        path: P,
        units: Units,
    ) -> Result<RegenStatus, PlanError> {
        let state = bot_file::import(path.as_ref(), units)?;
        Ok(self.replace(state))
    }

    /// Export the current trajectories next to `base`.
    pub fn export<P: AsRef<Path>>(
        &self,
        base: P,
        format: ExportFormat,
    ) -> Result<Vec<PathBuf>, PlanError> {
        Ok(export::export(self.trajectories(), base.as_ref(), format)?)
    }

    // ---- PRIVATE ----

    fn replace(&mut self, state: ProjectState) -> RegenStatus {
        // Cached trajectories belong to the previous project
        self.orchestrator.invalidate();
        self.state = state;
        self.refresh()
    }

    /// Regenerate after an accepted edit.
    fn refresh(&mut self) -> RegenStatus {
        match self.orchestrator.regenerate(&self.state) {
            Ok(Freshness::Fresh) => RegenStatus::Fresh,
            Ok(Freshness::Stale) => RegenStatus::Stale,
            Err(e) => {
                warn!("Edit accepted but trajectories could not be generated: {}", e);
                RegenStatus::Failed(e)
            }
        }
    }

    fn status(&self) -> RegenStatus {
        debug!("Project unchanged");

        match self.freshness() {
            Freshness::Fresh => RegenStatus::Fresh,
            Freshness::Stale => RegenStatus::Stale,
        }
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    fn planner_with_path() -> Planner {
        let mut p = Planner::new(ProjectConfig::default()).unwrap();
        assert_eq!(
            p.add_waypoint(Waypoint::new(0.0, 0.0, 0.0).unwrap()),
            RegenStatus::Stale
        );
        assert_eq!(
            p.add_waypoint(Waypoint::new(4.0, 4.0, 0.0).unwrap()),
            RegenStatus::Fresh
        );
        p
    }

    #[test]
    fn test_edits_regenerate() {
        let mut p = planner_with_path();
        let before = p.trajectories().unwrap().source.duration_s();

        assert_eq!(
            p.set_field(ConfigField::MaxVelocity, 2.0).unwrap(),
            RegenStatus::Fresh
        );
        assert!(p.trajectories().unwrap().source.duration_s() > before);

        assert_eq!(p.remove_waypoints(1..2).unwrap(), RegenStatus::Stale);
        assert!(p.trajectories().is_none());
    }

    #[test]
    fn test_rejected_edit_keeps_everything() {
        let mut p = planner_with_path();
        let state = p.state().clone();

        assert!(matches!(
            p.set_field(ConfigField::MaxJerk, 0.0),
            Err(PlanError::Validation(_))
        ));
        assert!(matches!(
            p.remove_waypoints(2..1),
            Err(PlanError::Range(_))
        ));

        assert_eq!(p.state(), &state);
        assert_eq!(p.freshness(), Freshness::Fresh);
    }

    #[test]
    fn test_infeasible_edit_is_applied() {
        let mut p = planner_with_path();

        let status = p.add_waypoint(Waypoint::new(4.0, 4.0, 1.0).unwrap());
        assert_eq!(
            status,
            RegenStatus::Failed(GenerationError::DegenerateWaypoints(1, 2))
        );
        assert_eq!(p.state().waypoints().len(), 3);
        assert!(p.trajectories().is_none());
        assert!(matches!(p.regenerate(), Err(PlanError::Generation(_))));
    }

    #[test]
    fn test_swerve_and_units() {
        let mut p = planner_with_path();

        p.set_field(ConfigField::WheelBaseDepth, 2.0).unwrap();
        assert_eq!(p.set_drive_base(DriveBase::Swerve), RegenStatus::Fresh);
        assert!(p.trajectories().unwrap().back_right().is_some());

        let revision = p.state().revision();
        assert_eq!(p.set_units(Units::Imperial).unwrap(), RegenStatus::Fresh);
        assert_eq!(p.state().revision(), revision);

        assert_eq!(p.set_units(Units::Metric).unwrap(), RegenStatus::Fresh);
        assert_eq!(p.state().config().track_width, 0.4462);
    }

    #[test]
    fn test_save_requires_binding() {
        let dir = tempfile::tempdir().unwrap();
        let mut p = planner_with_path();

        match p.save() {
            Err(PlanError::Io(e)) => assert_eq!(e.kind(), io::ErrorKind::NotFound),
            other => panic!("expected an IO failure, got {:?}", other),
        }

        let path = p.save_as(dir.path().join("auto")).unwrap();
        assert_eq!(path, dir.path().join("auto.xml"));
        assert_eq!(p.state().bound_file(), Some(path.as_path()));
        assert_eq!(p.save().unwrap(), path);
    }

    #[test]
    fn test_reset() {
        let mut p = planner_with_path();
        p.set_fit_method(FitMethod::Quintic);

        assert_eq!(p.reset().unwrap(), RegenStatus::Stale);
        assert!(p.state().waypoints().is_empty());
        assert_eq!(p.state().config(), &ProjectConfig::default());
    }
}
