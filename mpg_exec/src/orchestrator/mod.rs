//! # Trajectory orchestrator
//!
//! Turns a [`ProjectState`] into a generation request, runs the engine and
//! the kinematics modifier, and caches the resulting [`TrajectorySet`].
//!
//! The cache keeps the waypoints and configuration it was generated from,
//! together with the revision of that state. A cached set is only served for
//! a state whose revision and inputs both match, so neither a mutation nor a
//! different project with the same edit count can see it.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::{debug, info, warn};

use crate::project::{DriveBase, ProjectConfig, ProjectState, Waypoint};
use crate::traj::{
    GenRequest, GenerationError, HermiteEngine, KinematicsModifier, TrajectoryEngine,
    TrajectorySet, WheelModifier, WheelTrajectories,
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Generates and caches the trajectories of a project.
#[derive(Debug, Default)]
pub struct TrajOrchestrator<E = HermiteEngine, M = WheelModifier> {
    engine: E,
    modifier: M,
    cache: Option<Cache>,
}

#[derive(Debug)]
struct Cache {
    revision: u64,
    config: ProjectConfig,
    waypoints: Vec<Waypoint>,
    set: TrajectorySet,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Whether the cached trajectories match the current project.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freshness {
    /// There are no trajectories for the current project.
    Stale,

    /// The cached trajectories were generated from the current project.
    Fresh,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl TrajOrchestrator {
    /// Orchestrator using the built in engine and modifier.
    pub fn new() -> Self {
        Self::default()
    }
}

impl<E, M> TrajOrchestrator<E, M>
where
    E: TrajectoryEngine,
    M: KinematicsModifier,
{
    pub fn with_collaborators(engine: E, modifier: M) -> Self {
        Self {
            engine,
            modifier,
            cache: None,
        }
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn modifier(&self) -> &M {
        &self.modifier
    }

    /// Drop any cached trajectories.
    pub fn invalidate(&mut self) {
        if self.cache.take().is_some() {
            debug!("Cached trajectories discarded");
        }
    }

    /// Freshness of the cache with respect to `state`.
    pub fn state(&self, state: &ProjectState) -> Freshness {
        match self.trajectories(state) {
            Some(_) => Freshness::Fresh,
            None => Freshness::Stale,
        }
    }

    /// The cached trajectories, if they were generated from `state`.
    pub fn trajectories(&self, state: &ProjectState) -> Option<&TrajectorySet> {
        self.cache
            .as_ref()
            .filter(|c| c.matches(state))
            .map(|c| &c.set)
    }

    /// Regenerate every trajectory from scratch.
    ///
    /// With fewer than two waypoints nothing is generated and the
    /// orchestrator is left stale. On failure no trajectories are kept.
    pub fn regenerate(&mut self, state: &ProjectState) -> Result<Freshness, GenerationError> {
        self.invalidate();

        let waypoints = state.waypoints();
        if waypoints.len() < 2 {
            debug!(
                "{} waypoint(s), not enough to generate trajectories",
                waypoints.len()
            );
            return Ok(Freshness::Stale);
        }

        let config = state.config();
        let request = GenRequest::from_config(config);

        info!(
            "Generating {} trajectories through {} waypoints",
            config.drive_base,
            waypoints.len()
        );

        let set = self.build(state, &request).map_err(|e| {
            warn!("Trajectory generation failed: {}", e);
            e
        })?;

        info!(
            "Generated {} samples over {:.3} s",
            set.source.len(),
            set.source.duration_s()
        );

        self.cache = Some(Cache {
            revision: state.revision(),
            config: *config,
            waypoints: waypoints.to_vec(),
            set,
        });

        Ok(Freshness::Fresh)
    }

    fn build(
        &self,
        state: &ProjectState,
        request: &GenRequest,
    ) -> Result<TrajectorySet, GenerationError> {
        let config = state.config();
        let source = self.engine.generate(state.waypoints(), request)?;

        let wheels = match config.drive_base {
            DriveBase::Tank => {
                WheelTrajectories::Tank(self.modifier.tank(&source, config.track_width)?)
            }
            DriveBase::Swerve => WheelTrajectories::Swerve(self.modifier.swerve(
                &source,
                config.track_width,
                config.wheel_base_depth,
            )?),
        };

        Ok(TrajectorySet { source, wheels })
    }
}

impl Cache {
    fn matches(&self, state: &ProjectState) -> bool {
        self.revision == state.revision()
            && self.config == *state.config()
            && self.waypoints.as_slice() == state.waypoints()
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
