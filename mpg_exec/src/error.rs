//! # Planner errors
//!
//! Every failure a planner operation can report, one variant per kind so
//! callers can tell a rejected edit from a failed file operation.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use thiserror::Error;

use crate::persist::{IoError, ParseError, PersistError};
use crate::project::{RangeError, ValidationError};
use crate::traj::GenerationError;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum PlanError {
    #[error("Validation failure: {0}")]
    Validation(#[from] ValidationError),

    #[error("Range error: {0}")]
    Range(#[from] RangeError),

    #[error("Parse failure: {0}")]
    Parse(#[from] ParseError),

    #[error("IO failure: {0}")]
    Io(#[from] IoError),

    #[error("Generation failure: {0}")]
    Generation(#[from] GenerationError),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl From<PersistError> for PlanError {
    fn from(e: PersistError) -> Self {
        match e {
            PersistError::Parse(e) => PlanError::Parse(e),
            PersistError::Io(e) => PlanError::Io(e),
            PersistError::Generation(e) => PlanError::Generation(e),
        }
    }
}
