//! # Persistence
//!
//! Reading and writing projects and trajectories:
//!
//! - [`project_file`] saves and loads XML project files,
//! - [`bot_file`] imports legacy `.bot` files,
//! - [`export`] writes generated trajectories as CSV or binary files.
//!
//! Every write goes to a temporary file in the destination directory which
//! is only renamed over the target once completely written, so a failed
//! write never leaves a partial file behind.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

pub mod bot_file;
pub mod export;
pub mod project_file;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::trace;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use thiserror::Error;

use crate::project::{UnknownVariantError, ValidationError};
use crate::traj::GenerationError;
use crate::units::UnknownUnitsError;

pub use export::ExportFormat;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A filesystem operation failed.
#[derive(Debug, Error)]
#[error("Cannot {action} {}: {source}", .path.display())]
pub struct IoError {
    pub action: &'static str,
    pub path: PathBuf,
    #[source]
    pub source: io::Error,
}

/// A fully written temporary file waiting to be moved onto its target.
#[derive(Debug)]
pub(crate) struct StagedFile {
    file: NamedTempFile,
    target: PathBuf,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// The contents of a file could not be understood.
#[derive(Debug, PartialEq, Error)]
pub enum ParseError {
    #[error("The file is not valid UTF-8 text (byte {position})")]
    NotUtf8 { position: usize },

    #[error("Malformed XML at byte {position}: {message}")]
    Xml { position: usize, message: String },

    #[error("The project file has no root element")]
    MissingRoot,

    #[error("Expected a <{expected}> element, found <{found}>")]
    UnexpectedElement { expected: &'static str, found: String },

    #[error("The file ends inside an unclosed element")]
    Unclosed,

    #[error("The {0:?} attribute is missing")]
    MissingAttribute(&'static str),

    #[error("Waypoint {index} has no <{element}> value")]
    MissingElement { index: usize, element: &'static str },

    #[error("The {field} value {value:?} is not a number")]
    InvalidNumber { field: &'static str, value: String },

    #[error(transparent)]
    UnknownVariant(#[from] UnknownVariantError),

    #[error(transparent)]
    UnknownUnits(#[from] UnknownUnitsError),

    #[error("Invalid value: {0}")]
    OutOfRange(#[from] ValidationError),

    #[error("Expected {expected} header lines, found {found}")]
    TooFewHeaderLines { expected: usize, found: usize },

    #[error("Line {line} should hold \"x, y, angle\", found {content:?}")]
    InvalidWaypointLine { line: usize, content: String },

    #[error("Expected {expected} bytes of trajectory data, found {found}")]
    Truncated { expected: usize, found: usize },
}

/// Everything that can go wrong while persisting.
#[derive(Debug, Error)]
pub enum PersistError {
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

impl IoError {
    pub fn new<P: Into<PathBuf>>(action: &'static str, path: P, source: io::Error) -> Self {
        Self {
            action,
            path: path.into(),
            source,
        }
    }

    pub fn kind(&self) -> io::ErrorKind {
        self.source.kind()
    }
}

impl StagedFile {
    /// Write a temporary file next to `target` using the given function.
    pub(crate) fn write<F>(target: &Path, write: F) -> Result<Self, IoError>
    where
        F: FnOnce(&mut NamedTempFile) -> io::Result<()>,
    {
        let dir = match target.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };

        fs::create_dir_all(&dir).map_err(|e| IoError::new("create directory", &dir, e))?;

        let mut file =
            NamedTempFile::new_in(&dir).map_err(|e| IoError::new("create a file in", &dir, e))?;

        write(&mut file).map_err(|e| IoError::new("write", target, e))?;

        trace!("Staged {:?} for {:?}", file.path(), target);

        Ok(Self {
            file,
            target: target.to_path_buf(),
        })
    }

    /// Move the temporary file onto the target, replacing any existing file.
    pub(crate) fn commit(self) -> Result<PathBuf, IoError> {
        let target = self.target;

        self.file
            .as_file()
            .sync_all()
            .map_err(|e| IoError::new("write", &target, e))?;
        self.file
            .persist(&target)
            .map_err(|e| IoError::new("replace", &target, e.error))?;

        Ok(target)
    }
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Replace the file at `path` with the output of `write`, or leave it
/// untouched if anything fails.
pub(crate) fn write_atomic<F>(path: &Path, write: F) -> Result<(), IoError>
where
    F: FnOnce(&mut NamedTempFile) -> io::Result<()>,
{
    StagedFile::write(path, write)?.commit().map(|_| ())
}

/// Read a whole text file.
///
/// Filesystem errors are reported as [`IoError`]s, content which is not UTF-8
/// as [`ParseError::NotUtf8`].
pub(crate) fn read_text(path: &Path) -> Result<String, PersistError> {
    let bytes = fs::read(path).map_err(|e| IoError::new("read", path, e))?;

    String::from_utf8(bytes).map_err(|e| {
        ParseError::NotUtf8 {
            position: e.utf8_error().valid_up_to(),
        }
        .into()
    })
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_write_atomic_replaces() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("out.txt");

        write_atomic(&path, |f| f.write_all(b"first")).unwrap();
        write_atomic(&path, |f| f.write_all(b"second")).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "second");
    }

    #[test]
    fn test_failed_write_keeps_original() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.txt");
        fs::write(&path, "original").unwrap();

        let err = write_atomic(&path, |f| {
            f.write_all(b"partial")?;
            Err(io::Error::new(io::ErrorKind::Other, "disk full"))
        })
        .unwrap_err();

        assert_eq!(err.kind(), io::ErrorKind::Other);
        assert_eq!(fs::read_to_string(&path).unwrap(), "original");

        // No temporary files left behind
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_read_missing() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_text(&dir.path().join("nope.xml")).unwrap_err();

        match err {
            PersistError::Io(e) => assert_eq!(e.kind(), io::ErrorKind::NotFound),
            other => panic!("expected an IO error, got {:?}", other),
        }
    }

    #[test]
    fn test_read_invalid_utf8() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.txt");
        fs::write(&path, b"ok\xffrest").unwrap();

        match read_text(&path) {
            Err(PersistError::Parse(e)) => assert_eq!(e, ParseError::NotUtf8 { position: 2 }),
            other => panic!("expected a parse error, got {:?}", other),
        }
    }
}
