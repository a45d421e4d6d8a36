//! CSV archiving functionality
//!
//! An `Archiver` writes a header row followed by one row per serialised
//! record to any writer.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External imports
use csv::{Writer, WriterBuilder};
use serde::Serialize;
use std::io::Write;
use thiserror::Error;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// An object used to write CSV archive files.
pub struct Archiver<W: Write> {
    writer: Writer<W>,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors that can occur while archiving.
#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("Cannot serialise a record: {0}")]
    SerialiseError(csv::Error),

    #[error("Cannot flush the archive: {0}")]
    FlushError(std::io::Error),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl<W: Write> Archiver<W> {
    /// Create a new archiver around an existing writer.
    pub fn from_writer(writer: W) -> Self {
        let w = WriterBuilder::new()
            .has_headers(true)
            .from_writer(writer);

        Self { writer: w }
    }

    /// Serialise a record into the archive.
    ///
    /// The header row is derived from the first record's field names.
    pub fn serialise<T: Serialize>(&mut self, record: T) -> Result<(), ArchiveError> {
        self.writer
            .serialize(record)
            .map_err(ArchiveError::SerialiseError)
    }

    /// Flush all records and return the inner writer.
    pub fn finish(self) -> Result<W, ArchiveError> {
        self.writer
            .into_inner()
            .map_err(|e| ArchiveError::FlushError(e.into_error()))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[derive(Serialize)]
    struct Row {
        time_s: f64,
        value: f64,
    }

    #[test]
    fn test_archive_to_vec() {
        let mut arch = Archiver::from_writer(Vec::new());
        arch.serialise(Row { time_s: 0.0, value: 1.5 }).unwrap();
        arch.serialise(Row { time_s: 0.1, value: -2.0 }).unwrap();

        let out = String::from_utf8(arch.finish().unwrap()).unwrap();
        assert_eq!(out, "time_s,value\n0.0,1.5\n0.1,-2.0\n");
    }
}
