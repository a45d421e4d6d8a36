//! Trajectory export
//!
//! The source trajectory and every wheel trajectory are written to sibling
//! files named `<base>_<suffix>.<ext>`, the suffix being `source`,
//! `left`/`right` for tank drive bases or `fl`/`fr`/`bl`/`br` for swerve.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::convert::TryFrom;
use std::ffi::OsString;
use std::fmt;
use std::fs;
use std::io::{self, BufWriter, Cursor, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use super::{IoError, ParseError, PersistError, StagedFile};
use crate::project::UnknownVariantError;
use crate::traj::{GenerationError, TrajPoint, Trajectory, TrajectorySet};
use util::archive::{ArchiveError, Archiver};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Number of `f64` values stored per sample in binary files.
const BINARY_FIELDS: usize = 8;

/// Size of the sample count at the start of binary files.
const BINARY_HEADER_BYTES: usize = 4;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Format trajectories are exported in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExportFormat {
    /// CSV with a header row and one row per sample.
    Tabular,

    /// Big endian sample count followed by the samples as `f64`s.
    Binary,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl ExportFormat {
    /// File extension of this format.
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Tabular => "csv",
            ExportFormat::Binary => "traj",
        }
    }
}

impl Default for ExportFormat {
    fn default() -> Self {
        ExportFormat::Tabular
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportFormat::Tabular => write!(f, "TABULAR"),
            ExportFormat::Binary => write!(f, "BINARY"),
        }
    }
}

impl FromStr for ExportFormat {
    type Err = UnknownVariantError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "TABULAR" => Ok(ExportFormat::Tabular),
            "BINARY" => Ok(ExportFormat::Binary),
            _ => Err(UnknownVariantError {
                kind: "export format",
                name: s.to_string(),
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Path of the file a trajectory with the given suffix is exported to.
pub fn export_path(base: &Path, suffix: &str, format: ExportFormat) -> PathBuf {
    let mut name = OsString::from(base.as_os_str());
    name.push(format!("_{}.{}", suffix, format.extension()));

    PathBuf::from(name)
}

/// Export every trajectory of the set next to `base`.
///
/// Fails with a generation error if there are no trajectories. All files are
/// fully written before any existing file is replaced. Returns the written
/// paths, source first.
pub fn export(
    set: Option<&TrajectorySet>,
    base: &Path,
    format: ExportFormat,
) -> Result<Vec<PathBuf>, PersistError> {
    let set = set.ok_or(GenerationError::NotGenerated)?;

    let mut files = vec![("source", &set.source)];
    files.extend(set.named_wheels());

    let staged = files
        .into_iter()
        .map(|(suffix, traj)| {
            let path = export_path(base, suffix, format);
            debug!("Writing {} samples to {}", traj.len(), path.display());

            StagedFile::write(&path, |f| match format {
                ExportFormat::Tabular => write_tabular(f, traj),
                ExportFormat::Binary => write_binary(f, traj),
            })
        })
        .collect::<Result<Vec<_>, IoError>>()?;

    let paths = staged
        .into_iter()
        .map(StagedFile::commit)
        .collect::<Result<Vec<_>, IoError>>()?;

    info!(
        "Exported {} {} trajectories to {}",
        paths.len(),
        format,
        base.display()
    );

    Ok(paths)
}

/// Write a trajectory as CSV.
pub fn write_tabular<W: Write>(writer: W, traj: &Trajectory) -> io::Result<()> {
    let mut arch = Archiver::from_writer(writer);

    for point in traj.points() {
        arch.serialise(point).map_err(archive_to_io)?;
    }

    arch.finish().map_err(archive_to_io)?.flush()
}

/// Write a trajectory in the binary format.
pub fn write_binary<W: Write>(writer: W, traj: &Trajectory) -> io::Result<()> {
    let mut w = BufWriter::new(writer);

    let count = u32::try_from(traj.len())
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "too many samples"))?;
    w.write_u32::<BigEndian>(count)?;

    for p in traj.points() {
        for &v in &[
            traj.dt_s(),
            p.x,
            p.y,
            p.position,
            p.velocity,
            p.acceleration,
            p.jerk,
            p.heading_rad,
        ] {
            w.write_f64::<BigEndian>(v)?;
        }
    }

    w.flush()
}

/// Read a trajectory written by [`write_binary`].
///
/// Sample times are rebuilt from the time step. Curvature isn't stored and
/// reads back as zero.
pub fn read_binary(path: &Path) -> Result<Trajectory, PersistError> {
    let bytes = fs::read(path).map_err(|e| IoError::new("read", path, e))?;
    Ok(decode_binary(&bytes)?)
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

fn decode_binary(bytes: &[u8]) -> Result<Trajectory, ParseError> {
    if bytes.len() < BINARY_HEADER_BYTES {
        return Err(ParseError::Truncated {
            expected: BINARY_HEADER_BYTES,
            found: bytes.len(),
        });
    }

    let mut cursor = Cursor::new(bytes);
    let count = cursor.read_u32::<BigEndian>().map_err(|_| ParseError::Truncated {
        expected: BINARY_HEADER_BYTES,
        found: bytes.len(),
    })? as usize;

    let expected = BINARY_HEADER_BYTES + count * BINARY_FIELDS * 8;
    if bytes.len() != expected {
        return Err(ParseError::Truncated {
            expected,
            found: bytes.len(),
        });
    }

    let mut dt_s = 0.0;
    let mut points = Vec::with_capacity(count);
    let mut v = [0f64; BINARY_FIELDS];

    for i in 0..count {
        for value in v.iter_mut() {
            *value = cursor
                .read_f64::<BigEndian>()
                .map_err(|_| ParseError::Truncated {
                    expected,
                    found: bytes.len(),
                })?;
        }

        dt_s = v[0];
        points.push(TrajPoint {
            time_s: i as f64 * dt_s,
            x: v[1],
            y: v[2],
            position: v[3],
            velocity: v[4],
            acceleration: v[5],
            jerk: v[6],
            heading_rad: v[7],
            curvature: 0.0,
        });
    }

    Ok(Trajectory::new(dt_s, points))
}

fn archive_to_io(e: ArchiveError) -> io::Error {
    match e {
        ArchiveError::FlushError(e) => e,
        ArchiveError::SerialiseError(e) => io::Error::new(io::ErrorKind::Other, e.to_string()),
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::traj::{SwerveQuad, TankPair, WheelTrajectories};

    fn traj(n: usize) -> Trajectory {
        let points = (0..n)
            .map(|i| TrajPoint {
                time_s: i as f64 * 0.05,
                x: i as f64,
                y: -(i as f64),
                position: i as f64 * 1.5,
                velocity: 0.25,
                heading_rad: 0.5,
                curvature: 0.125,
                ..TrajPoint::default()
            })
            .collect();

        Trajectory::new(0.05, points)
    }

    fn tank_set() -> TrajectorySet {
        TrajectorySet {
            source: traj(3),
            wheels: WheelTrajectories::Tank(TankPair {
                left: traj(3),
                right: traj(3),
            }),
        }
    }

    #[test]
    fn test_tabular_layout() {
        let mut buf = Vec::new();
        write_tabular(&mut buf, &traj(2)).unwrap();

        let text = String::from_utf8(buf).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("time_s,x,y,position,velocity,acceleration,jerk,heading_rad,curvature")
        );
        assert_eq!(lines.next(), Some("0.0,0.0,-0.0,0.0,0.25,0.0,0.0,0.5,0.125"));
        assert_eq!(lines.count(), 1);
    }

    #[test]
    fn test_binary_layout() {
        let mut buf = Vec::new();
        write_binary(&mut buf, &traj(2)).unwrap();

        assert_eq!(buf.len(), 4 + 2 * 8 * 8);
        assert_eq!(&buf[..4], &[0, 0, 0, 2]);
        assert_eq!(&buf[4..12], &0.05f64.to_be_bytes());

        let back = decode_binary(&buf).unwrap();
        assert_eq!(back.len(), 2);
        assert_eq!(back.points()[1].x, 1.0);
        assert_eq!(back.points()[1].time_s, 0.05);
        assert_eq!(back.points()[1].curvature, 0.0);

        assert!(matches!(
            decode_binary(&buf[..buf.len() - 1]),
            Err(ParseError::Truncated { .. })
        ));
        assert!(decode_binary(&[0, 1]).is_err());
    }

    #[test]
    fn test_export_tank() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("out").join("auto");

        let paths = export(Some(&tank_set()), &base, ExportFormat::Tabular).unwrap();
        let names: Vec<_> = paths
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();

        assert_eq!(names, ["auto_source.csv", "auto_left.csv", "auto_right.csv"]);
        assert!(paths.iter().all(|p| p.exists()));
    }

    #[test]
    fn test_export_swerve_binary() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("auto");
        let set = TrajectorySet {
            source: traj(4),
            wheels: WheelTrajectories::Swerve(SwerveQuad {
                front_left: traj(4),
                front_right: traj(4),
                back_left: traj(4),
                back_right: traj(4),
            }),
        };

        let paths = export(Some(&set), &base, ExportFormat::Binary).unwrap();
        assert_eq!(paths.len(), 5);
        assert_eq!(paths[4], dir.path().join("auto_br.traj"));

        let back = read_binary(&paths[0]).unwrap();
        assert_eq!(back.len(), 4);
        assert_eq!(back.points()[3].position, 4.5);
    }

    #[test]
    fn test_export_requires_trajectories() {
        let dir = tempfile::tempdir().unwrap();

        assert!(matches!(
            export(None, &dir.path().join("auto"), ExportFormat::Tabular),
            Err(PersistError::Generation(GenerationError::NotGenerated))
        ));
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_format_names() {
        assert_eq!("binary".parse::<ExportFormat>().unwrap(), ExportFormat::Binary);
        assert_eq!(ExportFormat::Tabular.to_string(), "TABULAR");
        assert!("xlsx".parse::<ExportFormat>().is_err());
    }
}
