//! Legacy `.bot` import
//!
//! A `.bot` file starts with seven header lines, one value each: time step,
//! max velocity, max acceleration, max jerk, track width, wheel base depth and
//! fit method. Every following line is a waypoint `x, y, angle` with the angle
//! in degrees. The unit system isn't recorded and must be supplied.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::info;
use std::path::Path;

use super::{read_text, ParseError, PersistError};
use crate::project::{ConfigField, DriveBase, FitMethod, ProjectConfig, ProjectState, Waypoint};
use crate::units::Units;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Number of header lines at the top of a `.bot` file.
pub const HEADER_LINES: usize = 7;

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Import a `.bot` file whose lengths are in `units`.
///
/// The returned project is not bound to any file.
pub fn import(path: &Path, units: Units) -> Result<ProjectState, PersistError> {
    let state = parse(&read_text(path)?, units)?;

    info!(
        "Imported {} waypoints from {} as {}",
        state.waypoints().len(),
        path.display(),
        units
    );

    Ok(state)
}

/// Parse the contents of a `.bot` file.
pub fn parse(text: &str, units: Units) -> Result<ProjectState, ParseError> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let lines: Vec<&str> = text.lines().collect();
    if lines.len() < HEADER_LINES {
        return Err(ParseError::TooFewHeaderLines {
            expected: HEADER_LINES,
            found: lines.len(),
        });
    }

    // Header values are taken by absolute value
    let mut values = [0f64; 6];
    for (value, (field, line)) in values
        .iter_mut()
        .zip(ConfigField::ALL.iter().zip(lines.iter()))
    {
        *value = line
            .trim()
            .parse::<f64>()
            .map_err(|_| ParseError::InvalidNumber {
                field: field.name(),
                value: line.to_string(),
            })?
            .abs();
    }

    let fit_method: FitMethod = lines[HEADER_LINES - 1].parse()?;

    let config = ProjectConfig {
        time_step_s: values[0],
        max_velocity: values[1],
        max_acceleration: values[2],
        max_jerk: values[3],
        track_width: values[4],
        wheel_base_depth: values[5],
        fit_method,
        drive_base: if values[5] > 0.0 {
            DriveBase::Swerve
        } else {
            DriveBase::Tank
        },
        units,
    };

    let mut waypoints = Vec::with_capacity(lines.len() - HEADER_LINES);
    for (i, line) in lines.iter().enumerate().skip(HEADER_LINES) {
        if line.trim().is_empty() {
            continue;
        }
        waypoints.push(parse_waypoint(line).ok_or_else(|| ParseError::InvalidWaypointLine {
            line: i + 1,
            content: line.to_string(),
        })??);
    }

    Ok(ProjectState::from_parts(config, waypoints)?)
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Parse an `x, y, degrees` line, `None` if it doesn't have that shape.
fn parse_waypoint(line: &str) -> Option<Result<Waypoint, ParseError>> {
    let mut nums = [0f64; 3];
    let mut parts = line.split(',');

    for n in nums.iter_mut() {
        *n = parts.next()?.trim().parse().ok()?;
    }
    if parts.next().is_some() {
        return None;
    }

    Some(Waypoint::from_degrees(nums[0], nums[1], nums[2]).map_err(ParseError::from))
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    const TANK_BOT: &str = "0.05\n4\n3\n60\n1.464\n0\nCUBIC\n0,0,0\n4,4,0\n";

    #[test]
    fn test_parse_tank() {
        let state = parse(TANK_BOT, Units::Metric).unwrap();
        let config = state.config();

        assert_eq!(config.time_step_s, 0.05);
        assert_eq!(config.max_jerk, 60.0);
        assert_eq!(config.track_width, 1.464);
        assert_eq!(config.drive_base, DriveBase::Tank);
        assert_eq!(config.fit_method, FitMethod::Cubic);
        assert_eq!(config.units, Units::Metric);
        assert_eq!(
            state.waypoints(),
            &[
                Waypoint::new(0.0, 0.0, 0.0).unwrap(),
                Waypoint::new(4.0, 4.0, 0.0).unwrap()
            ]
        );
        assert!(state.bound_file().is_none());
    }

    #[test]
    fn test_parse_swerve_variants() {
        let text = "-0.02\n 5.5 \n-2\n40\n2\n1.5\nquintic\n\n1, 2, 90\n\n3,4,-45\n";
        let state = parse(text, Units::Imperial).unwrap();
        let config = state.config();

        assert_eq!(config.time_step_s, 0.02);
        assert_eq!(config.max_velocity, 5.5);
        assert_eq!(config.max_acceleration, 2.0);
        assert_eq!(config.drive_base, DriveBase::Swerve);
        assert_eq!(config.fit_method, FitMethod::Quintic);

        let w = state.waypoints();
        assert_eq!(w.len(), 2);
        assert!((w[0].heading_rad() - std::f64::consts::FRAC_PI_2).abs() < 1e-12);
        assert!((w[1].heading_rad() + std::f64::consts::FRAC_PI_4).abs() < 1e-12);

        // Prefixed fit method names are accepted too
        let prefixed = TANK_BOT.replace("CUBIC", "hermite_quintic");
        assert_eq!(
            parse(&prefixed, Units::Imperial).unwrap().config().fit_method,
            FitMethod::Quintic
        );
    }

    #[test]
    fn test_parse_failures() {
        assert_eq!(
            parse("0.05\n4\n3\n", Units::Imperial).unwrap_err(),
            ParseError::TooFewHeaderLines {
                expected: 7,
                found: 3
            }
        );
        assert!(matches!(
            parse(&TANK_BOT.replace("60", "sixty"), Units::Imperial),
            Err(ParseError::InvalidNumber {
                field: "max jerk",
                ..
            })
        ));
        assert!(matches!(
            parse(&TANK_BOT.replace("CUBIC", "LINEAR"), Units::Imperial),
            Err(ParseError::UnknownVariant(_))
        ));
        assert_eq!(
            parse(&TANK_BOT.replace("4,4,0", "4;4;0"), Units::Imperial).unwrap_err(),
            ParseError::InvalidWaypointLine {
                line: 9,
                content: "4;4;0".into()
            }
        );
        assert!(matches!(
            parse(&TANK_BOT.replace("4,4,0", "4,4,0,1"), Units::Imperial),
            Err(ParseError::InvalidWaypointLine { .. })
        ));

        // Zero limits survive the absolute value but not validation
        assert!(matches!(
            parse(&TANK_BOT.replacen("4\n", "0\n", 1), Units::Imperial),
            Err(ParseError::OutOfRange(_))
        ));
    }

    #[test]
    fn test_import_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("robot.bot");
        std::fs::write(&path, TANK_BOT).unwrap();

        let state = import(&path, Units::Imperial).unwrap();
        assert_eq!(state.waypoints().len(), 2);

        assert!(matches!(
            import(&dir.path().join("missing.bot"), Units::Imperial),
            Err(PersistError::Io(_))
        ));

        // Undecodable content is a parse failure, not an IO one
        let bad = dir.path().join("bad.bot");
        let mut bytes = TANK_BOT.as_bytes().to_vec();
        bytes.insert(TANK_BOT.find("4,4,0").unwrap(), 0xff);
        std::fs::write(&bad, bytes).unwrap();
        assert!(matches!(
            import(&bad, Units::Imperial),
            Err(PersistError::Parse(ParseError::NotUtf8 { .. }))
        ));
    }

    #[test]
    fn test_leading_byte_order_mark() {
        let with_bom = format!("\u{feff}{}", TANK_BOT);
        let state = parse(&with_bom, Units::Imperial).unwrap();

        assert_eq!(state, parse(TANK_BOT, Units::Imperial).unwrap());
    }
}
