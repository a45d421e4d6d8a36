//! XML project files
//!
//! A project file holds the configuration as attributes of a `Trajectory`
//! root element, followed by one `Waypoint` element per waypoint:
//!
//! ```xml
//! <?xml version="1.0" encoding="UTF-8"?>
//! <Trajectory dt="0.05" velocity="4" acceleration="3" jerk="60" wheelBaseW="1.464"
//!     wheelBaseD="0" fitMethod="HERMITE_CUBIC" driveBase="TANK" units="IMPERIAL">
//!     <Waypoint>
//!         <X>0</X>
//!         <Y>0</Y>
//!         <Angle>0</Angle>
//!     </Waypoint>
//! </Trajectory>
//! ```
//!
//! Angles are in radians.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::info;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use std::ffi::OsString;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use super::{read_text, write_atomic, ParseError, PersistError};
use crate::project::{ProjectConfig, ProjectState, Waypoint};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Extension of project files.
pub const PROJECT_EXTENSION: &str = "xml";

const ROOT: &str = "Trajectory";
const WAYPOINT: &str = "Waypoint";

/// Waypoint child elements, in the order they are written.
const COMPONENTS: [&str; 3] = ["X", "Y", "Angle"];

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// `path` with the project extension appended if it doesn't already have it.
pub fn with_project_extension<P: AsRef<Path>>(path: P) -> PathBuf {
    let path = path.as_ref();

    match path.extension() {
        Some(ext) if ext.eq_ignore_ascii_case(PROJECT_EXTENSION) => path.to_path_buf(),
        _ => {
            let mut name = OsString::from(path.as_os_str());
            name.push(".");
            name.push(PROJECT_EXTENSION);
            PathBuf::from(name)
        }
    }
}

/// Save the project to `path`, replacing any existing file.
pub fn save(state: &ProjectState, path: &Path) -> Result<(), PersistError> {
    write_atomic(path, |f| write_project(state, f))?;

    info!(
        "Saved {} waypoints to {}",
        state.waypoints().len(),
        path.display()
    );

    Ok(())
}

/// Load a project from `path`. The returned project is bound to `path`.
pub fn load(path: &Path) -> Result<ProjectState, PersistError> {
    let text = read_text(path)?;
    let mut state = from_xml(&text)?;
    state.bind_file(path);

    info!(
        "Loaded {} waypoints from {}",
        state.waypoints().len(),
        path.display()
    );

    Ok(state)
}

/// Serialise a project into a project file document.
pub fn to_xml(state: &ProjectState) -> io::Result<String> {
    let mut buf = Vec::new();
    write_project(state, &mut buf)?;

    String::from_utf8(buf).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

/// Parse a project file document into an unbound project.
pub fn from_xml(text: &str) -> Result<ProjectState, ParseError> {
    let mut reader = Reader::from_str(text);
    reader.trim_text(true);

    let mut config: Option<ProjectConfig> = None;
    let mut waypoints = Vec::new();

    // Components of the waypoint being read, and the component element
    // currently open
    let mut current: Option<[Option<f64>; 3]> = None;
    let mut component: Option<usize> = None;

    let mut depth = 0usize;

    loop {
        let event = reader.read_event().map_err(|e| ParseError::Xml {
            position: reader.buffer_position(),
            message: e.to_string(),
        })?;

        match event {
            Event::Start(ref e) | Event::Empty(ref e) => {
                let is_empty = matches!(event, Event::Empty(_));
                depth += 1;

                match depth {
                    1 => {
                        if config.is_some() {
                            return Err(unexpected(ROOT, e));
                        }
                        if e.name().as_ref() != ROOT.as_bytes() {
                            return Err(unexpected(ROOT, e));
                        }
                        config = Some(parse_config(e)?);
                    }
                    2 if e.name().as_ref() == WAYPOINT.as_bytes() => {
                        current = Some([None; 3]);
                    }
                    3 if current.is_some() => {
                        component = COMPONENTS
                            .iter()
                            .position(|c| e.name().as_ref() == c.as_bytes());
                    }
                    _ => (),
                }

                if is_empty {
                    close(depth, &mut current, &mut component, &mut waypoints)?;
                    depth -= 1;
                }
            }
            Event::End(_) => {
                close(depth, &mut current, &mut component, &mut waypoints)?;
                depth = depth.saturating_sub(1);
            }
            Event::Text(t) => {
                if let (Some(values), Some(idx)) = (current.as_mut(), component) {
                    let raw = t.unescape().map_err(|e| ParseError::Xml {
                        position: reader.buffer_position(),
                        message: e.to_string(),
                    })?;
                    values[idx] = Some(parse_number(COMPONENTS[idx], &raw)?);
                }
            }
            Event::Eof => break,
            _ => (),
        }
    }

    if depth != 0 {
        return Err(ParseError::Unclosed);
    }

    let config = config.ok_or(ParseError::MissingRoot)?;

    Ok(ProjectState::from_parts(config, waypoints)?)
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

fn write_project<W: Write>(state: &ProjectState, inner: W) -> io::Result<()> {
    let config = state.config();
    let mut writer = Writer::new_with_indent(inner, b' ', 4);

    let mut root = BytesStart::new(ROOT);
    let attrs = [
        ("dt", config.time_step_s.to_string()),
        ("velocity", config.max_velocity.to_string()),
        ("acceleration", config.max_acceleration.to_string()),
        ("jerk", config.max_jerk.to_string()),
        ("wheelBaseW", config.track_width.to_string()),
        ("wheelBaseD", config.wheel_base_depth.to_string()),
        ("fitMethod", config.fit_method.file_name().to_string()),
        ("driveBase", config.drive_base.to_string()),
        ("units", config.units.to_string()),
    ];
    for (key, value) in attrs.iter() {
        root.push_attribute((*key, value.as_str()));
    }

    write_event(&mut writer, Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    write_event(&mut writer, Event::Start(root))?;

    for w in state.waypoints() {
        write_event(&mut writer, Event::Start(BytesStart::new(WAYPOINT)))?;

        for (name, value) in COMPONENTS.iter().zip(&[w.x(), w.y(), w.heading_rad()]) {
            write_event(&mut writer, Event::Start(BytesStart::new(*name)))?;
            write_event(&mut writer, Event::Text(BytesText::new(&value.to_string())))?;
            write_event(&mut writer, Event::End(BytesEnd::new(*name)))?;
        }

        write_event(&mut writer, Event::End(BytesEnd::new(WAYPOINT)))?;
    }

    write_event(&mut writer, Event::End(BytesEnd::new(ROOT)))?;

    let mut inner = writer.into_inner();
    inner.write_all(b"\n")?;
    inner.flush()
}

fn write_event<W: Write>(writer: &mut Writer<W>, event: Event) -> io::Result<()> {
    writer
        .write_event(event)
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))
}

/// Handle the end of an element at the given depth.
fn close(
    depth: usize,
    current: &mut Option<[Option<f64>; 3]>,
    component: &mut Option<usize>,
    waypoints: &mut Vec<Waypoint>,
) -> Result<(), ParseError> {
    match depth {
        3 => *component = None,
        2 => {
            if let Some(values) = current.take() {
                let index = waypoints.len();
                let get = |i: usize| {
                    values[i].ok_or(ParseError::MissingElement {
                        index,
                        element: COMPONENTS[i],
                    })
                };

                waypoints.push(Waypoint::new(get(0)?, get(1)?, get(2)?)?);
            }
        }
        _ => (),
    }

    Ok(())
}

fn parse_config(root: &BytesStart) -> Result<ProjectConfig, ParseError> {
    let mut attrs = Vec::new();
    for attr in root.attributes() {
        let attr = attr.map_err(|e| ParseError::Xml {
            position: 0,
            message: e.to_string(),
        })?;
        let value = attr.unescape_value().map_err(|e| ParseError::Xml {
            position: 0,
            message: e.to_string(),
        })?;

        attrs.push((
            String::from_utf8_lossy(attr.key.as_ref()).into_owned(),
            value.into_owned(),
        ));
    }

    let get = |name: &'static str| {
        attrs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
            .ok_or(ParseError::MissingAttribute(name))
    };
    let number = |name: &'static str| get(name).and_then(|v| parse_number(name, v));

    let config = ProjectConfig {
        time_step_s: number("dt")?,
        max_velocity: number("velocity")?,
        max_acceleration: number("acceleration")?,
        max_jerk: number("jerk")?,
        track_width: number("wheelBaseW")?,
        wheel_base_depth: number("wheelBaseD")?,
        fit_method: get("fitMethod")?.parse()?,
        drive_base: get("driveBase")?.parse()?,
        units: get("units")?.parse()?,
    };
    config.validate()?;

    Ok(config)
}

fn parse_number(field: &'static str, value: &str) -> Result<f64, ParseError> {
    value.trim().parse().map_err(|_| ParseError::InvalidNumber {
        field,
        value: value.to_string(),
    })
}

fn unexpected(expected: &'static str, found: &BytesStart) -> ParseError {
    ParseError::UnexpectedElement {
        expected,
        found: String::from_utf8_lossy(found.name().as_ref()).into_owned(),
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
