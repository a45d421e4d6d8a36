//! End to end planner scenarios.

use std::fs;

use mpg_lib::{
    orchestrator::Freshness,
    persist::{export::read_binary, ExportFormat, ParseError},
    project::{DriveBase, FitMethod, ProjectConfig, Waypoint},
    units::Units,
    PlanError, Planner, RegenStatus,
};

const SCENARIO_BOT: &str = "0.05\n4\n3\n60\n1.464\n0\nCUBIC\n0,0,0\n4,4,0\n";

fn scenario_planner() -> Planner {
    let mut planner = Planner::new(ProjectConfig::default()).unwrap();
    planner.add_waypoint(Waypoint::new(0.0, 0.0, 0.0).unwrap());
    planner.add_waypoint(Waypoint::new(4.0, 4.0, 0.0).unwrap());
    planner
}

#[test]
fn default_scenario_generates_tank_trajectories() {
    let planner = scenario_planner();
    assert_eq!(planner.freshness(), Freshness::Fresh);

    let set = planner.trajectories().unwrap();
    let points = set.source.points();

    assert!(!points.is_empty());
    assert_eq!(points[0].time_s, 0.0);
    assert!(points.windows(2).all(|p| p[1].time_s > p[0].time_s));

    assert_eq!(set.front_left().len(), points.len());
    assert_eq!(set.front_right().len(), points.len());
    assert!(set.back_left().is_none());
    assert!(set.back_right().is_none());
}

#[test]
fn bot_import_matches_default_scenario() {
    let dir = tempfile::tempdir().unwrap();
    let bot = dir.path().join("robot.bot");
    fs::write(&bot, SCENARIO_BOT).unwrap();

    let expected = scenario_planner();

    let mut planner = Planner::new(ProjectConfig::default()).unwrap();
    planner.save_as(dir.path().join("previous")).unwrap();

    let status = planner.import_bot(&bot, Units::Imperial).unwrap();
    assert_eq!(status, RegenStatus::Fresh);

    assert_eq!(planner.state().config(), expected.state().config());
    assert_eq!(planner.state().waypoints(), expected.state().waypoints());
    assert!(planner.state().bound_file().is_none());
    assert_eq!(
        planner.trajectories().unwrap().source,
        expected.trajectories().unwrap().source
    );

    // Swerve is inferred from a wheel base depth
    fs::write(&bot, SCENARIO_BOT.replace("1.464\n0\n", "1.464\n2\n")).unwrap();
    planner.import_bot(&bot, Units::Metric).unwrap();
    assert_eq!(planner.state().config().drive_base, DriveBase::Swerve);
    assert_eq!(planner.state().units(), Units::Metric);
    assert!(planner.trajectories().unwrap().back_left().is_some());
}

#[test]
fn save_load_round_trip() {
    let dir = tempfile::tempdir().unwrap();

    let mut planner = scenario_planner();
    planner.set_fit_method(FitMethod::Quintic);
    planner
        .update_waypoint(1, Waypoint::new(5.25, -1.0 / 3.0, 0.7).unwrap())
        .unwrap();
    planner.set_units(Units::Metric).unwrap();
    let path = planner.save_as(dir.path().join("auto")).unwrap();

    let mut other = Planner::new(ProjectConfig::default()).unwrap();
    assert_eq!(other.load(&path).unwrap(), RegenStatus::Fresh);

    assert_eq!(other.state().config(), planner.state().config());
    assert_eq!(other.state().waypoints(), planner.state().waypoints());
    assert_eq!(other.state().bound_file(), Some(path.as_path()));
}

#[test]
fn malformed_project_leaves_state_unchanged() {
    let dir = tempfile::tempdir().unwrap();

    let mut planner = scenario_planner();
    let path = planner.save_as(dir.path().join("auto.xml")).unwrap();

    let text = fs::read_to_string(&path).unwrap().replace("dt=\"0.05\"", "");
    let broken = dir.path().join("broken.xml");
    fs::write(&broken, text).unwrap();

    let before = planner.state().clone();
    let err = planner.load(&broken).unwrap_err();

    assert!(matches!(
        err,
        PlanError::Parse(ParseError::MissingAttribute("dt"))
    ));
    assert_eq!(planner.state(), &before);
    assert_eq!(planner.freshness(), Freshness::Fresh);

    assert!(matches!(
        planner.load(dir.path().join("missing.xml")),
        Err(PlanError::Io(_))
    ));
    assert_eq!(planner.state(), &before);
}

#[test]
fn export_writes_every_trajectory() {
    let dir = tempfile::tempdir().unwrap();
    let base = dir.path().join("auto");

    let empty = Planner::new(ProjectConfig::default()).unwrap();
    assert!(matches!(
        empty.export(&base, ExportFormat::Tabular),
        Err(PlanError::Generation(_))
    ));

    let planner = scenario_planner();

    let csv = planner.export(&base, ExportFormat::Tabular).unwrap();
    assert_eq!(csv.len(), 3);
    let source = fs::read_to_string(&csv[0]).unwrap();
    assert_eq!(
        source.lines().count(),
        planner.trajectories().unwrap().source.len() + 1
    );

    let bin = planner.export(&base, ExportFormat::Binary).unwrap();
    assert_eq!(bin[2], dir.path().join("auto_right.traj"));

    let right = read_binary(&bin[2]).unwrap();
    let expected = planner.trajectories().unwrap().front_right();
    assert_eq!(right.len(), expected.len());
    assert_eq!(right.points()[10].x, expected.points()[10].x);
}

#[test]
fn unit_round_trip_is_bounded() {
    let mut planner = scenario_planner();
    let original = *planner.state().config();

    planner.set_units(Units::Metric).unwrap();
    planner.set_units(Units::Imperial).unwrap();

    let config = planner.state().config();
    assert!((config.max_velocity - original.max_velocity).abs() <= 1e-4);
    assert!((config.max_acceleration - original.max_acceleration).abs() <= 1e-4);
    assert!((config.max_jerk - original.max_jerk).abs() <= 1e-4);
    assert!((config.track_width - original.track_width).abs() <= 1e-4);
    assert!((planner.state().waypoints()[1].x() - 4.0).abs() <= 1e-4);
    assert_eq!(planner.state().units(), Units::Imperial);
}
