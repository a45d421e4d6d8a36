//! Motion profile generator executable.
//!
//! Loads a project (or imports a legacy `.bot` file), generates its
//! trajectories and optionally exports them and saves the project.
//!
//! # Usage
//!
//! ```text
//! mpg_exec auto.xml --export out/auto --format binary
//! mpg_exec robot.bot --units metric --save-as auto
//! ```

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{
    eyre::{eyre, WrapErr},
    Report,
};
use log::{info, warn};
use std::path::PathBuf;
use structopt::StructOpt;

// Internal
use mpg_lib::{
    params::{Params, PARAMS_FILE},
    persist::ExportFormat,
    units::Units,
    Planner, RegenStatus,
};
use util::{
    logger::{logger_init, LevelFilter},
    session::Session,
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

#[derive(Debug, StructOpt)]
#[structopt(name = "mpg_exec", about = "Motion profile generator")]
struct Opt {
    /// Project (.xml) or legacy (.bot) file to open
    #[structopt(parse(from_os_str))]
    input: PathBuf,

    /// Unit system of a .bot file, IMPERIAL or METRIC
    #[structopt(short, long, default_value = "IMPERIAL")]
    units: Units,

    /// Export the trajectories to files starting with this path
    #[structopt(short, long, parse(from_os_str))]
    export: Option<PathBuf>,

    /// Export format, TABULAR or BINARY. Defaults to the parameter file's.
    #[structopt(short, long)]
    format: Option<ExportFormat>,

    /// Save the project to this path
    #[structopt(short, long, parse(from_os_str))]
    save_as: Option<PathBuf>,
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {
    color_eyre::install()?;

    let opt = Opt::from_args();

    // ---- EARLY INITIALISATION ----

    let session = Session::new("mpg_exec", "sessions").wrap_err("Failed to create the session")?;

    logger_init(LevelFilter::Debug, &session).wrap_err("Failed to initialise logging")?;

    info!("Motion Profile Generator\n");
    info!("Session directory: {:?}\n", session.session_root);

    // ---- LOAD PARAMETERS ----

    let params: Params = match util::params::load(PARAMS_FILE) {
        Ok(p) => p,
        Err(e) => {
            warn!("Could not load {} ({}), using built in defaults", PARAMS_FILE, e);
            Params::default()
        }
    };

    // ---- OPEN PROJECT ----

    let mut planner =
        Planner::new(params.default_config).wrap_err("Invalid default configuration")?;

    let ext = opt
        .input
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase());

    let status = match ext.as_deref() {
        Some("bot") => planner
            .import_bot(&opt.input, opt.units)
            .wrap_err_with(|| format!("Failed to import {:?}", opt.input))?,
        Some("xml") => planner
            .load(&opt.input)
            .wrap_err_with(|| format!("Failed to load {:?}", opt.input))?,
        _ => {
            return Err(eyre!(
                "Expected a .xml project or a .bot file, found {:?}",
                opt.input
            ))
        }
    };

    let config = planner.state().config();
    info!(
        "Project: {} waypoints, {} drive, {} fit, {} units",
        planner.state().waypoints().len(),
        config.drive_base,
        config.fit_method,
        config.units
    );

    // ---- GENERATE ----

    match status {
        RegenStatus::Fresh => {
            if let Some(set) = planner.trajectories() {
                info!(
                    "Generated {} samples, {:.3} {} in {:.3} s",
                    set.source.len(),
                    set.source.length(),
                    config.units.length_name(),
                    set.source.duration_s()
                );
            }
        }
        RegenStatus::Stale => warn!("Fewer than 2 waypoints, nothing to generate"),
        RegenStatus::Failed(e) => warn!("Generation failed: {}", e),
    }

    // ---- OUTPUTS ----

    if let Some(base) = &opt.export {
        let format = opt.format.unwrap_or(params.export_format);
        let paths = planner
            .export(base, format)
            .wrap_err("Failed to export the trajectories")?;

        for p in paths {
            info!("Wrote {}", p.display());
        }
    }

    if let Some(path) = &opt.save_as {
        let path = planner
            .save_as(path)
            .wrap_err("Failed to save the project")?;
        info!("Saved project to {}", path.display());
    }

    info!("Done");

    Ok(())
}
