//! # Planner parameters
//!
//! Loaded from `params/planner.toml`.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

use crate::persist::ExportFormat;
use crate::project::ProjectConfig;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Parameter file name, relative to the parameters directory.
pub const PARAMS_FILE: &str = "planner.toml";

// ---------------------------------------------------------------------------
// STRUCTS
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Params {
    /// Configuration of new projects
    pub default_config: ProjectConfig,

    /// Format used when exporting without an explicit format
    pub export_format: ExportFormat,
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::project::{DriveBase, FitMethod};
    use crate::units::Units;

    #[test]
    fn test_shipped_params() {
        let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("..")
            .join("params")
            .join(PARAMS_FILE);
        let params: Params = util::params::load_path(path).unwrap();

        assert_eq!(params, Params::default());
        assert_eq!(params.default_config.fit_method, FitMethod::Cubic);
        assert_eq!(params.default_config.drive_base, DriveBase::Tank);
        assert_eq!(params.default_config.units, Units::Imperial);
    }
}
