/// Derived file naming
pub const DERIVED_FILE_MARKER: &str = "AP_";
pub const DERIVED_FILE_EXTENSION: &str = ".json";
pub const STATION_ID_FIELDS: usize = 5;

/// Artifact file names
pub const CALENDAR_SUFFIX: &str = "cal.json";
pub const MAP_SUFFIX: &str = "map.json";
pub const CLIMATOLOGY_DIR: &str = "climato";
pub const CLIMATOLOGY_SUFFIX: &str = "_clim.json";

/// Processing defaults
pub const DEFAULT_INSTRUMENT_TYPES: [&str; 2] = ["CHM15k", "Mini-MPL"];
pub const DEFAULT_INPUT_DIR: &str = "data/e-profile";
pub const DEFAULT_OUTPUT_DIR: &str = "data/v-profiles";
pub const DEFAULT_VARIABLE: &str = "extinction";
