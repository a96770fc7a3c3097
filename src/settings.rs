//! Run-wide settings.
//!
//! Settings are read once per run from an optional file and environment
//! variables, then passed by reference to every component. Environment keys
//! use `__` both after the prefix and between nesting levels, e.g.
//! `APROFILES__MAX_WORKERS` or `APROFILES__CLIMATOLOGY__MIN_PROFILES`.

use crate::error::{ProcessingError, Result};
use crate::models::StationId;
use crate::utils::constants::DEFAULT_VARIABLE;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const ENV_PREFIX: &str = "APROFILES";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Stations never included in climatology (mobile platforms).
    pub exclude_stations_id_from_climatology: Vec<String>,
    pub max_workers: usize,
    pub climatology: ClimatologySettings,
    pub workflow: WorkflowSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClimatologySettings {
    pub variable: String,
    pub aerosols_only: bool,
    /// Fewer profiles than this make a station's climatology degenerate.
    pub min_profiles: usize,
}

/// External program that turns one raw file into a derived product.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowSettings {
    pub command: Option<String>,
    pub args: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            exclude_stations_id_from_climatology: Vec::new(),
            max_workers: num_cpus::get(),
            climatology: ClimatologySettings::default(),
            workflow: WorkflowSettings::default(),
        }
    }
}

impl Default for ClimatologySettings {
    fn default() -> Self {
        Self {
            variable: DEFAULT_VARIABLE.to_string(),
            aerosols_only: true,
            min_profiles: 1,
        }
    }
}

impl Settings {
    /// Load settings from `path` (if any) layered under the environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();

        if let Some(path) = path {
            builder = builder.add_source(File::from(path).required(true));
        }

        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("exclude_stations_id_from_climatology")
                .with_list_parse_key("workflow.args"),
        );

        let settings: Settings = builder.build()?.try_deserialize()?;
        settings.check()?;
        Ok(settings)
    }

    fn check(&self) -> Result<()> {
        if self.max_workers == 0 {
            return Err(ProcessingError::Config(
                "max_workers must be at least 1".to_string(),
            ));
        }
        if self.climatology.variable.trim().is_empty() {
            return Err(ProcessingError::Config(
                "climatology.variable must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    pub fn is_excluded_from_climatology(&self, station: &StationId) -> bool {
        self.exclude_stations_id_from_climatology
            .iter()
            .any(|excluded| excluded == station.as_str())
    }
}
