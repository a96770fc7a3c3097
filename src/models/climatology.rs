use crate::models::StationId;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Period {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValueRange {
    pub min: f64,
    pub max: f64,
}

/// Statistics of one calendar month pooled across all years.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyProfile {
    pub n_profiles: usize,
    pub mean: Vec<Option<f64>>,
    pub std: Vec<Option<f64>>,
    pub count: Vec<u64>,
}

/// Long-term summary of one variable for one station.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClimatologyArtifact {
    pub station_id: StationId,
    pub variable: String,
    pub aerosols_only: bool,
    pub period: Period,
    pub n_files: usize,
    pub n_profiles: usize,
    pub altitude: Vec<f64>,
    pub range: ValueRange,
    /// Keyed by zero-padded month, "01".."12".
    pub monthly: BTreeMap<String, MonthlyProfile>,
}
