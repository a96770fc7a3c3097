use crate::error::{ProcessingError, Result};
use crate::utils::constants::{DERIVED_FILE_EXTENSION, DERIVED_FILE_MARKER, STATION_ID_FIELDS};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Composite station identifier, e.g. `0-20000-0-06610-A`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StationId(String);

impl StationId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Extract the station identifier from a derived file name: the text after
    /// the marker, re-joined from its first five dash-separated fields.
    pub fn from_file_name(file_name: &str) -> Result<Self> {
        let (_, tail) = file_name.split_once(DERIVED_FILE_MARKER).ok_or_else(|| {
            ProcessingError::InvalidFileName(format!(
                "'{}' does not contain marker '{}'",
                file_name, DERIVED_FILE_MARKER
            ))
        })?;

        let id = tail
            .splitn(STATION_ID_FIELDS + 1, '-')
            .take(STATION_ID_FIELDS)
            .collect::<Vec<_>>()
            .join("-");

        if id.is_empty() {
            return Err(ProcessingError::InvalidFileName(format!(
                "'{}' has no station identifier",
                file_name
            )));
        }

        Ok(Self(id))
    }
}

impl fmt::Display for StationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A derived product on disk, identified by station and day from its name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct DerivedFile {
    pub path: PathBuf,
    pub station: StationId,
    pub date: NaiveDate,
}

impl DerivedFile {
    /// Parse `AP_<station>-<YYYY>-<MM>-<DD>.json`.
    pub fn parse(path: &Path) -> Result<Self> {
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| ProcessingError::InvalidFileName(path.display().to_string()))?;

        let stem = file_name
            .strip_suffix(DERIVED_FILE_EXTENSION)
            .ok_or_else(|| {
                ProcessingError::InvalidFileName(format!(
                    "'{}' does not end with '{}'",
                    file_name, DERIVED_FILE_EXTENSION
                ))
            })?;

        let station = StationId::from_file_name(stem)?;

        // The date occupies the last ten characters of the stem
        let date_part = stem
            .len()
            .checked_sub(10)
            .and_then(|start| stem.get(start..))
            .ok_or_else(|| ProcessingError::InvalidFileName(file_name.to_string()))?;
        let date = NaiveDate::parse_from_str(date_part, "%Y-%m-%d").map_err(|_| {
            ProcessingError::InvalidFileName(format!("'{}' has no trailing date", file_name))
        })?;

        Ok(Self {
            path: path.to_path_buf(),
            station,
            date,
        })
    }

    pub fn file_name_for(station: &StationId, date: NaiveDate) -> String {
        format!(
            "{}{}-{}{}",
            DERIVED_FILE_MARKER,
            station,
            date.format("%Y-%m-%d"),
            DERIVED_FILE_EXTENSION
        )
    }

    /// Canonical location under `base_dir/YYYY/MM/DD/`.
    pub fn canonical_path(base_dir: &Path, station: &StationId, date: NaiveDate) -> PathBuf {
        crate::utils::filename::day_dir(base_dir, date).join(Self::file_name_for(station, date))
    }

    pub fn year(&self) -> i32 {
        self.date.year()
    }

    pub fn month(&self) -> u32 {
        self.date.month()
    }

    pub fn day(&self) -> u32 {
        self.date.day()
    }
}
