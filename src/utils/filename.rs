use crate::models::StationId;
use crate::utils::constants::{
    CALENDAR_SUFFIX, CLIMATOLOGY_DIR, CLIMATOLOGY_SUFFIX, DERIVED_FILE_MARKER, MAP_SUFFIX,
};
use chrono::{Datelike, NaiveDate};
use std::path::{Path, PathBuf};

/// `base/YYYY/MM`
pub fn month_dir(base: &Path, year: i32, month: u32) -> PathBuf {
    base.join(format!("{:04}", year)).join(format!("{:02}", month))
}

/// `base/YYYY/MM/DD`
pub fn day_dir(base: &Path, date: NaiveDate) -> PathBuf {
    month_dir(base, date.year(), date.month()).join(format!("{:02}", date.day()))
}

/// Calendar file name with format: {YYYY}-{MM}-cal.json
pub fn calendar_file_name(year: i32, month: u32) -> String {
    format!("{:04}-{:02}-{}", year, month, CALENDAR_SUFFIX)
}

/// Map file name with format: {YYYY}-{MM}-map.json
pub fn map_file_name(year: i32, month: u32) -> String {
    format!("{:04}-{:02}-{}", year, month, MAP_SUFFIX)
}

/// `base/climato/AP_{station}_clim.json`
pub fn climatology_path(base: &Path, station: &StationId) -> PathBuf {
    base.join(CLIMATOLOGY_DIR).join(format!(
        "{}{}{}",
        DERIVED_FILE_MARKER, station, CLIMATOLOGY_SUFFIX
    ))
}
