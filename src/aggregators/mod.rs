pub mod calendar;
pub mod climatology;
pub mod station_map;

pub use calendar::CalendarAggregator;
pub use climatology::ClimatologyAggregator;
pub use station_map::MapAggregator;

use crate::error::Result;
use crate::utils::filename::{calendar_file_name, map_file_name};
use std::path::{Path, PathBuf};

/// A per-month JSON index that derived files are folded into one by one.
pub trait MonthlyIndex {
    fn label(&self) -> &'static str;

    fn file_name(&self, year: i32, month: u32) -> String;

    fn path(&self, year: i32, month: u32, name: &str) -> PathBuf;

    fn ensure(&self, year: i32, month: u32, name: &str) -> Result<bool>;

    fn add(&self, derived_file: &Path, year: i32, month: u32, day: u32, name: &str)
        -> Result<bool>;
}

impl MonthlyIndex for CalendarAggregator {
    fn label(&self) -> &'static str {
        "calendar"
    }

    fn file_name(&self, year: i32, month: u32) -> String {
        calendar_file_name(year, month)
    }

    fn path(&self, year: i32, month: u32, name: &str) -> PathBuf {
        CalendarAggregator::path(self, year, month, name)
    }

    fn ensure(&self, year: i32, month: u32, name: &str) -> Result<bool> {
        CalendarAggregator::ensure(self, year, month, name)
    }

    fn add(&self, derived_file: &Path, year: i32, month: u32, day: u32, name: &str) -> Result<bool> {
        CalendarAggregator::add(self, derived_file, year, month, day, name)
    }
}

impl MonthlyIndex for MapAggregator {
    fn label(&self) -> &'static str {
        "map"
    }

    fn file_name(&self, year: i32, month: u32) -> String {
        map_file_name(year, month)
    }

    fn path(&self, year: i32, month: u32, name: &str) -> PathBuf {
        MapAggregator::path(self, year, month, name)
    }

    fn ensure(&self, year: i32, month: u32, name: &str) -> Result<bool> {
        MapAggregator::ensure(self, year, month, name)
    }

    fn add(&self, derived_file: &Path, year: i32, month: u32, day: u32, name: &str) -> Result<bool> {
        MapAggregator::add(self, derived_file, year, month, day, name)
    }
}
