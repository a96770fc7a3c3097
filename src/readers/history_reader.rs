use crate::error::Result;
use crate::models::{DerivedFile, StationId};
use crate::readers::directory_reader::list_derived_files;
use std::fs;
use std::path::{Path, PathBuf};

/// Collect every derived file of `station` under `base_dir/YYYY/MM/DD/`,
/// in chronological order.
pub fn station_history(base_dir: &Path, station: &StationId) -> Result<Vec<DerivedFile>> {
    let mut history = Vec::new();

    for year_dir in numeric_subdirs(base_dir, 4)? {
        for month_dir in numeric_subdirs(&year_dir, 2)? {
            for day_dir in numeric_subdirs(&month_dir, 2)? {
                history.extend(
                    list_derived_files(&day_dir)?
                        .into_iter()
                        .filter(|file| &file.station == station),
                );
            }
        }
    }

    history.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.path.cmp(&b.path)));
    Ok(history)
}

/// Subdirectories whose names are exactly `width` ASCII digits, sorted.
fn numeric_subdirs(dir: &Path, width: usize) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }

    let mut dirs = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let is_numeric = path
            .file_name()
            .and_then(|n| n.to_str())
            .map_or(false, |n| n.len() == width && n.bytes().all(|b| b.is_ascii_digit()));
        if is_numeric && path.is_dir() {
            dirs.push(path);
        }
    }

    dirs.sort();
    Ok(dirs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn touch(base: &Path, station: &StationId, y: i32, m: u32, d: u32) -> Result<()> {
        let date = NaiveDate::from_ymd_opt(y, m, d).unwrap();
        let path = DerivedFile::canonical_path(base, station, date);
        fs::create_dir_all(path.parent().unwrap())?;
        fs::write(path, b"{}")?;
        Ok(())
    }

    #[test]
    fn test_station_history_spans_years() -> Result<()> {
        let dir = TempDir::new()?;
        let station = StationId::new("0-20000-0-06610-A");
        let other = StationId::new("0-20000-0-06610-AB");

        touch(dir.path(), &station, 2023, 6, 2)?;
        touch(dir.path(), &station, 2022, 12, 31)?;
        touch(dir.path(), &other, 2023, 6, 2)?;
        fs::create_dir_all(dir.path().join("climato"))?;
        fs::write(dir.path().join("2023/06/2023-06-cal.json"), b"{}")?;

        let history = station_history(dir.path(), &station)?;
        let dates: Vec<_> = history.iter().map(|f| f.date.to_string()).collect();
        assert_eq!(dates, vec!["2022-12-31", "2023-06-02"]);
        Ok(())
    }

    #[test]
    fn test_station_history_empty_base() -> Result<()> {
        let dir = TempDir::new()?;
        let history = station_history(&dir.path().join("missing"), &StationId::new("x"))?;
        assert!(history.is_empty());
        Ok(())
    }
}
