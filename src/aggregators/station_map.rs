use crate::aggregators::calendar::station_of;
use crate::error::Result;
use crate::models::{MapArtifact, SceneCounts};
use crate::readers::ProductReader;
use crate::utils::filename::month_dir;
use crate::writers::{ensure_document, update_document};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use validator::Validate;

/// Maintains the per-month map of station metadata.
pub struct MapAggregator {
    base_dir: PathBuf,
    reader: ProductReader,
}

impl MapAggregator {
    pub fn new(base_dir: &Path) -> Self {
        Self {
            base_dir: base_dir.to_path_buf(),
            reader: ProductReader::new(),
        }
    }

    pub fn path(&self, year: i32, month: u32, name: &str) -> PathBuf {
        month_dir(&self.base_dir, year, month).join(name)
    }

    pub fn ensure(&self, year: i32, month: u32, name: &str) -> Result<bool> {
        let path = self.path(year, month, name);
        let created = ensure_document(&path, MapArtifact::default)?;
        if created {
            info!(path = %path.display(), "created map");
        }
        Ok(created)
    }

    /// Record the station's metadata and its scene counts for `day`.
    pub fn add(
        &self,
        derived_file: &Path,
        year: i32,
        month: u32,
        day: u32,
        name: &str,
    ) -> Result<bool> {
        let station = station_of(derived_file)?;
        let product = self.reader.read(derived_file)?;
        product.attributes.validate()?;
        let counts = SceneCounts::from_profiles(&product.profiles);

        let path = self.path(year, month, name);
        let changed = update_document(&path, MapArtifact::default, |map| {
            map.record(station.clone(), &product.attributes, day, counts)
        })?;

        debug!(%station, day, changed, "map entry recorded");
        Ok(changed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProcessingError;
    use crate::models::{DerivedFile, StationId};
    use chrono::NaiveDate;
    use std::fs;
    use tempfile::TempDir;

    fn write_product(base: &Path, station: &str, date: NaiveDate, latitude: f64) -> PathBuf {
        let path = DerivedFile::canonical_path(base, &StationId::new(station), date);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(
            &path,
            format!(
                r#"{{ "attributes": {{ "station_id": "{}", "station_name": "Payerne",
                   "instrument_type": "CHM15k", "latitude": {}, "longitude": 6.94,
                   "altitude": 491.0 }},
                   "altitude": [100.0],
                   "profiles": [{{ "time": "{}T00:00:00Z", "scene": "aer", "extinction": [0.1] }}] }}"#,
                station, latitude, date
            ),
        )
        .unwrap();
        path
    }

    #[test]
    fn test_add_is_idempotent_and_keeps_other_stations() -> Result<()> {
        let dir = TempDir::new()?;
        let date = NaiveDate::from_ymd_opt(2023, 6, 1).unwrap();
        let a = write_product(dir.path(), "0-20000-0-06610-A", date, 46.81);
        let b = write_product(dir.path(), "0-20000-0-01492-B", date, 59.9);
        let map = MapAggregator::new(dir.path());
        let name = "2023-06-map.json";

        map.ensure(2023, 6, name)?;
        assert!(map.add(&a, 2023, 6, 1, name)?);
        assert!(!map.add(&a, 2023, 6, 1, name)?);
        assert!(map.add(&b, 2023, 6, 1, name)?);

        let stored: MapArtifact = serde_json::from_slice(&fs::read(map.path(2023, 6, name))?)?;
        assert_eq!(stored.stations.len(), 2);
        let entry = stored.get(&StationId::new("0-20000-0-06610-A")).unwrap();
        assert_eq!(entry.instrument_type, "CHM15k");
        assert_eq!(entry.days["01"].aer, 1);
        Ok(())
    }

    #[test]
    fn test_invalid_coordinates_rejected() -> Result<()> {
        let dir = TempDir::new()?;
        let date = NaiveDate::from_ymd_opt(2023, 6, 1).unwrap();
        let file = write_product(dir.path(), "0-20000-0-06610-A", date, 123.0);
        let map = MapAggregator::new(dir.path());

        let err = map.add(&file, 2023, 6, 1, "2023-06-map.json").unwrap_err();
        assert!(matches!(err, ProcessingError::Validation(_)));
        assert!(!map.path(2023, 6, "2023-06-map.json").exists());
        Ok(())
    }
}
