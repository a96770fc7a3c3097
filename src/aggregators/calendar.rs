use crate::error::Result;
use crate::models::{CalendarArtifact, SceneCounts, StationId};
use crate::readers::ProductReader;
use crate::utils::filename::month_dir;
use crate::writers::{ensure_document, update_document};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Maintains the per-month calendar of which stations reported on which day.
pub struct CalendarAggregator {
    base_dir: PathBuf,
    reader: ProductReader,
}

impl CalendarAggregator {
    pub fn new(base_dir: &Path) -> Self {
        Self {
            base_dir: base_dir.to_path_buf(),
            reader: ProductReader::new(),
        }
    }

    pub fn path(&self, year: i32, month: u32, name: &str) -> PathBuf {
        month_dir(&self.base_dir, year, month).join(name)
    }

    /// Create an empty calendar for the month unless one already exists.
    pub fn ensure(&self, year: i32, month: u32, name: &str) -> Result<bool> {
        let path = self.path(year, month, name);
        let created = ensure_document(&path, || CalendarArtifact::for_month(year, month))?;
        if created {
            info!(path = %path.display(), "created calendar");
        }
        Ok(created)
    }

    /// Record the derived file's station on `day`. Re-adding the same file
    /// leaves the calendar unchanged.
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
        let counts = SceneCounts::from_profiles(&product.profiles);

        let path = self.path(year, month, name);
        let changed = update_document(
            &path,
            || CalendarArtifact::for_month(year, month),
            |calendar| calendar.record(day, station.clone(), counts),
        )?;

        debug!(%station, day, changed, "calendar entry recorded");
        Ok(changed)
    }
}

pub(crate) fn station_of(derived_file: &Path) -> Result<StationId> {
    let name = derived_file
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default();
    StationId::from_file_name(name)
}
