use crate::error::{ProcessingError, Result};
use crate::models::{
    ClimatologyArtifact, DerivedProduct, MonthlyProfile, Period, Scene, StationId, ValueRange,
};
use crate::readers::{station_history, ProductReader};
use crate::utils::filename::climatology_path;
use crate::writers::replace_document;
use chrono::{Datelike, NaiveDate};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Recomputes a station's climatology from its whole derived history.
pub struct ClimatologyAggregator {
    base_dir: PathBuf,
    min_profiles: usize,
    reader: ProductReader,
}

#[derive(Debug, Default)]
struct MonthAccumulator {
    n_profiles: usize,
    sum: Vec<f64>,
    sum_sq: Vec<f64>,
    count: Vec<u64>,
}

impl MonthAccumulator {
    fn with_levels(levels: usize) -> Self {
        Self {
            n_profiles: 0,
            sum: vec![0.0; levels],
            sum_sq: vec![0.0; levels],
            count: vec![0; levels],
        }
    }

    fn finish(self) -> MonthlyProfile {
        let mut mean = Vec::with_capacity(self.count.len());
        let mut std = Vec::with_capacity(self.count.len());

        for ((sum, sum_sq), count) in self.sum.iter().zip(&self.sum_sq).zip(&self.count) {
            if *count == 0 {
                mean.push(None);
                std.push(None);
                continue;
            }
            let n = *count as f64;
            let m = sum / n;
            // Population variance; clamp rounding noise below zero
            let variance = (sum_sq / n - m * m).max(0.0);
            mean.push(Some(m));
            std.push(Some(variance.sqrt()));
        }

        MonthlyProfile {
            n_profiles: self.n_profiles,
            mean,
            std,
            count: self.count,
        }
    }
}

impl ClimatologyAggregator {
    pub fn new(base_dir: &Path) -> Self {
        Self {
            base_dir: base_dir.to_path_buf(),
            min_profiles: 1,
            reader: ProductReader::new(),
        }
    }

    pub fn with_min_profiles(mut self, min_profiles: usize) -> Self {
        self.min_profiles = min_profiles.max(1);
        self
    }

    pub fn path(&self, station: &StationId) -> PathBuf {
        climatology_path(&self.base_dir, station)
    }

    /// Recompute and write the climatology of `variable` for `station`.
    ///
    /// With `aerosols_only`, only profiles classified as aerosol contribute.
    /// Returns the artifact path.
    pub fn compute_climatology(
        &self,
        station: &StationId,
        variable: &str,
        aerosols_only: bool,
    ) -> Result<PathBuf> {
        let history = station_history(&self.base_dir, station)?;
        if history.is_empty() {
            return Err(degenerate(station, "no derived files"));
        }

        let mut altitude: Option<Vec<f64>> = None;
        let mut months: BTreeMap<u32, MonthAccumulator> = BTreeMap::new();
        let mut range: Option<ValueRange> = None;
        let mut period: Option<Period> = None;
        let mut n_files = 0;
        let mut n_profiles = 0;

        // Newest first: the grid of the most recent contributing product wins
        for file in history.iter().rev() {
            let product = match self.reader.read(&file.path) {
                Ok(product) => product,
                Err(e) => {
                    warn!(%station, path = %file.path.display(), error = %e, "skipping unreadable product");
                    continue;
                }
            };

            if altitude.as_ref().is_some_and(|grid| *grid != product.altitude) {
                warn!(%station, path = %file.path.display(), "altitude grid differs, skipping product");
                continue;
            }

            let used = accumulate(
                &product,
                variable,
                aerosols_only,
                &mut months,
                &mut range,
                &mut period,
            );
            if used > 0 {
                altitude.get_or_insert_with(|| product.altitude.clone());
                n_files += 1;
                n_profiles += used;
            }
        }

        if n_profiles < self.min_profiles {
            return Err(degenerate(
                station,
                &format!(
                    "{} usable profiles of '{}', need at least {}",
                    n_profiles, variable, self.min_profiles
                ),
            ));
        }
        let range = range.ok_or_else(|| {
            degenerate(station, &format!("no finite values of '{}'", variable))
        })?;
        let period = period.ok_or_else(|| degenerate(station, "empty period"))?;

        let artifact = ClimatologyArtifact {
            station_id: station.clone(),
            variable: variable.to_string(),
            aerosols_only,
            period,
            n_files,
            n_profiles,
            altitude: altitude.unwrap_or_default(),
            range,
            monthly: months
                .into_iter()
                .map(|(month, acc)| (format!("{:02}", month), acc.finish()))
                .collect(),
        };

        let path = self.path(station);
        let written = replace_document(&path, &artifact)?;
        if written {
            info!(%station, files = n_files, profiles = n_profiles, "climatology written");
        } else {
            debug!(%station, "climatology unchanged");
        }
        Ok(path)
    }
}

/// Fold one product into the monthly accumulators. Returns the number of
/// profiles that contributed.
fn accumulate(
    product: &DerivedProduct,
    variable: &str,
    aerosols_only: bool,
    months: &mut BTreeMap<u32, MonthAccumulator>,
    range: &mut Option<ValueRange>,
    period: &mut Option<Period>,
) -> usize {
    let levels = product.altitude.len();
    let mut used = 0;

    for profile in &product.profiles {
        if aerosols_only && profile.scene != Scene::Aerosols {
            continue;
        }
        let values = match profile.variable(variable) {
            Some(values) if values.len() == levels => values,
            _ => continue,
        };

        let acc = months
            .entry(profile.time.month())
            .or_insert_with(|| MonthAccumulator::with_levels(levels));
        acc.n_profiles += 1;
        used += 1;

        for (level, value) in values.iter().enumerate() {
            let value = match value {
                Some(v) if v.is_finite() => *v,
                _ => continue,
            };
            acc.sum[level] += value;
            acc.sum_sq[level] += value * value;
            acc.count[level] += 1;

            let r = range.get_or_insert(ValueRange {
                min: value,
                max: value,
            });
            r.min = r.min.min(value);
            r.max = r.max.max(value);
        }

        extend_period(period, profile.time.date_naive());
    }

    used
}

fn extend_period(period: &mut Option<Period>, date: NaiveDate) {
    match period {
        Some(p) => {
            p.start = p.start.min(date);
            p.end = p.end.max(date);
        }
        None => {
            *period = Some(Period {
                start: date,
                end: date,
            })
        }
    }
}

fn degenerate(station: &StationId, reason: &str) -> ProcessingError {
    ProcessingError::DegenerateClimatology {
        station_id: station.to_string(),
        reason: reason.to_string(),
    }
}
