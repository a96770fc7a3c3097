use crate::aggregators::{CalendarAggregator, ClimatologyAggregator, MapAggregator, MonthlyIndex};
use crate::error::{ProcessingError, Result};
use crate::models::{DerivedFile, StationId};
use crate::processors::{ExecutionMode, Processor, ProgressObserver, UnitFailure, WorkDispatcher};
use crate::readers::list_derived_files;
use crate::settings::Settings;
use crate::utils::constants::{DEFAULT_INPUT_DIR, DEFAULT_INSTRUMENT_TYPES, DEFAULT_OUTPUT_DIR};
use crate::utils::filename::day_dir;
use crate::utils::progress::ProgressReporter;
use chrono::{Datelike, NaiveDate};
use std::collections::BTreeSet;
use std::path::PathBuf;
use tracing::{error, info, warn};

#[derive(Debug, Clone)]
pub struct RunOptions {
    pub input_base: PathBuf,
    pub output_base: PathBuf,
    pub instrument_types: Vec<String>,
    pub mode: ExecutionMode,
    pub update_data: bool,
    pub update_calendar: bool,
    pub update_map: bool,
    pub update_climatology: bool,
    pub show_progress: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            input_base: PathBuf::from(DEFAULT_INPUT_DIR),
            output_base: PathBuf::from(DEFAULT_OUTPUT_DIR),
            instrument_types: DEFAULT_INSTRUMENT_TYPES.iter().map(|s| s.to_string()).collect(),
            mode: ExecutionMode::Sequential,
            update_data: true,
            update_calendar: true,
            update_map: true,
            update_climatology: true,
            show_progress: false,
        }
    }
}

/// What happened during a run. Failures local to a file, a date, an
/// artifact or a station are collected here instead of aborting the run.
#[derive(Debug, Default)]
pub struct RunSummary {
    pub dates: Vec<NaiveDate>,
    pub derived_files: usize,
    pub unit_failures: Vec<UnitFailure>,
    pub date_failures: Vec<(NaiveDate, String)>,
    pub calendar_entries: usize,
    pub map_entries: usize,
    pub index_failures: Vec<(PathBuf, String)>,
    pub artifact_failures: Vec<(PathBuf, String)>,
    /// Stations indexed across every date of the run.
    pub stations: BTreeSet<StationId>,
    pub climatology_written: Vec<StationId>,
    pub climatology_excluded: Vec<StationId>,
    pub climatology_failed: Vec<(StationId, String)>,
}

impl RunSummary {
    pub fn is_clean(&self) -> bool {
        self.unit_failures.is_empty()
            && self.date_failures.is_empty()
            && self.index_failures.is_empty()
            && self.artifact_failures.is_empty()
            && self.climatology_failed.is_empty()
    }

    pub fn summary(&self) -> String {
        let mut summary = format!(
            "Run Summary:\n  Dates: {}\n  Derived files: {}\n  Processing failures: {}\n  Date failures: {}\n  Calendar entries: {}\n  Map entries: {}\n  Index failures: {}\n  Artifact failures: {}\n  Stations: {}\n  Climatology: {} written, {} excluded, {} failed\n",
            self.dates.len(),
            self.derived_files,
            self.unit_failures.len(),
            self.date_failures.len(),
            self.calendar_entries,
            self.map_entries,
            self.index_failures.len(),
            self.artifact_failures.len(),
            self.stations.len(),
            self.climatology_written.len(),
            self.climatology_excluded.len(),
            self.climatology_failed.len(),
        );

        for failure in &self.unit_failures {
            summary.push_str(&format!("    ✗ {}: {}\n", failure.input.display(), failure.error));
        }
        for (date, reason) in &self.date_failures {
            summary.push_str(&format!("    ✗ {}: {}\n", date, reason));
        }
        for (path, reason) in self.index_failures.iter().chain(&self.artifact_failures) {
            summary.push_str(&format!("    ✗ {}: {}\n", path.display(), reason));
        }
        for (station, reason) in &self.climatology_failed {
            summary.push_str(&format!("    ✗ {}: {}\n", station, reason));
        }

        summary
    }
}

/// Runs the per-date stages over a sequence of dates, then the climatology.
pub struct Pipeline<'a> {
    settings: &'a Settings,
    processor: Option<&'a dyn Processor>,
    options: RunOptions,
}

impl<'a> Pipeline<'a> {
    pub fn new(settings: &'a Settings, options: RunOptions) -> Self {
        Self {
            settings,
            processor: None,
            options,
        }
    }

    pub fn with_processor(mut self, processor: &'a dyn Processor) -> Self {
        self.processor = Some(processor);
        self
    }

    pub fn options(&self) -> &RunOptions {
        &self.options
    }

    /// Process `dates` strictly in order. Only a misconfigured run fails as a
    /// whole; everything else is reported in the summary.
    pub fn run(&self, dates: &[NaiveDate]) -> Result<RunSummary> {
        if self.options.update_data && self.processor.is_none() {
            return Err(ProcessingError::Config(
                "data stage enabled without a processor".to_string(),
            ));
        }

        let mut summary = RunSummary::default();

        for &date in dates {
            self.run_date(date, &mut summary);
            summary.dates.push(date);
        }

        if self.options.update_climatology {
            self.update_climatology(&mut summary);
        }

        info!(
            dates = summary.dates.len(),
            derived = summary.derived_files,
            stations = summary.stations.len(),
            clean = summary.is_clean(),
            "run finished"
        );

        Ok(summary)
    }

    fn run_date(&self, date: NaiveDate, summary: &mut RunSummary) {
        if let Some(processor) = self.processor.filter(|_| self.options.update_data) {
            self.process_data(processor, date, summary);
        }

        let derived = match list_derived_files(&day_dir(&self.options.output_base, date)) {
            Ok(derived) => derived,
            Err(e) => {
                error!(%date, error = %e, "cannot list derived files");
                summary.date_failures.push((date, e.to_string()));
                return;
            }
        };

        let base = &self.options.output_base;
        if self.options.update_calendar {
            let indexed = self.index(&CalendarAggregator::new(base), date, &derived, summary);
            summary.calendar_entries += indexed;
        }
        if self.options.update_map {
            let indexed = self.index(&MapAggregator::new(base), date, &derived, summary);
            summary.map_entries += indexed;
        }

        summary
            .stations
            .extend(derived.into_iter().map(|file| file.station));
    }

    fn process_data(&self, processor: &dyn Processor, date: NaiveDate, summary: &mut RunSummary) {
        let dispatcher = WorkDispatcher::new(
            processor,
            self.settings,
            &self.options.input_base,
            &self.options.output_base,
        )
        .with_instrument_types(self.options.instrument_types.clone())
        .with_mode(self.options.mode);

        let progress = ProgressReporter::new(0, &date.to_string(), !self.options.show_progress);
        let observer: &dyn ProgressObserver = &progress;

        match dispatcher.dispatch(date, Some(observer)) {
            Ok(report) => {
                progress.finish();
                summary.derived_files += report.derived.len();
                summary.unit_failures.extend(report.failures);
            }
            Err(e) => {
                // Fatal for this date's data stage only
                error!(%date, error = %e, "data stage failed");
                summary.date_failures.push((date, e.to_string()));
            }
        }
    }

    /// Fold a date's derived files into the month's calendar or map. Returns
    /// the number of files indexed.
    fn index(
        &self,
        index: &dyn MonthlyIndex,
        date: NaiveDate,
        derived: &[DerivedFile],
        summary: &mut RunSummary,
    ) -> usize {
        let (year, month, day) = (date.year(), date.month(), date.day());
        let label = index.label();
        let name = index.file_name(year, month);
        let path = index.path(year, month, &name);

        if let Err(e) = index.ensure(year, month, &name) {
            error!(path = %path.display(), error = %e, "cannot create {}", label);
            summary.artifact_failures.push((path, e.to_string()));
            return 0;
        }

        let progress =
            ProgressReporter::new(derived.len() as u64, label, !self.options.show_progress);
        let mut indexed = 0;

        for file in derived {
            let added = index.add(&file.path, year, month, day, &name);
            progress.increment(1);

            match added {
                Ok(_) => indexed += 1,
                Err(e @ ProcessingError::CorruptArtifact { .. }) => {
                    // Never overwrite a corrupt artifact; abandon it for this date
                    error!(path = %path.display(), error = %e, "{} is corrupt", label);
                    summary.artifact_failures.push((path.clone(), e.to_string()));
                    break;
                }
                Err(e) => {
                    warn!(path = %file.path.display(), error = %e, "cannot add to {}", label);
                    summary.index_failures.push((file.path.clone(), e.to_string()));
                }
            }
        }

        progress.finish();
        indexed
    }

    fn update_climatology(&self, summary: &mut RunSummary) {
        let climatology = &self.settings.climatology;
        let aggregator = ClimatologyAggregator::new(&self.options.output_base)
            .with_min_profiles(climatology.min_profiles);
        let progress = ProgressReporter::new(
            summary.stations.len() as u64,
            "climatology",
            !self.options.show_progress,
        );

        let stations: Vec<StationId> = summary.stations.iter().cloned().collect();
        for station in &stations {
            progress.increment(1);

            if self.settings.is_excluded_from_climatology(station) {
                info!(%station, "station excluded from climatology");
                summary.climatology_excluded.push(station.clone());
                continue;
            }

            match aggregator.compute_climatology(
                station,
                &climatology.variable,
                climatology.aerosols_only,
            ) {
                Ok(_) => summary.climatology_written.push(station.clone()),
                Err(e) => {
                    warn!(%station, error = %e, "climatology failed");
                    summary.climatology_failed.push((station.clone(), e.to_string()));
                }
            }
        }

        progress.finish();
    }
}
