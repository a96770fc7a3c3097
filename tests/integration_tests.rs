use aprofiles_processor::error::{ProcessingError, Result};
use aprofiles_processor::models::{CalendarArtifact, ClimatologyArtifact, DerivedFile, MapArtifact, StationId};
use aprofiles_processor::processors::{ExecutionMode, Pipeline, Processor, RunOptions};
use aprofiles_processor::settings::Settings;
use aprofiles_processor::utils::filename::{
    calendar_file_name, climatology_path, day_dir, map_file_name, month_dir,
};
use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use serde_json::json;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const PAYERNE: &str = "0-20000-0-06610-A";
const LINDENBERG: &str = "0-20000-0-10393-A";
const UCCLE: &str = "0-20000-0-06447-A";

/// Reads the station id from the input file and writes a small product for
/// it. Inputs containing `fail` are rejected.
struct FakeProcessor;

impl Processor for FakeProcessor {
    fn process(
        &self,
        input: &Path,
        _instrument_types: &[String],
        output_base: &Path,
        _settings: &Settings,
    ) -> Result<Option<PathBuf>> {
        let content = fs::read_to_string(input)?;
        let station = content.trim();
        if station == "fail" {
            return Err(ProcessingError::Processor {
                path: input.to_path_buf(),
                message: "unreadable instrument file".to_string(),
            });
        }

        let date = date_of(input);
        let station = StationId::new(station);
        let path = DerivedFile::canonical_path(output_base, &station, date);
        let product = json!({
            "attributes": {
                "station_id": station.as_str(),
                "station_name": format!("Station {}", station),
                "instrument_type": "CHM15k",
                "latitude": 46.81,
                "longitude": 6.94,
                "altitude": 491.0
            },
            "altitude": [500.0, 1000.0],
            "profiles": [
                { "time": format!("{}T00:00:00Z", date), "scene": "aer", "extinction": [0.1, 0.2] },
                { "time": format!("{}T00:05:00Z", date), "scene": "aer", "extinction": [0.3, null] },
                { "time": format!("{}T00:10:00Z", date), "scene": "cloud", "extinction": [0.9, 0.9], "cloud_base_height": 1200.0 }
            ]
        });

        fs::create_dir_all(path.parent().unwrap_or(output_base))?;
        fs::write(&path, serde_json::to_vec_pretty(&product)?)?;
        Ok(Some(path))
    }
}

/// Inputs live under `YYYY/MM/DD/`; recover the date from the path.
fn date_of(input: &Path) -> NaiveDate {
    let parts: Vec<&str> = input
        .iter()
        .rev()
        .skip(1)
        .take(3)
        .map(|c| c.to_str().unwrap())
        .collect();
    NaiveDate::parse_from_str(&format!("{}-{}-{}", parts[2], parts[1], parts[0]), "%Y-%m-%d")
        .unwrap()
}

struct Fixture {
    _dir: TempDir,
    input: PathBuf,
    output: PathBuf,
}

impl Fixture {
    fn new() -> Self {
        let dir = TempDir::new().expect("Failed to create temp directory");
        let input = dir.path().join("in");
        let output = dir.path().join("out");
        Self {
            _dir: dir,
            input,
            output,
        }
    }

    fn add_input(&self, date: NaiveDate, name: &str, station: &str) {
        let dir = day_dir(&self.input, date);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(name), station).unwrap();
    }

    fn options(&self) -> RunOptions {
        RunOptions {
            input_base: self.input.clone(),
            output_base: self.output.clone(),
            ..RunOptions::default()
        }
    }

    fn calendar_path(&self, date: NaiveDate) -> PathBuf {
        use chrono::Datelike;
        month_dir(&self.output, date.year(), date.month())
            .join(calendar_file_name(date.year(), date.month()))
    }

    fn map_path(&self, date: NaiveDate) -> PathBuf {
        use chrono::Datelike;
        month_dir(&self.output, date.year(), date.month())
            .join(map_file_name(date.year(), date.month()))
    }
}

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

#[test]
fn test_single_date_with_failing_input() {
    let fixture = Fixture::new();
    let date = d(2023, 6, 1);
    fixture.add_input(date, "a.nc", PAYERNE);
    fixture.add_input(date, "b.nc", "fail");
    fixture.add_input(date, "c.nc", LINDENBERG);

    let settings = Settings::default();
    let pipeline = Pipeline::new(&settings, fixture.options()).with_processor(&FakeProcessor);
    let summary = pipeline.run(&[date]).unwrap();

    assert_eq!(summary.derived_files, 2);
    assert_eq!(summary.unit_failures.len(), 1);
    assert!(summary.unit_failures[0].input.ends_with("b.nc"));
    assert_eq!(summary.calendar_entries, 2);
    assert_eq!(summary.map_entries, 2);
    assert!(!summary.is_clean());

    let calendar: CalendarArtifact =
        serde_json::from_slice(&fs::read(fixture.calendar_path(date)).unwrap()).unwrap();
    let day = calendar.stations_on(1).unwrap();
    assert_eq!(day.len(), 2);
    let counts = day[&StationId::new(PAYERNE)];
    assert_eq!((counts.aer, counts.cloud), (2, 1));

    let map: MapArtifact =
        serde_json::from_slice(&fs::read(fixture.map_path(date)).unwrap()).unwrap();
    assert_eq!(map.stations.len(), 2);
    let entry = map.get(&StationId::new(LINDENBERG)).unwrap();
    assert_eq!(entry.instrument_type, "CHM15k");
    assert!(entry.days.contains_key("01"));

    assert_eq!(summary.climatology_written.len(), 2);
    let climatology: ClimatologyArtifact = serde_json::from_slice(
        &fs::read(climatology_path(&fixture.output, &StationId::new(PAYERNE))).unwrap(),
    )
    .unwrap();
    assert_eq!(climatology.n_profiles, 2);
    assert_eq!(climatology.monthly["06"].count, vec![2, 1]);
}

#[test]
fn test_date_range_in_parallel() {
    let fixture = Fixture::new();
    let dates = [d(2023, 6, 1), d(2023, 6, 2), d(2023, 6, 3)];
    for date in dates {
        fixture.add_input(date, "a.nc", PAYERNE);
        fixture.add_input(date, "b.nc", UCCLE);
    }

    let settings = Settings::default();
    let options = RunOptions {
        mode: ExecutionMode::Parallel { workers: 2 },
        ..fixture.options()
    };
    let pipeline = Pipeline::new(&settings, options).with_processor(&FakeProcessor);
    let summary = pipeline.run(&dates).unwrap();

    assert!(summary.is_clean(), "{}", summary.summary());
    assert_eq!(summary.dates, dates.to_vec());
    assert_eq!(summary.derived_files, 6);
    assert_eq!(summary.calendar_entries, 6);

    let calendar: CalendarArtifact =
        serde_json::from_slice(&fs::read(fixture.calendar_path(dates[0])).unwrap()).unwrap();
    assert_eq!(calendar.entry_count(), 6);

    let climatology: ClimatologyArtifact = serde_json::from_slice(
        &fs::read(climatology_path(&fixture.output, &StationId::new(UCCLE))).unwrap(),
    )
    .unwrap();
    assert_eq!(climatology.n_files, 3);
    assert_eq!(climatology.period.start, dates[0]);
    assert_eq!(climatology.period.end, dates[2]);
}

#[test]
fn test_rerun_is_idempotent() {
    let fixture = Fixture::new();
    let date = d(2023, 6, 1);
    fixture.add_input(date, "a.nc", PAYERNE);
    fixture.add_input(date, "b.nc", LINDENBERG);

    let settings = Settings::default();
    let pipeline = Pipeline::new(&settings, fixture.options()).with_processor(&FakeProcessor);

    pipeline.run(&[date]).unwrap();
    let artifacts = [
        fixture.calendar_path(date),
        fixture.map_path(date),
        climatology_path(&fixture.output, &StationId::new(PAYERNE)),
    ];
    let first: Vec<Vec<u8>> = artifacts.iter().map(|p| fs::read(p).unwrap()).collect();

    pipeline.run(&[date]).unwrap();
    let second: Vec<Vec<u8>> = artifacts.iter().map(|p| fs::read(p).unwrap()).collect();

    assert_eq!(first, second);
}

#[test]
fn test_excluded_station_has_no_climatology() {
    let fixture = Fixture::new();
    let date = d(2023, 6, 1);
    fixture.add_input(date, "a.nc", PAYERNE);
    fixture.add_input(date, "b.nc", LINDENBERG);

    let settings = Settings {
        exclude_stations_id_from_climatology: vec![LINDENBERG.to_string()],
        ..Settings::default()
    };
    let pipeline = Pipeline::new(&settings, fixture.options()).with_processor(&FakeProcessor);
    let summary = pipeline.run(&[date]).unwrap();

    assert_eq!(summary.climatology_excluded, vec![StationId::new(LINDENBERG)]);
    assert_eq!(summary.climatology_written, vec![StationId::new(PAYERNE)]);
    assert!(!climatology_path(&fixture.output, &StationId::new(LINDENBERG)).exists());

    // Still indexed in the calendar and map
    assert_eq!(summary.calendar_entries, 2);
    assert_eq!(summary.map_entries, 2);
}

#[test]
fn test_climatology_covers_stations_of_every_date() {
    let fixture = Fixture::new();
    fixture.add_input(d(2023, 6, 1), "a.nc", PAYERNE);
    fixture.add_input(d(2023, 6, 2), "a.nc", UCCLE);

    let settings = Settings::default();
    let pipeline = Pipeline::new(&settings, fixture.options()).with_processor(&FakeProcessor);
    let summary = pipeline.run(&[d(2023, 6, 1), d(2023, 6, 2)]).unwrap();

    assert_eq!(summary.stations.len(), 2);
    assert!(climatology_path(&fixture.output, &StationId::new(PAYERNE)).exists());
    assert!(climatology_path(&fixture.output, &StationId::new(UCCLE)).exists());
}

#[test]
fn test_missing_input_date_does_not_stop_run() {
    let fixture = Fixture::new();
    fixture.add_input(d(2023, 6, 2), "a.nc", PAYERNE);

    let settings = Settings::default();
    let pipeline = Pipeline::new(&settings, fixture.options()).with_processor(&FakeProcessor);
    let summary = pipeline.run(&[d(2023, 6, 1), d(2023, 6, 2)]).unwrap();

    assert_eq!(summary.date_failures.len(), 1);
    assert_eq!(summary.date_failures[0].0, d(2023, 6, 1));
    assert_eq!(summary.derived_files, 1);
    assert_eq!(summary.calendar_entries, 1);
    assert_eq!(summary.climatology_written, vec![StationId::new(PAYERNE)]);
}

#[test]
fn test_corrupt_calendar_is_preserved() {
    let fixture = Fixture::new();
    let date = d(2023, 6, 1);
    fixture.add_input(date, "a.nc", PAYERNE);

    let calendar_path = fixture.calendar_path(date);
    fs::create_dir_all(calendar_path.parent().unwrap()).unwrap();
    fs::write(&calendar_path, b"{ not json").unwrap();

    let settings = Settings::default();
    let pipeline = Pipeline::new(&settings, fixture.options()).with_processor(&FakeProcessor);
    let summary = pipeline.run(&[date]).unwrap();

    assert_eq!(fs::read(&calendar_path).unwrap(), b"{ not json");
    assert_eq!(summary.artifact_failures.len(), 1);
    assert_eq!(summary.calendar_entries, 0);
    // The map is independent of the broken calendar
    assert_eq!(summary.map_entries, 1);
    assert!(fixture.map_path(date).exists());
}

#[test]
fn test_indexing_without_data_stage() {
    let fixture = Fixture::new();
    let date = d(2023, 6, 1);

    // Derived files already on disk from an earlier run
    fixture.add_input(date, "a.nc", PAYERNE);
    let input = day_dir(&fixture.input, date).join("a.nc");
    FakeProcessor
        .process(&input, &[], &fixture.output, &Settings::default())
        .unwrap();

    let settings = Settings::default();
    let options = RunOptions {
        update_data: false,
        update_climatology: false,
        ..fixture.options()
    };
    let summary = Pipeline::new(&settings, options).run(&[date]).unwrap();

    assert_eq!(summary.derived_files, 0);
    assert_eq!(summary.calendar_entries, 1);
    assert!(summary.climatology_written.is_empty());
    assert!(!climatology_path(&fixture.output, &StationId::new(PAYERNE)).exists());
}

#[test]
fn test_data_stage_requires_processor() {
    let fixture = Fixture::new();
    let settings = Settings::default();
    let result = Pipeline::new(&settings, fixture.options()).run(&[d(2023, 6, 1)]);

    assert!(matches!(result, Err(ProcessingError::Config(_))));
}
