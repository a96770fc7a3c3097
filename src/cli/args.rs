use crate::utils::constants::{DEFAULT_INPUT_DIR, DEFAULT_INSTRUMENT_TYPES, DEFAULT_OUTPUT_DIR};
use crate::utils::parse_date;
use chrono::NaiveDate;
use clap::{ArgAction, Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "aprocess")]
#[command(about = "Process lidar/ceilometer profiles and maintain calendar, map and climatology indexes")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, global = true, help = "Enable verbose logging")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Log file path")]
    pub log_file: Option<PathBuf>,

    #[arg(short, long, global = true, help = "Settings file (JSON, TOML or YAML)")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the standard workflow for the selected dates
    Run(RunArgs),

    /// Recompute the climatology of specific stations
    Climatology {
        #[arg(required = true, help = "Station identifiers")]
        stations: Vec<String>,

        #[arg(long, default_value = DEFAULT_OUTPUT_DIR, help = "Base path for output data")]
        basedir_out: PathBuf,

        #[arg(long, help = "Variable to summarise [default: from settings]")]
        variable: Option<String>,

        #[arg(long, help = "Include all scenes, not only aerosols")]
        all_scenes: bool,
    },
}

#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    #[arg(long = "date", value_parser = parse_date, help = "Processing date (YYYY-MM-DD)")]
    pub dates: Vec<NaiveDate>,

    #[arg(long, value_parser = parse_date, help = "Initial date")]
    pub from: Option<NaiveDate>,

    #[arg(long, value_parser = parse_date, help = "Ending date [default: today]")]
    pub to: Option<NaiveDate>,

    #[arg(long, help = "Process today")]
    pub today: bool,

    #[arg(long, help = "Process yesterday")]
    pub yesterday: bool,

    #[arg(
        long = "instruments-type",
        default_values = DEFAULT_INSTRUMENT_TYPES,
        help = "Instrument types to process"
    )]
    pub instruments_types: Vec<String>,

    #[arg(long, help = "Process files of a date in parallel")]
    pub parallel: bool,

    #[arg(long, help = "Worker count for --parallel [default: from settings]")]
    pub max_workers: Option<usize>,

    #[arg(long, default_value = DEFAULT_INPUT_DIR, help = "Base path for input data")]
    pub basedir_in: PathBuf,

    #[arg(long, default_value = DEFAULT_OUTPUT_DIR, help = "Base path for output data")]
    pub basedir_out: PathBuf,

    #[arg(long = "no-data", action = ArgAction::SetFalse, help = "Skip the data stage")]
    pub update_data: bool,

    #[arg(long = "no-calendar", action = ArgAction::SetFalse, help = "Skip the calendar update")]
    pub update_calendar: bool,

    #[arg(long = "no-map", action = ArgAction::SetFalse, help = "Skip the map update")]
    pub update_map: bool,

    #[arg(long = "no-climatology", action = ArgAction::SetFalse, help = "Skip the climatology update")]
    pub update_climatology: bool,

    #[arg(long = "no-progress-bar", action = ArgAction::SetFalse, help = "Hide progress bars")]
    pub progress_bar: bool,
}
