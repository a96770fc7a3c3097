use crate::aggregators::ClimatologyAggregator;
use crate::cli::args::{Cli, Commands, RunArgs};
use crate::error::Result;
use crate::models::StationId;
use crate::processors::{CommandProcessor, ExecutionMode, Pipeline, Processor, RunOptions};
use crate::settings::Settings;
use crate::utils::dates::{today, DateSelection};
use crate::utils::init_logging;
use std::path::Path;
use tracing::{info, warn};

pub fn run(cli: Cli) -> Result<()> {
    init_logging(cli.verbose, cli.log_file.as_deref())?;

    let settings = Settings::load(cli.config.as_deref())?;
    info!(
        excluded = settings.exclude_stations_id_from_climatology.len(),
        workers = settings.max_workers,
        "settings loaded"
    );

    match cli.command {
        Commands::Run(args) => run_workflow(args, &settings),
        Commands::Climatology {
            stations,
            basedir_out,
            variable,
            all_scenes,
        } => recompute_climatology(&stations, &basedir_out, variable, all_scenes, &settings),
    }
}

fn run_workflow(args: RunArgs, settings: &Settings) -> Result<()> {
    let selection = DateSelection {
        dates: args.dates.clone(),
        today: args.today,
        yesterday: args.yesterday,
        from: args.from,
        to: args.to,
    };
    let dates = selection.enumerate(today());

    if dates.is_empty() {
        println!("No dates selected - nothing to do");
        return Ok(());
    }

    println!("Processing {} date(s)...", dates.len());
    println!("Input directory: {}", args.basedir_in.display());
    println!("Output directory: {}", args.basedir_out.display());

    let mode = if args.parallel {
        ExecutionMode::Parallel {
            workers: args.max_workers.unwrap_or(settings.max_workers),
        }
    } else {
        ExecutionMode::Sequential
    };

    let options = RunOptions {
        input_base: args.basedir_in,
        output_base: args.basedir_out,
        instrument_types: args.instruments_types,
        mode,
        update_data: args.update_data,
        update_calendar: args.update_calendar,
        update_map: args.update_map,
        update_climatology: args.update_climatology,
        show_progress: args.progress_bar,
    };

    let processor = if options.update_data {
        Some(CommandProcessor::from_settings(&settings.workflow)?)
    } else {
        None
    };

    let mut pipeline = Pipeline::new(settings, options);
    if let Some(ref processor) = processor {
        pipeline = pipeline.with_processor(processor as &dyn Processor);
    }

    let summary = pipeline.run(&dates)?;
    println!("\n{}", summary.summary());

    if summary.is_clean() {
        println!("✅ Processing complete");
    } else {
        println!("⚠️  Processing complete with failures (see above)");
    }

    Ok(())
}

fn recompute_climatology(
    stations: &[String],
    basedir_out: &Path,
    variable: Option<String>,
    all_scenes: bool,
    settings: &Settings,
) -> Result<()> {
    let variable = variable.unwrap_or_else(|| settings.climatology.variable.clone());
    let aerosols_only = settings.climatology.aerosols_only && !all_scenes;
    let aggregator = ClimatologyAggregator::new(basedir_out)
        .with_min_profiles(settings.climatology.min_profiles);

    for station in stations.iter().map(StationId::new) {
        if settings.is_excluded_from_climatology(&station) {
            println!("  • {}: excluded from climatology", station);
            continue;
        }

        match aggregator.compute_climatology(&station, &variable, aerosols_only) {
            Ok(path) => println!("  ✓ {}: {}", station, path.display()),
            Err(e) => {
                warn!(%station, error = %e, "climatology failed");
                println!("  ✗ {}: {}", station, e);
            }
        }
    }

    Ok(())
}
