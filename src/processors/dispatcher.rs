use crate::error::{ProcessingError, Result};
use crate::processors::Processor;
use crate::readers::list_input_files;
use crate::settings::Settings;
use crate::utils::filename::day_dir;
use chrono::NaiveDate;
use rayon::prelude::*;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{debug, info, warn};

/// How the per-file units of one date are executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionMode {
    /// Strictly in listing order on the calling thread.
    Sequential,
    /// On a bounded pool of `workers` threads.
    Parallel { workers: usize },
}

/// Receives a completion signal for every unit, successful or not.
pub trait ProgressObserver: Sync {
    fn unit_completed(&self, completed: usize, total: usize);
}

/// One input file whose processing failed.
#[derive(Debug)]
pub struct UnitFailure {
    pub input: PathBuf,
    pub error: ProcessingError,
}

/// Outcome of processing every input file of one date.
#[derive(Debug)]
pub struct DispatchReport {
    pub date: NaiveDate,
    pub total_inputs: usize,
    /// Derived files produced, sorted by path.
    pub derived: Vec<PathBuf>,
    /// Inputs processed without producing a derived file.
    pub skipped: usize,
    pub failures: Vec<UnitFailure>,
}

pub struct WorkDispatcher<'a> {
    processor: &'a dyn Processor,
    settings: &'a Settings,
    input_base: PathBuf,
    output_base: PathBuf,
    instrument_types: Vec<String>,
    mode: ExecutionMode,
}

impl<'a> WorkDispatcher<'a> {
    pub fn new(
        processor: &'a dyn Processor,
        settings: &'a Settings,
        input_base: &Path,
        output_base: &Path,
    ) -> Self {
        Self {
            processor,
            settings,
            input_base: input_base.to_path_buf(),
            output_base: output_base.to_path_buf(),
            instrument_types: Vec::new(),
            mode: ExecutionMode::Sequential,
        }
    }

    pub fn with_instrument_types(mut self, instrument_types: Vec<String>) -> Self {
        self.instrument_types = instrument_types;
        self
    }

    pub fn with_mode(mut self, mode: ExecutionMode) -> Self {
        self.mode = mode;
        self
    }

    /// Run the processor over every input file of `date`.
    ///
    /// Fails only when the date's input directory cannot be listed; failures
    /// of individual files are collected in the report.
    pub fn dispatch(
        &self,
        date: NaiveDate,
        observer: Option<&dyn ProgressObserver>,
    ) -> Result<DispatchReport> {
        let inputs = list_input_files(&day_dir(&self.input_base, date))?;
        let total = inputs.len();
        let completed = AtomicUsize::new(0);

        info!(%date, files = total, mode = ?self.mode, "processing input files");

        let run = |input: &PathBuf| {
            let result = self.run_unit(input);
            let count = completed.fetch_add(1, Ordering::Relaxed) + 1;
            if let Some(observer) = observer {
                observer.unit_completed(count, total);
            }
            (input.clone(), result)
        };

        let outcomes: Vec<(PathBuf, Result<Option<PathBuf>>)> = match self.mode {
            ExecutionMode::Sequential => inputs.iter().map(run).collect(),
            ExecutionMode::Parallel { workers } => {
                let pool = rayon::ThreadPoolBuilder::new()
                    .num_threads(workers.max(1))
                    .build()?;
                pool.install(|| inputs.par_iter().map(run).collect())
            }
        };

        let mut report = DispatchReport {
            date,
            total_inputs: total,
            derived: Vec::new(),
            skipped: 0,
            failures: Vec::new(),
        };

        for (input, outcome) in outcomes {
            match outcome {
                Ok(Some(derived)) => report.derived.push(derived),
                Ok(None) => {
                    debug!(input = %input.display(), "no product for input");
                    report.skipped += 1;
                }
                Err(error) => {
                    warn!(input = %input.display(), %error, "processing failed, skipping file");
                    report.failures.push(UnitFailure { input, error });
                }
            }
        }

        report.derived.sort();
        report.derived.dedup();

        info!(
            %date,
            derived = report.derived.len(),
            skipped = report.skipped,
            failed = report.failures.len(),
            "input files processed"
        );

        Ok(report)
    }

    /// A panicking processor counts as a failure of its own unit only.
    fn run_unit(&self, input: &Path) -> Result<Option<PathBuf>> {
        let outcome = catch_unwind(AssertUnwindSafe(|| {
            self.processor.process(
                input,
                &self.instrument_types,
                &self.output_base,
                self.settings,
            )
        }));

        outcome.unwrap_or_else(|_| {
            Err(ProcessingError::WorkerPanicked {
                path: input.to_path_buf(),
            })
        })
    }
}
