use crate::error::{ProcessingError, Result};
use crate::settings::{Settings, WorkflowSettings};
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::debug;

/// Turns one raw instrument file into (at most) one derived product.
///
/// Implementations must not share mutable state between calls: the
/// dispatcher may call `process` from several worker threads at once.
pub trait Processor: Send + Sync {
    /// Returns the path of the derived file written under `output_base`, or
    /// `None` when the input is not eligible (e.g. filtered instrument type).
    fn process(
        &self,
        input: &Path,
        instrument_types: &[String],
        output_base: &Path,
        settings: &Settings,
    ) -> Result<Option<PathBuf>>;
}

/// Runs an external workflow program once per input file, each in its own
/// OS process.
///
/// Invocation: `<command> <args..> <input> --base-dir <output_base>
/// [--instruments-type <type>]..`. The last non-empty line printed on
/// stdout is the derived file path; no output means no product.
#[derive(Debug, Clone)]
pub struct CommandProcessor {
    command: String,
    args: Vec<String>,
}

impl CommandProcessor {
    pub fn new(command: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            command: command.into(),
            args,
        }
    }

    pub fn from_settings(workflow: &WorkflowSettings) -> Result<Self> {
        let command = workflow.command.clone().ok_or_else(|| {
            ProcessingError::Config("workflow.command is not configured".to_string())
        })?;
        Ok(Self::new(command, workflow.args.clone()))
    }

    fn build_command(&self, input: &Path, instrument_types: &[String], output_base: &Path) -> Command {
        let mut cmd = Command::new(&self.command);
        cmd.args(&self.args).arg(input).arg("--base-dir").arg(output_base);
        for instrument_type in instrument_types {
            cmd.arg("--instruments-type").arg(instrument_type);
        }
        cmd
    }
}

impl Processor for CommandProcessor {
    fn process(
        &self,
        input: &Path,
        instrument_types: &[String],
        output_base: &Path,
        _settings: &Settings,
    ) -> Result<Option<PathBuf>> {
        let output = self
            .build_command(input, instrument_types, output_base)
            .output()
            .map_err(|e| ProcessingError::Processor {
                path: input.to_path_buf(),
                message: format!("failed to start '{}': {}", self.command, e),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ProcessingError::Processor {
                path: input.to_path_buf(),
                message: format!("{}: {}", output.status, stderr.trim()),
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let derived = stdout
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .last()
            .map(PathBuf::from);

        debug!(input = %input.display(), derived = ?derived, "workflow finished");
        Ok(derived)
    }
}
