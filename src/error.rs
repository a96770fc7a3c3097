use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ProcessingError>;

#[derive(Error, Debug)]
pub enum ProcessingError {
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Date parsing error: {0}")]
    DateParse(#[from] chrono::ParseError),

    #[error("Input directory not found: {}", path.display())]
    InputMissing { path: PathBuf },

    #[error("Corrupt artifact {}: {source}", path.display())]
    CorruptArtifact {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid derived file name: {0}")]
    InvalidFileName(String),

    #[error("Processor failed on {}: {message}", path.display())]
    Processor { path: PathBuf, message: String },

    #[error("Processor panicked on {}", path.display())]
    WorkerPanicked { path: PathBuf },

    #[error("Degenerate climatology for station {station_id}: {reason}")]
    DegenerateClimatology { station_id: String, reason: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Settings error: {0}")]
    Settings(#[from] config::ConfigError),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Worker pool error: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}
