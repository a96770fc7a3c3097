pub mod dispatcher;
pub mod pipeline;
pub mod workflow;

pub use dispatcher::{DispatchReport, ExecutionMode, ProgressObserver, UnitFailure, WorkDispatcher};
pub use pipeline::{Pipeline, RunOptions, RunSummary};
pub use workflow::{CommandProcessor, Processor};
