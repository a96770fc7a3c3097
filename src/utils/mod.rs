pub mod constants;
pub mod dates;
pub mod filename;
pub mod logging;
pub mod progress;

pub use constants::*;
pub use dates::{parse_date, DateSelection};
pub use logging::init_logging;
pub use progress::ProgressReporter;
