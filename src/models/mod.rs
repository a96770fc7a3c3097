pub mod calendar;
pub mod climatology;
pub mod derived_file;
pub mod product;
pub mod station_map;

pub use calendar::CalendarArtifact;
pub use climatology::{ClimatologyArtifact, MonthlyProfile, Period, ValueRange};
pub use derived_file::{DerivedFile, StationId};
pub use product::{DerivedProduct, Profile, Scene, SceneCounts, StationAttributes};
pub use station_map::{MapArtifact, StationEntry};
