pub mod directory_reader;
pub mod history_reader;
pub mod product_reader;

pub use directory_reader::{list_derived_files, list_input_files};
pub use history_reader::station_history;
pub use product_reader::ProductReader;
