pub mod json_document;

pub use json_document::{ensure_document, replace_document, update_document, JsonDocument};
