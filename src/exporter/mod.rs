// file: src/exporter/mod.rs
// description: export module exports
// reference: internal module structure

pub mod tabular;

pub use tabular::{CsvExporter, read_rows};
