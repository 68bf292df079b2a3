//! Shared types for tree-ocr.
//!
//! This crate defines the recognition results produced by OCR engines,
//! the per-file error taxonomy, and the report emitted at the end of a
//! batch run.

mod error;
mod line;
mod report;

pub use error::*;
pub use line::*;
pub use report::*;
