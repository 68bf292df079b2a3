//! Batch OCR over a directory tree.
//!
//! This crate holds the OCR engine adapters, orientation correction, the
//! text assembly strategies and the driver that mirrors an input tree of
//! images into a tree of text files.

pub mod batch;
pub mod config;
pub mod engine;
pub mod orientation;
pub mod recognizer;
pub mod strategy;

pub use batch::{run_batch, run_batch_with_progress, BatchError, BatchProgress, NoProgress};
pub use config::{ConfigError, EngineKind, Settings};
pub use engine::OcrEngine;
pub use recognizer::Recognizer;
pub use strategy::StrategyKind;
