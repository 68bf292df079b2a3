//! Batch run report.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::ErrorKind;

/// Summary of one batch run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchReport {
    /// Root that was walked.
    pub input_dir: PathBuf,

    /// Root outputs were mirrored into.
    pub out_folder: PathBuf,

    /// True when the input directory did not exist and nothing was done.
    pub input_missing: bool,

    /// Files whose text was written.
    pub processed: usize,

    /// Files directly under the input directory, ignored by policy.
    pub skipped_top_level: usize,

    /// Files that failed recognition or writing.
    pub failed: usize,

    /// Per-file outcomes in visiting order.
    pub files: Vec<FileOutcome>,
}

impl BatchReport {
    pub fn new(input_dir: impl Into<PathBuf>, out_folder: impl Into<PathBuf>) -> Self {
        Self {
            input_dir: input_dir.into(),
            out_folder: out_folder.into(),
            ..Default::default()
        }
    }

    /// Record an outcome and update the counters.
    pub fn record(&mut self, outcome: FileOutcome) {
        match outcome.status {
            OutcomeStatus::Written => self.processed += 1,
            OutcomeStatus::Failed => self.failed += 1,
        }
        self.files.push(outcome);
    }

    /// Outcomes that failed.
    pub fn failures(&self) -> impl Iterator<Item = &FileOutcome> {
        self.files
            .iter()
            .filter(|f| f.status == OutcomeStatus::Failed)
    }
}

/// Result of processing a single input file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileOutcome {
    /// Input file path.
    pub input: PathBuf,

    /// Mirrored output path.
    pub output: PathBuf,

    /// Language label (the path between the input root and the file).
    pub language: String,

    /// Whether the output was written.
    pub status: OutcomeStatus,

    /// Number of recognized lines (0 for plain-text recognition).
    pub lines: usize,

    /// Failure details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<FileError>,
}

/// Outcome status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeStatus {
    Written,
    Failed,
}

/// Failure details for a file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileError {
    pub kind: ErrorKind,
    pub message: String,
}
