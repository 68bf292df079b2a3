//! Output formatting for run reports.

use tree_ocr_types::BatchReport;

/// Output formatter.
pub struct Output {
    json: bool,
}

impl Output {
    /// Create a new output formatter.
    pub fn new(json: bool) -> Self {
        Self { json }
    }

    /// Print the report of a finished run.
    pub fn print_report(&self, report: &BatchReport) -> anyhow::Result<()> {
        if self.json {
            println!("{}", serde_json::to_string(report)?);
        } else {
            print!("{}", render_summary(report));
        }
        Ok(())
    }
}

/// Human-readable run summary.
pub fn render_summary(report: &BatchReport) -> String {
    if report.input_missing {
        if report.input_dir.as_os_str().is_empty() {
            return "Input directory is not configured, nothing to do\n".to_string();
        }
        return format!(
            "Input directory {} does not exist, nothing to do\n",
            report.input_dir.display()
        );
    }

    let mut summary = format!(
        "Processed {} file(s), skipped {} top-level file(s), {} failed\n",
        report.processed, report.skipped_top_level, report.failed
    );
    for failure in report.failures() {
        let reason = failure
            .error
            .as_ref()
            .map(|e| e.message.as_str())
            .unwrap_or("unknown error");
        summary.push_str(&format!("  {}: {}\n", failure.input.display(), reason));
    }
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tree_ocr_types::{ErrorKind, FileError, FileOutcome, OutcomeStatus};

    #[test]
    fn test_summary_lists_failures() {
        let mut report = BatchReport::new("in", "out");
        report.skipped_top_level = 2;
        report.record(FileOutcome {
            input: PathBuf::from("in/en/ok.png"),
            output: PathBuf::from("out/en/ok.txt"),
            language: "en".to_string(),
            status: OutcomeStatus::Written,
            lines: 0,
            error: None,
        });
        report.record(FileOutcome {
            input: PathBuf::from("in/en/bad.jpg"),
            output: PathBuf::from("out/en/bad.txt"),
            language: "en".to_string(),
            status: OutcomeStatus::Failed,
            lines: 0,
            error: Some(FileError {
                kind: ErrorKind::Unreadable,
                message: "unexpected end of file".to_string(),
            }),
        });

        assert_eq!(
            render_summary(&report),
            "Processed 1 file(s), skipped 2 top-level file(s), 1 failed\n  in/en/bad.jpg: unexpected end of file\n"
        );
    }

    #[test]
    fn test_summary_for_missing_input() {
        let mut report = BatchReport::new("nowhere", "out");
        report.input_missing = true;
        assert_eq!(
            render_summary(&report),
            "Input directory nowhere does not exist, nothing to do\n"
        );

        let mut report = BatchReport::default();
        report.input_missing = true;
        assert_eq!(
            render_summary(&report),
            "Input directory is not configured, nothing to do\n"
        );
    }
}
