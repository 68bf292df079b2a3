//! Terminal progress bar over a batch run.

use indicatif::{ProgressBar, ProgressStyle};
use tree_ocr_core::BatchProgress;
use tree_ocr_types::FileOutcome;

const TEMPLATE: &str = "{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} {msg}";

/// Draws one bar on stderr for the whole walk. Disabled reporters draw nothing.
pub struct ProgressReporter {
    enabled: bool,
    bar: Option<ProgressBar>,
}

impl ProgressReporter {
    pub fn new(enabled: bool) -> Self {
        Self { enabled, bar: None }
    }
}

impl BatchProgress for ProgressReporter {
    fn start(&mut self, total: usize) {
        if !self.enabled {
            return;
        }
        let bar = ProgressBar::new(total as u64);
        if let Ok(style) = ProgressStyle::with_template(TEMPLATE) {
            bar.set_style(style.progress_chars("=> "));
        }
        self.bar = Some(bar);
    }

    fn file_done(&mut self, outcome: &FileOutcome) {
        if let Some(bar) = &self.bar {
            bar.set_message(outcome.language.clone());
            bar.inc(1);
        }
    }

    fn finish(&mut self) {
        if let Some(bar) = self.bar.take() {
            bar.finish_and_clear();
        }
    }
}
