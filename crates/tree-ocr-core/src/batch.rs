//! Directory walk and batch driver.
//!
//! Every file under `<input_dir>/<lang_dir>/` is recognized with `lang_dir`
//! as its language label and written to `<out_folder>/<lang_dir>/<stem>.txt`.
//! Files directly under `input_dir` are skipped. Symlinked files are
//! recognized; symlinked directories are not walked. A failing file is logged
//! and recorded; it never stops the walk.

use std::ffi::OsStr;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, error, info, warn};
use tree_ocr_types::{BatchReport, ErrorKind, FileError, FileOutcome, OutcomeStatus};
use walkdir::{DirEntry, WalkDir};

use crate::config::Settings;
use crate::recognizer::Recognizer;

#[derive(Error, Debug)]
pub enum BatchError {
    #[error("Input path {0:?} is not a directory")]
    NotADirectory(PathBuf),

    #[error("Failed to initialize OCR engine: {0:#}")]
    Engine(anyhow::Error),
}

/// Receives progress while a batch runs. All methods default to no-ops.
pub trait BatchProgress {
    /// Called once, before recognition starts, with the number of files queued.
    fn start(&mut self, _total: usize) {}

    /// Called after each file, whether it was written or failed.
    fn file_done(&mut self, _outcome: &FileOutcome) {}

    fn finish(&mut self) {}
}

/// Progress sink that ignores everything.
pub struct NoProgress;

impl BatchProgress for NoProgress {}

/// Language label for a file: its parent directory relative to the input root.
///
/// Returns `None` for files directly under the root or outside it.
pub fn lang_dir(input_dir: &Path, file: &Path) -> Option<PathBuf> {
    let parent = file.parent()?;
    let relative = parent.strip_prefix(input_dir).ok()?;
    if relative.as_os_str().is_empty() {
        None
    } else {
        Some(relative.to_path_buf())
    }
}

/// File name with the last extension removed.
pub fn output_stem(file_name: &OsStr) -> &OsStr {
    Path::new(file_name).file_stem().unwrap_or(file_name)
}

/// Mirrored output path for an input file.
pub fn output_path(out_folder: &Path, lang_dir: &Path, file_name: &OsStr) -> PathBuf {
    let mut name = output_stem(file_name).to_os_string();
    name.push(".txt");
    out_folder.join(lang_dir).join(name)
}

/// Write text, replacing any previous output, creating parent directories.
fn write_output(path: &Path, text: &str) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, text)
}

/// Walk `settings.input_dir` and recognize every file in a language subdirectory.
///
/// The recognizer is only built once the input directory is known to exist.
pub fn run_batch<F>(settings: &Settings, make_recognizer: F) -> Result<BatchReport, BatchError>
where
    F: FnOnce() -> anyhow::Result<Recognizer>,
{
    run_batch_with_progress(settings, make_recognizer, &mut NoProgress)
}

/// [`run_batch`], reporting each finished file to `progress`.
pub fn run_batch_with_progress<F>(
    settings: &Settings,
    make_recognizer: F,
    progress: &mut dyn BatchProgress,
) -> Result<BatchReport, BatchError>
where
    F: FnOnce() -> anyhow::Result<Recognizer>,
{
    let input_dir = settings.input_dir.as_path();
    let mut report = BatchReport::new(input_dir, &settings.out_folder);

    if !input_dir.exists() {
        warn!("Input directory {:?} does not exist, nothing to do", input_dir);
        report.input_missing = true;
        return Ok(report);
    }
    if !input_dir.is_dir() {
        return Err(BatchError::NotADirectory(input_dir.to_path_buf()));
    }

    let recognizer = make_recognizer().map_err(BatchError::Engine)?;
    info!(
        "Recognizing files under {:?} with {} into {:?}",
        input_dir,
        recognizer.engine_name(),
        settings.out_folder
    );

    let queue = collect_inputs(input_dir, &mut report);
    progress.start(queue.len());

    for (path, lang) in &queue {
        let outcome = process_file(&recognizer, path, lang, &settings.out_folder);
        progress.file_done(&outcome);
        report.record(outcome);
    }
    progress.finish();

    info!(
        "Done: {} processed, {} skipped, {} failed",
        report.processed, report.skipped_top_level, report.failed
    );
    Ok(report)
}

/// Sorted list of `(file, lang_dir)` pairs to recognize.
fn collect_inputs(input_dir: &Path, report: &mut BatchReport) -> Vec<(PathBuf, PathBuf)> {
    let walker = WalkDir::new(input_dir)
        .follow_links(false)
        .sort_by_file_name();

    let mut queue = Vec::new();
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                error!("Failed to read directory entry: {}", e);
                continue;
            }
        };
        if !is_input_file(&entry) {
            continue;
        }

        let path = entry.path();
        match lang_dir(input_dir, path) {
            Some(lang) => queue.push((path.to_path_buf(), lang)),
            None => {
                debug!("Skipping top-level file {:?}", path);
                report.skipped_top_level += 1;
            }
        }
    }
    queue
}

/// Regular files and links to anything but a directory.
///
/// A broken link is kept so that it fails and shows up in the report.
fn is_input_file(entry: &DirEntry) -> bool {
    let file_type = entry.file_type();
    if file_type.is_symlink() {
        if entry.path().is_dir() {
            debug!("Not descending into linked directory {:?}", entry.path());
            return false;
        }
        return true;
    }
    file_type.is_file()
}

fn process_file(recognizer: &Recognizer, path: &Path, lang: &Path, out_folder: &Path) -> FileOutcome {
    let language = lang.to_string_lossy().into_owned();
    let output = output_path(out_folder, lang, path.file_name().unwrap_or_default());

    let failed = |kind: ErrorKind, message: String| FileOutcome {
        input: path.to_path_buf(),
        output: output.clone(),
        language: language.clone(),
        status: OutcomeStatus::Failed,
        lines: 0,
        error: Some(FileError { kind, message }),
    };

    debug!("Recognizing {:?} ({})", path, language);
    let recognition = match recognizer.recognize(path, &language) {
        Ok(recognition) => recognition,
        Err(e) => {
            error!("Failed to recognize text in {:?}: {}", path, e);
            return failed(e.kind(), e.to_string());
        }
    };

    if let Err(e) = write_output(&output, &recognition.text) {
        error!("Failed to write {:?}: {}", output, e);
        return failed(ErrorKind::Write, e.to_string());
    }

    info!("Wrote {:?}", output);
    FileOutcome {
        input: path.to_path_buf(),
        output,
        language,
        status: OutcomeStatus::Written,
        lines: recognition.lines.len(),
        error: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_lang_dir() {
        let root = Path::new("/data/in");
        assert_eq!(
            lang_dir(root, Path::new("/data/in/en/page.png")),
            Some(PathBuf::from("en"))
        );
        assert_eq!(
            lang_dir(root, Path::new("/data/in/ru/scans/page.png")),
            Some(PathBuf::from("ru/scans"))
        );
        assert_eq!(lang_dir(root, Path::new("/data/in/page.png")), None);
        assert_eq!(lang_dir(root, Path::new("/elsewhere/en/page.png")), None);
    }

    #[test]
    fn test_output_stem_removes_last_extension() {
        assert_eq!(output_stem(OsStr::new("page.png")), "page");
        assert_eq!(output_stem(OsStr::new("archive.tar.gz")), "archive.tar");
        assert_eq!(output_stem(OsStr::new("README")), "README");
        assert_eq!(output_stem(OsStr::new(".hidden")), ".hidden");
    }

    #[test]
    fn test_output_path_mirrors_lang_dir() {
        assert_eq!(
            output_path(Path::new("out"), Path::new("ru/scans"), OsStr::new("p1.jpeg")),
            PathBuf::from("out/ru/scans/p1.txt")
        );
    }

    #[test]
    fn test_write_output_overwrites() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("en").join("page.txt");

        write_output(&path, "first version, longer").unwrap();
        write_output(&path, "second").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "second");
    }

    proptest! {
        #[test]
        fn prop_output_path_is_under_lang_dir(
            lang in "[a-z]{2,3}",
            stem in "[a-zA-Z0-9_]{1,12}",
            ext in "[a-z]{1,4}",
        ) {
            let file_name = format!("{}.{}", stem, ext);
            let path = output_path(Path::new("out"), Path::new(&lang), OsStr::new(&file_name));
            prop_assert_eq!(path, Path::new("out").join(&lang).join(format!("{}.txt", stem)));
        }
    }
}
