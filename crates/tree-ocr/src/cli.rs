//! CLI definition using clap.
//!
//! Every setting can also come from the environment or a `.env` file.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use clap::Parser;
use tree_ocr_core::{ConfigError, EngineKind, Settings, StrategyKind};

/// Recognize text in a directory tree of images and mirror it into text files.
#[derive(Parser, Debug)]
#[command(name = "tree-ocr")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Root directory with one subdirectory per language
    #[arg(long, env = "INPUT_DIR")]
    pub input_dir: Option<PathBuf>,

    /// Directory the recognized text is written to
    #[arg(long, env = "OUT_FOLDER")]
    pub out_folder: Option<PathBuf>,

    /// OCR engine (tesseract or ocrs)
    #[arg(long, env = "OCR_ENGINE", default_value = "tesseract")]
    pub engine: EngineKind,

    /// Text assembly strategy (plain, lines, merged or blocks)
    #[arg(long, env = "OCR_STRATEGY", default_value = "plain")]
    pub strategy: StrategyKind,

    /// Detect and undo page rotation before recognition (tesseract only)
    #[arg(long, env = "OCR_AUTO_ORIENT", value_parser = clap::builder::BoolishValueParser::new())]
    pub auto_orient: bool,

    /// Tesseract page segmentation mode
    #[arg(long, env = "TESSERACT_PSM")]
    pub psm: Option<u8>,

    /// Tesseract executable
    #[arg(long, env = "TESSERACT_CMD", default_value = "tesseract")]
    pub tesseract_cmd: PathBuf,

    /// Directory with ocrs models (default: bin/../models)
    #[arg(long, env = "OCRS_MODELS_DIR")]
    pub models_dir: Option<PathBuf>,

    /// Log file, appended to on every run
    #[arg(long, env = "TREE_OCR_LOG_FILE", default_value = "text_recognition.log")]
    pub log_file: PathBuf,

    /// Environment file to load settings from
    #[arg(long, value_name = "PATH")]
    pub env_file: Option<PathBuf>,

    /// Print the run report as JSON
    #[arg(long)]
    pub json: bool,
}

impl Cli {
    /// Turn parsed arguments into validated settings.
    pub fn settings(&self) -> Result<Settings, ConfigError> {
        let mut settings = Settings::from_roots(
            self.input_dir.as_deref().map(expand),
            self.out_folder.as_deref().map(expand),
        )?;
        settings.engine = self.engine;
        settings.strategy = self.strategy;
        settings.auto_orient = self.auto_orient;
        settings.psm = self.psm;
        settings.tesseract_cmd = expand(&self.tesseract_cmd);
        settings.models_dir = self.models_dir.as_deref().map(expand);
        settings.validate()?;
        Ok(settings)
    }
}

/// Expand a leading `~` in a path.
fn expand(path: &Path) -> PathBuf {
    match path.to_str() {
        Some(s) => PathBuf::from(shellexpand::tilde(s).into_owned()),
        None => path.to_path_buf(),
    }
}

/// Find `--env-file` before clap runs, so the file can feed `env` defaults.
pub fn env_file_arg<I>(args: I) -> Option<PathBuf>
where
    I: IntoIterator<Item = OsString>,
{
    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        if arg == "--env-file" {
            return args.next().map(PathBuf::from);
        }
        if let Some(value) = arg.to_str().and_then(|a| a.strip_prefix("--env-file=")) {
            return Some(PathBuf::from(value));
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("tree-ocr").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_flags_build_settings() {
        let cli = parse(&[
            "--input-dir",
            "scans",
            "--out-folder",
            "text",
            "--engine",
            "ocrs",
            "--strategy",
            "merged",
            "--models-dir",
            "/opt/models",
        ]);

        let settings = cli.settings().unwrap();
        assert_eq!(settings.input_dir, PathBuf::from("scans"));
        assert_eq!(settings.out_folder, PathBuf::from("text"));
        assert_eq!(settings.engine, EngineKind::Ocrs);
        assert_eq!(settings.strategy, StrategyKind::Merged);
        assert_eq!(settings.models_dir, Some(PathBuf::from("/opt/models")));
        assert!(!settings.auto_orient);
    }

    #[test]
    fn test_invalid_engine_is_rejected_by_parser() {
        let result = Cli::try_parse_from(["tree-ocr", "--engine", "paddle"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_auto_orient_with_ocrs_fails_validation() {
        let cli = parse(&[
            "--input-dir",
            "in",
            "--out-folder",
            "out",
            "--engine",
            "ocrs",
            "--auto-orient",
        ]);
        assert_eq!(
            cli.settings().unwrap_err(),
            ConfigError::OrientationUnsupported(EngineKind::Ocrs)
        );
    }

    #[test]
    fn test_tilde_is_expanded() {
        assert_eq!(expand(Path::new("/data/scans")), PathBuf::from("/data/scans"));

        if std::env::var_os("HOME").is_some() {
            let expanded = expand(Path::new("~/scans"));
            assert!(!expanded.to_string_lossy().starts_with('~'));
            assert!(expanded.ends_with("scans"));
        }
    }

    #[test]
    fn test_env_file_arg() {
        let args = |v: &[&str]| v.iter().map(OsString::from).collect::<Vec<_>>();

        assert_eq!(
            env_file_arg(args(&["tree-ocr", "--env-file", "conf/.env"])),
            Some(PathBuf::from("conf/.env"))
        );
        assert_eq!(
            env_file_arg(args(&["tree-ocr", "--json", "--env-file=prod.env"])),
            Some(PathBuf::from("prod.env"))
        );
        assert_eq!(env_file_arg(args(&["tree-ocr", "--json"])), None);
    }
}
