//! Run configuration.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::strategy::StrategyKind;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Input directory is not configured (set INPUT_DIR or --input-dir)")]
    MissingInputDir,

    #[error("Output folder is not configured (set OUT_FOLDER or --out-folder)")]
    MissingOutFolder,

    #[error("Invalid page segmentation mode {0} (expected 0-13)")]
    InvalidPsm(u8),

    #[error("Engine '{0}' cannot detect orientation; disable --auto-orient or use tesseract")]
    OrientationUnsupported(EngineKind),

    #[error("Unknown engine '{0}' (expected tesseract or ocrs)")]
    UnknownEngine(String),

    #[error("Unknown strategy '{0}' (expected plain, lines, merged or blocks)")]
    UnknownStrategy(String),
}

/// Which OCR engine backs recognition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngineKind {
    /// Tesseract command-line tool.
    #[default]
    Tesseract,
    /// In-process ocrs models.
    Ocrs,
}

impl EngineKind {
    pub fn supports_orientation(self) -> bool {
        matches!(self, EngineKind::Tesseract)
    }
}

impl fmt::Display for EngineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineKind::Tesseract => write!(f, "tesseract"),
            EngineKind::Ocrs => write!(f, "ocrs"),
        }
    }
}

impl FromStr for EngineKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "tesseract" => Ok(EngineKind::Tesseract),
            "ocrs" => Ok(EngineKind::Ocrs),
            other => Err(ConfigError::UnknownEngine(other.to_string())),
        }
    }
}

/// Immutable settings for one run.
///
/// Built once at startup and passed by reference to everything that needs it.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Root whose language subdirectories are recognized.
    pub input_dir: PathBuf,

    /// Root the text files are mirrored into.
    pub out_folder: PathBuf,

    pub engine: EngineKind,
    pub strategy: StrategyKind,

    /// Detect and undo page rotation before recognition.
    pub auto_orient: bool,

    /// Tesseract page segmentation mode.
    pub psm: Option<u8>,

    /// Tesseract executable.
    pub tesseract_cmd: PathBuf,

    /// ocrs model directory. `None` means next to the executable.
    pub models_dir: Option<PathBuf>,
}

impl Settings {
    /// Settings with default engine options for the given roots.
    pub fn new(input_dir: impl Into<PathBuf>, out_folder: impl Into<PathBuf>) -> Self {
        Self {
            input_dir: input_dir.into(),
            out_folder: out_folder.into(),
            engine: EngineKind::default(),
            strategy: StrategyKind::default(),
            auto_orient: false,
            psm: None,
            tesseract_cmd: PathBuf::from("tesseract"),
            models_dir: None,
        }
    }

    /// Build settings from optional roots, as read from flags or the environment.
    pub fn from_roots(
        input_dir: Option<PathBuf>,
        out_folder: Option<PathBuf>,
    ) -> Result<Self, ConfigError> {
        let input_dir = input_dir
            .filter(|p| !p.as_os_str().is_empty())
            .ok_or(ConfigError::MissingInputDir)?;
        let out_folder = out_folder
            .filter(|p| !p.as_os_str().is_empty())
            .ok_or(ConfigError::MissingOutFolder)?;
        Ok(Self::new(input_dir, out_folder))
    }

    /// Check cross-field consistency. Does not touch the filesystem.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(psm) = self.psm {
            if psm > 13 {
                return Err(ConfigError::InvalidPsm(psm));
            }
        }
        if self.auto_orient && !self.engine.supports_orientation() {
            return Err(ConfigError::OrientationUnsupported(self.engine));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_kind_parse() {
        assert_eq!("tesseract".parse::<EngineKind>(), Ok(EngineKind::Tesseract));
        assert_eq!(" OCRS ".parse::<EngineKind>(), Ok(EngineKind::Ocrs));
        assert_eq!(
            "paddle".parse::<EngineKind>(),
            Err(ConfigError::UnknownEngine("paddle".to_string()))
        );
    }

    #[test]
    fn test_from_roots_requires_both() {
        assert_eq!(
            Settings::from_roots(None, Some(PathBuf::from("out"))).unwrap_err(),
            ConfigError::MissingInputDir
        );
        assert_eq!(
            Settings::from_roots(Some(PathBuf::from("in")), None).unwrap_err(),
            ConfigError::MissingOutFolder
        );
        assert_eq!(
            Settings::from_roots(Some(PathBuf::new()), Some(PathBuf::from("out"))).unwrap_err(),
            ConfigError::MissingInputDir
        );

        let settings =
            Settings::from_roots(Some(PathBuf::from("in")), Some(PathBuf::from("out"))).unwrap();
        assert_eq!(settings.input_dir, PathBuf::from("in"));
        assert_eq!(settings.engine, EngineKind::Tesseract);
        assert_eq!(settings.strategy, StrategyKind::Plain);
    }

    #[test]
    fn test_validate_rejects_bad_psm() {
        let mut settings = Settings::new("in", "out");
        settings.psm = Some(14);
        assert_eq!(settings.validate(), Err(ConfigError::InvalidPsm(14)));

        settings.psm = Some(6);
        assert_eq!(settings.validate(), Ok(()));
    }

    #[test]
    fn test_validate_rejects_orientation_without_support() {
        let mut settings = Settings::new("in", "out");
        settings.engine = EngineKind::Ocrs;
        settings.auto_orient = true;
        assert_eq!(
            settings.validate(),
            Err(ConfigError::OrientationUnsupported(EngineKind::Ocrs))
        );

        settings.engine = EngineKind::Tesseract;
        assert_eq!(settings.validate(), Ok(()));
    }

    #[test]
    fn test_orientation_capability_per_engine() {
        assert!(EngineKind::Tesseract.supports_orientation());
        assert!(!EngineKind::Ocrs.supports_orientation());
    }

    #[test]
    fn test_every_strategy_is_valid_with_every_engine() {
        for engine in [EngineKind::Tesseract, EngineKind::Ocrs] {
            for strategy in [
                StrategyKind::Plain,
                StrategyKind::Lines,
                StrategyKind::Merged,
                StrategyKind::Blocks,
            ] {
                let mut settings = Settings::new("in", "out");
                settings.engine = engine;
                settings.strategy = strategy;
                assert_eq!(settings.validate(), Ok(()), "{} with {}", strategy, engine);
            }
        }
    }
}
