//! Per-file recognition: decode, optionally straighten, recognize.

use std::path::Path;

use image::{DynamicImage, ImageError, ImageReader};
use tracing::debug;
use tree_ocr_types::{Recognition, RecognizeError};

use crate::config::Settings;
use crate::engine::{build_engine, OcrEngine};
use crate::orientation::correct_orientation;
use crate::strategy::StrategyKind;

/// Recognizes single image files with one engine and one strategy.
pub struct Recognizer {
    engine: Box<dyn OcrEngine>,
    strategy: StrategyKind,
    auto_orient: bool,
}

impl Recognizer {
    pub fn new(engine: Box<dyn OcrEngine>, strategy: StrategyKind, auto_orient: bool) -> Self {
        Self {
            engine,
            strategy,
            auto_orient,
        }
    }

    /// Build the engine the settings select.
    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        let engine = build_engine(settings)?;
        Ok(Self::new(engine, settings.strategy, settings.auto_orient))
    }

    pub fn engine_name(&self) -> &str {
        self.engine.name()
    }

    /// Recognize the image at `path` using the language label `lang`.
    pub fn recognize(&self, path: &Path, lang: &str) -> Result<Recognition, RecognizeError> {
        let mut image = load_image(path)?;
        debug!(
            "Loaded {:?} ({}x{})",
            path,
            image.width(),
            image.height()
        );

        if self.auto_orient {
            image = correct_orientation(self.engine.as_ref(), image)?;
        }

        self.strategy.apply(self.engine.as_ref(), &image, lang)
    }
}

/// Decode an image file, classifying failures.
pub fn load_image(path: &Path) -> Result<DynamicImage, RecognizeError> {
    let unreadable = |reason: String| RecognizeError::Unreadable {
        path: path.to_path_buf(),
        reason,
    };

    let reader = ImageReader::open(path)
        .and_then(|r| r.with_guessed_format())
        .map_err(|e| unreadable(e.to_string()))?;

    reader.decode().map_err(|e| match e {
        ImageError::Unsupported(reason) => RecognizeError::UnsupportedFormat {
            path: path.to_path_buf(),
            reason: reason.to_string(),
        },
        other => unreadable(other.to_string()),
    })
}
