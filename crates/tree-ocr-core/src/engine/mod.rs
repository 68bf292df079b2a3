//! OCR engines.
//!
//! Each engine adapts a third-party recognizer to the [`OcrEngine`] trait so
//! the batch driver does not care which one is in use.

mod ocrs_engine;
mod tesseract;

use anyhow::Result;
use image::DynamicImage;
use tree_ocr_types::{Orientation, RecognizeError, RecognizedLine};

use crate::config::{EngineKind, Settings};
use crate::strategy::join_lines;

pub use self::ocrs_engine::{default_models_dir, OcrsEngine};
pub use self::tesseract::TesseractEngine;

/// A text recognition backend.
pub trait OcrEngine {
    /// Engine name used in logs and errors.
    fn name(&self) -> &str;

    /// Recognize an image as plain text.
    fn recognize_text(&self, image: &DynamicImage, lang: &str) -> Result<String, RecognizeError> {
        let lines = self.recognize_lines(image, lang)?;
        Ok(join_lines(&lines))
    }

    /// Recognize an image line by line, in the engine's reading order.
    fn recognize_lines(
        &self,
        image: &DynamicImage,
        lang: &str,
    ) -> Result<Vec<RecognizedLine>, RecognizeError>;

    /// Detect how far the page is rotated from upright.
    ///
    /// Only engines whose [`EngineKind::supports_orientation`] is true
    /// implement this.
    fn detect_orientation(&self, _image: &DynamicImage) -> Result<Orientation, RecognizeError> {
        Err(RecognizeError::Unsupported {
            engine: self.name().to_string(),
            capability: "orientation detection",
        })
    }
}

/// Construct the engine selected by the settings.
pub fn build_engine(settings: &Settings) -> Result<Box<dyn OcrEngine>> {
    match settings.engine {
        EngineKind::Tesseract => Ok(Box::new(TesseractEngine::new(
            &settings.tesseract_cmd,
            settings.psm,
        )?)),
        EngineKind::Ocrs => {
            let models_dir = match &settings.models_dir {
                Some(dir) => dir.clone(),
                None => default_models_dir()?,
            };
            Ok(Box::new(OcrsEngine::new(&models_dir)?))
        }
    }
}
