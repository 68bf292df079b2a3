//! OCR engine wrapper using the ocrs library.

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use anyhow::{Context, Result};
use image::DynamicImage;
use ocrs::{ImageSource, OcrEngine as OcrsBackend, OcrEngineParams, TextItem};
use rten::Model;
use tracing::{debug, trace};
use tree_ocr_types::{RecognizeError, RecognizedLine};

use super::OcrEngine;

const ENGINE_NAME: &str = "ocrs";
const DETECTION_MODEL: &str = "text-detection.rten";
const RECOGNITION_MODEL: &str = "text-recognition.rten";

/// In-process OCR using ocrs models.
///
/// The default recognition model lives in the models directory. A language
/// can override it with `<models_dir>/<lang>/text-recognition.rten`; such
/// engines are loaded on first use and kept for the rest of the run.
pub struct OcrsEngine {
    models_dir: PathBuf,
    default_engine: Rc<OcrsBackend>,
    language_engines: RefCell<HashMap<String, Rc<OcrsBackend>>>,
}

impl OcrsEngine {
    /// Create an engine by loading models from the given directory.
    pub fn new(models_dir: &Path) -> Result<Self> {
        let engine = load_backend(
            &models_dir.join(DETECTION_MODEL),
            &models_dir.join(RECOGNITION_MODEL),
        )?;

        debug!("OCR engine initialized from {:?}", models_dir);
        Ok(Self {
            models_dir: models_dir.to_path_buf(),
            default_engine: Rc::new(engine),
            language_engines: RefCell::new(HashMap::new()),
        })
    }

    /// Engine for a language, falling back to the default model.
    fn engine_for(&self, lang: &str) -> Result<Rc<OcrsBackend>, RecognizeError> {
        if let Some(engine) = self.language_engines.borrow().get(lang) {
            return Ok(Rc::clone(engine));
        }

        let recognition_path = self.models_dir.join(lang).join(RECOGNITION_MODEL);
        if lang.is_empty() || !recognition_path.is_file() {
            trace!("No recognition model for '{}', using default", lang);
            return Ok(Rc::clone(&self.default_engine));
        }

        let engine = load_backend(&self.models_dir.join(DETECTION_MODEL), &recognition_path)
            .map_err(|e| RecognizeError::engine(ENGINE_NAME, format!("{:#}", e)))?;
        let engine = Rc::new(engine);
        self.language_engines
            .borrow_mut()
            .insert(lang.to_string(), Rc::clone(&engine));

        debug!("Loaded recognition model for '{}'", lang);
        Ok(engine)
    }
}

fn load_backend(detection_path: &Path, recognition_path: &Path) -> Result<OcrsBackend> {
    debug!("Loading OCR detection model from {:?}", detection_path);
    let detection_model = Model::load_file(detection_path)
        .with_context(|| format!("Failed to load detection model from {:?}", detection_path))?;

    debug!("Loading OCR recognition model from {:?}", recognition_path);
    let recognition_model = Model::load_file(recognition_path).with_context(|| {
        format!(
            "Failed to load recognition model from {:?}",
            recognition_path
        )
    })?;

    OcrsBackend::new(OcrEngineParams {
        detection_model: Some(detection_model),
        recognition_model: Some(recognition_model),
        ..Default::default()
    })
    .context("Failed to create OCR engine")
}

fn engine_error(stage: &str, err: impl std::fmt::Display) -> RecognizeError {
    RecognizeError::engine(ENGINE_NAME, format!("{}: {}", stage, err))
}

impl OcrEngine for OcrsEngine {
    fn name(&self) -> &str {
        ENGINE_NAME
    }

    fn recognize_lines(
        &self,
        image: &DynamicImage,
        lang: &str,
    ) -> Result<Vec<RecognizedLine>, RecognizeError> {
        let engine = self.engine_for(lang)?;

        let img = image.to_rgb8();
        let (width, height) = (img.width(), img.height());
        trace!("Image loaded: {}x{}", width, height);

        let img_source = ImageSource::from_bytes(img.as_raw(), (width, height))
            .map_err(|e| engine_error("Failed to create image source", e))?;

        let ocr_input = engine
            .prepare_input(img_source)
            .map_err(|e| engine_error("Failed to prepare OCR input", e))?;

        let word_rects = engine
            .detect_words(&ocr_input)
            .map_err(|e| engine_error("Failed to detect words", e))?;
        trace!("Detected {} word regions", word_rects.len());

        let line_rects = engine.find_text_lines(&ocr_input, &word_rects);

        let line_texts = engine
            .recognize_text(&ocr_input, &line_rects)
            .map_err(|e| engine_error("Failed to recognize text", e))?;

        let mut lines = Vec::new();

        for line in line_texts.iter().flatten() {
            let text = line.to_string();
            if text.trim().is_empty() {
                continue;
            }

            let mut bounds: Option<(f32, f32, f32, f32)> = None;
            for word in line.words() {
                let rect = word.bounding_rect();
                let (left, top) = (rect.left() as f32, rect.top() as f32);
                let (right, bottom) = (
                    (rect.left() + rect.width()) as f32,
                    (rect.top() + rect.height()) as f32,
                );
                bounds = Some(match bounds {
                    None => (left, top, right, bottom),
                    Some((l, t, r, b)) => (l.min(left), t.min(top), r.max(right), b.max(bottom)),
                });
            }

            let Some((left, top, right, bottom)) = bounds else {
                continue;
            };

            // ocrs does not report confidence
            lines.push(RecognizedLine::from_rect(
                text,
                left,
                top,
                right - left,
                bottom - top,
                lang,
                1.0,
            ));
        }

        debug!("Detected {} text lines", lines.len());
        Ok(lines)
    }
}

/// Find the models directory relative to the executable.
///
/// Models are expected at `bin/../models`.
pub fn default_models_dir() -> Result<PathBuf> {
    let exe_path = std::env::current_exe().context("Failed to get executable path")?;

    let models_dir = exe_path
        .parent() // bin/
        .and_then(|p| p.parent()) // package root
        .map(|p| p.join("models"))
        .context("Failed to compute models directory path")?;

    let detection = models_dir.join(DETECTION_MODEL);
    let recognition = models_dir.join(RECOGNITION_MODEL);

    if detection.exists() && recognition.exists() {
        debug!("Found models directory at {:?}", models_dir);
        return Ok(models_dir);
    }

    anyhow::bail!(
        "Could not find OCR models at {:?}. Set OCRS_MODELS_DIR to a directory containing {} and {}.",
        models_dir,
        DETECTION_MODEL,
        RECOGNITION_MODEL
    )
}
