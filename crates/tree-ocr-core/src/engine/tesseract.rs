//! Tesseract engine driven through its command-line tool.

use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::Result;
use image::{DynamicImage, ImageFormat};
use tempfile::NamedTempFile;
use tracing::{debug, trace};
use tree_ocr_types::{Orientation, RecognizeError, RecognizedLine};

use super::OcrEngine;

const ENGINE_NAME: &str = "tesseract";

/// Word rows in TSV output have this level.
const TSV_WORD_LEVEL: u32 = 5;

/// Tesseract OCR engine.
pub struct TesseractEngine {
    command: PathBuf,
    psm: Option<u8>,
}

impl TesseractEngine {
    /// Create an engine after checking that the executable runs.
    pub fn new(command: impl AsRef<Path>, psm: Option<u8>) -> Result<Self> {
        let command = command.as_ref().to_path_buf();

        let check = Command::new(&command).arg("--version").output();
        match check {
            Ok(output) if output.status.success() => {
                let version = String::from_utf8_lossy(&output.stdout);
                debug!(
                    "Using {}",
                    version.lines().next().unwrap_or("tesseract (unknown version)")
                );
            }
            _ => anyhow::bail!(
                "Tesseract OCR is not available at {:?}.\n\n\
                To install tesseract:\n  macOS:   brew install tesseract\n  \
                Linux:   sudo apt-get install tesseract-ocr (Ubuntu/Debian)\n  \
                Windows: Download from https://github.com/UB-Mannheim/tesseract/wiki\n\n\
                Or point TESSERACT_CMD at the executable.",
                command
            ),
        }

        Ok(Self { command, psm })
    }

    /// Write the image to a temporary PNG the CLI can read.
    fn stage_image(image: &DynamicImage) -> Result<NamedTempFile, RecognizeError> {
        let mut file = tempfile::Builder::new()
            .prefix("tree-ocr-")
            .suffix(".png")
            .tempfile()?;
        image
            .write_to(file.as_file_mut(), ImageFormat::Png)
            .map_err(|e| RecognizeError::engine(ENGINE_NAME, format!("Failed to stage image: {}", e)))?;
        Ok(file)
    }

    /// Run tesseract on the image with the given trailing arguments and return stdout.
    fn run(&self, image: &DynamicImage, args: &[&str]) -> Result<String, RecognizeError> {
        let staged = Self::stage_image(image)?;

        let mut command = Command::new(&self.command);
        command.arg(staged.path()).arg("stdout").args(args);
        trace!("Running {:?}", command);

        let output = command
            .output()
            .map_err(|e| RecognizeError::engine(ENGINE_NAME, format!("Failed to run tesseract: {}", e)))?;

        if !output.status.success() {
            return Err(RecognizeError::engine(
                ENGINE_NAME,
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            ));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    fn recognition_args<'a>(&self, lang: &'a str, psm: &'a str) -> Vec<&'a str> {
        let mut args = vec!["-l", lang];
        if self.psm.is_some() {
            args.push("--psm");
            args.push(psm);
        }
        args
    }
}

impl OcrEngine for TesseractEngine {
    fn name(&self) -> &str {
        ENGINE_NAME
    }

    fn recognize_text(&self, image: &DynamicImage, lang: &str) -> Result<String, RecognizeError> {
        let psm = self.psm.map(|p| p.to_string()).unwrap_or_default();
        let args = self.recognition_args(lang, &psm);
        let text = self.run(image, &args)?;
        debug!("Recognized {} characters ({})", text.len(), lang);
        Ok(text)
    }

    fn recognize_lines(
        &self,
        image: &DynamicImage,
        lang: &str,
    ) -> Result<Vec<RecognizedLine>, RecognizeError> {
        let psm = self.psm.map(|p| p.to_string()).unwrap_or_default();
        let mut args = self.recognition_args(lang, &psm);
        args.push("tsv");

        let tsv = self.run(image, &args)?;
        let lines = parse_tsv(&tsv, lang);
        debug!("Recognized {} lines ({})", lines.len(), lang);
        Ok(lines)
    }

    fn detect_orientation(&self, image: &DynamicImage) -> Result<Orientation, RecognizeError> {
        let osd = self
            .run(image, &["--psm", "0"])
            .map_err(|e| RecognizeError::Orientation(e.to_string()))?;
        parse_osd(&osd)
    }
}

struct LineAccumulator {
    key: (u32, u32, u32),
    words: Vec<String>,
    confidences: Vec<f32>,
    left: f32,
    top: f32,
    right: f32,
    bottom: f32,
}

impl LineAccumulator {
    fn new(key: (u32, u32, u32), left: f32, top: f32, width: f32, height: f32) -> Self {
        Self {
            key,
            words: Vec::new(),
            confidences: Vec::new(),
            left,
            top,
            right: left + width,
            bottom: top + height,
        }
    }

    fn push(&mut self, text: &str, confidence: f32, left: f32, top: f32, width: f32, height: f32) {
        self.words.push(text.to_string());
        self.confidences.push(confidence);
        self.left = self.left.min(left);
        self.top = self.top.min(top);
        self.right = self.right.max(left + width);
        self.bottom = self.bottom.max(top + height);
    }

    fn finish(self, lang: &str) -> RecognizedLine {
        let confidence = if self.confidences.is_empty() {
            0.0
        } else {
            self.confidences.iter().sum::<f32>() / self.confidences.len() as f32 / 100.0
        };
        RecognizedLine::from_rect(
            self.words.join(" "),
            self.left,
            self.top,
            self.right - self.left,
            self.bottom - self.top,
            lang,
            confidence,
        )
        .in_block(self.key.0)
    }
}

/// Group TSV word rows into lines.
///
/// TSV columns: level, page_num, block_num, par_num, line_num, word_num,
/// left, top, width, height, conf, text.
pub(crate) fn parse_tsv(tsv: &str, lang: &str) -> Vec<RecognizedLine> {
    let mut lines = Vec::new();
    let mut current: Option<LineAccumulator> = None;

    // Skip header
    for row in tsv.lines().skip(1) {
        let parts: Vec<&str> = row.split('\t').collect();
        if parts.len() < 12 {
            continue;
        }

        let level = parts[0].parse::<u32>();
        let key = (
            parts[2].parse::<u32>(),
            parts[3].parse::<u32>(),
            parts[4].parse::<u32>(),
        );
        let geometry = (
            parts[6].parse::<f32>(),
            parts[7].parse::<f32>(),
            parts[8].parse::<f32>(),
            parts[9].parse::<f32>(),
            parts[10].parse::<f32>(),
        );

        let (Ok(level), (Ok(block), Ok(par), Ok(line)), (Ok(x), Ok(y), Ok(w), Ok(h), Ok(conf))) =
            (level, key, geometry)
        else {
            continue;
        };

        let text = parts[11].trim();
        if level != TSV_WORD_LEVEL || text.is_empty() || conf < 0.0 {
            continue;
        }

        let key = (block, par, line);
        match current.as_mut() {
            Some(acc) if acc.key == key => acc.push(text, conf, x, y, w, h),
            _ => {
                if let Some(done) = current.take() {
                    lines.push(done.finish(lang));
                }
                let mut acc = LineAccumulator::new(key, x, y, w, h);
                acc.push(text, conf, x, y, w, h);
                current = Some(acc);
            }
        }
    }

    if let Some(done) = current {
        lines.push(done.finish(lang));
    }

    lines
}

/// Parse `--psm 0` orientation and script detection output.
pub(crate) fn parse_osd(osd: &str) -> Result<Orientation, RecognizeError> {
    let mut rotate = None;
    let mut confidence = 0.0;
    let mut script = None;

    for line in osd.lines() {
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let value = value.trim();
        match key.trim() {
            "Rotate" => {
                rotate = Some(value.parse::<u32>().map_err(|_| {
                    RecognizeError::Orientation(format!("Invalid rotation '{}'", value))
                })?);
            }
            "Orientation confidence" => confidence = value.parse().unwrap_or(0.0),
            "Script" => script = Some(value.to_string()),
            _ => {}
        }
    }

    let rotate = rotate
        .ok_or_else(|| RecognizeError::Orientation("No rotation in OSD output".to_string()))?;

    Ok(Orientation {
        rotate,
        confidence,
        script,
    })
}
