//! Recognized text lines and orientation results.

use serde::{Deserialize, Serialize};

/// A 2D point in image pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// One detected text fragment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecognizedLine {
    /// Recognized text.
    pub text: String,

    /// Quadrilateral in clockwise order starting at the top-left corner.
    pub quad: [Point; 4],

    /// Language the line was recognized with.
    pub language: String,

    /// Engine confidence in [0, 1].
    pub confidence: f32,

    /// Block number reported by the engine (0 when the engine has no blocks).
    pub block: u32,
}

impl RecognizedLine {
    /// Build a line from an axis-aligned box.
    pub fn from_rect(
        text: impl Into<String>,
        left: f32,
        top: f32,
        width: f32,
        height: f32,
        language: impl Into<String>,
        confidence: f32,
    ) -> Self {
        let right = left + width;
        let bottom = top + height;
        Self {
            text: text.into(),
            quad: [
                Point::new(left, top),
                Point::new(right, top),
                Point::new(right, bottom),
                Point::new(left, bottom),
            ],
            language: language.into(),
            confidence: confidence.clamp(0.0, 1.0),
            block: 0,
        }
    }

    /// Set the block number.
    pub fn in_block(mut self, block: u32) -> Self {
        self.block = block;
        self
    }

    /// Top-left corner of the quadrilateral.
    pub fn top_left(&self) -> Point {
        self.quad[0]
    }
}

/// Output of recognizing one image.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Recognition {
    /// Final text as it is written to the output file.
    pub text: String,

    /// Lines the text was assembled from. Empty for plain-text recognition.
    pub lines: Vec<RecognizedLine>,
}

impl Recognition {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            lines: Vec::new(),
        }
    }
}

/// Orientation and script detection result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Orientation {
    /// Clockwise rotation in degrees needed to make the page upright.
    pub rotate: u32,

    /// Engine confidence in the detected orientation (engine scale).
    pub confidence: f32,

    /// Detected script, if reported.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub script: Option<String>,
}

impl Orientation {
    pub fn is_upright(&self) -> bool {
        self.rotate % 360 == 0
    }
}
