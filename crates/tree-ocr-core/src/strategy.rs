//! How recognized lines become the text written to disk.

use std::fmt;
use std::str::FromStr;

use image::DynamicImage;
use serde::{Deserialize, Serialize};
use tree_ocr_types::{Recognition, RecognizeError, RecognizedLine};

use crate::config::ConfigError;
use crate::engine::OcrEngine;

/// Separator between languages in a label for the merged strategy.
pub const LANGUAGE_SEPARATOR: char = '+';

/// Text assembly policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    /// The engine's own plain-text rendering.
    #[default]
    Plain,
    /// One line per detected line, in engine order.
    Lines,
    /// One pass per language, lines merged top to bottom.
    Merged,
    /// Lines grouped by engine block; no separator between blocks.
    Blocks,
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StrategyKind::Plain => write!(f, "plain"),
            StrategyKind::Lines => write!(f, "lines"),
            StrategyKind::Merged => write!(f, "merged"),
            StrategyKind::Blocks => write!(f, "blocks"),
        }
    }
}

impl FromStr for StrategyKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "plain" => Ok(StrategyKind::Plain),
            "lines" => Ok(StrategyKind::Lines),
            "merged" => Ok(StrategyKind::Merged),
            "blocks" => Ok(StrategyKind::Blocks),
            other => Err(ConfigError::UnknownStrategy(other.to_string())),
        }
    }
}

impl StrategyKind {
    /// Recognize `image` for the language label `lang` under this policy.
    pub fn apply(
        self,
        engine: &dyn OcrEngine,
        image: &DynamicImage,
        lang: &str,
    ) -> Result<Recognition, RecognizeError> {
        match self {
            StrategyKind::Plain => Ok(Recognition::plain(engine.recognize_text(image, lang)?)),
            StrategyKind::Lines => {
                let lines = engine.recognize_lines(image, lang)?;
                Ok(Recognition {
                    text: join_lines(&lines),
                    lines,
                })
            }
            StrategyKind::Merged => {
                let mut passes = Vec::new();
                for pass_lang in split_languages(lang) {
                    let lines = engine.recognize_lines(image, pass_lang)?;
                    passes.push(tag_language(lines, pass_lang));
                }
                let lines = merge_by_position(passes);
                Ok(Recognition {
                    text: join_lines(&lines),
                    lines,
                })
            }
            StrategyKind::Blocks => {
                let lines = engine.recognize_lines(image, lang)?;
                Ok(Recognition {
                    text: join_blocks(&lines),
                    lines,
                })
            }
        }
    }
}

/// Split a language label into per-pass languages (`ru+en` -> `ru`, `en`).
pub fn split_languages(label: &str) -> Vec<&str> {
    let langs: Vec<&str> = label
        .split(LANGUAGE_SEPARATOR)
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();
    if langs.is_empty() {
        vec![label]
    } else {
        langs
    }
}

fn tag_language(lines: Vec<RecognizedLine>, lang: &str) -> Vec<RecognizedLine> {
    lines
        .into_iter()
        .map(|mut line| {
            line.language = lang.to_string();
            line
        })
        .collect()
}

/// Concatenate passes and order lines by the y coordinate of their top-left corner.
///
/// The sort is stable: lines at the same height keep pass order.
pub fn merge_by_position(passes: Vec<Vec<RecognizedLine>>) -> Vec<RecognizedLine> {
    let mut lines: Vec<RecognizedLine> = passes.into_iter().flatten().collect();
    lines.sort_by(|a, b| a.top_left().y.total_cmp(&b.top_left().y));
    lines
}

/// Join line texts with newlines, no trailing newline.
pub fn join_lines(lines: &[RecognizedLine]) -> String {
    lines
        .iter()
        .map(|l| l.text.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Join lines within each block with newlines and concatenate blocks directly.
///
/// The last line of one block runs into the first line of the next.
pub fn join_blocks(lines: &[RecognizedLine]) -> String {
    let mut text = String::new();
    for (i, line) in lines.iter().enumerate() {
        text.push_str(&line.text);
        if let Some(next) = lines.get(i + 1) {
            if next.block == line.block {
                text.push('\n');
            }
        }
    }
    text
}
