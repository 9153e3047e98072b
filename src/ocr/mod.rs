pub mod debug;
pub mod engine;

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::Error;

pub use engine::{OcrEngine, TesseractEngine, list_tesseract_languages};

/// One recognized word with its pixel bounding box (`x1`/`y1` exclusive
/// corner as reported by the engine) and confidence 0..=100.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Word {
    pub text: String,
    pub x0: u32,
    pub y0: u32,
    pub x1: u32,
    pub y1: u32,
    pub confidence: u32,
}

impl Word {
    pub fn new(text: impl Into<String>, bbox: [u32; 4], confidence: u32) -> Self {
        let [x0, y0, x1, y1] = bbox;
        Self {
            text: text.into(),
            x0,
            y0,
            x1,
            y1,
            confidence,
        }
    }

    pub fn width(&self) -> u32 {
        self.x1.saturating_sub(self.x0)
    }

    pub fn height(&self) -> u32 {
        self.y1.saturating_sub(self.y0)
    }
}

/// A word from tabular engine output, keeping the engine's own
/// block / paragraph / line numbering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TsvWord {
    pub word: Word,
    pub block: u32,
    pub par: u32,
    pub line: u32,
}

/// Pixel binarization applied before OCR.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Thresholding {
    Otsu,
    OtsuGaussian,
    AdaptiveGaussian,
    All,
}

impl FromStr for Thresholding {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "otsu" => Ok(Self::Otsu),
            "otsu_gaussian" => Ok(Self::OtsuGaussian),
            "adaptative_gaussian" | "adaptive_gaussian" => Ok(Self::AdaptiveGaussian),
            "all" => Ok(Self::All),
            other => Err(Error::InvalidThresholdingMethod(other.to_string())),
        }
    }
}

impl fmt::Display for Thresholding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Otsu => "otsu",
            Self::OtsuGaussian => "otsu_gaussian",
            Self::AdaptiveGaussian => "adaptative_gaussian",
            Self::All => "all",
        };
        f.write_str(name)
    }
}

/// How the final text is produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// Geometric reconstruction from word bounding boxes.
    Layout,
    /// The engine's own plain-text output.
    Plain,
    /// Block / paragraph / line grouping over tabular engine output.
    Blocks,
}

impl FromStr for Method {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "with_format" | "layout" => Ok(Self::Layout),
            "none" | "" => Ok(Self::Plain),
            "stackoverflow" | "blocks" => Ok(Self::Blocks),
            other => Err(Error::InvalidMethod(other.to_string())),
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Layout => "with_format",
            Self::Plain => "none",
            Self::Blocks => "stackoverflow",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thresholding_accepts_known_names() {
        assert_eq!("otsu".parse::<Thresholding>().unwrap(), Thresholding::Otsu);
        assert_eq!(
            "adaptative_gaussian".parse::<Thresholding>().unwrap(),
            Thresholding::AdaptiveGaussian
        );
        assert_eq!("all".parse::<Thresholding>().unwrap(), Thresholding::All);
    }

    #[test]
    fn thresholding_rejects_unknown_names() {
        let err = "auto".parse::<Thresholding>().unwrap_err();
        assert!(matches!(err, Error::InvalidThresholdingMethod(ref name) if name == "auto"));
    }

    #[test]
    fn method_names_round_trip_through_display() {
        for method in [Method::Layout, Method::Plain, Method::Blocks] {
            assert_eq!(method.to_string().parse::<Method>().unwrap(), method);
        }
        assert!("sideways".parse::<Method>().is_err());
    }

    #[test]
    fn word_dimensions_saturate() {
        let word = Word::new("abc", [10, 20, 40, 32], 90);
        assert_eq!(word.width(), 30);
        assert_eq!(word.height(), 12);
        let inverted = Word::new("x", [40, 20, 10, 10], 90);
        assert_eq!(inverted.width(), 0);
    }
}
