//! Error types for the layout reconstruction pipeline.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("file not found: '{}'", .0.display())]
    FileNotFound(PathBuf),

    #[error("malformed OCR word markup: {0}")]
    Parse(String),

    #[error("unexpected thresholding method: '{0}'")]
    InvalidThresholdingMethod(String),

    #[error("unexpected OCR method: '{0}'")]
    InvalidMethod(String),

    #[error("no words detected: {0}")]
    NoWordsDetected(String),

    /// A statistic had no qualifying samples; callers substitute a default.
    #[error("not enough samples to estimate {0}")]
    InsufficientSample(&'static str),

    #[error("ocr engine error: {0}")]
    Engine(String),

    #[error("settings error: {0}")]
    Settings(String),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
