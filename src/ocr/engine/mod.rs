pub mod parse;
pub mod preprocess;
pub mod select;
mod tesseract;

use image::DynamicImage;

use crate::error::Result;

pub use parse::{parse_hocr_words, parse_tsv_words};
pub use preprocess::Variant;
pub use select::{Selection, VariantScore, select_best};
pub use tesseract::{TesseractEngine, list_tesseract_languages};

/// A blocking OCR backend.
pub trait OcrEngine {
    /// hOCR markup with one `ocrx_word` span per recognized word.
    fn hocr(&self, image: &DynamicImage) -> Result<String>;

    /// Tab-separated word table (level, page, block, paragraph, line, ...).
    fn tsv(&self, image: &DynamicImage) -> Result<String>;

    /// Plain recognized text.
    fn text(&self, image: &DynamicImage) -> Result<String>;
}
