//! Reconstructs whitespace-faithful plain text from an image by laying out
//! the words an OCR engine recognized according to their bounding boxes.

use std::fs;
use std::path::{Path, PathBuf};

pub mod error;
pub mod layout;
pub mod logging;
pub mod ocr;
pub mod sanitize;
pub mod settings;
pub mod stats;
mod test_util;

pub use error::{Error, Result};
pub use layout::{Layout, LayoutOptions, reconstruct};
pub use logging::Verbosity;
pub use ocr::engine::{Selection, parse_hocr_words, parse_tsv_words, select_best};
pub use ocr::{Method, OcrEngine, TesseractEngine, Thresholding, TsvWord, Word};

use ocr::debug::{self, OcrDebugConfig};
use ocr::engine::preprocess;

#[derive(Debug, Clone)]
pub struct Config {
    pub image_path: PathBuf,
    pub method: Method,
    pub thresholding: Thresholding,
    /// Engine language code(s), e.g. `eng` or `eng+fra`.
    pub language: String,
    /// Passed to the engine verbatim.
    pub tesseract_args: String,
    /// Overwritten with the result when set.
    pub output_path: Option<PathBuf>,
    pub quiet: bool,
    pub fallback_char_width: f64,
    pub debug_ocr: bool,
}

impl Config {
    pub fn new(image_path: impl Into<PathBuf>) -> Self {
        let defaults = settings::Settings::default();
        Self {
            image_path: image_path.into(),
            method: Method::Layout,
            thresholding: Thresholding::Otsu,
            language: defaults.language,
            tesseract_args: defaults.tesseract_args,
            output_path: None,
            quiet: false,
            fallback_char_width: defaults.fallback_char_width,
            debug_ocr: false,
        }
    }
}

/// Runs the whole pipeline with the `tesseract` program.
///
/// Returns the text unless it was written to `output_path` in quiet mode.
pub fn run(config: &Config) -> Result<Option<String>> {
    ensure_exists(&config.image_path)?;
    let engine = TesseractEngine::new(&config.language, &config.tesseract_args)?;
    run_with_engine(config, &engine)
}

pub fn run_with_engine<E: OcrEngine + ?Sized>(
    config: &Config,
    engine: &E,
) -> Result<Option<String>> {
    ensure_exists(&config.image_path)?;
    let verbosity = Verbosity::new(config.quiet);
    let image = image::open(&config.image_path)?;

    let text = match config.method {
        Method::Plain => {
            verbosity.info("Using default tesseract method");
            engine.text(&image)?
        }
        Method::Blocks => {
            verbosity.info("Using block/paragraph/line grouping method");
            let rows = parse_tsv_words(&engine.tsv(&image)?);
            layout::blocks::render(&rows)
        }
        Method::Layout => {
            let gray = preprocess::to_grayscale(&image);
            let variants = preprocess::variants(&gray, config.thresholding);
            let selection = select_best(engine, &variants, verbosity)?;
            let options = LayoutOptions {
                fallback_char_width: config.fallback_char_width,
                verbosity,
            };
            let layout = reconstruct(&selection.words, &options)?;
            if config.debug_ocr {
                let path = debug::write_dump(
                    &OcrDebugConfig::for_image(&config.image_path),
                    &selection,
                    &layout,
                )?;
                verbosity.info(format_args!("OCR debug dump written to '{}'", path.display()));
            }
            layout.text
        }
    };

    deliver(text, config.output_path.as_deref(), verbosity)
}

/// Truncates and writes `output_path` when set. The text is still returned
/// unless output went to a file in quiet mode.
fn deliver(text: String, output_path: Option<&Path>, verbosity: Verbosity) -> Result<Option<String>> {
    let Some(path) = output_path else {
        return Ok(Some(text));
    };
    fs::write(path, &text)?;
    verbosity.info(format_args!("Output written to '{}'", path.display()));
    if verbosity.quiet {
        Ok(None)
    } else {
        Ok(Some(text))
    }
}

fn ensure_exists(path: &Path) -> Result<()> {
    if path.exists() {
        Ok(())
    } else {
        Err(Error::FileNotFound(path.to_path_buf()))
    }
}
