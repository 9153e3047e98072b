use std::io::Write;
use std::path::Path;
use std::process::Command;

use image::DynamicImage;

use crate::error::{Error, Result};

use super::OcrEngine;

/// `OcrEngine` backed by the `tesseract` command-line program.
#[derive(Debug, Clone)]
pub struct TesseractEngine {
    languages: String,
    args: Vec<String>,
}

impl TesseractEngine {
    /// `args` is split on whitespace and passed through unchanged.
    pub fn new(languages: &str, args: &str) -> Result<Self> {
        Ok(Self {
            languages: normalize_ocr_languages(languages)?,
            args: args.split_whitespace().map(str::to_string).collect(),
        })
    }

    pub fn languages(&self) -> &str {
        &self.languages
    }

    fn run(&self, image: &DynamicImage, config: Option<&str>) -> Result<String> {
        let mut tmp = tempfile::Builder::new()
            .suffix(".png")
            .tempfile()
            .map_err(|err| Error::Engine(format!("failed to create temp file for OCR: {}", err)))?;
        image.write_to(&mut tmp, image::ImageFormat::Png)?;
        tmp.flush()?;
        run_tesseract(tmp.path(), &self.languages, &self.args, config)
    }
}

impl OcrEngine for TesseractEngine {
    fn hocr(&self, image: &DynamicImage) -> Result<String> {
        self.run(image, Some("hocr"))
    }

    fn tsv(&self, image: &DynamicImage) -> Result<String> {
        self.run(image, Some("tsv"))
    }

    fn text(&self, image: &DynamicImage) -> Result<String> {
        self.run(image, None)
    }
}

pub fn list_tesseract_languages() -> Result<Vec<String>> {
    let output = Command::new("tesseract")
        .arg("--list-langs")
        .output()
        .map_err(|err| Error::Engine(format!("failed to run tesseract --list-langs: {}", err)))?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(Error::Engine(format!(
            "tesseract --list-langs failed: {}",
            stderr.trim()
        )));
    }
    let stdout = String::from_utf8_lossy(&output.stdout);
    Ok(parse_language_list(&stdout))
}

fn parse_language_list(stdout: &str) -> Vec<String> {
    stdout
        .lines()
        .skip(1)
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .collect()
}

pub(super) fn normalize_ocr_languages(requested: &str) -> Result<String> {
    let trimmed = requested.trim();
    if trimmed.is_empty() {
        return Err(Error::Engine("ocr language is empty".to_string()));
    }

    let available = match list_tesseract_languages() {
        Ok(list) => list,
        Err(err) => {
            tracing::debug!("could not list tesseract languages: {}", err);
            return Ok(trimmed.to_string());
        }
    };
    select_languages(trimmed, &available)
}

fn select_languages(requested: &str, available: &[String]) -> Result<String> {
    let mut chosen = Vec::new();
    let mut missing = Vec::new();
    for raw in requested.split(['+', ',', ' ']) {
        let lang = raw.trim();
        if lang.is_empty() {
            continue;
        }
        if available.iter().any(|value| value == lang) {
            chosen.push(lang.to_string());
        } else {
            missing.push(lang.to_string());
        }
    }

    if chosen.is_empty() {
        return Err(Error::Engine(format!(
            "ocr language(s) not available: {} (available: {})",
            missing.join(", "),
            available.join(", ")
        )));
    }
    if !missing.is_empty() {
        tracing::warn!(
            "ocr language(s) not available: {} (available: {})",
            missing.join(", "),
            available.join(", ")
        );
    }

    Ok(chosen.join("+"))
}

fn run_tesseract(
    path: &Path,
    languages: &str,
    args: &[String],
    config: Option<&str>,
) -> Result<String> {
    let mut command = Command::new("tesseract");
    command.arg(path).arg("stdout").arg("-l").arg(languages).args(args);
    if let Some(config) = config {
        command.arg(config);
    }
    tracing::debug!("running {:?}", command);
    let output = command
        .output()
        .map_err(|err| Error::Engine(format!("failed to run tesseract (is it installed?): {}", err)))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(Error::Engine(format!("tesseract failed: {}", stderr.trim())));
    }
    Ok(String::from_utf8_lossy(&output.stdout).to_string())
}
