use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::Result;
use crate::layout::{GeometryStats, Layout};
use crate::ocr::Word;
use crate::ocr::engine::{Selection, VariantScore};

#[derive(Debug, Clone)]
pub struct OcrDebugConfig {
    output_dir: PathBuf,
    base_name: String,
}

impl OcrDebugConfig {
    /// Dumps land next to the source image, named after its stem.
    pub fn for_image(src_path: &Path) -> Self {
        let dir = src_path
            .parent()
            .filter(|dir| !dir.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let base = src_path
            .file_stem()
            .and_then(|value| value.to_str())
            .unwrap_or("input");
        Self {
            output_dir: dir.to_path_buf(),
            base_name: sanitize_filename_component(base),
        }
    }

    pub fn json_path(&self) -> PathBuf {
        self.output_dir.join(format!("{}_ocr.json", self.base_name))
    }
}

#[derive(Debug, Serialize)]
struct DebugLine<'a> {
    scan_y: f64,
    words: Vec<&'a Word>,
}

#[derive(Debug, Serialize)]
struct DebugDump<'a> {
    selected_variant: &'a str,
    median_confidence: f64,
    mean_confidence: f64,
    variants: &'a [VariantScore],
    geometry: &'a GeometryStats,
    offset: f64,
    offset_scores: &'a [(f64, f64)],
    lines: Vec<DebugLine<'a>>,
}

/// Writes the selection and line assignment of one run as JSON.
pub fn write_dump(
    config: &OcrDebugConfig,
    selection: &Selection,
    layout: &Layout,
) -> Result<PathBuf> {
    let dump = DebugDump {
        selected_variant: selection.name,
        median_confidence: selection.median,
        mean_confidence: selection.mean,
        variants: &selection.scores,
        geometry: &layout.geometry,
        offset: layout.offset,
        offset_scores: &layout.offset_scores,
        lines: layout
            .lines
            .iter()
            .map(|line| DebugLine {
                scan_y: line.scan_y,
                words: line.words.iter().map(|&idx| &selection.words[idx]).collect(),
            })
            .collect(),
    };
    let path = config.json_path();
    let json = serde_json::to_string_pretty(&dump)?;
    std::fs::write(&path, json)?;
    Ok(path)
}

fn sanitize_filename_component(value: &str) -> String {
    let mut out = String::new();
    for ch in value.chars() {
        if ch.is_ascii_alphanumeric() || ch == '-' || ch == '_' {
            out.push(ch);
        } else if ch.is_whitespace() {
            out.push('_');
        }
    }
    if out.is_empty() {
        "input".to_string()
    } else {
        out
    }
}
