use serde::Serialize;

use crate::error::{Error, Result};
use crate::logging::Verbosity;
use crate::ocr::Word;
use crate::stats;

use super::parse::parse_hocr_words;
use super::{OcrEngine, Variant};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VariantScore {
    pub name: &'static str,
    pub words: usize,
    pub median: f64,
    pub mean: f64,
}

/// The preprocessing variant whose words were kept.
#[derive(Debug, Clone)]
pub struct Selection {
    pub name: &'static str,
    pub words: Vec<Word>,
    pub median: f64,
    pub mean: f64,
    pub scores: Vec<VariantScore>,
}

/// Median and mean word confidence.
pub fn confidence_scores(words: &[Word]) -> Result<(f64, f64)> {
    let confidences = || words.iter().map(|word| word.confidence as f64);
    match (stats::median(confidences()), stats::mean(confidences())) {
        (Some(median), Some(mean)) => Ok((median, mean)),
        _ => Err(Error::NoWordsDetected("no words to score".to_string())),
    }
}

/// OCRs every variant and keeps the words of the last one whose median and
/// mean confidence both reach the best seen so far. A later variant that
/// improves one score while lowering the other does not replace it.
pub fn select_best<E: OcrEngine + ?Sized>(
    engine: &E,
    variants: &[Variant],
    verbosity: Verbosity,
) -> Result<Selection> {
    let mut best: Option<(&'static str, Vec<Word>)> = None;
    let mut max_median = 0.0;
    let mut max_mean = 0.0;
    let mut scores = Vec::with_capacity(variants.len());

    for variant in variants {
        let hocr = engine.hocr(&variant.image)?;
        let words = parse_hocr_words(&hocr)?;
        let (median, mean) = match confidence_scores(&words) {
            Ok(values) => values,
            Err(err) => {
                verbosity.warn(format_args!("skipping variant {}: {}", variant.name, err));
                continue;
            }
        };
        scores.push(VariantScore {
            name: variant.name,
            words: words.len(),
            median,
            mean,
        });
        if median >= max_median && mean >= max_mean {
            max_median = median;
            max_mean = mean;
            best = Some((variant.name, words));
        }
    }

    let Some((name, words)) = best else {
        return Err(Error::NoWordsDetected(format!(
            "none of the {} preprocessing variants produced words",
            variants.len()
        )));
    };

    tracing::debug!(
        "Best preprocessing method: {} with score {:.2} {:.2}",
        name,
        max_median,
        max_mean
    );
    for score in &scores {
        tracing::debug!("* {}: {:.2}  {:.2}", score.name, score.median, score.mean);
    }

    Ok(Selection {
        name,
        words,
        median: max_median,
        mean: max_mean,
        scores,
    })
}
