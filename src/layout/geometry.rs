//! Scalar statistics describing the text geometry of one OCR pass.

use serde::Serialize;

use crate::error::{Error, Result};
use crate::layout::DEFAULT_CHAR_WIDTH;
use crate::logging::Verbosity;
use crate::ocr::Word;
use crate::stats;

const MIN_WIDTH_SAMPLE_CHARS: usize = 3;
const MAX_WIDTH_SAMPLE_CHARS: usize = 20;
const MERGE_QUANTILE: f64 = 0.1;
const NEWLINE_QUANTILE: f64 = 0.5;
const MIN_NEWLINE_THRESHOLD: f64 = 1.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeometryStats {
    /// Pixels per character.
    pub char_width: f64,
    pub median_height: f64,
    /// Vertical tolerance for words sharing a line while searching offsets.
    pub merge_threshold: f64,
    /// Spacing between scan lines.
    pub newline_threshold: f64,
    pub min_y: u32,
    pub max_y: u32,
}

/// Computes the statistics for a non-empty word list. A missing char width
/// sample falls back to `fallback_char_width`, or to `DEFAULT_CHAR_WIDTH`
/// when that is not a positive finite number.
pub fn estimate(
    words: &[Word],
    fallback_char_width: f64,
    verbosity: Verbosity,
) -> Result<GeometryStats> {
    let (min_y, max_y) = match (
        words.iter().map(|word| word.y0).min(),
        words.iter().map(|word| word.y0).max(),
    ) {
        (Some(min), Some(max)) => (min, max),
        _ => {
            return Err(Error::NoWordsDetected(
                "cannot estimate geometry of an empty page".to_string(),
            ));
        }
    };

    let fallback_char_width = if fallback_char_width.is_finite() && fallback_char_width > 0.0 {
        fallback_char_width
    } else {
        verbosity.warn(format_args!(
            "invalid fallback char width {}; using {}",
            fallback_char_width, DEFAULT_CHAR_WIDTH
        ));
        DEFAULT_CHAR_WIDTH
    };
    let char_width = match char_width(words) {
        Ok(width) => width,
        Err(err) => {
            verbosity.warn(format_args!(
                "{}; using default char width {}",
                err, fallback_char_width
            ));
            fallback_char_width
        }
    };

    let median_height =
        stats::median(words.iter().map(|word| word.height() as f64)).unwrap_or(0.0);
    let gaps = line_gaps(words);

    let merge_threshold =
        match stats::quantile(gaps.iter().copied().filter(|gap| *gap != 0.0), MERGE_QUANTILE) {
            Some(value) => value,
            None => {
                verbosity.info("Set line merging threshold to 0: no vertical gaps to sample");
                0.0
            }
        };
    verbosity.info(format_args!("Line merging threshold: {}", merge_threshold));

    let newline_threshold = match stats::quantile(
        gaps.iter().copied().filter(|gap| *gap > median_height),
        NEWLINE_QUANTILE,
    ) {
        Some(value) => value,
        None => {
            verbosity.info("Set newline threshold to median height: no gap exceeds it");
            median_height
        }
    }
    .max(MIN_NEWLINE_THRESHOLD);
    verbosity.info(format_args!(
        "Median line diff: {}, median height: {}",
        newline_threshold, median_height
    ));

    Ok(GeometryStats {
        char_width,
        median_height,
        merge_threshold,
        newline_threshold,
        min_y,
        max_y,
    })
}

/// Median of `width / chars` over single-token words of 3 to 20 characters.
pub fn char_width(words: &[Word]) -> Result<f64> {
    let samples = words.iter().filter_map(|word| {
        let chars = word.text.chars().count();
        let qualifies = !word.text.contains(' ')
            && (MIN_WIDTH_SAMPLE_CHARS..=MAX_WIDTH_SAMPLE_CHARS).contains(&chars);
        qualifies.then(|| word.width() as f64 / chars as f64)
    });
    match stats::median(samples) {
        Some(width) if width > 0.0 => Ok(width),
        _ => Err(Error::InsufficientSample("char width")),
    }
}

/// Consecutive differences of the sorted word tops inside the middle third
/// of the page, without the trailing difference.
pub fn line_gaps(words: &[Word]) -> Vec<f64> {
    let mut levels: Vec<u32> = words.iter().map(|word| word.y0).collect();
    levels.sort_unstable();
    let n = levels.len();
    let middle = &levels[n / 3..n * 2 / 3];
    if middle.len() < 3 {
        return Vec::new();
    }
    middle[..middle.len() - 1]
        .windows(2)
        .map(|pair| pair[1] as f64 - pair[0] as f64)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn word(text: &str, x0: u32, y0: u32, x1: u32, y1: u32) -> Word {
        Word::new(text, [x0, y0, x1, y1], 90)
    }

    fn quiet() -> Verbosity {
        Verbosity::new(true)
    }

    #[test]
    fn char_width_uses_only_qualifying_words() {
        let words = vec![
            word("ab", 0, 0, 100, 10),
            word("abcd", 0, 0, 40, 10),
            word("abcdef", 0, 0, 120, 10),
            word("two words", 0, 0, 900, 10),
        ];
        // samples 10 and 20
        assert_eq!(char_width(&words).unwrap(), 15.0);
    }

    #[test]
    fn char_width_without_samples_is_insufficient() {
        let words = vec![word("a", 0, 0, 10, 10), word("bb", 0, 0, 10, 10)];
        assert!(matches!(
            char_width(&words),
            Err(Error::InsufficientSample(_))
        ));
        let stats = estimate(&words, 7.5, quiet()).unwrap();
        assert_eq!(stats.char_width, 7.5);
    }

    #[test]
    fn unusable_fallback_uses_default_width() {
        let words = vec![word("a", 40, 0, 50, 10)];
        for fallback in [0.0, -3.0, f64::NAN, f64::INFINITY] {
            let stats = estimate(&words, fallback, quiet()).unwrap();
            assert_eq!(stats.char_width, DEFAULT_CHAR_WIDTH);
        }
    }

    #[test]
    fn gaps_come_from_the_middle_third() {
        // tops 0..=90 step 10 plus outliers; middle third of 12 is [4, 8)
        let mut words: Vec<Word> = (0..10).map(|i| word("line", 0, i * 10, 40, i * 10 + 8)).collect();
        words.push(word("head", 0, 500, 40, 508));
        words.push(word("foot", 0, 900, 40, 908));
        // sorted tops: 0 10 20 30 40 50 60 70 80 90 500 900 -> middle 40 50 60 70
        assert_eq!(line_gaps(&words), vec![10.0, 10.0]);
    }

    #[test]
    fn thresholds_from_regular_lines() {
        let words: Vec<Word> = (0..9)
            .flat_map(|i| {
                vec![
                    word("left", 0, i * 30, 40, i * 30 + 12),
                    word("right", 60, i * 30 + 2, 110, i * 30 + 14),
                ]
            })
            .collect();
        let stats = estimate(&words, 10.0, quiet()).unwrap();
        assert_eq!(stats.median_height, 12.0);
        assert_eq!(stats.min_y, 0);
        assert_eq!(stats.max_y, 242);
        assert_eq!(stats.char_width, 10.0);
        // middle third tops: 90 92 120 122 150 152 -> gaps 2 28 2 28
        assert_eq!(stats.merge_threshold, 2.0);
        assert_eq!(stats.newline_threshold, 28.0);
    }

    #[test]
    fn empty_gap_sets_fall_back() {
        let words = vec![word("alpha", 10, 40, 60, 50), word("beta", 80, 40, 120, 50)];
        let stats = estimate(&words, 10.0, quiet()).unwrap();
        assert_eq!(stats.merge_threshold, 0.0);
        assert_eq!(stats.newline_threshold, stats.median_height);
    }

    #[test]
    fn statistics_do_not_depend_on_word_order() {
        let mut words: Vec<Word> = (0..12)
            .map(|i| word("token", i * 7, (i * 37) % 200, i * 7 + 50, (i * 37) % 200 + 11 + i % 3))
            .collect();
        let forward = estimate(&words, 10.0, quiet()).unwrap();
        words.reverse();
        words.swap(2, 9);
        let shuffled = estimate(&words, 10.0, quiet()).unwrap();
        assert_eq!(forward, shuffled);
    }

    #[test]
    fn empty_page_is_rejected() {
        assert!(matches!(
            estimate(&[], 10.0, quiet()),
            Err(Error::NoWordsDetected(_))
        ));
    }
}
