//! Geometric reconstruction of page text from word bounding boxes.

pub mod blocks;
pub mod geometry;
pub mod render;
pub mod scan;

use serde::Serialize;

use crate::error::{Error, Result};
use crate::logging::Verbosity;
use crate::ocr::Word;

pub use geometry::GeometryStats;
pub use scan::Line;

pub const DEFAULT_CHAR_WIDTH: f64 = 10.0;

#[derive(Debug, Clone, Copy)]
pub struct LayoutOptions {
    /// Pixels per character when the page gives no usable sample.
    pub fallback_char_width: f64,
    pub verbosity: Verbosity,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            fallback_char_width: DEFAULT_CHAR_WIDTH,
            verbosity: Verbosity::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Layout {
    pub geometry: GeometryStats,
    pub offset: f64,
    /// `(offset, score)` for every candidate, in search order.
    pub offset_scores: Vec<(f64, f64)>,
    pub lines: Vec<Line>,
    pub text: String,
}

pub fn reconstruct(words: &[Word], options: &LayoutOptions) -> Result<Layout> {
    if words.is_empty() {
        return Err(Error::NoWordsDetected("nothing to lay out".to_string()));
    }
    let verbosity = options.verbosity;
    let geometry = geometry::estimate(words, options.fallback_char_width, verbosity)?;

    let (offset, offset_scores) = scan::best_offset(words, &geometry);
    verbosity.info(format_args!("Best offset: {}", offset));

    let lines = scan::assign_lines(words, &geometry, offset);
    let text = render::finalize(&render::render_lines(words, &lines, &geometry));

    Ok(Layout {
        geometry,
        offset,
        offset_scores,
        lines,
        text,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options() -> LayoutOptions {
        LayoutOptions {
            fallback_char_width: 10.0,
            verbosity: Verbosity::new(true),
        }
    }

    fn code_page() -> Vec<Word> {
        let rows: [&[(&str, u32)]; 6] = [
            &[("def", 40), ("greet(name):", 80)],
            &[("if", 80), ("name:", 110)],
            &[("print(name)", 120)],
            &[("else:", 80)],
            &[("print('nobody')", 120)],
            &[("return", 80), ("None", 150)],
        ];
        let mut words = Vec::new();
        for (line, row) in rows.iter().enumerate() {
            for (text, x0) in row.iter() {
                let y0 = 50 + line as u32 * 30 + (*x0 % 3);
                let x1 = x0 + text.chars().count() as u32 * 10;
                words.push(Word::new(*text, [*x0, y0, x1, y0 + 14], 90));
            }
        }
        words
    }

    #[test]
    fn reconstruction_is_deterministic() {
        let words = code_page();
        let first = reconstruct(&words, &options()).unwrap();
        let second = reconstruct(&words, &options()).unwrap();
        assert_eq!(first.text, second.text);
        assert_eq!(first.offset, second.offset);
    }

    #[test]
    fn every_word_is_rendered_once() {
        let words = code_page();
        let layout = reconstruct(&words, &options()).unwrap();
        let mut seen: Vec<usize> = layout.lines.iter().flat_map(|l| l.words.clone()).collect();
        seen.sort_unstable();
        assert_eq!(seen, (0..words.len()).collect::<Vec<_>>());
        for word in &words {
            assert!(layout.text.contains(&word.text));
        }
    }

    #[test]
    fn shared_top_renders_one_sorted_line() {
        let words = vec![
            Word::new("there", [100, 0, 200, 10], 90),
            Word::new("Hi", [0, 0, 20, 10], 90),
        ];
        let layout = reconstruct(&words, &options()).unwrap();
        assert_eq!(layout.geometry.char_width, 20.0);
        assert_eq!(layout.lines.len(), 1);
        assert_eq!(layout.text, "Hi    there\n");
    }

    #[test]
    fn three_words_on_one_top_render_one_text_line() {
        let words = vec![
            Word::new("you", [240, 0, 270, 10], 90),
            Word::new("Hi", [0, 0, 20, 10], 90),
            Word::new("there", [100, 0, 150, 10], 90),
        ];
        let layout = reconstruct(&words, &options()).unwrap();
        assert_eq!(layout.lines.len(), 1);
        assert_eq!(layout.text.lines().count(), 1);
        assert!(!layout.text.starts_with('\n'));
        assert!(layout.text.starts_with("Hi"));
    }

    #[test]
    fn zero_fallback_char_width_does_not_panic() {
        let words = vec![Word::new("a", [40, 0, 50, 10], 90)];
        let options = LayoutOptions {
            fallback_char_width: 0.0,
            verbosity: Verbosity::new(true),
        };
        let layout = reconstruct(&words, &options).unwrap();
        assert_eq!(layout.geometry.char_width, DEFAULT_CHAR_WIDTH);
        assert_eq!(layout.text, "a\n");
    }

    #[test]
    fn empty_word_list_is_rejected() {
        assert!(matches!(
            reconstruct(&[], &options()),
            Err(Error::NoWordsDetected(_))
        ));
    }
}
