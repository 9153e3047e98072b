//! Turns assigned lines into whitespace-faithful text.

use crate::ocr::Word;
use crate::sanitize;

use super::geometry::GeometryStats;
use super::scan::Line;

/// Lays out every line with spaces proportional to the pixel gaps, before
/// any clean-up.
pub fn render_lines(words: &[Word], lines: &[Line], stats: &GeometryStats) -> String {
    let mut output = String::new();
    let mut prev_y1: Option<u32> = None;

    for line in lines {
        let mut ordered: Vec<&Word> = line.words.iter().map(|&idx| &words[idx]).collect();
        if ordered.is_empty() {
            continue;
        }
        ordered.sort_by_key(|word| word.x0);

        let mut line_text = String::new();
        for (idx, word) in ordered.iter().enumerate() {
            let gap = if idx > 0 {
                let prev = ordered[idx - 1];
                prev_y1 = Some(prev.y1);
                word.x0 as f64 - prev.x1 as f64
            } else {
                word.x0 as f64
            };
            push_spaces(&mut line_text, space_count(gap, stats.char_width));
            line_text.push_str(&word.text);

            // no break ahead of the first line
            if let Some(prev) = prev_y1
                && !output.is_empty()
                && (word.y0 as f64 - prev as f64).abs() >= stats.newline_threshold
            {
                output.push('\n');
            }
        }
        output.push_str(&line_text);
        output.push('\n');
        prev_y1 = ordered.last().map(|word| word.y1);
    }
    output
}

/// Number of spaces standing in for a horizontal gap, at least one.
pub fn space_count(gap_px: f64, char_width: f64) -> usize {
    (gap_px / char_width).max(1.0) as usize
}

/// Strips the common indentation, drops blank lines and repairs the
/// encoding of rendered text.
pub fn finalize(text: &str) -> String {
    let text = collapse_blank_lines(&dedent(text));
    sanitize::fix_text(&text)
}

/// Removes the leading whitespace shared by every non-blank line.
/// Whitespace-only lines become empty.
pub fn dedent(text: &str) -> String {
    let lines: Vec<&str> = text
        .split('\n')
        .map(|line| {
            if line.trim_start_matches([' ', '\t']).is_empty() {
                ""
            } else {
                line
            }
        })
        .collect();

    let mut margin: Option<&str> = None;
    for line in lines.iter().filter(|line| !line.is_empty()) {
        let indent_len = line.len() - line.trim_start_matches([' ', '\t']).len();
        let indent = &line[..indent_len];
        margin = Some(match margin {
            None => indent,
            Some(current) => common_prefix(current, indent),
        });
    }
    let margin = margin.unwrap_or("");

    lines
        .iter()
        .map(|line| line.strip_prefix(margin).unwrap_or(line))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Replaces `\n\n` with `\n` until none is left.
pub fn collapse_blank_lines(text: &str) -> String {
    let mut output = text.to_string();
    while output.contains("\n\n") {
        output = output.replace("\n\n", "\n");
    }
    output
}

fn common_prefix<'a>(a: &'a str, b: &str) -> &'a str {
    let len = a
        .bytes()
        .zip(b.bytes())
        .take_while(|(x, y)| x == y)
        .count();
    &a[..len]
}

fn push_spaces(out: &mut String, count: usize) {
    out.extend(std::iter::repeat_n(' ', count));
}
