//! Alternative renderer over tabular OCR output: follows the engine's own
//! block / paragraph / line numbering instead of bounding-box geometry.

use crate::ocr::TsvWord;
use crate::stats;

const MIN_WIDTH_SAMPLE_CHARS: usize = 4;

pub fn render(rows: &[TsvWord]) -> String {
    let mut blocks: Vec<u32> = Vec::new();
    for row in rows {
        if !blocks.contains(&row.block) {
            blocks.push(row.block);
        }
    }
    blocks.sort_unstable();
    // ordered by the top of each block's first row
    blocks.sort_by_key(|block| {
        rows.iter()
            .find(|row| row.block == *block)
            .map(|row| row.word.y0)
            .unwrap_or(0)
    });

    blocks
        .iter()
        .map(|block| {
            let block_rows: Vec<&TsvWord> = rows.iter().filter(|row| row.block == *block).collect();
            render_block(&block_rows)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_block(rows: &[&TsvWord]) -> String {
    let char_width = stats::mean(rows.iter().filter_map(|row| {
        let chars = row.word.text.chars().count();
        (chars >= MIN_WIDTH_SAMPLE_CHARS).then(|| row.word.width() as f64 / chars as f64)
    }))
    .filter(|width| *width > 0.0);

    let mut text = String::new();
    let (mut prev_par, mut prev_line, mut column) = (0u32, 0u32, 0usize);
    for row in rows {
        if prev_par != row.par {
            text.push('\n');
            prev_par = row.par;
            prev_line = row.line;
            column = 0;
        } else if prev_line != row.line {
            text.push('\n');
            prev_line = row.line;
            column = 0;
        }

        let mut added = 0usize;
        if let Some(char_width) = char_width {
            let position = row.word.x0 as f64 / char_width;
            if position > column as f64 + 1.0 {
                added = (position as usize).saturating_sub(column);
                text.extend(std::iter::repeat_n(' ', added));
            }
        }
        text.push_str(&row.word.text);
        text.push(' ');
        column += row.word.text.chars().count() + added + 1;
    }
    text
}
