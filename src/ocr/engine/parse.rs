use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{Error, Result};
use crate::ocr::{TsvWord, Word};

static BBOX_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"bbox\s(\d+)\s(\d+)\s(\d+)\s(\d+)").expect("bbox pattern"));
static WCONF_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"x_wconf\s(\d+)").expect("wconf pattern"));

const TSV_MIN_FIELDS: usize = 12;
const TSV_WORD_LEVEL: u32 = 5;

/// Extracts every `ocrx_word` span of an hOCR document, in document order.
pub fn parse_hocr_words(hocr: &str) -> Result<Vec<Word>> {
    let bytes = hocr.as_bytes();
    let mut words = Vec::new();
    let mut i = 0usize;
    while let Some(start) = find_subslice(bytes, b"<span", i) {
        let tag_end = match find_byte(bytes, b'>', start) {
            Some(end) => end,
            None => break,
        };
        let tag = &hocr[start..tag_end];
        if !has_class(tag, "ocrx_word") {
            i = tag_end + 1;
            continue;
        }
        let (inner_start, inner_end) = find_span_inner(bytes, tag_end + 1).ok_or_else(|| {
            Error::Parse(format!("unterminated ocrx_word span at byte {}", start))
        })?;
        let text = decode_entities(&strip_tags(&hocr[inner_start..inner_end]))
            .replace('\u{00a0}', " ");
        let title = extract_attr(tag, "title")
            .ok_or_else(|| Error::Parse(format!("word span without title: {}", tag)))?;
        let [x0, y0, x1, y1] = parse_bbox(&title)?;
        let confidence = parse_wconf(&title)?;
        words.push(Word {
            text: text.trim().to_string(),
            x0,
            y0,
            x1,
            y1,
            confidence,
        });
        i = inner_end + "</span>".len();
    }
    Ok(words)
}

pub(crate) fn parse_bbox(title: &str) -> Result<[u32; 4]> {
    let caps = BBOX_RE
        .captures(title)
        .ok_or_else(|| Error::Parse(format!("missing bbox in title '{}'", title)))?;
    let mut out = [0u32; 4];
    for (slot, idx) in out.iter_mut().zip(1..=4) {
        *slot = caps[idx]
            .parse()
            .map_err(|_| Error::Parse(format!("bbox value out of range in '{}'", title)))?;
    }
    Ok(out)
}

pub(crate) fn parse_wconf(title: &str) -> Result<u32> {
    let caps = WCONF_RE
        .captures(title)
        .ok_or_else(|| Error::Parse(format!("missing x_wconf in title '{}'", title)))?;
    caps[1]
        .parse()
        .map_err(|_| Error::Parse(format!("x_wconf out of range in '{}'", title)))
}

/// Word rows of Tesseract TSV output. Rows with negative confidence or
/// blank text are skipped.
pub fn parse_tsv_words(tsv: &str) -> Vec<TsvWord> {
    let mut words = Vec::new();
    for (idx, row) in tsv.lines().enumerate() {
        if idx == 0 {
            continue;
        }
        let cols = row.split('\t').collect::<Vec<_>>();
        if cols.len() < TSV_MIN_FIELDS {
            continue;
        }
        let level: u32 = cols[0].parse().unwrap_or(0);
        if level != TSV_WORD_LEVEL {
            continue;
        }
        let conf: f32 = cols[10].trim().parse().unwrap_or(-1.0);
        let text = cols[11].trim();
        if text.is_empty() || conf < 0.0 {
            continue;
        }
        let left: u32 = cols[6].parse().unwrap_or(0);
        let top: u32 = cols[7].parse().unwrap_or(0);
        let width: u32 = cols[8].parse().unwrap_or(0);
        let height: u32 = cols[9].parse().unwrap_or(0);
        words.push(TsvWord {
            word: Word::new(
                text,
                [left, top, left + width, top + height],
                conf.round().clamp(0.0, 100.0) as u32,
            ),
            block: cols[2].parse().unwrap_or(0),
            par: cols[3].parse().unwrap_or(0),
            line: cols[4].parse().unwrap_or(0),
        });
    }
    words
}

fn has_class(tag: &str, class: &str) -> bool {
    extract_attr(tag, "class")
        .map(|value| value.split_whitespace().any(|name| name == class))
        .unwrap_or(false)
}

fn find_subslice(haystack: &[u8], needle: &[u8], from: usize) -> Option<usize> {
    haystack
        .get(from..)?
        .windows(needle.len())
        .position(|win| win == needle)
        .map(|pos| from + pos)
}

fn find_byte(haystack: &[u8], needle: u8, from: usize) -> Option<usize> {
    haystack
        .get(from..)?
        .iter()
        .position(|b| *b == needle)
        .map(|pos| from + pos)
}

fn find_span_inner(bytes: &[u8], start: usize) -> Option<(usize, usize)> {
    let mut depth = 1i32;
    let mut i = start;
    while i < bytes.len() {
        if bytes[i] == b'<' {
            if bytes[i..].starts_with(b"<span") {
                depth += 1;
            } else if bytes[i..].starts_with(b"</span") {
                depth -= 1;
                if depth == 0 {
                    return Some((start, i));
                }
            }
        }
        i += 1;
    }
    None
}

fn extract_attr(tag: &str, name: &str) -> Option<String> {
    let needle = format!(" {}=", name);
    let idx = tag.find(&needle)?;
    let rest = &tag[idx + needle.len()..];
    let quote = rest.chars().next().filter(|ch| *ch == '"' || *ch == '\'')?;
    let rest = &rest[1..];
    let end = rest.find(quote)?;
    Some(rest[..end].to_string())
}

fn strip_tags(value: &str) -> String {
    let mut out = String::new();
    let mut in_tag = false;
    for ch in value.chars() {
        match ch {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ => {
                if !in_tag {
                    out.push(ch);
                }
            }
        }
    }
    out
}

fn decode_entities(value: &str) -> String {
    value
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}
