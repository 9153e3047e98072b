//! Horizontal scan-line assignment of words to text lines.

use serde::Serialize;

use crate::ocr::Word;

use super::geometry::GeometryStats;

const OFFSET_STEPS: usize = 5;

/// Words claimed by one scan line, as indices into the page's word list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Line {
    pub scan_y: f64,
    pub words: Vec<usize>,
}

/// `OFFSET_STEPS` evenly spaced phases in `[0, min_y / 2)`.
pub fn candidate_offsets(min_y: u32) -> Vec<f64> {
    (0..OFFSET_STEPS)
        .map(|i| i as f64 / OFFSET_STEPS as f64 * min_y as f64 / 2.0)
        .collect()
}

/// Scan lines from `min_y + offset`, one `newline_threshold` apart, up to the
/// first one reaching `max_y + 2 * offset`.
pub fn scan_lines(stats: &GeometryStats, offset: f64) -> Vec<f64> {
    let bound = stats.max_y as f64 + offset * 2.0;
    let mut current = stats.min_y as f64 + offset;
    let mut lines = vec![current];
    while current < bound {
        current += stats.newline_threshold;
        lines.push(current);
    }
    lines
}

/// Mean number of words per non-empty scan line when every line claims the
/// words whose top lies within `merge_threshold` below it.
pub fn offset_score(words: &[Word], stats: &GeometryStats, offset: f64) -> f64 {
    let mut claimed = vec![false; words.len()];
    let mut counts = Vec::new();
    for scan_y in scan_lines(stats, offset) {
        let limit = scan_y + stats.merge_threshold;
        let count = claim(words, &mut claimed, |word| word.y0 as f64 <= limit).len();
        if count > 0 {
            counts.push(count);
        }
    }
    if counts.is_empty() {
        return 0.0;
    }
    counts.iter().sum::<usize>() as f64 / counts.len() as f64
}

/// The earliest candidate offset with the highest score, with all scores.
pub fn best_offset(words: &[Word], stats: &GeometryStats) -> (f64, Vec<(f64, f64)>) {
    let scores: Vec<(f64, f64)> = candidate_offsets(stats.min_y)
        .into_iter()
        .map(|offset| (offset, offset_score(words, stats, offset)))
        .collect();
    let mut best = (0.0, f64::NEG_INFINITY);
    for &(offset, score) in &scores {
        if score > best.1 {
            best = (offset, score);
        }
    }
    (best.0, scores)
}

/// Final assignment: each scan line claims the unclaimed words whose top is
/// strictly above it. Lines keep coming past the generated set until every
/// word has been claimed. Empty scan lines are omitted.
pub fn assign_lines(words: &[Word], stats: &GeometryStats, offset: f64) -> Vec<Line> {
    let mut claimed = vec![false; words.len()];
    let mut remaining = words.len();
    let mut lines = Vec::new();
    let mut scan_ys = scan_lines(stats, offset);
    let mut idx = 0usize;

    while remaining > 0 {
        if idx == scan_ys.len() {
            let last = scan_ys[idx - 1];
            scan_ys.push(last + stats.newline_threshold);
        }
        let scan_y = scan_ys[idx];
        idx += 1;
        let taken = claim(words, &mut claimed, |word| (word.y0 as f64) < scan_y);
        if taken.is_empty() {
            continue;
        }
        remaining -= taken.len();
        lines.push(Line {
            scan_y,
            words: taken,
        });
    }
    lines
}

fn claim(words: &[Word], claimed: &mut [bool], accept: impl Fn(&Word) -> bool) -> Vec<usize> {
    let mut taken = Vec::new();
    for (idx, word) in words.iter().enumerate() {
        if !claimed[idx] && accept(word) {
            claimed[idx] = true;
            taken.push(idx);
        }
    }
    taken
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(min_y: u32, max_y: u32, merge: f64, newline: f64) -> GeometryStats {
        GeometryStats {
            char_width: 10.0,
            median_height: 10.0,
            merge_threshold: merge,
            newline_threshold: newline,
            min_y,
            max_y,
        }
    }

    fn at(text: &str, x0: u32, y0: u32) -> Word {
        Word::new(text, [x0, y0, x0 + 30, y0 + 10], 90)
    }

    #[test]
    fn offsets_span_half_the_top_margin() {
        assert_eq!(candidate_offsets(100), vec![0.0, 10.0, 20.0, 30.0, 40.0]);
        assert_eq!(candidate_offsets(0), vec![0.0; 5]);
    }

    #[test]
    fn scan_lines_reach_past_the_last_top() {
        let s = stats(10, 50, 0.0, 20.0);
        assert_eq!(scan_lines(&s, 0.0), vec![10.0, 30.0, 50.0]);
        assert_eq!(scan_lines(&s, 5.0), vec![15.0, 35.0, 55.0, 75.0]);
    }

    #[test]
    fn search_predicate_includes_merge_tolerance() {
        let words = vec![at("a", 0, 10), at("b", 40, 12), at("c", 80, 12), at("d", 0, 30)];
        // scan lines 10, 20, 30. With merge 2 the first line claims a, b and c.
        assert_eq!(offset_score(&words, &stats(10, 30, 2.0, 10.0), 0.0), 2.0);
        // without tolerance: a, then b and c, then d.
        assert_eq!(offset_score(&words, &stats(10, 30, 0.0, 10.0), 0.0), 4.0 / 3.0);
    }

    #[test]
    fn search_and_final_predicates_differ() {
        let words = vec![at("a", 0, 10), at("b", 40, 12), at("c", 80, 12), at("d", 0, 30)];
        let s = stats(10, 30, 2.0, 10.0);
        // scan 10 claims nothing with the strict final predicate.
        let lines = assign_lines(&words, &s, 0.0);
        assert_eq!(lines[0].scan_y, 20.0);
        assert_eq!(lines[0].words, vec![0, 1, 2]);
        assert_eq!(lines[1].scan_y, 40.0);
        assert_eq!(lines[1].words, vec![3]);
    }

    #[test]
    fn best_offset_prefers_earliest_on_ties() {
        let words = vec![at("a", 0, 100), at("b", 40, 100)];
        let s = stats(100, 100, 0.0, 10.0);
        let (offset, scores) = best_offset(&words, &s);
        assert_eq!(offset, 0.0);
        assert_eq!(scores.len(), 5);
        assert!(scores.iter().all(|(_, score)| *score == 2.0));
    }

    #[test]
    fn final_assignment_uses_strict_comparison() {
        let words = vec![at("a", 0, 10), at("b", 0, 30)];
        let lines = assign_lines(&words, &stats(10, 30, 5.0, 20.0), 0.0);
        // scan 10 claims nothing; 30 claims a; 50 claims b.
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].scan_y, 30.0);
        assert_eq!(lines[0].words, vec![0]);
        assert_eq!(lines[1].scan_y, 50.0);
        assert_eq!(lines[1].words, vec![1]);
    }

    #[test]
    fn shared_top_lands_on_one_line() {
        let words = vec![at("c", 200, 40), at("a", 0, 40), at("b", 100, 40)];
        let s = stats(40, 40, 0.0, 12.0);
        let (offset, _) = best_offset(&words, &s);
        let lines = assign_lines(&words, &s, offset);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].words, vec![0, 1, 2]);
    }

    #[test]
    fn identical_words_are_claimed_once_each() {
        let words = vec![at("same", 0, 20), at("same", 0, 20), at("same", 0, 60)];
        let lines = assign_lines(&words, &stats(20, 60, 0.0, 25.0), 0.0);
        let total: usize = lines.iter().map(|line| line.words.len()).sum();
        assert_eq!(total, 3);
        assert_eq!(lines[0].words, vec![0, 1]);
    }
}
