//! Repairs encoding damage in recognized text.

use std::borrow::Cow;

use encoding_rs::WINDOWS_1252;
use once_cell::sync::Lazy;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

static CONTROL_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\x00-\x08\x0B\x0C\x0E-\x1F\x7F-\x9F]").expect("control chars pattern"));
// UTF-8 lead byte read as Windows-1252 followed by a continuation byte.
static MOJIBAKE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[ÂÃÄÅÆÇÈÉÊËÌÍÎÏÐÑÒÓÔÕÖ×ØÙÚÛÜÝÞßàáâãäåæçèéêëìíîïðñòóôõö÷øùúûüýþÿ][\u{80}-\u{BF}€‚ƒ„…†‡ˆ‰Š‹ŒŽ‘’“”•–—˜™š›œžŸ]")
        .expect("mojibake pattern")
});

const LIGATURES: [(char, &str); 7] = [
    ('\u{FB00}', "ff"),
    ('\u{FB01}', "fi"),
    ('\u{FB02}', "fl"),
    ('\u{FB03}', "ffi"),
    ('\u{FB04}', "ffl"),
    ('\u{FB05}', "st"),
    ('\u{FB06}', "st"),
];

/// Total and idempotent: valid text comes back unchanged.
pub fn fix_text(text: &str) -> String {
    let expanded = expand_ligatures(text);
    let repaired = expanded
        .split('\n')
        .map(fix_mojibake_line)
        .collect::<Vec<_>>()
        .join("\n");
    let repaired = CONTROL_CHARS.replace_all(&repaired, "");
    repaired.chars().nfc().collect()
}

/// Undoes UTF-8 text that was decoded as Windows-1252, when the round trip
/// yields valid UTF-8.
fn fix_mojibake_line(line: &str) -> Cow<'_, str> {
    if !MOJIBAKE.is_match(line) {
        return Cow::Borrowed(line);
    }
    let (bytes, _, unmappable) = WINDOWS_1252.encode(line);
    if unmappable {
        return Cow::Borrowed(line);
    }
    match std::str::from_utf8(&bytes) {
        Ok(decoded) => Cow::Owned(decoded.to_string()),
        Err(_) => Cow::Borrowed(line),
    }
}

fn expand_ligatures(text: &str) -> Cow<'_, str> {
    if !text.chars().any(|ch| LIGATURES.iter().any(|(lig, _)| *lig == ch)) {
        return Cow::Borrowed(text);
    }
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match LIGATURES.iter().find(|(lig, _)| *lig == ch) {
            Some((_, plain)) => out.push_str(plain),
            None => out.push(ch),
        }
    }
    Cow::Owned(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_text_is_untouched() {
        let text = "  fn main() {\n      println!(\"héllo\");\n  }\n";
        assert_eq!(fix_text(text), text);
    }

    #[test]
    fn utf8_read_as_windows_1252_is_repaired() {
        assert_eq!(fix_text("cafÃ© â€” naÃ¯ve"), "café — naïve");
    }

    #[test]
    fn repair_is_idempotent() {
        let once = fix_text("naÃ¯ve ﬁle\u{0007}");
        assert_eq!(once, "naïve file");
        assert_eq!(fix_text(&once), once);
    }

    #[test]
    fn replacement_chars_are_kept_and_text_is_composed() {
        assert_eq!(fix_text("a\u{FFFD}b"), "a\u{FFFD}b");
        assert_eq!(fix_text("a\u{FFFD}b e\u{0301}"), "a\u{FFFD}b é");
    }

    #[test]
    fn legitimate_accents_do_not_trigger_repair() {
        // 'Ã' followed by a non-continuation character stays as is.
        assert_eq!(fix_text("SÃO PAULO"), "SÃO PAULO");
    }
}
