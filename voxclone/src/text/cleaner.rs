//! Text cleaning for extracted documents before chunking and TTS.

use once_cell::sync::Lazy;
use regex::Regex;

/// Characters that can cause TTS issues and their replacements.
const PROBLEMATIC_CHARS: &[(char, &str)] = &[
    ('\u{2018}', "'"),    // Left single quote
    ('\u{2019}', "'"),    // Right single quote
    ('\u{201c}', "\""),   // Left double quote
    ('\u{201d}', "\""),   // Right double quote
    ('\u{2013}', "-"),    // En dash
    ('\u{2014}', "-"),    // Em dash
    ('\u{2026}', "..."),  // Ellipsis
    ('\u{00a0}', " "),    // Non-breaking space
    ('\u{200b}', ""),     // Zero-width space
    ('\u{200c}', ""),     // Zero-width non-joiner
    ('\u{200d}', ""),     // Zero-width joiner
    ('\u{feff}', ""),     // BOM
    ('\u{2011}', "-"),    // Non-breaking hyphen
    ('\u{00ab}', "\""),   // Left-pointing double angle quote
    ('\u{00bb}', "\""),   // Right-pointing double angle quote
    ('\u{000c}', "\n\n"), // Form feed (page break)
];

/// Lines holding nothing but a page number ("12", "Page 3", "4 of 20", "- 7 -"),
/// including their line break.
static PAGE_NUMBER_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?im)^[ \t]*-?[ \t]*(?:page[ \t]+)?\d+(?:[ \t]*(?:of|/)[ \t]*\d+)?[ \t]*-?[ \t]*$\n?")
        .expect("page number pattern is valid")
});

static MULTI_SPACE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[ \t]+").expect("space pattern is valid"));

/// Clean extracted text for chunking and TTS.
///
/// This function:
/// - Replaces problematic Unicode characters (smart quotes, dashes, etc.)
/// - Removes control characters (except newlines and tabs)
/// - Drops lines that are only a page number
/// - Joins wrapped lines, keeping blank-line paragraph breaks
/// - Fixes repeated periods that cause TTS noise
pub fn clean_text(text: &str) -> String {
    let mut result = String::with_capacity(text.len());

    for c in text.chars() {
        let replacement = PROBLEMATIC_CHARS
            .iter()
            .find(|(ch, _)| *ch == c)
            .map(|(_, r)| *r);

        if let Some(r) = replacement {
            result.push_str(r);
        } else if is_allowed_char(c) {
            result.push(c);
        }
    }

    let result = PAGE_NUMBER_LINE.replace_all(&result, "");
    let result = reflow_paragraphs(&result);
    fix_multiple_periods(&result)
}

/// Check if a character is allowed in TTS text.
fn is_allowed_char(c: char) -> bool {
    c == '\n' || c == '\t' || !c.is_control()
}

/// Join the lines of each paragraph with single spaces; paragraphs are
/// separated by exactly one blank line.
fn reflow_paragraphs(text: &str) -> String {
    let mut paragraphs: Vec<String> = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            if !current.is_empty() {
                paragraphs.push(current.join(" "));
                current.clear();
            }
        } else {
            current.push(line);
        }
    }
    if !current.is_empty() {
        paragraphs.push(current.join(" "));
    }

    paragraphs
        .iter()
        .map(|p| MULTI_SPACE.replace_all(p, " ").into_owned())
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Replace multiple consecutive periods with a single period.
/// This helps prevent TTS noise from "..." or ".."
fn fix_multiple_periods(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut period_count = 0;

    for c in text.chars() {
        if c == '.' {
            period_count += 1;
            if period_count == 1 {
                result.push('.');
            }
        } else {
            period_count = 0;
            result.push(c);
        }
    }

    result
}
