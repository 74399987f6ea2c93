// Text Processing Service
// Canonicalizes raw input before chunking and scoring

use regex::Regex;

/// Symbols stripped from input text (deleted outright, no replacement).
const UNNECESSARY_SYMBOLS: [char; 22] = [
    '@', '#', '$', '^', '&', '*', '(', ')', '[', ']', '{', '}', '|', '\\', ':', ';', '<', '>',
    '?', '/', '~', '`',
];

/// Comprehensive text cleaning.
///
/// Rules apply in a fixed order; later rules assume the earlier ones ran.
/// The output contains no tab/newline/CR, no run of two or more spaces,
/// none of the unnecessary symbols, and every `%` expanded to ` persen`.
/// Idempotent: cleaning already-clean text is a no-op.
pub fn clean_text(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }

    let mut s = text.trim().to_string();

    // 1. Expand percent signs: "50%" -> "50 persen", bare "%" -> " persen"
    let digit_pct_re = Regex::new(r"(\d+)%").unwrap();
    s = digit_pct_re.replace_all(&s, "$1 persen").to_string();
    s = s.replace('%', " persen");

    // 2. Collapse whitespace runs
    let ws_re = Regex::new(r"\s+").unwrap();
    s = ws_re.replace_all(&s, " ").to_string();

    // 3. Strip unnecessary symbols
    s.retain(|c| !UNNECESSARY_SYMBOLS.contains(&c));

    // 4. Escape quotes with a literal backslash. Lossy on purpose: the
    //    backslash survives as text, and a second pass strips it again
    //    in step 3 before re-inserting it here.
    s = s.replace('"', "\\\"");
    s = s.replace('\'', "\\'");

    // 5. Line breaks and tabs become single spaces
    s = s.replace('\n', " ");
    s = s.replace('\r', " ");
    s = s.replace('\t', " ");

    // 6. Re-collapse and trim
    s = ws_re.replace_all(&s, " ").to_string();
    s.trim().to_string()
}

/// Split text into sentences on terminal punctuation runs.
/// Blank fragments are dropped; the punctuation itself is consumed.
pub fn split_sentences(text: &str) -> Vec<String> {
    if text.is_empty() {
        return Vec::new();
    }

    let re = Regex::new(r"[.!?]+").unwrap();
    re.split(text)
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .collect()
}
