//! Text normalization for comparing feed strings against catalog strings.
//!
//! Matching is case-insensitive and diacritic-insensitive: both sides are
//! folded through `fold_key` before comparison. Raw feed strings additionally
//! pass through `repair_feed_text` once, at load time, so that stored
//! correction keys and in-memory lookups agree.

use any_ascii::any_ascii;
use once_cell::sync::Lazy;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

/// Regex to collapse multiple whitespace into single space
pub static MULTI_SPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s{2,}").unwrap());

/// Separator between a multi-artist credit's names in catalog tags.
pub const ARTIST_SEPARATOR: &str = " / ";

// ============================================================================
// FOLDING
// ============================================================================

/// Check if a character is a Unicode combining mark (diacritical mark).
/// Used to filter out accents during folding.
pub fn is_combining_mark(c: char) -> bool {
    matches!(c as u32, 0x0300..=0x036F | 0x1AB0..=0x1AFF | 0x1DC0..=0x1DFF | 0xFE20..=0xFE2F)
}

/// Fold Unicode text to ASCII by applying NFKD decomposition and removing
/// combining marks. e.g., "Björk" → "bjork", "naïve" → "naive"
pub fn fold_to_ascii(s: &str) -> String {
    // First strip diacritics via NFKD decomposition
    let stripped: String = s.nfkd()
        .filter(|c| !is_combining_mark(*c))
        .collect();
    // Then transliterate any remaining non-ASCII (Cyrillic, Hebrew, CJK, etc.)
    any_ascii(&stripped).to_lowercase()
}

/// The comparison key used everywhere two names are tested for equality
/// without regard to case or accents.
pub fn fold_key(s: &str) -> String {
    fold_to_ascii(s.trim())
}

// ============================================================================
// FEED REPAIR
// ============================================================================

/// Repair encoding artifacts in a raw feed string.
///
/// Feed exports tend to arrive with curly quotes, stray accent characters
/// standing in for apostrophes, and ? where an apostrophe was lost in
/// transit. The repaired form is what gets stored as a correction key, so
/// this runs exactly once per string, at load time.
pub fn repair_feed_text(s: &str) -> String {
    let result = s.replace(['\u{2018}', '\u{2019}'], "'")  // Left/right single curly quotes
        .replace(['\u{201C}', '\u{201D}'], "\"")  // Left/right double curly quotes
        .replace(['\u{00B4}', '\u{0060}'], "'")  // Acute accent and grave accent
        // ? often appears where ' should be (e.g., "Can?t" → "Can't")
        .replace("?t ", "'t ")
        .replace("?s ", "'s ")
        .replace("?m ", "'m ")
        .replace("?ve ", "'ve ")
        .replace("?re ", "'re ")
        .replace("?ll ", "'ll ");
    MULTI_SPACE.replace_all(&result, " ").trim().to_string()
}

// ============================================================================
// ARTIST CREDITS
// ============================================================================

/// First artist of a multi-artist credit.
/// e.g., "Röyksopp / Robyn" → "Röyksopp"
pub fn primary_artist(s: &str) -> &str {
    s.split(ARTIST_SEPARATOR).next().unwrap_or(s).trim()
}

// ============================================================================
// TESTS
// ============================================================================
