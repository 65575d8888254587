//! OCR text normalizer.
//!
//! Handles:
//! - Noise removal (punctuation, OCR glyph debris)
//! - Whitespace canonicalization (newlines, tabs, runs of spaces)
//! - Medicine name guessing from package text

/// Minimum length of a word considered as a medicine name candidate.
const MIN_NAME_LEN: usize = 3;

/// Normalize raw OCR output into a comparable canonical form.
///
/// Keeps letters, digits, `_`, `-` and whitespace; collapses whitespace runs to a
/// single space and trims the ends. Case is preserved.
pub fn normalize(raw: &str) -> String {
    let kept: String = raw.chars().filter(|c| is_kept(*c)).collect();
    kept.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn is_kept(c: char) -> bool {
    c.is_alphanumeric() || c.is_whitespace() || c == '_' || c == '-'
}

/// Guess the medicine name printed on a package.
///
/// Package text tends to print the brand capitalized, so this picks the longest word
/// of at least three characters that starts with an upper-case letter. The first such
/// word wins on ties.
pub fn guess_medicine_name(text: &str) -> Option<String> {
    let mut best: Option<&str> = None;
    for word in text.split_whitespace() {
        let starts_upper = word.chars().next().is_some_and(char::is_uppercase);
        if !starts_upper || word.chars().count() < MIN_NAME_LEN {
            continue;
        }
        let longer = best.map_or(true, |b| word.chars().count() > b.chars().count());
        if longer {
            best = Some(word);
        }
    }
    best.map(str::to_string)
}
