/*!
 * "Contains English" heuristic.
 *
 * Flags translated content that still looks English by searching its
 * text for common English function words. This is approximate: short
 * loanwords and proper nouns produce false positives, and sentences
 * without any listed word slip through.
 */

use once_cell::sync::Lazy;
use regex::Regex;

use crate::catalog::ContentBlock;
use crate::database::TranslationRecord;

/// Function words that rarely appear outside English text
const ENGLISH_MARKERS: &[&str] = &[
    "the", "and", "with", "their", "your", "this", "that", "from", "will", "have", "which",
    "about", "these", "those", "would", "should", "been", "there", "what", "when",
];

static ENGLISH_WORDS: Lazy<Regex> = Lazy::new(|| {
    let pattern = format!(r"\b(?:{})\b", ENGLISH_MARKERS.join("|"));
    Regex::new(&pattern).expect("English marker pattern is valid")
});

/// Whether the text of `content` contains a common English word
pub fn contains_english(content: &ContentBlock) -> bool {
    let text = content.string_leaves().join(" ").to_lowercase();
    ENGLISH_WORDS.is_match(&text)
}

/// Records whose translated content still looks English
pub fn flag_english_records(records: &[TranslationRecord]) -> Vec<&TranslationRecord> {
    records
        .iter()
        .filter(|record| contains_english(&record.translated_content))
        .collect()
}
